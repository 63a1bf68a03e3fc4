//! Selector-driven field extraction over a parsed page.
//!
//! Three independent strategies, one per field category:
//!
//! 1. **Text** -- first matched element whose trimmed text is non-empty
//!    (title, price).
//! 2. **Images** -- `src` with a `data-src` lazy-load fallback, on the
//!    matched element or its first descendant `<img>`.
//! 3. **Specs** -- cell texts gathered from each matched row and paired by a
//!    [`PairingStrategy`](crate::extraction::pairing::PairingStrategy).
//!
//! Every strategy is a pure function over an immutable [`Html`] snapshot.
//! A selector the query engine rejects yields that field's empty default and
//! never aborts the other fields; [`extract`] itself cannot fail. Callers
//! who want to see why a field came back empty use [`extract_report`], which
//! separates "no matches" from "invalid selector" per field.

use crate::extraction::pairing::{FirstCellLabel, PairingStrategy};
use crate::extraction::record::{ProductRecord, SelectorSet, SpecPair};
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::debug;

/// Matches the image-bearing element inside a container match.
static IMG_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img").unwrap());

/// Cell-like descendants considered when splitting a spec row into texts.
static CELL_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td, th, dt, dd, span, div").unwrap());

// ── Per-field outcomes ──────────────────────────────────────────────────────

/// What the query engine saw for one field's selector.
///
/// The plain extraction operations collapse all of these into the field's
/// empty default; the report channel keeps them apart so a misconfigured
/// selector is distinguishable from a page that simply lacks the field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FieldOutcome {
    /// Selector string was empty; the field was never queried.
    NotConfigured,
    /// Selector parsed and matched `count` elements.
    Matched { count: usize },
    /// Selector parsed but matched nothing.
    NoMatch,
    /// The query engine rejected the selector string.
    InvalidSelector { message: String },
}

impl FieldOutcome {
    /// True when the selector itself is broken (as opposed to absent data).
    pub fn is_invalid(&self) -> bool {
        matches!(self, FieldOutcome::InvalidSelector { .. })
    }

    /// Human-readable one-liner, in the panel's vocabulary.
    pub fn describe(&self) -> String {
        match self {
            FieldOutcome::NotConfigured => "not configured".to_string(),
            FieldOutcome::Matched { count: 1 } => "1 match".to_string(),
            FieldOutcome::Matched { count } => format!("{count} matches"),
            FieldOutcome::NoMatch => "no matches".to_string(),
            FieldOutcome::InvalidSelector { message } => format!("invalid selector: {message}"),
        }
    }
}

/// Per-field outcomes for one extraction pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOutcomes {
    pub title: FieldOutcome,
    pub price: FieldOutcome,
    pub images: FieldOutcome,
    pub specs: FieldOutcome,
}

impl FieldOutcomes {
    /// Iterate fields in display order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldOutcome)> {
        [
            ("title", &self.title),
            ("price", &self.price),
            ("images", &self.images),
            ("specs", &self.specs),
        ]
        .into_iter()
    }

    /// True if any field's selector was rejected by the query engine.
    pub fn any_invalid(&self) -> bool {
        self.iter().any(|(_, outcome)| outcome.is_invalid())
    }
}

/// A record plus the per-field query outcomes that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractReport {
    pub record: ProductRecord,
    pub fields: FieldOutcomes,
}

// ── Extraction operations ───────────────────────────────────────────────────

/// Extract the first non-empty trimmed text under `selector`.
///
/// Elements whose text is whitespace-only are skipped even when they come
/// first in document order. Returns an empty string when the selector is
/// empty, invalid, or matches nothing with text; absence is a valid outcome,
/// not an error.
pub fn extract_text(doc: &Html, selector: &str) -> String {
    text_with_outcome(doc, selector).0
}

/// Extract image URLs under `selector`, in document order.
///
/// A matched `<img>` contributes its `src`, falling back to `data-src` when
/// `src` is absent or empty. Any other matched element contributes the same
/// lookup applied to its first descendant `<img>`. Empty results are
/// filtered out; duplicates are kept (a repeated image in the DOM is a
/// repeated entry). URLs are carried verbatim, with no base resolution.
pub fn extract_images(doc: &Html, selector: &str) -> Vec<String> {
    images_with_outcome(doc, selector).0
}

/// Extract `{name, value}` spec pairs from the rows matched by `selector`,
/// using the default first-cell-is-label pairing.
pub fn extract_specs(doc: &Html, selector: &str) -> Vec<SpecPair> {
    specs_with_outcome(doc, selector, &FirstCellLabel).0
}

/// [`extract_specs`] with a caller-supplied pairing strategy.
///
/// Each matched row is split into the trimmed non-empty texts of its
/// cell-like descendants (`td, th, dt, dd, span, div`, document order) and
/// handed to `pairing`; rows the strategy declines are skipped.
pub fn extract_specs_with(
    doc: &Html,
    selector: &str,
    pairing: &dyn PairingStrategy,
) -> Vec<SpecPair> {
    specs_with_outcome(doc, selector, pairing).0
}

/// Run all three strategies and assemble a [`ProductRecord`].
///
/// The strategies are independent: a malformed selector for one field
/// yields that field's empty default without disturbing the others. This
/// function never fails and never panics. `url` is left empty; the caller
/// attaches it from page context afterwards.
pub fn extract(doc: &Html, selectors: &SelectorSet) -> ProductRecord {
    ProductRecord {
        title: extract_text(doc, &selectors.title),
        price: extract_text(doc, &selectors.price),
        images: extract_images(doc, &selectors.images),
        specs: extract_specs(doc, &selectors.specs),
        url: String::new(),
    }
}

/// Like [`extract`], but also reports what the query engine saw per field.
///
/// The record is identical to what [`extract`] returns for the same inputs;
/// the outcomes are purely diagnostic.
pub fn extract_report(doc: &Html, selectors: &SelectorSet) -> ExtractReport {
    let (title, title_outcome) = text_with_outcome(doc, &selectors.title);
    let (price, price_outcome) = text_with_outcome(doc, &selectors.price);
    let (images, images_outcome) = images_with_outcome(doc, &selectors.images);
    let (specs, specs_outcome) = specs_with_outcome(doc, &selectors.specs, &FirstCellLabel);

    ExtractReport {
        record: ProductRecord {
            title,
            price,
            images,
            specs,
            url: String::new(),
        },
        fields: FieldOutcomes {
            title: title_outcome,
            price: price_outcome,
            images: images_outcome,
            specs: specs_outcome,
        },
    }
}

// ── Strategy internals ──────────────────────────────────────────────────────

fn text_with_outcome(doc: &Html, selector: &str) -> (String, FieldOutcome) {
    let elements = match query(doc, selector) {
        Queried::NotConfigured => return (String::new(), FieldOutcome::NotConfigured),
        Queried::Invalid(message) => {
            return (String::new(), FieldOutcome::InvalidSelector { message })
        }
        Queried::Elements(els) => els,
    };
    if elements.is_empty() {
        return (String::new(), FieldOutcome::NoMatch);
    }

    let count = elements.len();
    let value = elements
        .into_iter()
        .map(|el| element_text(&el))
        .find(|text| !text.is_empty())
        .unwrap_or_default();
    (value, FieldOutcome::Matched { count })
}

fn images_with_outcome(doc: &Html, selector: &str) -> (Vec<String>, FieldOutcome) {
    let elements = match query(doc, selector) {
        Queried::NotConfigured => return (Vec::new(), FieldOutcome::NotConfigured),
        Queried::Invalid(message) => {
            return (Vec::new(), FieldOutcome::InvalidSelector { message })
        }
        Queried::Elements(els) => els,
    };
    if elements.is_empty() {
        return (Vec::new(), FieldOutcome::NoMatch);
    }

    let count = elements.len();
    let urls = elements
        .into_iter()
        .map(|el| {
            if el.value().name().eq_ignore_ascii_case("img") {
                image_source(&el)
            } else {
                el.select(&IMG_SELECTOR)
                    .next()
                    .map(|img| image_source(&img))
                    .unwrap_or_default()
            }
        })
        .filter(|url| !url.is_empty())
        .collect();
    (urls, FieldOutcome::Matched { count })
}

fn specs_with_outcome(
    doc: &Html,
    selector: &str,
    pairing: &dyn PairingStrategy,
) -> (Vec<SpecPair>, FieldOutcome) {
    let rows = match query(doc, selector) {
        Queried::NotConfigured => return (Vec::new(), FieldOutcome::NotConfigured),
        Queried::Invalid(message) => {
            return (Vec::new(), FieldOutcome::InvalidSelector { message })
        }
        Queried::Elements(els) => els,
    };
    if rows.is_empty() {
        return (Vec::new(), FieldOutcome::NoMatch);
    }

    let count = rows.len();
    let mut pairs = Vec::new();
    for row in rows {
        let texts: Vec<String> = row
            .select(&CELL_SELECTOR)
            .map(|cell| element_text(&cell))
            .filter(|text| !text.is_empty())
            .collect();
        if let Some(pair) = pairing.pair(&texts) {
            pairs.push(pair);
        }
    }
    (pairs, FieldOutcome::Matched { count })
}

/// Result of running one field selector against the document.
enum Queried<'a> {
    NotConfigured,
    Invalid(String),
    Elements(Vec<ElementRef<'a>>),
}

/// Query all elements matching `selector`, in document order.
fn query<'a>(doc: &'a Html, selector: &str) -> Queried<'a> {
    if selector.is_empty() {
        return Queried::NotConfigured;
    }
    match Selector::parse(selector) {
        Ok(sel) => Queried::Elements(doc.select(&sel).collect()),
        Err(err) => {
            let message = err.to_string();
            debug!(selector, %message, "selector rejected by query engine");
            Queried::Invalid(message)
        }
    }
}

/// Concatenated descendant text, trimmed at both ends.
fn element_text(el: &ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Two-tier source lookup on an `<img>`: `src`, then `data-src` when `src`
/// is absent or empty.
fn image_source(el: &ElementRef) -> String {
    match el.value().attr("src") {
        Some(src) if !src.is_empty() => src.to_string(),
        _ => el.value().attr("data-src").unwrap_or("").to_string(),
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::record::SpecPair;

    fn doc(html: &str) -> Html {
        Html::parse_document(html)
    }

    #[test]
    fn test_all_empty_selectors_yield_empty_record() {
        let page = doc("<html><body><h1>Ignored</h1></body></html>");
        let record = extract(&page, &SelectorSet::default());

        assert_eq!(record.title, "");
        assert_eq!(record.price, "");
        assert!(record.images.is_empty());
        assert!(record.specs.is_empty());
        assert_eq!(record.url, "");
    }

    #[test]
    fn test_text_skips_whitespace_only_elements() {
        let page = doc(r#"
            <html><body>
                <div class="name">   </div>
                <div class="name">Widget</div>
            </body></html>
        "#);

        assert_eq!(extract_text(&page, ".name"), "Widget");
    }

    #[test]
    fn test_text_first_non_empty_wins() {
        let page = doc(r#"
            <html><body>
                <span class="price"></span>
                <span class="price">$19.99</span>
                <span class="price">$24.99</span>
            </body></html>
        "#);

        assert_eq!(extract_text(&page, ".price"), "$19.99");
    }

    #[test]
    fn test_text_empty_when_nothing_matches_or_all_blank() {
        let page = doc(r#"<html><body><p class="blank">  </p></body></html>"#);

        assert_eq!(extract_text(&page, ".blank"), "");
        assert_eq!(extract_text(&page, ".missing"), "");
        assert_eq!(extract_text(&page, ""), "");
    }

    #[test]
    fn test_images_src_with_data_src_fallback() {
        let page = doc(r#"
            <html><body>
                <img class="shot" src="a.jpg">
                <div class="shot"><img data-src="b.jpg"></div>
            </body></html>
        "#);

        assert_eq!(extract_images(&page, ".shot"), vec!["a.jpg", "b.jpg"]);
    }

    #[test]
    fn test_images_keep_duplicates_in_document_order() {
        let page = doc(r#"
            <html><body>
                <img class="shot" src="a.jpg">
                <img class="shot" src="b.jpg">
                <img class="shot" src="a.jpg">
            </body></html>
        "#);

        assert_eq!(extract_images(&page, ".shot"), vec!["a.jpg", "b.jpg", "a.jpg"]);
    }

    #[test]
    fn test_images_empty_src_falls_back_to_data_src() {
        let page = doc(r#"
            <html><body>
                <img class="shot" src="" data-src="lazy.jpg">
                <img class="shot" data-src="lazy2.jpg">
            </body></html>
        "#);

        assert_eq!(extract_images(&page, ".shot"), vec!["lazy.jpg", "lazy2.jpg"]);
    }

    #[test]
    fn test_images_sourceless_entries_filtered_out() {
        let page = doc(r#"
            <html><body>
                <div class="shot"><p>no image here</p></div>
                <img class="shot">
                <img class="shot" src="real.jpg">
            </body></html>
        "#);

        assert_eq!(extract_images(&page, ".shot"), vec!["real.jpg"]);
    }

    #[test]
    fn test_specs_single_cell_row_excluded() {
        let page = doc(r#"
            <html><body><table class="specs">
                <tr><th>Color</th><td>Red</td></tr>
                <tr><th>Lonely</th></tr>
            </table></body></html>
        "#);

        let pairs = extract_specs(&page, "table.specs tr");
        assert_eq!(pairs, vec![SpecPair::new("Color", "Red")]);
    }

    #[test]
    fn test_specs_extra_cells_join_with_single_space() {
        let page = doc(r#"
            <html><body><table class="specs">
                <tr><th>Color</th><td>Red</td><td>Matte</td></tr>
            </table></body></html>
        "#);

        let pairs = extract_specs(&page, "table.specs tr");
        assert_eq!(pairs, vec![SpecPair::new("Color", "Red Matte")]);
    }

    #[test]
    fn test_specs_definition_list_rows() {
        let page = doc(r#"
            <html><body><dl class="props">
                <div class="row"><dt>Brand</dt><dd>Acme</dd></div>
                <div class="row"><dt>Origin</dt><dd>Germany</dd></div>
            </dl></body></html>
        "#);

        let pairs = extract_specs(&page, "dl.props .row");
        assert_eq!(
            pairs,
            vec![SpecPair::new("Brand", "Acme"), SpecPair::new("Origin", "Germany")]
        );
    }

    #[test]
    fn test_specs_nested_cells_keep_outer_text() {
        // textContent of an outer cell includes nested cell text; the
        // first-cell heuristic keeps both fragments.
        let page = doc(r#"
            <html><body><table class="specs">
                <tr><td><span>Color</span></td><td>Red</td></tr>
            </table></body></html>
        "#);

        let pairs = extract_specs(&page, "table.specs tr");
        assert_eq!(pairs, vec![SpecPair::new("Color", "Color Red")]);
    }

    #[test]
    fn test_specs_with_custom_pairing() {
        struct ValueFirst;
        impl PairingStrategy for ValueFirst {
            fn pair(&self, texts: &[String]) -> Option<SpecPair> {
                match texts {
                    [value, name] => Some(SpecPair::new(name.clone(), value.clone())),
                    _ => None,
                }
            }
        }

        let page = doc(r#"
            <html><body><table class="specs">
                <tr><td>Red</td><td>Color</td></tr>
                <tr><td>rejected</td><td>by</td><td>strategy</td></tr>
            </table></body></html>
        "#);

        let pairs = extract_specs_with(&page, "table.specs tr", &ValueFirst);
        assert_eq!(pairs, vec![SpecPair::new("Color", "Red")]);
    }

    #[test]
    fn test_specs_blank_cells_ignored() {
        let page = doc(r#"
            <html><body><table class="specs">
                <tr><td>  </td><td>Weight</td><td>2.5 kg</td></tr>
            </table></body></html>
        "#);

        let pairs = extract_specs(&page, "table.specs tr");
        assert_eq!(pairs, vec![SpecPair::new("Weight", "2.5 kg")]);
    }

    #[test]
    fn test_malformed_selector_yields_field_default() {
        let page = doc(r#"<html><body><h1>Widget</h1></body></html>"#);

        assert_eq!(extract_text(&page, "div[["), "");
        assert!(extract_images(&page, "!!!").is_empty());
        assert!(extract_specs(&page, ":::nope").is_empty());
    }

    #[test]
    fn test_broken_selector_does_not_disturb_other_fields() {
        let page = doc(r#"
            <html><body>
                <h1 class="title">Widget</h1>
                <span class="price">$9.99</span>
            </body></html>
        "#);
        let selectors = SelectorSet {
            title: ".title".to_string(),
            price: "span[[broken".to_string(),
            images: ".gallery img".to_string(),
            specs: String::new(),
        };

        let record = extract(&page, &selectors);
        // the broken price selector must not disturb the other fields
        assert_eq!(record.title, "Widget");
        assert_eq!(record.price, "");
        assert!(record.images.is_empty());
        assert!(record.specs.is_empty());
    }

    #[test]
    fn test_extract_is_idempotent() {
        let page = doc(r#"
            <html><body>
                <h1 class="title">Widget</h1>
                <img class="shot" src="a.jpg">
                <table class="specs"><tr><th>Color</th><td>Red</td></tr></table>
            </body></html>
        "#);
        let selectors = SelectorSet {
            title: ".title".to_string(),
            price: String::new(),
            images: ".shot".to_string(),
            specs: "table.specs tr".to_string(),
        };

        let first = extract(&page, &selectors);
        let second = extract(&page, &selectors);
        assert_eq!(first, second);
    }

    #[test]
    fn test_report_separates_no_match_from_invalid() {
        let page = doc(r#"<html><body><h1 class="title">Widget</h1></body></html>"#);
        let selectors = SelectorSet {
            title: ".title".to_string(),
            price: ".price".to_string(),
            images: "img[[".to_string(),
            specs: String::new(),
        };

        let report = extract_report(&page, &selectors);
        assert_eq!(report.fields.title, FieldOutcome::Matched { count: 1 });
        assert_eq!(report.fields.price, FieldOutcome::NoMatch);
        assert!(report.fields.images.is_invalid());
        assert_eq!(report.fields.specs, FieldOutcome::NotConfigured);
        assert!(report.fields.any_invalid());

        // the record itself is unchanged by diagnostics
        assert_eq!(report.record, extract(&page, &selectors));
    }

    #[test]
    fn test_outcome_describe_vocabulary() {
        assert_eq!(FieldOutcome::NotConfigured.describe(), "not configured");
        assert_eq!(FieldOutcome::Matched { count: 1 }.describe(), "1 match");
        assert_eq!(FieldOutcome::Matched { count: 4 }.describe(), "4 matches");
        assert_eq!(FieldOutcome::NoMatch.describe(), "no matches");
        assert!(FieldOutcome::InvalidSelector { message: "bad".to_string() }
            .describe()
            .starts_with("invalid selector"));
    }

    #[test]
    fn test_full_product_page() {
        let page = doc(r#"
        <html>
        <head><title>Shop</title></head>
        <body>
            <h1 class="product-title"> Trekking Backpack 45L </h1>
            <div class="pricing">
                <span class="price sale">   </span>
                <span class="price">€129.00</span>
            </div>
            <div class="gallery">
                <div class="slide"><img src="/img/pack-front.jpg" alt="front"></div>
                <div class="slide"><img data-src="/img/pack-side.jpg"></div>
                <div class="slide"><p>video</p></div>
            </div>
            <table class="spec-table">
                <tr><th>Volume</th><td>45 L</td></tr>
                <tr><th>Weight</th><td>1.8</td><td>kg</td></tr>
                <tr><th>Care</th></tr>
            </table>
        </body>
        </html>
        "#);
        let selectors = SelectorSet {
            title: ".product-title".to_string(),
            price: ".pricing .price".to_string(),
            images: ".gallery .slide".to_string(),
            specs: ".spec-table tr".to_string(),
        };

        let record = extract(&page, &selectors).with_url("https://shop.example/packs/45l");

        assert_eq!(record.title, "Trekking Backpack 45L");
        assert_eq!(record.price, "€129.00");
        assert_eq!(
            record.images,
            vec!["/img/pack-front.jpg", "/img/pack-side.jpg"]
        );
        assert_eq!(
            record.specs,
            vec![
                SpecPair::new("Volume", "45 L"),
                SpecPair::new("Weight", "1.8 kg"),
            ]
        );
        assert_eq!(record.url, "https://shop.example/packs/45l");
    }
}
