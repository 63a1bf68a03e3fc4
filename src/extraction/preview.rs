//! Selector preview: per-match element listings.
//!
//! Answers "what would this selector hit on this page" before committing it
//! to a field. Replaces the in-browser highlight with an inspectable report
//! carrying tag, text, outer HTML, and attributes for every match.

use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One matched element, serialized for inspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchEntry {
    /// Lowercase tag name.
    pub tag: String,
    /// Trimmed concatenated text content.
    pub text: String,
    /// Outer HTML serialization.
    pub html: String,
    /// Attribute name to value, sorted by name for stable output.
    pub attrs: BTreeMap<String, String>,
}

/// Result of previewing one selector against a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewReport {
    pub selector: String,
    pub count: usize,
    pub matches: Vec<MatchEntry>,
    /// Set when the query engine rejected the selector.
    pub error: Option<String>,
}

impl PreviewReport {
    /// Status line in the panel's vocabulary: `"3 matches"`, `"no matches"`,
    /// or the selector error.
    pub fn status_line(&self) -> String {
        if let Some(err) = &self.error {
            return err.clone();
        }
        match self.count {
            0 => "no matches".to_string(),
            1 => "1 match".to_string(),
            n => format!("{n} matches"),
        }
    }
}

/// List every element matching `selector`, in document order.
///
/// An empty selector previews nothing; an invalid one yields a report with
/// `error` set. Never panics.
pub fn preview(doc: &Html, selector: &str) -> PreviewReport {
    if selector.is_empty() {
        return PreviewReport {
            selector: String::new(),
            count: 0,
            matches: Vec::new(),
            error: None,
        };
    }

    let sel = match Selector::parse(selector) {
        Ok(sel) => sel,
        Err(err) => {
            return PreviewReport {
                selector: selector.to_string(),
                count: 0,
                matches: Vec::new(),
                error: Some(err.to_string()),
            }
        }
    };

    let matches: Vec<MatchEntry> = doc
        .select(&sel)
        .map(|el| MatchEntry {
            tag: el.value().name().to_string(),
            text: el.text().collect::<String>().trim().to_string(),
            html: el.html(),
            attrs: el
                .value()
                .attrs()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
        })
        .collect();

    PreviewReport {
        selector: selector.to_string(),
        count: matches.len(),
        matches,
        error: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
            <h1 id="name" class="product-title" data-sku="TB-45">Trekking Backpack</h1>
            <span class="price">€129.00</span>
            <span class="price strike">€149.00</span>
        </body></html>
    "#;

    #[test]
    fn test_preview_lists_matches_in_document_order() {
        let doc = Html::parse_document(PAGE);
        let report = preview(&doc, ".price");

        assert_eq!(report.count, 2);
        assert_eq!(report.matches[0].text, "€129.00");
        assert_eq!(report.matches[1].text, "€149.00");
        assert_eq!(report.matches[0].tag, "span");
        assert_eq!(report.status_line(), "2 matches");
    }

    #[test]
    fn test_preview_carries_attrs_and_outer_html() {
        let doc = Html::parse_document(PAGE);
        let report = preview(&doc, "#name");

        assert_eq!(report.count, 1);
        let entry = &report.matches[0];
        assert_eq!(entry.attrs.get("data-sku").map(String::as_str), Some("TB-45"));
        assert_eq!(
            entry.attrs.get("class").map(String::as_str),
            Some("product-title")
        );
        assert!(entry.html.starts_with("<h1"));
        assert!(entry.html.contains("Trekking Backpack"));
    }

    #[test]
    fn test_preview_no_matches() {
        let doc = Html::parse_document(PAGE);
        let report = preview(&doc, ".missing");

        assert_eq!(report.count, 0);
        assert!(report.error.is_none());
        assert_eq!(report.status_line(), "no matches");
    }

    #[test]
    fn test_preview_invalid_selector_sets_error() {
        let doc = Html::parse_document(PAGE);
        let report = preview(&doc, "span[[");

        assert_eq!(report.count, 0);
        assert!(report.error.is_some());
        assert_eq!(report.status_line(), report.error.clone().unwrap());
    }

    #[test]
    fn test_preview_empty_selector_is_inert() {
        let doc = Html::parse_document(PAGE);
        let report = preview(&doc, "");

        assert_eq!(report.count, 0);
        assert!(report.error.is_none());
    }
}
