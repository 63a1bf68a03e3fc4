//! Product record and selector set types.

use serde::{Deserialize, Serialize};

/// Named CSS selectors, one per extracted field.
///
/// All fields are optional; an empty string means "not configured" and the
/// corresponding record field stays at its default. Selector strings are
/// opaque here: the query engine gets them verbatim and nothing validates
/// them up front.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorSet {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub images: String,
    #[serde(default)]
    pub specs: String,
}

impl SelectorSet {
    /// True when no field has a selector configured.
    pub fn is_empty(&self) -> bool {
        self.title.is_empty()
            && self.price.is_empty()
            && self.images.is_empty()
            && self.specs.is_empty()
    }

    /// Overlay non-empty fields of `other` onto a copy of `self`.
    ///
    /// Used to apply per-invocation selector overrides on top of the
    /// persisted defaults.
    pub fn overlaid_with(&self, other: &SelectorSet) -> SelectorSet {
        let pick = |base: &str, over: &str| {
            if over.is_empty() {
                base.to_string()
            } else {
                over.to_string()
            }
        };
        SelectorSet {
            title: pick(&self.title, &other.title),
            price: pick(&self.price, &other.price),
            images: pick(&self.images, &other.images),
            specs: pick(&self.specs, &other.specs),
        }
    }

    /// Field names in display order.
    pub const FIELDS: [&'static str; 4] = ["title", "price", "images", "specs"];

    /// Get a field's selector by name.
    pub fn get(&self, field: &str) -> Option<&str> {
        match field {
            "title" => Some(&self.title),
            "price" => Some(&self.price),
            "images" => Some(&self.images),
            "specs" => Some(&self.specs),
            _ => None,
        }
    }

    /// Set a field's selector by name. Returns false for an unknown field.
    pub fn set(&mut self, field: &str, selector: &str) -> bool {
        let slot = match field {
            "title" => &mut self.title,
            "price" => &mut self.price,
            "images" => &mut self.images,
            "specs" => &mut self.specs,
            _ => return false,
        };
        *slot = selector.trim().to_string();
        true
    }
}

/// One spec entry: a label and its value text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecPair {
    pub name: String,
    pub value: String,
}

impl SpecPair {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Normalized output of one extraction pass.
///
/// Constructed fresh per call, immediately serialized for display or
/// transmission, never stored. `url` is attached by the caller from page
/// context after extraction; the document tree alone does not carry
/// authoritative page identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub title: String,
    pub price: String,
    pub images: Vec<String>,
    pub specs: Vec<SpecPair>,
    #[serde(default)]
    pub url: String,
}

impl ProductRecord {
    /// Attach the source page address.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Short outcome line for status displays and the history log,
    /// e.g. `title=yes price=no images=3 specs=5`.
    pub fn outcome_summary(&self) -> String {
        format!(
            "title={} price={} images={} specs={}",
            if self.title.is_empty() { "no" } else { "yes" },
            if self.price.is_empty() { "no" } else { "yes" },
            self.images.len(),
            self.specs.len(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_set_empty() {
        assert!(SelectorSet::default().is_empty());

        let mut sels = SelectorSet::default();
        sels.set("title", "h1.product");
        assert!(!sels.is_empty());
    }

    #[test]
    fn test_selector_set_get_set() {
        let mut sels = SelectorSet::default();
        assert!(sels.set("price", "  .price-tag  "));
        assert_eq!(sels.get("price"), Some(".price-tag"));
        assert!(!sels.set("weight", ".nope"));
        assert_eq!(sels.get("weight"), None);
    }

    #[test]
    fn test_overlay_prefers_non_empty_override() {
        let base = SelectorSet {
            title: "h1".to_string(),
            price: ".price".to_string(),
            images: String::new(),
            specs: "tr.spec".to_string(),
        };
        let over = SelectorSet {
            title: String::new(),
            price: ".sale-price".to_string(),
            images: ".gallery img".to_string(),
            specs: String::new(),
        };

        let merged = base.overlaid_with(&over);
        assert_eq!(merged.title, "h1");
        assert_eq!(merged.price, ".sale-price");
        assert_eq!(merged.images, ".gallery img");
        assert_eq!(merged.specs, "tr.spec");
    }

    #[test]
    fn test_record_serializes_all_fields() {
        let record = ProductRecord {
            title: "Widget".to_string(),
            price: "$9.99".to_string(),
            images: vec!["a.jpg".to_string()],
            specs: vec![SpecPair::new("Color", "Red")],
            url: String::new(),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["title"], "Widget");
        assert_eq!(json["specs"][0]["name"], "Color");
        // url is always present in serialized output, even when empty
        assert_eq!(json["url"], "");
    }

    #[test]
    fn test_outcome_summary() {
        let record = ProductRecord {
            title: "Widget".to_string(),
            images: vec!["a.jpg".to_string(), "b.jpg".to_string()],
            ..Default::default()
        };
        assert_eq!(record.outcome_summary(), "title=yes price=no images=2 specs=0");
    }
}
