//! Pluggable label/value pairing for spec rows.
//!
//! Turning a row's text fragments into a `{name, value}` pair is a heuristic,
//! not a parse: nothing in the markup says which cell is the label. The rule
//! lives behind a trait so traversal code never hard-wires one guess.

use crate::extraction::record::SpecPair;

/// Strategy for pairing a row's non-empty cell texts into one spec entry.
pub trait PairingStrategy {
    /// Pair the texts, or `None` when no meaningful pair can be formed.
    fn pair(&self, texts: &[String]) -> Option<SpecPair>;
}

/// Default heuristic: the first text-bearing cell is the label, everything
/// after it is the value, joined with single spaces.
///
/// This assumes label-first markup (true for the common `<tr><th>..<td>..`,
/// `<dt>..<dd>..` and two-span shapes) regardless of visual layout. Rows
/// with fewer than two non-empty texts are dropped since no pair can be
/// formed from them.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstCellLabel;

impl PairingStrategy for FirstCellLabel {
    fn pair(&self, texts: &[String]) -> Option<SpecPair> {
        if texts.len() < 2 {
            return None;
        }
        Some(SpecPair {
            name: texts[0].clone(),
            value: texts[1..].join(" "),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_two_cells_pair_directly() {
        let pair = FirstCellLabel.pair(&owned(&["Weight", "2.5 kg"]));
        assert_eq!(pair, Some(SpecPair::new("Weight", "2.5 kg")));
    }

    #[test]
    fn test_extra_cells_join_into_value() {
        let pair = FirstCellLabel.pair(&owned(&["Color", "Red", "Matte"]));
        assert_eq!(pair, Some(SpecPair::new("Color", "Red Matte")));
    }

    #[test]
    fn test_short_rows_yield_nothing() {
        assert_eq!(FirstCellLabel.pair(&owned(&["Color"])), None);
        assert_eq!(FirstCellLabel.pair(&[]), None);
    }
}
