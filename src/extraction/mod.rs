//! Structured page extraction.
//!
//! Turns a parsed product page plus a set of named CSS selectors into a
//! normalized [`ProductRecord`]: first non-empty text for title and price,
//! lazy-load-aware image URLs, and heuristic label/value spec pairs. Pure
//! and synchronous; the page snapshot is read-only input.

pub mod engine;
pub mod pairing;
pub mod preview;
pub mod record;

pub use engine::{
    extract, extract_images, extract_report, extract_specs, extract_specs_with, extract_text,
    ExtractReport, FieldOutcome, FieldOutcomes,
};
pub use pairing::{FirstCellLabel, PairingStrategy};
pub use preview::{preview, MatchEntry, PreviewReport};
pub use record::{ProductRecord, SelectorSet, SpecPair};
