//! CLI handler for `prodex parse <url-or-file>`.

use crate::acquisition;
use crate::audit;
use crate::cli::output::{self, Styled};
use crate::extraction::{self, ExtractReport, FieldOutcome, ProductRecord, SelectorSet};
use crate::settings::Settings;
use anyhow::Result;
use std::time::Instant;

/// Parse a product page and print the extracted record.
pub async fn run(target: &str, overrides: &SelectorSet, show_report: bool) -> Result<()> {
    let s = Styled::new();
    let start = Instant::now();

    let settings = Settings::load()?;
    let selectors = settings.selectors.overlaid_with(overrides);

    if selectors.is_empty() && !output::is_json() && !output::is_quiet() {
        eprintln!(
            "  {} No selectors configured. Set defaults with: {}",
            s.warn_sym(),
            s.bold("prodex settings set selectors.title h1")
        );
    }

    let client = acquisition::client();
    let snapshot = acquisition::acquire(&client, target, settings.allow_all_hosts).await?;
    let doc = snapshot.parse();

    let ExtractReport { record, fields } = extraction::extract_report(&doc, &selectors);
    let record = record.with_url(&snapshot.url);

    audit::record(
        "parse",
        Some(&snapshot.url),
        &record.outcome_summary(),
        start.elapsed().as_millis() as u64,
    );

    if output::is_json() {
        if show_report {
            output::print_json(&serde_json::json!({
                "record": record,
                "fields": fields,
            }));
        } else {
            output::print_json(&serde_json::to_value(&record)?);
        }
        return Ok(());
    }

    eprintln!();
    print_record(&s, &record);

    if show_report {
        eprintln!();
        eprintln!("  {}", s.bold("Selectors"));
        for (field, outcome) in fields.iter() {
            let sym = match outcome {
                o if o.is_invalid() => s.fail_sym(),
                FieldOutcome::Matched { .. } => s.ok_sym(),
                _ => s.info_sym(),
            };
            output::print_check(sym, &format!("{field}:"), &outcome.describe());
        }
    }

    if !output::is_quiet() {
        eprintln!();
        eprintln!(
            "  {} Parsed in {}",
            s.ok_sym(),
            output::format_millis(start.elapsed().as_millis() as u64)
        );
    }
    eprintln!();

    Ok(())
}

/// Print an extracted record in the standard two-column layout.
///
/// Shared with the interactive panel's `/parse`.
pub fn print_record(s: &Styled, record: &ProductRecord) {
    let shown = |v: &str| {
        if v.is_empty() {
            s.dim("(empty)")
        } else {
            v.to_string()
        }
    };

    eprintln!("    {} {}", s.bold(&format!("{:<7}", "Title")), shown(&record.title));
    eprintln!("    {} {}", s.bold(&format!("{:<7}", "Price")), shown(&record.price));
    eprintln!("    {} {}", s.bold(&format!("{:<7}", "URL")), shown(&record.url));

    if record.images.is_empty() {
        eprintln!("    {} {}", s.bold(&format!("{:<7}", "Images")), s.dim("(none)"));
    } else {
        eprintln!("    {} {}", s.bold(&format!("{:<7}", "Images")), record.images.len());
        for image in &record.images {
            eprintln!("      {}", s.cyan(image));
        }
    }

    if record.specs.is_empty() {
        eprintln!("    {} {}", s.bold(&format!("{:<7}", "Specs")), s.dim("(none)"));
    } else {
        eprintln!("    {} {}", s.bold(&format!("{:<7}", "Specs")), record.specs.len());
        let name_width = record.specs.iter().map(|p| p.name.len()).max().unwrap_or(0);
        for pair in &record.specs {
            eprintln!("      {:<width$}  {}", pair.name, pair.value, width = name_width);
        }
    }
}
