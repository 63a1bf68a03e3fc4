//! CLI handler for `prodex preview <url-or-file> <selector>`.

use crate::acquisition;
use crate::cli::output::{self, Styled};
use crate::extraction;
use crate::settings::Settings;
use anyhow::Result;

/// How many matches the human-readable listing shows.
const SHOWN: usize = 10;

/// Show which elements a selector matches on a page.
pub async fn run(target: &str, selector: &str) -> Result<()> {
    let s = Styled::new();

    let settings = Settings::load()?;
    let client = acquisition::client();
    let snapshot = acquisition::acquire(&client, target, settings.allow_all_hosts).await?;
    let report = extraction::preview(&snapshot.parse(), selector);

    if output::is_json() {
        output::print_json(&serde_json::to_value(&report)?);
        return Ok(());
    }

    eprintln!();
    if let Some(error) = &report.error {
        eprintln!("  {} {error}", s.fail_sym());
        eprintln!();
        return Ok(());
    }

    let sym = if report.count > 0 {
        s.ok_sym()
    } else {
        s.warn_sym()
    };
    eprintln!("  {sym} {} for {}", report.status_line(), s.bold(selector));
    eprintln!();

    for (i, entry) in report.matches.iter().take(SHOWN).enumerate() {
        let tag = format!("<{}>", entry.tag);
        let text = if entry.text.is_empty() {
            s.dim("(no text)")
        } else {
            output::truncate(&entry.text, 60)
        };
        eprintln!("    {:>2}. {} {}", i + 1, s.cyan(&format!("{tag:<10}")), text);
        if output::is_verbose() {
            eprintln!("        {}", s.dim(&output::truncate(&entry.html, 100)));
        }
    }
    if report.matches.len() > SHOWN {
        eprintln!(
            "    {}",
            s.dim(&format!("... +{} more", report.matches.len() - SHOWN))
        );
    }
    eprintln!();

    Ok(())
}
