//! CLI handler for `prodex history`.

use crate::audit;
use crate::cli::output::{self, Styled};
use crate::settings::prodex_home;
use anyhow::Result;

/// Show the most recent logged operations.
pub fn run(limit: usize) -> Result<()> {
    let path = prodex_home().join("history.jsonl");
    let events = audit::tail(&path, limit)?;

    if output::is_json() {
        output::print_json(&serde_json::to_value(&events)?);
        return Ok(());
    }

    let s = Styled::new();
    if events.is_empty() {
        eprintln!();
        eprintln!(
            "  {} No history yet. Parse a page with: {}",
            s.info_sym(),
            s.bold("prodex parse <url>")
        );
        eprintln!();
        return Ok(());
    }

    eprintln!();
    eprintln!("  {} operation(s):", s.blue(&events.len().to_string()));
    eprintln!();
    for event in &events {
        let when = chrono::DateTime::parse_from_rfc3339(&event.timestamp)
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|_| event.timestamp.clone());
        eprintln!(
            "    {}  {} {:<44} {:>8}",
            s.dim(&when),
            s.bold(&format!("{:<12}", event.operation)),
            event.outcome,
            output::format_millis(event.duration_ms),
        );
        if let Some(url) = &event.url {
            eprintln!("    {:width$}  {}", "", s.dim(url), width = when.len());
        }
    }
    eprintln!();

    Ok(())
}
