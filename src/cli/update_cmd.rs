//! CLI handler for `prodex update <feed-url>`.

use crate::audit;
use crate::cli::output::{self, Styled};
use crate::forward::WebhookClient;
use crate::settings::Settings;
use anyhow::Result;
use std::time::Instant;

/// Trigger the feed-wide price update workflow.
pub async fn run(feed_url: &str) -> Result<()> {
    let s = Styled::new();
    let start = Instant::now();

    let settings = Settings::load()?;
    let webhook = WebhookClient::from_settings(&settings);

    if !output::is_json() && !output::is_quiet() {
        eprintln!();
        eprintln!("  Starting price update for {}...", s.bold(feed_url));
        eprintln!(
            "  {}",
            s.dim("The workflow walks the whole feed; this can take a while.")
        );
    }

    let status = match webhook.start_price_update(feed_url).await {
        Ok(status) => status,
        Err(e) => {
            audit::record(
                "price_update",
                Some(feed_url),
                &format!("failed: {e}"),
                start.elapsed().as_millis() as u64,
            );
            return Err(e.into());
        }
    };

    audit::record(
        "price_update",
        Some(feed_url),
        &format!("started ({status})"),
        start.elapsed().as_millis() as u64,
    );

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "feed_url": feed_url,
            "status": status,
        }));
        return Ok(());
    }

    eprintln!();
    eprintln!(
        "  {} Price update started (status {status}, {})",
        s.ok_sym(),
        output::format_millis(start.elapsed().as_millis() as u64)
    );
    eprintln!();

    Ok(())
}
