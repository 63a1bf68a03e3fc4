//! CLI handler for `prodex send <url-or-file>`.

use crate::acquisition;
use crate::audit;
use crate::cli::output::{self, Styled};
use crate::cli::parse_cmd;
use crate::extraction::{self, SelectorSet};
use crate::forward::WebhookClient;
use crate::settings::Settings;
use anyhow::Result;
use std::time::Instant;

/// Parse a product page and forward the record to the workflow webhook.
pub async fn run(target: &str, overrides: &SelectorSet) -> Result<()> {
    let s = Styled::new();
    let start = Instant::now();

    let settings = Settings::load()?;
    let selectors = settings.selectors.overlaid_with(overrides);

    let client = acquisition::client();
    let snapshot = acquisition::acquire(&client, target, settings.allow_all_hosts).await?;
    let record = extraction::extract(&snapshot.parse(), &selectors).with_url(&snapshot.url);

    let webhook = WebhookClient::from_settings(&settings).with_client(client);
    let reply = match webhook.send_record(&record).await {
        Ok(reply) => reply,
        Err(e) => {
            audit::record(
                "send",
                Some(&snapshot.url),
                &format!("failed: {e}"),
                start.elapsed().as_millis() as u64,
            );
            return Err(e.into());
        }
    };

    audit::record(
        "send",
        Some(&snapshot.url),
        "sent",
        start.elapsed().as_millis() as u64,
    );

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "record": record,
            "reply": reply,
        }));
        return Ok(());
    }

    eprintln!();
    parse_cmd::print_record(&s, &record);
    eprintln!();
    eprintln!(
        "  {} Sent to {} in {}",
        s.ok_sym(),
        s.bold(&settings.webhook_url),
        output::format_millis(start.elapsed().as_millis() as u64)
    );
    if reply != serde_json::json!({}) {
        eprintln!("  {} {}", s.dim("Reply:"), s.dim(&output::truncate(&reply.to_string(), 120)));
    }
    eprintln!();

    Ok(())
}
