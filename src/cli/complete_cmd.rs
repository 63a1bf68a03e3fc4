//! CLI handler for `prodex complete <url-or-file>`.

use crate::acquisition;
use crate::audit;
use crate::cli::output::{self, Styled};
use crate::cli::parse_cmd;
use crate::extraction::{self, SelectorSet};
use crate::forward::{self, AiClient, WebhookClient};
use crate::settings::Settings;
use anyhow::Result;
use std::time::Instant;

/// Parse a page, fill missing specs via the AI endpoint, optionally forward.
pub async fn run(target: &str, overrides: &SelectorSet, send: bool) -> Result<()> {
    let s = Styled::new();
    let start = Instant::now();

    let settings = Settings::load()?;
    let selectors = settings.selectors.overlaid_with(overrides);

    let client = acquisition::client();
    let snapshot = acquisition::acquire(&client, target, settings.allow_all_hosts).await?;
    let record = extraction::extract(&snapshot.parse(), &selectors).with_url(&snapshot.url);

    let ai = AiClient::from_settings(&settings).with_client(client.clone());
    let completion = match ai.complete(&record).await {
        Ok(c) => c,
        Err(e) => {
            audit::record(
                "complete",
                Some(&snapshot.url),
                &format!("failed: {e}"),
                start.elapsed().as_millis() as u64,
            );
            return Err(e.into());
        }
    };

    let merged = forward::merge_completion(&record, &completion);
    let filled = completion.specs_filled.as_ref().map(|v| v.len()).unwrap_or(0);
    let mut outcome = format!("specs_filled={filled}");

    let reply = if send {
        let webhook = WebhookClient::from_settings(&settings).with_client(client);
        match webhook.send_record(&merged).await {
            Ok(r) => {
                outcome.push_str(" sent");
                Some(r)
            }
            Err(e) => {
                audit::record(
                    "complete",
                    Some(&snapshot.url),
                    &format!("{outcome} send failed: {e}"),
                    start.elapsed().as_millis() as u64,
                );
                return Err(e.into());
            }
        }
    } else {
        None
    };

    audit::record(
        "complete",
        Some(&snapshot.url),
        &outcome,
        start.elapsed().as_millis() as u64,
    );

    if output::is_json() {
        let mut json = serde_json::json!({ "record": merged });
        if let Some(reply) = &reply {
            json["reply"] = reply.clone();
        }
        output::print_json(&json);
        return Ok(());
    }

    eprintln!();
    parse_cmd::print_record(&s, &record);
    eprintln!();
    eprintln!("  {}", s.bold("Completion"));
    match &completion.specs_filled {
        Some(pairs) if !pairs.is_empty() => {
            eprintln!("    {} {} spec(s) filled:", s.ok_sym(), pairs.len());
            let name_width = pairs.iter().map(|p| p.name.len()).max().unwrap_or(0);
            for pair in pairs {
                eprintln!("      {:<width$}  {}", pair.name, pair.value, width = name_width);
            }
        }
        _ => eprintln!("    {} nothing to fill", s.info_sym()),
    }
    if let Some(notes) = &completion.notes {
        eprintln!("    {} {notes}", s.dim("Notes:"));
    }
    if send {
        eprintln!();
        eprintln!(
            "  {} Forwarded merged record to {}",
            s.ok_sym(),
            s.bold(&settings.webhook_url)
        );
    }
    eprintln!();

    Ok(())
}
