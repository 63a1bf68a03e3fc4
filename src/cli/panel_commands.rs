// Copyright 2026 Prodex Contributors
// SPDX-License-Identifier: Apache-2.0

//! Slash command parsing and dispatch for the prodex panel.
//!
//! Each slash command maps to functionality from the existing CLI commands,
//! adapted for the interactive session context (open page, session
//! selectors, last parsed record).

use crate::acquisition::{self, PageSnapshot};
use crate::audit;
use crate::cli::output::{self, Styled};
use crate::cli::panel_complete::COMMANDS;
use crate::cli::panel_progress;
use crate::cli::parse_cmd;
use crate::extraction::{self, ExtractReport, ProductRecord, SelectorSet};
use crate::forward::{self, AiClient, WebhookClient};
use crate::settings::{Settings, SettingsError};
use anyhow::Result;
use std::time::Instant;

/// Session state preserved across commands.
pub struct PanelState {
    /// Persisted settings, loaded once at panel start.
    pub settings: Settings,
    /// Selectors for this session; starts from settings, edited via /selector.
    pub selectors: SelectorSet,
    /// Currently open page, if any.
    pub snapshot: Option<PageSnapshot>,
    /// Most recent /parse result.
    pub last_record: Option<ProductRecord>,
}

impl PanelState {
    pub fn new(settings: Settings) -> Self {
        let selectors = settings.selectors.clone();
        Self {
            settings,
            selectors,
            snapshot: None,
            last_record: None,
        }
    }
}

/// Parse and execute a slash command. Returns `true` if the panel should exit.
pub async fn execute(input: &str, state: &mut PanelState) -> Result<bool> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(false);
    }

    // Strip leading / if present
    let input = input.strip_prefix('/').unwrap_or(input);

    // Bare `/` with nothing else → show help
    if input.is_empty() {
        cmd_help();
        return Ok(false);
    }

    // Split into command and arguments
    let mut parts = input.splitn(2, ' ');
    let cmd = parts.next().unwrap_or("");
    let args = parts.next().unwrap_or("").trim();

    match cmd {
        "exit" | "quit" | "q" => return Ok(true),
        "help" | "h" | "?" => cmd_help(),
        "clear" | "cls" => cmd_clear(),
        "open" | "o" => cmd_open(args, state).await?,
        "selector" | "sel" => cmd_selector(args, state)?,
        "selectors" => cmd_selectors(state)?,
        "preview" | "p" => cmd_preview(args, state)?,
        "parse" => cmd_parse(state)?,
        "send" => cmd_send(state).await?,
        "complete" => cmd_complete(args, state).await?,
        "update" => cmd_update(args, state).await?,
        "settings" | "config" => cmd_settings(args, state)?,
        "history" => cmd_history(args)?,
        "doctor" => cmd_doctor().await?,
        _ => {
            let s = Styled::new();
            if let Some(suggestion) = crate::cli::panel_complete::suggest_command(cmd) {
                eprintln!(
                    "  {} Unknown command '/{cmd}'. Did you mean {}?",
                    s.warn_sym(),
                    s.bold(suggestion)
                );
            } else {
                eprintln!(
                    "  {} Unknown command '/{cmd}'. Type {} or press {} for commands.",
                    s.warn_sym(),
                    s.bold("/help"),
                    s.bold("/")
                );
            }
        }
    }

    Ok(false)
}

/// /help — Show available commands.
fn cmd_help() {
    let s = Styled::new();
    eprintln!();
    eprintln!("  {}", s.bold("Commands:"));
    eprintln!();
    for (cmd, desc) in COMMANDS {
        eprintln!("    {:<20} {}", s.cyan(cmd), s.dim(desc));
    }
    eprintln!();
    eprintln!(
        "  {}",
        s.dim("Tip: Tab completion works for commands, selector fields, and settings keys.")
    );
    eprintln!();
}

/// /clear — Clear the terminal.
fn cmd_clear() {
    // ANSI escape to clear screen and move cursor to top-left
    eprint!("\x1b[2J\x1b[H");
}

/// /open <url-or-file> — Fetch a page into the session.
async fn cmd_open(args: &str, state: &mut PanelState) -> Result<()> {
    let s = Styled::new();

    if args.is_empty() {
        eprintln!("  {} Usage: {}", s.info_sym(), s.bold("/open <url-or-file>"));
        return Ok(());
    }

    let target = args.split_whitespace().next().unwrap_or(args);
    let bar = panel_progress::create_spinner(&format!("Fetching {target}..."));

    let client = acquisition::client();
    match acquisition::acquire(&client, target, state.settings.allow_all_hosts).await {
        Ok(snapshot) => {
            let size = output::format_size(snapshot.html.len() as u64);
            let origin = if snapshot.status == 0 {
                "local file".to_string()
            } else {
                format!("status {}", snapshot.status)
            };
            panel_progress::finish_done(
                &bar,
                &format!("Opened {} ({origin}, {size})", snapshot.url),
            );
            state.snapshot = Some(snapshot);
            // A new page invalidates the previous parse
            state.last_record = None;
            eprintln!(
                "    Try: {} or {}",
                s.cyan("/preview <css>"),
                s.cyan("/parse")
            );
        }
        Err(e) => {
            panel_progress::finish_failed(&bar, &format!("Fetch failed: {e}"));
        }
    }

    Ok(())
}

/// /selector <field> <css> — Set one session selector.
fn cmd_selector(args: &str, state: &mut PanelState) -> Result<()> {
    let s = Styled::new();

    let mut parts = args.splitn(2, ' ');
    let field = parts.next().unwrap_or("");
    let css = parts.next().unwrap_or("").trim();

    if field.is_empty() || css.is_empty() {
        eprintln!(
            "  {} Usage: {}",
            s.info_sym(),
            s.bold("/selector <title|price|images|specs> <css>")
        );
        return Ok(());
    }

    if !state.selectors.set(field, css) {
        eprintln!(
            "  {} Unknown field '{field}'. Fields: {}",
            s.warn_sym(),
            SelectorSet::FIELDS.join(", ")
        );
        return Ok(());
    }

    match &state.snapshot {
        Some(snapshot) => {
            let report = extraction::preview(&snapshot.parse(), css);
            let sym = if report.error.is_some() {
                s.fail_sym()
            } else if report.count > 0 {
                s.ok_sym()
            } else {
                s.warn_sym()
            };
            eprintln!("  {sym} {field} = {} ({})", s.bold(css), report.status_line());
        }
        None => {
            eprintln!(
                "  {} {field} = {} {}",
                s.ok_sym(),
                s.bold(css),
                s.dim("(no page open to test against)")
            );
        }
    }

    Ok(())
}

/// /selectors — Show session selectors with live match counts.
fn cmd_selectors(state: &PanelState) -> Result<()> {
    let s = Styled::new();
    let doc = state.snapshot.as_ref().map(|snap| snap.parse());

    eprintln!();
    for field in SelectorSet::FIELDS {
        let css = state.selectors.get(field).unwrap_or("");
        if css.is_empty() {
            eprintln!("    {} {}", s.bold(&format!("{field:<7}")), s.dim("(not set)"));
            continue;
        }
        match &doc {
            Some(doc) => {
                let report = extraction::preview(doc, css);
                let status = if report.error.is_some() {
                    s.red(&report.status_line())
                } else if report.count > 0 {
                    s.green(&report.status_line())
                } else {
                    s.yellow(&report.status_line())
                };
                eprintln!("    {} {css:<32} {status}", s.bold(&format!("{field:<7}")));
            }
            None => eprintln!("    {} {css}", s.bold(&format!("{field:<7}"))),
        }
    }
    eprintln!();
    if state.snapshot.is_none() {
        eprintln!(
            "    {}",
            s.dim("Open a page with /open to see live match counts.")
        );
        eprintln!();
    }

    Ok(())
}

/// /preview <css|field> — Preview selector matches on the open page.
fn cmd_preview(args: &str, state: &PanelState) -> Result<()> {
    let s = Styled::new();

    if args.is_empty() {
        eprintln!("  {} Usage: {}", s.info_sym(), s.bold("/preview <css|field>"));
        return Ok(());
    }
    let snapshot = match &state.snapshot {
        Some(snap) => snap,
        None => {
            eprintln!(
                "  {} No page open. Open one with: {}",
                s.warn_sym(),
                s.bold("/open <url>")
            );
            return Ok(());
        }
    };

    // A bare field name previews that field's session selector
    let css = match state.selectors.get(args) {
        Some(sel) if !sel.is_empty() => sel,
        Some(_) => {
            eprintln!(
                "  {} No selector set for '{args}'. Set one with: {}",
                s.warn_sym(),
                s.bold(&format!("/selector {args} <css>"))
            );
            return Ok(());
        }
        None => args,
    };

    let report = extraction::preview(&snapshot.parse(), css);
    if let Some(error) = &report.error {
        eprintln!("  {} {error}", s.fail_sym());
        return Ok(());
    }

    let sym = if report.count > 0 { s.ok_sym() } else { s.warn_sym() };
    eprintln!("  {sym} {} for {}", report.status_line(), s.bold(css));
    for (i, entry) in report.matches.iter().take(8).enumerate() {
        let tag = format!("<{}>", entry.tag);
        let text = if entry.text.is_empty() {
            s.dim("(no text)")
        } else {
            output::truncate(&entry.text, 60)
        };
        eprintln!("    {:>2}. {} {}", i + 1, s.cyan(&format!("{tag:<10}")), text);
    }
    if report.matches.len() > 8 {
        eprintln!(
            "    {}",
            s.dim(&format!("... +{} more", report.matches.len() - 8))
        );
    }

    Ok(())
}

/// /parse — Extract a record from the open page.
fn cmd_parse(state: &mut PanelState) -> Result<()> {
    let s = Styled::new();

    let snapshot = match &state.snapshot {
        Some(snap) => snap,
        None => {
            eprintln!(
                "  {} No page open. Open one with: {}",
                s.warn_sym(),
                s.bold("/open <url>")
            );
            return Ok(());
        }
    };
    if state.selectors.is_empty() {
        eprintln!(
            "  {} No selectors set. Set one with: {}",
            s.warn_sym(),
            s.bold("/selector title h1")
        );
        return Ok(());
    }

    let start = Instant::now();
    let ExtractReport { record, fields } =
        extraction::extract_report(&snapshot.parse(), &state.selectors);
    let record = record.with_url(&snapshot.url);

    audit::record(
        "parse",
        Some(&snapshot.url),
        &record.outcome_summary(),
        start.elapsed().as_millis() as u64,
    );

    eprintln!();
    parse_cmd::print_record(&s, &record);

    if fields.any_invalid() {
        eprintln!();
        for (field, outcome) in fields.iter() {
            if outcome.is_invalid() {
                eprintln!("    {} {field}: {}", s.fail_sym(), outcome.describe());
            }
        }
    }
    eprintln!();

    state.last_record = Some(record);
    Ok(())
}

/// /send — Forward the last parsed record to the workflow webhook,
/// parsing the open page first when nothing has been parsed yet.
async fn cmd_send(state: &mut PanelState) -> Result<()> {
    let s = Styled::new();

    if state.last_record.is_none() && state.snapshot.is_some() && !state.selectors.is_empty() {
        cmd_parse(state)?;
    }
    let record = match &state.last_record {
        Some(record) => record,
        None => {
            eprintln!(
                "  {} Nothing to send. Open a page with {} and set selectors first.",
                s.warn_sym(),
                s.bold("/open <url>")
            );
            return Ok(());
        }
    };

    let start = Instant::now();
    let bar = panel_progress::create_spinner("Forwarding to workflow...");
    let webhook = WebhookClient::from_settings(&state.settings);
    match webhook.send_record(record).await {
        Ok(reply) => {
            panel_progress::finish_done(&bar, &format!("Sent to {}", state.settings.webhook_url));
            if reply != serde_json::json!({}) {
                eprintln!("    {}", s.dim(&output::truncate(&reply.to_string(), 120)));
            }
            audit::record(
                "send",
                Some(&record.url),
                "sent",
                start.elapsed().as_millis() as u64,
            );
        }
        Err(e) => {
            panel_progress::finish_failed(&bar, &format!("Send failed: {e}"));
            audit::record(
                "send",
                Some(&record.url),
                &format!("failed: {e}"),
                start.elapsed().as_millis() as u64,
            );
        }
    }

    Ok(())
}

/// /complete [send] — Fill missing specs via the AI endpoint,
/// parsing the open page first when nothing has been parsed yet.
async fn cmd_complete(args: &str, state: &mut PanelState) -> Result<()> {
    let s = Styled::new();

    if state.last_record.is_none() && state.snapshot.is_some() && !state.selectors.is_empty() {
        cmd_parse(state)?;
    }
    let record = match &state.last_record {
        Some(record) => record,
        None => {
            eprintln!(
                "  {} Nothing to complete. Open a page with {} and set selectors first.",
                s.warn_sym(),
                s.bold("/open <url>")
            );
            return Ok(());
        }
    };
    let forward_after = args
        .split_whitespace()
        .any(|arg| arg == "send" || arg == "--send");

    let start = Instant::now();
    let bar = panel_progress::create_spinner("Asking the AI endpoint...");
    let ai = AiClient::from_settings(&state.settings);
    let completion = match ai.complete(record).await {
        Ok(completion) => completion,
        Err(e) => {
            panel_progress::finish_failed(&bar, &format!("Completion failed: {e}"));
            audit::record(
                "complete",
                Some(&record.url),
                &format!("failed: {e}"),
                start.elapsed().as_millis() as u64,
            );
            return Ok(());
        }
    };

    let filled = completion.specs_filled.as_ref().map(|v| v.len()).unwrap_or(0);
    panel_progress::finish_done(&bar, &format!("Completion received ({filled} spec(s) filled)"));

    if let Some(pairs) = &completion.specs_filled {
        let name_width = pairs.iter().map(|p| p.name.len()).max().unwrap_or(0);
        for pair in pairs {
            eprintln!("      {:<width$}  {}", pair.name, pair.value, width = name_width);
        }
    }
    if let Some(notes) = &completion.notes {
        eprintln!("    {} {notes}", s.dim("Notes:"));
    }

    let mut outcome = format!("specs_filled={filled}");
    if forward_after {
        let merged = forward::merge_completion(record, &completion);
        let bar = panel_progress::create_spinner("Forwarding merged record...");
        let webhook = WebhookClient::from_settings(&state.settings);
        match webhook.send_record(&merged).await {
            Ok(_) => {
                panel_progress::finish_done(
                    &bar,
                    &format!("Sent to {}", state.settings.webhook_url),
                );
                outcome.push_str(" sent");
            }
            Err(e) => {
                panel_progress::finish_failed(&bar, &format!("Send failed: {e}"));
                outcome.push_str(" send_failed");
            }
        }
    }

    audit::record(
        "complete",
        Some(&record.url),
        &outcome,
        start.elapsed().as_millis() as u64,
    );
    Ok(())
}

/// /update <feed-url> — Start a feed-wide price update.
async fn cmd_update(args: &str, state: &PanelState) -> Result<()> {
    let s = Styled::new();

    if args.is_empty() {
        eprintln!("  {} Usage: {}", s.info_sym(), s.bold("/update <feed-url>"));
        return Ok(());
    }
    let feed_url = args.split_whitespace().next().unwrap_or(args);

    let start = Instant::now();
    let bar = panel_progress::create_spinner("Starting price update (can take a while)...");
    let webhook = WebhookClient::from_settings(&state.settings);
    match webhook.start_price_update(feed_url).await {
        Ok(status) => {
            panel_progress::finish_done(&bar, &format!("Price update started (status {status})"));
            audit::record(
                "price_update",
                Some(feed_url),
                &format!("started ({status})"),
                start.elapsed().as_millis() as u64,
            );
        }
        Err(e) => {
            panel_progress::finish_failed(&bar, &format!("Price update failed: {e}"));
            audit::record(
                "price_update",
                Some(feed_url),
                &format!("failed: {e}"),
                start.elapsed().as_millis() as u64,
            );
        }
    }

    Ok(())
}

/// /settings [set <key> <value>|reset] — Show or change persisted settings.
fn cmd_settings(args: &str, state: &mut PanelState) -> Result<()> {
    let s = Styled::new();

    if args.is_empty() {
        return crate::cli::settings_cmd::run_show();
    }

    let mut parts = args.splitn(3, ' ');
    match parts.next().unwrap_or("") {
        "set" => {
            let key = parts.next().unwrap_or("");
            let value = parts.next().unwrap_or("").trim();
            if key.is_empty() || value.is_empty() {
                eprintln!(
                    "  {} Usage: {}",
                    s.info_sym(),
                    s.bold("/settings set <key> <value>")
                );
                return Ok(());
            }
            match state.settings.set_key(key, value) {
                Ok(()) => {
                    state.settings.save()?;
                    // Keep the session selectors in step with persisted defaults
                    if let Some(field) = key.strip_prefix("selectors.") {
                        state.selectors.set(field, value);
                    }
                    eprintln!("  {} {key} = {value}", s.ok_sym());
                }
                Err(e) => {
                    eprintln!("  {} {e}", s.fail_sym());
                    if matches!(e, SettingsError::UnknownKey(_)) {
                        eprintln!(
                            "    {}",
                            s.dim(&format!("Valid keys: {}", Settings::key_names().join(", ")))
                        );
                    }
                }
            }
        }
        "reset" => {
            state.settings = Settings::default();
            state.settings.save()?;
            state.selectors = SelectorSet::default();
            eprintln!("  {} Settings reset to defaults.", s.ok_sym());
        }
        other => {
            eprintln!(
                "  {} Unknown settings action '{other}'. Usage: {}",
                s.warn_sym(),
                s.bold("/settings [set <key> <value>|reset]")
            );
        }
    }

    Ok(())
}

/// /history [n] — Show recent operations.
fn cmd_history(args: &str) -> Result<()> {
    let limit = args
        .split_whitespace()
        .next()
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(10);
    crate::cli::history_cmd::run(limit)
}

/// /doctor — Environment diagnostics.
async fn cmd_doctor() -> Result<()> {
    crate::cli::doctor::run().await
}
