// Copyright 2026 Prodex Contributors
// SPDX-License-Identifier: Apache-2.0

//! Interactive panel for prodex — slash command interface over a session.
//!
//! Launch with `prodex` (no subcommand) to enter the interactive mode.
//! Type `/help` for available commands, Tab for completion.

use crate::cli::output::Styled;
use crate::cli::panel_commands;
use crate::cli::panel_complete;
use crate::extraction::SelectorSet;
use crate::settings::{prodex_home, Settings};
use anyhow::Result;
use rustyline::config::CompletionType;
use rustyline::error::ReadlineError;
use rustyline::{Config, Editor};

/// History file location.
fn history_path() -> std::path::PathBuf {
    prodex_home().join("panel_history")
}

/// Print the welcome banner with a settings summary.
fn print_banner(settings: &Settings) {
    let s = Styled::new();

    eprintln!();
    eprintln!(
        "  {} {} {}",
        s.green("\u{25c9}"),
        s.bold(&format!("Prodex v{}", env!("CARGO_PKG_VERSION"))),
        s.dim("— Structured Page Extractor")
    );

    let configured = SelectorSet::FIELDS
        .iter()
        .filter(|field| !settings.selectors.get(field).unwrap_or("").is_empty())
        .count();
    let runs = count_history_runs();

    eprintln!(
        "    Webhook: {} | Selectors: {configured} configured | History: {runs} run(s)",
        settings.webhook_url
    );

    eprintln!();
    eprintln!(
        "    Press {} to browse commands, {} to complete, {} to quit.",
        s.cyan("/"),
        s.dim("Tab"),
        s.dim("/exit")
    );
    eprintln!();
}

/// Count logged operations in the history file.
fn count_history_runs() -> usize {
    std::fs::read_to_string(prodex_home().join("history.jsonl"))
        .map(|raw| raw.lines().filter(|line| !line.trim().is_empty()).count())
        .unwrap_or(0)
}

/// Run the interactive panel.
pub async fn run() -> Result<()> {
    let settings = Settings::load().unwrap_or_else(|e| {
        let s = Styled::new();
        eprintln!("  {} {e} (using defaults)", s.warn_sym());
        Settings::default()
    });

    // Print welcome banner
    print_banner(&settings);

    // Configure rustyline with List completion (shows all matches like Bash)
    let config = Config::builder()
        .history_ignore_space(true)
        .auto_add_history(true)
        .completion_type(CompletionType::List)
        .completion_prompt_limit(20)
        .build();

    let helper = panel_complete::PanelHelper::new();
    let mut rl: Editor<panel_complete::PanelHelper, rustyline::history::DefaultHistory> =
        Editor::with_config(config)?;
    rl.set_helper(Some(helper));

    // Load history
    let hist_path = history_path();
    if hist_path.exists() {
        let _ = rl.load_history(&hist_path);
    }

    // Session state
    let mut state = panel_commands::PanelState::new(settings);

    // Main panel loop
    let prompt = format!(
        " {} ",
        if Styled::new().ok_sym() == "OK" {
            "prodex>"
        } else {
            "\x1b[36mprodex>\x1b[0m"
        }
    );

    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                // Dispatch command
                match panel_commands::execute(line, &mut state).await {
                    Ok(true) => {
                        // /exit was called
                        let s = Styled::new();
                        eprintln!("  {} Goodbye!", s.dim("\u{2728}"));
                        break;
                    }
                    Ok(false) => {
                        // Continue panel
                    }
                    Err(e) => {
                        let s = Styled::new();
                        eprintln!("  {} {e:#}", s.fail_sym());
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C — don't exit, just show hint
                let s = Styled::new();
                eprintln!("  {} Type {} to quit.", s.dim("(Ctrl+C)"), s.bold("/exit"));
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D — exit
                let s = Styled::new();
                eprintln!("  {} Goodbye!", s.dim("\u{2728}"));
                break;
            }
            Err(err) => {
                eprintln!("  Error: {err}");
                break;
            }
        }
    }

    // Save history
    let _ = std::fs::create_dir_all(hist_path.parent().unwrap_or(std::path::Path::new(".")));
    let _ = rl.save_history(&hist_path);

    Ok(())
}
