// Copyright 2026 Prodex Contributors
// SPDX-License-Identifier: Apache-2.0

//! Tab completion for the prodex interactive panel.
//!
//! Provides context-aware completion for slash commands, selector field
//! names, and settings keys.

use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::Helper;

use crate::extraction::SelectorSet;
use crate::settings::Settings;

/// All available panel slash commands.
pub const COMMANDS: &[(&str, &str)] = &[
    ("/open", "Fetch a product page into the session"),
    ("/selector", "Set one selector field for this session"),
    ("/selectors", "Show session selectors with live match counts"),
    ("/preview", "Preview what a selector matches on the open page"),
    ("/parse", "Extract a record from the open page"),
    ("/send", "Forward the parsed record to the workflow"),
    ("/complete", "Fill missing specs via the AI endpoint"),
    ("/update", "Start a feed-wide price update"),
    ("/settings", "Show or change persisted settings"),
    ("/history", "Show recent operations"),
    ("/doctor", "Check environment and endpoints"),
    ("/clear", "Clear the screen"),
    ("/help", "Show available commands"),
    ("/exit", "Quit the panel"),
];

/// Prodex panel helper providing tab completion.
pub struct PanelHelper;

impl PanelHelper {
    pub fn new() -> Self {
        Self
    }
}

/// Suggest the closest command for a mistyped name: prefix match first,
/// then substring.
pub fn suggest_command(cmd: &str) -> Option<&'static str> {
    if cmd.is_empty() {
        return None;
    }
    COMMANDS
        .iter()
        .map(|(name, _)| *name)
        .find(|name| name[1..].starts_with(cmd))
        .or_else(|| {
            COMMANDS
                .iter()
                .map(|(name, _)| *name)
                .find(|name| name[1..].contains(cmd))
        })
}

impl Completer for PanelHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let input = &line[..pos];

        // Complete command names if input starts with /
        if !input.contains(' ') {
            let matches: Vec<Pair> = COMMANDS
                .iter()
                .filter(|(cmd, _)| cmd.starts_with(input))
                .map(|(cmd, desc)| Pair {
                    display: format!("{cmd:<12} {desc}"),
                    replacement: format!("{cmd} "),
                })
                .collect();
            return Ok((0, matches));
        }

        // Split into command and args
        let parts: Vec<&str> = input.splitn(2, ' ').collect();
        let cmd = parts[0];
        let args = if parts.len() > 1 { parts[1] } else { "" };

        match cmd {
            // Field name completion for /selector
            "/selector" => {
                let prefix_start = input.len() - args.len();
                let matches: Vec<Pair> = SelectorSet::FIELDS
                    .iter()
                    .filter(|field| field.starts_with(args.trim()))
                    .map(|field| Pair {
                        display: field.to_string(),
                        replacement: format!("{field} "),
                    })
                    .collect();
                Ok((prefix_start, matches))
            }

            // Action and key completion for /settings
            "/settings" => {
                if let Some(rest) = args.strip_prefix("set ") {
                    let prefix_start = input.len() - rest.len();
                    let matches: Vec<Pair> = Settings::key_names()
                        .into_iter()
                        .filter(|key| key.starts_with(rest.trim()))
                        .map(|key| Pair {
                            display: key.clone(),
                            replacement: format!("{key} "),
                        })
                        .collect();
                    return Ok((prefix_start, matches));
                }

                let prefix_start = input.len() - args.len();
                let matches: Vec<Pair> = ["set", "reset"]
                    .iter()
                    .filter(|action| action.starts_with(args.trim()))
                    .map(|action| Pair {
                        display: action.to_string(),
                        replacement: format!("{action} "),
                    })
                    .collect();
                Ok((prefix_start, matches))
            }

            _ => Ok((pos, Vec::new())),
        }
    }
}

impl Hinter for PanelHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &rustyline::Context<'_>) -> Option<String> {
        if pos < line.len() || line.is_empty() {
            return None;
        }
        // Show first matching command as ghost text
        if line.starts_with('/') && !line.contains(' ') {
            for (cmd, _) in COMMANDS {
                if cmd.starts_with(line) && *cmd != line {
                    return Some(cmd[line.len()..].to_string());
                }
            }
        }
        None
    }
}

impl Highlighter for PanelHelper {}
impl Validator for PanelHelper {}
impl Helper for PanelHelper {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suggest_command() {
        assert_eq!(suggest_command("sel"), Some("/selector"));
        assert_eq!(suggest_command("selectors"), Some("/selectors"));
        assert_eq!(suggest_command("octor"), Some("/doctor"));
        assert_eq!(suggest_command("zzz"), None);
        assert_eq!(suggest_command(""), None);
    }
}
