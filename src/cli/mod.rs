//! CLI subcommand implementations for the prodex binary.

pub mod complete_cmd;
pub mod doctor;
pub mod history_cmd;
pub mod output;
pub mod panel;
pub mod panel_commands;
pub mod panel_complete;
pub mod panel_progress;
pub mod parse_cmd;
pub mod preview_cmd;
pub mod send_cmd;
pub mod settings_cmd;
pub mod update_cmd;
