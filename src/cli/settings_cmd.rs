//! CLI handlers for `prodex settings [show|set|reset|path]`.

use crate::cli::output::{self, Styled};
use crate::extraction::SelectorSet;
use crate::settings::{Settings, SettingsError};
use anyhow::Result;

/// Show all settings.
pub fn run_show() -> Result<()> {
    let settings = Settings::load()?;

    if output::is_json() {
        output::print_json(&serde_json::to_value(&settings)?);
        return Ok(());
    }

    let s = Styled::new();
    eprintln!();
    output::print_section(&s, "Endpoints");
    print_kv("webhook_url", &settings.webhook_url);
    print_kv("price_update_url", &settings.price_update_url);
    print_kv("ai_api_url", &settings.ai_api_url);
    print_kv("panel_api_url", &settings.panel_api_url);
    eprintln!();

    output::print_section(&s, "Fetching");
    print_kv("allow_all_hosts", &settings.allow_all_hosts.to_string());
    eprintln!();

    output::print_section(&s, "Selectors");
    for field in SelectorSet::FIELDS {
        let value = settings.selectors.get(field).unwrap_or("");
        let shown = if value.is_empty() {
            s.dim("(not set)")
        } else {
            value.to_string()
        };
        print_kv(&format!("selectors.{field}"), &shown);
    }
    eprintln!();
    eprintln!(
        "  {}",
        s.dim(&format!("File: {}", Settings::path().display()))
    );
    eprintln!();

    Ok(())
}

/// Set one settings key and persist.
pub fn run_set(key: &str, value: &str) -> Result<()> {
    let mut settings = Settings::load()?;
    settings.set_key(key, value).map_err(|e| match e {
        SettingsError::UnknownKey(_) => {
            anyhow::anyhow!("{e}\n  valid keys: {}", Settings::key_names().join(", "))
        }
        other => other.into(),
    })?;
    settings.save()?;

    if output::is_json() {
        output::print_json(&serde_json::json!({ "key": key, "value": value }));
        return Ok(());
    }

    let s = Styled::new();
    eprintln!("  {} {key} = {value}", s.ok_sym());
    Ok(())
}

/// Reset all settings to defaults.
pub fn run_reset() -> Result<()> {
    let settings = Settings::default();
    settings.save()?;

    if output::is_json() {
        output::print_json(&serde_json::to_value(&settings)?);
        return Ok(());
    }

    let s = Styled::new();
    eprintln!("  {} Settings reset to defaults.", s.ok_sym());
    Ok(())
}

/// Print the settings file path.
pub fn run_path() -> Result<()> {
    if output::is_json() {
        output::print_json(&serde_json::json!({
            "path": Settings::path().display().to_string(),
        }));
        return Ok(());
    }

    println!("{}", Settings::path().display());
    Ok(())
}

fn print_kv(key: &str, value: &str) {
    eprintln!("    {key:<24} {value}");
}
