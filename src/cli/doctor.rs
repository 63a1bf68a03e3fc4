//! Environment readiness check.
//!
//! Verifies the home directory, the settings file, configured selector
//! syntax, and reachability of the workflow endpoints. Every failure
//! includes a specific fix instruction.

use crate::cli::output::{self, Styled};
use crate::extraction::SelectorSet;
use crate::settings::{prodex_home, Settings};
use anyhow::Result;
use scraper::Selector;
use std::path::Path;
use std::time::Duration;

/// Per-endpoint probe timeout.
const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Run the full doctor diagnostic.
pub async fn run() -> Result<()> {
    if output::is_json() {
        return run_json().await;
    }

    let s = Styled::new();
    let mut ready = true;
    let mut has_warning = false;

    output::print_header(&s);

    // ── System ──────────────────────────────────────────────────────────
    output::print_section(&s, "System");

    let os = std::env::consts::OS;
    let arch = std::env::consts::ARCH;
    output::print_check(s.ok_sym(), "OS:", &format!("{os} ({arch})"));

    let home = prodex_home();
    match check_home_writable(&home) {
        Ok(()) => {
            output::print_check(
                s.ok_sym(),
                "Home:",
                &format!("{} (writable)", home.display()),
            );
        }
        Err(e) => {
            output::print_check(s.fail_sym(), "Home:", &format!("{} ({e})", home.display()));
            output::print_detail("Set PRODEX_HOME to a writable directory.");
            ready = false;
        }
    }

    eprintln!();

    // ── Settings ────────────────────────────────────────────────────────
    output::print_section(&s, "Settings");

    let settings_path = Settings::path();
    let settings = if settings_path.exists() {
        match Settings::load() {
            Ok(loaded) => {
                output::print_check(
                    s.ok_sym(),
                    "File:",
                    &format!("{} (valid)", settings_path.display()),
                );
                loaded
            }
            Err(e) => {
                output::print_check(
                    s.fail_sym(),
                    "File:",
                    &format!("{} (broken)", settings_path.display()),
                );
                output::print_detail(&e.to_string());
                output::print_detail("Fix the JSON or run 'prodex settings reset'.");
                ready = false;
                Settings::default()
            }
        }
    } else {
        output::print_check(s.info_sym(), "File:", "not created yet (defaults in use)");
        Settings::default()
    };

    let configured = configured_selector_count(&settings.selectors);
    let invalid = invalid_selector_fields(&settings.selectors);
    if configured == 0 {
        output::print_check(s.info_sym(), "Selectors:", "none configured");
    } else if invalid.is_empty() {
        output::print_check(
            s.ok_sym(),
            "Selectors:",
            &format!("{configured} configured, all valid"),
        );
    } else {
        output::print_check(
            s.fail_sym(),
            "Selectors:",
            &format!("invalid: {}", invalid.join(", ")),
        );
        output::print_detail("Fix with 'prodex settings set selectors.<field> <css>'.");
        ready = false;
    }

    eprintln!();

    // ── Endpoints ───────────────────────────────────────────────────────
    output::print_section(&s, "Endpoints");

    let probes = probe_endpoints(&settings).await;
    for probe in &probes {
        match probe.status {
            Some(code) => {
                output::print_check(
                    s.ok_sym(),
                    &format!("{}:", probe.label),
                    &format!("{} (responded {code})", probe.url),
                );
            }
            None => {
                output::print_check(
                    s.warn_sym(),
                    &format!("{}:", probe.label),
                    &format!("{} (unreachable)", probe.url),
                );
                has_warning = true;
            }
        }
    }
    if probes.iter().all(|p| p.status.is_none()) {
        output::print_detail("Is the workflow engine running?");
    }

    // Status summary
    if ready && !has_warning {
        output::print_status(&s, &s.green("READY"), "parse a page with 'prodex parse <url>'");
    } else if ready {
        output::print_status(&s, &s.yellow("READY"), "some warnings above");
    } else {
        output::print_status(&s, &s.red("NOT READY"), "fix issues above");
    }

    Ok(())
}

/// JSON output mode for doctor.
async fn run_json() -> Result<()> {
    let home = prodex_home();
    let settings_path = Settings::path();
    let settings_valid = !settings_path.exists() || Settings::load().is_ok();
    let settings = Settings::load().unwrap_or_default();
    let invalid = invalid_selector_fields(&settings.selectors);
    let probes = probe_endpoints(&settings).await;

    let json = serde_json::json!({
        "version": env!("CARGO_PKG_VERSION"),
        "os": std::env::consts::OS,
        "arch": std::env::consts::ARCH,
        "home": home.display().to_string(),
        "home_writable": check_home_writable(&home).is_ok(),
        "settings_file": settings_path.display().to_string(),
        "settings_valid": settings_valid,
        "selectors_configured": configured_selector_count(&settings.selectors),
        "selectors_invalid": invalid,
        "endpoints": probes
            .iter()
            .map(|p| {
                serde_json::json!({
                    "name": p.key,
                    "url": p.url,
                    "status": p.status,
                })
            })
            .collect::<Vec<_>>(),
    });
    output::print_json(&json);
    Ok(())
}

// ── Helper functions ────────────────────────────────────────────────────────

struct EndpointProbe {
    key: &'static str,
    label: &'static str,
    url: String,
    status: Option<u16>,
}

/// Probe all configured endpoints concurrently. Any HTTP response counts as
/// reachable, whatever the status; these are POST endpoints, so a GET often
/// legitimately answers 404.
async fn probe_endpoints(settings: &Settings) -> Vec<EndpointProbe> {
    let client = reqwest::Client::new();
    let targets = [
        ("webhook", "Webhook", settings.webhook_url.clone()),
        ("price_update", "Price update", settings.price_update_url.clone()),
        ("ai", "AI API", settings.ai_api_url.clone()),
        ("panel", "Panel API", settings.panel_api_url.clone()),
    ];

    let statuses = futures::future::join_all(
        targets.iter().map(|(_, _, url)| probe(&client, url.clone())),
    )
    .await;

    targets
        .into_iter()
        .zip(statuses)
        .map(|((key, label, url), status)| EndpointProbe {
            key,
            label,
            url,
            status,
        })
        .collect()
}

async fn probe(client: &reqwest::Client, url: String) -> Option<u16> {
    client
        .get(&url)
        .timeout(PROBE_TIMEOUT)
        .send()
        .await
        .ok()
        .map(|response| response.status().as_u16())
}

/// Verify the home directory exists (creating it if needed) and is writable.
fn check_home_writable(home: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(home)?;
    let probe = home.join(".doctor-probe");
    std::fs::write(&probe, b"ok")?;
    std::fs::remove_file(&probe)?;
    Ok(())
}

fn configured_selector_count(selectors: &SelectorSet) -> usize {
    SelectorSet::FIELDS
        .iter()
        .filter(|field| !selectors.get(field).unwrap_or("").is_empty())
        .count()
}

/// Fields whose configured selector the query engine rejects.
fn invalid_selector_fields(selectors: &SelectorSet) -> Vec<&'static str> {
    SelectorSet::FIELDS
        .iter()
        .copied()
        .filter(|field| {
            let sel = selectors.get(field).unwrap_or("");
            !sel.is_empty() && Selector::parse(sel).is_err()
        })
        .collect()
}
