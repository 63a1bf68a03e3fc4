//! Load and persist the flat settings file.

use crate::extraction::SelectorSet;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Default workflow webhook endpoint (record forwarding).
pub const DEFAULT_WEBHOOK_URL: &str = "http://localhost:5678/webhook/shop-parser";

/// Default workflow start endpoint (feed price updates).
pub const DEFAULT_PRICE_UPDATE_URL: &str = "http://localhost:5678/webhook/start-price-update";

/// Default AI completion endpoint.
pub const DEFAULT_AI_API_URL: &str = "http://localhost:8000/api/v1/ai";

/// Default admin panel API base.
pub const DEFAULT_PANEL_API_URL: &str = "http://localhost:9000/api";

/// Failures while reading, writing, or editing settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("reading {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("writing {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("settings file {path} is not valid JSON: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("unknown settings key: {0}")]
    UnknownKey(String),
    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}

/// Persisted configuration: service endpoints, the host gate, and the
/// default selector set.
///
/// Lives as pretty-printed JSON at `~/.prodex/settings.json`. Every field
/// has a default, so a missing file and a partial file both load cleanly;
/// unknown keys in the file are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub webhook_url: String,
    pub price_update_url: String,
    pub ai_api_url: String,
    pub panel_api_url: String,
    pub allow_all_hosts: bool,
    pub selectors: SelectorSet,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            webhook_url: DEFAULT_WEBHOOK_URL.to_string(),
            price_update_url: DEFAULT_PRICE_UPDATE_URL.to_string(),
            ai_api_url: DEFAULT_AI_API_URL.to_string(),
            panel_api_url: DEFAULT_PANEL_API_URL.to_string(),
            allow_all_hosts: true,
            selectors: SelectorSet::default(),
        }
    }
}

/// The prodex home directory: `$PRODEX_HOME`, or `~/.prodex`.
pub fn prodex_home() -> PathBuf {
    if let Ok(p) = std::env::var("PRODEX_HOME") {
        return PathBuf::from(p);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join(".prodex")
}

impl Settings {
    /// Path of the settings file under the prodex home.
    pub fn path() -> PathBuf {
        prodex_home().join("settings.json")
    }

    /// Load settings from the default path. A missing file yields defaults
    /// without creating anything.
    pub fn load() -> Result<Self, SettingsError> {
        Self::load_from(&Self::path())
    }

    /// Load settings from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| SettingsError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Persist to the default path, creating the home directory if needed.
    pub fn save(&self) -> Result<(), SettingsError> {
        self.save_to(&Self::path())
    }

    /// Persist to an explicit path.
    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        let write_err = |source| SettingsError::Write {
            path: path.display().to_string(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        // Settings serialization cannot fail; the type is plain strings and a bool.
        let json = serde_json::to_string_pretty(self).unwrap_or_default();
        std::fs::write(path, json + "\n").map_err(write_err)?;
        debug!(path = %path.display(), "settings saved");
        Ok(())
    }

    /// Set one key from its string form, as used by `prodex settings set`.
    ///
    /// Endpoint keys must parse as URLs; `allow_all_hosts` takes
    /// `true`/`false`; selector fields are addressed as `selectors.<field>`
    /// and accept any string (selector syntax is never validated here).
    pub fn set_key(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        match key {
            "webhook_url" | "price_update_url" | "ai_api_url" | "panel_api_url" => {
                url::Url::parse(value).map_err(|e| SettingsError::InvalidValue {
                    key: key.to_string(),
                    reason: e.to_string(),
                })?;
                let slot = match key {
                    "webhook_url" => &mut self.webhook_url,
                    "price_update_url" => &mut self.price_update_url,
                    "ai_api_url" => &mut self.ai_api_url,
                    _ => &mut self.panel_api_url,
                };
                *slot = value.to_string();
                Ok(())
            }
            "allow_all_hosts" => match value {
                "true" => {
                    self.allow_all_hosts = true;
                    Ok(())
                }
                "false" => {
                    self.allow_all_hosts = false;
                    Ok(())
                }
                other => Err(SettingsError::InvalidValue {
                    key: key.to_string(),
                    reason: format!("expected true or false, got {other}"),
                }),
            },
            _ => {
                if let Some(field) = key.strip_prefix("selectors.") {
                    if self.selectors.set(field, value) {
                        return Ok(());
                    }
                }
                Err(SettingsError::UnknownKey(key.to_string()))
            }
        }
    }

    /// All settable key names, for help text and completion.
    pub fn key_names() -> Vec<String> {
        let mut keys = vec![
            "webhook_url".to_string(),
            "price_update_url".to_string(),
            "ai_api_url".to_string(),
            "panel_api_url".to_string(),
            "allow_all_hosts".to_string(),
        ];
        for field in SelectorSet::FIELDS {
            keys.push(format!("selectors.{field}"));
        }
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_original_endpoints() {
        let s = Settings::default();
        assert_eq!(s.webhook_url, "http://localhost:5678/webhook/shop-parser");
        assert_eq!(
            s.price_update_url,
            "http://localhost:5678/webhook/start-price-update"
        );
        assert_eq!(s.ai_api_url, "http://localhost:8000/api/v1/ai");
        assert_eq!(s.panel_api_url, "http://localhost:9000/api");
        assert!(s.allow_all_hosts);
        assert!(s.selectors.is_empty());
    }

    #[test]
    fn test_load_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let s = Settings::load_from(&path).unwrap();
        assert_eq!(s, Settings::default());
        // load never creates the file
        assert!(!path.exists());
    }

    #[test]
    fn test_save_and_reload_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let mut s = Settings::default();
        s.set_key("webhook_url", "https://flows.example/hook").unwrap();
        s.set_key("selectors.title", "h1.product").unwrap();
        s.save_to(&path).unwrap();

        let loaded = Settings::load_from(&path).unwrap();
        assert_eq!(loaded.webhook_url, "https://flows.example/hook");
        assert_eq!(loaded.selectors.title, "h1.product");
        assert_eq!(loaded.ai_api_url, DEFAULT_AI_API_URL);
    }

    #[test]
    fn test_load_tolerates_partial_and_unknown_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"webhook_url": "http://localhost:9999/hook", "legacy_key": 42}"#,
        )
        .unwrap();

        let s = Settings::load_from(&path).unwrap();
        assert_eq!(s.webhook_url, "http://localhost:9999/hook");
        assert_eq!(s.ai_api_url, DEFAULT_AI_API_URL);
        assert!(s.allow_all_hosts);
    }

    #[test]
    fn test_load_rejects_broken_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = Settings::load_from(&path).unwrap_err();
        assert!(matches!(err, SettingsError::Parse { .. }));
    }

    #[test]
    fn test_set_key_validates() {
        let mut s = Settings::default();

        assert!(s.set_key("ai_api_url", "not a url").is_err());
        assert!(s.set_key("allow_all_hosts", "maybe").is_err());
        assert!(matches!(
            s.set_key("webhook", "http://x"),
            Err(SettingsError::UnknownKey(_))
        ));
        assert!(matches!(
            s.set_key("selectors.weight", ".x"),
            Err(SettingsError::UnknownKey(_))
        ));

        s.set_key("allow_all_hosts", "false").unwrap();
        assert!(!s.allow_all_hosts);
        s.set_key("selectors.price", ".price").unwrap();
        assert_eq!(s.selectors.price, ".price");
    }

    #[test]
    fn test_key_names_cover_selector_fields() {
        let keys = Settings::key_names();
        assert!(keys.contains(&"webhook_url".to_string()));
        assert!(keys.contains(&"selectors.specs".to_string()));
        assert_eq!(keys.len(), 9);
    }
}
