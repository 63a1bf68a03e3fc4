//! Persisted configuration: service endpoints, host gate, default selectors.

pub mod store;

pub use store::{
    prodex_home, Settings, SettingsError, DEFAULT_AI_API_URL, DEFAULT_PANEL_API_URL,
    DEFAULT_PRICE_UPDATE_URL, DEFAULT_WEBHOOK_URL,
};
