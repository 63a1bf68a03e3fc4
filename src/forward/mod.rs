//! Forwarding clients for the external workflow and AI services.
//!
//! prodex does not implement these services, only their callers: a webhook
//! POST for parsed records, a workflow trigger for feed price updates, and
//! a completion request that fills missing specs.

pub mod ai;
pub mod error;
pub mod webhook;

pub use ai::{merge_completion, AiClient, SpecCompletion};
pub use error::ForwardError;
pub use webhook::WebhookClient;
