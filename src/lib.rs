//! Structured product extraction for ecommerce workflows.
//!
//! Prodex turns a product page into a normalized record via a set of CSS
//! selectors: a title, a price, image URLs, and `{name, value}` spec pairs.
//! Records are forwarded to workflow webhooks, optionally enriched by an AI
//! completion endpoint, and every operation lands in a local history log.
//!
//! - [`extraction`]: the selector engine, preview, and the record types.
//! - [`acquisition`]: fetching pages over HTTP or from local files into
//!   immutable snapshots.
//! - [`settings`]: persisted endpoint and selector configuration.
//! - [`forward`]: webhook and AI endpoint clients.
//! - [`audit`]: the append-only operation history.
//! - [`cli`]: subcommands and the interactive panel.

pub mod acquisition;
pub mod audit;
pub mod cli;
pub mod extraction;
pub mod forward;
pub mod settings;
