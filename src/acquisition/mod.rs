//! Page acquisition: product pages arrive as immutable snapshots, either
//! fetched over HTTP or read from local HTML files.

pub mod snapshot;

pub use snapshot::{acquire, client, fetch, looks_like_url, AcquireError, PageSnapshot};
