//! Operation history.
//!
//! Every workflow operation (parse, send, complete, price update) is
//! appended to a JSONL log under the prodex home directory so past runs
//! can be inspected with `prodex history`.

pub mod logger;

pub use logger::{record, tail, HistoryEvent, HistoryLog};
