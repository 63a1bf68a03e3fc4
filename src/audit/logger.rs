//! JSONL history log — append-only record of workflow operations.

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::OnceLock;
use tracing::warn;
use uuid::Uuid;

/// One logged operation: parse, send, complete, or price_update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEvent {
    pub timestamp: String,
    /// Correlates every event from one process run.
    pub run_id: String,
    pub operation: String,
    pub url: Option<String>,
    /// Short outcome line, e.g. `title=yes price=yes images=3 specs=5`
    /// or `sent (200)`.
    pub outcome: String,
    pub duration_ms: u64,
}

/// Append-only JSONL history log.
pub struct HistoryLog {
    file: File,
}

impl HistoryLog {
    /// Open or create the history log file.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("failed to open history log: {}", path.display()))?;

        Ok(Self { file })
    }

    /// Open the default history log at ~/.prodex/history.jsonl.
    pub fn default_log() -> Result<Self> {
        Self::open(&crate::settings::prodex_home().join("history.jsonl"))
    }

    /// Append one event.
    pub fn log(&mut self, event: &HistoryEvent) -> Result<()> {
        let json = serde_json::to_string(event)?;
        writeln!(self.file, "{json}")?;
        Ok(())
    }

    /// Append an operation with timing, stamping timestamp and run id.
    pub fn log_operation(
        &mut self,
        operation: &str,
        url: Option<&str>,
        outcome: &str,
        duration_ms: u64,
    ) -> Result<()> {
        self.log(&HistoryEvent {
            timestamp: Utc::now().to_rfc3339(),
            run_id: run_id().to_string(),
            operation: operation.to_string(),
            url: url.map(String::from),
            outcome: outcome.to_string(),
            duration_ms,
        })
    }
}

/// Append one event to the default history log.
///
/// Logging never fails the operation being logged: any failure is warned
/// and swallowed here.
pub fn record(operation: &str, url: Option<&str>, outcome: &str, duration_ms: u64) {
    match HistoryLog::default_log() {
        Ok(mut log) => {
            if let Err(e) = log.log_operation(operation, url, outcome, duration_ms) {
                warn!("history write failed: {e}");
            }
        }
        Err(e) => warn!("history log unavailable: {e}"),
    }
}

/// Read the last `limit` events, oldest first. Lines that fail to parse are
/// skipped; a missing file reads as empty.
pub fn tail(path: &Path, limit: usize) -> Result<Vec<HistoryEvent>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read history log: {}", path.display()))?;

    let events: Vec<HistoryEvent> = raw
        .lines()
        .filter_map(|line| serde_json::from_str(line).ok())
        .collect();
    let skip = events.len().saturating_sub(limit);
    Ok(events.into_iter().skip(skip).collect())
}

/// Process-wide run id stamped on every event.
fn run_id() -> &'static str {
    static RUN_ID: OnceLock<String> = OnceLock::new();
    RUN_ID.get_or_init(|| Uuid::new_v4().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_and_tail_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.jsonl");
        let mut log = HistoryLog::open(&path).unwrap();

        log.log_operation("parse", Some("https://shop.example/p/1"), "title=yes price=yes images=2 specs=3", 120)
            .unwrap();
        log.log_operation("send", Some("https://shop.example/p/1"), "sent (200)", 45)
            .unwrap();
        log.log_operation("price_update", None, "started (200)", 900)
            .unwrap();

        let last_two = tail(&path, 2).unwrap();
        assert_eq!(last_two.len(), 2);
        assert_eq!(last_two[0].operation, "send");
        assert_eq!(last_two[1].operation, "price_update");
        assert_eq!(last_two[1].url, None);
    }

    #[test]
    fn test_events_share_run_id_within_process() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.jsonl");
        let mut log = HistoryLog::open(&path).unwrap();

        log.log_operation("parse", None, "title=no price=no images=0 specs=0", 5)
            .unwrap();
        log.log_operation("send", None, "sent (200)", 7).unwrap();

        let events = tail(&path, 10).unwrap();
        assert_eq!(events[0].run_id, events[1].run_id);
        assert!(!events[0].run_id.is_empty());
    }

    #[test]
    fn test_tail_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let events = tail(&dir.path().join("none.jsonl"), 10).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn test_tail_skips_corrupt_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.jsonl");
        let mut log = HistoryLog::open(&path).unwrap();
        log.log_operation("parse", None, "title=yes price=no images=0 specs=0", 3)
            .unwrap();

        use std::io::Write as _;
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "not json at all").unwrap();

        let events = tail(&path, 10).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].operation, "parse");
    }
}
