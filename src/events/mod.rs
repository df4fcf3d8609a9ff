//! Ticket history sinks.
//!
//! The controller appends one [`HistoryEvent`] per mutation. Appending is
//! best-effort from the controller's point of view: a failing sink is
//! surfaced as a warning, never as a failed transition. Events are stored
//! as NDJSON, one complete JSON object per line, so the log is cheap to
//! append to and easy to process with standard tools.

pub mod types;

pub use types::{EventType, HistoryEvent};

use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

use crate::error::Result;

/// The name of the history log file under the data root.
const HISTORY_FILE: &str = "history.ndjson";

/// Audit sink the lifecycle controller appends to.
#[async_trait]
pub trait HistorySink: Send + Sync {
    async fn append(&self, event: HistoryEvent) -> Result<()>;
}

/// NDJSON file-backed history log.
pub struct FileHistorySink {
    path: PathBuf,
}

impl FileHistorySink {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            path: root.as_ref().join(HISTORY_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read all events back, oldest first. Lines that fail to parse are
    /// skipped with a warning; a missing file is an empty history.
    pub fn read_events(&self) -> Result<Vec<HistoryEvent>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(&self.path)?;
        let mut events = Vec::new();
        for (line_num, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<HistoryEvent>(line) {
                Ok(event) => events.push(event),
                Err(e) => {
                    tracing::warn!("skipping malformed history line {}: {e}", line_num + 1);
                }
            }
        }
        Ok(events)
    }

    /// Events for one ticket, oldest first.
    pub fn ticket_history(&self, ticket_id: &str) -> Result<Vec<HistoryEvent>> {
        Ok(self
            .read_events()?
            .into_iter()
            .filter(|e| e.ticket_id == ticket_id)
            .collect())
    }
}

#[async_trait]
impl HistorySink for FileHistorySink {
    async fn append(&self, event: HistoryEvent) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut line = serde_json::to_string(&event)?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

/// In-memory history, for tests and ephemeral runs.
#[derive(Default)]
pub struct MemoryHistorySink {
    events: Mutex<Vec<HistoryEvent>>,
}

impl MemoryHistorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Vec<HistoryEvent> {
        self.events.lock().clone()
    }
}

#[async_trait]
impl HistorySink for MemoryHistorySink {
    async fn append(&self, event: HistoryEvent) -> Result<()> {
        self.events.lock().push(event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::Timestamp;
    use serde_json::json;

    fn ts() -> Timestamp {
        "2025-01-15T10:00:00Z".parse().unwrap()
    }

    fn event(ticket_id: &str, event_type: EventType) -> HistoryEvent {
        HistoryEvent::new(event_type, ticket_id, "u-1", "Ana", ts())
    }

    #[tokio::test]
    async fn test_append_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileHistorySink::new(dir.path());

        sink.append(
            event("plb-1", EventType::TicketCreated).with_data(json!({"title": "Leak"})),
        )
        .await
        .unwrap();
        sink.append(
            event("plb-1", EventType::StatusChange)
                .with_values(Some("pending"), Some("assigned")),
        )
        .await
        .unwrap();

        let events = sink.read_events().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, EventType::TicketCreated);
        assert_eq!(events[1].new_value.as_deref(), Some("assigned"));
    }

    #[tokio::test]
    async fn test_ndjson_one_object_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileHistorySink::new(dir.path());

        sink.append(event("a", EventType::TicketCreated)).await.unwrap();
        sink.append(event("b", EventType::TicketCreated)).await.unwrap();

        let content = std::fs::read_to_string(sink.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        for line in lines {
            assert!(serde_json::from_str::<HistoryEvent>(line).is_ok());
        }
    }

    #[tokio::test]
    async fn test_malformed_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileHistorySink::new(dir.path());

        sink.append(event("a", EventType::TicketCreated)).await.unwrap();
        std::fs::write(
            sink.path(),
            format!(
                "{}\nnot json at all\n",
                std::fs::read_to_string(sink.path()).unwrap().trim_end()
            ),
        )
        .unwrap();

        let events = sink.read_events().unwrap();
        assert_eq!(events.len(), 1);
    }

    #[tokio::test]
    async fn test_ticket_history_filters_by_id() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileHistorySink::new(dir.path());

        sink.append(event("a", EventType::TicketCreated)).await.unwrap();
        sink.append(event("b", EventType::TicketCreated)).await.unwrap();
        sink.append(event("a", EventType::Assigned)).await.unwrap();

        let history = sink.ticket_history("a").unwrap();
        assert_eq!(history.len(), 2);
        assert!(history.iter().all(|e| e.ticket_id == "a"));
    }

    #[tokio::test]
    async fn test_missing_file_is_empty_history() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileHistorySink::new(dir.path());
        assert!(sink.read_events().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_memory_sink_snapshot() {
        let sink = MemoryHistorySink::new();
        sink.append(event("a", EventType::TicketCreated)).await.unwrap();
        assert_eq!(sink.snapshot().len(), 1);
    }
}
