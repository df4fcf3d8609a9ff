//! History event types for the intervention audit trail.
//!
//! Every mutation of a ticket produces one event. Events are serialized
//! as NDJSON and appended to `history.ndjson` under the data root.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// The kind of mutation being recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    TicketCreated,
    StatusChange,
    Assigned,
    CommentAdded,
    SeriesCreated,
}

/// One entry of a ticket's history.
///
/// `old_value`/`new_value` carry the before/after of the mutated field
/// (status names for status changes); anything else goes in `data`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEvent {
    /// ISO 8601 timestamp with milliseconds.
    pub timestamp: String,

    pub event_type: EventType,

    pub ticket_id: String,

    pub actor_id: String,

    pub actor_name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_value: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_value: Option<String>,

    /// Event-specific payload.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub data: serde_json::Value,
}

impl HistoryEvent {
    /// Create an event stamped at `at` (the controller's clock, so event
    /// times line up with ticket timestamps).
    pub fn new(
        event_type: EventType,
        ticket_id: impl Into<String>,
        actor_id: impl Into<String>,
        actor_name: impl Into<String>,
        at: Timestamp,
    ) -> Self {
        Self {
            timestamp: iso_timestamp_millis(at),
            event_type,
            ticket_id: ticket_id.into(),
            actor_id: actor_id.into(),
            actor_name: actor_name.into(),
            old_value: None,
            new_value: None,
            data: serde_json::Value::Null,
        }
    }

    pub fn with_values(
        mut self,
        old_value: Option<impl Into<String>>,
        new_value: Option<impl Into<String>>,
    ) -> Self {
        self.old_value = old_value.map(|v| v.into());
        self.new_value = new_value.map(|v| v.into());
        self
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }
}

/// Format an instant as ISO 8601 with milliseconds.
fn iso_timestamp_millis(at: Timestamp) -> String {
    at.strftime("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ts() -> Timestamp {
        "2025-01-15T10:30:00.250Z".parse().unwrap()
    }

    #[test]
    fn test_event_type_serialization() {
        assert_eq!(
            serde_json::to_string(&EventType::StatusChange).unwrap(),
            "\"status_change\""
        );
        assert_eq!(
            serde_json::to_string(&EventType::SeriesCreated).unwrap(),
            "\"series_created\""
        );
    }

    #[test]
    fn test_event_creation() {
        let event = HistoryEvent::new(EventType::StatusChange, "plb-a1b2c3", "u-42", "Ana", ts())
            .with_values(Some("pending"), Some("assigned"));

        assert_eq!(event.timestamp, "2025-01-15T10:30:00.250Z");
        assert_eq!(event.old_value.as_deref(), Some("pending"));
        assert_eq!(event.new_value.as_deref(), Some("assigned"));
        assert_eq!(event.actor_name, "Ana");
    }

    #[test]
    fn test_null_data_is_omitted() {
        let event = HistoryEvent::new(EventType::TicketCreated, "gen-1", "u-1", "Ana", ts());
        let json_str = serde_json::to_string(&event).unwrap();
        assert!(!json_str.contains("\"data\""));

        let event = event.with_data(json!({"title": "Leak"}));
        let json_str = serde_json::to_string(&event).unwrap();
        assert!(json_str.contains("\"title\":\"Leak\""));
    }

    #[test]
    fn test_event_json_roundtrip() {
        let json_str = r#"{
            "timestamp": "2025-01-15T10:30:00.000Z",
            "event_type": "status_change",
            "ticket_id": "hvc-9f",
            "actor_id": "u-7",
            "actor_name": "Marc",
            "old_value": "assigned",
            "new_value": "in_progress"
        }"#;

        let event: HistoryEvent = serde_json::from_str(json_str).unwrap();
        assert_eq!(event.event_type, EventType::StatusChange);
        assert_eq!(event.ticket_id, "hvc-9f");
        assert!(event.data.is_null());
    }
}
