//! Audit events. They carry identifiers and timestamps only, never
//! ciphertext or cleartext values.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::disclosure::RequestId;
use crate::types::UserId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BubbleEvent {
    HistorySubmitted {
        user: UserId,
        submitted_at: DateTime<Utc>,
    },
    AnalysisStored {
        user: UserId,
    },
    RevealRequested {
        user: UserId,
        request_id: RequestId,
    },
    ResultRevealed {
        user: UserId,
        request_id: RequestId,
    },
    DisclosureRejected {
        request_id: RequestId,
    },
    DisclosureExpired {
        user: UserId,
        request_id: RequestId,
    },
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: BubbleEvent);
}

/// Logs each event as a JSON line at `info`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: BubbleEvent) {
        match serde_json::to_string(&event) {
            Ok(json) => info!(target: "bubble_lens::events", "{json}"),
            Err(e) => info!(target: "bubble_lens::events", error = %e, ?event, "unserializable event"),
        }
    }
}

/// Keeps every event in memory; clones share the same log.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<BubbleEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<BubbleEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: BubbleEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_tag() {
        let event = BubbleEvent::RevealRequested {
            user: "alice".into(),
            request_id: RequestId(7),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "reveal_requested");
        assert_eq!(json["user"], "alice");
        assert_eq!(json["request_id"], 7);
    }

    #[test]
    fn recording_sink_clones_share_log() {
        let sink = RecordingSink::new();
        let other = sink.clone();
        other.emit(BubbleEvent::AnalysisStored { user: "bob".into() });
        assert_eq!(sink.events().len(), 1);
    }
}
