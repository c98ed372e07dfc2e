// common/src/messages.rs
use serde::{Deserialize, Serialize};

use crate::models::CounterKind;

/// Event sent by the browser over the counter socket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRequest {
    #[serde(rename = "type")]
    pub kind: CounterKind,
}

/// Reply sent back once a counter has been incremented
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountUpdated {
    #[serde(rename = "type")]
    pub kind: CounterKind,
    pub status: String,
    pub value: u64,
}

impl CountUpdated {
    pub fn new(kind: CounterKind, value: u64) -> Self {
        Self {
            kind,
            status: "updated".to_string(),
            value,
        }
    }
}

/// Parse a raw socket frame into the counter it targets.
/// Malformed frames and unknown counter types yield `None`.
pub fn parse_count_event(text: &str) -> Option<CounterKind> {
    match serde_json::from_str::<CountRequest>(text) {
        Ok(request) => Some(request.kind),
        Err(e) => {
            tracing::debug!("Ignoring count event {:?}: {}", text, e);
            None
        }
    }
}
