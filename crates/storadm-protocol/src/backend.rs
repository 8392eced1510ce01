//! Backend status records reported by storage nodes

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendState {
    /// Backend is stopped
    Disabled,
    /// Backend is serving requests
    Enabled,
    /// Backend is starting up
    Activating,
    /// Backend is shutting down
    Deactivating,
}

impl fmt::Display for BackendState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendState::Disabled => write!(f, "disabled"),
            BackendState::Enabled => write!(f, "enabled"),
            BackendState::Activating => write!(f, "activating"),
            BackendState::Deactivating => write!(f, "deactivating"),
        }
    }
}

/// Defragmentation/compaction state of a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefragState {
    /// No defragmentation running
    NotStarted,
    /// Full defragmentation running
    InProgress,
    /// Compaction running
    CompactInProgress,
}

impl fmt::Display for DefragState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefragState::NotStarted => write!(f, "not_started"),
            DefragState::InProgress => write!(f, "in_progress"),
            DefragState::CompactInProgress => write!(f, "compact_in_progress"),
        }
    }
}

/// Wall-clock timestamp split into seconds and nanoseconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamp {
    pub tsec: u64,
    pub tnsec: u64,
}

impl Timestamp {
    pub fn new(tsec: u64, tnsec: u64) -> Self {
        Self { tsec, tnsec }
    }
}

/// Error recorded by a node for the last start attempt of a backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartError {
    pub code: i32,
    pub message: String,
}

/// Status of one backend on one node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendStatus {
    /// Backend slot on the node
    pub backend_id: u32,
    /// Lifecycle state
    pub state: BackendState,
    /// Defragmentation state
    pub defrag_state: DefragState,
    /// When the backend was last started
    pub last_start: Timestamp,
    /// Error from the last start attempt, if it failed
    pub last_start_err: Option<StartError>,
    /// Whether writes are rejected
    pub read_only: bool,
}

impl BackendStatus {
    /// A freshly started, writable backend with no defrag running
    pub fn enabled(backend_id: u32) -> Self {
        Self {
            backend_id,
            state: BackendState::Enabled,
            defrag_state: DefragState::NotStarted,
            last_start: Timestamp::default(),
            last_start_err: None,
            read_only: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_display_matches_wire_name() {
        for state in [
            BackendState::Disabled,
            BackendState::Enabled,
            BackendState::Activating,
            BackendState::Deactivating,
        ] {
            let wire = serde_json::to_value(state).unwrap();
            assert_eq!(wire, serde_json::Value::String(state.to_string()));
        }
        for state in [
            DefragState::NotStarted,
            DefragState::InProgress,
            DefragState::CompactInProgress,
        ] {
            let wire = serde_json::to_value(state).unwrap();
            assert_eq!(wire, serde_json::Value::String(state.to_string()));
        }
    }

    #[test]
    fn test_status_field_names() {
        let mut status = BackendStatus::enabled(2);
        status.last_start = Timestamp::new(1_700_000_000, 5);
        let value = serde_json::to_value(&status).unwrap();

        assert_eq!(value["backend_id"], 2);
        assert_eq!(value["state"], "enabled");
        assert_eq!(value["defrag_state"], "not_started");
        assert_eq!(value["last_start"]["tsec"], 1_700_000_000u64);
        assert_eq!(value["last_start"]["tnsec"], 5);
        assert!(value["last_start_err"].is_null());
        assert_eq!(value["read_only"], false);
    }

    #[test]
    fn test_status_with_start_error() {
        let json = r#"{
            "backend_id": 7,
            "state": "disabled",
            "defrag_state": "not_started",
            "last_start": {"tsec": 10, "tnsec": 0},
            "last_start_err": {"code": -28, "message": "No space left on device"},
            "read_only": true
        }"#;
        let status: BackendStatus = serde_json::from_str(json).unwrap();
        assert_eq!(status.state, BackendState::Disabled);
        assert_eq!(status.last_start_err.as_ref().map(|e| e.code), Some(-28));
        assert!(status.read_only);
    }
}
