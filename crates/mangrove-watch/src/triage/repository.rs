use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::Report;

/// Everything the engine needs to resume: all reports and every contributor total.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub reports: Vec<Report>,
    pub scores: BTreeMap<String, u32>,
}

/// Durable storage collaborator. The engine loads once and persists after every mutation.
pub trait SnapshotStore: Send + Sync {
    fn load(&self) -> Result<Snapshot, PersistenceError>;
    fn persist_reports(&self, reports: &[Report]) -> Result<(), PersistenceError>;
    fn persist_scores(&self, scores: &BTreeMap<String, u32>) -> Result<(), PersistenceError>;
}

/// Error enumeration for storage failures.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("snapshot store unavailable: {0}")]
    Unavailable(String),
    #[error("snapshot io failed for {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("snapshot entry {key} could not be encoded: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("snapshot entry {key} is not valid json: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}
