use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use super::domain::Report;
use super::repository::{PersistenceError, Snapshot, SnapshotStore};

pub const REPORTS_KEY: &str = "mw_reports";
pub const SCORES_KEY: &str = "mw_scores";

/// Snapshot store keeping one JSON document per key inside a data directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    /// Open (and create if needed) the data directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| PersistenceError::Io {
            key: root.display().to_string(),
            source,
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }

    fn read<T>(&self, key: &str) -> Result<Option<T>, PersistenceError>
    where
        T: DeserializeOwned,
    {
        let bytes = match fs::read(self.path_for(key)) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(PersistenceError::Io {
                    key: key.to_string(),
                    source,
                })
            }
        };

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| PersistenceError::Corrupt {
                key: key.to_string(),
                source,
            })
    }

    fn write<T>(&self, key: &str, value: &T) -> Result<(), PersistenceError>
    where
        T: Serialize + ?Sized,
    {
        let payload =
            serde_json::to_vec_pretty(value).map_err(|source| PersistenceError::Encode {
                key: key.to_string(),
                source,
            })?;

        let target = self.path_for(key);
        let staging = self.root.join(format!(".{key}.json.tmp"));
        let io_error = |source| PersistenceError::Io {
            key: key.to_string(),
            source,
        };
        fs::write(&staging, payload).map_err(io_error)?;
        fs::rename(&staging, &target).map_err(io_error)?;

        debug!(key, path = %target.display(), "snapshot entry written");
        Ok(())
    }
}

impl SnapshotStore for JsonFileStore {
    fn load(&self) -> Result<Snapshot, PersistenceError> {
        let reports = self.read::<Vec<Report>>(REPORTS_KEY)?.unwrap_or_default();
        let scores = self
            .read::<BTreeMap<String, u32>>(SCORES_KEY)?
            .unwrap_or_default();
        Ok(Snapshot { reports, scores })
    }

    fn persist_reports(&self, reports: &[Report]) -> Result<(), PersistenceError> {
        self.write(REPORTS_KEY, reports)
    }

    fn persist_scores(&self, scores: &BTreeMap<String, u32>) -> Result<(), PersistenceError> {
        self.write(SCORES_KEY, scores)
    }
}
