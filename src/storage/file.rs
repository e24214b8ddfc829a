use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::{KeyValueStore, Record};
use crate::{HermodError, Result};

/// Store keeping every slot in a single JSON object on disk.
///
/// Writes go to a sibling temp file which is then renamed over the target,
/// so a crash mid-write leaves the previous contents intact. A missing file
/// reads as empty. A corrupt file fails reads; the next write moves it to
/// [`corrupt_path`](Self::corrupt_path) and starts a fresh file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    // serializes read-modify-write cycles
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Default location: `~/.hermod/state.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".hermod").join("state.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_bytes(&self) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(None),
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(HermodError::Persistence(format!(
                "failed to read {:?}: {e}",
                self.path
            ))),
        }
    }

    async fn read_all(&self) -> Result<Record> {
        match self.read_bytes().await? {
            None => Ok(Record::new()),
            Some(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                HermodError::Persistence(format!("corrupt state file {:?}: {e}", self.path))
            }),
        }
    }

    /// Current contents for a read-modify-write. An undecodable file is moved
    /// to `<name>.corrupt` and treated as empty so writes can resume.
    async fn read_for_merge(&self) -> Result<Record> {
        let Some(bytes) = self.read_bytes().await? else {
            return Ok(Record::new());
        };
        match serde_json::from_slice(&bytes) {
            Ok(record) => Ok(record),
            Err(e) => {
                let aside = self.corrupt_path();
                warn!(
                    path = ?self.path,
                    aside = ?aside,
                    error = %e,
                    "state file is corrupt, starting fresh"
                );
                tokio::fs::rename(&self.path, &aside).await.map_err(|e| {
                    HermodError::Persistence(format!("failed to move aside {:?}: {e}", self.path))
                })?;
                Ok(Record::new())
            }
        }
    }

    /// Where an undecodable state file is moved: `state.json.corrupt`.
    pub fn corrupt_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".corrupt");
        PathBuf::from(name)
    }

    async fn write_all(&self, record: &Record) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                HermodError::Persistence(format!("failed to create {parent:?}: {e}"))
            })?;
        }
        let bytes = serde_json::to_vec_pretty(record)
            .map_err(|e| HermodError::Persistence(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes)
            .await
            .map_err(|e| HermodError::Persistence(format!("failed to write {tmp:?}: {e}")))?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(|e| {
            HermodError::Persistence(format!("failed to replace {:?}: {e}", self.path))
        })?;
        debug!(path = ?self.path, keys = record.len(), "state file written");
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, keys: &[&str]) -> Result<Record> {
        let _guard = self.lock.lock().await;
        let mut all = self.read_all().await?;
        Ok(keys
            .iter()
            .filter_map(|k| all.remove(*k).map(|v| ((*k).to_owned(), v)))
            .collect())
    }

    async fn set(&self, record: Record) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut all = self.read_for_merge().await?;
        all.extend(record);
        self.write_all(&all).await
    }
}
