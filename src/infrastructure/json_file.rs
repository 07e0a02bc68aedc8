use crate::domain::calculation::{CalculationId, CalculationRecord, NewCalculation};
use crate::domain::ports::CalculationStore;
use crate::error::{HistoryError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// On-disk layout of the history file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryFile {
    next_id: CalculationId,
    calculations: Vec<CalculationRecord>,
}

impl HistoryFile {
    fn empty() -> Self {
        Self {
            next_id: CalculationId(1),
            calculations: Vec::new(),
        }
    }
}

/// A durable store keeping the whole history in a single JSON file.
///
/// Every mutation rewrites the file through a temp file that is fsynced and
/// then renamed over the target, so a crash leaves either the old or the new
/// contents on disk. The in-memory copy is only updated after the rename
/// succeeds.
#[derive(Clone)]
pub struct JsonFileCalculationStore {
    path: Arc<PathBuf>,
    state: Arc<Mutex<HistoryFile>>,
}

impl JsonFileCalculationStore {
    /// Opens the history file at `path`, creating an empty history if the
    /// file does not exist yet. The file itself is created on first write.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let state = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HistoryFile::empty(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), "opened history file");

        Ok(Self {
            path: Arc::new(path),
            state: Arc::new(Mutex::new(state)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn commit(&self, next: HistoryFile) -> Result<HistoryFile> {
        let bytes = serde_json::to_vec_pretty(&next)?;
        let path = Arc::clone(&self.path);
        tokio::task::spawn_blocking(move || atomic_write(&path, &bytes))
            .await
            .map_err(|e| HistoryError::Internal(format!("history writer task failed: {}", e)))??;
        Ok(next)
    }
}

fn atomic_write(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| HistoryError::Io(e.error))?;
    Ok(())
}

#[async_trait]
impl CalculationStore for JsonFileCalculationStore {
    async fn insert(&self, calculation: NewCalculation, timestamp: i64) -> Result<CalculationRecord> {
        let mut state = self.state.lock().await;
        let record = CalculationRecord::new(state.next_id, calculation, timestamp);

        let mut next = state.clone();
        next.calculations.push(record.clone());
        next.next_id = record.id.next();

        *state = self.commit(next).await?;
        Ok(record)
    }

    async fn get_all(&self) -> Result<Vec<CalculationRecord>> {
        let state = self.state.lock().await;
        Ok(state.calculations.clone())
    }

    async fn delete(&self, id: CalculationId) -> Result<bool> {
        let mut state = self.state.lock().await;
        if !state.calculations.iter().any(|r| r.id == id) {
            return Ok(false);
        }

        let mut next = state.clone();
        next.calculations.retain(|r| r.id != id);

        *state = self.commit(next).await?;
        Ok(true)
    }

    async fn delete_all(&self) -> Result<usize> {
        let mut state = self.state.lock().await;
        let removed = state.calculations.len();
        if removed == 0 {
            return Ok(0);
        }

        let next = HistoryFile {
            next_id: state.next_id,
            calculations: Vec::new(),
        };

        *state = self.commit(next).await?;
        Ok(removed)
    }
}
