use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::Result;
use crate::models::PurchaseRecord;

/// Append-only purchase ledger held in a single named JSON slot on disk.
///
/// The read side is forgiving: an absent or malformed slot reads as empty,
/// so a broken ledger never takes the marketplace down. Write failures are
/// surfaced to the caller.
pub struct PurchaseStore {
    path: PathBuf,
}

impl PurchaseStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        PurchaseStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read all purchase records, defaulting to empty on any read failure.
    pub async fn load(&self) -> Vec<PurchaseRecord> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("ledger {} not found, starting empty", self.path.display());
                return Vec::new();
            }
            Err(e) => {
                warn!("could not read ledger {}: {}", self.path.display(), e);
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(e) => {
                warn!(
                    "ledger {} is malformed, treating as empty: {}",
                    self.path.display(),
                    e
                );
                Vec::new()
            }
        }
    }

    /// Identifiers of every purchased listing
    pub async fn purchased_ids(&self) -> HashSet<String> {
        self.load().await.into_iter().map(|r| r.id).collect()
    }

    /// Append one record to the slot.
    pub async fn append(&self, record: PurchaseRecord) -> Result<()> {
        let mut records = self.load().await;
        records.push(record);

        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        let json = serde_json::to_string_pretty(&records)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}
