//! JSON output.
//!
//! Records are written as one pretty-printed UTF-8 JSON array, in run order.
//! Absent optional fields appear as explicit `null`s and non-ASCII names are
//! written as-is:
//!
//! ```text
//! [
//!   {
//!     "name": "Ion Ionescu",
//!     "district": "IAȘI",
//!     "affiliation": "PNL",
//!     "chamber": "Senat",
//!     "detailReference": "https://www.senat.ro/FisaSenator.aspx?ParlamentarID=…",
//!     "contactAddress": null,
//!     "contactNumber": null,
//!     "documentReference": null
//!   }
//! ]
//! ```

use super::{RecordStore, StoreError};
use crate::models::Record;
use crate::utils::ensure_writable_dir;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

/// [`RecordStore`] writing a single JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }
}

impl RecordStore for JsonFileStore {
    #[instrument(level = "info", skip_all, fields(path = %self.path.display()))]
    async fn prepare(&self) -> Result<(), StoreError> {
        ensure_writable_dir(self.dir()).await.inspect_err(|e| {
            error!(error = %e, "Output directory is not writable (fix perms or choose a different path)");
        })?;
        Ok(())
    }

    #[instrument(level = "info", skip_all, fields(path = %self.path.display(), count = records.len()))]
    async fn save(&self, records: &[Record]) -> Result<(), StoreError> {
        write_records(records, &self.path).await
    }
}

/// Write `records` to `path`, creating the parent directory if needed.
pub async fn write_records(records: &[Record], path: &Path) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(records)?;

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(dir).await {
            error!(dir = %dir.display(), error = %e, "Failed to create output dir");
            return Err(e.into());
        }
    }

    info!(path = %path.display(), "Writing JSON");
    fs::write(path, json).await?;
    info!(path = %path.display(), count = records.len(), "Wrote records");
    Ok(())
}

/// Read a file produced by [`write_records`].
#[cfg(test)]
pub async fn read_records(path: &Path) -> Result<Vec<Record>, StoreError> {
    let raw = fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&raw)?)
}
