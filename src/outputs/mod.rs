//! Persistence of the final record set.
//!
//! The pipeline hands its records to a [`RecordStore`] exactly once, after
//! every source and the optional enrichment pass have finished.
//!
//! # Submodules
//!
//! - [`json`]: Writes the records as a pretty-printed JSON array

pub mod json;

use crate::models::Record;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("output location not writable: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize records: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Durable destination for a run's records.
pub trait RecordStore {
    /// Check the destination is usable. Runs before any network activity.
    async fn prepare(&self) -> Result<(), StoreError>;

    /// Persist the full, ordered record set.
    async fn save(&self, records: &[Record]) -> Result<(), StoreError>;
}
