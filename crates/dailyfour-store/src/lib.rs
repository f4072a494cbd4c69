//! Persistence layer for dailyfour
//!
//! Provides:
//! - Append-only daily session logs (one JSON record per line)
//! - Size-based rotation into an archive directory
//! - Merged read-back across active and archived segments
//! - Recovery scan for sessions left open by a previous process

mod jsonl;
mod memory;
mod records;
mod segment;
mod traits;

pub use jsonl::*;
pub use memory::*;
pub use records::*;
pub use segment::*;
pub use traits::*;

use dailyfour_api::RecordError;
use std::path::PathBuf;
use thiserror::Error;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid record: {0}")]
    Validation(#[from] RecordError),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to rotate {from:?} to {to:?}: {source}")]
    Rotation {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Store lock poisoned")]
    LockPoisoned,
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
