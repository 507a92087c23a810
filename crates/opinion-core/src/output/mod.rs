//! Output Generation
//!
//! Opinion statistics, world snapshots and their on-disk formats.

use thiserror::Error;

pub mod snapshot;
pub mod stats;

pub use snapshot::*;
pub use stats::*;

/// Failure while writing snapshots or history
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
