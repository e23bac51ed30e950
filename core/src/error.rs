//! Error types for save data operations

use std::io;

use crate::memory::MemoryError;

/// Failure of a save data operation.
///
/// Every public operation reports failure through this type; nothing panics on
/// caller input and nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum SavedataError {
    #[error("no save data request is active")]
    NullRequest,

    #[error("save data not found: {path}")]
    NotFound { path: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("short read on {path}: expected {expected} bytes, got {actual}")]
    ShortRead {
        path: String,
        expected: usize,
        actual: usize,
    },

    #[error("slot index {0} out of range")]
    InvalidSlot(usize),

    #[error("slot {0} holds no save data")]
    EmptySlot(usize),

    #[error(transparent)]
    Memory(#[from] MemoryError),
}

impl SavedataError {
    pub(crate) fn io(path: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias for save data operations.
pub type Result<T> = std::result::Result<T, SavedataError>;
