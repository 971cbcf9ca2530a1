//! Error types for the backing disk store.

use thiserror::Error;

use crate::disk::DiskId;

/// Result type alias for disk store operations.
pub type DiskResult<T> = Result<T, DiskError>;

/// Error variants for disk store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiskError {
    /// The requested disk does not exist in any datastore catalog.
    #[error("disk not found: {disk_id}")]
    NotFound {
        /// The disk ID that was not found.
        disk_id: DiskId,
    },

    /// A disk with this identifier is already registered.
    #[error("disk already exists: {disk_id}")]
    AlreadyExists {
        /// The conflicting disk ID.
        disk_id: DiskId,
    },
}
