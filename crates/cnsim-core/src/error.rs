//! The two-level fault model: task-level failures and per-item faults.
//!
//! Arity and shape violations fail the task itself. Missing-entity
//! conditions surface as item faults for delete/extend/snapshot-create
//! style batches, but as task failures for attach/detach. The two
//! channels are kept as separate types so no operation can accidentally
//! flatten one into the other.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use cnsim_disk::DiskError;
use cnsim_task::TaskAborted;

use crate::types::{SnapshotId, VolumeId};

/// Failure of a whole task.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum TaskFault {
    /// A request field was malformed or had the wrong shape.
    #[error("invalid argument: {property}")]
    InvalidArgument {
        /// Name of the offending request property.
        property: String,
    },

    /// The named resource is held by another consumer.
    #[error("resource in use: {name}")]
    ResourceInUse {
        /// Name of the busy resource.
        name: String,
    },

    /// The task worker terminated before producing a result.
    ///
    /// Raised by the scheduler, never by the operations themselves.
    #[error("task aborted before completion")]
    Aborted,
}

impl TaskFault {
    /// Convenience constructor for shape violations.
    pub fn invalid_argument(property: &str) -> Self {
        TaskFault::InvalidArgument {
            property: property.to_string(),
        }
    }
}

impl From<TaskAborted> for TaskFault {
    fn from(_: TaskAborted) -> Self {
        TaskFault::Aborted
    }
}

/// Fault carried by a single item inside a successful batch result.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ItemFault {
    /// The addressed volume does not exist.
    #[error("volume not found: {volume_id}")]
    NotFound {
        /// The volume id that was not found.
        volume_id: VolumeId,
    },

    /// A snapshot query named a volume that does not exist.
    #[error("no volume with id {volume_id}")]
    VolumeNotFound {
        /// The volume id that was not found.
        volume_id: VolumeId,
    },

    /// A snapshot query named a snapshot that does not exist on the volume.
    #[error("no snapshot {snapshot_id} on volume {volume_id}")]
    SnapshotNotFound {
        /// The owning volume id.
        volume_id: VolumeId,
        /// The snapshot id that was not found.
        snapshot_id: SnapshotId,
    },

    /// A delegated backing-disk operation failed.
    #[error("backing disk store: {message}")]
    Disk {
        /// Rendered disk store error.
        message: String,
    },
}

impl From<DiskError> for ItemFault {
    fn from(err: DiskError) -> Self {
        ItemFault::Disk {
            message: err.to_string(),
        }
    }
}
