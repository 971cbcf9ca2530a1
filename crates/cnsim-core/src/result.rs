//! Operation result shapes.
//!
//! A mutating operation resolves to `Result<BatchResult<T>, TaskFault>`:
//! the outer `Result` is the task's own channel, the inner items each
//! carry their own success or [`ItemFault`]. Query operations return
//! their result synchronously or as the single item of a batch.

use serde::{Deserialize, Serialize};

use cnsim_disk::{DatastoreRef, VirtualDisk};

use crate::error::ItemFault;
use crate::snapshot::Snapshot;
use crate::types::{SnapshotId, Volume, VolumeId};

/// Outcome of one item inside a successful batch.
pub type ItemResult<T> = Result<T, ItemFault>;

/// Per-item results of a batch operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult<T> {
    /// One entry per processed item, in request order.
    pub items: Vec<ItemResult<T>>,
}

impl<T> BatchResult<T> {
    /// Creates an empty batch.
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Appends a success item.
    pub fn push_ok(&mut self, item: T) {
        self.items.push(Ok(item));
    }

    /// Appends a faulted item.
    pub fn push_fault(&mut self, fault: ItemFault) {
        self.items.push(Err(fault));
    }

    /// Number of items in the batch.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when the batch carries no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The first item, if any.
    pub fn first(&self) -> Option<&ItemResult<T>> {
        self.items.first()
    }
}

impl<T> Default for BatchResult<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Where a volume was placed at creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementResult {
    /// The datastore the volume landed on.
    pub datastore: DatastoreRef,
}

/// Item payload of a create-volume batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeCreateInfo {
    /// Identifier of the new volume.
    pub volume_id: VolumeId,
    /// Name the volume was created under.
    pub name: String,
    /// Placement of the new volume.
    pub placement: Vec<PlacementResult>,
}

/// Item payload of delete/extend/metadata-update batches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeOpInfo {
    /// The volume the item refers to.
    pub volume_id: VolumeId,
}

/// Item payload of an attach batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachInfo {
    /// The attached volume.
    pub volume_id: VolumeId,
    /// First-class disk UUID exposed to the guest.
    pub disk_uuid: String,
}

/// Item payload of a detach batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetachInfo {
    /// The detached volume.
    pub volume_id: VolumeId,
}

/// Item payload of a query-volume-info batch: the backing disk object
/// resolved from the disk catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeInfoEntry {
    /// The queried volume id.
    pub volume_id: VolumeId,
    /// The backing disk object.
    pub disk: VirtualDisk,
}

/// Item payload of a create-snapshots batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotCreateInfo {
    /// The newly created snapshot.
    pub snapshot: Snapshot,
}

/// Item payload of a delete-snapshots batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotDeleteInfo {
    /// The addressed volume.
    pub volume_id: VolumeId,
    /// The addressed snapshot.
    pub snapshot_id: SnapshotId,
}

/// Pagination cursor, advertised by the query surface but never advanced:
/// every query returns all matches in one page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    /// Offset of the first returned record.
    pub offset: u64,
    /// Maximum records per page, zero for unlimited.
    pub limit: u64,
    /// Total records matching the query.
    pub total_records: u64,
}

/// Result of the volume query operations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResult {
    /// Matching volumes.
    pub volumes: Vec<Volume>,
    /// Always a default cursor; pagination is not implemented.
    pub cursor: Cursor,
}

/// One entry of a snapshot query: a snapshot, or the fault explaining
/// why the addressed snapshot or volume could not be resolved.
pub type SnapshotQueryEntry = Result<Snapshot, ItemFault>;

/// Result of the snapshot query operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotQueryResult {
    /// One entry per resolved snapshot or per fault.
    pub entries: Vec<SnapshotQueryEntry>,
    /// Always a default cursor; pagination is not implemented.
    pub cursor: Cursor,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_push_and_inspect() {
        let mut batch = BatchResult::new();
        batch.push_ok(VolumeOpInfo {
            volume_id: VolumeId::new("v1"),
        });
        batch.push_fault(ItemFault::NotFound {
            volume_id: VolumeId::new("v2"),
        });

        assert_eq!(batch.len(), 2);
        assert!(!batch.is_empty());
        assert!(batch.first().unwrap().is_ok());
        assert!(batch.items[1].is_err());
    }

    #[test]
    fn test_empty_batch() {
        let batch: BatchResult<VolumeOpInfo> = BatchResult::default();
        assert!(batch.is_empty());
        assert!(batch.first().is_none());
    }

    #[test]
    fn test_cursor_defaults_to_zero() {
        let cursor = Cursor::default();
        assert_eq!(cursor.offset, 0);
        assert_eq!(cursor.limit, 0);
        assert_eq!(cursor.total_records, 0);
    }
}
