//! Snapshot records and the per-volume snapshot registry.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{SnapshotId, VolumeId};

/// A point-in-time snapshot of a volume.
///
/// Snapshot ids are unique only within their owning volume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Identifier of the snapshot within its volume.
    pub snapshot_id: SnapshotId,
    /// The volume the snapshot was taken of.
    pub volume_id: VolumeId,
    /// Caller-supplied description.
    pub description: String,
    /// Creation timestamp (seconds since epoch).
    pub created_at_secs: u64,
}

impl Snapshot {
    /// Builds a snapshot with a fresh random id, stamped now.
    pub fn create(volume_id: VolumeId, description: &str) -> Self {
        let created_at_secs = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self {
            snapshot_id: SnapshotId::generate(),
            volume_id,
            description: description.to_string(),
            created_at_secs,
        }
    }
}

/// Two-level snapshot index: volume id to snapshot id to snapshot.
#[derive(Debug, Default)]
pub struct SnapshotRegistry {
    snapshots: HashMap<VolumeId, HashMap<SnapshotId, Snapshot>>,
}

impl SnapshotRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a snapshot under its owning volume.
    pub fn insert(&mut self, snapshot: Snapshot) {
        debug!(
            volume_id = %snapshot.volume_id,
            snapshot_id = %snapshot.snapshot_id,
            "registered snapshot"
        );
        self.snapshots
            .entry(snapshot.volume_id.clone())
            .or_default()
            .insert(snapshot.snapshot_id.clone(), snapshot);
    }

    /// Removes a snapshot, returning it when it existed.
    pub fn remove(&mut self, volume_id: &VolumeId, snapshot_id: &SnapshotId) -> Option<Snapshot> {
        let removed = self
            .snapshots
            .get_mut(volume_id)
            .and_then(|snaps| snaps.remove(snapshot_id));
        if removed.is_some() {
            debug!(volume_id = %volume_id, snapshot_id = %snapshot_id, "removed snapshot");
        }
        removed
    }

    /// Looks up one snapshot.
    pub fn get(&self, volume_id: &VolumeId, snapshot_id: &SnapshotId) -> Option<&Snapshot> {
        self.snapshots
            .get(volume_id)
            .and_then(|snaps| snaps.get(snapshot_id))
    }

    /// Clones of all snapshots of one volume.
    pub fn snapshots_of(&self, volume_id: &VolumeId) -> Vec<Snapshot> {
        self.snapshots
            .get(volume_id)
            .map(|snaps| snaps.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Clones of every snapshot of every volume.
    pub fn all(&self) -> Vec<Snapshot> {
        self.snapshots
            .values()
            .flat_map(|snaps| snaps.values().cloned())
            .collect()
    }

    /// Total number of snapshots across all volumes.
    pub fn len(&self) -> usize {
        self.snapshots.values().map(HashMap::len).sum()
    }

    /// True when no snapshots are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
