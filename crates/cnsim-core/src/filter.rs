//! The query filter engine.
//!
//! A filter is a set of optional predicate categories, all ANDed
//! together, with one exception: the label predicate passes when the
//! volume's label set intersects the filter's label set, so labels are
//! OR within the category but still AND against every other category.
//! An absent category matches everything; an empty membership set
//! matches nothing.

use serde::{Deserialize, Serialize};

use cnsim_disk::{DatastoreRef, KeyValue};

use crate::types::{ComplianceStatus, HealthStatus, SnapshotId, Volume, VolumeId};

/// Composite predicate over the volume registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryFilter {
    /// Volume-id membership.
    pub volume_ids: Option<Vec<VolumeId>>,
    /// Volume-name membership.
    pub names: Option<Vec<String>>,
    /// Container-cluster-id membership.
    pub container_cluster_ids: Option<Vec<String>>,
    /// Storage-policy-id equality.
    pub storage_policy_id: Option<String>,
    /// Label intersection; passes when any label matches.
    pub labels: Option<Vec<KeyValue>>,
    /// Compliance-status equality.
    pub compliance_status: Option<ComplianceStatus>,
    /// Health-status equality.
    pub health_status: Option<HealthStatus>,
    /// Datastore membership.
    pub datastores: Option<Vec<DatastoreRef>>,
}

impl QueryFilter {
    /// A filter with every category absent; matches all volumes.
    pub fn match_all() -> Self {
        Self::default()
    }

    /// A filter on volume-id membership only.
    pub fn by_ids(ids: impl IntoIterator<Item = VolumeId>) -> Self {
        Self {
            volume_ids: Some(ids.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Evaluates the filter against one volume and its owning datastore.
    pub fn matches(&self, datastore: &DatastoreRef, volume: &Volume) -> bool {
        if let Some(ids) = &self.volume_ids {
            if !ids.contains(&volume.id) {
                return false;
            }
        }
        if let Some(names) = &self.names {
            if !names.contains(&volume.name) {
                return false;
            }
        }
        if let Some(cluster_ids) = &self.container_cluster_ids {
            if !cluster_ids.contains(&volume.metadata.container_cluster.cluster_id) {
                return false;
            }
        }
        if let Some(policy_id) = &self.storage_policy_id {
            if volume.storage_policy_id.as_ref() != Some(policy_id) {
                return false;
            }
        }
        if let Some(labels) = &self.labels {
            // OR within the label set: one shared label is enough.
            if !volume.metadata.labels().any(|kv| labels.contains(kv)) {
                return false;
            }
        }
        if let Some(compliance) = &self.compliance_status {
            if volume.compliance_status != *compliance {
                return false;
            }
        }
        if let Some(health) = &self.health_status {
            if volume.health_status != *health {
                return false;
            }
        }
        if let Some(datastores) = &self.datastores {
            if !datastores.contains(datastore) {
                return false;
            }
        }
        true
    }
}

/// Addresses snapshots of one volume, optionally one specific snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotQuerySpec {
    /// The volume whose snapshots are queried.
    pub volume_id: VolumeId,
    /// A specific snapshot, or all snapshots of the volume when absent.
    pub snapshot_id: Option<SnapshotId>,
}

/// Filter of the snapshot query operation; at most one spec per call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotQueryFilter {
    /// Query specs; an empty list selects every snapshot of every volume.
    pub specs: Vec<SnapshotQuerySpec>,
}
