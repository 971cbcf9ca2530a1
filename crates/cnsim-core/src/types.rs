//! Core identifiers and volume data types.

use std::fmt;

use serde::{Deserialize, Serialize};

use cnsim_disk::{DatastoreRef, DiskId, KeyValue};

/// Globally unique identifier of a volume.
///
/// For block volumes this is the identifier of the backing disk object,
/// so the volume registry and the disk catalog can be joined on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VolumeId(String);

impl VolumeId {
    /// Wraps an existing identifier.
    pub fn new(id: impl Into<String>) -> Self {
        VolumeId(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VolumeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&DiskId> for VolumeId {
    fn from(id: &DiskId) -> Self {
        VolumeId(id.as_str().to_string())
    }
}

impl From<&VolumeId> for DiskId {
    fn from(id: &VolumeId) -> Self {
        DiskId::new(id.as_str())
    }
}

/// Identifier of a snapshot, unique only within its owning volume.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SnapshotId(String);

impl SnapshotId {
    /// Wraps an existing identifier.
    pub fn new(id: impl Into<String>) -> Self {
        SnapshotId(id.into())
    }

    /// Mints a fresh random identifier.
    pub fn generate() -> Self {
        SnapshotId(uuid::Uuid::new_v4().to_string())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference to a compute node a volume can be attached to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeRef(String);

impl NodeRef {
    /// Wraps a node reference.
    pub fn new(name: impl Into<String>) -> Self {
        NodeRef(name.into())
    }

    /// Returns the node reference as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of a volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolumeType {
    /// Block volume backed by a virtual disk object.
    Block,
    /// File volume backed by a file share.
    File,
}

impl fmt::Display for VolumeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VolumeType::Block => write!(f, "BLOCK"),
            VolumeType::File => write!(f, "FILE"),
        }
    }
}

/// Storage-policy compliance of a volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComplianceStatus {
    /// The volume satisfies its storage policy.
    Compliant,
    /// The volume violates its storage policy.
    NonCompliant,
    /// Compliance has not been evaluated.
    Unknown,
}

impl fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComplianceStatus::Compliant => write!(f, "compliant"),
            ComplianceStatus::NonCompliant => write!(f, "nonCompliant"),
            ComplianceStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// Health of a volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    /// Healthy.
    Green,
    /// Degraded.
    Yellow,
    /// Unhealthy.
    Red,
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthStatus::Green => write!(f, "green"),
            HealthStatus::Yellow => write!(f, "yellow"),
            HealthStatus::Red => write!(f, "red"),
        }
    }
}

/// Accessibility of a volume's datastore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessibilityStatus {
    /// The datastore is reachable.
    Accessible,
    /// The datastore is unreachable.
    Inaccessible,
}

/// Identity of the container cluster that owns a volume.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerCluster {
    /// Cluster kind, e.g. `KUBERNETES`.
    pub cluster_type: String,
    /// Cluster identifier.
    pub cluster_id: String,
    /// Distribution flavor, e.g. `VANILLA` or `GUEST_CLUSTER`.
    pub cluster_flavor: String,
    /// User the cluster operates as.
    pub user: String,
}

/// Metadata describing one container-side entity tied to a volume,
/// such as a persistent volume or a claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMetadata {
    /// Entity name.
    pub name: String,
    /// Entity kind, e.g. `PERSISTENT_VOLUME`.
    pub entity_type: String,
    /// Namespace the entity lives in, empty for cluster-scoped entities.
    pub namespace: String,
    /// Arbitrary labels on the entity.
    pub labels: Vec<KeyValue>,
}

/// Volume metadata: owning cluster plus per-entity records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeMetadata {
    /// The container cluster the volume belongs to.
    pub container_cluster: ContainerCluster,
    /// Entity records; replaced wholesale by metadata updates.
    pub entity_metadata: Vec<EntityMetadata>,
}

impl VolumeMetadata {
    /// All labels across every entity record.
    pub fn labels(&self) -> impl Iterator<Item = &KeyValue> {
        self.entity_metadata.iter().flat_map(|e| e.labels.iter())
    }
}

/// Backing object details of a create request, one variant per kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackingSpec {
    /// Block backing. A disk id selects an already-provisioned disk
    /// ("static import"); without one a new disk is created.
    Block {
        /// Pre-provisioned disk to wrap, if any.
        backing_disk_id: Option<DiskId>,
        /// Requested capacity in megabytes.
        capacity_mb: u64,
    },
    /// File-share backing.
    File {
        /// Requested capacity in megabytes.
        capacity_mb: u64,
    },
    /// vSAN file-share backing.
    VsanFileShare {
        /// Requested capacity in megabytes.
        capacity_mb: u64,
    },
}

impl BackingSpec {
    /// Capacity requested by any backing variant.
    pub fn capacity_mb(&self) -> u64 {
        match self {
            BackingSpec::Block { capacity_mb, .. }
            | BackingSpec::File { capacity_mb }
            | BackingSpec::VsanFileShare { capacity_mb } => *capacity_mb,
        }
    }
}

/// A volume tracked by the control plane.
///
/// A volume belongs to exactly one datastore at a time; there is no live
/// migration in this model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volume {
    /// Globally unique volume identifier.
    pub id: VolumeId,
    /// Human-readable name.
    pub name: String,
    /// Kind of the volume.
    pub volume_type: VolumeType,
    /// Owning datastore.
    pub datastore: DatastoreRef,
    /// URL of the owning datastore.
    pub datastore_url: String,
    /// Current capacity in megabytes.
    pub capacity_mb: u64,
    /// Storage policy the volume was provisioned against, if any.
    pub storage_policy_id: Option<String>,
    /// Cluster and entity metadata.
    pub metadata: VolumeMetadata,
    /// Backing disk object the volume wraps.
    pub backing_disk_id: DiskId,
    /// Policy compliance, defaulted by the simulator.
    pub compliance_status: ComplianceStatus,
    /// Health, defaulted by the simulator.
    pub health_status: HealthStatus,
    /// Datastore accessibility, defaulted by the simulator.
    pub accessibility_status: AccessibilityStatus,
}
