#![warn(missing_docs)]

//! cnsim core subsystem: the volume control-plane simulator.
//!
//! An in-memory, stateful model of a Cloud Native Storage volume manager
//! used to test clients without a real server. It tracks volumes, their
//! datastore placement, attachments, and snapshots; resolves queries
//! against composite filters; and wraps every mutating operation in an
//! asynchronous task with a two-level error model: the task's own
//! failure channel is distinct from per-item faults inside a successful
//! batch. State lives in process memory for the lifetime of the
//! simulated service instance.

pub mod attach;
pub mod config;
pub mod error;
pub mod filter;
pub mod manager;
pub mod registry;
pub mod result;
pub mod snapshot;
pub mod types;

pub use attach::AttachmentTracker;
pub use config::{Datastore, SimConfig};
pub use error::{ItemFault, TaskFault};
pub use filter::{QueryFilter, SnapshotQueryFilter, SnapshotQuerySpec};
pub use manager::{
    AttachVolumeSpec, CreateVolumeSpec, DetachVolumeSpec, ExtendVolumeSpec, MetadataUpdateSpec,
    SnapshotCreateSpec, SnapshotDeleteSpec, VolumeManager, VolumeTask, SIMULATOR_DISK_UUID,
};
pub use registry::VolumeRegistry;
pub use result::{
    AttachInfo, BatchResult, Cursor, DetachInfo, ItemResult, PlacementResult, QueryResult,
    SnapshotCreateInfo, SnapshotDeleteInfo, SnapshotQueryEntry, SnapshotQueryResult,
    VolumeCreateInfo, VolumeInfoEntry, VolumeOpInfo,
};
pub use snapshot::{Snapshot, SnapshotRegistry};
pub use types::{
    AccessibilityStatus, BackingSpec, ComplianceStatus, ContainerCluster, EntityMetadata,
    HealthStatus, NodeRef, SnapshotId, Volume, VolumeId, VolumeMetadata, VolumeType,
};
