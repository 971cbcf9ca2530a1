//! The volume manager facade.
//!
//! Exposes the control-plane operation surface over the volume,
//! attachment, and snapshot registries. Every mutating operation is
//! submitted to the task scheduler and observed through an awaitable
//! handle; synchronous queries take the same state lock as the writers
//! so a torn state is never observable.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{info, warn};

use cnsim_disk::{DatastoreRef, DiskId, DiskStore, KeyValue};
use cnsim_task::{TaskHandle, TaskScheduler};

use crate::attach::AttachmentTracker;
use crate::config::SimConfig;
use crate::error::{ItemFault, TaskFault};
use crate::filter::{QueryFilter, SnapshotQueryFilter};
use crate::registry::VolumeRegistry;
use crate::result::{
    AttachInfo, BatchResult, DetachInfo, PlacementResult, QueryResult, SnapshotCreateInfo,
    SnapshotDeleteInfo, SnapshotQueryResult, VolumeCreateInfo, VolumeInfoEntry, VolumeOpInfo,
};
use crate::snapshot::{Snapshot, SnapshotRegistry};
use crate::types::{
    AccessibilityStatus, BackingSpec, ComplianceStatus, EntityMetadata, HealthStatus, NodeRef,
    SnapshotId, Volume, VolumeId, VolumeMetadata, VolumeType,
};

/// Disk UUID reported for every simulated attachment.
pub const SIMULATOR_DISK_UUID: &str = "6000c298595bf4575739e9105b2c0c2d";

/// Handle type of the task-wrapped operations.
pub type VolumeTask<T> = TaskHandle<BatchResult<T>, TaskFault>;

/// Request to create one volume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateVolumeSpec {
    /// Volume name.
    pub name: String,
    /// Volume kind.
    pub volume_type: VolumeType,
    /// Candidate datastores for placement; the first one is used.
    pub datastores: Vec<DatastoreRef>,
    /// Cluster and entity metadata to record on the volume.
    pub metadata: VolumeMetadata,
    /// Backing object details.
    pub backing: BackingSpec,
    /// Storage-policy profile ids; the first one becomes the volume's policy.
    pub profile: Vec<String>,
}

/// Request to grow one volume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendVolumeSpec {
    /// The volume to grow.
    pub volume_id: VolumeId,
    /// New capacity in megabytes.
    pub capacity_mb: u64,
}

/// Request to attach one volume to a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachVolumeSpec {
    /// The volume to attach.
    pub volume_id: VolumeId,
    /// The node to attach it to.
    pub node: NodeRef,
}

/// Request to detach one volume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetachVolumeSpec {
    /// The volume to detach.
    pub volume_id: VolumeId,
    /// The node named by the caller; detachment is keyed by volume only.
    pub node: NodeRef,
}

/// Request to replace one volume's entity metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataUpdateSpec {
    /// The volume to update.
    pub volume_id: VolumeId,
    /// Replacement entity-metadata list; not merged.
    pub entity_metadata: Vec<EntityMetadata>,
}

/// Request to snapshot one volume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotCreateSpec {
    /// The volume to snapshot.
    pub volume_id: VolumeId,
    /// Snapshot description.
    pub description: String,
}

/// Request to delete one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotDeleteSpec {
    /// The owning volume.
    pub volume_id: VolumeId,
    /// The snapshot to delete.
    pub snapshot_id: SnapshotId,
}

/// Mutable registries of one simulated service instance.
#[derive(Default)]
struct SimState {
    volumes: VolumeRegistry,
    attachments: AttachmentTracker,
    snapshots: SnapshotRegistry,
}

/// The control-plane facade.
///
/// Instantiated once per simulated service; instances share nothing, so
/// several can coexist in one test process. All registries sit behind a
/// single mutex, which is the serialization point for every operation.
pub struct VolumeManager {
    config: SimConfig,
    state: Arc<Mutex<SimState>>,
    disks: Arc<DiskStore>,
    scheduler: Arc<TaskScheduler>,
}

impl VolumeManager {
    /// Creates a manager with its own disk store and scheduler.
    pub fn new(config: SimConfig) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(SimState::default())),
            disks: Arc::new(DiskStore::new()),
            scheduler: Arc::new(TaskScheduler::new()),
        }
    }

    /// The backing disk store of this instance.
    ///
    /// Tests seed statically provisioned disks through this handle and
    /// observe the metadata the control plane pushes down.
    pub fn disk_store(&self) -> Arc<DiskStore> {
        Arc::clone(&self.disks)
    }

    /// Scheduler counters of this instance.
    pub fn scheduler_stats(&self) -> cnsim_task::SchedulerStats {
        self.scheduler.stats()
    }

    /// Creates a volume from exactly one create-spec.
    ///
    /// Lists of any other length are rejected, mirroring the modeled
    /// server. Only block backing is supported. Container-cluster
    /// metadata is synchronized down into the backing disk's tags.
    pub fn create_volume(&self, mut specs: Vec<CreateVolumeSpec>) -> VolumeTask<VolumeCreateInfo> {
        let state = Arc::clone(&self.state);
        let disks = Arc::clone(&self.disks);
        let config = self.config.clone();
        self.scheduler.submit("CreateVolume", move || {
            if specs.len() != 1 {
                return Err(TaskFault::invalid_argument("createSpecs"));
            }
            let spec = specs.remove(0);

            let BackingSpec::Block {
                backing_disk_id,
                capacity_mb,
            } = spec.backing
            else {
                return Err(TaskFault::invalid_argument("backingObjectDetails"));
            };

            let disk = match backing_disk_id {
                // static import: the disk must already be in the catalog
                Some(disk_id) => disks
                    .find(&disk_id)
                    .ok_or_else(|| TaskFault::invalid_argument("backingDiskId"))?,
                None => {
                    let Some(datastore) = spec.datastores.first() else {
                        return Err(TaskFault::invalid_argument("datastores"));
                    };
                    disks.create_disk(datastore, &spec.name, capacity_mb)
                }
            };

            let datastore = disk.datastore.clone();
            let volume_id = VolumeId::from(&disk.id);

            let cluster = &spec.metadata.container_cluster;
            let tags = [
                KeyValue::new("cluster-type", &cluster.cluster_type),
                KeyValue::new("cluster-id", &cluster.cluster_id),
                KeyValue::new("cluster-flavor", &cluster.cluster_flavor),
                KeyValue::new("cluster-user", &cluster.user),
            ];
            if let Err(err) = disks.update_metadata(&disk.id, &tags) {
                warn!(disk_id = %disk.id, %err, "could not tag backing disk");
            }

            let volume = Volume {
                id: volume_id.clone(),
                name: spec.name.clone(),
                volume_type: spec.volume_type,
                datastore: datastore.clone(),
                datastore_url: config.url_for(&datastore),
                capacity_mb: disk.capacity_mb,
                storage_policy_id: spec.profile.first().cloned(),
                metadata: spec.metadata,
                backing_disk_id: disk.id,
                compliance_status: ComplianceStatus::Compliant,
                health_status: HealthStatus::Green,
                accessibility_status: AccessibilityStatus::Accessible,
            };

            let mut state = state.lock();
            state.volumes.insert(datastore.clone(), volume);
            info!(volume_id = %volume_id, datastore = %datastore, "created volume");

            let mut batch = BatchResult::new();
            batch.push_ok(VolumeCreateInfo {
                volume_id,
                name: spec.name,
                placement: vec![PlacementResult { datastore }],
            });
            Ok(batch)
        })
    }

    /// Deletes exactly one volume by id.
    ///
    /// An unknown id is NOT a task failure: the task succeeds and its
    /// single item carries the not-found fault. With `delete_disk` the
    /// backing disk is removed too, and any disk store fault lands in
    /// the same item slot. Snapshots of the volume are left in place.
    pub fn delete_volume(
        &self,
        mut volume_ids: Vec<VolumeId>,
        delete_disk: bool,
    ) -> VolumeTask<VolumeOpInfo> {
        let state = Arc::clone(&self.state);
        let disks = Arc::clone(&self.disks);
        self.scheduler.submit("DeleteVolume", move || {
            if volume_ids.len() != 1 {
                return Err(TaskFault::invalid_argument("volumeIds"));
            }
            let volume_id = volume_ids.remove(0);

            let mut state = state.lock();
            let mut batch = BatchResult::new();
            match state.volumes.remove(&volume_id) {
                None => batch.push_fault(ItemFault::NotFound { volume_id }),
                Some(volume) => {
                    if delete_disk {
                        match disks.delete(&volume.backing_disk_id) {
                            Ok(()) => batch.push_ok(VolumeOpInfo { volume_id }),
                            Err(err) => batch.push_fault(err.into()),
                        }
                    } else {
                        batch.push_ok(VolumeOpInfo { volume_id });
                    }
                }
            }
            Ok(batch)
        })
    }

    /// Grows exactly one volume in place.
    ///
    /// Re-extending to the current capacity is a plain success.
    pub fn extend_volume(&self, mut specs: Vec<ExtendVolumeSpec>) -> VolumeTask<VolumeOpInfo> {
        let state = Arc::clone(&self.state);
        self.scheduler.submit("ExtendVolume", move || {
            if specs.len() != 1 {
                return Err(TaskFault::invalid_argument("extendSpecs"));
            }
            let spec = specs.remove(0);

            let mut state = state.lock();
            let mut batch = BatchResult::new();
            match state.volumes.find_mut(&spec.volume_id) {
                None => batch.push_fault(ItemFault::NotFound {
                    volume_id: spec.volume_id,
                }),
                Some(volume) => {
                    volume.capacity_mb = spec.capacity_mb;
                    info!(volume_id = %spec.volume_id, capacity_mb = spec.capacity_mb, "extended volume");
                    batch.push_ok(VolumeOpInfo {
                        volume_id: spec.volume_id,
                    });
                }
            }
            Ok(batch)
        })
    }

    /// Replaces entity metadata on each addressed volume.
    ///
    /// The list is replaced wholesale, not merged. Unknown ids are
    /// skipped silently with no item emitted.
    pub fn update_volume_metadata(
        &self,
        specs: Vec<MetadataUpdateSpec>,
    ) -> VolumeTask<VolumeOpInfo> {
        let state = Arc::clone(&self.state);
        self.scheduler.submit("UpdateVolumeMetadata", move || {
            if specs.is_empty() {
                return Err(TaskFault::invalid_argument("updateSpecs"));
            }

            let mut state = state.lock();
            let mut batch = BatchResult::new();
            for spec in specs {
                if let Some(volume) = state.volumes.find_mut(&spec.volume_id) {
                    volume.metadata.entity_metadata = spec.entity_metadata;
                    batch.push_ok(VolumeOpInfo {
                        volume_id: spec.volume_id,
                    });
                }
            }
            Ok(batch)
        })
    }

    /// Attaches each volume to its node.
    ///
    /// An already-attached volume fails the WHOLE task with a
    /// resource-in-use fault; items recorded before the conflict are
    /// kept attached. This is task-level on purpose, unlike the
    /// item-level faults of delete/extend.
    pub fn attach_volume(&self, specs: Vec<AttachVolumeSpec>) -> VolumeTask<AttachInfo> {
        let state = Arc::clone(&self.state);
        self.scheduler.submit("AttachVolume", move || {
            if specs.is_empty() {
                return Err(TaskFault::invalid_argument("attachSpecs"));
            }

            let mut state = state.lock();
            let mut batch = BatchResult::new();
            for spec in specs {
                match state.attachments.attach(spec.volume_id.clone(), spec.node) {
                    Ok(()) => batch.push_ok(AttachInfo {
                        volume_id: spec.volume_id,
                        disk_uuid: SIMULATOR_DISK_UUID.to_string(),
                    }),
                    Err(_holder) => {
                        return Err(TaskFault::ResourceInUse {
                            name: spec.volume_id.as_str().to_string(),
                        })
                    }
                }
            }
            Ok(batch)
        })
    }

    /// Detaches each volume.
    ///
    /// A volume with no recorded attachment fails the WHOLE task with
    /// an invalid-argument fault naming the volume id (task-level, like
    /// attach).
    pub fn detach_volume(&self, specs: Vec<DetachVolumeSpec>) -> VolumeTask<DetachInfo> {
        let state = Arc::clone(&self.state);
        self.scheduler.submit("DetachVolume", move || {
            if specs.is_empty() {
                return Err(TaskFault::invalid_argument("detachSpecs"));
            }

            let mut state = state.lock();
            let mut batch = BatchResult::new();
            for spec in specs {
                match state.attachments.detach(&spec.volume_id) {
                    Some(_) => batch.push_ok(DetachInfo {
                        volume_id: spec.volume_id,
                    }),
                    None => {
                        return Err(TaskFault::InvalidArgument {
                            property: spec.volume_id.as_str().to_string(),
                        })
                    }
                }
            }
            Ok(batch)
        })
    }

    /// Applies the full filter engine across all datastores.
    pub fn query_volume(&self, filter: &QueryFilter) -> QueryResult {
        let state = self.state.lock();
        QueryResult {
            volumes: state.volumes.scan(|ds, v| filter.matches(ds, v)),
            cursor: Default::default(),
        }
    }

    /// Like [`query_volume`](Self::query_volume), with a field-selection
    /// parameter that is accepted but never narrows the result shape:
    /// full volumes come back regardless of the selection.
    pub fn query_all_volume(&self, filter: &QueryFilter, _selection: &[String]) -> QueryResult {
        self.query_volume(filter)
    }

    /// Resolves each id against the backing disk catalog directly.
    ///
    /// This path does not consult the volume registry at all; the two
    /// can diverge when a volume exists in only one of them.
    pub fn query_volume_info(&self, volume_ids: Vec<VolumeId>) -> VolumeTask<VolumeInfoEntry> {
        let disks = Arc::clone(&self.disks);
        self.scheduler.submit("QueryVolumeInfo", move || {
            let mut batch = BatchResult::new();
            for volume_id in volume_ids {
                match disks.find(&DiskId::from(&volume_id)) {
                    Some(disk) => batch.push_ok(VolumeInfoEntry { volume_id, disk }),
                    None => batch.push_fault(ItemFault::NotFound { volume_id }),
                }
            }
            Ok(batch)
        })
    }

    /// Task-wrapped query filtering by explicit id-membership only.
    ///
    /// The remaining filter predicates are not applied here, and the
    /// cursor is always empty. The whole query result rides as the
    /// single item of the batch.
    pub fn query_async(&self, filter: QueryFilter, _selection: &[String]) -> VolumeTask<QueryResult> {
        let state = Arc::clone(&self.state);
        self.scheduler.submit("QueryAsync", move || {
            let state = state.lock();
            let volumes = state.volumes.scan(|_, v| match &filter.volume_ids {
                Some(ids) => ids.contains(&v.id),
                None => true,
            });
            let mut batch = BatchResult::new();
            batch.push_ok(QueryResult {
                volumes,
                cursor: Default::default(),
            });
            Ok(batch)
        })
    }

    /// Takes a snapshot per spec, one result item per matching volume.
    pub fn create_snapshots(
        &self,
        specs: Vec<SnapshotCreateSpec>,
    ) -> VolumeTask<SnapshotCreateInfo> {
        let state = Arc::clone(&self.state);
        self.scheduler.submit("CreateSnapshots", move || {
            if specs.is_empty() {
                return Err(TaskFault::invalid_argument("snapshotSpecs"));
            }

            let mut state = state.lock();
            let state = &mut *state;
            let mut batch = BatchResult::new();
            for spec in specs {
                // Scans each datastore's volume set in turn: a volume id
                // registered in more than one datastore would emit one
                // item per hit. Placement keeps ids unique per datastore,
                // and this scan depends on that.
                let matches: Vec<VolumeId> = state
                    .volumes
                    .iter()
                    .filter(|(_, v)| v.id == spec.volume_id)
                    .map(|(_, v)| v.id.clone())
                    .collect();
                for volume_id in matches {
                    let snapshot = Snapshot::create(volume_id.clone(), &spec.description);
                    info!(volume_id = %volume_id, snapshot_id = %snapshot.snapshot_id, "created snapshot");
                    state.snapshots.insert(snapshot.clone());
                    batch.push_ok(SnapshotCreateInfo { snapshot });
                }
            }
            Ok(batch)
        })
    }

    /// Deletes each addressed snapshot.
    ///
    /// Unknown (volume, snapshot) pairs still yield a success item with
    /// no fault, in contrast with the snapshot query on the same input.
    pub fn delete_snapshots(
        &self,
        specs: Vec<SnapshotDeleteSpec>,
    ) -> VolumeTask<SnapshotDeleteInfo> {
        let state = Arc::clone(&self.state);
        self.scheduler.submit("DeleteSnapshots", move || {
            if specs.is_empty() {
                return Err(TaskFault::invalid_argument("snapshotDeleteSpecs"));
            }

            let mut state = state.lock();
            let mut batch = BatchResult::new();
            for spec in specs {
                state.snapshots.remove(&spec.volume_id, &spec.snapshot_id);
                batch.push_ok(SnapshotDeleteInfo {
                    volume_id: spec.volume_id,
                    snapshot_id: spec.snapshot_id,
                });
            }
            Ok(batch)
        })
    }

    /// Queries snapshots; at most one query spec per call.
    ///
    /// No spec: every snapshot of every volume. An unknown volume id
    /// yields a single entry carrying the volume-not-found fault; a
    /// known volume with an unknown snapshot id yields a single entry
    /// carrying the snapshot-not-found fault.
    pub fn query_snapshots(
        &self,
        filter: SnapshotQueryFilter,
    ) -> TaskHandle<SnapshotQueryResult, TaskFault> {
        let state = Arc::clone(&self.state);
        self.scheduler.submit("QuerySnapshots", move || {
            if filter.specs.len() > 1 {
                return Err(TaskFault::invalid_argument("querySpecs"));
            }

            let state = state.lock();
            let mut result = SnapshotQueryResult::default();
            match filter.specs.into_iter().next() {
                None => {
                    result.entries = state.snapshots.all().into_iter().map(Ok).collect();
                }
                Some(spec) => {
                    if !state.volumes.contains(&spec.volume_id) {
                        result.entries.push(Err(ItemFault::VolumeNotFound {
                            volume_id: spec.volume_id,
                        }));
                    } else {
                        match spec.snapshot_id {
                            Some(snapshot_id) => {
                                match state.snapshots.get(&spec.volume_id, &snapshot_id) {
                                    Some(snapshot) => result.entries.push(Ok(snapshot.clone())),
                                    None => result.entries.push(Err(ItemFault::SnapshotNotFound {
                                        volume_id: spec.volume_id,
                                        snapshot_id,
                                    })),
                                }
                            }
                            None => {
                                result.entries = state
                                    .snapshots
                                    .snapshots_of(&spec.volume_id)
                                    .into_iter()
                                    .map(Ok)
                                    .collect();
                            }
                        }
                    }
                }
            }
            Ok(result)
        })
    }
}
