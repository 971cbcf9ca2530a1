//! The per-datastore disk catalog.

use std::collections::HashMap;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::disk::{DatastoreRef, DiskId, KeyValue, VirtualDisk};
use crate::error::{DiskError, DiskResult};

/// Counters describing catalog activity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiskStoreStats {
    /// Disks created through [`DiskStore::create_disk`].
    pub created: u64,
    /// Disks imported through [`DiskStore::register_disk`].
    pub registered: u64,
    /// Disks removed through [`DiskStore::delete`].
    pub deleted: u64,
}

#[derive(Default)]
struct Catalog {
    disks: HashMap<DatastoreRef, HashMap<DiskId, VirtualDisk>>,
    stats: DiskStoreStats,
}

/// In-memory catalog of virtual disk objects, keyed by (datastore, disk-id).
///
/// Lookups by disk id scan every datastore; the catalog keeps no global
/// index, mirroring the control plane's own registry discipline.
pub struct DiskStore {
    catalog: RwLock<Catalog>,
}

impl DiskStore {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self {
            catalog: RwLock::new(Catalog::default()),
        }
    }

    /// Creates a new disk on the given datastore and returns it.
    pub fn create_disk(
        &self,
        datastore: &DatastoreRef,
        name: &str,
        capacity_mb: u64,
    ) -> VirtualDisk {
        let disk = Self::build_disk(DiskId::generate(), datastore, name, capacity_mb);
        let mut catalog = self.catalog.write();
        catalog
            .disks
            .entry(datastore.clone())
            .or_default()
            .insert(disk.id.clone(), disk.clone());
        catalog.stats.created += 1;
        info!(disk_id = %disk.id, datastore = %datastore, capacity_mb, "created backing disk");
        disk
    }

    /// Imports an existing disk under a caller-chosen identifier.
    ///
    /// This is how statically provisioned disks enter the catalog before
    /// a volume is created over them.
    pub fn register_disk(
        &self,
        datastore: &DatastoreRef,
        id: DiskId,
        name: &str,
        capacity_mb: u64,
    ) -> DiskResult<VirtualDisk> {
        let mut catalog = self.catalog.write();
        if catalog.disks.values().any(|disks| disks.contains_key(&id)) {
            return Err(DiskError::AlreadyExists { disk_id: id });
        }
        let disk = Self::build_disk(id, datastore, name, capacity_mb);
        catalog
            .disks
            .entry(datastore.clone())
            .or_default()
            .insert(disk.id.clone(), disk.clone());
        catalog.stats.registered += 1;
        info!(disk_id = %disk.id, datastore = %datastore, "registered backing disk");
        Ok(disk)
    }

    /// Finds a disk by id, scanning all datastores.
    pub fn find(&self, id: &DiskId) -> Option<VirtualDisk> {
        let catalog = self.catalog.read();
        catalog
            .disks
            .values()
            .find_map(|disks| disks.get(id))
            .cloned()
    }

    /// Removes a disk from the catalog.
    pub fn delete(&self, id: &DiskId) -> DiskResult<()> {
        let mut catalog = self.catalog.write();
        let catalog = &mut *catalog;
        for disks in catalog.disks.values_mut() {
            if disks.remove(id).is_some() {
                catalog.stats.deleted += 1;
                debug!(disk_id = %id, "deleted backing disk");
                return Ok(());
            }
        }
        Err(DiskError::NotFound {
            disk_id: id.clone(),
        })
    }

    /// Upserts descriptive tags on a disk, replacing values for existing keys.
    pub fn update_metadata(&self, id: &DiskId, tags: &[KeyValue]) -> DiskResult<()> {
        let mut catalog = self.catalog.write();
        let disk = catalog
            .disks
            .values_mut()
            .find_map(|disks| disks.get_mut(id))
            .ok_or_else(|| DiskError::NotFound {
                disk_id: id.clone(),
            })?;
        for tag in tags {
            match disk.metadata.iter_mut().find(|kv| kv.key == tag.key) {
                Some(existing) => existing.value = tag.value.clone(),
                None => disk.metadata.push(tag.clone()),
            }
        }
        debug!(disk_id = %id, tags = tags.len(), "updated disk metadata");
        Ok(())
    }

    /// Returns the descriptive tags attached to a disk.
    pub fn metadata(&self, id: &DiskId) -> DiskResult<Vec<KeyValue>> {
        self.find(id)
            .map(|disk| disk.metadata)
            .ok_or_else(|| DiskError::NotFound {
                disk_id: id.clone(),
            })
    }

    /// Total number of disks across all datastores.
    pub fn disk_count(&self) -> usize {
        let catalog = self.catalog.read();
        catalog.disks.values().map(HashMap::len).sum()
    }

    /// Snapshot of the catalog counters.
    pub fn stats(&self) -> DiskStoreStats {
        self.catalog.read().stats.clone()
    }

    fn build_disk(
        id: DiskId,
        datastore: &DatastoreRef,
        name: &str,
        capacity_mb: u64,
    ) -> VirtualDisk {
        let created_at_secs = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let file_path = format!("[{}] fcd/{}.vmdk", datastore, id);
        VirtualDisk {
            id,
            datastore: datastore.clone(),
            name: name.to_string(),
            capacity_mb,
            file_path,
            metadata: Vec::new(),
            created_at_secs,
        }
    }
}

impl Default for DiskStore {
    fn default() -> Self {
        Self::new()
    }
}
