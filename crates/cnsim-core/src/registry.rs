//! The volume registry: a two-level index, datastore to volume id to volume.
//!
//! There is deliberately no global id index; lookups by id scan every
//! datastore. Correctness of cross-datastore operations depends on each
//! volume id living in exactly one datastore.

use std::collections::HashMap;

use tracing::debug;

use cnsim_disk::DatastoreRef;

use crate::types::{Volume, VolumeId};

/// Two-level volume index.
#[derive(Debug, Default)]
pub struct VolumeRegistry {
    volumes: HashMap<DatastoreRef, HashMap<VolumeId, Volume>>,
}

impl VolumeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a volume under the given datastore.
    pub fn insert(&mut self, datastore: DatastoreRef, volume: Volume) {
        debug!(volume_id = %volume.id, datastore = %datastore, "registered volume");
        self.volumes
            .entry(datastore)
            .or_default()
            .insert(volume.id.clone(), volume);
    }

    /// Finds a volume by id, scanning all datastores.
    pub fn find(&self, id: &VolumeId) -> Option<(&DatastoreRef, &Volume)> {
        self.volumes
            .iter()
            .find_map(|(ds, volumes)| volumes.get(id).map(|v| (ds, v)))
    }

    /// Finds a volume by id for mutation, scanning all datastores.
    pub fn find_mut(&mut self, id: &VolumeId) -> Option<&mut Volume> {
        self.volumes
            .values_mut()
            .find_map(|volumes| volumes.get_mut(id))
    }

    /// Removes a volume by id, scanning all datastores.
    pub fn remove(&mut self, id: &VolumeId) -> Option<Volume> {
        for (ds, volumes) in self.volumes.iter_mut() {
            if let Some(volume) = volumes.remove(id) {
                debug!(volume_id = %id, datastore = %ds, "removed volume");
                return Some(volume);
            }
        }
        None
    }

    /// True when a volume with this id exists in any datastore.
    pub fn contains(&self, id: &VolumeId) -> bool {
        self.find(id).is_some()
    }

    /// Iterates every (datastore, volume) pair.
    pub fn iter(&self) -> impl Iterator<Item = (&DatastoreRef, &Volume)> {
        self.volumes
            .iter()
            .flat_map(|(ds, volumes)| volumes.values().map(move |v| (ds, v)))
    }

    /// Collects clones of all volumes matching the predicate.
    pub fn scan<F>(&self, predicate: F) -> Vec<Volume>
    where
        F: Fn(&DatastoreRef, &Volume) -> bool,
    {
        self.iter()
            .filter(|(ds, v)| predicate(ds, v))
            .map(|(_, v)| v.clone())
            .collect()
    }

    /// Total number of volumes across all datastores.
    pub fn len(&self) -> usize {
        self.volumes.values().map(HashMap::len).sum()
    }

    /// True when no volumes are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
