//! Test environment setup for the control-plane simulator.

use std::sync::{Arc, Once};

use anyhow::{anyhow, Result};

use cnsim_core::{
    BackingSpec, ContainerCluster, CreateVolumeSpec, Datastore, EntityMetadata, SimConfig,
    VolumeId, VolumeManager, VolumeMetadata, VolumeType,
};
use cnsim_disk::{DiskStore, KeyValue};

static TRACING: Once = Once::new();

fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .with_test_writer()
            .try_init();
    });
}

/// A simulated service instance plus convenience builders.
pub struct TestEnv {
    manager: VolumeManager,
}

impl TestEnv {
    /// Builds an instance with two datastores in its inventory.
    pub fn new() -> Self {
        init_tracing();
        let config = SimConfig {
            datastores: vec![Datastore::named("LocalDS_0"), Datastore::named("LocalDS_1")],
        };
        Self {
            manager: VolumeManager::new(config),
        }
    }

    /// The facade under test.
    pub fn manager(&self) -> &VolumeManager {
        &self.manager
    }

    /// The instance's backing disk store.
    pub fn disks(&self) -> Arc<DiskStore> {
        self.manager.disk_store()
    }

    /// A block create-spec targeting the first datastore.
    pub fn block_spec(name: &str, capacity_mb: u64) -> CreateVolumeSpec {
        CreateVolumeSpec {
            name: name.to_string(),
            volume_type: VolumeType::Block,
            datastores: vec![cnsim_disk::DatastoreRef::new("LocalDS_0")],
            metadata: VolumeMetadata {
                container_cluster: ContainerCluster {
                    cluster_type: "KUBERNETES".to_string(),
                    cluster_id: "cluster-1".to_string(),
                    cluster_flavor: "VANILLA".to_string(),
                    user: "admin@vsphere.local".to_string(),
                },
                entity_metadata: vec![EntityMetadata {
                    name: name.to_string(),
                    entity_type: "PERSISTENT_VOLUME".to_string(),
                    namespace: String::new(),
                    labels: vec![KeyValue::new("app", "db")],
                }],
            },
            backing: BackingSpec::Block {
                backing_disk_id: None,
                capacity_mb,
            },
            profile: Vec::new(),
        }
    }

    /// Creates a block volume and returns its id.
    pub async fn create_volume(&self, name: &str, capacity_mb: u64) -> Result<VolumeId> {
        self.create_volume_with(Self::block_spec(name, capacity_mb))
            .await
    }

    /// Creates a volume from the given spec and returns its id.
    pub async fn create_volume_with(&self, spec: CreateVolumeSpec) -> Result<VolumeId> {
        let batch = self
            .manager
            .create_volume(vec![spec])
            .wait()
            .await
            .map_err(|fault| anyhow!("create task failed: {fault}"))?;
        let item = batch
            .first()
            .ok_or_else(|| anyhow!("create batch was empty"))?;
        match item {
            Ok(info) => Ok(info.volume_id.clone()),
            Err(fault) => Err(anyhow!("create item faulted: {fault}")),
        }
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
