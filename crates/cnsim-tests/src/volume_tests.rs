//! Volume lifecycle: create, delete, extend, metadata updates.

use cnsim_core::{
    BackingSpec, ExtendVolumeSpec, ItemFault, MetadataUpdateSpec, QueryFilter, TaskFault,
    VolumeId,
};
use cnsim_disk::{DatastoreRef, DiskId, KeyValue};

use crate::harness::TestEnv;

#[tokio::test]
async fn test_created_volume_is_queryable_with_placement() {
    let env = TestEnv::new();
    let id = env.create_volume("pvc-web", 2048).await.unwrap();

    let result = env
        .manager()
        .query_volume(&QueryFilter::by_ids([id.clone()]));
    assert_eq!(result.volumes.len(), 1);

    let volume = &result.volumes[0];
    assert_eq!(volume.id, id);
    assert_eq!(volume.name, "pvc-web");
    assert_eq!(volume.capacity_mb, 2048);
    assert_eq!(volume.datastore, DatastoreRef::new("LocalDS_0"));
    assert_eq!(volume.datastore_url, "ds:///vmfs/volumes/LocalDS_0/");
}

#[tokio::test]
async fn test_create_reports_name_and_placement_in_result() {
    let env = TestEnv::new();
    let batch = env
        .manager()
        .create_volume(vec![TestEnv::block_spec("pvc-db", 1024)])
        .wait()
        .await
        .unwrap();

    assert_eq!(batch.len(), 1);
    let info = batch.first().unwrap().as_ref().unwrap();
    assert_eq!(info.name, "pvc-db");
    assert_eq!(info.placement.len(), 1);
    assert_eq!(info.placement[0].datastore, DatastoreRef::new("LocalDS_0"));
}

#[tokio::test]
async fn test_cluster_metadata_lands_on_backing_disk() {
    let env = TestEnv::new();
    let id = env.create_volume("pvc-tagged", 512).await.unwrap();

    let tags = env.disks().metadata(&DiskId::from(&id)).unwrap();
    assert!(tags.contains(&KeyValue::new("cluster-type", "KUBERNETES")));
    assert!(tags.contains(&KeyValue::new("cluster-id", "cluster-1")));
    assert!(tags.contains(&KeyValue::new("cluster-flavor", "VANILLA")));
    assert!(tags.contains(&KeyValue::new("cluster-user", "admin@vsphere.local")));
}

#[tokio::test]
async fn test_static_import_uses_registered_disk() {
    let env = TestEnv::new();
    let disk = env
        .disks()
        .register_disk(
            &DatastoreRef::new("LocalDS_1"),
            DiskId::new("imported-disk-1"),
            "imported",
            4096,
        )
        .unwrap();

    let mut spec = TestEnv::block_spec("pvc-imported", 0);
    spec.backing = BackingSpec::Block {
        backing_disk_id: Some(disk.id.clone()),
        capacity_mb: 4096,
    };
    // placement candidates are ignored on the static path
    spec.datastores.clear();

    let id = env.create_volume_with(spec).await.unwrap();
    assert_eq!(id.as_str(), "imported-disk-1");

    let result = env.manager().query_volume(&QueryFilter::by_ids([id]));
    assert_eq!(result.volumes[0].datastore, DatastoreRef::new("LocalDS_1"));
    assert_eq!(result.volumes[0].capacity_mb, 4096);
}

#[tokio::test]
async fn test_static_import_of_unknown_disk_fails_the_task() {
    let env = TestEnv::new();
    let mut spec = TestEnv::block_spec("pvc-ghost", 1024);
    spec.backing = BackingSpec::Block {
        backing_disk_id: Some(DiskId::new("no-such-disk")),
        capacity_mb: 1024,
    };

    let err = env
        .manager()
        .create_volume(vec![spec])
        .wait()
        .await
        .unwrap_err();
    assert_eq!(err, TaskFault::invalid_argument("backingDiskId"));
}

#[tokio::test]
async fn test_profile_seeds_storage_policy_id() {
    let env = TestEnv::new();
    let mut spec = TestEnv::block_spec("pvc-gold", 1024);
    spec.profile = vec!["gold-policy".to_string(), "ignored".to_string()];

    let id = env.create_volume_with(spec).await.unwrap();
    let result = env.manager().query_volume(&QueryFilter::by_ids([id]));
    assert_eq!(
        result.volumes[0].storage_policy_id.as_deref(),
        Some("gold-policy")
    );
}

#[tokio::test]
async fn test_delete_unknown_volume_succeeds_with_item_fault() {
    let env = TestEnv::new();
    let batch = env
        .manager()
        .delete_volume(vec![VolumeId::new("missing")], false)
        .wait()
        .await
        .unwrap();

    assert_eq!(batch.len(), 1);
    assert_eq!(
        batch.first().unwrap().as_ref().unwrap_err(),
        &ItemFault::NotFound {
            volume_id: VolumeId::new("missing")
        }
    );
}

#[tokio::test]
async fn test_delete_requires_exactly_one_id() {
    let env = TestEnv::new();
    let err = env
        .manager()
        .delete_volume(vec![VolumeId::new("a"), VolumeId::new("b")], false)
        .wait()
        .await
        .unwrap_err();
    assert_eq!(err, TaskFault::invalid_argument("volumeIds"));
}

#[tokio::test]
async fn test_delete_with_disk_removes_catalog_entry() {
    let env = TestEnv::new();
    let id = env.create_volume("pvc-doomed", 1024).await.unwrap();
    assert_eq!(env.disks().disk_count(), 1);

    let batch = env
        .manager()
        .delete_volume(vec![id.clone()], true)
        .wait()
        .await
        .unwrap();
    assert!(batch.first().unwrap().is_ok());
    assert_eq!(env.disks().disk_count(), 0);
}

#[tokio::test]
async fn test_delete_without_disk_keeps_catalog_entry() {
    let env = TestEnv::new();
    let id = env.create_volume("pvc-kept", 1024).await.unwrap();

    env.manager()
        .delete_volume(vec![id.clone()], false)
        .wait()
        .await
        .unwrap();
    assert!(env.disks().find(&DiskId::from(&id)).is_some());
}

#[tokio::test]
async fn test_extend_updates_capacity_and_is_idempotent() {
    let env = TestEnv::new();
    let id = env.create_volume("pvc-grow", 1024).await.unwrap();

    for _ in 0..2 {
        let batch = env
            .manager()
            .extend_volume(vec![ExtendVolumeSpec {
                volume_id: id.clone(),
                capacity_mb: 8192,
            }])
            .wait()
            .await
            .unwrap();
        assert!(batch.first().unwrap().is_ok());
    }

    let result = env.manager().query_volume(&QueryFilter::by_ids([id]));
    assert_eq!(result.volumes[0].capacity_mb, 8192);
}

#[tokio::test]
async fn test_extend_unknown_volume_is_item_fault() {
    let env = TestEnv::new();
    let batch = env
        .manager()
        .extend_volume(vec![ExtendVolumeSpec {
            volume_id: VolumeId::new("missing"),
            capacity_mb: 1,
        }])
        .wait()
        .await
        .unwrap();

    assert_eq!(
        batch.first().unwrap().as_ref().unwrap_err(),
        &ItemFault::NotFound {
            volume_id: VolumeId::new("missing")
        }
    );
}

#[tokio::test]
async fn test_metadata_update_replaces_wholesale_and_skips_unknown() {
    let env = TestEnv::new();
    let id = env.create_volume("pvc-meta", 1024).await.unwrap();

    let replacement = vec![cnsim_core::EntityMetadata {
        name: "pvc-meta-claim".to_string(),
        entity_type: "PERSISTENT_VOLUME_CLAIM".to_string(),
        namespace: "prod".to_string(),
        labels: vec![KeyValue::new("tier", "frontend")],
    }];

    let batch = env
        .manager()
        .update_volume_metadata(vec![
            MetadataUpdateSpec {
                volume_id: id.clone(),
                entity_metadata: replacement.clone(),
            },
            MetadataUpdateSpec {
                volume_id: VolumeId::new("missing"),
                entity_metadata: Vec::new(),
            },
        ])
        .wait()
        .await
        .unwrap();

    // the unknown id produced no item at all
    assert_eq!(batch.len(), 1);

    let result = env.manager().query_volume(&QueryFilter::by_ids([id]));
    assert_eq!(result.volumes[0].metadata.entity_metadata, replacement);
}

#[tokio::test]
async fn test_metadata_update_requires_specs() {
    let env = TestEnv::new();
    let err = env
        .manager()
        .update_volume_metadata(Vec::new())
        .wait()
        .await
        .unwrap_err();
    assert_eq!(err, TaskFault::invalid_argument("updateSpecs"));
}
