//! The query surface: filter semantics, the independent info path, and
//! the id-only async query.

use cnsim_core::{ItemFault, QueryFilter, VolumeId};
use cnsim_disk::{DatastoreRef, DiskId, KeyValue};

use crate::harness::TestEnv;

#[tokio::test]
async fn test_no_filter_returns_everything() {
    let env = TestEnv::new();
    env.create_volume("pvc-a", 1).await.unwrap();
    env.create_volume("pvc-b", 1).await.unwrap();

    let result = env.manager().query_volume(&QueryFilter::match_all());
    assert_eq!(result.volumes.len(), 2);
    assert_eq!(result.cursor, Default::default());
}

#[tokio::test]
async fn test_empty_id_set_matches_nothing() {
    let env = TestEnv::new();
    env.create_volume("pvc-a", 1).await.unwrap();

    let result = env.manager().query_volume(&QueryFilter::by_ids([]));
    assert!(result.volumes.is_empty());
}

#[tokio::test]
async fn test_labels_or_within_and_across_categories() {
    let env = TestEnv::new();
    let id = env.create_volume("pvc-labeled", 1).await.unwrap();

    // one of two filter labels matches: passes
    let filter = QueryFilter {
        labels: Some(vec![
            KeyValue::new("app", "db"),
            KeyValue::new("app", "nothere"),
        ]),
        ..QueryFilter::default()
    };
    assert_eq!(env.manager().query_volume(&filter).volumes.len(), 1);

    // label passes but the name category fails: overall miss
    let filter = QueryFilter {
        labels: Some(vec![KeyValue::new("app", "db")]),
        names: Some(vec!["other-name".to_string()]),
        ..QueryFilter::default()
    };
    assert!(env.manager().query_volume(&filter).volumes.is_empty());

    // name category alone
    let filter = QueryFilter {
        names: Some(vec!["pvc-labeled".to_string()]),
        ..QueryFilter::default()
    };
    assert_eq!(
        env.manager().query_volume(&filter).volumes[0].id,
        id
    );
}

#[tokio::test]
async fn test_datastore_membership() {
    let env = TestEnv::new();
    env.create_volume("pvc-a", 1).await.unwrap();

    let hit = QueryFilter {
        datastores: Some(vec![DatastoreRef::new("LocalDS_0")]),
        ..QueryFilter::default()
    };
    assert_eq!(env.manager().query_volume(&hit).volumes.len(), 1);

    let miss = QueryFilter {
        datastores: Some(vec![DatastoreRef::new("LocalDS_1")]),
        ..QueryFilter::default()
    };
    assert!(env.manager().query_volume(&miss).volumes.is_empty());
}

#[tokio::test]
async fn test_query_all_volume_ignores_field_selection() {
    let env = TestEnv::new();
    env.create_volume("pvc-a", 1).await.unwrap();

    let selection = vec!["VOLUME_NAME".to_string(), "VOLUME_TYPE".to_string()];
    let narrowed = env
        .manager()
        .query_all_volume(&QueryFilter::match_all(), &selection);
    let full = env.manager().query_volume(&QueryFilter::match_all());

    // the selection never narrows the result shape
    assert_eq!(narrowed, full);
}

#[tokio::test]
async fn test_volume_info_joins_the_disk_catalog_not_the_registry() {
    let env = TestEnv::new();
    let id = env.create_volume("pvc-info", 1024).await.unwrap();

    // drop the volume but keep the backing disk
    env.manager()
        .delete_volume(vec![id.clone()], false)
        .wait()
        .await
        .unwrap();
    assert!(env
        .manager()
        .query_volume(&QueryFilter::by_ids([id.clone()]))
        .volumes
        .is_empty());

    // the info path still resolves, from the catalog
    let batch = env
        .manager()
        .query_volume_info(vec![id.clone()])
        .wait()
        .await
        .unwrap();
    let entry = batch.first().unwrap().as_ref().unwrap();
    assert_eq!(entry.disk.id, DiskId::from(&id));
    assert_eq!(entry.disk.capacity_mb, 1024);
}

#[tokio::test]
async fn test_volume_info_for_unknown_id_is_item_fault() {
    let env = TestEnv::new();
    let batch = env
        .manager()
        .query_volume_info(vec![VolumeId::new("missing")])
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
async fn test_query_async_applies_only_id_membership() {
    let env = TestEnv::new();
    let id = env.create_volume("pvc-async", 1).await.unwrap();

    // the name predicate would exclude the volume, but the async path
    // only honors id membership
    let filter = QueryFilter {
        volume_ids: Some(vec![id.clone()]),
        names: Some(vec!["does-not-match".to_string()]),
        ..QueryFilter::default()
    };
    let batch = env
        .manager()
        .query_async(filter, &[])
        .wait()
        .await
        .unwrap();

    assert_eq!(batch.len(), 1);
    let result = batch.first().unwrap().as_ref().unwrap();
    assert_eq!(result.volumes.len(), 1);
    assert_eq!(result.volumes[0].id, id);
    assert_eq!(result.cursor, Default::default());
}

#[tokio::test]
async fn test_query_async_without_ids_returns_everything() {
    let env = TestEnv::new();
    env.create_volume("pvc-a", 1).await.unwrap();
    env.create_volume("pvc-b", 1).await.unwrap();

    let batch = env
        .manager()
        .query_async(QueryFilter::match_all(), &[])
        .wait()
        .await
        .unwrap();
    assert_eq!(batch.first().unwrap().as_ref().unwrap().volumes.len(), 2);
}

#[tokio::test]
async fn test_manager_instances_share_nothing() {
    let a = TestEnv::new();
    let b = TestEnv::new();
    a.create_volume("pvc-a", 1).await.unwrap();

    assert_eq!(
        a.manager().query_volume(&QueryFilter::match_all()).volumes.len(),
        1
    );
    assert!(b
        .manager()
        .query_volume(&QueryFilter::match_all())
        .volumes
        .is_empty());
    assert_eq!(b.disks().disk_count(), 0);
}
