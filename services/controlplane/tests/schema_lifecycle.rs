mod common;

use common::test_core;
use controlplane::error::OpsError;
use controlplane::handlers::{schemas, stations};
use controlplane::handlers::stations::StationSpec;
use controlplane::handlers::factories;
use controlplane::model::{RetentionPolicy, RetentionType, StorageType};
use std::sync::Arc;

const VALID_PROTO: &str = r#"syntax = "proto3"; message Order { string id = 1; }"#;

#[tokio::test]
async fn version_lifecycle_active_flags() {
    let core = test_core().await;

    schemas::create_schema(&core, "s", "protobuf", VALID_PROTO, "Order", &[], "root")
        .await
        .expect("create");

    let details = schemas::get_schema_details(&core, "s").await.expect("details");
    assert_eq!(details.versions.len(), 1);
    assert!(details.versions[0].active);
    assert_eq!(details.versions[0].version_number, 1);

    let details = schemas::create_version(&core, "s", VALID_PROTO, "Order", "root")
        .await
        .expect("version 2");
    let actives: Vec<(u32, bool)> = details
        .versions
        .iter()
        .map(|version| (version.version_number, version.active))
        .collect();
    // Version 2 arrives inactive; version 1 stays active.
    assert!(actives.contains(&(1, true)));
    assert!(actives.contains(&(2, false)));

    let details = schemas::rollback_version(&core, "s", 2).await.expect("activate 2");
    let active: Vec<u32> = details
        .versions
        .iter()
        .filter(|version| version.active)
        .map(|version| version.version_number)
        .collect();
    assert_eq!(active, vec![2]);

    let details = schemas::rollback_version(&core, "s", 1).await.expect("back to 1");
    let active: Vec<u32> = details
        .versions
        .iter()
        .filter(|version| version.active)
        .map(|version| version.version_number)
        .collect();
    assert_eq!(active, vec![1]);

    // Rollback is idempotent: repeating it leaves the same flags.
    let details = schemas::rollback_version(&core, "s", 1).await.expect("again");
    let active_count = details.versions.iter().filter(|version| version.active).count();
    assert_eq!(active_count, 1);

    // Exactly one active version overall.
    let total_active = core
        .db
        .schema_versions
        .count(|version| version.active)
        .await
        .unwrap();
    assert_eq!(total_active, 1);
}

#[tokio::test]
async fn rollback_on_single_version_schema_is_a_noop_success() {
    let core = test_core().await;
    schemas::create_schema(&core, "s", "protobuf", VALID_PROTO, "Order", &[], "root")
        .await
        .expect("create");
    let details = schemas::rollback_version(&core, "s", 1).await.expect("noop");
    assert!(details.versions[0].active);

    let missing = schemas::rollback_version(&core, "s", 5).await;
    assert!(matches!(missing, Err(OpsError::NotFound(_))));
}

#[tokio::test]
async fn concurrent_create_schema_admits_exactly_one() {
    let core = test_core().await;

    let mut joins = Vec::new();
    for _ in 0..8 {
        let core = Arc::clone(&core);
        joins.push(tokio::spawn(async move {
            schemas::create_schema(&core, "s", "protobuf", VALID_PROTO, "Order", &[], "root").await
        }));
    }

    let mut successes = 0;
    let mut conflicts = 0;
    for join in joins {
        match join.await.unwrap() {
            Ok(_) => successes += 1,
            Err(OpsError::Conflict(_)) => conflicts += 1,
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }
    assert_eq!(successes, 1);
    assert_eq!(conflicts, 7);

    // Exactly one schema row and exactly one version row were written.
    assert_eq!(core.db.schemas.count(|_| true).await.unwrap(), 1);
    assert_eq!(core.db.schema_versions.count(|_| true).await.unwrap(), 1);
}

#[tokio::test]
async fn concurrent_create_version_has_no_gaps_or_duplicates() {
    let core = test_core().await;
    schemas::create_schema(&core, "s", "protobuf", VALID_PROTO, "Order", &[], "root")
        .await
        .expect("create");

    let mut joins = Vec::new();
    for _ in 0..8 {
        let core = Arc::clone(&core);
        joins.push(tokio::spawn(async move {
            schemas::create_version(&core, "s", VALID_PROTO, "Order", "root").await
        }));
    }

    let mut successes = 0;
    for join in joins {
        match join.await.unwrap() {
            Ok(_) => successes += 1,
            Err(OpsError::Conflict(message)) => assert_eq!(message, "Version already exists"),
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }
    assert!(successes >= 1);

    // Version numbers are a contiguous 1..=N run with no duplicates.
    let mut numbers: Vec<u32> = core
        .db
        .schema_versions
        .aggregate(|rows| rows.iter().map(|version| version.version_number).collect())
        .await
        .unwrap();
    numbers.sort_unstable();
    let expected: Vec<u32> = (1..=numbers.len() as u32).collect();
    assert_eq!(numbers, expected);
}

#[tokio::test]
async fn remove_schema_cascades_bindings_versions_and_row() {
    let core = test_core().await;

    factories::create_factory(&core, "plant", "", "root").await.expect("factory");
    stations::create_station(
        &core,
        StationSpec {
            name: "st".to_string(),
            factory_name: "plant".to_string(),
            retention: RetentionPolicy {
                retention_type: RetentionType::Time,
                value: 3_600_000,
            },
            storage_type: StorageType::File,
            replicas: 1,
            dedup_window_ms: 0,
        },
        "root",
    )
    .await
    .expect("station");

    schemas::create_schema(&core, "s", "protobuf", VALID_PROTO, "Order", &[], "root")
        .await
        .expect("schema");
    schemas::create_version(&core, "s", VALID_PROTO, "Order", "root")
        .await
        .expect("version 2");
    stations::attach_schema(&core, "st", "s", 2, "root")
        .await
        .expect("attach");

    let details = schemas::get_schema_details(&core, "s").await.expect("details");
    assert_eq!(details.used_stations, vec!["st".to_string()]);

    schemas::remove_schemas(&core, &["s".to_string()]).await.expect("remove");

    assert_eq!(core.db.schemas.count(|_| true).await.unwrap(), 0);
    assert_eq!(core.db.schema_versions.count(|_| true).await.unwrap(), 0);

    // The station survives with its binding cleared.
    let station = stations::get_station_by_name(&core, "st")
        .await
        .unwrap()
        .expect("station kept");
    assert!(station.schema_binding.is_none());

    // Removing a missing schema is not an error.
    schemas::remove_schemas(&core, &["ghost".to_string()])
        .await
        .expect("missing is skipped");
}

#[tokio::test]
async fn details_for_station_surface_update_available() {
    let core = test_core().await;

    factories::create_factory(&core, "plant", "", "root").await.expect("factory");
    stations::create_station(
        &core,
        StationSpec {
            name: "st".to_string(),
            factory_name: "plant".to_string(),
            retention: RetentionPolicy {
                retention_type: RetentionType::Time,
                value: 3_600_000,
            },
            storage_type: StorageType::File,
            replicas: 1,
            dedup_window_ms: 0,
        },
        "root",
    )
    .await
    .expect("station");

    schemas::create_schema(&core, "s", "protobuf", VALID_PROTO, "Order", &[], "root")
        .await
        .expect("schema");
    stations::attach_schema(&core, "st", "s", 1, "root").await.expect("attach");

    // While the bound version is active, only that version is returned.
    let station = stations::get_station_by_name(&core, "st").await.unwrap().unwrap();
    let binding = station.schema_binding.clone().expect("binding");
    let details = schemas::get_schema_details_for_station(&core, &binding)
        .await
        .expect("details");
    assert_eq!(details.versions.len(), 1);

    // Activate a newer version: the station's view now carries both the used
    // and the active version.
    schemas::create_version(&core, "s", VALID_PROTO, "Order", "root")
        .await
        .expect("version 2");
    schemas::rollback_version(&core, "s", 2).await.expect("activate 2");
    let details = schemas::get_schema_details_for_station(&core, &binding)
        .await
        .expect("details");
    assert_eq!(details.versions.len(), 2);
    assert_eq!(details.versions[0].version_number, 1);
    assert!(!details.versions[0].active);
    assert_eq!(details.versions[1].version_number, 2);
    assert!(details.versions[1].active);
}
