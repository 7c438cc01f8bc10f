mod common;

use bytes::Bytes;
use common::test_core;
use controlplane::core::Core;
use conveyor_transport::{
    ClientInfo, SUBJECT_CREATE_CONSUMER, SUBJECT_CREATE_PRODUCER, SUBJECT_DESTROY_PRODUCER,
};
use std::sync::Arc;

async fn connect(core: &Arc<Core>, username: &str) -> ClientInfo {
    core.transport
        .connect_client(core.as_ref(), None, "10.0.0.9:50412", username)
        .await
}

fn create_producer_payload(client: &ClientInfo, name: &str, station: &str) -> Bytes {
    Bytes::from(
        serde_json::json!({
            "name": name,
            "station_name": station,
            "connection_id": client.connection_id,
            "producer_type": "application",
        })
        .to_string(),
    )
}

#[tokio::test]
async fn create_producer_auto_creates_station_with_defaults() {
    let core = test_core().await;
    let client = connect(&core, "app_user").await;

    let reply = core
        .transport
        .dispatch(
            core.as_ref(),
            SUBJECT_CREATE_PRODUCER,
            create_producer_payload(&client, "p1", "orders"),
            &client.connection_id,
        )
        .await;
    assert!(reply.success, "reply: {:?}", reply.error);

    let station = core
        .db
        .stations
        .find_one(|row| row.name == "orders" && !row.is_deleted)
        .await
        .unwrap()
        .expect("auto-created station");
    let defaults = &core.config.default_station;
    assert_eq!(station.replicas, defaults.replicas);
    assert_eq!(station.storage_type, defaults.storage_type);
    assert_eq!(station.dedup_window_ms, defaults.dedup_window_ms);

    let default_factory = core
        .db
        .factories
        .find_one(|row| row.name == "general" && !row.is_deleted)
        .await
        .unwrap()
        .expect("default factory");
    assert_eq!(station.factory_id, default_factory.id);

    let producer = core
        .db
        .producers
        .find_one(|row| row.name == "p1")
        .await
        .unwrap()
        .expect("producer row");
    assert!(producer.is_active);
    assert!(!producer.is_deleted);
    assert_eq!(producer.station_id, station.id);

    // Two audit records: station-created and producer-created.
    let logs = core
        .db
        .audit_logs
        .find_many_sorted(
            |log| log.station_name == "orders",
            |log| log.creation_date,
            controlplane::store::SortOrder::Ascending,
        )
        .await
        .unwrap();
    assert_eq!(logs.len(), 2);
    assert!(logs[0].message.contains("Station orders has been created"));
    assert!(logs[1].message.contains("Producer p1 has been created"));
}

#[tokio::test]
async fn producer_name_rules_and_uniqueness() {
    let core = test_core().await;
    let client = connect(&core, "app_user").await;

    // Uppercase input is lowercased, not rejected.
    let reply = core
        .transport
        .dispatch(
            core.as_ref(),
            SUBJECT_CREATE_PRODUCER,
            create_producer_payload(&client, "P1", "orders"),
            &client.connection_id,
        )
        .await;
    assert!(reply.success);

    // Same (station, name) again is rejected.
    let reply = core
        .transport
        .dispatch(
            core.as_ref(),
            SUBJECT_CREATE_PRODUCER,
            create_producer_payload(&client, "p1", "orders"),
            &client.connection_id,
        )
        .await;
    assert!(!reply.success);
    assert_eq!(
        reply.error.as_deref(),
        Some("Producer name has to be unique per station")
    );

    // Invalid characters and bad types never reach the store.
    let reply = core
        .transport
        .dispatch(
            core.as_ref(),
            SUBJECT_CREATE_PRODUCER,
            create_producer_payload(&client, "p-2", "orders"),
            &client.connection_id,
        )
        .await;
    assert!(!reply.success);

    let reply = core
        .transport
        .dispatch(
            core.as_ref(),
            SUBJECT_CREATE_PRODUCER,
            Bytes::from(
                serde_json::json!({
                    "name": "p2",
                    "station_name": "orders",
                    "connection_id": client.connection_id,
                    "producer_type": "webhook",
                })
                .to_string(),
            ),
            &client.connection_id,
        )
        .await;
    assert!(!reply.success);
    assert_eq!(core.db.producers.count(|_| true).await.unwrap(), 1);
}

#[tokio::test]
async fn destroy_is_terminal_and_idempotently_not_found() {
    let core = test_core().await;
    let client = connect(&core, "app_user").await;

    let reply = core
        .transport
        .dispatch(
            core.as_ref(),
            SUBJECT_CREATE_PRODUCER,
            create_producer_payload(&client, "p1", "orders"),
            &client.connection_id,
        )
        .await;
    assert!(reply.success);

    let destroy = Bytes::from(
        serde_json::json!({"name": "p1", "station_name": "orders"}).to_string(),
    );
    let reply = core
        .transport
        .dispatch(
            core.as_ref(),
            SUBJECT_DESTROY_PRODUCER,
            destroy.clone(),
            &client.connection_id,
        )
        .await;
    assert!(reply.success);

    let producer = core
        .db
        .producers
        .find_one(|row| row.name == "p1")
        .await
        .unwrap()
        .expect("row kept");
    assert!(producer.is_deleted);
    assert!(!producer.is_active);

    // Second destroy finds nothing and changes nothing.
    let reply = core
        .transport
        .dispatch(
            core.as_ref(),
            SUBJECT_DESTROY_PRODUCER,
            destroy,
            &client.connection_id,
        )
        .await;
    assert!(!reply.success);
    assert_eq!(reply.error.as_deref(), Some("Producer does not exist"));

    // Recreating the name yields a fresh identity.
    let reply = core
        .transport
        .dispatch(
            core.as_ref(),
            SUBJECT_CREATE_PRODUCER,
            create_producer_payload(&client, "p1", "orders"),
            &client.connection_id,
        )
        .await;
    assert!(reply.success);
    let rows = core
        .db
        .producers
        .find_many_sorted(
            |row| row.name == "p1",
            |row| row.creation_date,
            controlplane::store::SortOrder::Ascending,
        )
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert_ne!(rows[0].id, rows[1].id);
}

#[tokio::test]
async fn disconnect_reconnect_round_trip_restores_exactly_the_survivors() {
    let core = test_core().await;
    let client = connect(&core, "app_user").await;

    for name in ["p1", "p2", "p3"] {
        let reply = core
            .transport
            .dispatch(
                core.as_ref(),
                SUBJECT_CREATE_PRODUCER,
                create_producer_payload(&client, name, "orders"),
                &client.connection_id,
            )
            .await;
        assert!(reply.success);
    }
    // p3 is destroyed before the drop: it must stay deleted across the
    // round trip.
    let reply = core
        .transport
        .dispatch(
            core.as_ref(),
            SUBJECT_DESTROY_PRODUCER,
            Bytes::from(serde_json::json!({"name": "p3", "station_name": "orders"}).to_string()),
            &client.connection_id,
        )
        .await;
    assert!(reply.success);

    core.transport
        .disconnect_client(core.as_ref(), &client.connection_id)
        .await;
    assert_eq!(
        core.db
            .producers
            .count(|row| row.is_active)
            .await
            .unwrap(),
        0
    );
    let connection_row = core
        .db
        .connections
        .find_one(|row| row.id == client.connection_id)
        .await
        .unwrap()
        .expect("connection row");
    assert!(!connection_row.is_active);

    // One disconnect audit record per killed producer (p1 and p2).
    let disconnect_logs = core
        .db
        .audit_logs
        .count(|log| log.message.contains("has been disconnected"))
        .await
        .unwrap();
    assert_eq!(disconnect_logs, 2);

    // Reconnect under the same connection id relives only non-deleted rows.
    core.transport
        .connect_client(
            core.as_ref(),
            Some(client.connection_id.clone()),
            "10.0.0.9:50999",
            "app_user",
        )
        .await;
    let relived = core
        .db
        .producers
        .find_many_sorted(
            |row| row.is_active,
            |row| row.name.clone(),
            controlplane::store::SortOrder::Ascending,
        )
        .await
        .unwrap();
    let names: Vec<&str> = relived.iter().map(|row| row.name.as_str()).collect();
    assert_eq!(names, ["p1", "p2"]);
}

#[tokio::test]
async fn consumer_create_carries_group_and_delivery_fields() {
    let core = test_core().await;
    let client = connect(&core, "app_user").await;

    let reply = core
        .transport
        .dispatch(
            core.as_ref(),
            SUBJECT_CREATE_CONSUMER,
            Bytes::from(
                serde_json::json!({
                    "name": "c1",
                    "station_name": "orders",
                    "connection_id": client.connection_id,
                    "consumer_type": "application",
                    "consumers_group": "cg_orders",
                    "max_ack_time_ms": 30000,
                    "max_msg_deliveries": 10,
                })
                .to_string(),
            ),
            &client.connection_id,
        )
        .await;
    assert!(reply.success, "reply: {:?}", reply.error);

    let consumer = core
        .db
        .consumers
        .find_one(|row| row.name == "c1")
        .await
        .unwrap()
        .expect("consumer row");
    assert!(consumer.is_active);
    assert_eq!(consumer.consumers_group, "cg_orders");
    assert_eq!(consumer.max_ack_time_ms, 30000);
    assert_eq!(consumer.max_msg_deliveries, 10);

    // The consumer path auto-created the station too.
    assert!(
        core.db
            .stations
            .find_one(|row| row.name == "orders" && !row.is_deleted)
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn create_producer_requires_live_connection() {
    let core = test_core().await;
    let client = connect(&core, "app_user").await;
    core.transport
        .disconnect_client(core.as_ref(), &client.connection_id)
        .await;

    // The connection row exists but is inactive; the transport also no longer
    // lists the socket, so dispatch refuses before the handler runs.
    let reply = core
        .transport
        .dispatch(
            core.as_ref(),
            SUBJECT_CREATE_PRODUCER,
            create_producer_payload(&client, "p1", "orders"),
            &client.connection_id,
        )
        .await;
    assert!(!reply.success);
    assert_eq!(core.db.producers.count(|_| true).await.unwrap(), 0);
}
