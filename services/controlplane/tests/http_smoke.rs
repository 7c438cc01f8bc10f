mod common;

use axum::http::StatusCode;
use common::{read_json, test_state};
use controlplane::app::build_router;
use http_helpers::{get_request, json_request};
use tower::ServiceExt;

const VALID_PROTO: &str = r#"syntax = "proto3"; message Order { string id = 1; }"#;

async fn app() -> axum::routing::RouterIntoService<axum::body::Body, ()> {
    build_router(test_state().await).into_service()
}

#[tokio::test]
async fn status_endpoint_reports_ok() {
    let app = app().await;
    let response = app.clone().oneshot(get_request("/api/status")).await.expect("status");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;
    assert_eq!(payload["status"], "ok");
}

#[tokio::test]
async fn schema_crud_and_version_flow() {
    let app = app().await;

    let create = json_request(
        "POST",
        "/api/schemas/createNewSchema",
        serde_json::json!({
            "name": "orders_schema",
            "type": "protobuf",
            "schema_content": VALID_PROTO,
            "message_struct_name": "Order",
            "tags": [{"name": "billing", "color": "blue"}]
        }),
    );
    let response = app.clone().oneshot(create).await.expect("create");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;
    assert_eq!(payload["name"], "orders_schema");

    // Same name again is a showable conflict.
    let duplicate = json_request(
        "POST",
        "/api/schemas/createNewSchema",
        serde_json::json!({
            "name": "ORDERS_SCHEMA",
            "type": "protobuf",
            "schema_content": VALID_PROTO,
            "message_struct_name": "Order"
        }),
    );
    let response = app.clone().oneshot(duplicate).await.expect("duplicate");
    assert_eq!(response.status().as_u16(), 666);

    let list = app
        .clone()
        .oneshot(get_request("/api/schemas/getAllSchemas"))
        .await
        .expect("list");
    assert_eq!(list.status(), StatusCode::OK);
    let payload = read_json(list).await;
    let items = payload.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["active_version_number"], 1);
    assert_eq!(items[0]["used"], false);
    assert_eq!(items[0]["tags"][0]["name"], "billing");

    let new_version = json_request(
        "POST",
        "/api/schemas/createNewVersion",
        serde_json::json!({
            "schema_name": "orders_schema",
            "schema_content": VALID_PROTO,
            "message_struct_name": "Order"
        }),
    );
    let response = app.clone().oneshot(new_version).await.expect("version");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;
    assert_eq!(payload["versions"].as_array().unwrap().len(), 2);

    let rollback = json_request(
        "POST",
        "/api/schemas/rollBackVersion",
        serde_json::json!({
            "schema_name": "orders_schema",
            "version_number": 2
        }),
    );
    let response = app.clone().oneshot(rollback).await.expect("rollback");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;
    let active: Vec<u64> = payload["versions"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|version| version["active"] == true)
        .map(|version| version["version_number"].as_u64().unwrap())
        .collect();
    assert_eq!(active, vec![2]);

    let details = json_request(
        "POST",
        "/api/schemas/getSchemaDetails",
        serde_json::json!({"schema_name": "orders_schema"}),
    );
    let response = app.clone().oneshot(details).await.expect("details");
    assert_eq!(response.status(), StatusCode::OK);

    let missing = json_request(
        "POST",
        "/api/schemas/getSchemaDetails",
        serde_json::json!({"schema_name": "ghost"}),
    );
    let response = app.clone().oneshot(missing).await.expect("missing");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn schema_validation_statuses() {
    let app = app().await;

    let valid = json_request(
        "POST",
        "/api/schemas/validateSchema",
        serde_json::json!({
            "type": "protobuf",
            "schema_content": VALID_PROTO,
            "message_struct_name": "Order"
        }),
    );
    let response = app.clone().oneshot(valid).await.expect("valid");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;
    assert_eq!(payload["is_valid"], true);

    // A parse failure is the dedicated schema-validation status.
    let invalid = json_request(
        "POST",
        "/api/schemas/validateSchema",
        serde_json::json!({
            "type": "protobuf",
            "schema_content": "message {",
            "message_struct_name": "Order"
        }),
    );
    let response = app.clone().oneshot(invalid).await.expect("invalid");
    assert_eq!(response.status().as_u16(), 555);
    let payload = read_json(response).await;
    assert!(
        payload["message"]
            .as_str()
            .unwrap()
            .starts_with("Your proto file is invalid:")
    );

    // Recognized-but-unsupported is distinct from unknown.
    let avro = json_request(
        "POST",
        "/api/schemas/validateSchema",
        serde_json::json!({"type": "avro", "schema_content": "{}"}),
    );
    let response = app.clone().oneshot(avro).await.expect("avro");
    assert_eq!(response.status().as_u16(), 666);
    let payload = read_json(response).await;
    assert_eq!(payload["code"], "unsupported");

    let bogus = json_request(
        "POST",
        "/api/schemas/validateSchema",
        serde_json::json!({"type": "bogus", "schema_content": "{}"}),
    );
    let response = app.clone().oneshot(bogus).await.expect("bogus");
    assert_eq!(response.status().as_u16(), 666);
    let payload = read_json(response).await;
    assert_eq!(payload["code"], "unsupported_type");

    // Protobuf without a message struct name is a plain validation error.
    let unnamed = json_request(
        "POST",
        "/api/schemas/validateSchema",
        serde_json::json!({"type": "protobuf", "schema_content": VALID_PROTO}),
    );
    let response = app.clone().oneshot(unnamed).await.expect("unnamed");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn name_boundaries_are_enforced() {
    let app = app().await;

    let too_long = "a".repeat(33);
    for bad_name in ["", too_long.as_str(), "Orders"] {
        let create = json_request(
            "POST",
            "/api/schemas/createNewSchema",
            serde_json::json!({
                "name": bad_name,
                "type": "protobuf",
                "schema_content": VALID_PROTO,
                "message_struct_name": "Order"
            }),
        );
        let response = app.clone().oneshot(create).await.expect("create");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "name: {bad_name:?}");
    }
}

#[tokio::test]
async fn factory_and_station_flow() {
    let app = app().await;

    let create_factory = json_request(
        "POST",
        "/api/factories/createFactory",
        serde_json::json!({"name": "plant", "description": "primary"}),
    );
    let response = app.clone().oneshot(create_factory).await.expect("factory");
    assert_eq!(response.status(), StatusCode::OK);

    let create_station = json_request(
        "POST",
        "/api/stations/createStation",
        serde_json::json!({
            "name": "orders",
            "factory_name": "plant",
            "retention": {"type": "time", "value": 3600000},
            "storage_type": "file",
            "replicas": 1,
            "dedup_window_ms": 0
        }),
    );
    let response = app.clone().oneshot(create_station).await.expect("station");
    assert_eq!(response.status(), StatusCode::OK);

    // Station against a missing factory is rejected.
    let orphan_station = json_request(
        "POST",
        "/api/stations/createStation",
        serde_json::json!({
            "name": "billing",
            "factory_name": "ghost",
            "retention": {"type": "time", "value": 3600000},
            "storage_type": "file",
            "replicas": 1
        }),
    );
    let response = app.clone().oneshot(orphan_station).await.expect("orphan");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Factory removal is refused while the station lives.
    let remove_factory = json_request(
        "POST",
        "/api/factories/removeFactory",
        serde_json::json!({"factory_name": "plant"}),
    );
    let response = app.clone().oneshot(remove_factory).await.expect("remove");
    assert_eq!(response.status().as_u16(), 666);

    // Bind a schema, check details, then remove the station.
    let create_schema = json_request(
        "POST",
        "/api/schemas/createNewSchema",
        serde_json::json!({
            "name": "orders_schema",
            "type": "protobuf",
            "schema_content": VALID_PROTO,
            "message_struct_name": "Order"
        }),
    );
    let response = app.clone().oneshot(create_schema).await.expect("schema");
    assert_eq!(response.status(), StatusCode::OK);

    let attach = json_request(
        "POST",
        "/api/stations/attachSchemaToStation",
        serde_json::json!({
            "station_name": "orders",
            "schema_name": "orders_schema",
            "version_number": 1
        }),
    );
    let response = app.clone().oneshot(attach).await.expect("attach");
    assert_eq!(response.status(), StatusCode::OK);

    let details = json_request(
        "POST",
        "/api/stations/getStationDetails",
        serde_json::json!({"station_name": "orders"}),
    );
    let response = app.clone().oneshot(details).await.expect("details");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;
    assert_eq!(payload["schema_binding"]["schema_name"], "orders_schema");
    assert_eq!(payload["schema_binding"]["version_number"], 1);

    let attach_missing_version = json_request(
        "POST",
        "/api/stations/attachSchemaToStation",
        serde_json::json!({
            "station_name": "orders",
            "schema_name": "orders_schema",
            "version_number": 9
        }),
    );
    let response = app
        .clone()
        .oneshot(attach_missing_version)
        .await
        .expect("attach missing");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let detach = json_request(
        "POST",
        "/api/stations/detachSchemaFromStation",
        serde_json::json!({"station_name": "orders"}),
    );
    let response = app.clone().oneshot(detach).await.expect("detach");
    assert_eq!(response.status(), StatusCode::OK);

    let remove_station = json_request(
        "POST",
        "/api/stations/removeStation",
        serde_json::json!({"station_name": "orders"}),
    );
    let response = app.clone().oneshot(remove_station).await.expect("remove station");
    assert_eq!(response.status(), StatusCode::OK);

    // With its station gone the factory can be removed.
    let remove_factory = json_request(
        "POST",
        "/api/factories/removeFactory",
        serde_json::json!({"factory_name": "plant"}),
    );
    let response = app.clone().oneshot(remove_factory).await.expect("remove factory");
    assert_eq!(response.status(), StatusCode::OK);

    // Audit history survives the soft delete.
    let logs = json_request(
        "POST",
        "/api/auditlogs/getAuditLogsByStation",
        serde_json::json!({"station_name": "orders"}),
    );
    let response = app.clone().oneshot(logs).await.expect("logs");
    let payload = read_json(response).await;
    assert!(!payload.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn tag_lifecycle_over_http() {
    let app = app().await;

    let create = json_request(
        "POST",
        "/api/tags/createTag",
        serde_json::json!({"name": "critical", "color": "red"}),
    );
    let response = app.clone().oneshot(create).await.expect("create");
    assert_eq!(response.status(), StatusCode::OK);
    let tag = read_json(response).await;

    let duplicate = json_request(
        "POST",
        "/api/tags/createTag",
        serde_json::json!({"name": "critical", "color": "blue"}),
    );
    let response = app.clone().oneshot(duplicate).await.expect("duplicate");
    assert_eq!(response.status().as_u16(), 666);

    let factory = json_request(
        "POST",
        "/api/factories/createFactory",
        serde_json::json!({"name": "plant"}),
    );
    let response = app.clone().oneshot(factory).await.expect("factory");
    let factory = read_json(response).await;
    let factory_id = factory["id"].as_str().unwrap();

    let attach = json_request(
        "POST",
        "/api/tags/attachTag",
        serde_json::json!({
            "name": "critical",
            "entity_kind": "factory",
            "entity_id": factory_id
        }),
    );
    let response = app.clone().oneshot(attach).await.expect("attach");
    assert_eq!(response.status(), StatusCode::OK);

    let by_entity = json_request(
        "POST",
        "/api/tags/getTagsByEntity",
        serde_json::json!({"entity_kind": "factory", "entity_id": factory_id}),
    );
    let response = app.clone().oneshot(by_entity).await.expect("by entity");
    let payload = read_json(response).await;
    assert_eq!(payload.as_array().unwrap().len(), 1);
    assert_eq!(payload[0]["id"], tag["id"]);

    let remove = json_request(
        "POST",
        "/api/tags/removeTag",
        serde_json::json!({"name": "critical"}),
    );
    let response = app.clone().oneshot(remove).await.expect("remove");
    assert_eq!(response.status(), StatusCode::OK);

    let by_entity = json_request(
        "POST",
        "/api/tags/getTagsByEntity",
        serde_json::json!({"entity_kind": "factory", "entity_id": factory_id}),
    );
    let response = app.clone().oneshot(by_entity).await.expect("by entity");
    let payload = read_json(response).await;
    assert!(payload.as_array().unwrap().is_empty());
}
