//! Control-plane HTTP application wiring.
//!
//! # Purpose
//! Builds the Axum router, configures middleware, and defines the shared
//! application state injected into handlers.
use crate::api;
use crate::api::openapi::ApiDoc;
use crate::core::Core;
use axum::Router;
use axum::routing::{get, post};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

#[derive(Clone)]
pub struct AppState {
    pub core: Arc<Core>,
}

impl AppState {
    pub fn showable_status(&self) -> u16 {
        self.core.config.showable_error_status
    }
}

pub fn build_router(state: AppState) -> Router {
    let trace_layer =
        TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
            tracing::info_span!(
                "http.request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version()
            )
        });

    Router::new()
        .route("/api/status", get(api::system::status))
        .route("/api/socket", get(api::socket::socket_handler))
        .route(
            "/api/schemas/createNewSchema",
            post(api::schemas::create_new_schema),
        )
        .route(
            "/api/schemas/getAllSchemas",
            get(api::schemas::get_all_schemas),
        )
        .route(
            "/api/schemas/getSchemaDetails",
            post(api::schemas::get_schema_details),
        )
        .route("/api/schemas/removeSchema", post(api::schemas::remove_schema))
        .route(
            "/api/schemas/createNewVersion",
            post(api::schemas::create_new_version),
        )
        .route(
            "/api/schemas/rollBackVersion",
            post(api::schemas::roll_back_version),
        )
        .route(
            "/api/schemas/validateSchema",
            post(api::schemas::validate_schema),
        )
        .route(
            "/api/stations/createStation",
            post(api::stations::create_station),
        )
        .route(
            "/api/stations/getAllStations",
            get(api::stations::get_all_stations),
        )
        .route(
            "/api/stations/getStationsByFactory",
            post(api::stations::get_stations_by_factory),
        )
        .route(
            "/api/stations/getStationDetails",
            post(api::stations::get_station_details),
        )
        .route(
            "/api/stations/getSchemaDetailsForStation",
            post(api::stations::get_schema_details_for_station),
        )
        .route(
            "/api/stations/attachSchemaToStation",
            post(api::stations::attach_schema_to_station),
        )
        .route(
            "/api/stations/detachSchemaFromStation",
            post(api::stations::detach_schema_from_station),
        )
        .route(
            "/api/stations/removeStation",
            post(api::stations::remove_station),
        )
        .route(
            "/api/factories/createFactory",
            post(api::factories::create_factory),
        )
        .route(
            "/api/factories/getAllFactories",
            get(api::factories::get_all_factories),
        )
        .route(
            "/api/factories/getFactoryDetails",
            post(api::factories::get_factory_details),
        )
        .route(
            "/api/factories/removeFactory",
            post(api::factories::remove_factory),
        )
        .route(
            "/api/producers/getAllProducers",
            get(api::producers::get_all_producers),
        )
        .route(
            "/api/producers/getAllProducersByStation",
            post(api::producers::get_all_producers_by_station),
        )
        .route(
            "/api/consumers/getAllConsumers",
            get(api::consumers::get_all_consumers),
        )
        .route(
            "/api/consumers/getAllConsumersByStation",
            post(api::consumers::get_all_consumers_by_station),
        )
        .route("/api/tags/createTag", post(api::tags::create_tag))
        .route("/api/tags/getAllTags", get(api::tags::get_all_tags))
        .route(
            "/api/tags/getTagsByEntity",
            post(api::tags::get_tags_by_entity),
        )
        .route("/api/tags/attachTag", post(api::tags::attach_tag))
        .route("/api/tags/detachTag", post(api::tags::detach_tag))
        .route("/api/tags/removeTag", post(api::tags::remove_tag))
        .route(
            "/api/auditlogs/getAuditLogsByStation",
            post(api::audit_logs::get_audit_logs_by_station),
        )
        .merge(
            utoipa_swagger_ui::SwaggerUi::new("/docs").url("/api/openapi.json", ApiDoc::openapi()),
        )
        .layer(trace_layer)
        .with_state(state)
}
