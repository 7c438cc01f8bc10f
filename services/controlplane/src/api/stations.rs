//! Station API handlers.
use crate::api::error::{ApiError, from_ops};
use crate::api::request_user;
use crate::api::types::{
    AttachSchemaRequest, CreateStationRequest, FactoryNameRequest, StationNameRequest,
};
use crate::app::AppState;
use crate::error::OpsError;
use crate::handlers::{schemas, stations};
use crate::handlers::stations::StationSpec;
use crate::model::{SchemaDetails, Station, StationDetails};
use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;

#[utoipa::path(
    post,
    path = "/api/stations/createStation",
    tag = "stations",
    request_body = CreateStationRequest,
    responses(
        (status = 200, description = "Station created", body = Station),
        (status = 404, description = "Factory does not exist", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn create_station(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CreateStationRequest>,
) -> Result<Json<Station>, ApiError> {
    let user = request_user(&headers, &state);
    let spec = StationSpec {
        name: body.name,
        factory_name: body.factory_name,
        retention: body.retention,
        storage_type: body.storage_type,
        replicas: body.replicas,
        dedup_window_ms: body.dedup_window_ms,
    };
    stations::create_station(&state.core, spec, &user)
        .await
        .map(Json)
        .map_err(|err| from_ops(err, state.showable_status()))
}

#[utoipa::path(
    get,
    path = "/api/stations/getAllStations",
    tag = "stations",
    responses(
        (status = 200, description = "All live stations", body = [Station])
    )
)]
pub(crate) async fn get_all_stations(
    State(state): State<AppState>,
) -> Result<Json<Vec<Station>>, ApiError> {
    stations::get_all_stations(&state.core)
        .await
        .map(Json)
        .map_err(|err| from_ops(err, state.showable_status()))
}

#[utoipa::path(
    post,
    path = "/api/stations/getStationsByFactory",
    tag = "stations",
    request_body = FactoryNameRequest,
    responses(
        (status = 200, description = "Stations of one factory", body = [Station])
    )
)]
pub(crate) async fn get_stations_by_factory(
    State(state): State<AppState>,
    Json(body): Json<FactoryNameRequest>,
) -> Result<Json<Vec<Station>>, ApiError> {
    stations::get_stations_by_factory(&state.core, &body.factory_name)
        .await
        .map(Json)
        .map_err(|err| from_ops(err, state.showable_status()))
}

#[utoipa::path(
    post,
    path = "/api/stations/getStationDetails",
    tag = "stations",
    request_body = StationNameRequest,
    responses(
        (status = 200, description = "Station with handles and tags", body = StationDetails),
        (status = 404, description = "Station does not exist", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn get_station_details(
    State(state): State<AppState>,
    Json(body): Json<StationNameRequest>,
) -> Result<Json<StationDetails>, ApiError> {
    stations::get_station_details(&state.core, &body.station_name)
        .await
        .map(Json)
        .map_err(|err| from_ops(err, state.showable_status()))
}

// The schema view scoped to one station's binding; when the bound version is
// no longer active the reply also carries the active version, so a client can
// surface "update available".
#[utoipa::path(
    post,
    path = "/api/stations/getSchemaDetailsForStation",
    tag = "stations",
    request_body = StationNameRequest,
    responses(
        (status = 200, description = "Schema details for the station's binding", body = SchemaDetails),
        (status = 404, description = "Station missing or not bound", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn get_schema_details_for_station(
    State(state): State<AppState>,
    Json(body): Json<StationNameRequest>,
) -> Result<Json<SchemaDetails>, ApiError> {
    let result = async {
        let station = stations::get_station_by_name(&state.core, &body.station_name)
            .await?
            .ok_or_else(|| OpsError::NotFound("Station does not exist".to_string()))?;
        let binding = station.schema_binding.ok_or_else(|| {
            OpsError::NotFound("Station is not bound to a schema".to_string())
        })?;
        schemas::get_schema_details_for_station(&state.core, &binding).await
    }
    .await;
    result
        .map(Json)
        .map_err(|err| from_ops(err, state.showable_status()))
}

#[utoipa::path(
    post,
    path = "/api/stations/attachSchemaToStation",
    tag = "stations",
    request_body = AttachSchemaRequest,
    responses(
        (status = 200, description = "Schema attached")
    )
)]
pub(crate) async fn attach_schema_to_station(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<AttachSchemaRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = request_user(&headers, &state);
    stations::attach_schema(
        &state.core,
        &body.station_name,
        &body.schema_name,
        body.version_number,
        &user,
    )
    .await
    .map(|()| Json(serde_json::json!({})))
    .map_err(|err| from_ops(err, state.showable_status()))
}

#[utoipa::path(
    post,
    path = "/api/stations/detachSchemaFromStation",
    tag = "stations",
    request_body = StationNameRequest,
    responses(
        (status = 200, description = "Schema detached")
    )
)]
pub(crate) async fn detach_schema_from_station(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<StationNameRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = request_user(&headers, &state);
    stations::detach_schema(&state.core, &body.station_name, &user)
        .await
        .map(|()| Json(serde_json::json!({})))
        .map_err(|err| from_ops(err, state.showable_status()))
}

#[utoipa::path(
    post,
    path = "/api/stations/removeStation",
    tag = "stations",
    request_body = StationNameRequest,
    responses(
        (status = 200, description = "Station soft-deleted"),
        (status = 404, description = "Station does not exist", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn remove_station(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<StationNameRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = request_user(&headers, &state);
    stations::remove_station(&state.core, &body.station_name, &user)
        .await
        .map(|()| Json(serde_json::json!({})))
        .map_err(|err| from_ops(err, state.showable_status()))
}
