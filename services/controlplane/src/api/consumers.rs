//! Consumer API handlers (read-only, like producers).
use crate::api::error::{ApiError, from_ops};
use crate::api::types::StationNameRequest;
use crate::app::AppState;
use crate::handlers::{consumers, stations};
use crate::model::ExtendedConsumer;
use axum::Json;
use axum::extract::State;

#[utoipa::path(
    get,
    path = "/api/consumers/getAllConsumers",
    tag = "consumers",
    responses(
        (status = 200, description = "All consumers across stations", body = [ExtendedConsumer])
    )
)]
pub(crate) async fn get_all_consumers(
    State(state): State<AppState>,
) -> Result<Json<Vec<ExtendedConsumer>>, ApiError> {
    consumers::get_all_consumers(&state.core)
        .await
        .map(Json)
        .map_err(|err| from_ops(err, state.showable_status()))
}

#[utoipa::path(
    post,
    path = "/api/consumers/getAllConsumersByStation",
    tag = "consumers",
    request_body = StationNameRequest,
    responses(
        (status = 200, description = "Consumers of one station", body = [ExtendedConsumer]),
        (status = 404, description = "Station does not exist", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn get_all_consumers_by_station(
    State(state): State<AppState>,
    Json(body): Json<StationNameRequest>,
) -> Result<Json<Vec<ExtendedConsumer>>, ApiError> {
    let station = stations::get_station_by_name(&state.core, &body.station_name)
        .await
        .map_err(|err| from_ops(err, state.showable_status()))?
        .ok_or_else(|| {
            from_ops(
                crate::error::OpsError::NotFound("Station does not exist".to_string()),
                state.showable_status(),
            )
        })?;
    consumers::get_extended_by_station(&state.core, &station)
        .await
        .map(Json)
        .map_err(|err| from_ops(err, state.showable_status()))
}
