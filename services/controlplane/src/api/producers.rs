//! Producer API handlers (read-only: creation and destruction are in-band
//! control requests over the transport).
use crate::api::error::{ApiError, from_ops};
use crate::api::types::StationNameRequest;
use crate::app::AppState;
use crate::handlers::{producers, stations};
use crate::model::ExtendedProducer;
use axum::Json;
use axum::extract::State;

#[utoipa::path(
    get,
    path = "/api/producers/getAllProducers",
    tag = "producers",
    responses(
        (status = 200, description = "All producers across stations", body = [ExtendedProducer])
    )
)]
pub(crate) async fn get_all_producers(
    State(state): State<AppState>,
) -> Result<Json<Vec<ExtendedProducer>>, ApiError> {
    producers::get_all_producers(&state.core)
        .await
        .map(Json)
        .map_err(|err| from_ops(err, state.showable_status()))
}

#[utoipa::path(
    post,
    path = "/api/producers/getAllProducersByStation",
    tag = "producers",
    request_body = StationNameRequest,
    responses(
        (status = 200, description = "Producers of one station", body = [ExtendedProducer]),
        (status = 404, description = "Station does not exist", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn get_all_producers_by_station(
    State(state): State<AppState>,
    Json(body): Json<StationNameRequest>,
) -> Result<Json<Vec<ExtendedProducer>>, ApiError> {
    let station = stations::get_station_by_name(&state.core, &body.station_name)
        .await
        .map_err(|err| from_ops(err, state.showable_status()))?
        .ok_or_else(|| {
            from_ops(
                crate::error::OpsError::NotFound("Station does not exist".to_string()),
                state.showable_status(),
            )
        })?;
    producers::get_extended_by_station(&state.core, &station)
        .await
        .map(Json)
        .map_err(|err| from_ops(err, state.showable_status()))
}
