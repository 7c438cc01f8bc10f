//! Audit-log API handlers.
use crate::api::error::{ApiError, from_ops};
use crate::api::types::StationNameRequest;
use crate::app::AppState;
use crate::handlers::audit;
use crate::model::AuditLog;
use axum::Json;
use axum::extract::State;

#[utoipa::path(
    post,
    path = "/api/auditlogs/getAuditLogsByStation",
    tag = "auditlogs",
    request_body = StationNameRequest,
    responses(
        (status = 200, description = "Station history, newest first", body = [AuditLog])
    )
)]
pub(crate) async fn get_audit_logs_by_station(
    State(state): State<AppState>,
    Json(body): Json<StationNameRequest>,
) -> Result<Json<Vec<AuditLog>>, ApiError> {
    audit::get_by_station(&state.core, &body.station_name.to_lowercase())
        .await
        .map(Json)
        .map_err(|err| from_ops(err, state.showable_status()))
}
