//! Schema API handlers.
use crate::api::error::{ApiError, from_ops};
use crate::api::types::{
    CreateSchemaRequest, CreateVersionRequest, RemoveSchemaRequest, RollbackVersionRequest,
    SchemaNameRequest, ValidateSchemaRequest, ValidateSchemaResponse,
};
use crate::api::request_user;
use crate::app::AppState;
use crate::handlers::schemas;
use crate::model::{Schema, SchemaDetails, SchemaSummary};
use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;

#[utoipa::path(
    post,
    path = "/api/schemas/createNewSchema",
    tag = "schemas",
    request_body = CreateSchemaRequest,
    responses(
        (status = 200, description = "Schema created", body = Schema),
        (status = 555, description = "Schema content failed to parse", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn create_new_schema(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CreateSchemaRequest>,
) -> Result<Json<Schema>, ApiError> {
    let user = request_user(&headers, &state);
    schemas::create_schema(
        &state.core,
        &body.name,
        &body.schema_type,
        &body.schema_content,
        &body.message_struct_name,
        &body.tags,
        &user,
    )
    .await
    .map(Json)
    .map_err(|err| from_ops(err, state.showable_status()))
}

#[utoipa::path(
    get,
    path = "/api/schemas/getAllSchemas",
    tag = "schemas",
    responses(
        (status = 200, description = "Schema catalog", body = [SchemaSummary])
    )
)]
pub(crate) async fn get_all_schemas(
    State(state): State<AppState>,
) -> Result<Json<Vec<SchemaSummary>>, ApiError> {
    schemas::get_all_schemas(&state.core)
        .await
        .map(Json)
        .map_err(|err| from_ops(err, state.showable_status()))
}

#[utoipa::path(
    post,
    path = "/api/schemas/getSchemaDetails",
    tag = "schemas",
    request_body = SchemaNameRequest,
    responses(
        (status = 200, description = "Schema details", body = SchemaDetails),
        (status = 404, description = "Schema does not exist", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn get_schema_details(
    State(state): State<AppState>,
    Json(body): Json<SchemaNameRequest>,
) -> Result<Json<SchemaDetails>, ApiError> {
    schemas::get_schema_details(&state.core, &body.schema_name)
        .await
        .map(Json)
        .map_err(|err| from_ops(err, state.showable_status()))
}

#[utoipa::path(
    post,
    path = "/api/schemas/removeSchema",
    tag = "schemas",
    request_body = RemoveSchemaRequest,
    responses(
        (status = 200, description = "Schemas removed")
    )
)]
pub(crate) async fn remove_schema(
    State(state): State<AppState>,
    Json(body): Json<RemoveSchemaRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    schemas::remove_schemas(&state.core, &body.schema_names)
        .await
        .map(|()| Json(serde_json::json!({})))
        .map_err(|err| from_ops(err, state.showable_status()))
}

#[utoipa::path(
    post,
    path = "/api/schemas/createNewVersion",
    tag = "schemas",
    request_body = CreateVersionRequest,
    responses(
        (status = 200, description = "Version created", body = SchemaDetails)
    )
)]
pub(crate) async fn create_new_version(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CreateVersionRequest>,
) -> Result<Json<SchemaDetails>, ApiError> {
    let user = request_user(&headers, &state);
    schemas::create_version(
        &state.core,
        &body.schema_name,
        &body.schema_content,
        &body.message_struct_name,
        &user,
    )
    .await
    .map(Json)
    .map_err(|err| from_ops(err, state.showable_status()))
}

#[utoipa::path(
    post,
    path = "/api/schemas/rollBackVersion",
    tag = "schemas",
    request_body = RollbackVersionRequest,
    responses(
        (status = 200, description = "Active version changed", body = SchemaDetails)
    )
)]
pub(crate) async fn roll_back_version(
    State(state): State<AppState>,
    Json(body): Json<RollbackVersionRequest>,
) -> Result<Json<SchemaDetails>, ApiError> {
    schemas::rollback_version(&state.core, &body.schema_name, body.version_number)
        .await
        .map(Json)
        .map_err(|err| from_ops(err, state.showable_status()))
}

#[utoipa::path(
    post,
    path = "/api/schemas/validateSchema",
    tag = "schemas",
    request_body = ValidateSchemaRequest,
    responses(
        (status = 200, description = "Content is valid", body = ValidateSchemaResponse),
        (status = 555, description = "Content failed to parse", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn validate_schema(
    State(state): State<AppState>,
    Json(body): Json<ValidateSchemaRequest>,
) -> Result<Json<ValidateSchemaResponse>, ApiError> {
    schemas::validate_schema(&body.schema_type, &body.schema_content, &body.message_struct_name)
        .map(|()| Json(ValidateSchemaResponse { is_valid: true }))
        .map_err(|err| from_ops(err, state.showable_status()))
}
