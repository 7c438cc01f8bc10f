//! Factory API handlers.
use crate::api::error::{ApiError, from_ops};
use crate::api::request_user;
use crate::api::types::{CreateFactoryRequest, FactoryNameRequest};
use crate::app::AppState;
use crate::handlers::factories;
use crate::model::{ExtendedFactory, Factory, FactoryDetails};
use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;

#[utoipa::path(
    post,
    path = "/api/factories/createFactory",
    tag = "factories",
    request_body = CreateFactoryRequest,
    responses(
        (status = 200, description = "Factory created", body = Factory)
    )
)]
pub(crate) async fn create_factory(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CreateFactoryRequest>,
) -> Result<Json<Factory>, ApiError> {
    let user = request_user(&headers, &state);
    factories::create_factory(&state.core, &body.name, &body.description, &user)
        .await
        .map(Json)
        .map_err(|err| from_ops(err, state.showable_status()))
}

#[utoipa::path(
    get,
    path = "/api/factories/getAllFactories",
    tag = "factories",
    responses(
        (status = 200, description = "All live factories", body = [ExtendedFactory])
    )
)]
pub(crate) async fn get_all_factories(
    State(state): State<AppState>,
) -> Result<Json<Vec<ExtendedFactory>>, ApiError> {
    factories::get_all_factories(&state.core)
        .await
        .map(Json)
        .map_err(|err| from_ops(err, state.showable_status()))
}

#[utoipa::path(
    post,
    path = "/api/factories/getFactoryDetails",
    tag = "factories",
    request_body = FactoryNameRequest,
    responses(
        (status = 200, description = "Factory with stations", body = FactoryDetails),
        (status = 404, description = "Factory does not exist", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn get_factory_details(
    State(state): State<AppState>,
    Json(body): Json<FactoryNameRequest>,
) -> Result<Json<FactoryDetails>, ApiError> {
    factories::get_factory_details(&state.core, &body.factory_name)
        .await
        .map(Json)
        .map_err(|err| from_ops(err, state.showable_status()))
}

#[utoipa::path(
    post,
    path = "/api/factories/removeFactory",
    tag = "factories",
    request_body = FactoryNameRequest,
    responses(
        (status = 200, description = "Factory soft-deleted"),
        (status = 404, description = "Factory does not exist", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn remove_factory(
    State(state): State<AppState>,
    Json(body): Json<FactoryNameRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    factories::remove_factory(&state.core, &body.factory_name)
        .await
        .map(|()| Json(serde_json::json!({})))
        .map_err(|err| from_ops(err, state.showable_status()))
}
