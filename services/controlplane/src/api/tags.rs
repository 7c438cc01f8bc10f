//! Tag API handlers.
use crate::api::error::{ApiError, from_ops};
use crate::api::types::{CreateTagRequest, TagAttachmentRequest, TagNameRequest, TagsByEntityRequest};
use crate::app::AppState;
use crate::handlers::tags;
use crate::model::Tag;
use axum::Json;
use axum::extract::State;

#[utoipa::path(
    post,
    path = "/api/tags/createTag",
    tag = "tags",
    request_body = CreateTagRequest,
    responses(
        (status = 200, description = "Tag created", body = Tag)
    )
)]
pub(crate) async fn create_tag(
    State(state): State<AppState>,
    Json(body): Json<CreateTagRequest>,
) -> Result<Json<Tag>, ApiError> {
    tags::create_tag(&state.core, &body.name, &body.color)
        .await
        .map(Json)
        .map_err(|err| from_ops(err, state.showable_status()))
}

#[utoipa::path(
    get,
    path = "/api/tags/getAllTags",
    tag = "tags",
    responses(
        (status = 200, description = "All tags", body = [Tag])
    )
)]
pub(crate) async fn get_all_tags(
    State(state): State<AppState>,
) -> Result<Json<Vec<Tag>>, ApiError> {
    tags::get_all_tags(&state.core)
        .await
        .map(Json)
        .map_err(|err| from_ops(err, state.showable_status()))
}

#[utoipa::path(
    post,
    path = "/api/tags/getTagsByEntity",
    tag = "tags",
    request_body = TagsByEntityRequest,
    responses(
        (status = 200, description = "Tags attached to one entity", body = [Tag])
    )
)]
pub(crate) async fn get_tags_by_entity(
    State(state): State<AppState>,
    Json(body): Json<TagsByEntityRequest>,
) -> Result<Json<Vec<Tag>>, ApiError> {
    tags::get_tags_by_entity(&state.core, body.entity_kind, &body.entity_id)
        .await
        .map(Json)
        .map_err(|err| from_ops(err, state.showable_status()))
}

#[utoipa::path(
    post,
    path = "/api/tags/attachTag",
    tag = "tags",
    request_body = TagAttachmentRequest,
    responses(
        (status = 200, description = "Tag attached"),
        (status = 404, description = "Tag does not exist", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn attach_tag(
    State(state): State<AppState>,
    Json(body): Json<TagAttachmentRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    tags::attach_tag(&state.core, &body.name, body.entity_kind, &body.entity_id)
        .await
        .map(|()| Json(serde_json::json!({})))
        .map_err(|err| from_ops(err, state.showable_status()))
}

#[utoipa::path(
    post,
    path = "/api/tags/detachTag",
    tag = "tags",
    request_body = TagAttachmentRequest,
    responses(
        (status = 200, description = "Tag detached"),
        (status = 404, description = "Tag does not exist", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn detach_tag(
    State(state): State<AppState>,
    Json(body): Json<TagAttachmentRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    tags::detach_tag(&state.core, &body.name, body.entity_kind, &body.entity_id)
        .await
        .map(|()| Json(serde_json::json!({})))
        .map_err(|err| from_ops(err, state.showable_status()))
}

#[utoipa::path(
    post,
    path = "/api/tags/removeTag",
    tag = "tags",
    request_body = TagNameRequest,
    responses(
        (status = 200, description = "Tag removed with all attachments"),
        (status = 404, description = "Tag does not exist", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn remove_tag(
    State(state): State<AppState>,
    Json(body): Json<TagNameRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    tags::remove_tag(&state.core, &body.name)
        .await
        .map(|()| Json(serde_json::json!({})))
        .map_err(|err| from_ops(err, state.showable_status()))
}
