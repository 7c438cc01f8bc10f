//! Request/response payloads for the admin API.
use crate::handlers::tags::TagSpec;
use crate::model::{EntityId, RetentionPolicy, StorageType, TagEntityKind};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthStatus {
    pub status: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSchemaRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub schema_type: String,
    pub schema_content: String,
    #[serde(default)]
    pub message_struct_name: String,
    #[serde(default)]
    pub tags: Vec<TagSpec>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SchemaNameRequest {
    pub schema_name: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RemoveSchemaRequest {
    pub schema_names: Vec<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateVersionRequest {
    pub schema_name: String,
    pub schema_content: String,
    #[serde(default)]
    pub message_struct_name: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RollbackVersionRequest {
    pub schema_name: String,
    pub version_number: u32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ValidateSchemaRequest {
    #[serde(rename = "type")]
    pub schema_type: String,
    pub schema_content: String,
    #[serde(default)]
    pub message_struct_name: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ValidateSchemaResponse {
    pub is_valid: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateStationRequest {
    pub name: String,
    pub factory_name: String,
    pub retention: RetentionPolicy,
    pub storage_type: StorageType,
    pub replicas: u32,
    #[serde(default)]
    pub dedup_window_ms: u64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct StationNameRequest {
    pub station_name: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AttachSchemaRequest {
    pub station_name: String,
    pub schema_name: String,
    pub version_number: u32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateFactoryRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct FactoryNameRequest {
    pub factory_name: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTagRequest {
    pub name: String,
    pub color: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TagNameRequest {
    pub name: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TagAttachmentRequest {
    pub name: String,
    pub entity_kind: TagEntityKind,
    pub entity_id: EntityId,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TagsByEntityRequest {
    pub entity_kind: TagEntityKind,
    pub entity_id: EntityId,
}
