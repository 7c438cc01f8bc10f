//! Schema and schema-version model definitions.
//!
//! # Purpose
//! A schema is a named, versioned message definition. Versions are numbered
//! from 1; once a schema has two or more versions, exactly one of them is
//! active at any time. Only protobuf schemas are functionally supported.
use super::{EntityId, Tag};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    Protobuf,
    Avro,
    Json,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct Schema {
    pub id: EntityId,
    pub name: String,
    #[serde(rename = "type")]
    pub schema_type: SchemaType,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct SchemaVersion {
    pub id: EntityId,
    pub schema_id: EntityId,
    pub version_number: u32,
    pub active: bool,
    pub created_by_user: String,
    pub creation_date: DateTime<Utc>,
    pub schema_content: String,
    pub message_struct_name: String,
}

/// Full detail view of one schema: versions, binding stations and tags.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct SchemaDetails {
    pub id: EntityId,
    pub schema_name: String,
    #[serde(rename = "type")]
    pub schema_type: SchemaType,
    pub versions: Vec<SchemaVersion>,
    pub used_stations: Vec<String>,
    pub tags: Vec<Tag>,
}

/// Catalog row returned by the list-all endpoint.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct SchemaSummary {
    pub id: EntityId,
    pub name: String,
    #[serde(rename = "type")]
    pub schema_type: SchemaType,
    pub created_by_user: String,
    pub creation_date: DateTime<Utc>,
    pub active_version_number: u32,
    pub used: bool,
    pub tags: Vec<Tag>,
}
