//! Station model definitions.
//!
//! # Purpose
//! A station is a named durable stream bound to a factory, with retention and
//! storage policy, and optionally bound to one version of a named schema.
use super::EntityId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RetentionType {
    Time,
    Size,
    Count,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, Copy)]
pub struct RetentionPolicy {
    #[serde(rename = "type")]
    pub retention_type: RetentionType,
    pub value: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    File,
    Memory,
}

/// Binding of a station to one concrete version of a named schema.
///
/// The bound version must exist for the named schema; schemas outlive their
/// bindings, so deleting a schema clears these first.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
pub struct SchemaBinding {
    pub schema_name: String,
    pub version_number: u32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct Station {
    pub id: EntityId,
    pub name: String,
    pub factory_id: EntityId,
    pub retention: RetentionPolicy,
    pub storage_type: StorageType,
    pub replicas: u32,
    pub dedup_window_ms: u64,
    pub created_by_user: String,
    pub creation_date: DateTime<Utc>,
    pub is_deleted: bool,
    pub schema_binding: Option<SchemaBinding>,
}

/// Station joined with its handles and tags, as surfaced by the detail
/// endpoint.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct StationDetails {
    #[serde(flatten)]
    pub station: Station,
    pub producers: Vec<super::ExtendedProducer>,
    pub consumers: Vec<super::ExtendedConsumer>,
    pub tags: Vec<super::Tag>,
}
