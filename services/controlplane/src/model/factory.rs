//! Factory model definitions.
//!
//! # Purpose
//! A factory is an owner-scoped namespace grouping related stations. Rows are
//! soft-deleted so audit history stays intact.
use super::EntityId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct Factory {
    pub id: EntityId,
    pub name: String,
    pub description: String,
    pub created_by_user: String,
    pub creation_date: DateTime<Utc>,
    pub is_deleted: bool,
}

/// Factory joined with the count of its live stations, as surfaced by list
/// endpoints and the factories overview.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct ExtendedFactory {
    #[serde(flatten)]
    pub factory: Factory,
    pub stations_count: u64,
}

/// Factory metadata plus its stations, as surfaced by the detail endpoint and
/// the per-factory overview.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct FactoryDetails {
    #[serde(flatten)]
    pub factory: Factory,
    pub stations: Vec<super::Station>,
}
