//! Producer model definitions.
//!
//! # Purpose
//! A producer is a per-connection handle on a station. The pair
//! `(is_active, is_deleted)` encodes its liveness: connected (true, false),
//! disconnected (false, false), deleted (false, true). Deleted is terminal
//! for the identity; `is_deleted` implies `!is_active`.
use super::EntityId;
use chrono::{DateTime, Utc};
use conveyor_transport::ConnectionId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HandleKind {
    Application,
    Connector,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct Producer {
    pub id: EntityId,
    pub name: String,
    pub station_id: EntityId,
    pub factory_id: EntityId,
    #[serde(rename = "type")]
    pub kind: HandleKind,
    #[schema(value_type = String)]
    pub connection_id: ConnectionId,
    pub created_by_user: String,
    pub creation_date: DateTime<Utc>,
    pub is_active: bool,
    pub is_deleted: bool,
}

/// Producer joined with its station, factory and connection, as surfaced by
/// list endpoints and the station overview.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct ExtendedProducer {
    pub id: EntityId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: HandleKind,
    #[schema(value_type = String)]
    pub connection_id: ConnectionId,
    pub created_by_user: String,
    pub creation_date: DateTime<Utc>,
    pub is_active: bool,
    pub is_deleted: bool,
    pub station_name: String,
    pub factory_name: String,
    pub client_address: String,
}
