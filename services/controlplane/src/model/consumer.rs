//! Consumer model definitions.
//!
//! Consumers share the producer liveness state machine and additionally carry
//! group and delivery tuning fields.
use super::{EntityId, HandleKind};
use chrono::{DateTime, Utc};
use conveyor_transport::ConnectionId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct Consumer {
    pub id: EntityId,
    pub name: String,
    pub station_id: EntityId,
    pub factory_id: EntityId,
    #[serde(rename = "type")]
    pub kind: HandleKind,
    #[schema(value_type = String)]
    pub connection_id: ConnectionId,
    pub consumers_group: String,
    pub max_ack_time_ms: i64,
    pub max_msg_deliveries: i64,
    pub created_by_user: String,
    pub creation_date: DateTime<Utc>,
    pub is_active: bool,
    pub is_deleted: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct ExtendedConsumer {
    pub id: EntityId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: HandleKind,
    #[schema(value_type = String)]
    pub connection_id: ConnectionId,
    pub consumers_group: String,
    pub max_ack_time_ms: i64,
    pub max_msg_deliveries: i64,
    pub created_by_user: String,
    pub creation_date: DateTime<Utc>,
    pub is_active: bool,
    pub is_deleted: bool,
    pub station_name: String,
    pub factory_name: String,
    pub client_address: String,
}
