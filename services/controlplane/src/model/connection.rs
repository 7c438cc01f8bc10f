//! Connection model definitions.
//!
//! The transport owns connection identity and lifecycle; the control plane
//! persists a mirror row per connection and only ever compares ids for
//! equality.
use chrono::{DateTime, Utc};
use conveyor_transport::ConnectionId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct Connection {
    #[schema(value_type = String)]
    pub id: ConnectionId,
    pub client_address: String,
    pub created_by_user: String,
    pub is_active: bool,
    pub creation_date: DateTime<Utc>,
}
