//! Audit-log model definitions.
use super::EntityId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Application,
    Management,
    Root,
}

impl UserType {
    /// Audit records written on behalf of a stored row inherit the row
    /// owner's type; only the root user is special-cased.
    pub fn for_username(username: &str) -> Self {
        if username == "root" {
            UserType::Root
        } else {
            UserType::Application
        }
    }
}

/// Append-only administrative event, scoped per station.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct AuditLog {
    pub id: EntityId,
    pub station_name: String,
    pub message: String,
    pub created_by_user: String,
    pub user_type: UserType,
    pub creation_date: DateTime<Utc>,
}
