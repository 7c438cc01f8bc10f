//! Persisted key/value configuration rows.
//!
//! Seeded from the environment with set-on-insert semantics so values an
//! operator changed at runtime survive restarts.
use super::EntityId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct ConfigurationDoc {
    pub id: EntityId,
    pub key: String,
    #[schema(value_type = Object)]
    pub value: serde_json::Value,
}
