//! Control-plane data model module.
//!
//! # Purpose
//! Re-exports the persisted entity records and the joined views used by the
//! API and overview layers.
mod audit;
mod configuration;
mod connection;
mod consumer;
mod factory;
mod producer;
mod schema;
mod station;
mod tag;
mod user;

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;

pub use audit::{AuditLog, UserType};
pub use configuration::ConfigurationDoc;
pub use connection::Connection;
pub use consumer::{Consumer, ExtendedConsumer};
pub use factory::{ExtendedFactory, Factory, FactoryDetails};
pub use producer::{ExtendedProducer, HandleKind, Producer};
pub use schema::{Schema, SchemaDetails, SchemaSummary, SchemaType, SchemaVersion};
pub use station::{
    RetentionPolicy, RetentionType, SchemaBinding, Station, StationDetails, StorageType,
};
pub use tag::{Tag, TagEntityKind};
pub use user::User;

/// Stable, globally unique entity identifier, lexicographically ordered by
/// creation time (UUIDv7).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_ids_order_by_creation() {
        let first = EntityId::generate();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = EntityId::generate();
        assert!(first < second);
    }
}
