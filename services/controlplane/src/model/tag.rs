//! Tag model definitions.
//!
//! A tag carries a color and a many-to-many mapping to stations, schemas and
//! factories, kept as id lists on the tag row itself.
use super::EntityId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TagEntityKind {
    Station,
    Schema,
    Factory,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct Tag {
    pub id: EntityId,
    pub name: String,
    pub color: String,
    pub creation_date: DateTime<Utc>,
    pub stations: Vec<EntityId>,
    pub schemas: Vec<EntityId>,
    pub factories: Vec<EntityId>,
}

impl Tag {
    pub fn attachments(&self, kind: TagEntityKind) -> &[EntityId] {
        match kind {
            TagEntityKind::Station => &self.stations,
            TagEntityKind::Schema => &self.schemas,
            TagEntityKind::Factory => &self.factories,
        }
    }

    pub fn attachments_mut(&mut self, kind: TagEntityKind) -> &mut Vec<EntityId> {
        match kind {
            TagEntityKind::Station => &mut self.stations,
            TagEntityKind::Schema => &mut self.schemas,
            TagEntityKind::Factory => &mut self.factories,
        }
    }
}
