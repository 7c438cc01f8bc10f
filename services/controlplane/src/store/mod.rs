//! Store adapter for the control plane.
//!
//! # Purpose
//! The document store is an external collaborator; this module pins down the
//! operations the core relies on and exposes one typed collection handle per
//! entity. The in-memory backend in [`memory`] implements those operations.
//!
//! # Key invariants and assumptions
//! - `upsert_set_on_insert` never overwrites a matched document; it is the
//!   idempotence primitive create operations race on.
//! - `find_one_and_update` returns the prior document atomically, which is
//!   what destroy/reap paths use to detect whether they won the flip.
use crate::model::{
    AuditLog, ConfigurationDoc, Connection, Consumer, Factory, Producer, Schema, SchemaVersion,
    Station, Tag, User,
};
use thiserror::Error;

pub mod memory;

pub use memory::{Collection, SortOrder};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// One typed handle per collection.
pub struct Db {
    pub factories: Collection<Factory>,
    pub stations: Collection<Station>,
    pub producers: Collection<Producer>,
    pub consumers: Collection<Consumer>,
    pub connections: Collection<Connection>,
    pub schemas: Collection<Schema>,
    pub schema_versions: Collection<SchemaVersion>,
    pub audit_logs: Collection<AuditLog>,
    pub tags: Collection<Tag>,
    pub users: Collection<User>,
    pub configurations: Collection<ConfigurationDoc>,
}

impl Db {
    pub fn new() -> Self {
        Self {
            factories: Collection::new("factories"),
            stations: Collection::new("stations"),
            producers: Collection::new("producers"),
            consumers: Collection::new("consumers"),
            connections: Collection::new("connections"),
            schemas: Collection::new("schemas"),
            schema_versions: Collection::new("schema_versions"),
            audit_logs: Collection::new("audit_logs"),
            tags: Collection::new("tags"),
            users: Collection::new("users"),
            configurations: Collection::new("configurations"),
        }
    }
}

impl Default for Db {
    fn default() -> Self {
        Self::new()
    }
}
