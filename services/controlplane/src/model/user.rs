//! User model definitions.
//!
//! Authentication itself is middleware concern outside this core; the user
//! row exists so ownership fields and the root bootstrap have a referent.
use super::{EntityId, UserType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct User {
    pub id: EntityId,
    pub username: String,
    pub user_type: UserType,
    pub creation_date: DateTime<Utc>,
}
