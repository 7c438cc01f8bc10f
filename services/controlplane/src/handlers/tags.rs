//! Tag operations.
//!
//! Tags are standalone rows carrying id lists per entity kind, so attach and
//! detach are single-document updates on the tag itself.
use crate::core::Core;
use crate::error::{OpsError, OpsResult};
use crate::model::{EntityId, Tag, TagEntityKind};
use crate::store::SortOrder;
use crate::validation::validate_object_name;
use chrono::Utc;
use serde::Deserialize;
use utoipa::ToSchema;

/// Tag reference accepted inline by create endpoints (schema create takes a
/// list of these).
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TagSpec {
    pub name: String,
    pub color: String,
}

pub async fn create_tag(core: &Core, name: &str, color: &str) -> OpsResult<Tag> {
    let name = name.to_lowercase();
    validate_object_name(&name, "Tag")?;
    let tag = Tag {
        id: EntityId::generate(),
        name: name.clone(),
        color: color.to_string(),
        creation_date: Utc::now(),
        stations: Vec::new(),
        schemas: Vec::new(),
        factories: Vec::new(),
    };
    let inserted = core
        .db
        .tags
        .upsert_set_on_insert(|row| row.name == name, tag.clone())
        .await?;
    if !inserted {
        return Err(OpsError::Conflict(
            "Tag with that name already exists".to_string(),
        ));
    }
    Ok(tag)
}

/// Attach an existing tag to an entity; attaching twice is a no-op.
pub async fn attach_tag(
    core: &Core,
    tag_name: &str,
    kind: TagEntityKind,
    entity_id: &EntityId,
) -> OpsResult<()> {
    let tag_name = tag_name.to_lowercase();
    let matched = core
        .db
        .tags
        .update_one(
            |row| row.name == tag_name,
            |row| {
                let attachments = row.attachments_mut(kind);
                if !attachments.contains(entity_id) {
                    attachments.push(entity_id.clone());
                }
            },
        )
        .await?;
    if !matched {
        return Err(OpsError::NotFound("Tag does not exist".to_string()));
    }
    Ok(())
}

pub async fn detach_tag(
    core: &Core,
    tag_name: &str,
    kind: TagEntityKind,
    entity_id: &EntityId,
) -> OpsResult<()> {
    let tag_name = tag_name.to_lowercase();
    let matched = core
        .db
        .tags
        .update_one(
            |row| row.name == tag_name,
            |row| row.attachments_mut(kind).retain(|id| id != entity_id),
        )
        .await?;
    if !matched {
        return Err(OpsError::NotFound("Tag does not exist".to_string()));
    }
    Ok(())
}

/// Create-if-missing then attach, for tags submitted inline with an entity.
pub async fn ensure_attached(
    core: &Core,
    specs: &[TagSpec],
    kind: TagEntityKind,
    entity_id: &EntityId,
) -> OpsResult<()> {
    for spec in specs {
        match create_tag(core, &spec.name, &spec.color).await {
            Ok(_) | Err(OpsError::Conflict(_)) => {}
            Err(err) => return Err(err),
        }
        attach_tag(core, &spec.name, kind, entity_id).await?;
    }
    Ok(())
}

pub async fn get_tags_by_entity(
    core: &Core,
    kind: TagEntityKind,
    entity_id: &EntityId,
) -> OpsResult<Vec<Tag>> {
    Ok(core
        .db
        .tags
        .find_many_sorted(
            |row| row.attachments(kind).contains(entity_id),
            |row| row.name.clone(),
            SortOrder::Ascending,
        )
        .await?)
}

pub async fn get_all_tags(core: &Core) -> OpsResult<Vec<Tag>> {
    Ok(core
        .db
        .tags
        .find_many_sorted(|_| true, |row| row.name.clone(), SortOrder::Ascending)
        .await?)
}

/// Delete a tag row; all of its attachments disappear with it.
pub async fn remove_tag(core: &Core, name: &str) -> OpsResult<()> {
    let name = name.to_lowercase();
    let deleted = core.db.tags.delete_many(|row| row.name == name).await?;
    if deleted == 0 {
        return Err(OpsError::NotFound("Tag does not exist".to_string()));
    }
    Ok(())
}

/// Remove one entity from every tag that references it. Used by delete
/// cascades (schema removal, for one).
pub async fn detach_entity_from_all(
    core: &Core,
    kind: TagEntityKind,
    entity_id: &EntityId,
) -> OpsResult<()> {
    core.db
        .tags
        .update_many(
            |row| row.attachments(kind).contains(entity_id),
            |row| row.attachments_mut(kind).retain(|id| id != entity_id),
        )
        .await?;
    Ok(())
}
