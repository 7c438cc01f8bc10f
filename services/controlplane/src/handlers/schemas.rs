//! Schema engine: CRUD, versioning, rollback and station bindings.
//!
//! # Key invariants
//! - Version numbers are assigned 1..N per schema; concurrent creates race on
//!   the `(schema_id, version_number)` upsert key and exactly one wins.
//! - Once a schema has two or more versions, exactly one of them is active;
//!   rollback rewrites all active flags in a single collection-atomic update.
//! - Removal cascades: tag attachments, then station bindings, then versions,
//!   then the schema row.
use crate::core::Core;
use crate::error::{OpsError, OpsResult};
use crate::handlers::tags;
use crate::handlers::tags::TagSpec;
use crate::model::{
    EntityId, Schema, SchemaBinding, SchemaDetails, SchemaSummary, SchemaVersion, TagEntityKind,
};
use crate::store::SortOrder;
use crate::validation::{
    parse_schema_type, validate_message_struct_name, validate_object_name, validate_schema_content,
};
use chrono::Utc;

pub async fn get_schema_by_name(core: &Core, name: &str) -> OpsResult<Option<Schema>> {
    let name = name.to_lowercase();
    Ok(core.db.schemas.find_one(|row| row.name == name).await?)
}

pub async fn create_schema(
    core: &Core,
    name: &str,
    type_raw: &str,
    content: &str,
    message_struct_name: &str,
    tag_specs: &[TagSpec],
    username: &str,
) -> OpsResult<Schema> {
    let name = name.to_lowercase();
    validate_object_name(&name, "Schema")?;
    if get_schema_by_name(core, &name).await?.is_some() {
        return Err(OpsError::Conflict(
            "Schema with that name already exists".to_string(),
        ));
    }
    let schema_type = parse_schema_type(&type_raw.to_lowercase())?;
    validate_message_struct_name(message_struct_name, schema_type)?;
    validate_schema_content(content, schema_type)?;

    let schema = Schema {
        id: EntityId::generate(),
        name: name.clone(),
        schema_type,
    };
    let inserted = core
        .db
        .schemas
        .upsert_set_on_insert(|row| row.name == name, schema.clone())
        .await?;
    if !inserted {
        // Race loser: someone else inserted the row between the pre-check and
        // the upsert. No version is written on this path.
        return Err(OpsError::Conflict(
            "Schema with that name already exists".to_string(),
        ));
    }

    // If this insert fails the schema row stays behind with zero versions;
    // such rows are tolerated and invisible to the catalog.
    core.db
        .schema_versions
        .insert_one(SchemaVersion {
            id: EntityId::generate(),
            schema_id: schema.id.clone(),
            version_number: 1,
            active: true,
            created_by_user: username.to_string(),
            creation_date: Utc::now(),
            schema_content: content.to_string(),
            message_struct_name: message_struct_name.to_string(),
        })
        .await?;

    tags::ensure_attached(core, tag_specs, TagEntityKind::Schema, &schema.id).await?;

    tracing::info!(schema = %schema.name, "schema created");
    core.record_analytics("schemas_created_total");
    Ok(schema)
}

pub async fn create_version(
    core: &Core,
    schema_name: &str,
    content: &str,
    message_struct_name: &str,
    username: &str,
) -> OpsResult<SchemaDetails> {
    let schema = get_schema_by_name(core, schema_name)
        .await?
        .ok_or_else(|| OpsError::NotFound("Schema does not exist".to_string()))?;
    validate_message_struct_name(message_struct_name, schema.schema_type)?;
    validate_schema_content(content, schema.schema_type)?;

    let schema_id = schema.id.clone();
    let count = core
        .db
        .schema_versions
        .count(|row| row.schema_id == schema_id)
        .await?;
    let version_number = count as u32 + 1;

    // Two concurrent creates can compute the same next number; the unique
    // upsert key rejects the loser.
    let inserted = core
        .db
        .schema_versions
        .upsert_set_on_insert(
            |row| row.schema_id == schema_id && row.version_number == version_number,
            SchemaVersion {
                id: EntityId::generate(),
                schema_id: schema_id.clone(),
                version_number,
                active: false,
                created_by_user: username.to_string(),
                creation_date: Utc::now(),
                schema_content: content.to_string(),
                message_struct_name: message_struct_name.to_string(),
            },
        )
        .await?;
    if !inserted {
        return Err(OpsError::Conflict("Version already exists".to_string()));
    }

    tracing::info!(schema = %schema.name, version = version_number, "schema version created");
    get_schema_details(core, &schema.name).await
}

pub async fn rollback_version(
    core: &Core,
    schema_name: &str,
    version_number: u32,
) -> OpsResult<SchemaDetails> {
    let schema = get_schema_by_name(core, schema_name)
        .await?
        .ok_or_else(|| OpsError::NotFound("Schema does not exist".to_string()))?;
    let schema_id = schema.id.clone();
    let target = core
        .db
        .schema_versions
        .find_one(|row| row.schema_id == schema_id && row.version_number == version_number)
        .await?
        .ok_or_else(|| OpsError::NotFound("Schema version does not exist".to_string()))?;

    let count = core
        .db
        .schema_versions
        .count(|row| row.schema_id == schema_id)
        .await?;
    if count > 1 {
        // One collection-atomic pass: clear every active flag and set the
        // target, so no reader ever observes zero or two active versions.
        core.db
            .schema_versions
            .update_many(
                |row| row.schema_id == schema_id,
                |row| row.active = row.version_number == target.version_number,
            )
            .await?;
    }
    get_schema_details(core, &schema.name).await
}

pub async fn get_schema_details(core: &Core, name: &str) -> OpsResult<SchemaDetails> {
    let schema = get_schema_by_name(core, name)
        .await?
        .ok_or_else(|| OpsError::NotFound("Schema does not exist".to_string()))?;
    let schema_id = schema.id.clone();
    let versions = core
        .db
        .schema_versions
        .find_many_sorted(
            |row| row.schema_id == schema_id,
            |row| row.creation_date,
            SortOrder::Descending,
        )
        .await?;
    let used_stations = get_using_station_names(core, &schema.name).await?;
    let schema_tags = tags::get_tags_by_entity(core, TagEntityKind::Schema, &schema.id).await?;
    Ok(SchemaDetails {
        id: schema.id,
        schema_name: schema.name,
        schema_type: schema.schema_type,
        versions,
        used_stations,
        tags: schema_tags,
    })
}

/// Detail view scoped to one station's binding: the version the station uses
/// and, when that version is not active, also the active one so a client can
/// surface "update available".
pub async fn get_schema_details_for_station(
    core: &Core,
    binding: &SchemaBinding,
) -> OpsResult<SchemaDetails> {
    let schema = get_schema_by_name(core, &binding.schema_name)
        .await?
        .ok_or_else(|| OpsError::NotFound("Schema does not exist".to_string()))?;
    let schema_id = schema.id.clone();
    let used_version = binding.version_number;
    let used = core
        .db
        .schema_versions
        .find_one(|row| row.schema_id == schema_id && row.version_number == used_version)
        .await?
        .ok_or_else(|| OpsError::NotFound("Schema version does not exist".to_string()))?;

    let mut versions = vec![used.clone()];
    if !used.active {
        if let Some(active) = core
            .db
            .schema_versions
            .find_one(|row| row.schema_id == schema_id && row.active)
            .await?
        {
            versions.push(active);
        }
    }

    let used_stations = get_using_station_names(core, &schema.name).await?;
    let schema_tags = tags::get_tags_by_entity(core, TagEntityKind::Schema, &schema.id).await?;
    Ok(SchemaDetails {
        id: schema.id,
        schema_name: schema.name,
        schema_type: schema.schema_type,
        versions,
        used_stations,
        tags: schema_tags,
    })
}

/// Catalog rows for every schema that has at least one version. Zero-version
/// rows (a create whose version insert failed) are invisible here.
pub async fn get_all_schemas(core: &Core) -> OpsResult<Vec<SchemaSummary>> {
    let schemas = core.db.schemas.aggregate(|rows| rows.to_vec()).await?;
    let mut summaries = Vec::with_capacity(schemas.len());
    for schema in schemas {
        let schema_id = schema.id.clone();
        let versions = core
            .db
            .schema_versions
            .find_many_sorted(
                |row| row.schema_id == schema_id,
                |row| row.version_number,
                SortOrder::Ascending,
            )
            .await?;
        let Some(first) = versions.first() else {
            continue;
        };
        let active_version_number = versions
            .iter()
            .find(|row| row.active)
            .map(|row| row.version_number)
            .unwrap_or(first.version_number);
        let used = core
            .db
            .stations
            .count(|station| {
                !station.is_deleted
                    && station
                        .schema_binding
                        .as_ref()
                        .is_some_and(|binding| binding.schema_name == schema.name)
            })
            .await?
            > 0;
        let schema_tags = tags::get_tags_by_entity(core, TagEntityKind::Schema, &schema.id).await?;
        summaries.push(SchemaSummary {
            id: schema.id,
            name: schema.name,
            schema_type: schema.schema_type,
            created_by_user: first.created_by_user.clone(),
            creation_date: first.creation_date,
            active_version_number,
            used,
            tags: schema_tags,
        });
    }
    summaries.sort_by(|a, b| b.creation_date.cmp(&a.creation_date));
    Ok(summaries)
}

/// Same rules as create, but writes nothing.
pub fn validate_schema(type_raw: &str, content: &str, message_struct_name: &str) -> OpsResult<()> {
    let schema_type = parse_schema_type(&type_raw.to_lowercase())?;
    validate_message_struct_name(message_struct_name, schema_type)?;
    validate_schema_content(content, schema_type)
}

/// Remove schemas by name. Missing names are skipped; each existing schema is
/// cascaded independently and the first error encountered is reported after
/// the remaining schemas were still attempted.
pub async fn remove_schemas(core: &Core, names: &[String]) -> OpsResult<()> {
    let mut first_error: Option<OpsError> = None;
    for raw in names {
        let name = raw.to_lowercase();
        match remove_one_schema(core, &name).await {
            Ok(removed) => {
                if removed {
                    tracing::info!(schema = %name, "schema deleted");
                }
            }
            Err(err) => {
                tracing::error!(schema = %name, error = %err, "failed to remove schema");
                first_error.get_or_insert(err);
            }
        }
    }
    match first_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

async fn remove_one_schema(core: &Core, name: &str) -> OpsResult<bool> {
    let Some(schema) = get_schema_by_name(core, name).await? else {
        return Ok(false);
    };
    tags::detach_entity_from_all(core, TagEntityKind::Schema, &schema.id).await?;

    // Null out the binding on every live station referencing the schema name,
    // whatever version they point at.
    let schema_name = schema.name.clone();
    core.db
        .stations
        .update_many(
            |station| {
                !station.is_deleted
                    && station
                        .schema_binding
                        .as_ref()
                        .is_some_and(|binding| binding.schema_name == schema_name)
            },
            |station| station.schema_binding = None,
        )
        .await?;

    let schema_id = schema.id.clone();
    core.db
        .schema_versions
        .delete_many(|row| row.schema_id == schema_id)
        .await?;
    core.db.schemas.delete_many(|row| row.id == schema_id).await?;
    Ok(true)
}

async fn get_using_station_names(core: &Core, schema_name: &str) -> OpsResult<Vec<String>> {
    let schema_name = schema_name.to_string();
    core.db
        .stations
        .aggregate(|rows| {
            rows.iter()
                .filter(|station| {
                    !station.is_deleted
                        && station
                            .schema_binding
                            .as_ref()
                            .is_some_and(|binding| binding.schema_name == schema_name)
                })
                .map(|station| station.name.clone())
                .collect()
        })
        .await
        .map_err(Into::into)
}
