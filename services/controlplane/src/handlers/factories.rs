//! Factory operations.
use crate::core::Core;
use crate::error::{OpsError, OpsResult};
use crate::model::{EntityId, ExtendedFactory, Factory, FactoryDetails};
use crate::store::SortOrder;
use crate::validation::validate_object_name;
use chrono::Utc;

pub async fn create_factory(
    core: &Core,
    name: &str,
    description: &str,
    username: &str,
) -> OpsResult<Factory> {
    let name = name.to_lowercase();
    validate_object_name(&name, "Factory")?;
    let factory = Factory {
        id: EntityId::generate(),
        name: name.clone(),
        description: description.to_string(),
        created_by_user: username.to_string(),
        creation_date: Utc::now(),
        is_deleted: false,
    };
    let inserted = core
        .db
        .factories
        .upsert_set_on_insert(
            |row| row.name == name && !row.is_deleted,
            factory.clone(),
        )
        .await?;
    if !inserted {
        return Err(OpsError::Conflict(
            "Factory with that name already exists".to_string(),
        ));
    }
    tracing::info!(factory = %factory.name, "factory created");
    Ok(factory)
}

/// Resolve a factory by name, creating it when absent. Used by the station
/// auto-create path, where concurrent first producers may race; the upsert
/// admits one insert and everyone reads the winner.
pub async fn ensure_factory(core: &Core, name: &str, username: &str) -> OpsResult<Factory> {
    let name = name.to_lowercase();
    validate_object_name(&name, "Factory")?;
    let candidate = Factory {
        id: EntityId::generate(),
        name: name.clone(),
        description: String::new(),
        created_by_user: username.to_string(),
        creation_date: Utc::now(),
        is_deleted: false,
    };
    core.db
        .factories
        .upsert_set_on_insert(|row| row.name == name && !row.is_deleted, candidate)
        .await?;
    core.db
        .factories
        .find_one(|row| row.name == name && !row.is_deleted)
        .await?
        .ok_or_else(|| OpsError::NotFound("Factory does not exist".to_string()))
}

pub async fn get_factory_by_name(core: &Core, name: &str) -> OpsResult<Option<Factory>> {
    let name = name.to_lowercase();
    Ok(core
        .db
        .factories
        .find_one(|row| row.name == name && !row.is_deleted)
        .await?)
}

pub async fn get_all_factories(core: &Core) -> OpsResult<Vec<ExtendedFactory>> {
    let factories = core
        .db
        .factories
        .find_many_sorted(
            |row| !row.is_deleted,
            |row| row.creation_date,
            SortOrder::Descending,
        )
        .await?;
    let mut extended = Vec::with_capacity(factories.len());
    for factory in factories {
        let stations_count = core
            .db
            .stations
            .count(|station| station.factory_id == factory.id && !station.is_deleted)
            .await?;
        extended.push(ExtendedFactory {
            factory,
            stations_count,
        });
    }
    Ok(extended)
}

pub async fn get_factory_details(core: &Core, name: &str) -> OpsResult<FactoryDetails> {
    let factory = get_factory_by_name(core, name)
        .await?
        .ok_or_else(|| OpsError::NotFound("Factory does not exist".to_string()))?;
    let stations = core
        .db
        .stations
        .find_many_sorted(
            |station| station.factory_id == factory.id && !station.is_deleted,
            |station| station.creation_date,
            SortOrder::Descending,
        )
        .await?;
    Ok(FactoryDetails { factory, stations })
}

/// Soft-delete a factory. Refused while any non-deleted station still
/// references it.
pub async fn remove_factory(core: &Core, name: &str) -> OpsResult<()> {
    let factory = get_factory_by_name(core, name)
        .await?
        .ok_or_else(|| OpsError::NotFound("Factory does not exist".to_string()))?;
    let live_stations = core
        .db
        .stations
        .count(|station| station.factory_id == factory.id && !station.is_deleted)
        .await?;
    if live_stations > 0 {
        return Err(OpsError::Conflict(
            "Factory still has stations; remove them first".to_string(),
        ));
    }
    core.db
        .factories
        .update_one(|row| row.id == factory.id, |row| row.is_deleted = true)
        .await?;
    tracing::info!(factory = %factory.name, "factory deleted");
    Ok(())
}
