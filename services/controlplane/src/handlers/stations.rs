//! Station operations.
use crate::core::Core;
use crate::error::{OpsError, OpsResult};
use crate::handlers::{audit, consumers, factories, producers, tags};
use crate::model::{
    EntityId, RetentionPolicy, SchemaBinding, Station, StationDetails, StorageType, TagEntityKind,
    UserType,
};
use crate::store::SortOrder;
use crate::validation::validate_object_name;
use chrono::Utc;

/// Full configuration accepted by the explicit create path.
#[derive(Debug, Clone)]
pub struct StationSpec {
    pub name: String,
    pub factory_name: String,
    pub retention: RetentionPolicy,
    pub storage_type: StorageType,
    pub replicas: u32,
    pub dedup_window_ms: u64,
}

pub async fn create_station(core: &Core, spec: StationSpec, username: &str) -> OpsResult<Station> {
    let name = spec.name.to_lowercase();
    validate_object_name(&name, "Station")?;
    if spec.replicas == 0 {
        return Err(OpsError::Validation(
            "Station replicas must be at least 1".to_string(),
        ));
    }
    let factory = factories::get_factory_by_name(core, &spec.factory_name)
        .await?
        .ok_or_else(|| OpsError::NotFound("Factory does not exist".to_string()))?;

    let station = Station {
        id: EntityId::generate(),
        name: name.clone(),
        factory_id: factory.id,
        retention: spec.retention,
        storage_type: spec.storage_type,
        replicas: spec.replicas,
        dedup_window_ms: spec.dedup_window_ms,
        created_by_user: username.to_string(),
        creation_date: Utc::now(),
        is_deleted: false,
        schema_binding: None,
    };
    let inserted = core
        .db
        .stations
        .upsert_set_on_insert(
            |row| row.name == name && !row.is_deleted,
            station.clone(),
        )
        .await?;
    if !inserted {
        return Err(OpsError::Conflict(
            "Station with that name already exists".to_string(),
        ));
    }

    let message = format!("Station {name} has been created");
    tracing::info!("{message}");
    audit::record(core, &name, &message, username, UserType::for_username(username)).await;
    core.record_analytics("stations_created_total");
    Ok(station)
}

/// Create a station with the process-wide default configuration. Used by the
/// producer/consumer path when the named station does not exist yet.
///
/// Returns the station and whether this call created it; concurrent callers
/// race on the upsert and all read the winner's row.
pub async fn create_default_station(
    core: &Core,
    name: &str,
    username: &str,
) -> OpsResult<(Station, bool)> {
    let name = name.to_lowercase();
    validate_object_name(&name, "Station")?;
    let defaults = &core.config.default_station;
    let factory = factories::ensure_factory(core, &defaults.factory_name, username).await?;

    let station = Station {
        id: EntityId::generate(),
        name: name.clone(),
        factory_id: factory.id,
        retention: defaults.retention,
        storage_type: defaults.storage_type,
        replicas: defaults.replicas,
        dedup_window_ms: defaults.dedup_window_ms,
        created_by_user: username.to_string(),
        creation_date: Utc::now(),
        is_deleted: false,
        schema_binding: None,
    };
    let inserted = core
        .db
        .stations
        .upsert_set_on_insert(
            |row| row.name == name && !row.is_deleted,
            station.clone(),
        )
        .await?;
    if inserted {
        return Ok((station, true));
    }
    let existing = core
        .db
        .stations
        .find_one(|row| row.name == name && !row.is_deleted)
        .await?
        .ok_or_else(|| OpsError::NotFound("Station does not exist".to_string()))?;
    Ok((existing, false))
}

pub async fn get_station_by_name(core: &Core, name: &str) -> OpsResult<Option<Station>> {
    let name = name.to_lowercase();
    Ok(core
        .db
        .stations
        .find_one(|row| row.name == name && !row.is_deleted)
        .await?)
}

pub async fn get_all_stations(core: &Core) -> OpsResult<Vec<Station>> {
    Ok(core
        .db
        .stations
        .find_many_sorted(
            |row| !row.is_deleted,
            |row| row.creation_date,
            SortOrder::Descending,
        )
        .await?)
}

pub async fn get_stations_by_factory(core: &Core, factory_name: &str) -> OpsResult<Vec<Station>> {
    let factory = factories::get_factory_by_name(core, factory_name)
        .await?
        .ok_or_else(|| OpsError::NotFound("Factory does not exist".to_string()))?;
    Ok(core
        .db
        .stations
        .find_many_sorted(
            |row| row.factory_id == factory.id && !row.is_deleted,
            |row| row.creation_date,
            SortOrder::Descending,
        )
        .await?)
}

pub async fn get_station_details(core: &Core, name: &str) -> OpsResult<StationDetails> {
    let station = get_station_by_name(core, name)
        .await?
        .ok_or_else(|| OpsError::NotFound("Station does not exist".to_string()))?;
    let station_producers = producers::get_extended_by_station(core, &station).await?;
    let station_consumers = consumers::get_extended_by_station(core, &station).await?;
    let station_tags = tags::get_tags_by_entity(core, TagEntityKind::Station, &station.id).await?;
    Ok(StationDetails {
        station,
        producers: station_producers,
        consumers: station_consumers,
        tags: station_tags,
    })
}

/// Bind a station to one version of a named schema. Both the schema and the
/// version must exist.
pub async fn attach_schema(
    core: &Core,
    station_name: &str,
    schema_name: &str,
    version_number: u32,
    username: &str,
) -> OpsResult<()> {
    let station = get_station_by_name(core, station_name)
        .await?
        .ok_or_else(|| OpsError::NotFound("Station does not exist".to_string()))?;
    let schema_name = schema_name.to_lowercase();
    let schema = core
        .db
        .schemas
        .find_one(|row| row.name == schema_name)
        .await?
        .ok_or_else(|| OpsError::NotFound("Schema does not exist".to_string()))?;
    let version = core
        .db
        .schema_versions
        .find_one(|row| row.schema_id == schema.id && row.version_number == version_number)
        .await?
        .ok_or_else(|| OpsError::NotFound("Schema version does not exist".to_string()))?;

    let binding = SchemaBinding {
        schema_name: schema.name.clone(),
        version_number: version.version_number,
    };
    core.db
        .stations
        .update_one(
            |row| row.id == station.id,
            |row| row.schema_binding = Some(binding.clone()),
        )
        .await?;

    let message = format!(
        "Schema {} version {} has been attached to station {}",
        schema.name, version.version_number, station.name
    );
    tracing::info!("{message}");
    audit::record(
        core,
        &station.name,
        &message,
        username,
        UserType::for_username(username),
    )
    .await;
    Ok(())
}

pub async fn detach_schema(core: &Core, station_name: &str, username: &str) -> OpsResult<()> {
    let station = get_station_by_name(core, station_name)
        .await?
        .ok_or_else(|| OpsError::NotFound("Station does not exist".to_string()))?;
    core.db
        .stations
        .update_one(|row| row.id == station.id, |row| row.schema_binding = None)
        .await?;

    let message = format!("Schema has been detached from station {}", station.name);
    tracing::info!("{message}");
    audit::record(
        core,
        &station.name,
        &message,
        username,
        UserType::for_username(username),
    )
    .await;
    Ok(())
}

/// Soft-delete a station; the row is retained for audit history.
pub async fn remove_station(core: &Core, name: &str, username: &str) -> OpsResult<()> {
    let station = get_station_by_name(core, name)
        .await?
        .ok_or_else(|| OpsError::NotFound("Station does not exist".to_string()))?;
    core.db
        .stations
        .update_one(|row| row.id == station.id, |row| row.is_deleted = true)
        .await?;

    let message = format!("Station {} has been deleted", station.name);
    tracing::info!("{message}");
    audit::record(
        core,
        &station.name,
        &message,
        username,
        UserType::for_username(username),
    )
    .await;
    Ok(())
}
