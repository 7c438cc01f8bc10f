//! Producer operations: the direct create/destroy surface, bulk liveness
//! flips, and joined views.
use crate::core::Core;
use crate::error::{OpsError, OpsResult};
use crate::handlers::{audit, partition_latest, stations};
use crate::model::{
    Connection, EntityId, ExtendedProducer, Factory, Producer, Station, UserType,
};
use crate::store::SortOrder;
use crate::validation::{parse_handle_kind, validate_object_name};
use chrono::Utc;
use conveyor_transport::{ClientInfo, ConnectionId, CreateProducerRequest, DestroyProducerRequest};
use std::collections::HashMap;

/// Create a producer from an in-band control request.
///
/// The station is auto-created with the default configuration when it does
/// not exist yet; that step is not rolled back if the producer insert fails
/// afterwards.
pub async fn create_producer_direct(
    core: &Core,
    request: &CreateProducerRequest,
    client: &ClientInfo,
) -> OpsResult<()> {
    let name = request.name.to_lowercase();
    validate_object_name(&name, "Producer")?;
    let kind = parse_handle_kind(&request.producer_type.to_lowercase(), "Producer")?;

    let request_connection = request.connection_id.clone();
    let connection = core
        .db
        .connections
        .find_one(|row| row.id == request_connection)
        .await?
        .ok_or_else(|| OpsError::NotFound("Connection id was not found".to_string()))?;
    if !connection.is_active {
        return Err(OpsError::Validation(
            "Connection id is not active".to_string(),
        ));
    }

    let station_name = request.station_name.to_lowercase();
    let station = match stations::get_station_by_name(core, &station_name).await? {
        Some(station) => station,
        None => {
            let (station, created) =
                stations::create_default_station(core, &station_name, &connection.created_by_user)
                    .await?;
            if created {
                let message = format!("Station {station_name} has been created");
                tracing::info!("{message}");
                audit::record(
                    core,
                    &station_name,
                    &message,
                    &client.username,
                    UserType::Application,
                )
                .await;
                core.record_analytics("stations_created_total");
            }
            station
        }
    };

    let station_id = station.id.clone();
    let existing = core
        .db
        .producers
        .find_one(|row| row.name == name && row.station_id == station_id && !row.is_deleted)
        .await?;
    if existing.is_some() {
        return Err(OpsError::Conflict(
            "Producer name has to be unique per station".to_string(),
        ));
    }

    let producer = Producer {
        id: EntityId::generate(),
        name: name.clone(),
        station_id: station.id.clone(),
        factory_id: station.factory_id.clone(),
        kind,
        connection_id: connection.id.clone(),
        created_by_user: connection.created_by_user.clone(),
        creation_date: Utc::now(),
        is_active: true,
        is_deleted: false,
    };
    // Backstop against a concurrent identical create slipping past the check.
    let inserted = core
        .db
        .producers
        .upsert_set_on_insert(
            |row| row.name == name && row.station_id == station_id && !row.is_deleted,
            producer,
        )
        .await?;
    if !inserted {
        return Err(OpsError::Conflict(
            "Producer name has to be unique per station".to_string(),
        ));
    }

    let message = format!("Producer {name} has been created");
    tracing::info!("{message}");
    audit::record(
        core,
        &station.name,
        &message,
        &client.username,
        UserType::Application,
    )
    .await;
    core.record_analytics("producers_created_total");
    Ok(())
}

/// Destroy a producer: an atomic flip of the unique active row to deleted.
/// Destroyed identities are terminal; recreating the name yields a new row.
pub async fn destroy_producer_direct(
    core: &Core,
    request: &DestroyProducerRequest,
    client: &ClientInfo,
) -> OpsResult<()> {
    let name = request.name.to_lowercase();
    let station_name = request.station_name.to_lowercase();
    let station = stations::get_station_by_name(core, &station_name)
        .await?
        .ok_or_else(|| OpsError::NotFound("Producer does not exist".to_string()))?;

    let station_id = station.id.clone();
    let prior = core
        .db
        .producers
        .find_one_and_update(
            |row| row.name == name && row.station_id == station_id && row.is_active,
            |row| {
                row.is_active = false;
                row.is_deleted = true;
            },
        )
        .await?;
    if prior.is_none() {
        return Err(OpsError::NotFound("Producer does not exist".to_string()));
    }

    let message = format!("Producer {name} has been deleted");
    tracing::info!("{message}");
    audit::record(
        core,
        &station.name,
        &message,
        &client.username,
        UserType::Application,
    )
    .await;
    Ok(())
}

/// Bulk liveness drop for every active producer on a connection, with one
/// audit record per affected producer.
pub async fn kill_producers(core: &Core, connection_id: &ConnectionId) -> OpsResult<()> {
    let affected = core
        .db
        .producers
        .find_many_sorted(
            |row| row.connection_id == *connection_id && row.is_active,
            |row| row.creation_date,
            SortOrder::Ascending,
        )
        .await?;
    if affected.is_empty() {
        return Ok(());
    }

    core.db
        .producers
        .update_many(
            |row| row.connection_id == *connection_id && row.is_active,
            |row| row.is_active = false,
        )
        .await?;

    let station_names = station_names_by_id(core).await?;
    for producer in &affected {
        let station_name = station_names
            .get(&producer.station_id)
            .cloned()
            .unwrap_or_default();
        let message = format!("Producer {} has been disconnected", producer.name);
        audit::record(
            core,
            &station_name,
            &message,
            &producer.created_by_user,
            UserType::for_username(&producer.created_by_user),
        )
        .await;
    }
    Ok(())
}

/// Bulk liveness restore on reconnect; deleted rows stay deleted.
pub async fn relive_producers(core: &Core, connection_id: &ConnectionId) -> OpsResult<()> {
    core.db
        .producers
        .update_many(
            |row| row.connection_id == *connection_id && !row.is_deleted,
            |row| row.is_active = true,
        )
        .await?;
    Ok(())
}

pub async fn get_all_producers(core: &Core) -> OpsResult<Vec<ExtendedProducer>> {
    let rows = core
        .db
        .producers
        .find_many_sorted(|_| true, |row| row.creation_date, SortOrder::Descending)
        .await?;
    extend(core, rows).await
}

/// All rows on a station, newest first, joined with station/factory/connection.
pub async fn get_extended_by_station(
    core: &Core,
    station: &Station,
) -> OpsResult<Vec<ExtendedProducer>> {
    let station_id = station.id.clone();
    let rows = core
        .db
        .producers
        .find_many_sorted(
            |row| row.station_id == station_id,
            |row| row.creation_date,
            SortOrder::Descending,
        )
        .await?;
    extend(core, rows).await
}

/// Overview view: newest row per name only, partitioned by liveness.
pub async fn get_partitioned_by_station(
    core: &Core,
    station: &Station,
) -> OpsResult<(
    Vec<ExtendedProducer>,
    Vec<ExtendedProducer>,
    Vec<ExtendedProducer>,
)> {
    let rows = get_extended_by_station(core, station).await?;
    Ok(partition_latest(
        &rows,
        |row| row.name.clone(),
        |row| row.is_active,
        |row| row.is_deleted,
    ))
}

async fn extend(core: &Core, rows: Vec<Producer>) -> OpsResult<Vec<ExtendedProducer>> {
    let stations: HashMap<EntityId, Station> = core
        .db
        .stations
        .aggregate(|rows| {
            rows.iter()
                .map(|station| (station.id.clone(), station.clone()))
                .collect()
        })
        .await?;
    let factories: HashMap<EntityId, Factory> = core
        .db
        .factories
        .aggregate(|rows| {
            rows.iter()
                .map(|factory| (factory.id.clone(), factory.clone()))
                .collect()
        })
        .await?;
    let connections: HashMap<ConnectionId, Connection> = core
        .db
        .connections
        .aggregate(|rows| {
            rows.iter()
                .map(|connection| (connection.id.clone(), connection.clone()))
                .collect()
        })
        .await?;

    Ok(rows
        .into_iter()
        .map(|row| ExtendedProducer {
            station_name: stations
                .get(&row.station_id)
                .map(|station| station.name.clone())
                .unwrap_or_default(),
            factory_name: factories
                .get(&row.factory_id)
                .map(|factory| factory.name.clone())
                .unwrap_or_default(),
            client_address: connections
                .get(&row.connection_id)
                .map(|connection| connection.client_address.clone())
                .unwrap_or_default(),
            id: row.id,
            name: row.name,
            kind: row.kind,
            connection_id: row.connection_id,
            created_by_user: row.created_by_user,
            creation_date: row.creation_date,
            is_active: row.is_active,
            is_deleted: row.is_deleted,
        })
        .collect())
}

async fn station_names_by_id(core: &Core) -> OpsResult<HashMap<EntityId, String>> {
    core.db
        .stations
        .aggregate(|rows| {
            rows.iter()
                .map(|station| (station.id.clone(), station.name.clone()))
                .collect()
        })
        .await
        .map_err(Into::into)
}
