//! Consumer operations, mirroring the producer surface with group and
//! delivery tuning fields on top.
use crate::core::Core;
use crate::error::{OpsError, OpsResult};
use crate::handlers::{audit, partition_latest, stations};
use crate::model::{
    Connection, Consumer, EntityId, ExtendedConsumer, Factory, Station, UserType,
};
use crate::store::SortOrder;
use crate::validation::{parse_handle_kind, validate_object_name};
use chrono::Utc;
use conveyor_transport::{ClientInfo, ConnectionId, CreateConsumerRequest, DestroyConsumerRequest};
use std::collections::HashMap;

pub async fn create_consumer_direct(
    core: &Core,
    request: &CreateConsumerRequest,
    client: &ClientInfo,
) -> OpsResult<()> {
    let name = request.name.to_lowercase();
    validate_object_name(&name, "Consumer")?;
    let kind = parse_handle_kind(&request.consumer_type.to_lowercase(), "Consumer")?;
    let consumers_group = request.consumers_group.to_lowercase();
    if !consumers_group.is_empty() {
        validate_object_name(&consumers_group, "Consumers group")?;
    }

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
        .consumers
        .find_one(|row| row.name == name && row.station_id == station_id && !row.is_deleted)
        .await?;
    if existing.is_some() {
        return Err(OpsError::Conflict(
            "Consumer name has to be unique per station".to_string(),
        ));
    }

    let consumer = Consumer {
        id: EntityId::generate(),
        name: name.clone(),
        station_id: station.id.clone(),
        factory_id: station.factory_id.clone(),
        kind,
        connection_id: connection.id.clone(),
        consumers_group,
        max_ack_time_ms: request.max_ack_time_ms,
        max_msg_deliveries: request.max_msg_deliveries,
        created_by_user: connection.created_by_user.clone(),
        creation_date: Utc::now(),
        is_active: true,
        is_deleted: false,
    };
    let inserted = core
        .db
        .consumers
        .upsert_set_on_insert(
            |row| row.name == name && row.station_id == station_id && !row.is_deleted,
            consumer,
        )
        .await?;
    if !inserted {
        return Err(OpsError::Conflict(
            "Consumer name has to be unique per station".to_string(),
        ));
    }

    let message = format!("Consumer {name} has been created");
    tracing::info!("{message}");
    audit::record(
        core,
        &station.name,
        &message,
        &client.username,
        UserType::Application,
    )
    .await;
    core.record_analytics("consumers_created_total");
    Ok(())
}

pub async fn destroy_consumer_direct(
    core: &Core,
    request: &DestroyConsumerRequest,
    client: &ClientInfo,
) -> OpsResult<()> {
    let name = request.name.to_lowercase();
    let station_name = request.station_name.to_lowercase();
    let station = stations::get_station_by_name(core, &station_name)
        .await?
        .ok_or_else(|| OpsError::NotFound("Consumer does not exist".to_string()))?;

    let station_id = station.id.clone();
    let prior = core
        .db
        .consumers
        .find_one_and_update(
            |row| row.name == name && row.station_id == station_id && row.is_active,
            |row| {
                row.is_active = false;
                row.is_deleted = true;
            },
        )
        .await?;
    if prior.is_none() {
        return Err(OpsError::NotFound("Consumer does not exist".to_string()));
    }

    let message = format!("Consumer {name} has been deleted");
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

pub async fn kill_consumers(core: &Core, connection_id: &ConnectionId) -> OpsResult<()> {
    let affected = core
        .db
        .consumers
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
        .consumers
        .update_many(
            |row| row.connection_id == *connection_id && row.is_active,
            |row| row.is_active = false,
        )
        .await?;

    let station_names = station_names_by_id(core).await?;
    for consumer in &affected {
        let station_name = station_names
            .get(&consumer.station_id)
            .cloned()
            .unwrap_or_default();
        let message = format!("Consumer {} has been disconnected", consumer.name);
        audit::record(
            core,
            &station_name,
            &message,
            &consumer.created_by_user,
            UserType::for_username(&consumer.created_by_user),
        )
        .await;
    }
    Ok(())
}

pub async fn relive_consumers(core: &Core, connection_id: &ConnectionId) -> OpsResult<()> {
    core.db
        .consumers
        .update_many(
            |row| row.connection_id == *connection_id && !row.is_deleted,
            |row| row.is_active = true,
        )
        .await?;
    Ok(())
}

pub async fn get_all_consumers(core: &Core) -> OpsResult<Vec<ExtendedConsumer>> {
    let rows = core
        .db
        .consumers
        .find_many_sorted(|_| true, |row| row.creation_date, SortOrder::Descending)
        .await?;
    extend(core, rows).await
}

pub async fn get_extended_by_station(
    core: &Core,
    station: &Station,
) -> OpsResult<Vec<ExtendedConsumer>> {
    let station_id = station.id.clone();
    let rows = core
        .db
        .consumers
        .find_many_sorted(
            |row| row.station_id == station_id,
            |row| row.creation_date,
            SortOrder::Descending,
        )
        .await?;
    extend(core, rows).await
}

pub async fn get_partitioned_by_station(
    core: &Core,
    station: &Station,
) -> OpsResult<(
    Vec<ExtendedConsumer>,
    Vec<ExtendedConsumer>,
    Vec<ExtendedConsumer>,
)> {
    let rows = get_extended_by_station(core, station).await?;
    Ok(partition_latest(
        &rows,
        |row| row.name.clone(),
        |row| row.is_active,
        |row| row.is_deleted,
    ))
}

async fn extend(core: &Core, rows: Vec<Consumer>) -> OpsResult<Vec<ExtendedConsumer>> {
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
        .map(|row| ExtendedConsumer {
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
            consumers_group: row.consumers_group,
            max_ack_time_ms: row.max_ack_time_ms,
            max_msg_deliveries: row.max_msg_deliveries,
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
