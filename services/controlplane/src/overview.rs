//! Overview snapshots and the room refresh ticker.
//!
//! # Purpose
//! Computes the per-scope snapshots pushed to subscribed sockets and runs the
//! periodic tick that refreshes every populated room. Snapshots are plain
//! reads; an overlapping slow tick recomputes the same view and is harmless.
use crate::core::Core;
use crate::error::{OpsError, OpsResult};
use crate::handlers::{audit, consumers, factories, producers, stations};
use crate::model::{AuditLog, ExtendedConsumer, ExtendedFactory, ExtendedProducer, FactoryDetails};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use utoipa::ToSchema;

/// Subscription scope of one overview room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverviewScope {
    Main,
    Factories,
    Factory(String),
    Station(String),
}

impl OverviewScope {
    pub fn room(&self) -> String {
        match self {
            OverviewScope::Main => "main_overview".to_string(),
            OverviewScope::Factories => "factories_overview".to_string(),
            OverviewScope::Factory(name) => format!("factory_overview:{name}"),
            OverviewScope::Station(name) => format!("station_overview:{name}"),
        }
    }

    pub fn from_room(room: &str) -> Option<Self> {
        match room {
            "main_overview" => Some(OverviewScope::Main),
            "factories_overview" => Some(OverviewScope::Factories),
            _ => {
                if let Some(name) = room.strip_prefix("factory_overview:") {
                    Some(OverviewScope::Factory(name.to_string()))
                } else {
                    room.strip_prefix("station_overview:")
                        .map(|name| OverviewScope::Station(name.to_string()))
                }
            }
        }
    }

    /// Event name carried on frames delivered for this scope.
    pub fn event(&self) -> &'static str {
        match self {
            OverviewScope::Main => "main_overview_data",
            OverviewScope::Factories => "factories_overview_data",
            OverviewScope::Factory(_) => "factory_overview_data",
            OverviewScope::Station(_) => "station_overview_data",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct SystemComponent {
    pub component: String,
    pub desired_replicas: u32,
    pub actual_replicas: u32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct StationSummary {
    pub station_name: String,
    pub factory_name: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct MainOverview {
    pub total_stations: u64,
    pub total_messages: u64,
    pub system_components: Vec<SystemComponent>,
    pub stations: Vec<StationSummary>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct PartitionedProducers {
    pub connected: Vec<ExtendedProducer>,
    pub disconnected: Vec<ExtendedProducer>,
    pub deleted: Vec<ExtendedProducer>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct PartitionedConsumers {
    pub connected: Vec<ExtendedConsumer>,
    pub disconnected: Vec<ExtendedConsumer>,
    pub deleted: Vec<ExtendedConsumer>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct StationOverview {
    pub producers: PartitionedProducers,
    pub consumers: PartitionedConsumers,
    pub total_messages: u64,
    pub average_message_size: u64,
    pub audit_logs: Vec<AuditLog>,
}

pub async fn main_overview(core: &Core) -> OpsResult<MainOverview> {
    let station_rows = stations::get_all_stations(core).await?;
    let factory_names = core
        .db
        .factories
        .aggregate(|rows| {
            rows.iter()
                .map(|factory| (factory.id.clone(), factory.name.clone()))
                .collect::<std::collections::HashMap<_, _>>()
        })
        .await?;

    let mut total_messages = 0u64;
    let mut summaries = Vec::with_capacity(station_rows.len());
    for station in &station_rows {
        total_messages += core.transport.stream_stats(&station.name).await.messages;
        summaries.push(StationSummary {
            station_name: station.name.clone(),
            factory_name: factory_names
                .get(&station.factory_id)
                .cloned()
                .unwrap_or_default(),
        });
    }

    Ok(MainOverview {
        total_stations: station_rows.len() as u64,
        total_messages,
        system_components: system_components(),
        stations: summaries,
    })
}

pub async fn factories_overview(core: &Core) -> OpsResult<Vec<ExtendedFactory>> {
    factories::get_all_factories(core).await
}

pub async fn factory_overview(core: &Core, factory_name: &str) -> OpsResult<FactoryDetails> {
    factories::get_factory_details(core, factory_name).await
}

pub async fn station_overview(core: &Core, station_name: &str) -> OpsResult<StationOverview> {
    let station = stations::get_station_by_name(core, station_name)
        .await?
        .ok_or_else(|| OpsError::NotFound("Station does not exist".to_string()))?;

    let (connected, disconnected, deleted) =
        producers::get_partitioned_by_station(core, &station).await?;
    let (consumers_connected, consumers_disconnected, consumers_deleted) =
        consumers::get_partitioned_by_station(core, &station).await?;
    let audit_logs = audit::get_by_station(core, &station.name).await?;
    let stats = core.transport.stream_stats(&station.name).await;

    Ok(StationOverview {
        producers: PartitionedProducers {
            connected,
            disconnected,
            deleted,
        },
        consumers: PartitionedConsumers {
            connected: consumers_connected,
            disconnected: consumers_disconnected,
            deleted: consumers_deleted,
        },
        total_messages: stats.messages,
        average_message_size: stats.average_message_size(),
        audit_logs,
    })
}

/// Compute the frame delivered to subscribers of a scope: the event name plus
/// the scope's snapshot, serialized once per room per tick.
pub async fn snapshot_frame(core: &Core, scope: &OverviewScope) -> OpsResult<Bytes> {
    let data = match scope {
        OverviewScope::Main => serde_json::to_value(main_overview(core).await?),
        OverviewScope::Factories => serde_json::to_value(factories_overview(core).await?),
        OverviewScope::Factory(name) => serde_json::to_value(factory_overview(core, name).await?),
        OverviewScope::Station(name) => serde_json::to_value(station_overview(core, name).await?),
    }
    .map_err(|err| OpsError::Internal(err.into()))?;

    let frame = serde_json::json!({
        "event": scope.event(),
        "data": data,
    });
    Ok(Bytes::from(frame.to_string()))
}

/// Background refresh: every `period`, recompute and broadcast the snapshot
/// of each populated room. Rooms with no members are skipped (and pruned by
/// the transport).
pub fn spawn_overview_ticker(core: Arc<Core>, period: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(period);
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tick.tick().await;
            for room in core.transport.populated_rooms().await {
                let Some(scope) = OverviewScope::from_room(&room) else {
                    continue;
                };
                match snapshot_frame(&core, &scope).await {
                    Ok(frame) => {
                        core.transport.broadcast_to_room(&room, frame).await;
                    }
                    Err(err) => {
                        tracing::error!(room, error = %err, "failed to refresh overview room");
                    }
                }
            }
        }
    })
}

// Single-process deployment: each component runs embedded, so desired and
// actual replica counts match.
fn system_components() -> Vec<SystemComponent> {
    ["controlplane", "store", "transport"]
        .into_iter()
        .map(|component| SystemComponent {
            component: component.to_string(),
            desired_replicas: 1,
            actual_replicas: 1,
        })
        .collect()
}
