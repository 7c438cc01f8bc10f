//! Background reconciliation of persisted liveness against the transport.
//!
//! A row can stay marked active after its connection vanished (a crash, a
//! missed disconnect signal). The reaper sweeps those zombies back to
//! inactive. Each flip goes through `find_one_and_update` guarded on
//! `is_active`, so concurrent or repeated sweeps converge on the same state
//! and write each audit record once.
use crate::core::Core;
use crate::error::OpsResult;
use crate::handlers::audit;
use crate::model::UserType;
use crate::store::SortOrder;
use conveyor_transport::ConnectionId;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

pub fn spawn_zombie_reaper(core: Arc<Core>, interval: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(interval);
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tick.tick().await;
            if let Err(err) = reap_zombie_resources(&core).await {
                tracing::error!(error = ?err, "zombie reap cycle failed");
            }
        }
    })
}

/// One reconciliation pass. Best-effort and idempotent.
pub async fn reap_zombie_resources(core: &Core) -> OpsResult<()> {
    let live: HashSet<ConnectionId> = core.transport.live_connection_ids().await;

    let stale_connections = core
        .db
        .connections
        .find_many_sorted(
            |row| row.is_active && !live.contains(&row.id),
            |row| row.creation_date,
            SortOrder::Ascending,
        )
        .await?;
    for connection in stale_connections {
        core.db
            .connections
            .update_one(
                |row| row.id == connection.id && row.is_active,
                |row| row.is_active = false,
            )
            .await?;
        tracing::warn!(connection_id = %connection.id, "reaped zombie connection");
    }

    let station_names: HashMap<_, _> = core
        .db
        .stations
        .aggregate(|rows| {
            rows.iter()
                .map(|station| (station.id.clone(), station.name.clone()))
                .collect()
        })
        .await?;

    let zombie_producers = core
        .db
        .producers
        .find_many_sorted(
            |row| row.is_active && !live.contains(&row.connection_id),
            |row| row.creation_date,
            SortOrder::Ascending,
        )
        .await?;
    for producer in zombie_producers {
        let producer_id = producer.id.clone();
        // Guarded flip: a concurrent sweep (or an explicit kill) that got
        // there first leaves nothing to do, and no duplicate audit record.
        let prior = core
            .db
            .producers
            .find_one_and_update(
                |row| row.id == producer_id && row.is_active,
                |row| row.is_active = false,
            )
            .await?;
        if prior.is_some() {
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
            metrics::counter!("zombie_producers_reaped_total").increment(1);
        }
    }

    let zombie_consumers = core
        .db
        .consumers
        .find_many_sorted(
            |row| row.is_active && !live.contains(&row.connection_id),
            |row| row.creation_date,
            SortOrder::Ascending,
        )
        .await?;
    for consumer in zombie_consumers {
        let consumer_id = consumer.id.clone();
        let prior = core
            .db
            .consumers
            .find_one_and_update(
                |row| row.id == consumer_id && row.is_active,
                |row| row.is_active = false,
            )
            .await?;
        if prior.is_some() {
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
            metrics::counter!("zombie_consumers_reaped_total").increment(1);
        }
    }

    Ok(())
}
