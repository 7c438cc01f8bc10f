//! Connection hook: bridges transport lifecycle signals to liveness
//! transitions. These are the only state transitions not initiated by an
//! explicit admin request.
use crate::core::Core;
use crate::error::OpsResult;
use crate::handlers::{consumers, producers};
use crate::model::Connection;
use chrono::Utc;
use conveyor_transport::{ClientInfo, ConnectionId};

/// A client registered (or reconnected): mirror the connection row active and
/// relive every non-deleted handle tracked under its id.
pub async fn client_registered(core: &Core, client: &ClientInfo) -> OpsResult<()> {
    let connection_id = client.connection_id.clone();
    let client_address = client.client_address.clone();
    let prior = core
        .db
        .connections
        .find_one_and_update(
            |row| row.id == connection_id,
            |row| {
                row.is_active = true;
                row.client_address = client_address.clone();
            },
        )
        .await?;
    if prior.is_none() {
        core.db
            .connections
            .insert_one(Connection {
                id: client.connection_id.clone(),
                client_address: client.client_address.clone(),
                created_by_user: client.username.clone(),
                is_active: true,
                creation_date: Utc::now(),
            })
            .await?;
    }

    producers::relive_producers(core, &client.connection_id).await?;
    consumers::relive_consumers(core, &client.connection_id).await?;
    Ok(())
}

/// A client went away: mark its connection row inactive and kill every
/// active handle on it.
pub async fn client_disconnected(core: &Core, connection_id: &ConnectionId) -> OpsResult<()> {
    core.db
        .connections
        .update_one(|row| row.id == *connection_id, |row| row.is_active = false)
        .await?;

    producers::kill_producers(core, connection_id).await?;
    consumers::kill_consumers(core, connection_id).await?;
    Ok(())
}
