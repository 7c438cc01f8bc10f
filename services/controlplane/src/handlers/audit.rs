//! Audit-log operations.
//!
//! Audit writes are best-effort: a failed write is logged and never fails the
//! enclosing operation.
use crate::core::Core;
use crate::error::OpsResult;
use crate::model::{AuditLog, EntityId, UserType};
use crate::store::SortOrder;
use chrono::Utc;

/// Append one administrative event for a station.
pub async fn record(
    core: &Core,
    station_name: &str,
    message: &str,
    username: &str,
    user_type: UserType,
) {
    let entry = AuditLog {
        id: EntityId::generate(),
        station_name: station_name.to_string(),
        message: message.to_string(),
        created_by_user: username.to_string(),
        user_type,
        creation_date: Utc::now(),
    };
    if let Err(err) = core.db.audit_logs.insert_one(entry).await {
        tracing::error!(station = station_name, error = %err, "failed to write audit log");
    }
}

/// Station history, newest first.
pub async fn get_by_station(core: &Core, station_name: &str) -> OpsResult<Vec<AuditLog>> {
    let station_name = station_name.to_string();
    Ok(core
        .db
        .audit_logs
        .find_many_sorted(
            |log| log.station_name == station_name,
            |log| log.creation_date,
            SortOrder::Descending,
        )
        .await?)
}
