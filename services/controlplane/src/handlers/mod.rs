//! Domain operation handlers.
//!
//! # Purpose
//! The operations behind both admin surfaces: HTTP routes call into these,
//! and the direct (transport in-band) surface calls the same functions. Every
//! handler takes the shared [`crate::core::Core`] context; none of them hold
//! in-process locks across store or transport calls.
pub mod audit;
pub mod connections;
pub mod consumers;
pub mod factories;
pub mod producers;
pub mod schemas;
pub mod stations;
pub mod tags;

use std::collections::HashSet;

/// Partition handle rows into connected / disconnected / deleted, keeping
/// only the newest row per name.
///
/// `rows` must already be sorted newest-first; the first occurrence of a name
/// decides which bucket that name lands in and older rows are hidden.
pub(crate) fn partition_latest<T: Clone>(
    rows: &[T],
    name: impl Fn(&T) -> String,
    is_active: impl Fn(&T) -> bool,
    is_deleted: impl Fn(&T) -> bool,
) -> (Vec<T>, Vec<T>, Vec<T>) {
    let mut seen: HashSet<String> = HashSet::new();
    let mut connected = Vec::new();
    let mut disconnected = Vec::new();
    let mut deleted = Vec::new();
    for row in rows {
        if !seen.insert(name(row)) {
            continue;
        }
        if is_active(row) {
            connected.push(row.clone());
        } else if !is_deleted(row) {
            disconnected.push(row.clone());
        } else {
            deleted.push(row.clone());
        }
    }
    (connected, disconnected, deleted)
}
