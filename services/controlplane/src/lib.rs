// Conveyor Control Plane
// ----------------------
// The control-plane service of the Conveyor broker. It owns the domain-object
// lifecycle (factories, stations, producers, consumers, connections, schemas,
// schema versions, audit logs, tags) on top of two opaque collaborators:
//
// - the Transport (crates/conveyor-transport): client connection identity and
//   lifecycle, in-band control request delivery, fan-out rooms, per-station
//   message statistics;
// - the Store (store/): typed collections with the atomic primitives
//   (set-on-insert upsert, find-one-and-update) the lifecycle rules race on.
//
// Surfaces:
// - HTTP admin API (api/, app.rs): POST-RPC routes under /api/... plus the
//   WebSocket live overview surface.
// - Direct control surface (direct.rs): create/destroy producer and consumer
//   requests delivered in-band by the transport.
// - Background tasks: the overview room ticker (overview.rs) and the zombie
//   reaper (tasks.rs).
pub mod api;
pub mod app;
pub mod config;
pub mod core;
pub mod direct;
pub mod error;
pub mod handlers;
pub mod model;
pub mod observability;
pub mod overview;
pub mod store;
pub mod tasks;
pub mod validation;
