//! Admin HTTP API module.
//!
//! # Purpose
//! Route handler modules plus the shared helpers of the REST layer. Handlers
//! stay thin: resolve the acting user, call the domain handler, map the error
//! onto the HTTP surface via `api::error`.
pub mod audit_logs;
pub mod consumers;
pub mod error;
pub mod factories;
pub mod openapi;
pub mod producers;
pub mod schemas;
pub mod socket;
pub mod stations;
pub mod system;
pub mod tags;
pub mod types;

use crate::app::AppState;
use axum::http::HeaderMap;

/// Username established by the authentication middleware in front of this
/// core. The middleware itself is out of scope here; absent the header, the
/// acting user is the bootstrapped root.
pub(crate) fn request_user(headers: &HeaderMap, state: &AppState) -> String {
    headers
        .get("x-conveyor-user")
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_lowercase())
        .unwrap_or_else(|| state.core.config.root_username.to_lowercase())
}
