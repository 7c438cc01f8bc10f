//! Shared control-plane context.
//!
//! # Purpose
//! `Core` threads the store, the transport handle and the runtime
//! configuration through every handler and background task. There is no
//! package-level state: anything a handler needs rides on this struct.
use crate::config::ControlPlaneConfig;
use crate::error::OpsResult;
use crate::model::{ConfigurationDoc, EntityId, User, UserType};
use crate::store::Db;
use chrono::Utc;
use conveyor_transport::Transport;
use std::sync::Arc;

pub const ANALYTICS_CONFIG_KEY: &str = "analytics";

pub struct Core {
    pub db: Db,
    pub transport: Arc<Transport>,
    pub config: ControlPlaneConfig,
    // Resolved at bootstrap from the persisted configuration row; read-only
    // afterwards.
    analytics_enabled: bool,
}

impl Core {
    /// Build the context and run the idempotent first-start bootstrap: the
    /// root user row and the persisted analytics toggle, both written with
    /// set-on-insert semantics so existing rows win over the environment.
    pub async fn bootstrap(
        db: Db,
        transport: Arc<Transport>,
        config: ControlPlaneConfig,
    ) -> OpsResult<Self> {
        let root_username = config.root_username.to_lowercase();
        db.users
            .upsert_set_on_insert(
                |user| user.username == root_username,
                User {
                    id: EntityId::generate(),
                    username: root_username.clone(),
                    user_type: UserType::Root,
                    creation_date: Utc::now(),
                },
            )
            .await?;

        db.configurations
            .upsert_set_on_insert(
                |doc| doc.key == ANALYTICS_CONFIG_KEY,
                ConfigurationDoc {
                    id: EntityId::generate(),
                    key: ANALYTICS_CONFIG_KEY.to_string(),
                    value: serde_json::Value::Bool(config.analytics_enabled),
                },
            )
            .await?;
        let analytics_enabled = db
            .configurations
            .find_one(|doc| doc.key == ANALYTICS_CONFIG_KEY)
            .await?
            .and_then(|doc| doc.value.as_bool())
            .unwrap_or(false);

        Ok(Self {
            db,
            transport,
            config,
            analytics_enabled,
        })
    }

    pub fn analytics_enabled(&self) -> bool {
        self.analytics_enabled
    }

    /// Usage counters are best-effort and must never fail an operation.
    pub fn record_analytics(&self, counter: &'static str) {
        if self.analytics_enabled {
            metrics::counter!(counter).increment(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> ControlPlaneConfig {
        ControlPlaneConfig {
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            metrics_bind: "127.0.0.1:0".parse().unwrap(),
            showable_error_status: crate::config::DEFAULT_SHOWABLE_ERROR_STATUS,
            analytics_enabled: true,
            root_username: "root".to_string(),
            root_password: "conveyor".to_string(),
            default_station: crate::config::DefaultStationConfig::default(),
            reaper_interval_secs: 30,
            overview_tick_secs: 5,
        }
    }

    #[tokio::test]
    async fn bootstrap_creates_root_user_once() {
        let db = Db::new();
        let transport = Arc::new(Transport::new());
        let core = Core::bootstrap(db, Arc::clone(&transport), test_config())
            .await
            .expect("bootstrap");
        assert_eq!(core.db.users.count(|_| true).await.unwrap(), 1);

        // A second bootstrap against the same store must not duplicate rows.
        let core = Core::bootstrap(core.db, transport, test_config())
            .await
            .expect("bootstrap again");
        assert_eq!(core.db.users.count(|_| true).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn stored_analytics_toggle_wins_over_environment() {
        let db = Db::new();
        db.configurations
            .insert_one(ConfigurationDoc {
                id: EntityId::generate(),
                key: ANALYTICS_CONFIG_KEY.to_string(),
                value: serde_json::Value::Bool(false),
            })
            .await
            .unwrap();

        let core = Core::bootstrap(db, Arc::new(Transport::new()), test_config())
            .await
            .expect("bootstrap");
        assert!(!core.analytics_enabled());
    }
}
