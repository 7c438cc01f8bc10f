#![allow(dead_code)]
use controlplane::app::AppState;
use controlplane::config::{ControlPlaneConfig, DefaultStationConfig};
use controlplane::core::Core;
use controlplane::store::Db;
use conveyor_transport::Transport;
use std::sync::Arc;

pub fn test_config() -> ControlPlaneConfig {
    ControlPlaneConfig {
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        metrics_bind: "127.0.0.1:0".parse().unwrap(),
        showable_error_status: 666,
        analytics_enabled: false,
        root_username: "root".to_string(),
        root_password: "conveyor".to_string(),
        default_station: DefaultStationConfig::default(),
        reaper_interval_secs: 30,
        overview_tick_secs: 5,
    }
}

pub async fn test_core() -> Arc<Core> {
    let transport = Arc::new(Transport::new());
    Arc::new(
        Core::bootstrap(Db::new(), transport, test_config())
            .await
            .expect("bootstrap core"),
    )
}

pub async fn test_state() -> AppState {
    AppState {
        core: test_core().await,
    }
}

pub async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}
