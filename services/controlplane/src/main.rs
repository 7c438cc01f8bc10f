use controlplane::app::{AppState, build_router};
use controlplane::config::ControlPlaneConfig;
use controlplane::core::Core;
use controlplane::store::Db;
use controlplane::{observability, overview, tasks};
use conveyor_transport::Transport;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let metrics_handle = observability::init_observability();

    let config = ControlPlaneConfig::from_env_or_yaml()?;
    let transport = Arc::new(Transport::new());
    let core = Arc::new(Core::bootstrap(Db::new(), Arc::clone(&transport), config.clone()).await?);

    tracing::info!(
        analytics = core.analytics_enabled(),
        default_factory = %config.default_station.factory_name,
        "control plane store ready"
    );

    tokio::spawn(observability::serve_metrics(
        metrics_handle,
        config.metrics_bind,
    ));
    overview::spawn_overview_ticker(
        Arc::clone(&core),
        Duration::from_secs(config.overview_tick_secs),
    );
    tasks::spawn_zombie_reaper(
        Arc::clone(&core),
        Duration::from_secs(config.reaper_interval_secs),
    );

    let app = build_router(AppState { core });

    let addr = config.bind_addr;
    tracing::info!(%addr, "control plane listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
