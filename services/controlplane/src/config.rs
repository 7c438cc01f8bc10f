use crate::model::{RetentionPolicy, RetentionType, StorageType};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;

pub const DEFAULT_SHOWABLE_ERROR_STATUS: u16 = 666;
pub const SCHEMA_VALIDATION_ERROR_STATUS: u16 = 555;
pub const DEFAULT_REAPER_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_OVERVIEW_TICK_SECS: u64 = 5;

// Control plane configuration sourced from environment variables.
#[derive(Debug, Clone)]
pub struct ControlPlaneConfig {
    // HTTP bind address for the admin API.
    pub bind_addr: SocketAddr,
    // Metrics HTTP bind address.
    pub metrics_bind: SocketAddr,
    // Status code used for errors the UI renders to the user.
    pub showable_error_status: u16,
    // Whether anonymous usage counters are recorded.
    pub analytics_enabled: bool,
    // Root user bootstrapped on first start.
    pub root_username: String,
    pub root_password: String,
    pub default_station: DefaultStationConfig,
    pub reaper_interval_secs: u64,
    pub overview_tick_secs: u64,
}

// Settings applied to stations auto-created by the producer/consumer path.
#[derive(Debug, Clone)]
pub struct DefaultStationConfig {
    pub factory_name: String,
    pub retention: RetentionPolicy,
    pub storage_type: StorageType,
    pub replicas: u32,
    pub dedup_window_ms: u64,
}

impl Default for DefaultStationConfig {
    fn default() -> Self {
        Self {
            factory_name: "general".to_string(),
            retention: RetentionPolicy {
                retention_type: RetentionType::Time,
                value: 604_800_000,
            },
            storage_type: StorageType::File,
            replicas: 1,
            dedup_window_ms: 0,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ControlPlaneConfigOverride {
    bind_addr: Option<String>,
    metrics_bind: Option<String>,
    showable_error_status: Option<u16>,
    analytics_enabled: Option<bool>,
    default_factory: Option<String>,
    reaper_interval_secs: Option<u64>,
    overview_tick_secs: Option<u64>,
}

impl ControlPlaneConfig {
    pub fn from_env() -> Result<Self> {
        // Environment variables provide defaults for local development.
        let bind_addr = std::env::var("CONVEYOR_HTTP_BIND")
            .unwrap_or_else(|_| "0.0.0.0:5555".to_string())
            .parse()
            .with_context(|| "parse CONVEYOR_HTTP_BIND")?;
        let metrics_bind = std::env::var("CONVEYOR_METRICS_BIND")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
            .parse()
            .with_context(|| "parse CONVEYOR_METRICS_BIND")?;
        let showable_error_status = match std::env::var("CONVEYOR_SHOWABLE_STATUS") {
            Ok(raw) => raw.parse().with_context(|| "parse CONVEYOR_SHOWABLE_STATUS")?,
            Err(_) => DEFAULT_SHOWABLE_ERROR_STATUS,
        };
        let analytics_enabled = std::env::var("CONVEYOR_ANALYTICS")
            .map(|raw| raw != "false" && raw != "0")
            .unwrap_or(true);
        let root_username =
            std::env::var("CONVEYOR_ROOT_USERNAME").unwrap_or_else(|_| "root".to_string());
        let root_password =
            std::env::var("CONVEYOR_ROOT_PASSWORD").unwrap_or_else(|_| "conveyor".to_string());
        let mut default_station = DefaultStationConfig::default();
        if let Ok(factory_name) = std::env::var("CONVEYOR_DEFAULT_FACTORY") {
            default_station.factory_name = factory_name;
        }
        let reaper_interval_secs = match std::env::var("CONVEYOR_REAPER_INTERVAL_SECS") {
            Ok(raw) => raw
                .parse()
                .with_context(|| "parse CONVEYOR_REAPER_INTERVAL_SECS")?,
            Err(_) => DEFAULT_REAPER_INTERVAL_SECS,
        };
        let overview_tick_secs = match std::env::var("CONVEYOR_OVERVIEW_TICK_SECS") {
            Ok(raw) => raw
                .parse()
                .with_context(|| "parse CONVEYOR_OVERVIEW_TICK_SECS")?,
            Err(_) => DEFAULT_OVERVIEW_TICK_SECS,
        };
        Ok(Self {
            bind_addr,
            metrics_bind,
            showable_error_status,
            analytics_enabled,
            root_username,
            root_password,
            default_station,
            reaper_interval_secs,
            overview_tick_secs,
        })
    }

    pub fn from_env_or_yaml() -> Result<Self> {
        let mut config = Self::from_env()?;
        if let Ok(path) = std::env::var("CONVEYOR_CONFIG") {
            // YAML overrides allow ops-friendly config files.
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("read CONVEYOR_CONFIG: {path}"))?;
            let override_cfg: ControlPlaneConfigOverride = serde_yaml::from_str(&contents)
                .with_context(|| "parse control plane config yaml")?;
            if let Some(value) = override_cfg.bind_addr {
                config.bind_addr = value.parse().with_context(|| "parse bind_addr")?;
            }
            if let Some(value) = override_cfg.metrics_bind {
                config.metrics_bind = value.parse().with_context(|| "parse metrics_bind")?;
            }
            if let Some(value) = override_cfg.showable_error_status {
                config.showable_error_status = value;
            }
            if let Some(value) = override_cfg.analytics_enabled {
                config.analytics_enabled = value;
            }
            if let Some(value) = override_cfg.default_factory {
                config.default_station.factory_name = value;
            }
            if let Some(value) = override_cfg.reaper_interval_secs {
                config.reaper_interval_secs = value;
            }
            if let Some(value) = override_cfg.overview_tick_secs {
                config.overview_tick_secs = value;
            }
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use std::fs;
    use tempfile::TempDir;

    // Helper to clear all Conveyor env vars
    fn clear_conveyor_env() {
        for (key, _) in env::vars() {
            if key.starts_with("CONVEYOR_") {
                env::remove_var(key);
            }
        }
    }

    #[serial]
    #[test]
    fn from_env_uses_defaults() {
        clear_conveyor_env();
        let config = ControlPlaneConfig::from_env().expect("from_env");
        assert_eq!(config.bind_addr.to_string(), "0.0.0.0:5555");
        assert_eq!(config.metrics_bind.to_string(), "0.0.0.0:8080");
        assert_eq!(config.showable_error_status, 666);
        assert!(config.analytics_enabled);
        assert_eq!(config.root_username, "root");
        assert_eq!(config.default_station.factory_name, "general");
        assert_eq!(config.overview_tick_secs, 5);
    }

    #[serial]
    #[test]
    fn from_env_respects_env_vars() {
        clear_conveyor_env();
        env::set_var("CONVEYOR_HTTP_BIND", "127.0.0.1:9555");
        env::set_var("CONVEYOR_ANALYTICS", "false");
        env::set_var("CONVEYOR_DEFAULT_FACTORY", "edge");
        env::set_var("CONVEYOR_REAPER_INTERVAL_SECS", "7");

        let config = ControlPlaneConfig::from_env().expect("from_env");
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:9555");
        assert!(!config.analytics_enabled);
        assert_eq!(config.default_station.factory_name, "edge");
        assert_eq!(config.reaper_interval_secs, 7);

        clear_conveyor_env();
    }

    #[serial]
    #[test]
    fn from_env_rejects_invalid_socket_addr() {
        clear_conveyor_env();
        env::set_var("CONVEYOR_HTTP_BIND", "not-a-valid-address");
        let result = ControlPlaneConfig::from_env();
        assert!(result.is_err());
        clear_conveyor_env();
    }

    #[serial]
    #[test]
    fn from_env_or_yaml_file_not_found_fails() {
        clear_conveyor_env();
        let tmpdir = TempDir::new().unwrap();
        let nonexistent = tmpdir.path().join("nonexistent.yml");
        env::set_var("CONVEYOR_CONFIG", nonexistent.to_str().unwrap());
        let result = ControlPlaneConfig::from_env_or_yaml();
        assert!(result.is_err());
        clear_conveyor_env();
    }

    #[serial]
    #[test]
    fn from_env_or_yaml_overrides_with_valid_yaml() {
        clear_conveyor_env();
        let tmpdir = TempDir::new().unwrap();
        let config_path = tmpdir.path().join("config.yml");
        fs::write(
            &config_path,
            r#"
bind_addr: "127.0.0.1:7555"
showable_error_status: 600
analytics_enabled: false
default_factory: "plant"
"#,
        )
        .unwrap();
        env::set_var("CONVEYOR_CONFIG", config_path.to_str().unwrap());

        let config = ControlPlaneConfig::from_env_or_yaml().expect("from_env_or_yaml");
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:7555");
        assert_eq!(config.showable_error_status, 600);
        assert!(!config.analytics_enabled);
        assert_eq!(config.default_station.factory_name, "plant");

        clear_conveyor_env();
    }

    #[serial]
    #[test]
    fn from_env_or_yaml_invalid_yaml_fails() {
        clear_conveyor_env();
        let tmpdir = TempDir::new().unwrap();
        let config_path = tmpdir.path().join("bad.yml");
        fs::write(&config_path, "this is not: valid: yaml:").unwrap();
        env::set_var("CONVEYOR_CONFIG", config_path.to_str().unwrap());

        let result = ControlPlaneConfig::from_env_or_yaml();
        assert!(result.is_err());

        clear_conveyor_env();
    }
}
