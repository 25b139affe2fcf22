use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::domain::orchestrator::DEFAULT_REQUEST_TIMEOUT;
use crate::domain::store_directory::DEFAULT_CAPACITY;
use crate::models::OptimizationSettings;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

/// Process configuration, read from the environment (and `.env`)
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub api_url: String,
    pub device_id: Option<String>,
    pub request_timeout: Duration,
    pub settings: OptimizationSettings,
    pub store_directory_capacity: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            device_id: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            settings: OptimizationSettings::default(),
            store_directory_capacity: DEFAULT_CAPACITY,
        }
    }
}

impl AppConfig {
    /// Unset or unparseable variables fall back to their defaults.
    pub fn from_env() -> Self {
        let defaults = AppConfig::default();

        let api_url = env::var("OPTIMIZER_API_URL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(defaults.api_url);

        let device_id = env::var("DEVICE_ID").ok().filter(|s| !s.trim().is_empty());

        let request_timeout = parse_var::<u64>("OPTIMIZER_TIMEOUT_SECS")
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);

        let settings = OptimizationSettings {
            max_store_distance_km: parse_var("MAX_STORE_DISTANCE_KM")
                .unwrap_or(defaults.settings.max_store_distance_km),
            max_travel_distance_km: parse_var("MAX_TRAVEL_DISTANCE_KM")
                .unwrap_or(defaults.settings.max_travel_distance_km),
            max_stores: parse_var("MAX_STORES")
                .filter(|n| *n > 0)
                .unwrap_or(defaults.settings.max_stores),
        };

        let store_directory_capacity = parse_var("STORE_DIRECTORY_CAPACITY")
            .unwrap_or(defaults.store_directory_capacity);

        AppConfig {
            api_url,
            device_id,
            request_timeout,
            settings,
            store_directory_capacity,
        }
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse::<T>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 7] = [
        "OPTIMIZER_API_URL",
        "DEVICE_ID",
        "OPTIMIZER_TIMEOUT_SECS",
        "MAX_STORE_DISTANCE_KM",
        "MAX_TRAVEL_DISTANCE_KM",
        "MAX_STORES",
        "STORE_DIRECTORY_CAPACITY",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_defaults_when_unset() {
        clear_env();
        assert_eq!(AppConfig::from_env(), AppConfig::default());
    }

    #[test]
    #[serial]
    fn test_reads_overrides() {
        clear_env();
        env::set_var("OPTIMIZER_API_URL", "http://optimizer.internal:9000");
        env::set_var("DEVICE_ID", "device-1");
        env::set_var("OPTIMIZER_TIMEOUT_SECS", "30");
        env::set_var("MAX_STORE_DISTANCE_KM", "7.5");
        env::set_var("MAX_STORES", "2");

        let config = AppConfig::from_env();
        clear_env();

        assert_eq!(config.api_url, "http://optimizer.internal:9000");
        assert_eq!(config.device_id.as_deref(), Some("device-1"));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.settings.max_store_distance_km, 7.5);
        assert_eq!(config.settings.max_stores, 2);
        assert_eq!(config.settings.max_travel_distance_km, 20.0);
    }

    #[test]
    #[serial]
    fn test_garbage_falls_back_to_defaults() {
        clear_env();
        env::set_var("OPTIMIZER_TIMEOUT_SECS", "soon");
        env::set_var("MAX_STORES", "0");

        let config = AppConfig::from_env();
        clear_env();

        assert_eq!(config.request_timeout, DEFAULT_REQUEST_TIMEOUT);
        assert_eq!(config.settings.max_stores, 3);
    }
}
