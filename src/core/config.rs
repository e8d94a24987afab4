//! Layered application configuration: defaults overridden by CLI/env.
//!
//! There is no persisted file-config layer here — the hub has no state that
//! outlives the process, so there is nothing a config file would need to
//! describe beyond what CLI flags and environment variables already cover.

use super::cli::Cli;
use super::constants::{DEFAULT_APP_ENV, DEFAULT_HOST, DEFAULT_HUB_QUEUE_CAPACITY, DEFAULT_PORT};

/// Server bind configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Final merged application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub app_env: String,
    pub debug: bool,
    pub google_analytics_id: Option<String>,
    pub hub_queue_capacity: usize,
}

impl AppConfig {
    /// Loads configuration, layering defaults under environment variables
    /// under CLI flags (CLI fields already fall back to their matching env
    /// var via clap's `env = ...`, so checking `cli` alone covers both).
    pub fn load(cli: &Cli) -> Self {
        let host = cli.host.clone().unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = cli.port.unwrap_or(DEFAULT_PORT);
        let app_env = std::env::var(super::constants::ENV_APP_ENV)
            .unwrap_or_else(|_| DEFAULT_APP_ENV.to_string());
        let hub_queue_capacity = cli
            .hub_queue_capacity
            .unwrap_or(DEFAULT_HUB_QUEUE_CAPACITY);

        Self {
            server: ServerConfig { host, port },
            app_env,
            debug: cli.debug,
            google_analytics_id: cli.google_analytics_id.clone(),
            hub_queue_capacity,
        }
    }

    pub fn is_production(&self) -> bool {
        self.app_env == "production"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_cli() -> Cli {
        Cli {
            host: None,
            port: None,
            debug: false,
            google_analytics_id: None,
            hub_queue_capacity: None,
        }
    }

    #[test]
    fn defaults_apply_when_nothing_set() {
        let cfg = AppConfig::load(&empty_cli());
        assert_eq!(cfg.server.host, DEFAULT_HOST);
        assert_eq!(cfg.server.port, DEFAULT_PORT);
        assert_eq!(cfg.hub_queue_capacity, DEFAULT_HUB_QUEUE_CAPACITY);
        assert!(!cfg.debug);
    }

    #[test]
    fn cli_overrides_defaults() {
        let mut cli = empty_cli();
        cli.host = Some("0.0.0.0".to_string());
        cli.port = Some(9000);
        cli.debug = true;
        let cfg = AppConfig::load(&cli);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.server.port, 9000);
        assert!(cfg.debug);
    }
}
