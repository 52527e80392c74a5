use std::env;

use config::{Config, ConfigError, Environment, File};
use holdem_core::TableConfig;
use serde::Deserialize;

/// Layers, lowest priority first: `config/default`, `config/<run mode>`,
/// `config/local`, then `HOLDEM__SECTION__KEY` environment variables.
/// Every file is optional; missing keys fall back to the defaults below.
pub fn load() -> Result<Settings, ConfigError> {
    let run_mode = env::var(RUN_MODE_ENV).unwrap_or_else(|_| "development".into());
    Config::builder()
        .add_source(File::with_name(DEFAULT_CFG_PATH).required(false))
        .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
        .add_source(File::with_name(LOCAL_CFG_PATH).required(false))
        .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?
        .try_deserialize()
}

const DEFAULT_CFG_PATH: &str = "config/default";
const LOCAL_CFG_PATH: &str = "config/local";
const RUN_MODE_ENV: &str = "HOLDEM_RUN_MODE";
const ENV_PREFIX: &str = "HOLDEM";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub logging: Logging,
    pub server: Server,
    pub table: TableConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Logging {
    /// `tracing` filter directive, used when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for Logging {
    fn default() -> Self {
        Logging {
            level: "info".into(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Server {
    pub bind_addr: String,
    /// Outbound queue per WebSocket observer.
    pub channel_capacity: usize,
}

impl Default for Server {
    fn default() -> Self {
        Server {
            bind_addr: "0.0.0.0:25917".into(),
            channel_capacity: 32,
        }
    }
}
