//! Layered configuration: defaults, then an optional TOML file, then
//! `WALLS__*` environment variables (e.g. `WALLS__WALLS__WALL_MIN_VOLUME=0.05`).

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::engine::walls::WallConfig;
use crate::market_data::exchange::Exchange;

pub const DEFAULT_CONFIG_FILE: &str = "walls.toml";
const ENV_PREFIX: &str = "WALLS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExchangeSettings {
    pub exchange: Exchange,
    /// Overrides the exchange's public API root.
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

impl ExchangeSettings {
    pub fn new(exchange: Exchange) -> Self {
        Self { exchange, base_url: None, timeout_secs: default_timeout_secs() }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// `tracing` filter used when `RUST_LOG` is unset.
    pub log_filter: String,
    /// Order book depth for queries that do not name one.
    pub default_depth: usize,
    pub exchanges: Vec<ExchangeSettings>,
    pub walls: WallConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            default_depth: 50,
            exchanges: Exchange::ALL.into_iter().map(ExchangeSettings::new).collect(),
            walls: WallConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load from `path` (required when given) or `walls.toml` (optional), then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(p) => config::File::from(p).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };
        let builder = config::Config::builder().add_source(file).add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );
        Self::from_builder(builder)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let builder =
            config::Config::builder().add_source(config::File::from_str(text, config::FileFormat::Toml));
        Self::from_builder(builder)
    }

    fn from_builder(builder: config::ConfigBuilder<config::builder::DefaultState>) -> Result<Self, ConfigError> {
        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let ratio = |field: &'static str, value: f64| {
            if value > 0.0 && value <= 1.0 {
                Ok(())
            } else {
                Err(ConfigError::InvalidValue { field, reason: format!("{} is outside (0, 1]", value) })
            }
        };
        let positive = |field: &'static str, value: usize| {
            if value > 0 {
                Ok(())
            } else {
                Err(ConfigError::InvalidValue { field, reason: "must be at least 1".to_string() })
            }
        };

        ratio("walls.wall_min_volume", self.walls.wall_min_volume)?;
        ratio("walls.wall_max_total_volume", self.walls.wall_max_total_volume)?;
        positive("walls.wall_max_count", self.walls.wall_max_count)?;
        positive("walls.top_book_limit", self.walls.top_book_limit)?;
        positive("default_depth", self.default_depth)?;
        if self.exchanges.is_empty() {
            return Err(ConfigError::InvalidValue { field: "exchanges", reason: "no exchange configured".to_string() });
        }
        Ok(())
    }
}
