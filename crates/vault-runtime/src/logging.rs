//! Logging setup for the vault binary
//!
//! Library crates only emit `tracing` events. A binary installs the
//! subscriber once with `init_logging`. `RUST_LOG` overrides the configured
//! level.

use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use vault_core::{VaultError, VaultResult};

const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Configuration for the logging subsystem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Minimum level, one of trace/debug/info/warn/error
    pub level: String,
    /// Whether to use JSON formatting
    pub json_format: bool,
    /// Whether to include target module information
    pub with_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            with_target: true,
        }
    }
}

impl LogConfig {
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            ..Default::default()
        }
    }

    pub fn json_format(mut self, enabled: bool) -> Self {
        self.json_format = enabled;
        self
    }

    pub fn with_target(mut self, enabled: bool) -> Self {
        self.with_target = enabled;
        self
    }

    pub fn validate(&self) -> VaultResult<()> {
        if LEVELS.contains(&self.level.as_str()) {
            Ok(())
        } else {
            Err(VaultError::Config(format!("Invalid log level: {}", self.level)))
        }
    }
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(config: &LogConfig) -> VaultResult<()> {
    config.validate()?;
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let fmt_layer = fmt::layer().with_target(config.with_target);

    let result = if config.json_format {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer.json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
    };

    result.map_err(|e| VaultError::Config(format!("logging init failed: {}", e)))
}
