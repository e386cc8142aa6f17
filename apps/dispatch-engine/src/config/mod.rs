//! Configuration module for the dispatch engine.
//!
//! YAML configuration with environment variable interpolation and
//! validation. Every section and field has a default, so an empty file is
//! a valid configuration.
//!
//! # Usage
//!
//! ```rust,ignore
//! use dispatch_engine::config::load_config;
//!
//! // Load from default path (config.yaml)
//! let config = load_config(None)?;
//!
//! println!("presence ttl: {:?}", config.presence.ttl());
//! ```

mod observability;
mod paper;
mod presence;
mod risk;
mod simulator;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use observability::{LoggingConfig, MetricsConfig, ObservabilityConfig};
pub use paper::PaperConfig;
pub use presence::PresenceConfig;
pub use risk::RiskConfig;
pub use simulator::{SimulatedSymbol, SimulatorConfig};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Presence registry.
    #[serde(default)]
    pub presence: PresenceConfig,
    /// Risk gate.
    #[serde(default)]
    pub risk: RiskConfig,
    /// Paper execution.
    #[serde(default)]
    pub paper: PaperConfig,
    /// Random-walk market.
    #[serde(default)]
    pub simulator: SimulatorConfig,
    /// Real-time fan-out.
    #[serde(default)]
    pub fanout: FanoutConfig,
    /// Logging and metrics.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Real-time fan-out channel configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FanoutConfig {
    /// Broadcast buffer; slow subscribers lag past this many events.
    #[serde(default = "default_fanout_capacity")]
    pub capacity: usize,
}

impl Default for FanoutConfig {
    fn default() -> Self {
        Self {
            capacity: default_fanout_capacity(),
        }
    }
}

const fn default_fanout_capacity() -> usize {
    4096
}

pub(crate) const fn default_true() -> bool {
    true
}

// ============================================
// Configuration Loading
// ============================================

/// Load configuration from a YAML file with environment variable interpolation.
///
/// # Arguments
///
/// * `path` - Optional path to the config file. Defaults to "config.yaml".
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or("config.yaml");

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_string(),
        source: e,
    })?;

    load_config_from_string(&contents)
}

/// Load configuration from a YAML string.
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<Config, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    let config: Config = if interpolated.trim().is_empty() {
        Config::default()
    } else {
        serde_yaml_bw::from_str(&interpolated)?
    };
    validate_config(&config)?;
    Ok(config)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax.
#[allow(clippy::expect_used)] // Regex is compile-time constant; expect() is safe here
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    re.replace_all(input, |cap: &regex::Captures<'_>| {
        let default_value = cap.get(2).map(|m| m.as_str());
        match cap.get(1).map(|m| std::env::var(m.as_str())) {
            Some(Ok(v)) if !v.is_empty() => v,
            _ => default_value.map_or_else(String::new, str::to_string),
        }
    })
    .into_owned()
}

/// Validate configuration values.
fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let presence = &config.presence;
    if presence.ttl_ms == 0 {
        return Err(ConfigError::ValidationError(
            "presence.ttl_ms must be positive".to_string(),
        ));
    }
    if presence.sweep_interval_ms == 0 || presence.sweep_interval_ms > presence.ttl_ms {
        return Err(ConfigError::ValidationError(
            "presence.sweep_interval_ms must be between 1 and ttl_ms".to_string(),
        ));
    }

    let risk = &config.risk;
    if risk.max_order_value <= Decimal::ZERO {
        return Err(ConfigError::ValidationError(
            "risk.max_order_value must be positive".to_string(),
        ));
    }
    if risk.max_away_pct < Decimal::ZERO {
        return Err(ConfigError::ValidationError(
            "risk.max_away_pct must not be negative".to_string(),
        ));
    }
    if risk.default_lot == 0 {
        return Err(ConfigError::ValidationError(
            "risk.default_lot must be at least 1".to_string(),
        ));
    }

    let paper = &config.paper;
    if !(0.0..=1.0).contains(&paper.liquidity) {
        return Err(ConfigError::ValidationError(
            "paper.liquidity must be between 0.0 and 1.0".to_string(),
        ));
    }
    if paper.max_slippage_pct < Decimal::ZERO {
        return Err(ConfigError::ValidationError(
            "paper.max_slippage_pct must not be negative".to_string(),
        ));
    }
    if paper.max_slices == 0 {
        return Err(ConfigError::ValidationError(
            "paper.max_slices must be at least 1".to_string(),
        ));
    }
    if paper.slice_unit_qty == 0 {
        return Err(ConfigError::ValidationError(
            "paper.slice_unit_qty must be at least 1".to_string(),
        ));
    }
    if paper.trigger_poll_ms == 0 {
        return Err(ConfigError::ValidationError(
            "paper.trigger_poll_ms must be positive".to_string(),
        ));
    }

    let simulator = &config.simulator;
    if simulator.speed <= 0.0 || !simulator.speed.is_finite() {
        return Err(ConfigError::ValidationError(
            "simulator.speed must be positive".to_string(),
        ));
    }
    if simulator.tick_interval_ms == 0 {
        return Err(ConfigError::ValidationError(
            "simulator.tick_interval_ms must be positive".to_string(),
        ));
    }
    if simulator.spread < Decimal::ZERO || simulator.floor_price <= Decimal::ZERO {
        return Err(ConfigError::ValidationError(
            "simulator.spread must not be negative and floor_price must be positive".to_string(),
        ));
    }

    if config.fanout.capacity == 0 {
        return Err(ConfigError::ValidationError(
            "fanout.capacity must be positive".to_string(),
        ));
    }

    let format = config.observability.logging.format.as_str();
    if !matches!(format, "json" | "pretty") {
        return Err(ConfigError::ValidationError(format!(
            "observability.logging.format must be json or pretty, got {format}"
        )));
    }

    Ok(())
}
