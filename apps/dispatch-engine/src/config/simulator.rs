//! Random-walk market simulator configuration.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::default_true;

/// One simulated instrument.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatedSymbol {
    /// Symbol.
    pub symbol: String,
    /// Starting mid price.
    pub start_price: Decimal,
}

/// Random-walk quote source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatorConfig {
    /// Start ticking at boot.
    #[serde(default = "default_true")]
    pub autostart: bool,
    /// Instruments to simulate.
    #[serde(default = "default_symbols")]
    pub symbols: Vec<SimulatedSymbol>,
    /// Tick rate multiplier.
    #[serde(default = "default_speed")]
    pub speed: f64,
    /// Base tick interval at speed 1.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Bid/ask spread.
    #[serde(default = "default_spread")]
    pub spread: Decimal,
    /// Maximum mid move per tick.
    #[serde(default = "default_volatility")]
    pub volatility: Decimal,
    /// Mid never falls below this.
    #[serde(default = "default_floor_price")]
    pub floor_price: Decimal,
    /// Seed for reproducible walks; entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            autostart: true,
            symbols: default_symbols(),
            speed: default_speed(),
            tick_interval_ms: default_tick_interval_ms(),
            spread: default_spread(),
            volatility: default_volatility(),
            floor_price: default_floor_price(),
            seed: None,
        }
    }
}

fn default_symbols() -> Vec<SimulatedSymbol> {
    vec![
        SimulatedSymbol {
            symbol: "INFY".to_string(),
            start_price: Decimal::from(1500),
        },
        SimulatedSymbol {
            symbol: "RELIANCE".to_string(),
            start_price: Decimal::from(2500),
        },
    ]
}

const fn default_speed() -> f64 {
    1.0
}

const fn default_tick_interval_ms() -> u64 {
    250
}

fn default_spread() -> Decimal {
    Decimal::new(30, 2)
}

fn default_volatility() -> Decimal {
    Decimal::new(8, 1)
}

fn default_floor_price() -> Decimal {
    Decimal::from(5)
}
