//! Calculation mode and per-position conversion parameters

use std::fmt;

use serde::{Deserialize, Serialize};

/// P&L formula selector for an instrument; wire values 1..=4.
///
/// Anything else the backend sends is preserved as [`CalculationMode::Unknown`]
/// so that snapshot decoding never fails on one bad instrument — the position
/// surfaces a configuration error at valuation time instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum CalculationMode {
    Forex,
    Cfd,
    CfdLeverage,
    ForexNoLeverage,
    Unknown(u8),
}

impl CalculationMode {
    /// Forex-family modes share the per-leg rounding formula and the
    /// by-deal/by-market conversion choice.
    pub fn is_forex(self) -> bool {
        matches!(self, CalculationMode::Forex | CalculationMode::ForexNoLeverage)
    }
}

impl From<u8> for CalculationMode {
    fn from(value: u8) -> Self {
        match value {
            1 => CalculationMode::Forex,
            2 => CalculationMode::Cfd,
            3 => CalculationMode::CfdLeverage,
            4 => CalculationMode::ForexNoLeverage,
            other => CalculationMode::Unknown(other),
        }
    }
}

impl From<CalculationMode> for u8 {
    fn from(mode: CalculationMode) -> Self {
        match mode {
            CalculationMode::Forex => 1,
            CalculationMode::Cfd => 2,
            CalculationMode::CfdLeverage => 3,
            CalculationMode::ForexNoLeverage => 4,
            CalculationMode::Unknown(raw) => raw,
        }
    }
}

impl fmt::Display for CalculationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CalculationMode::Forex => "Forex",
            CalculationMode::Cfd => "CFD",
            CalculationMode::CfdLeverage => "CFD Leverage",
            CalculationMode::ForexNoLeverage => "Forex No Leverage",
            CalculationMode::Unknown(_) => "Unknown",
        };
        f.write_str(name)
    }
}

fn default_exchange_rate() -> f64 {
    1.0
}

/// Cross-currency conversion parameters for one position.
///
/// Absent entirely (`Position::pl_calculation == None`) the position's profit
/// is undefined. `exchange_rate` is the last applied conversion rate: seeded
/// by the snapshot, overwritten by valuation whenever the conversion symbol
/// has a live tick, and reused as-is when it does not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlCalculation {
    pub calculation_mode: CalculationMode,
    /// Instrument whose tick converts instrument-currency profit into the
    /// account currency. Absent when no conversion is needed.
    #[serde(default)]
    pub conversion_symbol: Option<String>,
    /// The conversion quote is for the opposite pair direction; apply 1/rate.
    #[serde(default)]
    pub is_reversed: bool,
    /// Forex modes only: choose bid/ask by profitability (by market) rather
    /// than by trade direction (by deal).
    #[serde(default)]
    pub is_forex_profit_by_market: bool,
    #[serde(default = "default_exchange_rate")]
    pub exchange_rate: f64,
}
