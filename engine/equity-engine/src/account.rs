//! Account summary as delivered by the account-management snapshot

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Policy for folding floating P&L into equity; wire values 1..=4.
///
/// Values this build does not recognize are preserved and treated like
/// [`FreeMarginMode::UsePl`] by the margin engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum FreeMarginMode {
    NotUsePl,
    UsePl,
    ProfitOnly,
    LossOnly,
    Unknown(u8),
}

impl From<u8> for FreeMarginMode {
    fn from(value: u8) -> Self {
        match value {
            1 => FreeMarginMode::NotUsePl,
            2 => FreeMarginMode::UsePl,
            3 => FreeMarginMode::ProfitOnly,
            4 => FreeMarginMode::LossOnly,
            other => FreeMarginMode::Unknown(other),
        }
    }
}

impl From<FreeMarginMode> for u8 {
    fn from(mode: FreeMarginMode) -> Self {
        match mode {
            FreeMarginMode::NotUsePl => 1,
            FreeMarginMode::UsePl => 2,
            FreeMarginMode::ProfitOnly => 3,
            FreeMarginMode::LossOnly => 4,
            FreeMarginMode::Unknown(raw) => raw,
        }
    }
}

impl fmt::Display for FreeMarginMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FreeMarginMode::NotUsePl => "FreeMarginNotUsePL",
            FreeMarginMode::UsePl => "FreeMarginUsePL",
            FreeMarginMode::ProfitOnly => "FreeMarginProfit",
            FreeMarginMode::LossOnly => "FreeMarginLoss",
            FreeMarginMode::Unknown(_) => "Undefined",
        })
    }
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_digits() -> u8 {
    2
}

/// Account-level snapshot from the one-shot REST fetch.
///
/// `balance` and `margin` (used margin) are externally updated inputs; the
/// engine derives equity and free margin from them but never recomputes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    #[serde(default)]
    pub account_id: Option<Uuid>,
    pub balance: f64,
    /// Equity as reported by the snapshot; superseded by the first recompute.
    #[serde(default)]
    pub equity: f64,
    pub leverage: f64,
    /// Used margin.
    #[serde(default)]
    pub margin: f64,
    pub free_margin_mode: FreeMarginMode,
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Rounding digits of the account currency.
    #[serde(default = "default_digits")]
    pub digits: u8,
}
