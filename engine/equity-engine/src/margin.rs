//! Equity, free margin, margin level and per-position margin requirements

use thiserror::Error;
use valuation_engine::{CalculationMode, Position};

use crate::account::FreeMarginMode;
use crate::aggregation::Totals;

/// Errors that make a margin figure undefined.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarginError {
    #[error("unknown calculation mode: {0}")]
    UnknownCalculationMode(u8),

    #[error("position carries no calculation parameters")]
    MissingCalculation,

    #[error("leverage is zero")]
    ZeroLeverage,
}

/// Equity under the account's free-margin mode.
///
/// Swap and commission always count; the floating P&L term depends on the
/// mode. Totals from a degraded portfolio still feed in — they cover the
/// positions that could be valued.
pub fn equity(balance: f64, totals: &Totals, mode: FreeMarginMode) -> f64 {
    let base = balance + totals.swap + totals.commission;
    match mode {
        FreeMarginMode::NotUsePl => base,
        FreeMarginMode::ProfitOnly => base + totals.profit,
        FreeMarginMode::LossOnly => base + totals.loss,
        // UsePL, and any mode this build does not recognize.
        FreeMarginMode::UsePl | FreeMarginMode::Unknown(_) => {
            base + totals.profit + totals.loss
        }
    }
}

pub fn free_margin(equity: f64, used_margin: f64) -> f64 {
    equity - used_margin
}

/// Margin level in percent; explicitly undefined when no margin is in use,
/// never Infinity or NaN.
pub fn margin_level(equity: f64, used_margin: f64) -> Option<f64> {
    if used_margin == 0.0 {
        None
    } else {
        Some(equity / used_margin * 100.0)
    }
}

/// Margin requirement of a single position (display figure; the account's
/// used margin remains an externally supplied input).
///
/// Without fixed margin figures the requirement follows the calculation
/// mode; with them, the maintenance margin is preferred over the initial
/// one and leveraged modes divide by the account leverage.
pub fn position_margin(position: &Position, leverage: f64) -> Result<f64, MarginError> {
    let mode = position
        .pl_calculation
        .as_ref()
        .map(|calc| calc.calculation_mode)
        .ok_or(MarginError::MissingCalculation)?;

    let notional = position.volume * position.contract_size;
    let fixed = position.maintenance_margin.or(position.initial_margin);

    match fixed {
        None => match mode {
            CalculationMode::Forex => Ok(notional / nonzero(leverage)?),
            CalculationMode::Cfd => Ok(notional * position.open_price),
            CalculationMode::CfdLeverage => Ok(notional * position.open_price / nonzero(leverage)?),
            CalculationMode::ForexNoLeverage => Ok(notional),
            CalculationMode::Unknown(raw) => Err(MarginError::UnknownCalculationMode(raw)),
        },
        Some(fixed) => match mode {
            CalculationMode::Forex | CalculationMode::CfdLeverage => {
                Ok(position.volume * fixed / nonzero(leverage)?)
            }
            _ => Ok(position.volume * fixed),
        },
    }
}

fn nonzero(leverage: f64) -> Result<f64, MarginError> {
    if leverage == 0.0 {
        Err(MarginError::ZeroLeverage)
    } else {
        Ok(leverage)
    }
}
