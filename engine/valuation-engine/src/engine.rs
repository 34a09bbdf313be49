//! The valuation pass: one position against the current tick store

use tick_store::TickStore;

use crate::calculation::{CalculationMode, PlCalculation};
use crate::error::{Result, ValuationError};
use crate::math::normalize;
use crate::position::{Position, Side};

/// New derived values for one position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Valuation {
    /// Price the valuation closed against: bid for Buy, ask for Sell.
    pub closed_price: f64,
    /// Profit in account currency, rounded to the currency digits.
    pub profit: f64,
    /// Conversion rate applied; `None` when the position needs no conversion.
    pub exchange_rate: Option<f64>,
}

/// Outcome of revaluing one position.
#[derive(Debug, Clone, PartialEq)]
pub enum Revaluation {
    /// Fold these derived values into the next snapshot.
    Valued(Valuation),
    /// No tick for the position's symbol yet; the prior state stands.
    Skipped,
    /// The position carries no calculation parameters; profit is undefined.
    NoCalculation,
    /// The position cannot be valued; profit is undefined and the owning
    /// group degrades. Other positions are unaffected.
    Failed(ValuationError),
}

/// Revalue `position` against the latest ticks.
///
/// Pure with respect to its inputs: the caller applies the outcome to build
/// the next snapshot, so a half-finished pass is never observable.
pub fn revalue(position: &Position, ticks: &TickStore) -> Revaluation {
    let Some(calc) = position.pl_calculation.as_ref() else {
        return Revaluation::NoCalculation;
    };
    let Some(tick) = ticks.latest(&position.symbol_name) else {
        return Revaluation::Skipped;
    };

    let closed_price = match position.side {
        Side::Buy => tick.bid,
        Side::Sell => tick.ask,
    };

    match value(position, calc, closed_price, ticks) {
        Ok(valuation) => Revaluation::Valued(valuation),
        Err(error) => Revaluation::Failed(error),
    }
}

fn value(
    position: &Position,
    calc: &PlCalculation,
    closed_price: f64,
    ticks: &TickStore,
) -> Result<Valuation> {
    let mode = calc.calculation_mode;
    if let CalculationMode::Unknown(raw) = mode {
        return Err(ValuationError::UnknownCalculationMode(raw));
    }

    let base = base_profit(position, mode, closed_price)?;
    if !base.is_finite() {
        return Err(ValuationError::NonFiniteResult(position.position_id));
    }

    let Some(conversion_symbol) = calc.conversion_symbol.as_deref() else {
        // Profit currency is already the account currency; no rate applies.
        return Ok(Valuation { closed_price, profit: base, exchange_rate: None });
    };

    let rate = match ticks.latest(conversion_symbol) {
        Some(conversion_tick) => {
            let use_bid = if mode.is_forex() {
                if calc.is_forex_profit_by_market {
                    base > 0.0
                } else {
                    position.side == Side::Sell
                }
            } else {
                // CFD modes always convert by profitability.
                base > 0.0
            };
            let raw_rate = if use_bid { conversion_tick.bid } else { conversion_tick.ask };
            if calc.is_reversed {
                if raw_rate == 0.0 {
                    return Err(ValuationError::ZeroConversionRate(conversion_symbol.to_string()));
                }
                1.0 / raw_rate
            } else {
                raw_rate
            }
        }
        // No conversion tick in this batch: keep converting with the last
        // known rate rather than resetting it.
        None => calc.exchange_rate,
    };

    let profit = normalize(base * rate, position.digits_currency)?;
    if !profit.is_finite() {
        return Err(ValuationError::NonFiniteResult(position.position_id));
    }
    Ok(Valuation { closed_price, profit, exchange_rate: Some(rate) })
}

// Base profit in instrument currency, rounded to the instrument digits.
fn base_profit(position: &Position, mode: CalculationMode, closed_price: f64) -> Result<f64> {
    let notional = position.volume * position.contract_size;
    if mode.is_forex() {
        let close_leg = normalize(closed_price * notional, position.digits)?;
        let open_leg = normalize(position.open_price * notional, position.digits)?;
        Ok(match position.side {
            Side::Buy => close_leg - open_leg,
            Side::Sell => open_leg - close_leg,
        })
    } else {
        let delta = match position.side {
            Side::Buy => closed_price - position.open_price,
            Side::Sell => position.open_price - closed_price,
        };
        normalize(notional * delta, position.digits)
    }
}
