//! Per-position profit valuation
//!
//! Recomputes the floating profit of open positions from the latest ticks:
//! four instrument calculation modes, price rounding to instrument digits,
//! bid/ask selection by trade direction, and cross-currency conversion with
//! rate reversal. Valuation is a pure pass over the position and the tick
//! store; callers fold the returned outcome into the next snapshot.

mod calculation;
mod engine;
mod error;
mod math;
mod position;

pub use calculation::{CalculationMode, PlCalculation};
pub use engine::{revalue, Revaluation, Valuation};
pub use error::{Result, ValuationError};
pub use math::normalize;
pub use position::{Position, Side};
