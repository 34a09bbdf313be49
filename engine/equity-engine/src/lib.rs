//! Group and account aggregation
//!
//! Rolls position-level profit, swap and commission into per-group and
//! account-level totals, and derives equity, free margin and margin level
//! from the account summary. Aggregates are always recomputed from the owned
//! positions — never independently mutated — so a read snapshot can never
//! observe a partial update.

mod account;
mod aggregation;
mod group;
mod margin;

pub use account::{AccountSummary, FreeMarginMode};
pub use aggregation::{aggregate_positions, recompute_totals, GroupAggregates, Totals};
pub use group::Group;
pub use margin::{equity, free_margin, margin_level, position_margin, MarginError};

/// Re-export commonly used types
pub use valuation_engine::{CalculationMode, PlCalculation, Position, Side};
