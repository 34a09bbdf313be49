//! Position group: all open positions sharing one instrument

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use valuation_engine::Position;

use crate::aggregation::aggregate_positions;

/// All open positions on one instrument, with derived aggregates.
///
/// The aggregate fields always equal the roll-up of the current positions;
/// [`Group::recompute`] is the only way they change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub symbol_name: String,
    pub positions: Vec<Position>,
    /// Sum of positive position profits; `None` while the group is degraded.
    #[serde(default)]
    pub profit: Option<f64>,
    /// Sum of non-positive position profits (≤ 0); `None` while degraded.
    #[serde(default)]
    pub loss: Option<f64>,
    #[serde(default)]
    pub swap: f64,
    #[serde(default)]
    pub commission: f64,
    /// Set when any owned position has undefined profit.
    #[serde(default)]
    pub degraded: bool,
}

impl Group {
    pub fn new(symbol_name: &str) -> Self {
        Self {
            symbol_name: symbol_name.to_string(),
            positions: Vec::new(),
            profit: None,
            loss: None,
            swap: 0.0,
            commission: 0.0,
            degraded: false,
        }
    }

    /// Rebuild the derived aggregates from the owned positions, returning the
    /// group as the next-cycle snapshot value.
    pub fn recompute(mut self) -> Self {
        let aggregates = aggregate_positions(&self.positions);
        self.profit = aggregates.reported_profit();
        self.loss = aggregates.reported_loss();
        self.swap = aggregates.swap;
        self.commission = aggregates.commission;
        self.degraded = aggregates.degraded;
        self
    }

    /// Conversion symbols referenced by the owned positions.
    pub fn conversion_symbols(&self) -> impl Iterator<Item = &str> {
        self.positions.iter().filter_map(Position::conversion_symbol)
    }

    /// Whether a tick on any symbol in `changed` can move this group's
    /// valuation: its own instrument or any position's conversion symbol.
    pub fn is_affected_by(&self, changed: &HashSet<String>) -> bool {
        changed.contains(&self.symbol_name)
            || self.conversion_symbols().any(|symbol| changed.contains(symbol))
    }

    /// Total traded volume across the group (display roll-up).
    pub fn total_volume(&self) -> f64 {
        self.positions.iter().map(|position| position.volume).sum()
    }
}
