//! Profit/loss aggregation over positions and groups

use serde::Serialize;
use valuation_engine::Position;

use crate::group::Group;

/// Derived aggregates for one group of positions.
///
/// `profit` and `loss` partition the valued positions: profit sums the
/// strictly positive profits, loss the non-positive ones (so `loss` is
/// always ≤ 0, never negated). A position with undefined profit contributes
/// zero to the partition and sets `degraded`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupAggregates {
    pub profit: f64,
    pub loss: f64,
    pub swap: f64,
    pub commission: f64,
    /// At least one owned position could not be valued; the reported
    /// profit/loss are undefined rather than silently understated.
    pub degraded: bool,
}

impl GroupAggregates {
    /// Reported profit: undefined while the group is degraded.
    pub fn reported_profit(&self) -> Option<f64> {
        (!self.degraded).then_some(self.profit)
    }

    /// Reported loss: undefined while the group is degraded.
    pub fn reported_loss(&self) -> Option<f64> {
        (!self.degraded).then_some(self.loss)
    }
}

/// Recompute the profit/loss partition from the owned positions.
pub fn aggregate_positions(positions: &[Position]) -> GroupAggregates {
    let mut aggregates = GroupAggregates::default();
    for position in positions {
        aggregates.swap += position.swap;
        aggregates.commission += position.commission;
        match position.profit {
            Some(profit) if profit > 0.0 => aggregates.profit += profit,
            Some(profit) => aggregates.loss += profit,
            None => aggregates.degraded = true,
        }
    }
    aggregates
}

/// Account-level roll-up across every group.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub profit: f64,
    pub loss: f64,
    pub swap: f64,
    pub commission: f64,
    /// Set when any group is degraded. The numeric fields then cover only
    /// the positions that could be valued.
    pub degraded: bool,
}

/// Recompute the account totals from every group's positions.
///
/// Sums run over the source positions, not the groups' reported aggregates,
/// so the risk carried by valued positions never disappears behind one
/// unvaluable sibling in the same group.
pub fn recompute_totals(groups: &[Group]) -> Totals {
    let mut totals = Totals::default();
    for group in groups {
        let aggregates = aggregate_positions(&group.positions);
        totals.profit += aggregates.profit;
        totals.loss += aggregates.loss;
        totals.swap += aggregates.swap;
        totals.commission += aggregates.commission;
        totals.degraded |= aggregates.degraded;
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use valuation_engine::{Position, Side};

    fn position(profit: Option<f64>) -> Position {
        Position {
            position_id: 1,
            symbol_name: "EURUSD".to_string(),
            side: Side::Buy,
            volume: 1.0,
            contract_size: 100_000.0,
            open_price: 1.1,
            closed_price: None,
            digits: 5,
            digits_currency: 2,
            swap: 0.0,
            commission: 0.0,
            profit,
            pl_calculation: None,
            action_time: None,
            initial_margin: None,
            maintenance_margin: None,
        }
    }

    #[test]
    fn partitions_profit_and_loss() {
        let positions: Vec<Position> =
            [50.0, -20.0, 30.0, -5.0].into_iter().map(|p| position(Some(p))).collect();
        let aggregates = aggregate_positions(&positions);
        assert_eq!(aggregates.profit, 80.0);
        assert_eq!(aggregates.loss, -25.0);
        assert!(!aggregates.degraded);
        assert_eq!(aggregates.reported_profit(), Some(80.0));
    }

    #[test]
    fn zero_profit_counts_as_loss_side() {
        let aggregates = aggregate_positions(&[position(Some(0.0))]);
        assert_eq!(aggregates.profit, 0.0);
        assert_eq!(aggregates.loss, 0.0);
        assert!(!aggregates.degraded);
    }

    #[test]
    fn undefined_profit_degrades_and_contributes_zero() {
        let positions = vec![position(Some(40.0)), position(None)];
        let aggregates = aggregate_positions(&positions);
        assert!(aggregates.degraded);
        assert_eq!(aggregates.profit, 40.0);
        assert_eq!(aggregates.reported_profit(), None);
        assert_eq!(aggregates.reported_loss(), None);
    }

    #[test]
    fn swap_and_commission_sum_over_all_positions() {
        let mut a = position(Some(10.0));
        a.swap = -1.5;
        a.commission = -0.5;
        let mut b = position(None);
        b.swap = -2.5;
        b.commission = -1.0;
        let aggregates = aggregate_positions(&[a, b]);
        assert_eq!(aggregates.swap, -4.0);
        assert_eq!(aggregates.commission, -1.5);
    }

    #[test]
    fn totals_roll_up_across_groups() {
        let mut eur = Group::new("EURUSD");
        eur.positions = vec![position(Some(50.0)), position(Some(-20.0))];
        let mut gbp = Group::new("GBPUSD");
        gbp.positions = vec![position(Some(-5.0)), position(None)];

        let totals = recompute_totals(&[eur.recompute(), gbp.recompute()]);
        assert_eq!(totals.profit, 50.0);
        assert_eq!(totals.loss, -25.0);
        assert!(totals.degraded);
    }
}
