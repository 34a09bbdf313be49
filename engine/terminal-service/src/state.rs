//! Engine state: the single logical owner of ticks, groups and account

use std::collections::{BTreeSet, HashSet};

use equity_engine::{recompute_totals, AccountSummary, Group, Totals};
use subscription_manager::{diff, required_symbols, SubscriptionDiff};
use tick_store::{Tick, TickStore};
use tracing::{debug, warn};
use valuation_engine::{revalue, Revaluation};

use crate::snapshot::TerminalSnapshot;

/// The process-wide engine state. One instance lives inside the engine loop
/// task; nothing else mutates it.
#[derive(Debug, Default)]
pub struct EngineState {
    ticks: TickStore,
    account: Option<AccountSummary>,
    groups: Vec<Group>,
    totals: Totals,
    subscribed: BTreeSet<String>,
}

impl EngineState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a snapshot has been loaded. Before that, equity and friends
    /// have no defined answer and the read surface stays NotReady.
    pub fn is_ready(&self) -> bool {
        self.account.is_some()
    }

    /// Absorb one tick batch and recompute what it could have moved.
    ///
    /// Ticks arriving before the snapshot are buffered (latest per symbol)
    /// so the book values immediately once the snapshot lands. Returns true
    /// when the published state changed.
    pub fn on_ticks(&mut self, batch: Vec<Tick>) -> bool {
        let mut relevant = HashSet::new();
        for tick in batch {
            if tick.symbol.is_empty() {
                warn!("dropping tick without a symbol");
                continue;
            }
            let symbol = tick.symbol.clone();
            if self.ticks.apply(tick).is_valuation_relevant() {
                relevant.insert(symbol);
            }
        }

        if !self.is_ready() || relevant.is_empty() {
            return false;
        }

        let changed = self.revalue_affected(&relevant);
        if changed {
            self.totals = recompute_totals(&self.groups);
        }
        changed
    }

    /// Load or replace the snapshot. Returns the minimal subscription calls
    /// to bring the transport in line with the new symbol set.
    pub fn on_snapshot(&mut self, account: AccountSummary, groups: Vec<Group>) -> SubscriptionDiff {
        let required = required_symbols(&groups);
        let calls = diff(&self.subscribed, &required);
        debug!(
            symbols = required.len(),
            subscribe = calls.to_subscribe.len(),
            unsubscribe = calls.to_unsubscribe.len(),
            "snapshot loaded"
        );
        self.subscribed = required;
        self.account = Some(account);
        // Hold the invariant from the first cycle: aggregates derive from
        // the owned positions, whatever the fetch delivered.
        self.groups = groups.into_iter().map(Group::recompute).collect();

        // Value the book against any ticks buffered before the snapshot.
        let buffered: HashSet<String> = self.ticks.symbols().map(str::to_string).collect();
        if !buffered.is_empty() {
            self.revalue_affected(&buffered);
        }
        self.totals = recompute_totals(&self.groups);
        calls
    }

    /// Clear all state. Returns the symbols to release — exactly once; a
    /// second teardown has nothing left to release.
    pub fn on_teardown(&mut self) -> Vec<String> {
        let released: Vec<String> = std::mem::take(&mut self.subscribed).into_iter().collect();
        self.account = None;
        self.groups.clear();
        self.totals = Totals::default();
        self.ticks.clear();
        released
    }

    // Revalue every position in every group touched by `relevant` (its own
    // instrument or a conversion symbol) and rebuild those groups'
    // aggregates. Untouched groups keep their prior valuation.
    fn revalue_affected(&mut self, relevant: &HashSet<String>) -> bool {
        let ticks = &self.ticks;
        let mut any = false;
        let groups = std::mem::take(&mut self.groups);
        self.groups = groups
            .into_iter()
            .map(|mut group| {
                if !group.is_affected_by(relevant) {
                    return group;
                }
                any = true;
                for position in &mut group.positions {
                    match revalue(position, ticks) {
                        Revaluation::Valued(valuation) => {
                            position.closed_price = Some(valuation.closed_price);
                            position.profit = Some(valuation.profit);
                            if let (Some(calc), Some(rate)) =
                                (position.pl_calculation.as_mut(), valuation.exchange_rate)
                            {
                                calc.exchange_rate = rate;
                            }
                        }
                        Revaluation::Skipped => {}
                        Revaluation::NoCalculation => position.profit = None,
                        Revaluation::Failed(error) => {
                            warn!(
                                position_id = position.position_id,
                                symbol = %position.symbol_name,
                                %error,
                                "position cannot be valued"
                            );
                            position.profit = None;
                        }
                    }
                }
                group.recompute()
            })
            .collect();
        any
    }

    /// Immutable read snapshot of the current cycle; `None` until a snapshot
    /// has been loaded.
    pub fn read_snapshot(&self) -> Option<TerminalSnapshot> {
        let account = self.account.as_ref()?;
        Some(TerminalSnapshot::assemble(account.clone(), self.groups.clone(), self.totals))
    }
}
