//! Latest-tick store and per-apply change classification

use std::collections::HashMap;

use tracing::trace;

use crate::Tick;

/// How one stored tick moved the observable state of its symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickUpdate {
    /// First tick ever stored for the symbol. Not part of the changed set —
    /// there is no prior value to diff against — but the symbol becomes
    /// available for valuation.
    Seeded,
    /// Bid, ask or last moved against the previously stored tick.
    Changed,
    /// Same observable prices as the previously stored tick.
    Unchanged,
}

impl TickUpdate {
    /// Symbols in this state must go through the valuation pass.
    pub fn is_valuation_relevant(self) -> bool {
        !matches!(self, TickUpdate::Unchanged)
    }

    /// Membership in the changed-symbol set reported to downstream diffing.
    pub fn is_changed(self) -> bool {
        matches!(self, TickUpdate::Changed)
    }
}

/// Holds at most one tick per symbol: the most recently delivered one.
#[derive(Debug, Default)]
pub struct TickStore {
    latest: HashMap<String, Tick>,
}

impl TickStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `tick` for its symbol, last-writer-wins, and classify the update.
    ///
    /// The prior tick is inspected before the slot is overwritten; the diff
    /// never runs against an already-replaced value.
    pub fn apply(&mut self, tick: Tick) -> TickUpdate {
        let update = match self.latest.get(&tick.symbol) {
            None => TickUpdate::Seeded,
            Some(prev) if prev.price_differs(&tick) => TickUpdate::Changed,
            Some(_) => TickUpdate::Unchanged,
        };
        trace!(symbol = %tick.symbol, ?update, "tick stored");
        self.latest.insert(tick.symbol.clone(), tick);
        update
    }

    /// The most recent tick for `symbol`, if one has been delivered.
    pub fn latest(&self, symbol: &str) -> Option<&Tick> {
        self.latest.get(symbol)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.latest.contains_key(symbol)
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.latest.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.latest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.latest.is_empty()
    }

    pub fn clear(&mut self) {
        self.latest.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tick(symbol: &str, timestamp: i64, bid: f64, ask: f64) -> Tick {
        Tick { symbol: symbol.to_string(), timestamp, bid, ask, last: 0.0, volume: 0.0 }
    }

    #[test]
    fn first_tick_is_seeded_not_changed() {
        let mut store = TickStore::new();
        let update = store.apply(tick("EURUSD", 1, 1.1000, 1.1002));
        assert_eq!(update, TickUpdate::Seeded);
        assert!(!update.is_changed());
        assert!(update.is_valuation_relevant());
        assert!(store.contains("EURUSD"));
    }

    #[test]
    fn later_tick_wins_and_reports_change() {
        let mut store = TickStore::new();
        store.apply(tick("EURUSD", 1, 1.1000, 1.1002));
        let update = store.apply(tick("EURUSD", 2, 1.1005, 1.1007));
        assert_eq!(update, TickUpdate::Changed);
        assert_eq!(store.latest("EURUSD").unwrap().bid, 1.1005);
    }

    #[test]
    fn identical_prices_are_unchanged() {
        let mut store = TickStore::new();
        store.apply(tick("EURUSD", 1, 1.1000, 1.1002));
        let update = store.apply(tick("EURUSD", 2, 1.1000, 1.1002));
        assert_eq!(update, TickUpdate::Unchanged);
        assert!(!update.is_valuation_relevant());
        // Last writer still wins even when nothing observable moved.
        assert_eq!(store.latest("EURUSD").unwrap().timestamp, 2);
    }

    #[test]
    fn change_detected_on_last_component_alone() {
        let mut store = TickStore::new();
        let mut first = tick("XAUUSD", 1, 2400.0, 2400.5);
        first.last = 2400.2;
        store.apply(first);
        let mut second = tick("XAUUSD", 2, 2400.0, 2400.5);
        second.last = 2400.3;
        assert_eq!(store.apply(second), TickUpdate::Changed);
    }

    #[test]
    fn symbols_are_independent() {
        let mut store = TickStore::new();
        store.apply(tick("EURUSD", 1, 1.1, 1.2));
        assert_eq!(store.apply(tick("GBPUSD", 1, 1.3, 1.4)), TickUpdate::Seeded);
        assert_eq!(store.len(), 2);
        assert!(store.latest("USDJPY").is_none());
    }

    #[test]
    fn clear_empties_the_store() {
        let mut store = TickStore::new();
        store.apply(tick("EURUSD", 1, 1.1, 1.2));
        store.clear();
        assert!(store.is_empty());
        // A re-delivered symbol seeds again after a clear.
        assert_eq!(store.apply(tick("EURUSD", 2, 1.1, 1.2)), TickUpdate::Seeded);
    }
}
