//! Symbol subscription management
//!
//! Derives the symbol set the tick transport must deliver for the current
//! snapshot — every group's instrument plus every position's conversion
//! symbol — and diffs it against the previously subscribed set so the caller
//! issues minimal subscribe/unsubscribe calls. Recomputed on snapshot
//! load/replace, not per tick.

use std::collections::BTreeSet;

use equity_engine::Group;

/// Symbols required to value the given snapshot: the deduplicated union of
/// group instruments and position conversion symbols.
pub fn required_symbols(groups: &[Group]) -> BTreeSet<String> {
    let mut symbols = BTreeSet::new();
    for group in groups {
        symbols.insert(group.symbol_name.clone());
        for conversion in group.conversion_symbols() {
            symbols.insert(conversion.to_string());
        }
    }
    symbols
}

/// Minimal transport calls to move from one subscribed set to another.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubscriptionDiff {
    pub to_subscribe: Vec<String>,
    pub to_unsubscribe: Vec<String>,
}

impl SubscriptionDiff {
    pub fn is_empty(&self) -> bool {
        self.to_subscribe.is_empty() && self.to_unsubscribe.is_empty()
    }
}

/// Diff `next` against `previous`; both directions are deduplicated and
/// order-independent.
pub fn diff(previous: &BTreeSet<String>, next: &BTreeSet<String>) -> SubscriptionDiff {
    SubscriptionDiff {
        to_subscribe: next.difference(previous).cloned().collect(),
        to_unsubscribe: previous.difference(next).cloned().collect(),
    }
}
