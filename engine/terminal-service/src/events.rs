//! Event types for the engine loop

use equity_engine::{AccountSummary, Group};
use tick_store::Tick;

/// Inputs serialized through the engine mailbox.
///
/// Every mutation of the engine state arrives as one of these; the loop
/// processes one event to completion before looking at the next, so no
/// reader ever observes a cycle in progress.
#[derive(Debug)]
pub enum EngineEvent {
    /// One tick from the live feed
    Tick(Tick),
    /// Ticks delivered together; diffed and recomputed as one cycle
    TickBatch(Vec<Tick>),
    /// Snapshot load or replace from the one-shot REST fetch
    SnapshotLoaded { account: AccountSummary, groups: Vec<Group> },
    /// Release all subscriptions and clear the engine state
    Teardown,
}
