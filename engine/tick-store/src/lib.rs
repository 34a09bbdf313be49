//! Latest-tick cache with changed-symbol detection
//!
//! The live feed delivers ticks at-least-once, possibly duplicated and out of
//! order. This crate keeps exactly one tick per symbol (most recent delivery
//! wins) and classifies every store as seeded, changed or unchanged so the
//! valuation layer only recomputes what a tick could have moved.

mod store;
mod tick;

pub use store::{TickStore, TickUpdate};
pub use tick::Tick;
