//! Tick type shared across the engine

use serde::{Deserialize, Serialize};

/// A single quote for one instrument symbol, as pushed by the live feed.
///
/// `last` and `volume` are absent on pure quote updates; the wire default is 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    /// Instrument symbol, e.g. `"EURUSD"`.
    pub symbol: String,
    /// Feed timestamp, seconds since the Unix epoch.
    pub timestamp: i64,
    pub bid: f64,
    pub ask: f64,
    #[serde(default)]
    pub last: f64,
    #[serde(default)]
    pub volume: f64,
}

impl Tick {
    /// True when any price component observable by valuation (bid, ask, last)
    /// differs from `other`. Exact numeric equality, not tolerance-based.
    pub fn price_differs(&self, other: &Tick) -> bool {
        self.bid != other.bid || self.ask != other.ask || self.last != other.last
    }
}
