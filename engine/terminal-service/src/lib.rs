//! Trading terminal engine service
//!
//! Hosts the valuation engine behind a single mailbox: snapshot loads, tick
//! batches and teardown are serialized through one queue into a task that is
//! the only owner of the engine state, so aggregation always observes the
//! tick-store state its valuation pass ran against. Reads go through a
//! `watch` channel publishing one immutable snapshot per completed cycle.

use anyhow::{Context, Result};

pub mod config;
pub mod events;
pub mod logging;
pub mod service;
pub mod snapshot;
pub mod state;

pub use config::{EngineSettings, LoggingConfig, ReplaySettings, ServiceConfig};
pub use events::EngineEvent;
pub use logging::initialize_logging;
pub use service::{
    spawn, LogTransport, ServiceError, SubscriptionTransport, TerminalHandle, TerminalService,
};
pub use snapshot::{
    parse_account, parse_groups, parse_snapshot_document, ReadState, SnapshotError,
    TerminalSnapshot,
};
pub use state::EngineState;

/// Load configuration from environment variables
pub fn load_configuration() -> Result<ServiceConfig> {
    config::load_config().context("Failed to load service configuration")
}
