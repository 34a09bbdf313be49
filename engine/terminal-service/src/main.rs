//! Trading Terminal Replay Service
//!
//! Entry point for driving the valuation engine without a live feed: loads a
//! position snapshot from disk, replays a JSON-lines tick file through the
//! engine mailbox the way the tick transport would push it, and logs the
//! resulting equity. The live transport and REST fetch plug into the same
//! handle in production.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

use terminal_service::{
    initialize_logging, load_configuration, parse_snapshot_document, spawn, LogTransport,
    ReadState,
};
use tick_store::Tick;

#[tokio::main]
async fn main() -> Result<()> {
    // Configuration comes from the environment; logging first so the rest
    // of startup is visible.
    let config = load_configuration()?;
    initialize_logging(&config.logging)?;

    info!("Starting Trading Terminal replay v{}", env!("CARGO_PKG_VERSION"));

    let snapshot_text = std::fs::read_to_string(&config.replay.snapshot_file)
        .with_context(|| format!("Failed to read snapshot file {:?}", config.replay.snapshot_file))?;
    let (account, groups) =
        parse_snapshot_document(&snapshot_text).context("Failed to decode snapshot document")?;
    info!(groups = groups.len(), "snapshot decoded");

    let (handle, engine) = spawn(&config.engine, Arc::new(LogTransport));
    let reads = handle.subscribe_reads();

    handle
        .load_snapshot(account, groups)
        .await
        .context("Engine loop rejected the snapshot")?;

    let ticks_text = std::fs::read_to_string(&config.replay.ticks_file)
        .with_context(|| format!("Failed to read ticks file {:?}", config.replay.ticks_file))?;

    let mut replayed = 0usize;
    for line in ticks_text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let tick: Tick =
            serde_json::from_str(line).with_context(|| format!("Malformed tick line: {line}"))?;
        handle.push_tick(tick).await.context("Engine loop rejected a tick")?;
        replayed += 1;
    }
    info!(replayed, "tick replay complete");

    // Dropping the last handle drains the mailbox and stops the loop.
    drop(handle);
    engine.await.context("Engine loop panicked")?;

    match reads.borrow().clone() {
        ReadState::Ready(snapshot) => info!(
            equity = snapshot.equity,
            free_margin = snapshot.free_margin,
            total_profit = snapshot.totals.profit,
            total_loss = snapshot.totals.loss,
            degraded = snapshot.totals.degraded,
            "replay result"
        ),
        ReadState::NotReady => warn!("engine never reached a ready state"),
    }

    Ok(())
}
