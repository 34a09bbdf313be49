//! The engine loop and its handles

use std::sync::Arc;

use async_trait::async_trait;
use equity_engine::{AccountSummary, Group};
use thiserror::Error;
use tick_store::Tick;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::info;

use crate::config::EngineSettings;
use crate::events::EngineEvent;
use crate::snapshot::ReadState;
use crate::state::EngineState;

/// Errors talking to the engine loop.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("engine loop has shut down")]
    Closed,
}

impl<T> From<mpsc::error::SendError<T>> for ServiceError {
    fn from(_: mpsc::error::SendError<T>) -> Self {
        ServiceError::Closed
    }
}

/// Subscription egress seam: the engine decides the symbol set, the caller
/// wires the calls to the actual tick transport. Both operations must be
/// idempotent and order-independent on the transport side.
#[async_trait]
pub trait SubscriptionTransport: Send + Sync {
    async fn subscribe(&self, symbols: &[String]);
    async fn unsubscribe(&self, symbols: &[String]);
}

/// Transport that only logs. Replay runs and tests have no live feed.
pub struct LogTransport;

#[async_trait]
impl SubscriptionTransport for LogTransport {
    async fn subscribe(&self, symbols: &[String]) {
        info!(?symbols, "subscribe");
    }

    async fn unsubscribe(&self, symbols: &[String]) {
        info!(?symbols, "unsubscribe");
    }
}

/// Cloneable handle feeding the engine mailbox and exposing the read surface.
#[derive(Clone)]
pub struct TerminalHandle {
    events: mpsc::Sender<EngineEvent>,
    reads: watch::Receiver<ReadState>,
}

impl TerminalHandle {
    pub async fn push_tick(&self, tick: Tick) -> Result<(), ServiceError> {
        Ok(self.events.send(EngineEvent::Tick(tick)).await?)
    }

    pub async fn push_ticks(&self, ticks: Vec<Tick>) -> Result<(), ServiceError> {
        Ok(self.events.send(EngineEvent::TickBatch(ticks)).await?)
    }

    pub async fn load_snapshot(
        &self,
        account: AccountSummary,
        groups: Vec<Group>,
    ) -> Result<(), ServiceError> {
        Ok(self.events.send(EngineEvent::SnapshotLoaded { account, groups }).await?)
    }

    pub async fn teardown(&self) -> Result<(), ServiceError> {
        Ok(self.events.send(EngineEvent::Teardown).await?)
    }

    /// The read surface as of the latest completed cycle.
    pub fn read_state(&self) -> ReadState {
        self.reads.borrow().clone()
    }

    /// A receiver that observes every published cycle.
    pub fn subscribe_reads(&self) -> watch::Receiver<ReadState> {
        self.reads.clone()
    }
}

/// The engine loop: sole owner of [`EngineState`].
pub struct TerminalService {
    events: mpsc::Receiver<EngineEvent>,
    reads: watch::Sender<ReadState>,
    transport: Arc<dyn SubscriptionTransport>,
    state: EngineState,
}

/// Start the engine loop. The loop stops when every handle is dropped.
pub fn spawn(
    settings: &EngineSettings,
    transport: Arc<dyn SubscriptionTransport>,
) -> (TerminalHandle, JoinHandle<()>) {
    let (event_tx, event_rx) = mpsc::channel(settings.event_queue_capacity);
    let (read_tx, read_rx) = watch::channel(ReadState::NotReady);

    let service = TerminalService {
        events: event_rx,
        reads: read_tx,
        transport,
        state: EngineState::new(),
    };
    let handle = TerminalHandle { events: event_tx, reads: read_rx };
    (handle, tokio::spawn(service.run()))
}

impl TerminalService {
    pub async fn run(mut self) {
        info!("terminal engine loop started");
        while let Some(event) = self.events.recv().await {
            match event {
                EngineEvent::Tick(tick) => self.on_ticks(vec![tick]),
                EngineEvent::TickBatch(ticks) => self.on_ticks(ticks),
                EngineEvent::SnapshotLoaded { account, groups } => {
                    self.on_snapshot(account, groups).await;
                }
                EngineEvent::Teardown => self.on_teardown().await,
            }
        }
        info!("terminal engine loop stopped");
    }

    fn on_ticks(&mut self, ticks: Vec<Tick>) {
        if self.state.on_ticks(ticks) {
            self.publish();
        }
    }

    async fn on_snapshot(&mut self, account: AccountSummary, groups: Vec<Group>) {
        let calls = self.state.on_snapshot(account, groups);
        if !calls.to_unsubscribe.is_empty() {
            self.transport.unsubscribe(&calls.to_unsubscribe).await;
        }
        if !calls.to_subscribe.is_empty() {
            self.transport.subscribe(&calls.to_subscribe).await;
        }
        self.publish();
    }

    async fn on_teardown(&mut self) {
        let released = self.state.on_teardown();
        if !released.is_empty() {
            self.transport.unsubscribe(&released).await;
        }
        self.publish();
    }

    fn publish(&self) {
        let state = match self.state.read_snapshot() {
            Some(snapshot) => ReadState::Ready(Arc::new(snapshot)),
            None => ReadState::NotReady,
        };
        self.reads.send_replace(state);
    }
}
