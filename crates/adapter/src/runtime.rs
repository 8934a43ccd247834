//! Adapter runtime integration.
//!
//! Bridges the synchronous game loop with the async TCP server: the server
//! runs on its own tokio runtime, commands come in over a bounded channel and
//! replies go out over an unbounded one.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrayvec::ArrayVec;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;

use crate::protocol::{AckMessage, ObservationMessage, MAX_BATCH};
use crate::server::{check_tcp_listen_available, run_server_with_status, ServerConfig, ServerState};
use crate::types::GameAction;

/// Command delivered to the game loop.
#[derive(Debug, Clone)]
pub struct InboundCommand {
    pub client_id: usize,
    pub seq: u64,
    pub payload: InboundPayload,
}

#[derive(Debug, Clone)]
pub enum InboundPayload {
    /// A controller command; the game loop acks it after applying it.
    Command(ClientCommand),
    /// A client just said hello and wants the current state.
    SnapshotRequest,
}

/// Command payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand {
    /// Reveal these indices in order.
    Reveal(ArrayVec<usize, MAX_BATCH>),
    Restart,
}

impl ClientCommand {
    /// The command as core actions, in application order.
    pub fn actions(&self) -> impl Iterator<Item = GameAction> + '_ {
        let reveals: &[usize] = match self {
            ClientCommand::Reveal(indices) => indices.as_slice(),
            ClientCommand::Restart => &[],
        };
        let restart = matches!(self, ClientCommand::Restart).then_some(GameAction::Restart);
        reveals
            .iter()
            .map(|&i| GameAction::Reveal(i))
            .chain(restart)
    }
}

/// Outbound message to be delivered by the server.
#[derive(Debug, Clone)]
pub enum OutboundMessage {
    ToClientObservation { client_id: usize, obs: ObservationMessage },
    BroadcastObservation { obs: ObservationMessage },
    ToClientAck { client_id: usize, ack: AckMessage },
}

/// Connection counts shared between the server task and the game loop.
#[derive(Debug, Default)]
pub struct SharedStatus {
    clients: AtomicUsize,
    /// Controller client id; 0 means none (ids start at 1).
    controller: AtomicUsize,
}

impl SharedStatus {
    pub fn client_count(&self) -> usize {
        self.clients.load(Ordering::Relaxed)
    }

    pub fn controller_id(&self) -> Option<usize> {
        match self.controller.load(Ordering::Relaxed) {
            0 => None,
            id => Some(id),
        }
    }

    pub(crate) fn set(&self, clients: usize, controller: Option<usize>) {
        self.clients.store(clients, Ordering::Relaxed);
        self.controller.store(controller.unwrap_or(0), Ordering::Relaxed);
    }
}

/// Running adapter instance.
pub struct Adapter {
    _rt: Runtime,
    cmd_rx: mpsc::Receiver<InboundCommand>,
    out_tx: mpsc::UnboundedSender<OutboundMessage>,
    status: Arc<SharedStatus>,
}

impl Adapter {
    /// Start the adapter from environment variables.
    ///
    /// Returns `Ok(None)` if `MEMORY_AI_DISABLED` is set, and an error if the
    /// configured port is already taken.
    pub fn start_from_env() -> Result<Option<Self>> {
        if ServerState::is_disabled() {
            return Ok(None);
        }
        let config = ServerConfig::from_env();
        check_tcp_listen_available(&config.host, config.port).with_context(|| {
            format!(
                "adapter port {}:{} unavailable (set MEMORY_AI_DISABLED=1 to skip)",
                config.host, config.port
            )
        })?;
        Self::start(config).map(Some)
    }

    pub fn start(config: ServerConfig) -> Result<Self> {
        let max_pending = config.max_pending_commands.max(1);
        let (cmd_tx, cmd_rx) = mpsc::channel::<InboundCommand>(max_pending);
        let (out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();
        let status = Arc::new(SharedStatus::default());

        let rt = Runtime::new().context("failed to create tokio runtime")?;
        let server_status = Arc::clone(&status);
        rt.spawn(async move {
            if let Err(e) =
                run_server_with_status(config, cmd_tx, out_rx, None, server_status).await
            {
                eprintln!("[Adapter] Server stopped: {}", e);
            }
        });

        Ok(Self {
            _rt: rt,
            cmd_rx,
            out_tx,
            status,
        })
    }

    pub fn try_recv(&mut self) -> Option<InboundCommand> {
        self.cmd_rx.try_recv().ok()
    }

    pub fn send(&self, msg: OutboundMessage) {
        let _ = self.out_tx.send(msg);
    }

    pub fn status(&self) -> &SharedStatus {
        &self.status
    }
}
