//! TCP server for the remote adapter
//!
//! Handles incoming connections and manages client lifecycle.
//! Uses tokio for async networking.

use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;

use anyhow::Context;
use arrayvec::ArrayVec;
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, RwLock};

use crate::protocol::*;
use crate::runtime::{ClientCommand, InboundCommand, InboundPayload, OutboundMessage, SharedStatus};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub protocol_version: String,
    pub max_pending_commands: usize,
    pub log_path: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7878,
            protocol_version: PROTOCOL_VERSION.to_string(),
            max_pending_commands: 10,
            log_path: None,
        }
    }
}

impl ServerConfig {
    /// Create from `MEMORY_AI_*` environment variables.
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();

        let host = env::var("MEMORY_AI_HOST").unwrap_or(defaults.host);
        let port = env::var("MEMORY_AI_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);

        let max_pending_commands = env::var("MEMORY_AI_MAX_PENDING")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_pending_commands);

        let log_path = env::var("MEMORY_AI_LOG_PATH")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Self {
            host,
            port,
            protocol_version: defaults.protocol_version,
            max_pending_commands,
            log_path,
        }
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        (self.host.as_str(), self.port)
            .to_socket_addrs()
            .with_context(|| format!("invalid adapter address {}:{}", self.host, self.port))?
            .next()
            .with_context(|| format!("no address for {}:{}", self.host, self.port))
    }
}

/// Check that `host:port` can be bound right now.
///
/// Lets the binary fail fast before entering the alternate screen.
pub fn check_tcp_listen_available(host: &str, port: u16) -> std::io::Result<()> {
    std::net::TcpListener::bind((host, port)).map(drop)
}

/// Shared server state
pub struct ServerState {
    config: ServerConfig,
    clients: RwLock<Vec<ClientHandle>>,
    controller: RwLock<Option<usize>>,
    status: Arc<SharedStatus>,
}

impl ServerState {
    pub fn new(config: ServerConfig, status: Arc<SharedStatus>) -> Self {
        Self {
            config,
            clients: RwLock::new(Vec::new()),
            controller: RwLock::new(None),
            status,
        }
    }

    /// Check if the adapter is disabled via environment
    pub fn is_disabled() -> bool {
        std::env::var("MEMORY_AI_DISABLED")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    async fn publish_status(&self) {
        let clients = self.clients.read().await.len();
        let controller = *self.controller.read().await;
        self.status.set(clients, controller);
    }
}

/// Handle to a connected client
pub struct ClientHandle {
    pub id: usize,
    pub addr: SocketAddr,
    pub stream_observations: bool,
    pub handshaken: bool,
    pub last_seq: Option<u64>,
    pub tx: mpsc::UnboundedSender<ClientOutbound>,
}

#[derive(Debug, Clone)]
pub enum ClientOutbound {
    Welcome(WelcomeMessage),
    Ack(AckMessage),
    Error(ErrorMessage),
    Observation(ObservationMessage),
}

/// One line of the JSONL wire log.
#[derive(Debug, Clone)]
enum WireRecord {
    Bytes(Vec<u8>),
    Outbound(ClientOutbound),
}

async fn is_handshaken(state: &ServerState, client_id: usize) -> bool {
    let clients = state.clients.read().await;
    clients
        .iter()
        .find(|c| c.id == client_id)
        .is_some_and(|c| c.handshaken)
}

/// Record `seq` for `client_id`; false if it does not strictly increase.
async fn check_and_update_seq(state: &ServerState, client_id: usize, seq: u64) -> bool {
    let mut clients = state.clients.write().await;
    let Some(client) = clients.iter_mut().find(|c| c.id == client_id) else {
        return true;
    };

    match client.last_seq {
        Some(prev) if seq <= prev => false,
        _ => {
            client.last_seq = Some(seq);
            true
        }
    }
}

/// Start the TCP server
pub async fn run_server(
    config: ServerConfig,
    command_tx: mpsc::Sender<InboundCommand>,
    out_rx: mpsc::UnboundedReceiver<OutboundMessage>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    run_server_with_status(
        config,
        command_tx,
        out_rx,
        ready_tx,
        Arc::new(SharedStatus::default()),
    )
    .await
}

/// Start the TCP server, publishing connection counts to `status`.
pub async fn run_server_with_status(
    config: ServerConfig,
    command_tx: mpsc::Sender<InboundCommand>,
    mut out_rx: mpsc::UnboundedReceiver<OutboundMessage>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
    status: Arc<SharedStatus>,
) -> anyhow::Result<()> {
    let wire_log_tx = config.log_path.clone().map(spawn_wire_log);

    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(&addr).await?;
    let bound = listener.local_addr()?;
    println!("[Adapter] TCP server listening on {}", bound);
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let state = Arc::new(ServerState::new(config, status));
    let mut client_id_counter = 0usize;

    // Outbound dispatcher.
    {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                let clients = state.clients.read().await;
                let to_client = |id: usize, out: ClientOutbound| {
                    if let Some(c) = clients.iter().find(|c| c.id == id) {
                        let _ = c.tx.send(out);
                    }
                };
                let broadcast = |out: ClientOutbound| {
                    for c in clients.iter().filter(|c| c.handshaken && c.stream_observations) {
                        let _ = c.tx.send(out.clone());
                    }
                };
                match msg {
                    OutboundMessage::ToClientObservation { client_id, obs } => {
                        to_client(client_id, ClientOutbound::Observation(obs))
                    }
                    OutboundMessage::BroadcastObservation { obs } => {
                        broadcast(ClientOutbound::Observation(obs))
                    }
                    OutboundMessage::ToClientAck { client_id, ack } => {
                        to_client(client_id, ClientOutbound::Ack(ack))
                    }
                }
            }
        });
    }

    // Accept incoming connections
    loop {
        let (socket, addr) = listener.accept().await?;
        client_id_counter += 1;
        let client_id = client_id_counter;

        println!("[Adapter] Client {} connected from {}", client_id, addr);

        let state = Arc::clone(&state);
        let command_tx = command_tx.clone();
        let wire_log_tx = wire_log_tx.clone();

        tokio::spawn(async move {
            if let Err(e) =
                handle_client(socket, addr, client_id, &state, command_tx, wire_log_tx).await
            {
                eprintln!("[Adapter] Client {} error: {}", client_id, e);
            }
            remove_client(&state, client_id).await;
            println!("[Adapter] Client {} disconnected", client_id);
        });
    }
}

/// Spawn the JSONL writer task for `path`.
fn spawn_wire_log(path: String) -> mpsc::UnboundedSender<WireRecord> {
    let (tx, mut rx) = mpsc::unbounded_channel::<WireRecord>();
    tokio::spawn(async move {
        use tokio::fs::OpenOptions;

        let mut file = match OpenOptions::new().create(true).append(true).open(&path).await {
            Ok(f) => f,
            Err(e) => {
                eprintln!("[Adapter] Cannot open wire log {}: {}", path, e);
                return;
            }
        };

        let mut buf: Vec<u8> = Vec::with_capacity(4096);
        while let Some(rec) = rx.recv().await {
            buf.clear();
            match rec {
                WireRecord::Bytes(b) => buf.extend_from_slice(&b),
                WireRecord::Outbound(out) => {
                    if encode_outbound(&out, &mut buf).is_err() {
                        continue;
                    }
                }
            }
            buf.push(b'\n');
            if file.write_all(&buf).await.is_err() {
                break;
            }
        }

        let _ = file.flush().await;
    });
    tx
}

fn encode_outbound(out: &ClientOutbound, buf: &mut Vec<u8>) -> serde_json::Result<()> {
    fn json<T: Serialize>(v: &T, buf: &mut Vec<u8>) -> serde_json::Result<()> {
        serde_json::to_writer(buf, v)
    }
    match out {
        ClientOutbound::Welcome(v) => json(v, buf),
        ClientOutbound::Ack(v) => json(v, buf),
        ClientOutbound::Error(v) => json(v, buf),
        ClientOutbound::Observation(v) => json(v, buf),
    }
}

async fn write_line<W: AsyncWrite + Unpin>(writer: &mut W, buf: &[u8]) -> std::io::Result<()> {
    writer.write_all(buf).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await
}

/// Handle a single client connection
async fn handle_client(
    socket: TcpStream,
    addr: SocketAddr,
    client_id: usize,
    state: &ServerState,
    command_tx: mpsc::Sender<InboundCommand>,
    wire_log_tx: Option<mpsc::UnboundedSender<WireRecord>>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = tokio::io::split(socket);
    let mut reader = BufReader::new(reader);

    let (tx, mut rx) = mpsc::unbounded_channel::<ClientOutbound>();

    state.clients.write().await.push(ClientHandle {
        id: client_id,
        addr,
        stream_observations: false,
        handshaken: false,
        last_seq: None,
        tx: tx.clone(),
    });
    state.publish_status().await;

    let wire_log_tx_out = wire_log_tx.clone();
    let write_task = tokio::spawn(async move {
        let mut buf: Vec<u8> = Vec::with_capacity(4096);
        while let Some(msg) = rx.recv().await {
            buf.clear();
            if encode_outbound(&msg, &mut buf).is_err() {
                continue;
            }
            if write_line(&mut writer, &buf).await.is_err() {
                break;
            }
            if let Some(log) = wire_log_tx_out.as_ref() {
                let _ = log.send(WireRecord::Outbound(msg));
            }
        }
    });

    let send_error = |seq: u64, code: ErrorCode, message: &str| {
        let _ = tx.send(ClientOutbound::Error(create_error(seq, code, message)));
    };

    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            break;
        }

        let raw_line = line.trim_end_matches(['\n', '\r']);
        let trimmed = raw_line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if let Some(log) = wire_log_tx.as_ref() {
            let _ = log.send(WireRecord::Bytes(raw_line.as_bytes().to_vec()));
        }

        match parse_message(trimmed) {
            Ok(ParsedMessage::Hello(hello)) => {
                if is_handshaken(state, client_id).await
                    && !check_and_update_seq(state, client_id, hello.seq).await
                {
                    send_error(hello.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                    continue;
                }

                if major(&hello.protocol_version) != major(&state.config.protocol_version) {
                    send_error(
                        hello.seq,
                        ErrorCode::ProtocolMismatch,
                        &format!("Protocol version {} not supported", hello.protocol_version),
                    );
                    break;
                }

                // First client to hello becomes controller.
                let (role, controller_id) = {
                    let mut controller = state.controller.write().await;
                    let mut clients = state.clients.write().await;
                    if let Some(client) = clients.iter_mut().find(|c| c.id == client_id) {
                        client.handshaken = true;
                        client.last_seq = Some(hello.seq);
                        client.stream_observations = hello.requested.stream_observations;
                    }
                    if controller.is_none() {
                        *controller = Some(client_id);
                        println!("[Adapter] Client {} is now controller", client_id);
                    }
                    let role = if *controller == Some(client_id) {
                        AssignedRole::Controller
                    } else {
                        AssignedRole::Observer
                    };
                    (role, controller.map(|id| id as u64))
                };
                state.publish_status().await;

                let welcome = create_welcome(
                    hello.seq,
                    &state.config.protocol_version,
                    client_id as u64,
                    role,
                    controller_id,
                );
                let _ = tx.send(ClientOutbound::Welcome(welcome));

                if hello.requested.stream_observations {
                    let _ = command_tx.try_send(InboundCommand {
                        client_id,
                        seq: hello.seq,
                        payload: InboundPayload::SnapshotRequest,
                    });
                }
            }

            Ok(ParsedMessage::Command(cmd)) => {
                if !is_handshaken(state, client_id).await {
                    send_error(cmd.seq, ErrorCode::HandshakeRequired, "Send hello before command");
                    continue;
                }

                if !check_and_update_seq(state, client_id, cmd.seq).await {
                    send_error(cmd.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                    continue;
                }

                if *state.controller.read().await != Some(client_id) {
                    send_error(cmd.seq, ErrorCode::NotController, "Only controller may send commands");
                    continue;
                }

                let mapped = match map_command(&cmd) {
                    Ok(c) => c,
                    Err(message) => {
                        send_error(cmd.seq, ErrorCode::InvalidCommand, &message);
                        continue;
                    }
                };

                // The game loop acks once the command has been applied.
                let inbound = InboundCommand {
                    client_id,
                    seq: cmd.seq,
                    payload: InboundPayload::Command(mapped),
                };
                if command_tx.try_send(inbound).is_err() {
                    send_error(cmd.seq, ErrorCode::Backpressure, "Command queue is full");
                }
            }

            Ok(ParsedMessage::Unknown(msg)) => {
                if is_handshaken(state, client_id).await
                    && !check_and_update_seq(state, client_id, msg.seq).await
                {
                    send_error(msg.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                    continue;
                }
                send_error(msg.seq, ErrorCode::InvalidCommand, "Unknown message type");
            }

            Err(e) => {
                let seq = extract_seq_best_effort(trimmed).unwrap_or(0);
                send_error(seq, ErrorCode::InvalidCommand, &format!("JSON parse error: {}", e));
            }
        }
    }

    drop(send_error);
    drop(tx);
    remove_client(state, client_id).await;
    let _ = write_task.await;

    Ok(())
}

/// Drop the client and promote the lowest remaining id if it was controller.
async fn remove_client(state: &ServerState, client_id: usize) {
    {
        let mut controller = state.controller.write().await;
        let mut clients = state.clients.write().await;
        let before = clients.len();
        clients.retain(|c| c.id != client_id);
        if clients.len() == before {
            return;
        }

        if *controller == Some(client_id) {
            let next_id = clients.iter().filter(|c| c.handshaken).map(|c| c.id).min();
            *controller = next_id;
            match next_id {
                Some(new_id) => println!("[Adapter] Controller {} promoted", new_id),
                None => println!("[Adapter] Controller {} released", client_id),
            }
        }
    }
    state.publish_status().await;
}

/// Map a protocol command into a game-loop command.
fn map_command(cmd: &CommandMessage) -> Result<ClientCommand, String> {
    match cmd.action {
        CommandAction::Restart => Ok(ClientCommand::Restart),
        CommandAction::Reveal => match (cmd.index, cmd.indices.as_ref()) {
            (Some(_), Some(_)) => Err("Send either index or indices, not both".to_string()),
            (Some(index), None) => {
                let mut one = ArrayVec::new();
                one.push(index);
                Ok(ClientCommand::Reveal(one))
            }
            (None, Some(list)) if !list.0.is_empty() => Ok(ClientCommand::Reveal(list.0.clone())),
            (None, Some(_)) => Err("Empty indices".to_string()),
            (None, None) => Err("Missing index".to_string()),
        },
    }
}

fn major(version: &str) -> &str {
    version.split('.').next().unwrap_or(version)
}

fn extract_seq_best_effort(s: &str) -> Option<u64> {
    let start = s.find("\"seq\"")?;
    let after_key = &s[start + 5..];
    let colon = after_key.find(':')?;
    let rest = after_key[colon + 1..].trim_start();
    let end = rest.bytes().take_while(u8::is_ascii_digit).count();
    if end == 0 {
        return None;
    }
    rest[..end].parse::<u64>().ok()
}
