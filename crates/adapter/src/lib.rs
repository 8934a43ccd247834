//! Adapter module - remote control via TCP socket with JSON protocol
//!
//! Lets an external agent (a bot, a test harness, a second screen) play the
//! game through the same reveal entry point the keyboard and mouse use.
//!
//! # Protocol Overview
//!
//! The adapter implements a **line-delimited JSON protocol** over TCP:
//!
//! 1. **Connection**: Client connects to TCP socket (default: 127.0.0.1:7878)
//! 2. **Handshake**: Client sends `hello`, server responds with `welcome`
//! 3. **Controller Assignment**: First client to hello becomes the controller
//! 4. **Observation Streaming**: Server sends state observations after changes
//! 5. **Commanding**: Controller sends `reveal` / `restart` commands
//!
//! Reveals the rules reject (locked board, matched card, out-of-range index)
//! are still acknowledged; the next observation simply shows nothing changed.
//!
//! # Environment Variables
//!
//! - `MEMORY_AI_HOST`: Bind address (default: "127.0.0.1")
//! - `MEMORY_AI_PORT`: Port number (default: 7878)
//! - `MEMORY_AI_DISABLED`: Set to "1" or "true" to disable the adapter entirely
//! - `MEMORY_AI_MAX_PENDING`: Command queue bound (default: 10)
//! - `MEMORY_AI_LOG_PATH`: Append every wire message to this JSONL file
//!
//! # Example Protocol Flow
//!
//! ```text
//! Client -> Server: {"type":"hello","seq":1,"ts":0,"client":{"name":"bot","version":"0.1.0"},"protocol_version":"1.0.0"}
//! Server -> Client: {"type":"welcome","seq":1,"ts":0,"protocol_version":"1.0.0","client_id":1,"role":"controller","controller_id":1,"game_id":"memory-game"}
//! Server -> Client: {"type":"observation","seq":1,"ts":0,"playable":true,"won":false,...}
//! Client -> Server: {"type":"command","seq":2,"ts":0,"action":"reveal","index":5}
//! Server -> Client: {"type":"ack","seq":2,"ts":0,"status":"ok"}
//! ```
//!
//! # Testing
//!
//! ```bash
//! nc 127.0.0.1 7878
//! {"type":"hello","seq":1,"ts":0,"client":{"name":"nc","version":"0"},"protocol_version":"1.0.0"}
//! ```

pub mod protocol;
pub mod runtime;
pub mod server;

pub use memory_game_core as core;
pub use memory_game_types as types;

pub use protocol::*;
pub use runtime::{Adapter, ClientCommand, InboundCommand, InboundPayload, OutboundMessage, SharedStatus};
pub use server::{check_tcp_listen_available, run_server, run_server_with_status, ServerConfig, ServerState};
