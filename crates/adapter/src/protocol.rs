//! Protocol module - JSON message types for the remote adapter
//!
//! Line-delimited JSON. Every message carries `type`, `seq` (per-sender
//! sequence number) and `ts` (milliseconds since the Unix epoch).

use serde::{Deserialize, Serialize};

use crate::core::GameSnapshot;
use crate::types::{CardState, GameEvent};

use arrayvec::ArrayVec;

/// Protocol version spoken by this server. Clients must share the major.
pub const PROTOCOL_VERSION: &str = "1.0.0";

/// Most reveals accepted in a single command.
pub const MAX_BATCH: usize = 32;

// ============== Client -> Game Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum HelloType {
    #[serde(rename = "hello")]
    #[default]
    Hello,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CommandType {
    #[serde(rename = "command")]
    #[default]
    Command,
}

/// Client hello message (first message on a connection)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloMessage {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: HelloType,
    pub seq: u64,
    pub ts: u64,
    pub client: ClientInfo,
    pub protocol_version: String,
    #[serde(default)]
    pub requested: RequestedCapabilities,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestedCapabilities {
    #[serde(default = "default_true")]
    pub stream_observations: bool,
}

impl Default for RequestedCapabilities {
    fn default() -> Self {
        Self {
            stream_observations: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Command message (controller only)
///
/// ```text
/// {"type":"command","seq":2,"ts":0,"action":"reveal","index":5}
/// {"type":"command","seq":3,"ts":0,"action":"reveal","indices":[0,9]}
/// {"type":"command","seq":4,"ts":0,"action":"restart"}
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandMessage {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: CommandType,
    pub seq: u64,
    pub ts: u64,
    pub action: CommandAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indices: Option<IndexList>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandAction {
    Reveal,
    Restart,
}

impl<'de> Deserialize<'de> for CommandAction {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = <&str>::deserialize(deserializer)?;
        if s.eq_ignore_ascii_case("reveal") {
            Ok(Self::Reveal)
        } else if s.eq_ignore_ascii_case("restart") {
            Ok(Self::Restart)
        } else {
            Err(serde::de::Error::custom("unknown action"))
        }
    }
}

impl Serialize for CommandAction {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            CommandAction::Reveal => serializer.serialize_str("reveal"),
            CommandAction::Restart => serializer.serialize_str("restart"),
        }
    }
}

/// Board indices of a batched reveal, capped at [`MAX_BATCH`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IndexList(pub ArrayVec<usize, MAX_BATCH>);

impl<'de> Deserialize<'de> for IndexList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct V;
        impl<'de> serde::de::Visitor<'de> for V {
            type Value = IndexList;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "an array of board indices")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: serde::de::SeqAccess<'de>,
            {
                let mut out = ArrayVec::<usize, MAX_BATCH>::new();
                while let Some(i) = seq.next_element::<usize>()? {
                    out.try_push(i)
                        .map_err(|_| serde::de::Error::custom("too many indices"))?;
                }
                Ok(IndexList(out))
            }
        }

        deserializer.deserialize_seq(V)
    }
}

impl Serialize for IndexList {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_seq(self.0.iter())
    }
}

// ============== Game -> Client Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WelcomeType {
    #[serde(rename = "welcome")]
    Welcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckType {
    #[serde(rename = "ack")]
    Ack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckStatus {
    #[serde(rename = "ok")]
    Ok,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorType {
    #[serde(rename = "error")]
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    #[serde(rename = "handshake_required")]
    HandshakeRequired,
    #[serde(rename = "protocol_mismatch")]
    ProtocolMismatch,
    #[serde(rename = "not_controller")]
    NotController,
    #[serde(rename = "invalid_command")]
    InvalidCommand,
    #[serde(rename = "backpressure")]
    Backpressure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssignedRole {
    #[serde(rename = "controller")]
    Controller,
    #[serde(rename = "observer")]
    Observer,
}

/// Welcome message (response to hello)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelcomeMessage {
    #[serde(rename = "type")]
    pub msg_type: WelcomeType,
    pub seq: u64,
    pub ts: u64,
    pub protocol_version: String,
    pub client_id: u64,
    pub role: AssignedRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller_id: Option<u64>,
    pub game_id: String,
}

/// Acknowledgment, sent once the game loop has applied the command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckMessage {
    #[serde(rename = "type")]
    pub msg_type: AckType,
    pub seq: u64,
    pub ts: u64,
    pub status: AckStatus,
}

/// Error message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorMessage {
    #[serde(rename = "type")]
    pub msg_type: ErrorType,
    pub seq: u64,
    pub ts: u64,
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObservationType {
    #[serde(rename = "observation")]
    Observation,
}

/// Game state observation.
///
/// Face-down cards are reported by tile (`"back"`), never by kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationMessage {
    #[serde(rename = "type")]
    pub msg_type: ObservationType,
    pub seq: u64,
    pub ts: u64,
    pub playable: bool,
    pub won: bool,
    pub locked: bool,
    pub episode_id: u32,
    pub message: String,
    pub cards: Vec<CardObservation>,
    pub matched_pairs: u32,
    pub pair_count: u32,
    pub attempts: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_event: Option<LastEvent>,
    pub state_hash: StateHash,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardObservation {
    pub state: CardStateLower,
    pub tile: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardStateLower {
    #[serde(rename = "face_down")]
    FaceDown,
    #[serde(rename = "face_up")]
    FaceUp,
    #[serde(rename = "matched")]
    Matched,
}

impl From<CardState> for CardStateLower {
    fn from(value: CardState) -> Self {
        match value {
            CardState::FaceDown => Self::FaceDown,
            CardState::FaceUp => Self::FaceUp,
            CardState::Matched => Self::Matched,
        }
    }
}

/// Deterministic state hash serialized as lowercase hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateHash(pub u64);

impl Serialize for StateHash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        const HEX: &[u8; 16] = b"0123456789abcdef";
        let mut buf = [0u8; 16];
        let mut v = self.0;
        for i in 0..16 {
            buf[15 - i] = HEX[(v & 0x0f) as usize];
            v >>= 4;
        }
        // Every byte comes from HEX, so this never fails.
        let s = std::str::from_utf8(&buf).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(s)
    }
}

impl<'de> Deserialize<'de> for StateHash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = <&str>::deserialize(deserializer)?;
        u64::from_str_radix(s.trim(), 16)
            .map(StateHash)
            .map_err(|_| serde::de::Error::custom("invalid hex"))
    }
}

/// Most recent transition, flattened for the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastEvent {
    pub kind: LastEventKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pairs: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempts: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LastEventKind {
    #[serde(rename = "revealed")]
    Revealed,
    #[serde(rename = "matched")]
    Matched,
    #[serde(rename = "mismatch")]
    Mismatch,
    #[serde(rename = "flipped_back")]
    FlippedBack,
    #[serde(rename = "won")]
    Won,
}

impl From<GameEvent> for LastEvent {
    fn from(value: GameEvent) -> Self {
        let empty = |kind| LastEvent {
            kind,
            first: None,
            second: None,
            pairs: None,
            attempts: None,
        };
        match value {
            GameEvent::Revealed { index } => LastEvent {
                first: Some(index),
                ..empty(LastEventKind::Revealed)
            },
            GameEvent::Matched {
                first,
                second,
                pairs,
            } => LastEvent {
                first: Some(first),
                second: Some(second),
                pairs: Some(pairs),
                ..empty(LastEventKind::Matched)
            },
            GameEvent::Mismatch { first, second } => LastEvent {
                first: Some(first),
                second: Some(second),
                ..empty(LastEventKind::Mismatch)
            },
            GameEvent::FlippedBack { first, second } => LastEvent {
                first: Some(first),
                second: Some(second),
                ..empty(LastEventKind::FlippedBack)
            },
            GameEvent::Won { attempts } => LastEvent {
                attempts: Some(attempts),
                ..empty(LastEventKind::Won)
            },
        }
    }
}

// ============== Message Parsing ==============

/// Parse a JSON message from a string
pub fn parse_message(json: &str) -> Result<ParsedMessage, serde_json::Error> {
    #[derive(Debug, Deserialize)]
    #[serde(tag = "type")]
    enum InboundMessage {
        #[serde(rename = "hello")]
        Hello(HelloMessage),
        #[serde(rename = "command")]
        Command(CommandMessage),
    }

    match serde_json::from_str::<InboundMessage>(json) {
        Ok(InboundMessage::Hello(m)) => Ok(ParsedMessage::Hello(m)),
        Ok(InboundMessage::Command(m)) => Ok(ParsedMessage::Command(m)),
        Err(e) => {
            // An unknown type is reported to the client, not treated as malformed JSON.
            #[derive(Debug, Deserialize)]
            struct Header<'a> {
                #[serde(rename = "type")]
                msg_type: Option<&'a str>,
                seq: Option<u64>,
            }
            let header = serde_json::from_str::<Header>(json)?;
            match header.msg_type {
                Some("hello") | Some("command") => Err(e),
                _ => Ok(ParsedMessage::Unknown(UnknownMessage {
                    seq: header.seq.unwrap_or(0),
                })),
            }
        }
    }
}

/// Parsed incoming message
#[derive(Debug, Clone)]
pub enum ParsedMessage {
    Hello(HelloMessage),
    Command(CommandMessage),
    Unknown(UnknownMessage),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownMessage {
    pub seq: u64,
}

// ============== Utility Functions ==============

/// Create a hello message
pub fn create_hello(seq: u64, client_name: &str, protocol_version: &str) -> HelloMessage {
    HelloMessage {
        msg_type: HelloType::Hello,
        seq,
        ts: current_timestamp_ms(),
        client: ClientInfo {
            name: client_name.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        protocol_version: protocol_version.to_string(),
        requested: RequestedCapabilities::default(),
    }
}

/// Create a reveal command for one index
pub fn create_reveal(seq: u64, index: usize) -> CommandMessage {
    CommandMessage {
        msg_type: CommandType::Command,
        seq,
        ts: current_timestamp_ms(),
        action: CommandAction::Reveal,
        index: Some(index),
        indices: None,
    }
}

/// Create a welcome message
pub fn create_welcome(
    seq: u64,
    protocol_version: &str,
    client_id: u64,
    role: AssignedRole,
    controller_id: Option<u64>,
) -> WelcomeMessage {
    WelcomeMessage {
        msg_type: WelcomeType::Welcome,
        seq,
        ts: current_timestamp_ms(),
        protocol_version: protocol_version.to_string(),
        client_id,
        role,
        controller_id,
        game_id: "memory-game".to_string(),
    }
}

/// Create an acknowledgment for the command with sequence `seq`
pub fn create_ack(seq: u64) -> AckMessage {
    AckMessage {
        msg_type: AckType::Ack,
        seq,
        ts: current_timestamp_ms(),
        status: AckStatus::Ok,
    }
}

/// Create an error message
pub fn create_error(seq: u64, code: ErrorCode, message: &str) -> ErrorMessage {
    ErrorMessage {
        msg_type: ErrorType::Error,
        seq,
        ts: current_timestamp_ms(),
        code,
        message: message.to_string(),
    }
}

/// Build an observation from a game snapshot.
///
/// `last_event` is passed separately because the game loop consumes events
/// from the core as they happen.
pub fn build_observation(
    snap: &GameSnapshot,
    seq: u64,
    last_event: Option<GameEvent>,
) -> ObservationMessage {
    let cards = snap
        .cards
        .iter()
        .enumerate()
        .map(|(i, c)| CardObservation {
            state: c.state.into(),
            tile: snap.tile_at(i).map(|t| t.name()).unwrap_or("").to_string(),
        })
        .collect();

    ObservationMessage {
        msg_type: ObservationType::Observation,
        seq,
        ts: current_timestamp_ms(),
        playable: snap.playable(),
        won: snap.won,
        locked: snap.locked,
        episode_id: snap.episode_id,
        message: snap.message.to_string(),
        cards,
        matched_pairs: snap.matched_pairs,
        pair_count: snap.pair_count,
        attempts: snap.attempts,
        pending: snap.pending_face_up,
        last_event: last_event.map(LastEvent::from),
        state_hash: state_hash(snap),
    }
}

/// FNV-1a over everything a client can observe except `ts`/`seq`.
///
/// `DefaultHasher` output is not stable across Rust versions, so the hash is
/// computed by hand.
pub fn state_hash(snap: &GameSnapshot) -> StateHash {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    let mut h = OFFSET_BASIS;
    let mut feed = |bytes: &[u8]| {
        for &b in bytes {
            h ^= b as u64;
            h = h.wrapping_mul(PRIME);
        }
    };

    for (i, c) in snap.cards.iter().enumerate() {
        feed(&[c.state as u8]);
        if let Some(tile) = snap.tile_at(i) {
            feed(tile.name().as_bytes());
        }
    }
    feed(snap.message.as_bytes());
    feed(&snap.matched_pairs.to_le_bytes());
    feed(&snap.attempts.to_le_bytes());
    feed(&[snap.locked as u8, snap.won as u8]);
    feed(&snap.pending_face_up.map_or(u64::MAX, |i| i as u64).to_le_bytes());
    feed(&snap.episode_id.to_le_bytes());

    StateHash(h)
}

/// Current timestamp in milliseconds
pub(crate) fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
