//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the application.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (core logic, terminal rendering, remote protocol).
//!
//! # Board Layout
//!
//! The default board holds two cards of each of the eight [`CardKind`]s:
//!
//! - **Cards**: 16 (indexed 0-15, the only addressing scheme used externally)
//! - **Columns**: 4 when laid out as a grid by the terminal view
//!
//! # Timing Constants
//!
//! Timing values are in milliseconds:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `RENDER_INTERVAL_MS` | 20 | Fixed render loop interval |
//! | `FLIP_BACK_DELAY_MS` | 400 | Delay before a mismatched pair is turned face down |
//!
//! # Examples
//!
//! ```
//! use memory_game_types::{CardKind, GameAction, Tile, BOARD_LEN};
//!
//! let kind = CardKind::from_str("Rocket").unwrap();
//! assert_eq!(kind, CardKind::Rocket);
//! assert_eq!(Tile::Face(kind).name(), "rocket");
//! assert_eq!(Tile::Back.name(), "back");
//!
//! assert_eq!(GameAction::from_str("reveal:3"), Some(GameAction::Reveal(3)));
//! assert_eq!(BOARD_LEN, 16);
//! ```

/// Fixed render loop interval in milliseconds.
pub const RENDER_INTERVAL_MS: u32 = 20;

/// Delay between a mismatched second reveal and the flip-back of both cards.
pub const FLIP_BACK_DELAY_MS: u32 = 400;

/// Number of board columns used by grid layouts (terminal view, input cursor).
pub const BOARD_COLUMNS: usize = 4;

/// Board length for the built-in alphabet (two cards per kind).
pub const BOARD_LEN: usize = CardKind::ALL.len() * 2;

/// Status message shown before any pair attempt.
pub const MSG_INITIAL: &str = "Memory Game";

/// Status message after a matching pair.
pub const MSG_MATCH_FOUND: &str = "Match found";

/// Status message after a mismatched pair.
pub const MSG_TRY_AGAIN: &str = "Try again";

/// Status message once every pair is matched.
pub const MSG_WIN: &str = "You win!";

/// Tile name painted for a face-down card.
pub const BACK_TILE: &str = "back";


/// The card-type alphabet.
///
/// Two cards are "the same kind" iff their `CardKind` is equal; board position
/// plays no part in identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CardKind {
    EightBall,
    Potato,
    Dinosaur,
    Kronos,
    Rocket,
    Unicorn,
    Guy,
    Zeppelin,
}

impl CardKind {
    /// Every kind, in alphabet order.
    pub const ALL: [CardKind; 8] = [
        CardKind::EightBall,
        CardKind::Potato,
        CardKind::Dinosaur,
        CardKind::Kronos,
        CardKind::Rocket,
        CardKind::Unicorn,
        CardKind::Guy,
        CardKind::Zeppelin,
    ];

    /// Parse a kind from its tile name (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use memory_game_types::CardKind;
    ///
    /// assert_eq!(CardKind::from_str("potato"), Some(CardKind::Potato));
    /// assert_eq!(CardKind::from_str("ZEPPELIN"), Some(CardKind::Zeppelin));
    /// assert_eq!(CardKind::from_str("unknown"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "8-ball" => Some(CardKind::EightBall),
            "potato" => Some(CardKind::Potato),
            "dinosaur" => Some(CardKind::Dinosaur),
            "kronos" => Some(CardKind::Kronos),
            "rocket" => Some(CardKind::Rocket),
            "unicorn" => Some(CardKind::Unicorn),
            "guy" => Some(CardKind::Guy),
            "zeppelin" => Some(CardKind::Zeppelin),
            _ => None,
        }
    }

    /// Tile name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            CardKind::EightBall => "8-ball",
            CardKind::Potato => "potato",
            CardKind::Dinosaur => "dinosaur",
            CardKind::Kronos => "kronos",
            CardKind::Rocket => "rocket",
            CardKind::Unicorn => "unicorn",
            CardKind::Guy => "guy",
            CardKind::Zeppelin => "zeppelin",
        }
    }
}

/// Card state.
///
/// - **FaceDown**: initial state
/// - **FaceUp**: revealed, not yet resolved
/// - **Matched**: terminal, never leaves this state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CardState {
    #[default]
    FaceDown,
    FaceUp,
    Matched,
}

/// A named tile the rendering surface knows how to paint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tile {
    Back,
    Face(CardKind),
}

impl Tile {
    pub fn name(&self) -> &'static str {
        match self {
            Tile::Back => BACK_TILE,
            Tile::Face(kind) => kind.as_str(),
        }
    }
}

/// Host-level actions applied to the game controller
///
/// Both human input and remote clients funnel into these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameAction {
    /// Reveal the card at a 0-based board index
    Reveal(usize),
    /// Discard the session and deal a fresh board
    Restart,
}

impl GameAction {
    /// Parse an action string (`"restart"` or `"reveal:<index>"`)
    pub fn from_str(s: &str) -> Option<Self> {
        let lower = s.to_lowercase();
        if lower == "restart" {
            return Some(GameAction::Restart);
        }
        let index = lower.strip_prefix("reveal:")?;
        index.parse::<usize>().ok().map(GameAction::Reveal)
    }
}

/// Core-side record of the most recent state transition.
///
/// Consumed by observers (status panel, remote observations).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// First card of a pair attempt turned face up.
    Revealed { index: usize },
    /// Second reveal matched the pending card.
    Matched { first: usize, second: usize, pairs: u32 },
    /// Second reveal did not match; a flip-back is scheduled.
    Mismatch { first: usize, second: usize },
    /// Scheduled flip-back ran; input is unlocked again.
    FlippedBack { first: usize, second: usize },
    /// Final pair matched.
    Won { attempts: u32 },
}

impl GameEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameEvent::Revealed { .. } => "revealed",
            GameEvent::Matched { .. } => "matched",
            GameEvent::Mismatch { .. } => "mismatch",
            GameEvent::FlippedBack { .. } => "flipped_back",
            GameEvent::Won { .. } => "won",
        }
    }
}
