//! Core game logic module - pure, deterministic, and testable
//!
//! This crate holds the rules of the pair-matching memory game: board
//! construction, the reveal/match state machine, the deferred flip-back and
//! the fixed-interval render loop. It has no dependencies on terminals,
//! networking or wall-clock time.
//!
//! # Module Structure
//!
//! - [`board`]: fixed-length sequence of paired cards and the shuffled dealer
//! - [`card`]: a single card and its face-down / face-up / matched state
//! - [`game_state`]: the reveal state machine, message and lock
//! - [`timers`]: virtual-time queue of deferred one-shot tasks
//! - [`render_loop`]: fixed-interval frame clock
//! - [`controller`]: owns one session and drives both schedules
//! - [`surface`]: the seam a renderer implements
//!
//! # Game Rules
//!
//! - Every kind appears exactly twice on the board.
//! - The first reveal of an attempt turns one card face up and waits.
//! - A matching second reveal marks both cards matched for good.
//! - A differing second reveal locks input; 400ms later both cards turn
//!   back face down and input unlocks.
//! - Revealing the pending card, a matched card, an out-of-range index, or
//!   anything while locked or after the win is silently ignored.
//!
//! # Example
//!
//! ```
//! use memory_game_core::{Board, GameController};
//! use memory_game_types::{CardKind, GameAction, MSG_WIN, RENDER_INTERVAL_MS};
//!
//! let board = Board::from_kinds(&[
//!     CardKind::Rocket,
//!     CardKind::Guy,
//!     CardKind::Rocket,
//!     CardKind::Guy,
//! ])
//! .unwrap();
//! let mut game = GameController::with_board(board, 12345);
//! game.initialize();
//!
//! for i in [0, 2, 1, 3] {
//!     game.apply_action(GameAction::Reveal(i));
//! }
//! assert!(game.state().is_won());
//! assert_eq!(game.state().message(), MSG_WIN);
//!
//! // The next frame shows the win and then the render loop stops.
//! let mut messages = Vec::new();
//! game.advance(RENDER_INTERVAL_MS, &mut memory_game_core::FnSurface::new(
//!     |text: &str| messages.push(text.to_string()),
//!     |_, _| {},
//! ));
//! assert_eq!(messages, vec![MSG_WIN.to_string()]);
//! assert!(!game.is_running());
//! ```
//!
//! # Timing
//!
//! Nothing here reads a clock. Call
//! [`GameController::advance`](controller::GameController::advance) with the
//! milliseconds that elapsed; timers fire first, then at most one frame is
//! painted.

pub mod board;
pub mod card;
pub mod controller;
pub mod game_state;
pub mod render_loop;
pub mod rng;
pub mod snapshot;
pub mod surface;
pub mod timers;

pub use memory_game_types as types;

// Re-export commonly used types for convenience
pub use board::{Board, BoardError};
pub use card::Card;
pub use controller::GameController;
pub use game_state::{GameState, RevealOutcome};
pub use render_loop::RenderLoop;
pub use rng::GameRng;
pub use snapshot::{CardSnapshot, GameSnapshot};
pub use surface::{FnSurface, RenderSurface};
pub use timers::{DeferredTask, TaskId, TimerQueue};
