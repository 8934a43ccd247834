//! Terminal input module.
//!
//! Maps `crossterm` key and mouse events into [`InputAction`]s and keeps the
//! keyboard [`Cursor`] over the card grid. The host turns a reveal at the
//! cursor (or a click resolved by the view) into
//! [`GameAction::Reveal`](crate::types::GameAction::Reveal).

pub mod cursor;
pub mod map;

pub use memory_game_types as types;

pub use cursor::Cursor;
pub use map::{handle_key_event, handle_mouse_event, should_quit, Direction, InputAction};
