//! Terminal "game renderer" module.
//!
//! A small rendering layer for playing in a terminal. The core paints tiles
//! onto a [`TileCanvas`]; [`GameView`] lays the canvas out as a grid of card
//! boxes in a framebuffer, and [`TerminalRenderer`] flushes the framebuffer
//! to the terminal with crossterm.
//!
//! No ratatui widgets or layout: the view owns its own geometry so it can
//! map mouse clicks back to board indices ([`GameView::hit_test`]).

pub mod canvas;
pub mod fb;
pub mod game_view;
pub mod renderer;

pub use memory_game_core as core;
pub use memory_game_types as types;

pub use canvas::TileCanvas;
pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use game_view::{AdapterStatusView, AnchorY, BoardLayout, GameView, HudView, Viewport};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
