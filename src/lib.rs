//! Memory game (workspace facade crate).
//!
//! Re-exports the workspace crates as `memory_game::{core,adapter,term,input,types}`
//! so the binary, integration tests and benches share one import path.

pub use memory_game_adapter as adapter;
pub use memory_game_core as core;
pub use memory_game_input as input;
pub use memory_game_term as term;
pub use memory_game_types as types;
