//! TileCanvas: the render surface the core paints each frame.
//!
//! The canvas only remembers the last message and the last tile painted at
//! every position. The terminal view reads it afterwards, so the screen
//! shows exactly what the render loop last painted (and keeps showing the
//! win frame after the loop stops).

use crate::core::RenderSurface;
use crate::types::Tile;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TileCanvas {
    message: String,
    tiles: Vec<Option<Tile>>,
    frames: u64,
}

impl TileCanvas {
    pub fn new(board_len: usize) -> Self {
        Self {
            message: String::new(),
            tiles: vec![None; board_len],
            frames: 0,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Tile last painted at `position`, if any.
    pub fn tile(&self, position: usize) -> Option<Tile> {
        self.tiles.get(position).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Number of messages painted, one per frame.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Forget everything painted (board dealt again).
    pub fn reset(&mut self, board_len: usize) {
        self.message.clear();
        self.tiles.clear();
        self.tiles.resize(board_len, None);
        self.frames = 0;
    }
}

impl RenderSurface for TileCanvas {
    fn draw_message(&mut self, text: &str) {
        self.message.clear();
        self.message.push_str(text);
        self.frames += 1;
    }

    fn draw(&mut self, tile: Tile, position: usize) {
        if position >= self.tiles.len() {
            self.tiles.resize(position + 1, None);
        }
        self.tiles[position] = Some(tile);
    }
}
