//! Rendering surface seam.
//!
//! The core only needs two things from whatever paints the game: a way to
//! show the status message and a way to paint a named tile at a board index.
//! Layout, assets and terminal/window handling stay on the other side.

use crate::types::Tile;

pub trait RenderSurface {
    /// Paint the current status message.
    fn draw_message(&mut self, text: &str);

    /// Paint `tile` at board `position` (0-based).
    fn draw(&mut self, tile: Tile, position: usize);
}

impl<T: RenderSurface + ?Sized> RenderSurface for &mut T {
    fn draw_message(&mut self, text: &str) {
        (**self).draw_message(text);
    }

    fn draw(&mut self, tile: Tile, position: usize) {
        (**self).draw(tile, position);
    }
}

/// Surface built from two closures, for hosts that need nothing more.
pub struct FnSurface<M, D> {
    on_message: M,
    on_draw: D,
}

impl<M, D> FnSurface<M, D>
where
    M: FnMut(&str),
    D: FnMut(Tile, usize),
{
    pub fn new(on_message: M, on_draw: D) -> Self {
        Self {
            on_message,
            on_draw,
        }
    }
}

impl<M, D> RenderSurface for FnSurface<M, D>
where
    M: FnMut(&str),
    D: FnMut(Tile, usize),
{
    fn draw_message(&mut self, text: &str) {
        (self.on_message)(text);
    }

    fn draw(&mut self, tile: Tile, position: usize) {
        (self.on_draw)(tile, position);
    }
}

/// Surface that remembers every call; used by tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingSurface {
    pub messages: Vec<String>,
    pub tiles: Vec<(Tile, usize)>,
}

#[cfg(test)]
impl RenderSurface for RecordingSurface {
    fn draw_message(&mut self, text: &str) {
        self.messages.push(text.to_string());
    }

    fn draw(&mut self, tile: Tile, position: usize) {
        self.tiles.push((tile, position));
    }
}
