//! Keyboard cursor over the card grid.
//!
//! Movement wraps within a row and within a column. Positions past the end
//! of a short last row are skipped.

use crate::map::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    index: usize,
    len: usize,
    columns: usize,
}

impl Cursor {
    pub fn new(len: usize, columns: usize) -> Self {
        Self {
            index: 0,
            len,
            columns: columns.max(1),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Jump to `index` (mouse click). Out-of-range indices are ignored.
    pub fn set(&mut self, index: usize) {
        if index < self.len {
            self.index = index;
        }
    }

    /// Board dealt again, possibly with a different length.
    pub fn reset(&mut self, len: usize) {
        self.len = len;
        self.index = 0;
    }

    pub fn step(&mut self, dir: Direction) {
        if self.len == 0 {
            return;
        }
        let cols = self.columns.min(self.len);
        let rows = self.len.div_ceil(cols);
        let mut row = self.index / cols;
        let mut col = self.index % cols;

        match dir {
            Direction::Left | Direction::Right => {
                let row_len = (self.len - row * cols).min(cols);
                col = if dir == Direction::Left {
                    (col + row_len - 1) % row_len
                } else {
                    (col + 1) % row_len
                };
            }
            Direction::Up | Direction::Down => loop {
                row = if dir == Direction::Up {
                    (row + rows - 1) % rows
                } else {
                    (row + 1) % rows
                };
                if row * cols + col < self.len {
                    break;
                }
            },
        }

        self.index = row * cols + col;
    }
}
