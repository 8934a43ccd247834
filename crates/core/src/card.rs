//! Card entity - identity and state of a single card

use crate::surface::RenderSurface;
use crate::types::{CardKind, CardState, Tile};

/// A single card on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Card {
    kind: CardKind,
    state: CardState,
}

impl Card {
    /// Create a face-down card of the given kind
    pub const fn new(kind: CardKind) -> Self {
        Self {
            kind,
            state: CardState::FaceDown,
        }
    }

    pub fn kind(&self) -> CardKind {
        self.kind
    }

    pub fn state(&self) -> CardState {
        self.state
    }

    pub fn is_matched(&self) -> bool {
        self.state == CardState::Matched
    }

    pub fn is_face_down(&self) -> bool {
        self.state == CardState::FaceDown
    }

    /// Toggle FaceDown <-> FaceUp. Matched cards stay matched.
    pub fn flip(&mut self) {
        self.state = match self.state {
            CardState::FaceDown => CardState::FaceUp,
            CardState::FaceUp => CardState::FaceDown,
            CardState::Matched => CardState::Matched,
        };
    }

    /// Mark the card as part of a found pair (idempotent).
    pub fn mark_found(&mut self) {
        self.state = CardState::Matched;
    }

    pub fn same_kind_as(&self, other: CardKind) -> bool {
        self.kind == other
    }

    /// Tile currently shown for this card.
    pub fn tile(&self) -> Tile {
        match self.state {
            CardState::FaceDown => Tile::Back,
            CardState::FaceUp | CardState::Matched => Tile::Face(self.kind),
        }
    }

    pub fn render<S: RenderSurface + ?Sized>(&self, surface: &mut S, position: usize) {
        surface.draw(self.tile(), position);
    }
}
