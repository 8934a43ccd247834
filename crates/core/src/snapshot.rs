use crate::types::{CardKind, CardState, GameEvent, Tile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CardSnapshot {
    pub kind: CardKind,
    pub state: CardState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSnapshot {
    pub cards: Vec<CardSnapshot>,
    pub message: &'static str,
    pub matched_pairs: u32,
    pub pair_count: u32,
    pub attempts: u32,
    pub pending_face_up: Option<usize>,
    pub locked: bool,
    pub won: bool,
    pub episode_id: u32,
    pub seed: u64,
    pub last_event: Option<GameEvent>,
}

impl GameSnapshot {
    /// Whether a reveal could currently be accepted for some card.
    pub fn playable(&self) -> bool {
        !self.won && !self.locked
    }

    /// Tile the board currently shows at `index`.
    pub fn tile_at(&self, index: usize) -> Option<Tile> {
        self.cards.get(index).map(|c| match c.state {
            CardState::FaceDown => Tile::Back,
            CardState::FaceUp | CardState::Matched => Tile::Face(c.kind),
        })
    }
}

impl Default for GameSnapshot {
    fn default() -> Self {
        Self {
            cards: Vec::new(),
            message: "",
            matched_pairs: 0,
            pair_count: 0,
            attempts: 0,
            pending_face_up: None,
            locked: false,
            won: false,
            episode_id: 0,
            seed: 0,
            last_event: None,
        }
    }
}
