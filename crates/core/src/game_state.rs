//! Game state module - the reveal/match state machine
//!
//! Owns the board and every piece of per-session state. Player misuse
//! (out-of-range index, re-clicking the pending card, clicking a matched
//! card, clicking while locked) is never an error: the request is ignored
//! and the state is left untouched.

use crate::board::Board;
use crate::snapshot::{CardSnapshot, GameSnapshot};
use crate::surface::RenderSurface;
use crate::types::*;

/// Result of a reveal request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealOutcome {
    /// Rejected by a precondition; nothing changed.
    Ignored,
    /// First card of a pair attempt is now face up and pending.
    FirstReveal { index: usize },
    /// Second card matched the pending one.
    Matched { first: usize, second: usize, won: bool },
    /// Second card differs; input is locked until the flip-back runs.
    Mismatch { first: usize, second: usize },
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    board: Board,
    matched_pairs: u32,
    /// Index of the one revealed-but-unresolved card.
    pending_face_up: Option<usize>,
    message: &'static str,
    /// Set while a flip-back is scheduled. Only the flip-back clears it.
    locked: bool,
    /// Completed pair attempts (second reveals).
    attempts: u32,
    /// Monotonic episode id (increments on restart).
    episode_id: u32,
    seed: u64,
    /// Last transition (consumed by observers).
    last_event: Option<GameEvent>,
}

impl GameState {
    pub fn new(board: Board, seed: u64) -> Self {
        Self {
            board,
            matched_pairs: 0,
            pending_face_up: None,
            message: MSG_INITIAL,
            locked: false,
            attempts: 0,
            episode_id: 0,
            seed,
            last_event: None,
        }
    }

    pub(crate) fn with_episode_id(mut self, episode_id: u32) -> Self {
        self.episode_id = episode_id;
        self
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn matched_pairs(&self) -> u32 {
        self.matched_pairs
    }

    pub fn pair_count(&self) -> u32 {
        self.board.pair_count() as u32
    }

    pub fn pending_face_up(&self) -> Option<usize> {
        self.pending_face_up
    }

    pub fn message(&self) -> &'static str {
        self.message
    }

    pub fn locked(&self) -> bool {
        self.locked
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn episode_id(&self) -> u32 {
        self.episode_id
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn is_won(&self) -> bool {
        self.matched_pairs >= self.pair_count()
    }

    pub fn last_event(&self) -> Option<GameEvent> {
        self.last_event
    }

    pub fn take_last_event(&mut self) -> Option<GameEvent> {
        self.last_event.take()
    }

    /// Whether a reveal of `index` would be accepted right now.
    pub fn can_reveal(&self, index: usize) -> bool {
        if self.is_won() || self.locked || self.pending_face_up == Some(index) {
            return false;
        }
        matches!(self.board.get(index), Some(card) if !card.is_matched())
    }

    /// Flip the card at `index` and resolve a pair attempt if one is pending.
    ///
    /// Callers must schedule the flip-back for a [`RevealOutcome::Mismatch`];
    /// the controller does this.
    pub(crate) fn reveal(&mut self, index: usize) -> RevealOutcome {
        if !self.can_reveal(index) {
            return RevealOutcome::Ignored;
        }

        if let Some(card) = self.board.get_mut(index) {
            card.flip();
        }

        let Some(first) = self.pending_face_up.take() else {
            self.pending_face_up = Some(index);
            self.last_event = Some(GameEvent::Revealed { index });
            return RevealOutcome::FirstReveal { index };
        };

        self.attempts += 1;

        let same_kind = match (self.board.get(first), self.board.get(index)) {
            (Some(a), Some(b)) => b.same_kind_as(a.kind()),
            _ => false,
        };

        if same_kind {
            for i in [first, index] {
                if let Some(card) = self.board.get_mut(i) {
                    card.mark_found();
                }
            }
            self.matched_pairs += 1;

            let won = self.is_won();
            if won {
                self.message = MSG_WIN;
                self.last_event = Some(GameEvent::Won {
                    attempts: self.attempts,
                });
            } else {
                self.message = MSG_MATCH_FOUND;
                self.last_event = Some(GameEvent::Matched {
                    first,
                    second: index,
                    pairs: self.matched_pairs,
                });
            }
            RevealOutcome::Matched {
                first,
                second: index,
                won,
            }
        } else {
            self.message = MSG_TRY_AGAIN;
            self.locked = true;
            self.last_event = Some(GameEvent::Mismatch {
                first,
                second: index,
            });
            RevealOutcome::Mismatch {
                first,
                second: index,
            }
        }
    }

    /// Flip both cards of a mismatched pair back and unlock input.
    pub(crate) fn resolve_mismatch(&mut self, latest: usize, earlier: usize) {
        for i in [latest, earlier] {
            if let Some(card) = self.board.get_mut(i) {
                card.flip();
            }
        }
        self.locked = false;
        self.last_event = Some(GameEvent::FlippedBack {
            first: earlier,
            second: latest,
        });
    }

    /// Paint the message and then every card in board order.
    pub fn render<S: RenderSurface + ?Sized>(&self, surface: &mut S) {
        surface.draw_message(self.message);
        for (i, card) in self.board.iter().enumerate() {
            card.render(surface, i);
        }
    }

    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        out.cards.clear();
        out.cards.extend(self.board.iter().map(|c| CardSnapshot {
            kind: c.kind(),
            state: c.state(),
        }));
        out.message = self.message;
        out.matched_pairs = self.matched_pairs;
        out.pair_count = self.pair_count();
        out.attempts = self.attempts;
        out.pending_face_up = self.pending_face_up;
        out.locked = self.locked;
        out.won = self.is_won();
        out.episode_id = self.episode_id;
        out.seed = self.seed;
        out.last_event = self.last_event;
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut s = GameSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RecordingSurface;

    use crate::types::CardKind::{Guy as B, Rocket as A};

    fn abab() -> GameState {
        GameState::new(Board::from_kinds(&[A, B, A, B]).unwrap(), 0)
    }

    fn state_at(gs: &GameState, i: usize) -> CardState {
        gs.board().get(i).unwrap().state()
    }

    #[test]
    fn test_new_game_state() {
        let gs = abab();
        assert_eq!(gs.matched_pairs(), 0);
        assert_eq!(gs.pair_count(), 2);
        assert_eq!(gs.pending_face_up(), None);
        assert_eq!(gs.message(), MSG_INITIAL);
        assert!(!gs.locked());
        assert!(!gs.is_won());
        assert_eq!(gs.last_event(), None);
    }

    #[test]
    fn test_first_reveal_sets_pending() {
        let mut gs = abab();
        assert_eq!(gs.reveal(0), RevealOutcome::FirstReveal { index: 0 });
        assert_eq!(gs.pending_face_up(), Some(0));
        assert_eq!(state_at(&gs, 0), CardState::FaceUp);
        assert_eq!(gs.take_last_event(), Some(GameEvent::Revealed { index: 0 }));
        assert_eq!(gs.take_last_event(), None);
    }

    #[test]
    fn test_match_marks_both() {
        let mut gs = abab();
        gs.reveal(0);
        let outcome = gs.reveal(2);
        assert_eq!(
            outcome,
            RevealOutcome::Matched {
                first: 0,
                second: 2,
                won: false
            }
        );
        assert_eq!(state_at(&gs, 0), CardState::Matched);
        assert_eq!(state_at(&gs, 2), CardState::Matched);
        assert_eq!(gs.matched_pairs(), 1);
        assert_eq!(gs.pending_face_up(), None);
        assert_eq!(gs.message(), MSG_MATCH_FOUND);
        assert!(!gs.locked());
        assert_eq!(gs.attempts(), 1);
    }

    #[test]
    fn test_final_match_wins() {
        let mut gs = abab();
        gs.reveal(0);
        gs.reveal(2);
        gs.reveal(1);
        let outcome = gs.reveal(3);
        assert_eq!(
            outcome,
            RevealOutcome::Matched {
                first: 1,
                second: 3,
                won: true
            }
        );
        assert!(gs.is_won());
        assert_eq!(gs.matched_pairs(), 2);
        assert_eq!(gs.message(), MSG_WIN);
        assert_eq!(gs.last_event(), Some(GameEvent::Won { attempts: 2 }));
    }

    #[test]
    fn test_mismatch_locks() {
        let mut gs = abab();
        gs.reveal(0);
        assert_eq!(
            gs.reveal(1),
            RevealOutcome::Mismatch {
                first: 0,
                second: 1
            }
        );
        assert!(gs.locked());
        assert_eq!(gs.message(), MSG_TRY_AGAIN);
        assert_eq!(gs.pending_face_up(), None);
        assert_eq!(state_at(&gs, 0), CardState::FaceUp);
        assert_eq!(state_at(&gs, 1), CardState::FaceUp);
    }

    #[test]
    fn test_resolve_mismatch_restores_face_down() {
        let mut gs = abab();
        gs.reveal(0);
        gs.reveal(1);
        gs.resolve_mismatch(1, 0);
        assert!(!gs.locked());
        assert_eq!(state_at(&gs, 0), CardState::FaceDown);
        assert_eq!(state_at(&gs, 1), CardState::FaceDown);
        assert_eq!(
            gs.last_event(),
            Some(GameEvent::FlippedBack {
                first: 0,
                second: 1
            })
        );
    }

    #[test]
    fn test_ignored_requests_leave_state_unchanged() {
        let mut gs = abab();
        gs.reveal(0);
        gs.reveal(2);
        gs.reveal(1);
        let before = gs.snapshot();

        // Out of range.
        assert_eq!(gs.reveal(4), RevealOutcome::Ignored);
        assert_eq!(gs.reveal(usize::MAX), RevealOutcome::Ignored);
        // Pending card itself.
        assert_eq!(gs.reveal(1), RevealOutcome::Ignored);
        // Matched card.
        assert_eq!(gs.reveal(0), RevealOutcome::Ignored);
        assert_eq!(gs.reveal(2), RevealOutcome::Ignored);

        assert_eq!(gs.snapshot(), before);
    }

    #[test]
    fn test_locked_rejects_reveal() {
        let mut gs = abab();
        gs.reveal(0);
        gs.reveal(1);
        let before = gs.snapshot();
        assert_eq!(gs.reveal(2), RevealOutcome::Ignored);
        assert_eq!(gs.reveal(3), RevealOutcome::Ignored);
        assert_eq!(gs.snapshot(), before);
    }

    #[test]
    fn test_won_rejects_reveal() {
        let mut gs = abab();
        for i in [0, 2, 1, 3] {
            gs.reveal(i);
        }
        assert!(!gs.can_reveal(0));
        assert_eq!(gs.reveal(0), RevealOutcome::Ignored);
    }

    #[test]
    fn test_can_reveal() {
        let mut gs = abab();
        assert!(gs.can_reveal(0));
        assert!(!gs.can_reveal(4));
        gs.reveal(0);
        assert!(!gs.can_reveal(0));
        assert!(gs.can_reveal(1));
    }

    #[test]
    fn test_render_paints_message_then_cards() {
        let mut gs = abab();
        gs.reveal(1);
        let mut surface = RecordingSurface::default();
        gs.render(&mut surface);

        assert_eq!(surface.messages, vec![MSG_INITIAL.to_string()]);
        assert_eq!(
            surface.tiles,
            vec![
                (Tile::Back, 0),
                (Tile::Face(B), 1),
                (Tile::Back, 2),
                (Tile::Back, 3),
            ]
        );
    }

    #[test]
    fn test_snapshot_fields() {
        let mut gs = abab();
        gs.reveal(0);
        gs.reveal(1);
        let snap = gs.snapshot();
        assert_eq!(snap.cards.len(), 4);
        assert_eq!(snap.cards[0].kind, A);
        assert_eq!(snap.cards[0].state, CardState::FaceUp);
        assert!(snap.locked);
        assert!(!snap.won);
        assert_eq!(snap.attempts, 1);
        assert_eq!(snap.message, MSG_TRY_AGAIN);
        assert!(!snap.playable());
    }
}
