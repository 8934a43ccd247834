//! Game controller - owns the session and drives its two schedules
//!
//! Two independent sources of work share one thread: the periodic render
//! tick and the one-shot flip-back timer. Both are advanced from
//! [`GameController::advance`], so handlers never overlap.

use crate::board::{Board, BoardError};
use crate::game_state::{GameState, RevealOutcome};
use crate::render_loop::RenderLoop;
use crate::rng::GameRng;
use crate::snapshot::GameSnapshot;
use crate::surface::RenderSurface;
use crate::timers::{DeferredTask, TimerQueue};
use crate::types::*;

#[derive(Debug, Clone)]
pub struct GameController {
    state: GameState,
    timers: TimerQueue,
    render_loop: RenderLoop,
    rng: GameRng,
    alphabet: Vec<CardKind>,
    started: bool,
}

impl GameController {
    /// New session with the built-in alphabet; the board is dealt immediately.
    pub fn new(seed: u64) -> Self {
        let mut rng = GameRng::new(seed);
        let board = Board::standard(&mut rng);
        Self::from_parts(board, rng, CardKind::ALL.to_vec())
    }

    /// New session with a custom alphabet (two cards per kind).
    pub fn with_alphabet(seed: u64, alphabet: &[CardKind]) -> Result<Self, BoardError> {
        let mut rng = GameRng::new(seed);
        let board = Board::shuffled(alphabet, alphabet.len() * 2, &mut rng)?;
        Ok(Self::from_parts(board, rng, alphabet.to_vec()))
    }

    /// New session over a fixed layout. Restarts reshuffle its kinds with `seed`.
    pub fn with_board(board: Board, seed: u64) -> Self {
        let alphabet = board.kinds();
        Self::from_parts(board, GameRng::new(seed), alphabet)
    }

    fn from_parts(board: Board, rng: GameRng, alphabet: Vec<CardKind>) -> Self {
        Self {
            state: GameState::new(board, rng.seed()),
            timers: TimerQueue::new(),
            render_loop: RenderLoop::new(RENDER_INTERVAL_MS),
            rng,
            alphabet,
            started: false,
        }
    }

    /// Start the render loop. Reveal requests are ignored before this.
    pub fn initialize(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        self.render_loop.start();
    }

    pub fn started(&self) -> bool {
        self.started
    }

    /// Whether the render loop is still issuing frames.
    pub fn is_running(&self) -> bool {
        self.render_loop.is_running()
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn timers(&self) -> &TimerQueue {
        &self.timers
    }

    pub fn render_loop(&self) -> &RenderLoop {
        &self.render_loop
    }

    pub fn take_last_event(&mut self) -> Option<GameEvent> {
        self.state.take_last_event()
    }

    /// Forward a player's reveal. A mismatch schedules the flip-back.
    pub fn request_reveal(&mut self, index: usize) -> RevealOutcome {
        if !self.started {
            return RevealOutcome::Ignored;
        }

        let outcome = self.state.reveal(index);
        if let RevealOutcome::Mismatch { first, second } = outcome {
            self.timers.schedule(
                FLIP_BACK_DELAY_MS,
                DeferredTask::ResolveMismatch {
                    latest: second,
                    earlier: first,
                },
            );
        }
        outcome
    }

    /// Apply a host action; returns false when the action changed nothing.
    pub fn apply_action(&mut self, action: GameAction) -> bool {
        match action {
            GameAction::Reveal(index) => {
                self.request_reveal(index) != RevealOutcome::Ignored
            }
            GameAction::Restart => {
                self.restart();
                true
            }
        }
    }

    /// Advance both schedules by `elapsed_ms`.
    ///
    /// Due timers fire first, then at most one frame is painted onto
    /// `surface`. The frame that first shows the win is the last one.
    /// Returns true when a frame was painted.
    pub fn advance<S: RenderSurface + ?Sized>(&mut self, elapsed_ms: u32, surface: &mut S) -> bool {
        if !self.started {
            return false;
        }

        self.timers.advance(elapsed_ms);
        while let Some(task) = self.timers.pop_due() {
            task.run(&mut self.state);
        }

        if !self.render_loop.poll(elapsed_ms) {
            return false;
        }

        self.state.render(surface);
        if self.state.is_won() {
            self.render_loop.stop();
        }
        true
    }

    /// Deal a fresh board from the same RNG stream and start over.
    pub fn restart(&mut self) {
        let board = Board::deal(&self.alphabet, &mut self.rng);
        let next_episode = self.state.episode_id().wrapping_add(1);
        self.state = GameState::new(board, self.rng.seed()).with_episode_id(next_episode);
        self.timers.clear();
        self.render_loop = RenderLoop::new(RENDER_INTERVAL_MS);
        if self.started {
            self.render_loop.start();
        }
    }

    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        self.state.snapshot_into(out);
    }

    pub fn snapshot(&self) -> GameSnapshot {
        self.state.snapshot()
    }
}

impl Default for GameController {
    fn default() -> Self {
        Self::new(1)
    }
}
