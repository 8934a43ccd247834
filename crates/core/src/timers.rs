//! Timer queue - deferred one-shot tasks on a virtual clock
//!
//! The queue never reads the wall clock. The host advances it with the
//! milliseconds that actually elapsed, and tests advance it by hand, so
//! scheduling is deterministic and needs no real delays.
//!
//! Tasks are plain values. Everything a task needs (board indices) is copied
//! in when it is scheduled, and the game state it acts on is passed in when
//! it runs.

use crate::game_state::GameState;

/// Handle returned by [`TimerQueue::schedule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

/// Work that runs once its delay has elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredTask {
    /// Turn a mismatched pair back face down and unlock input.
    ///
    /// `latest` is the card revealed second, `earlier` the one that was pending.
    ResolveMismatch { latest: usize, earlier: usize },
}

impl DeferredTask {
    pub fn run(self, state: &mut GameState) {
        match self {
            DeferredTask::ResolveMismatch { latest, earlier } => {
                state.resolve_mismatch(latest, earlier);
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Scheduled {
    id: TaskId,
    due_ms: u64,
    task: DeferredTask,
}

#[derive(Debug, Clone, Default)]
pub struct TimerQueue {
    now_ms: u64,
    next_id: u64,
    pending: Vec<Scheduled>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time in milliseconds since the queue was created.
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Schedule `task` to become due `delay_ms` from now.
    pub fn schedule(&mut self, delay_ms: u32, task: DeferredTask) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.pending.push(Scheduled {
            id,
            due_ms: self.now_ms + delay_ms as u64,
            task,
        });
        id
    }

    /// Drop a task before it fires. Returns false if it already ran or never existed.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|s| s.id != id);
        self.pending.len() != before
    }

    pub fn advance(&mut self, elapsed_ms: u32) {
        self.now_ms += elapsed_ms as u64;
    }

    /// Remove and return the earliest due task.
    ///
    /// Ties on due time resolve in scheduling order.
    pub fn pop_due(&mut self) -> Option<DeferredTask> {
        let now = self.now_ms;
        let (pos, _) = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, s)| s.due_ms <= now)
            .min_by_key(|(_, s)| (s.due_ms, s.id))?;
        Some(self.pending.remove(pos).task)
    }

    /// Milliseconds until the next task is due, if any.
    pub fn next_due_in_ms(&self) -> Option<u64> {
        self.pending
            .iter()
            .map(|s| s.due_ms.saturating_sub(self.now_ms))
            .min()
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
