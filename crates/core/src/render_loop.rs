//! Fixed-interval render loop.
//!
//! Purely a clock: it decides when a frame is due and never touches game
//! state. The controller stops it after the frame that shows the win.

#[derive(Debug, Clone)]
pub struct RenderLoop {
    interval_ms: u32,
    accumulator_ms: u32,
    running: bool,
    frames: u64,
}

impl RenderLoop {
    pub fn new(interval_ms: u32) -> Self {
        Self {
            interval_ms: interval_ms.max(1),
            accumulator_ms: 0,
            running: false,
            frames: 0,
        }
    }

    pub fn start(&mut self) {
        self.running = true;
        self.accumulator_ms = 0;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }

    /// Frames issued since creation.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Advance by `elapsed_ms`; returns true when a frame is due.
    ///
    /// Long stalls produce a single frame, not a backlog.
    pub fn poll(&mut self, elapsed_ms: u32) -> bool {
        if !self.running {
            return false;
        }

        self.accumulator_ms = self.accumulator_ms.saturating_add(elapsed_ms);
        if self.accumulator_ms < self.interval_ms {
            return false;
        }

        self.accumulator_ms %= self.interval_ms;
        self.frames += 1;
        true
    }
}
