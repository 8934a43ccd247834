//! Terminal memory game runner (default binary).
//!
//! Uses crossterm for input and the framebuffer renderer from the term
//! crate. The wall clock only lives here: elapsed milliseconds are fed into
//! the controller, which fires the flip-back timer and paints frames onto a
//! `TileCanvas` that the view then lays out.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};

use memory_game::adapter::{
    build_observation, create_ack, Adapter, InboundCommand, InboundPayload, OutboundMessage,
};
use memory_game::core::GameController;
use memory_game::input::{handle_key_event, handle_mouse_event, should_quit, Cursor, InputAction};
use memory_game::term::{
    AdapterStatusView, FrameBuffer, GameView, HudView, TerminalRenderer, TileCanvas, Viewport,
};
use memory_game::types::{GameAction, GameEvent, BOARD_COLUMNS, RENDER_INTERVAL_MS};

fn main() -> Result<()> {
    let seed = seed_from_env();
    let adapter = Adapter::start_from_env()?;

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, seed, adapter);

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

/// `MEMORY_SEED`, or the clock when unset or unparsable.
fn seed_from_env() -> u64 {
    std::env::var("MEMORY_SEED")
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(1)
        })
}

/// Everything the host keeps next to the controller.
struct Session {
    controller: GameController,
    canvas: TileCanvas,
    cursor: Cursor,
    last_event: Option<GameEvent>,
    obs_seq: u64,
}

impl Session {
    fn new(seed: u64) -> Self {
        let mut controller = GameController::new(seed);
        controller.initialize();
        let len = controller.state().board().len();
        Self {
            controller,
            canvas: TileCanvas::new(len),
            cursor: Cursor::new(len, BOARD_COLUMNS),
            last_event: None,
            obs_seq: 0,
        }
    }

    fn apply(&mut self, action: GameAction) {
        self.controller.apply_action(action);
        if action == GameAction::Restart {
            let len = self.controller.state().board().len();
            self.canvas.reset(len);
            self.cursor.reset(len);
            self.last_event = None;
        }
    }

    /// Pull the newest core event; true if there was one.
    fn poll_event(&mut self) -> bool {
        match self.controller.take_last_event() {
            Some(ev) => {
                self.last_event = Some(ev);
                true
            }
            None => false,
        }
    }

    fn next_obs_seq(&mut self) -> u64 {
        self.obs_seq += 1;
        self.obs_seq
    }

    /// Apply one inbound adapter command; true if observers should hear about it.
    fn handle_inbound(&mut self, adapter: &Adapter, inbound: InboundCommand) -> bool {
        match inbound.payload {
            InboundPayload::SnapshotRequest => {
                let seq = self.next_obs_seq();
                let obs = build_observation(&self.controller.snapshot(), seq, self.last_event);
                adapter.send(OutboundMessage::ToClientObservation {
                    client_id: inbound.client_id,
                    obs,
                });
                false
            }
            InboundPayload::Command(cmd) => {
                for action in cmd.actions() {
                    self.apply(action);
                }
                adapter.send(OutboundMessage::ToClientAck {
                    client_id: inbound.client_id,
                    ack: create_ack(inbound.seq),
                });
                true
            }
        }
    }
}

fn run(term: &mut TerminalRenderer, seed: u64, mut adapter: Option<Adapter>) -> Result<()> {
    let mut session = Session::new(seed);
    let view = GameView::default();
    let mut fb = FrameBuffer::new(0, 0);

    let tick_duration = Duration::from_millis(RENDER_INTERVAL_MS as u64);
    let mut last_tick = Instant::now();

    loop {
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        let viewport = Viewport::new(w, h);

        // Input with timeout until next tick.
        let timeout = tick_duration.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if should_quit(key) {
                        return Ok(());
                    }
                    match handle_key_event(key) {
                        Some(InputAction::Move(dir)) => session.cursor.step(dir),
                        Some(InputAction::Reveal) => {
                            session.apply(GameAction::Reveal(session.cursor.index()))
                        }
                        Some(InputAction::Restart) => session.apply(GameAction::Restart),
                        None => {}
                    }
                }
                Event::Mouse(mouse) => {
                    if let Some((x, y)) = handle_mouse_event(mouse) {
                        let len = session.canvas.len();
                        if let Some(index) = view.hit_test(len, viewport, x, y) {
                            session.cursor.set(index);
                            session.apply(GameAction::Reveal(index));
                        }
                    }
                }
                Event::Resize(..) => term.invalidate(),
                _ => {}
            }
        }

        // Remote commands.
        let mut notify = false;
        if let Some(adapter) = adapter.as_mut() {
            while let Some(inbound) = adapter.try_recv() {
                notify |= session.handle_inbound(adapter, inbound);
            }
        }

        // Tick: timers first, then at most one frame onto the canvas.
        let elapsed = last_tick.elapsed();
        if elapsed >= tick_duration {
            last_tick = Instant::now();
            let elapsed_ms = elapsed.as_millis().min(u32::MAX as u128) as u32;
            session.controller.advance(elapsed_ms, &mut session.canvas);
        }

        notify |= session.poll_event();
        if notify {
            if let Some(adapter) = adapter.as_ref() {
                let seq = session.next_obs_seq();
                let obs = build_observation(&session.controller.snapshot(), seq, session.last_event);
                adapter.send(OutboundMessage::BroadcastObservation { obs });
            }
        }

        // Render.
        let hud = HudView {
            cursor: Some(session.cursor.index()),
            last_event: session.last_event,
            adapter: adapter.as_ref().map(|a| AdapterStatusView {
                enabled: true,
                client_count: a.status().client_count().min(u16::MAX as usize) as u16,
                controller_id: a.status().controller_id(),
            }),
        };
        let snap = session.controller.snapshot();
        view.render_into(&session.canvas, &snap, &hud, viewport, &mut fb);
        term.draw_swap(&mut fb)?;
    }
}
