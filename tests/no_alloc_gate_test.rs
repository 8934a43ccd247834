use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use memory_game::core::{GameController, GameSnapshot};
use memory_game::term::TileCanvas;
use memory_game::types::{GameAction, RENDER_INTERVAL_MS};

struct CountingAlloc;

static COUNT_ENABLED: AtomicBool = AtomicBool::new(false);
static ALLOC_COUNT: AtomicUsize = AtomicUsize::new(0);

#[global_allocator]
static GLOBAL: CountingAlloc = CountingAlloc;

unsafe impl GlobalAlloc for CountingAlloc {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        if COUNT_ENABLED.load(Ordering::Relaxed) {
            let _ = layout;
            ALLOC_COUNT.fetch_add(1, Ordering::Relaxed);
        }
        System.alloc(layout)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout)
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        if COUNT_ENABLED.load(Ordering::Relaxed) {
            let _ = (layout, new_size);
            ALLOC_COUNT.fetch_add(1, Ordering::Relaxed);
        }
        System.realloc(ptr, layout, new_size)
    }
}

fn with_alloc_counting<F: FnOnce()>(f: F) -> usize {
    ALLOC_COUNT.store(0, Ordering::Relaxed);
    COUNT_ENABLED.store(true, Ordering::Relaxed);
    f();
    COUNT_ENABLED.store(false, Ordering::Relaxed);
    ALLOC_COUNT.load(Ordering::Relaxed)
}

/// Index of a card whose kind differs from card 0.
fn mismatch_partner(game: &GameController) -> usize {
    let board = game.state().board();
    let first = board.get(0).map(|c| c.kind());
    board
        .iter()
        .position(|c| Some(c.kind()) != first)
        .unwrap_or(1)
}

/// One full mismatch: two reveals, then frames until the flip-back ran.
fn mismatch_cycle(game: &mut GameController, canvas: &mut TileCanvas, other: usize) {
    let _ = game.apply_action(GameAction::Reveal(0));
    let _ = game.apply_action(GameAction::Reveal(other));
    for _ in 0..25 {
        let _ = game.advance(RENDER_INTERVAL_MS, canvas);
    }
}

#[test]
fn core_hot_paths_do_not_allocate() {
    // Setup (outside counting) so one-time allocations don't trip the gate.
    let mut game = GameController::new(1);
    game.initialize();
    let mut canvas = TileCanvas::new(game.state().board().len());
    let mut snap = GameSnapshot::default();
    let other = mismatch_partner(&game);

    // Warm-up.
    mismatch_cycle(&mut game, &mut canvas, other);
    game.snapshot_into(&mut snap);

    let allocs = with_alloc_counting(|| {
        // Idle frames should be allocation-free.
        for _ in 0..200 {
            let _ = game.advance(RENDER_INTERVAL_MS, &mut canvas);
        }

        // Mismatch scheduling and the flip-back timer reuse their storage.
        for _ in 0..50 {
            mismatch_cycle(&mut game, &mut canvas, other);
            let _ = game.take_last_event();
            game.snapshot_into(&mut snap);
        }

        // Reveals rejected while locked are pure checks.
        let _ = game.apply_action(GameAction::Reveal(0));
        let _ = game.apply_action(GameAction::Reveal(other));
        for i in 0..100 {
            let _ = game.apply_action(GameAction::Reveal(i));
        }
    });

    assert!(allocs == 0);
}
