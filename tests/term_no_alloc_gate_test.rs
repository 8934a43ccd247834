use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use memory_game::core::{GameController, GameSnapshot};
use memory_game::term::{FrameBuffer, GameView, HudView, TileCanvas, Viewport};
use memory_game::types::RENDER_INTERVAL_MS;

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

#[test]
fn term_view_render_does_not_allocate() {
    let mut game = GameController::new(1);
    game.initialize();
    let mut canvas = TileCanvas::new(game.state().board().len());
    let _ = game.advance(RENDER_INTERVAL_MS, &mut canvas);

    let view = GameView::default();
    let vp = Viewport::new(100, 30);
    let mut fb = FrameBuffer::new(vp.width, vp.height);
    let mut snap = GameSnapshot::default();
    let hud = HudView {
        cursor: Some(5),
        ..HudView::default()
    };

    // Warm-up.
    game.snapshot_into(&mut snap);
    view.render_into(&canvas, &snap, &hud, vp, &mut fb);

    let allocs = with_alloc_counting(|| {
        for _ in 0..100 {
            let _ = game.advance(RENDER_INTERVAL_MS, &mut canvas);
            game.snapshot_into(&mut snap);
            view.render_into(&canvas, &snap, &hud, vp, &mut fb);
        }
    });

    assert!(allocs == 0);
}
