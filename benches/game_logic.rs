use criterion::{black_box, criterion_group, criterion_main, Criterion};
use memory_game::adapter::build_observation;
use memory_game::core::{Board, FnSurface, GameController, GameRng, GameSnapshot};
use memory_game::types::{FLIP_BACK_DELAY_MS, RENDER_INTERVAL_MS};

fn bench_deal(c: &mut Criterion) {
    let mut rng = GameRng::new(12345);

    c.bench_function("deal_standard_board", |b| {
        b.iter(|| black_box(Board::standard(&mut rng)))
    });
}

fn bench_advance_frame(c: &mut Criterion) {
    let mut game = GameController::new(12345);
    game.initialize();
    let mut surface = FnSurface::new(
        |text: &str| {
            black_box(text);
        },
        |tile, pos| {
            black_box((tile, pos));
        },
    );

    c.bench_function("advance_one_frame", |b| {
        b.iter(|| {
            game.advance(black_box(RENDER_INTERVAL_MS), &mut surface);
        })
    });
}

fn bench_mismatch_cycle(c: &mut Criterion) {
    let mut game = GameController::new(12345);
    game.initialize();
    let mut surface = FnSurface::new(|_: &str| {}, |_, _| {});

    // Two cards of different kinds, found once up front.
    let kinds: Vec<_> = game.state().board().iter().map(|card| card.kind()).collect();
    let other = kinds.iter().position(|&k| k != kinds[0]).unwrap_or(1);

    c.bench_function("reveal_mismatch_and_flip_back", |b| {
        b.iter(|| {
            game.request_reveal(black_box(0));
            game.request_reveal(black_box(other));
            game.advance(FLIP_BACK_DELAY_MS, &mut surface);
        })
    });
}

fn bench_snapshot_into(c: &mut Criterion) {
    let mut game = GameController::new(12345);
    game.initialize();
    game.request_reveal(0);
    let mut snap = GameSnapshot::default();

    c.bench_function("snapshot_into", |b| {
        b.iter(|| {
            game.snapshot_into(black_box(&mut snap));
        })
    });
}

fn bench_build_observation(c: &mut Criterion) {
    let mut game = GameController::new(12345);
    game.initialize();
    game.request_reveal(0);
    let snap = game.snapshot();

    c.bench_function("build_observation", |b| {
        b.iter(|| black_box(build_observation(black_box(&snap), 1, None)))
    });
}

criterion_group!(
    benches,
    bench_deal,
    bench_advance_frame,
    bench_mismatch_cycle,
    bench_snapshot_into,
    bench_build_observation
);
criterion_main!(benches);
