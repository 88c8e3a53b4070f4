use criterion::{black_box, criterion_group, criterion_main, Criterion};
use merge_drop::core::{EngineConfig, EngineSnapshot, GridModel};
use merge_drop::engine::{detect_matches, plan_gravity, ResolutionEngine};

/// Checkerboard of 2/4 with a few equal pairs mixed in.
fn busy_grid() -> GridModel {
    let mut grid = GridModel::new(6, 5);
    for row in 0..6u8 {
        for col in 0..5u8 {
            let v = if (row + col) % 2 == 0 { 2 } else { 4 };
            grid.set(row, col, v);
        }
    }
    grid.set(5, 1, 2);
    grid.set(3, 3, 4);
    grid
}

fn floating_grid() -> GridModel {
    let mut grid = GridModel::new(6, 5);
    for col in 0..5u8 {
        grid.set(0, col, 2 << col);
        grid.set(1, col, 4 << col);
    }
    grid
}

fn bench_tick(c: &mut Criterion) {
    let mut engine = ResolutionEngine::new(EngineConfig::default().with_seed(12345)).unwrap();
    engine.start();

    c.bench_function("engine_tick_16ms", |b| {
        b.iter(|| {
            engine.tick(black_box(16)).unwrap();
        })
    });
}

fn bench_detect_matches(c: &mut Criterion) {
    let grid = busy_grid();
    c.bench_function("detect_matches_6x5", |b| {
        b.iter(|| detect_matches(black_box(&grid)))
    });
}

fn bench_plan_gravity(c: &mut Criterion) {
    let grid = floating_grid();
    c.bench_function("plan_gravity_6x5", |b| {
        b.iter(|| plan_gravity(black_box(&grid)))
    });
}

fn bench_full_turn(c: &mut Criterion) {
    c.bench_function("turn_with_cascade", |b| {
        b.iter(|| {
            let mut grid = GridModel::new(6, 5);
            grid.set(5, 0, 16);
            grid.set(4, 0, 8);
            grid.set(5, 1, 2);
            grid.set(4, 1, 2);
            grid.set(3, 1, 8);
            let mut engine =
                ResolutionEngine::with_grid(EngineConfig::default(), grid).unwrap();
            engine.queue_values([2]);
            engine.start();
            engine.on_column_chosen(4).unwrap();
            while engine.is_processing() {
                engine.tick(16).unwrap();
            }
            black_box(engine.score())
        })
    });
}

fn bench_snapshot(c: &mut Criterion) {
    let mut engine = ResolutionEngine::with_grid(EngineConfig::default(), busy_grid()).unwrap();
    engine.start();
    let mut snap = EngineSnapshot::new(6, 5);

    c.bench_function("snapshot_into", |b| {
        b.iter(|| {
            engine.snapshot_into(&mut snap);
            black_box(snap.score)
        })
    });
}

criterion_group!(
    benches,
    bench_tick,
    bench_detect_matches,
    bench_plan_gravity,
    bench_full_turn,
    bench_snapshot
);
criterion_main!(benches);
