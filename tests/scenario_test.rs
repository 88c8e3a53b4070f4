//! End-to-end turns driven through the public engine API.

use merge_drop::core::{EngineConfig, GridModel};
use merge_drop::engine::ResolutionEngine;
use merge_drop::types::{CellPos, EngineEvent, Phase};

const STEP_MS: u32 = 16;

/// Tick until the turn is over. Panics if the engine never settles.
fn settle(engine: &mut ResolutionEngine) {
    for _ in 0..10_000 {
        if !engine.is_processing() && engine.scheduler().is_idle() {
            return;
        }
        engine.tick(STEP_MS).expect("no transition conflicts");
    }
    panic!("engine did not settle");
}

fn drop_and_settle(engine: &mut ResolutionEngine, col: i32) {
    assert_eq!(engine.on_column_chosen(col), Ok(true), "drop into {col}");
    settle(engine);
}

fn scripted_engine(values: &[u32]) -> ResolutionEngine {
    let mut engine = ResolutionEngine::new(EngineConfig::default()).unwrap();
    engine.queue_values(values.iter().copied());
    engine.start();
    engine
}

#[test]
fn test_vertical_pair_merges_into_lower_cell() {
    let mut engine = scripted_engine(&[2, 2]);

    drop_and_settle(&mut engine, 0);
    assert_eq!(engine.grid().get(5, 0), Some(2));
    assert_eq!(engine.score(), 0);

    drop_and_settle(&mut engine, 0);
    assert_eq!(engine.grid().get(5, 0), Some(4));
    assert_eq!(engine.grid().get(4, 0), None);
    assert_eq!(engine.score(), 4);
    assert_eq!(engine.published_score(), 4);
    assert_eq!(engine.unlocked().as_slice(), &[2, 4]);
    assert_eq!(engine.grid().filled(), 1);
}

#[test]
fn test_stacked_merges_chain_within_one_turn() {
    let mut engine = scripted_engine(&[2, 2, 2, 2]);
    for _ in 0..4 {
        drop_and_settle(&mut engine, 0);
    }

    // 2+2 -> 4, then 2 on 4, then 2+2 -> 4 which meets the 4 below -> 8
    assert_eq!(engine.grid().get(5, 0), Some(8));
    assert_eq!(engine.grid().filled(), 1);
    assert_eq!(engine.score(), 4 + 4 + 8);
    assert_eq!(engine.last_turn().merges, 2);
    assert_eq!(engine.last_turn().passes, 3);
}

#[test]
fn test_horizontal_pair_merges_into_right_cell() {
    let mut engine = scripted_engine(&[2, 2]);

    drop_and_settle(&mut engine, 0);
    drop_and_settle(&mut engine, 1);

    assert_eq!(engine.grid().get(5, 1), Some(4));
    assert_eq!(engine.grid().get(5, 0), None);
    assert_eq!(engine.score(), 4);
}

#[test]
fn test_cascade_gravity_then_horizontal_merge() {
    let grid = GridModel::from_rows(&[
        &[0, 0, 0, 0, 0],
        &[0, 0, 0, 0, 0],
        &[0, 0, 0, 0, 0],
        &[0, 8, 0, 0, 0],
        &[8, 2, 0, 0, 0],
        &[16, 2, 0, 0, 0],
    ]);
    let mut engine = ResolutionEngine::with_grid(EngineConfig::default(), grid).unwrap();
    engine.queue_values([2]);
    engine.set_pointer_column(4);
    engine.start();

    drop_and_settle(&mut engine, 4);

    assert_eq!(
        engine.grid().to_rows(),
        vec![
            vec![0, 0, 0, 0, 0],
            vec![0, 0, 0, 0, 0],
            vec![0, 0, 0, 0, 0],
            vec![0, 0, 0, 0, 0],
            vec![0, 16, 0, 0, 0],
            vec![16, 4, 0, 0, 2],
        ]
    );
    assert_eq!(engine.score(), 4 + 16);

    let turn = engine.last_turn();
    assert_eq!(turn.merges, 2);
    assert_eq!(turn.points, 20);
    assert!(turn.passes >= 2);

    let merged: Vec<(CellPos, u32)> = engine
        .drain_events()
        .into_iter()
        .filter_map(|e| match e {
            EngineEvent::Merged { pos, value, .. } => Some((pos, value)),
            _ => None,
        })
        .collect();
    assert_eq!(
        merged,
        vec![(CellPos::new(5, 1), 4), (CellPos::new(4, 1), 16)]
    );
}

#[test]
fn test_full_column_rejects_drop() {
    let grid = GridModel::from_rows(&[
        &[2, 0, 0, 0, 0],
        &[4, 0, 0, 0, 0],
        &[2, 0, 0, 0, 0],
        &[4, 0, 0, 0, 0],
        &[2, 0, 0, 0, 0],
        &[4, 0, 0, 0, 0],
    ]);
    let mut engine = ResolutionEngine::with_grid(EngineConfig::default(), grid.clone()).unwrap();
    engine.set_pointer_column(1);
    engine.start();

    assert_eq!(engine.on_column_chosen(0), Ok(false));
    assert_eq!(engine.phase(), Phase::Idle);
    assert!(engine.scheduler().is_idle());
    assert_eq!(engine.grid(), &grid);

    // The falling block is still available for another column.
    assert_eq!(engine.on_column_chosen(1), Ok(true));
}

#[test]
fn test_topped_out_spawn_column_ends_game_once() {
    let grid = GridModel::from_rows(&[
        &[0, 0, 0, 0, 0],
        &[4, 0, 0, 0, 0],
        &[8, 0, 0, 0, 0],
        &[4, 0, 0, 0, 0],
        &[8, 0, 0, 0, 0],
        &[4, 0, 0, 0, 0],
    ]);
    let mut engine = ResolutionEngine::with_grid(EngineConfig::default(), grid).unwrap();
    engine.queue_values([2]);
    engine.start();
    assert!(engine.is_game_active());

    drop_and_settle(&mut engine, 0);
    assert_eq!(engine.grid().get(0, 0), Some(2));
    assert!(!engine.is_game_active());
    assert_eq!(engine.phase(), Phase::GameOver);

    // Further input and time change nothing.
    assert_eq!(engine.on_column_chosen(1), Ok(false));
    for _ in 0..50 {
        engine.tick(STEP_MS).unwrap();
    }
    assert_eq!(engine.grid().get(5, 1), None);

    let game_overs = engine
        .drain_events()
        .into_iter()
        .filter(|e| matches!(e, EngineEvent::GameOver { .. }))
        .count();
    assert_eq!(game_overs, 1);
}

#[test]
fn test_game_over_on_start_when_spawn_column_full() {
    let grid = GridModel::from_rows(&[&[2, 0], &[4, 0]]);
    let mut engine = ResolutionEngine::with_grid(EngineConfig::default(), grid).unwrap();
    engine.start();

    assert!(!engine.is_game_active());
    assert_eq!(
        engine.drain_events(),
        vec![EngineEvent::GameOver { score: 0 }]
    );
}

#[test]
fn test_intermediate_frames_show_drop_in_flight() {
    let mut engine = scripted_engine(&[2]);
    engine.on_column_chosen(3).unwrap();

    let mut last_row = -1.0f32;
    while engine.phase() == Phase::Dropping {
        let snap = engine.snapshot();
        if let Some(view) = snap.cell(5, 3).transition {
            assert!(view.row_position >= last_row);
            assert!(view.row_position <= 5.0);
            last_row = view.row_position;
        }
        assert_eq!(snap.cell(5, 3).settled, None);
        engine.tick(STEP_MS).unwrap();
    }
    assert!(last_row > 4.0);
    assert_eq!(engine.grid().get(5, 3), Some(2));
}

#[test]
fn test_same_seed_replays_same_game() {
    let play = || {
        let config = EngineConfig::default().with_seed(7);
        let mut engine = ResolutionEngine::new(config).unwrap();
        engine.start();
        for col in [0, 1, 0, 2, 1, 0, 3, 4, 4, 2, 1, 0] {
            if !engine.is_game_active() {
                break;
            }
            engine.on_column_chosen(col).unwrap();
            settle(&mut engine);
        }
        (engine.grid().clone(), engine.score())
    };
    assert_eq!(play(), play());
}
