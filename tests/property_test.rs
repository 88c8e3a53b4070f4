//! Randomized games: invariants that must hold after every settled turn.

use proptest::prelude::*;

use merge_drop::core::{EngineConfig, GridModel};
use merge_drop::engine::{detect_matches, plan_gravity, ResolutionEngine};
use merge_drop::types::{CellPos, EngineEvent};

fn settle(engine: &mut ResolutionEngine) -> Result<(), TestCaseError> {
    for _ in 0..10_000 {
        if !engine.is_processing() {
            return Ok(());
        }
        if let Err(conflict) = engine.tick(16) {
            return Err(TestCaseError::fail(format!("{conflict}")));
        }
    }
    Err(TestCaseError::fail("engine did not settle"))
}

fn arb_grid() -> impl Strategy<Value = GridModel> {
    // Small exponents so equal neighbours are common.
    prop::collection::vec(prop::option::weighted(0.6, 1u32..4), 6 * 5).prop_map(|cells| {
        let mut grid = GridModel::new(6, 5);
        for (i, cell) in cells.into_iter().enumerate() {
            if let Some(exp) = cell {
                grid.set((i / 5) as u8, (i % 5) as u8, 1 << exp);
            }
        }
        grid
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn settled_turns_leave_a_stable_board(
        seed in any::<u32>(),
        cols in prop::collection::vec(0i32..5, 1..60),
    ) {
        let mut engine = ResolutionEngine::new(EngineConfig::default().with_seed(seed)).unwrap();
        engine.start();

        let mut last_score = 0;
        let mut last_unlocked = engine.unlocked().len();
        let mut merged_points = 0u32;

        for col in cols {
            if !engine.is_game_active() {
                break;
            }
            engine.on_column_chosen(col).unwrap();
            settle(&mut engine)?;

            let grid = engine.grid();
            prop_assert!(grid.is_settled(), "floating cell in {:?}", grid.to_rows());
            prop_assert!(!grid.has_adjacent_pair(), "unmerged pair in {:?}", grid.to_rows());
            prop_assert!(engine.scheduler().is_idle());
            for (_, value) in grid.occupied() {
                prop_assert!(engine.unlocked().contains(value));
            }

            prop_assert!(engine.score() >= last_score);
            prop_assert!(engine.unlocked().len() >= last_unlocked);
            prop_assert_eq!(engine.score(), engine.published_score());
            last_score = engine.score();
            last_unlocked = engine.unlocked().len();

            for event in engine.drain_events() {
                if let EngineEvent::Merged { value, .. } = event {
                    merged_points += value;
                }
            }
            prop_assert_eq!(merged_points, engine.score());
        }
    }

    #[test]
    fn match_pass_is_pure_and_claims_each_cell_once(grid in arb_grid()) {
        let first = detect_matches(&grid);
        prop_assert_eq!(&first, &detect_matches(&grid));

        let mut seen: Vec<CellPos> = Vec::new();
        for plan in &first {
            prop_assert!(!seen.contains(&plan.target));
            prop_assert!(!seen.contains(&plan.source));
            seen.push(plan.target);
            seen.push(plan.source);
            prop_assert_eq!(grid.get_at(plan.source), grid.get_at(plan.target));
            prop_assert_eq!(plan.new_value, plan.old_value * 2);
        }

        prop_assert_eq!(first.is_empty(), !grid.has_adjacent_pair());
    }

    #[test]
    fn gravity_waves_reach_a_settled_grid(grid in arb_grid()) {
        let mut grid = grid;
        let filled = grid.filled();
        for _ in 0..100 {
            let steps = plan_gravity(&grid);
            if steps.is_empty() {
                break;
            }
            let mut cols_seen = Vec::new();
            for step in steps {
                prop_assert!(!cols_seen.contains(&step.from.col));
                cols_seen.push(step.from.col);
                prop_assert_eq!(step.to.row, step.from.row + 1);
                grid.clear(step.from.row, step.from.col);
                grid.set(step.to.row, step.to.col, step.value);
            }
        }
        prop_assert!(grid.is_settled());
        prop_assert_eq!(grid.filled(), filled);
    }
}
