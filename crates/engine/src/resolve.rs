//! Pure resolution planning: gravity steps and match detection.
//!
//! Both planners read a grid snapshot and return the transitions one wave of
//! resolution should schedule. Neither mutates anything, so the plan for a
//! given grid never depends on animation timing.

use merge_drop_core::GridModel;

use crate::types::CellPos;

/// One single-row gravity move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GravityStep {
    pub from: CellPos,
    pub to: CellPos,
    pub value: u32,
}

/// One pair of equal adjacent cells combining into `target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergePlan {
    /// The later cell of the pair (higher row, or higher column).
    pub target: CellPos,
    /// The earlier cell, cleared when the merge completes.
    pub source: CellPos,
    pub old_value: u32,
    pub new_value: u32,
}

/// Next gravity wave: at most one step per column.
///
/// In each column the lowest occupied cell with an empty cell below moves down
/// one row. Repeating waves until this returns nothing moves every floating cell
/// to rest, lowest first, one row at a time.
pub fn plan_gravity(grid: &GridModel) -> Vec<GravityStep> {
    let rows = grid.rows();
    let mut steps = Vec::new();
    if rows < 2 {
        return steps;
    }

    for col in 0..grid.cols() {
        for row in (0..rows - 1).rev() {
            let Some(value) = grid.get(row, col) else {
                continue;
            };
            if !grid.is_occupied(row + 1, col) {
                steps.push(GravityStep {
                    from: CellPos::new(row, col),
                    to: CellPos::new(row + 1, col),
                    value,
                });
                break;
            }
        }
    }
    steps
}

/// All merges of one detection pass, in scheduling order.
///
/// Vertical pairs come first (column by column, top to bottom), then horizontal
/// pairs (row by row, left to right). A cell joins at most one merge per pass:
/// a pair is skipped when either cell was already claimed by an earlier pair.
/// Skipped pairs are found again by the next pass.
pub fn detect_matches(grid: &GridModel) -> Vec<MergePlan> {
    let rows = grid.rows();
    let cols = grid.cols();
    let mut claimed = vec![false; rows as usize * cols as usize];
    let mut plans = Vec::new();

    let mut try_pair = |source: CellPos, target: CellPos, plans: &mut Vec<MergePlan>| {
        let (Some(a), Some(b)) = (grid.get_at(source), grid.get_at(target)) else {
            return;
        };
        if a != b {
            return;
        }
        let si = grid.index(source.row, source.col);
        let ti = grid.index(target.row, target.col);
        if claimed[si] || claimed[ti] {
            return;
        }
        claimed[si] = true;
        claimed[ti] = true;
        plans.push(MergePlan {
            target,
            source,
            old_value: b,
            new_value: b.saturating_mul(2),
        });
    };

    for col in 0..cols {
        for row in 1..rows {
            try_pair(CellPos::new(row - 1, col), CellPos::new(row, col), &mut plans);
        }
    }
    for row in 0..rows {
        for col in 1..cols {
            try_pair(CellPos::new(row, col - 1), CellPos::new(row, col), &mut plans);
        }
    }
    plans
}
