//! Render-facing snapshot of the engine.
//!
//! A snapshot is a read-only copy of everything a renderer needs for one frame.
//! Renderers never see the grid or the scheduler directly, so nothing they do can
//! write back into engine state.

use crate::config::Layout;
use crate::grid::GridModel;
use crate::scheduler::AnimationScheduler;
use crate::spawn::FallingBlock;
use crate::types::{CellPos, Phase, TransitionKind, TurnSummary};

/// An active transition as seen by the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionView {
    pub kind: TransitionKind,
    pub progress: f32,
    /// Value drawn while in flight.
    pub value: u32,
    /// Current vertical position in fractional rows (equals the cell's row for merges).
    pub row_position: f32,
    pub scale: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CellView {
    /// Settled value; `None` when empty or while the value is travelling to
    /// the cell below.
    pub settled: Option<u32>,
    pub transition: Option<TransitionView>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FallingView {
    pub value: u32,
    pub column: u8,
    pub display_offset: f32,
    /// Fractional row of `display_offset` (negative above the grid).
    pub row_position: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineSnapshot {
    pub rows: u8,
    pub cols: u8,
    /// Row-major, `rows * cols` entries.
    pub cells: Vec<CellView>,
    pub falling: Option<FallingView>,
    pub pointer_column: u8,
    /// Score as last published (end of a resolve iteration).
    pub score: u32,
    /// Running total including merges of the current iteration.
    pub live_score: u32,
    pub unlocked: Vec<u32>,
    pub phase: Phase,
    pub game_active: bool,
    pub last_turn: TurnSummary,
    pub now_ms: u64,
}

impl EngineSnapshot {
    pub fn new(rows: u8, cols: u8) -> Self {
        Self {
            rows,
            cols,
            cells: vec![CellView::default(); rows as usize * cols as usize],
            falling: None,
            pointer_column: 0,
            score: 0,
            live_score: 0,
            unlocked: Vec::new(),
            phase: Phase::Idle,
            game_active: false,
            last_turn: TurnSummary::default(),
            now_ms: 0,
        }
    }

    pub fn cell(&self, row: u8, col: u8) -> &CellView {
        &self.cells[row as usize * self.cols as usize + col as usize]
    }

    /// Whether any transition is drawn this frame.
    pub fn is_animating(&self) -> bool {
        self.cells.iter().any(|c| c.transition.is_some())
    }

    /// Copy cell state out of the grid and scheduler.
    ///
    /// Reuses the existing cell buffer when the dimensions match.
    pub fn fill_cells(
        &mut self,
        grid: &GridModel,
        scheduler: &AnimationScheduler,
        layout: &Layout,
        now_ms: u64,
    ) {
        self.rows = grid.rows();
        self.cols = grid.cols();
        self.cells.resize(
            grid.rows() as usize * grid.cols() as usize,
            CellView::default(),
        );

        for row in 0..grid.rows() {
            for col in 0..grid.cols() {
                let pos = CellPos::new(row, col);
                let settled = if scheduler.is_vacating(pos) {
                    None
                } else {
                    grid.get(row, col)
                };
                let transition = scheduler.get(pos).map(|t| {
                    let progress = t.progress(now_ms);
                    let row_position = t
                        .offset_at(progress)
                        .map(|offset| layout.row_at(offset))
                        .unwrap_or(row as f32);
                    TransitionView {
                        kind: t.kind(),
                        progress,
                        value: t.display_value(),
                        row_position,
                        scale: t.scale_at(progress),
                    }
                });
                let idx = grid.index(row, col);
                self.cells[idx] = CellView {
                    settled,
                    transition,
                };
            }
        }
        self.now_ms = now_ms;
    }

    pub fn set_falling(&mut self, block: Option<&FallingBlock>, layout: &Layout) {
        self.falling = block.map(|b| FallingView {
            value: b.value,
            column: b.column,
            display_offset: b.display_offset,
            row_position: layout.row_at(b.display_offset),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::{CompletionAction, Motion, Transition};

    #[test]
    fn test_fill_cells_copies_settled_values() {
        let grid = GridModel::from_rows(&[&[0, 4], &[2, 8]]);
        let sched = AnimationScheduler::new(2, 2);
        let mut snap = EngineSnapshot::new(1, 1);
        snap.fill_cells(&grid, &sched, &Layout::default(), 0);

        assert_eq!(snap.cells.len(), 4);
        assert_eq!(snap.cell(0, 0).settled, None);
        assert_eq!(snap.cell(0, 1).settled, Some(4));
        assert_eq!(snap.cell(1, 1).settled, Some(8));
        assert!(!snap.is_animating());
    }

    #[test]
    fn test_gravity_source_is_hidden_while_in_flight() {
        let layout = Layout::default();
        let grid = GridModel::from_rows(&[&[4], &[0]]);
        let mut sched = AnimationScheduler::new(2, 1);
        sched
            .schedule(
                CellPos::new(1, 0),
                Transition {
                    start_ms: 0,
                    duration_ms: 100,
                    motion: Motion::Drop {
                        value: 4,
                        from_offset: layout.row_offset(0),
                        to_offset: layout.row_offset(1),
                    },
                    action: CompletionAction::Fall {
                        from: CellPos::new(0, 0),
                    },
                },
            )
            .unwrap();

        let mut snap = EngineSnapshot::new(2, 1);
        snap.fill_cells(&grid, &sched, &layout, 50);

        assert_eq!(snap.cell(0, 0).settled, None);
        let view = snap.cell(1, 0).transition.unwrap();
        assert_eq!(view.kind, TransitionKind::Drop);
        assert_eq!(view.value, 4);
        assert!((view.row_position - 0.5).abs() < 1e-5);
        assert_eq!(view.scale, 1.0);
    }
}
