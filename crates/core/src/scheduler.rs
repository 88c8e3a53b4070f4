//! Animation scheduler - timed per-cell transitions
//!
//! At most one transition may be bound to a cell at a time. A transition that
//! moves or consumes another cell (gravity source, merge source) also reserves
//! that source cell until it completes, so two in-flight transitions never touch
//! the same cell.
//!
//! The scheduler never touches the grid. When a transition's duration has
//! elapsed, [`AnimationScheduler::advance`] unbinds it and hands its
//! [`CompletionAction`] back to the caller, exactly once. Whoever drives the
//! scheduler applies the action to the model.

use std::f32::consts::PI;
use std::fmt;

use crate::types::{CellPos, TransitionKind, MERGE_PULSE};

/// Completion signal for a scheduled transition.
///
/// Ids are unique per scheduler and increase monotonically. A transition's id
/// shows up in exactly one [`Completion`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransitionId(u64);

impl TransitionId {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Interpolation parameters of a transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Motion {
    /// Linear vertical move in board pixels.
    Drop {
        value: u32,
        from_offset: f32,
        to_offset: f32,
    },
    /// Pulse in place while `old_value` becomes `new_value`.
    Merge { old_value: u32, new_value: u32 },
}

/// The grid mutation a transition performs when it completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionAction {
    /// Write `value` into the bound cell (player drop).
    Place { value: u32 },
    /// Move the value at `from` into the bound cell and clear `from` (gravity step).
    Fall { from: CellPos },
    /// Write `value` into the bound cell and clear `source`.
    Merge { source: CellPos, value: u32 },
}

impl CompletionAction {
    /// The other cell this action touches, if any.
    pub fn source(&self) -> Option<CellPos> {
        match *self {
            CompletionAction::Place { .. } => None,
            CompletionAction::Fall { from } => Some(from),
            CompletionAction::Merge { source, .. } => Some(source),
        }
    }
}

/// One in-flight per-cell visual change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub start_ms: u64,
    pub duration_ms: u32,
    pub motion: Motion,
    pub action: CompletionAction,
}

impl Transition {
    pub fn kind(&self) -> TransitionKind {
        match self.motion {
            Motion::Drop { .. } => TransitionKind::Drop,
            Motion::Merge { .. } => TransitionKind::Merge,
        }
    }

    /// `clamp((now - start) / duration, 0, 1)`. Zero-length transitions report 1.
    pub fn progress(&self, now_ms: u64) -> f32 {
        if self.duration_ms == 0 {
            return 1.0;
        }
        let elapsed = now_ms.saturating_sub(self.start_ms) as f32;
        (elapsed / self.duration_ms as f32).clamp(0.0, 1.0)
    }

    pub fn is_finished(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.start_ms) >= self.duration_ms as u64
    }

    /// Value the renderer shows for this transition.
    pub fn display_value(&self) -> u32 {
        match self.motion {
            Motion::Drop { value, .. } => value,
            Motion::Merge { new_value, .. } => new_value,
        }
    }

    /// Interpolated vertical offset for drops; `None` for merges.
    pub fn offset_at(&self, progress: f32) -> Option<f32> {
        match self.motion {
            Motion::Drop {
                from_offset,
                to_offset,
                ..
            } => Some(from_offset + (to_offset - from_offset) * progress),
            Motion::Merge { .. } => None,
        }
    }

    /// Scale factor: merges pulse up and back to 1, drops stay at 1.
    pub fn scale_at(&self, progress: f32) -> f32 {
        match self.motion {
            Motion::Drop { .. } => 1.0,
            Motion::Merge { .. } => 1.0 + MERGE_PULSE * (progress * PI).sin(),
        }
    }
}

/// A transition that just finished, unbound from its cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub id: TransitionId,
    pub pos: CellPos,
    pub action: CompletionAction,
}

/// Attempt to bind a transition to a cell that already has one in flight
/// (or is reserved as the source of one).
///
/// This is an invariant violation: a correctly sequenced engine never triggers it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionConflict {
    pub pos: CellPos,
}

impl fmt::Display for TransitionConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "transition conflict at cell ({}, {})",
            self.pos.row, self.pos.col
        )
    }
}

impl std::error::Error for TransitionConflict {}

#[derive(Debug, Clone, Copy)]
struct Bound {
    id: TransitionId,
    transition: Transition,
}

/// Per-cell transition slots over a flat `row * cols + col` buffer.
#[derive(Debug, Clone)]
pub struct AnimationScheduler {
    rows: u8,
    cols: u8,
    slots: Vec<Option<Bound>>,
    /// Source cells of in-flight transitions.
    reserved: Vec<bool>,
    next_id: u64,
    in_flight: usize,
}

impl AnimationScheduler {
    pub fn new(rows: u8, cols: u8) -> Self {
        let len = rows as usize * cols as usize;
        Self {
            rows,
            cols,
            slots: vec![None; len],
            reserved: vec![false; len],
            next_id: 0,
            in_flight: 0,
        }
    }

    #[inline(always)]
    fn index(&self, pos: CellPos) -> usize {
        assert!(
            pos.row < self.rows && pos.col < self.cols,
            "cell ({}, {}) outside {}x{} scheduler",
            pos.row,
            pos.col,
            self.rows,
            self.cols
        );
        (pos.row as usize) * (self.cols as usize) + (pos.col as usize)
    }

    fn is_busy(&self, idx: usize) -> bool {
        self.slots[idx].is_some() || self.reserved[idx]
    }

    /// Bind `transition` to `pos`.
    ///
    /// Fails without side effects if `pos` (or the transition's source cell) is
    /// already bound or reserved.
    pub fn schedule(
        &mut self,
        pos: CellPos,
        transition: Transition,
    ) -> Result<TransitionId, TransitionConflict> {
        let idx = self.index(pos);
        if self.is_busy(idx) {
            return Err(TransitionConflict { pos });
        }

        let source_idx = match transition.action.source() {
            Some(src) => {
                let sidx = self.index(src);
                if sidx == idx || self.is_busy(sidx) {
                    return Err(TransitionConflict { pos: src });
                }
                Some(sidx)
            }
            None => None,
        };

        let id = TransitionId(self.next_id);
        self.next_id += 1;

        self.slots[idx] = Some(Bound { id, transition });
        if let Some(sidx) = source_idx {
            self.reserved[sidx] = true;
        }
        self.in_flight += 1;
        Ok(id)
    }

    /// Unbind every transition whose duration has elapsed at `now_ms`.
    ///
    /// Completions are appended to `out` in row-major cell order. Each
    /// transition is reported once; after that its cell is free again.
    pub fn advance(&mut self, now_ms: u64, out: &mut Vec<Completion>) {
        if self.in_flight == 0 {
            return;
        }

        let cols = self.cols as usize;
        for idx in 0..self.slots.len() {
            let finished = matches!(
                self.slots[idx],
                Some(bound) if bound.transition.is_finished(now_ms)
            );
            if !finished {
                continue;
            }
            let Some(bound) = self.slots[idx].take() else {
                continue;
            };
            if let Some(src) = bound.transition.action.source() {
                let sidx = self.index(src);
                self.reserved[sidx] = false;
            }
            self.in_flight -= 1;
            out.push(Completion {
                id: bound.id,
                pos: CellPos::new((idx / cols) as u8, (idx % cols) as u8),
                action: bound.transition.action,
            });
        }
    }

    /// Transition bound to `pos`, if any.
    pub fn get(&self, pos: CellPos) -> Option<&Transition> {
        self.slots[self.index(pos)].as_ref().map(|b| &b.transition)
    }

    /// Progress of the transition bound to `pos`.
    pub fn progress(&self, pos: CellPos, now_ms: u64) -> Option<f32> {
        self.get(pos).map(|t| t.progress(now_ms))
    }

    /// Whether `pos` is the source cell of an in-flight transition.
    pub fn is_reserved(&self, pos: CellPos) -> bool {
        self.reserved[self.index(pos)]
    }

    /// Whether `pos` is the source of an in-flight gravity step, i.e. its
    /// value is currently shown travelling into the cell below.
    pub fn is_vacating(&self, pos: CellPos) -> bool {
        if !self.is_reserved(pos) {
            return false;
        }
        match pos.below(self.rows) {
            Some(below) => matches!(
                self.get(below),
                Some(t) if t.action == CompletionAction::Fall { from: pos }
            ),
            None => false,
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn is_idle(&self) -> bool {
        self.in_flight == 0
    }
}
