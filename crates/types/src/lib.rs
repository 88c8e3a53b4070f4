//! Core types shared across the workspace.
//!
//! This crate contains pure data types and constants with no external dependencies.
//! Everything here is `Copy` (or cheap to clone) so it can cross crate boundaries
//! without borrowing concerns.

/// Default grid dimensions.
pub const DEFAULT_ROWS: u8 = 6;
pub const DEFAULT_COLS: u8 = 5;

/// Engine timing constants (in milliseconds).
pub const TICK_MS: u32 = 16;
pub const DROP_MS: u32 = 200;
pub const MERGE_MS: u32 = 300;

/// Layout constants (in board pixels).
///
/// The engine works in an abstract pixel space so that drop transitions can
/// interpolate vertical offsets the same way regardless of the final renderer.
pub const CELL_SIZE: f32 = 60.0;
pub const CELL_GAP: f32 = 8.0;
pub const BOARD_PADDING: f32 = 15.0;

/// Fraction of the remaining distance the falling-block preview covers per frame.
pub const PREVIEW_SMOOTHING: f32 = 0.2;

/// Pulse amplitude of a merge transition (scale peaks at `1 + MERGE_PULSE`).
pub const MERGE_PULSE: f32 = 0.2;

/// The value every game starts with as its only spawnable block.
pub const SEED_VALUE: u32 = 2;

/// A cell on the grid
///
/// - `None`: Empty cell
/// - `Some(v)`: Cell holding the power-of-two value `v`
pub type CellValue = Option<u32>;

/// Grid coordinate. Row 0 is the top row; column 0 is the leftmost column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellPos {
    pub row: u8,
    pub col: u8,
}

impl CellPos {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// Cell directly below (higher row index), if any.
    pub fn below(self, rows: u8) -> Option<Self> {
        if self.row + 1 < rows {
            Some(Self::new(self.row + 1, self.col))
        } else {
            None
        }
    }
}

/// Kind of an in-flight per-cell transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionKind {
    /// Vertical movement into the bound cell (player drop or one gravity step).
    Drop,
    /// Two equal cells combining into the bound cell.
    Merge,
}

impl TransitionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionKind::Drop => "drop",
            TransitionKind::Merge => "merge",
        }
    }
}

/// Turn state machine phase.
///
/// `Idle` is the only phase that accepts column choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Idle,
    Dropping,
    Resolving,
    GameOver,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Dropping => "dropping",
            Phase::Resolving => "resolving",
            Phase::GameOver => "game_over",
        }
    }

    /// Whether a turn is in progress (new column choices are rejected).
    pub fn is_processing(&self) -> bool {
        matches!(self, Phase::Dropping | Phase::Resolving)
    }
}

/// Summary of one completed turn (drop plus all cascades).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TurnSummary {
    /// Number of gravity+match iterations the resolve loop ran.
    pub passes: u32,
    /// Number of merges completed during the turn.
    pub merges: u32,
    /// Points gained during the turn.
    pub points: u32,
}

/// Engine-side notification for adapters.
///
/// Events are queued in the order they happen and drained by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineEvent {
    /// A player drop completed and wrote `value` into `pos`.
    Placed { pos: CellPos, value: u32 },
    /// A merge completed: `pos` now holds `value`, `source` was cleared.
    Merged {
        pos: CellPos,
        source: CellPos,
        value: u32,
    },
    /// A merge produced a value for the first time; it may now spawn.
    ValueUnlocked(u32),
    /// End of a resolve iteration; the presented score changed to `total`.
    ScorePublished(u32),
    /// The turn settled and control returned to the player.
    TurnFinished(TurnSummary),
    /// A spawn found its column's top cell occupied. Queued exactly once.
    GameOver { score: u32 },
}

/// Player intent decoded from keyboard or mouse input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerCommand {
    /// Move the pointer column by a signed step.
    ShiftPointer(i8),
    /// Move the pointer to an absolute column (mouse hover).
    PointAt(u8),
    /// Drop the falling block at the pointer column.
    DropAtPointer,
    /// Drop the falling block into a specific column.
    DropInto(u8),
    Restart,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_below_stops_at_bottom_row() {
        assert_eq!(CellPos::new(0, 2).below(6), Some(CellPos::new(1, 2)));
        assert_eq!(CellPos::new(5, 2).below(6), None);
    }

    #[test]
    fn only_dropping_and_resolving_are_processing() {
        assert!(!Phase::Idle.is_processing());
        assert!(Phase::Dropping.is_processing());
        assert!(Phase::Resolving.is_processing());
        assert!(!Phase::GameOver.is_processing());
    }
}
