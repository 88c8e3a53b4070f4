//! Core model - pure, deterministic, and testable
//!
//! This crate holds the building blocks the resolution engine drives. It has
//! **no dependencies** on UI, terminals, or I/O, which keeps it:
//!
//! - **Deterministic**: the same seed and inputs replay the same game
//! - **Testable**: every component is exercised in isolation
//! - **Portable**: runs headless, in a terminal, or behind any other front end
//!
//! # Module Structure
//!
//! - [`grid`]: the authoritative `rows x cols` cell values (flat buffer)
//! - [`scheduler`]: per-cell timed transitions with exactly-once completion
//! - [`score`]: running and published score
//! - [`spawn`]: unlocked values, the falling block, next-value selection
//! - [`rng`]: small deterministic LCG
//! - [`config`]: per-engine dimensions, timings and layout
//! - [`snapshot`]: read-only per-frame view for renderers
//!
//! # Ownership
//!
//! The grid and the scheduler each own one flat buffer indexed by
//! `row * cols + col`. Only the engine holds them mutably; renderers get a
//! [`EngineSnapshot`] copy.
//!
//! # Example
//!
//! ```
//! use merge_drop_core::{AnimationScheduler, CompletionAction, GridModel, Motion, Transition};
//! use merge_drop_core::types::CellPos;
//!
//! let mut grid = GridModel::new(6, 5);
//! let mut scheduler = AnimationScheduler::new(6, 5);
//!
//! let pos = CellPos::new(5, 0);
//! scheduler
//!     .schedule(
//!         pos,
//!         Transition {
//!             start_ms: 0,
//!             duration_ms: 200,
//!             motion: Motion::Drop { value: 2, from_offset: 15.0, to_offset: 355.0 },
//!             action: CompletionAction::Place { value: 2 },
//!         },
//!     )
//!     .unwrap();
//!
//! let mut done = Vec::new();
//! scheduler.advance(200, &mut done);
//! for c in &done {
//!     if let CompletionAction::Place { value } = c.action {
//!         grid.set(c.pos.row, c.pos.col, value);
//!     }
//! }
//! assert_eq!(grid.get(5, 0), Some(2));
//! ```

pub mod config;
pub mod grid;
pub mod rng;
pub mod scheduler;
pub mod score;
pub mod snapshot;
pub mod spawn;

pub use merge_drop_types as types;

// Re-export commonly used types for convenience
pub use config::{ConfigError, EngineConfig, Layout};
pub use grid::GridModel;
pub use rng::SimpleRng;
pub use scheduler::{
    AnimationScheduler, Completion, CompletionAction, Motion, Transition, TransitionConflict,
    TransitionId,
};
pub use score::ScoreTracker;
pub use snapshot::{CellView, EngineSnapshot, FallingView, TransitionView};
pub use spawn::{FallingBlock, SpawnController, SpawnOutcome, UnlockedValues};
