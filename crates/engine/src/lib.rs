//! Resolution engine
//!
//! Drives a [`merge_drop_core`] grid through player drops, gravity and merge
//! cascades. The engine is tick-driven: the host calls
//! [`ResolutionEngine::tick`] with elapsed milliseconds and reads frames out
//! through [`ResolutionEngine::snapshot_into`].
//!
//! ```
//! use merge_drop_engine::{EngineConfig, ResolutionEngine};
//!
//! let mut engine = ResolutionEngine::new(EngineConfig::default()).unwrap();
//! engine.start();
//! assert!(engine.on_column_chosen(0).unwrap());
//! while engine.is_processing() {
//!     engine.tick(16).unwrap();
//! }
//! assert_eq!(engine.grid().get(5, 0), Some(2));
//! ```

pub mod engine;
pub mod resolve;

pub use merge_drop_core as core;
pub use merge_drop_types as types;

pub use engine::ResolutionEngine;
pub use merge_drop_core::{ConfigError, EngineConfig, EngineSnapshot, TransitionConflict};
pub use resolve::{detect_matches, plan_gravity, GravityStep, MergePlan};
