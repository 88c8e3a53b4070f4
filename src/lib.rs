//! Merge Drop (workspace facade crate).
//!
//! Re-exports the workspace crates under one name so the binary, the
//! integration tests and the benches can write `merge_drop::{core, engine, ..}`
//! while the implementation lives under `crates/`.

pub use merge_drop_core as core;
pub use merge_drop_engine as engine;
pub use merge_drop_input as input;
pub use merge_drop_term as term;
pub use merge_drop_types as types;
