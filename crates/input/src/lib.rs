//! Terminal input module (engine-facing).
//!
//! Maps `crossterm` key and mouse events into
//! [`crate::types::PlayerCommand`]. Screen geometry comes in through
//! [`ColumnHitbox`], so this crate does not depend on any renderer.

pub mod map;

pub use merge_drop_types as types;

pub use map::{column_from_offset, handle_key_event, handle_mouse_event, should_quit, ColumnHitbox};
