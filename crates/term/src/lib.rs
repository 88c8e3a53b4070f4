//! Terminal "game renderer" module.
//!
//! A small, game-oriented rendering layer: the merge board is drawn into a
//! plain framebuffer that is diffed and flushed to a crossterm backend. No
//! widget toolkit is involved.
//!
//! Goals:
//! - Keep `core` deterministic and testable
//! - Render from a read-only [`core::EngineSnapshot`], never from engine state
//! - Allow precise control over cell aspect ratio

pub mod fb;
pub mod game_view;
pub mod renderer;

pub use merge_drop_core as core;
pub use merge_drop_types as types;

pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use game_view::{AnchorY, BoardGeometry, GameView, Viewport};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
