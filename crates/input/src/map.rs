//! Key and mouse mapping from terminal events to player commands.

use crate::types::PlayerCommand;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

/// Map keyboard input to player commands.
pub fn handle_key_event(key: KeyEvent) -> Option<PlayerCommand> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    match key.code {
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::Char('a') | KeyCode::Char('A') => {
            Some(PlayerCommand::ShiftPointer(-1))
        }
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('L') | KeyCode::Char('d') | KeyCode::Char('D') => {
            Some(PlayerCommand::ShiftPointer(1))
        }

        KeyCode::Char(' ') | KeyCode::Enter | KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('s') => {
            Some(PlayerCommand::DropAtPointer)
        }

        // 1-9 pick a column directly
        KeyCode::Char(c @ '1'..='9') => Some(PlayerCommand::DropInto(c as u8 - b'1')),

        KeyCode::Char('r') | KeyCode::Char('R') => Some(PlayerCommand::Restart),

        _ => None,
    }
}

/// Check if key should quit the game.
pub fn should_quit(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc)
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

/// Board columns as laid out on the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnHitbox {
    /// Screen x of the first column's left edge.
    pub left: u16,
    /// Screen y range covered by the board (inclusive top, exclusive bottom).
    pub top: u16,
    pub bottom: u16,
    /// Width of one column, gap included.
    pub pitch: u16,
    pub cols: u8,
}

impl ColumnHitbox {
    /// Column under screen x, clamped into range.
    ///
    /// Positions left of the board map to column 0, positions past the right
    /// edge map to the last column.
    pub fn column_at(&self, x: u16) -> u8 {
        let rel = x as f32 - self.left as f32;
        column_from_offset(rel, self.pitch as f32, self.cols)
    }

    pub fn contains_row(&self, y: u16) -> bool {
        y >= self.top && y < self.bottom
    }
}

/// `floor(offset / pitch)` clamped to `0..cols`.
pub fn column_from_offset(offset: f32, pitch: f32, cols: u8) -> u8 {
    if cols == 0 || pitch <= 0.0 {
        return 0;
    }
    let col = (offset / pitch).floor();
    col.clamp(0.0, (cols - 1) as f32) as u8
}

/// Map mouse input over the board to player commands.
///
/// Movement anywhere moves the pointer; a left click inside the board's rows
/// drops into the clicked column.
pub fn handle_mouse_event(mouse: MouseEvent, board: &ColumnHitbox) -> Option<PlayerCommand> {
    let col = board.column_at(mouse.column);
    match mouse.kind {
        MouseEventKind::Moved | MouseEventKind::Drag(_) => Some(PlayerCommand::PointAt(col)),
        MouseEventKind::Down(MouseButton::Left) if board.contains_row(mouse.row) => {
            Some(PlayerCommand::DropInto(col))
        }
        _ => None,
    }
}
