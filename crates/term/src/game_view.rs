//! GameView: maps an `EngineSnapshot` into a terminal framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested.

use crate::core::{CellView, EngineSnapshot, FallingView, TransitionView};
use crate::fb::{CellStyle, FrameBuffer, Rgb};
use crate::types::{Phase, TransitionKind};

const BOARD_BG: Rgb = Rgb::new(30, 30, 40);
const PANEL_BG: Rgb = Rgb::new(0, 0, 0);

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorY {
    Center,
    Top,
}

/// Where the board landed on screen for a given viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardGeometry {
    /// Top-left corner of the border.
    pub frame_x: u16,
    pub frame_y: u16,
    pub frame_w: u16,
    pub frame_h: u16,
    /// Top row of the preview strip above the frame.
    pub preview_y: u16,
    /// Screen x of column 0's left edge.
    pub columns_x: u16,
    /// Screen y of row 0's top edge.
    pub rows_y: u16,
    /// Terminal columns per board column (block plus gap).
    pub pitch: u16,
    pub cell_h: u16,
}

impl BoardGeometry {
    /// Screen rectangle `(x, y)` of a cell's top-left corner.
    pub fn cell_origin(&self, row: u8, col: u8) -> (u16, u16) {
        (
            self.columns_x + col as u16 * self.pitch,
            self.rows_y + row as u16 * self.cell_h,
        )
    }

    /// Column under screen x, or `None` outside the board's horizontal span.
    pub fn column_at(&self, x: u16, cols: u8) -> Option<u8> {
        if x < self.columns_x {
            return None;
        }
        let col = (x - self.columns_x) / self.pitch;
        (col < cols as u16).then_some(col as u8)
    }
}

/// A lightweight terminal renderer for the merge board.
pub struct GameView {
    /// Terminal columns per board column; the last one is left as a gap.
    cell_w: u16,
    /// Terminal rows per board row.
    cell_h: u16,
    anchor_y: AnchorY,
}

impl Default for GameView {
    fn default() -> Self {
        // 6x2 fits five digits and keeps cells roughly square.
        Self {
            cell_w: 6,
            cell_h: 2,
            anchor_y: AnchorY::Center,
        }
    }
}

impl GameView {
    pub fn new(cell_w: u16, cell_h: u16) -> Self {
        Self {
            cell_w: cell_w.max(2),
            cell_h: cell_h.max(1),
            anchor_y: AnchorY::Center,
        }
    }

    pub fn with_anchor_y(mut self, anchor_y: AnchorY) -> Self {
        self.anchor_y = anchor_y;
        self
    }

    /// Board placement for a `rows x cols` grid in `viewport`.
    pub fn geometry(&self, rows: u8, cols: u8, viewport: Viewport) -> BoardGeometry {
        // One column of inset on the left so gaps are symmetric.
        let board_px_w = cols as u16 * self.cell_w + 1;
        let board_px_h = rows as u16 * self.cell_h;
        let frame_w = board_px_w + 2;
        let frame_h = board_px_h + 2;
        let total_h = frame_h + self.cell_h;

        let frame_x = viewport.width.saturating_sub(frame_w) / 2;
        let preview_y = match self.anchor_y {
            AnchorY::Center => viewport.height.saturating_sub(total_h) / 2,
            AnchorY::Top => 0,
        };
        let frame_y = preview_y + self.cell_h;

        BoardGeometry {
            frame_x,
            frame_y,
            frame_w,
            frame_h,
            preview_y,
            columns_x: frame_x + 2,
            rows_y: frame_y + 1,
            pitch: self.cell_w,
            cell_h: self.cell_h,
        }
    }

    /// Render the snapshot into an existing framebuffer.
    ///
    /// Callers can reuse a framebuffer across frames and only resize when the
    /// terminal size changes.
    pub fn render_into(&self, snap: &EngineSnapshot, viewport: Viewport, fb: &mut FrameBuffer) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(CellStyle::default().into_cell(' '));

        let geo = self.geometry(snap.rows, snap.cols, viewport);

        let bg = CellStyle::new(Rgb::new(80, 80, 90), BOARD_BG);
        let border = CellStyle::new(Rgb::new(200, 200, 200), PANEL_BG);

        fb.fill_rect(
            geo.frame_x + 1,
            geo.frame_y + 1,
            geo.frame_w - 2,
            geo.frame_h - 2,
            ' ',
            bg,
        );
        self.draw_border(fb, &geo, border);

        for row in 0..snap.rows {
            for col in 0..snap.cols {
                let cell = snap.cell(row, col);
                match cell.settled {
                    Some(value) => self.draw_block(fb, &geo, row, col, value, false),
                    None => self.draw_empty_cell(fb, &geo, row, col),
                }
            }
        }

        // Transitions draw over settled cells.
        for row in 0..snap.rows {
            for col in 0..snap.cols {
                if let CellView {
                    transition: Some(t),
                    ..
                } = *snap.cell(row, col)
                {
                    self.draw_transition(fb, &geo, row, col, &t);
                }
            }
        }

        match snap.falling {
            Some(falling) if snap.game_active => self.draw_falling(fb, &geo, &falling),
            _ => {}
        }
        if snap.game_active && !snap.phase.is_processing() {
            self.draw_pointer(fb, &geo, snap.pointer_column);
        }

        self.draw_side_panel(fb, snap, viewport, &geo);

        if !snap.game_active && snap.phase == Phase::GameOver {
            self.draw_overlay_text(fb, &geo, 0, "GAME OVER");
            self.draw_overlay_text(fb, &geo, 1, "r: restart");
        }
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(&self, snap: &EngineSnapshot, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(snap, viewport, &mut fb);
        fb
    }

    fn draw_border(&self, fb: &mut FrameBuffer, geo: &BoardGeometry, style: CellStyle) {
        let (x, y, w, h) = (geo.frame_x, geo.frame_y, geo.frame_w, geo.frame_h);
        if w < 2 || h < 2 {
            return;
        }

        fb.put_char(x, y, '┌', style);
        fb.put_char(x + w - 1, y, '┐', style);
        fb.put_char(x, y + h - 1, '└', style);
        fb.put_char(x + w - 1, y + h - 1, '┘', style);

        for dx in 1..w - 1 {
            fb.put_char(x + dx, y, '─', style);
            fb.put_char(x + dx, y + h - 1, '─', style);
        }
        for dy in 1..h - 1 {
            fb.put_char(x, y + dy, '│', style);
            fb.put_char(x + w - 1, y + dy, '│', style);
        }
    }

    fn block_w(&self) -> u16 {
        self.cell_w - 1
    }

    fn draw_empty_cell(&self, fb: &mut FrameBuffer, geo: &BoardGeometry, row: u8, col: u8) {
        let style = CellStyle::new(Rgb::new(90, 90, 100), BOARD_BG).dim();
        let (x, y) = geo.cell_origin(row, col);
        fb.put_char(x + self.block_w() / 2, y + (self.cell_h - 1) / 2, '·', style);
    }

    /// Draw a block whose top edge sits at screen row `y`.
    fn draw_block_at(&self, fb: &mut FrameBuffer, x: u16, y: u16, value: u32, highlight: bool) {
        let lightness = if highlight { 0.6 } else { 0.45 };
        let fill = Rgb::for_value(value, lightness);
        let style = CellStyle::new(Rgb::new(255, 255, 255), fill).bold();
        fb.fill_rect(x, y, self.block_w(), self.cell_h, ' ', style);
        fb.put_str_centered(x, y + (self.cell_h - 1) / 2, self.block_w(), &value.to_string(), style);
    }

    fn draw_block(
        &self,
        fb: &mut FrameBuffer,
        geo: &BoardGeometry,
        row: u8,
        col: u8,
        value: u32,
        highlight: bool,
    ) {
        let (x, y) = geo.cell_origin(row, col);
        self.draw_block_at(fb, x, y, value, highlight);
    }

    fn draw_transition(
        &self,
        fb: &mut FrameBuffer,
        geo: &BoardGeometry,
        row: u8,
        col: u8,
        t: &TransitionView,
    ) {
        match t.kind {
            TransitionKind::Drop => {
                // The cell it is headed for stays empty until it lands.
                self.clear_cell(fb, geo, row, col);
                let (x, _) = geo.cell_origin(row, col);
                let dy = (t.row_position.max(0.0) * self.cell_h as f32).round() as u16;
                self.draw_block_at(fb, x, geo.rows_y + dy, t.value, false);
            }
            TransitionKind::Merge => {
                self.draw_block(fb, geo, row, col, t.value, t.scale > 1.1);
            }
        }
    }

    fn clear_cell(&self, fb: &mut FrameBuffer, geo: &BoardGeometry, row: u8, col: u8) {
        let (x, y) = geo.cell_origin(row, col);
        fb.fill_rect(x, y, self.block_w(), self.cell_h, ' ', CellStyle::new(BOARD_BG, BOARD_BG));
    }

    fn draw_falling(&self, fb: &mut FrameBuffer, geo: &BoardGeometry, falling: &FallingView) {
        // Preview strip is one cell tall; the block eases from its top toward
        // its bottom edge as it settles above the board.
        let settle = (falling.row_position + 1.0).clamp(0.0, 1.0);
        let dy = (settle * (self.cell_h - 1) as f32).round() as u16;
        let x = geo.columns_x + falling.column as u16 * geo.pitch;
        let fill = Rgb::for_value(falling.value, 0.45);
        let style = CellStyle::new(Rgb::new(255, 255, 255), fill).bold();
        fb.fill_rect(x, geo.preview_y + dy, self.block_w(), 1, ' ', style);
        fb.put_str_centered(x, geo.preview_y + dy, self.block_w(), &falling.value.to_string(), style);
    }

    fn draw_pointer(&self, fb: &mut FrameBuffer, geo: &BoardGeometry, column: u8) {
        let style = CellStyle::new(Rgb::new(200, 200, 200), PANEL_BG);
        let x = geo.columns_x + column as u16 * geo.pitch + self.block_w() / 2;
        fb.put_char(x, geo.frame_y, '▼', style);
    }

    fn draw_side_panel(
        &self,
        fb: &mut FrameBuffer,
        snap: &EngineSnapshot,
        viewport: Viewport,
        geo: &BoardGeometry,
    ) {
        let panel_x = geo.frame_x.saturating_add(geo.frame_w).saturating_add(2);
        if panel_x >= viewport.width {
            return;
        }
        let panel_w = viewport.width - panel_x;
        if panel_w < 12 {
            return;
        }

        let label = CellStyle::new(Rgb::new(220, 220, 220), PANEL_BG).bold();
        let value = CellStyle::new(Rgb::new(200, 200, 200), PANEL_BG);

        let mut y = geo.frame_y;
        fb.put_str(panel_x, y, "SCORE", label);
        y = y.saturating_add(1);
        fb.put_u32(panel_x, y, snap.score, value);
        y = y.saturating_add(2);

        fb.put_str(panel_x, y, "UNLOCKED", label);
        y = y.saturating_add(1);
        let mut x = panel_x;
        for &v in &snap.unlocked {
            let text = v.to_string();
            let w = text.chars().count() as u16;
            if x + w > viewport.width {
                y = y.saturating_add(1);
                x = panel_x;
            }
            let style = CellStyle::new(Rgb::for_value(v, 0.6), PANEL_BG);
            fb.put_str(x, y, &text, style);
            x += w + 1;
        }
        y = y.saturating_add(2);

        fb.put_str(panel_x, y, "LAST TURN", label);
        y = y.saturating_add(1);
        let turn = snap.last_turn;
        fb.put_str(panel_x, y, "passes", value.dim());
        fb.put_u32(panel_x + 8, y, turn.passes, value);
        y = y.saturating_add(1);
        fb.put_str(panel_x, y, "merges", value.dim());
        fb.put_u32(panel_x + 8, y, turn.merges, value);
        y = y.saturating_add(1);
        fb.put_str(panel_x, y, "points", value.dim());
        fb.put_u32(panel_x + 8, y, turn.points, value);
        y = y.saturating_add(2);

        fb.put_str(panel_x, y, "STATE", label);
        y = y.saturating_add(1);
        fb.put_str(panel_x, y, snap.phase.as_str(), value);
    }

    fn draw_overlay_text(&self, fb: &mut FrameBuffer, geo: &BoardGeometry, line: u16, text: &str) {
        let mid_y = geo.frame_y.saturating_add(geo.frame_h / 2).saturating_add(line);
        let style = CellStyle::new(Rgb::new(255, 255, 255), PANEL_BG).bold();
        fb.put_str_centered(geo.frame_x, mid_y, geo.frame_w, text, style);
    }
}
