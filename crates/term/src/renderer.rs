//! TerminalRenderer: flushes a framebuffer to a real terminal.
//!
//! Frames are diffed against the previous one and only changed runs are
//! written. A resize (or [`TerminalRenderer::invalidate`]) forces a full redraw.

use std::io::{self, Write};

use anyhow::Result;

use crossterm::{
    cursor,
    event::{DisableMouseCapture, EnableMouseCapture},
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
    },
    terminal, QueueableCommand,
};

use crate::fb::{CellStyle, FrameBuffer, Rgb};

pub struct TerminalRenderer {
    stdout: io::Stdout,
    last: Option<FrameBuffer>,
    buf: Vec<u8>,
    mouse: bool,
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
            last: None,
            buf: Vec::with_capacity(64 * 1024),
            mouse: true,
        }
    }

    /// Skip mouse capture (keyboard-only play).
    pub fn without_mouse(mut self) -> Self {
        self.mouse = false;
        self
    }

    pub fn enter(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        self.buf.clear();
        self.buf.queue(terminal::EnterAlternateScreen)?;
        if self.mouse {
            self.buf.queue(EnableMouseCapture)?;
        }
        self.buf.queue(cursor::Hide)?;
        self.buf.queue(terminal::DisableLineWrap)?;
        self.flush_buf()?;
        Ok(())
    }

    pub fn exit(&mut self) -> Result<()> {
        self.buf.clear();
        self.buf.queue(ResetColor)?;
        self.buf.queue(SetAttribute(Attribute::Reset))?;
        if self.mouse {
            self.buf.queue(DisableMouseCapture)?;
        }
        self.buf.queue(terminal::EnableLineWrap)?;
        self.buf.queue(cursor::Show)?;
        self.buf.queue(terminal::LeaveAlternateScreen)?;
        self.flush_buf()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    /// Force the next draw to be a full redraw (e.g. after a resize event).
    pub fn invalidate(&mut self) {
        self.last = None;
    }

    /// Draw a framebuffer, swapping it into internal state.
    ///
    /// Callers keep one `FrameBuffer` and pass it in every frame. After the
    /// call `fb` holds the previous frame, ready to be cleared and redrawn.
    pub fn draw_swap(&mut self, fb: &mut FrameBuffer) -> Result<()> {
        self.buf.clear();
        let mut prev = match self.last.take() {
            Some(prev) if prev.width() == fb.width() && prev.height() == fb.height() => {
                encode_diff_into(&prev, fb, &mut self.buf)?;
                prev
            }
            Some(mut prev) => {
                encode_full_into(fb, &mut self.buf)?;
                prev.resize(fb.width(), fb.height());
                prev
            }
            None => {
                encode_full_into(fb, &mut self.buf)?;
                FrameBuffer::new(fb.width(), fb.height())
            }
        };
        self.flush_buf()?;

        std::mem::swap(&mut prev, fb);
        self.last = Some(prev);
        Ok(())
    }

    fn flush_buf(&mut self) -> Result<()> {
        self.stdout.write_all(&self.buf)?;
        self.stdout.flush()?;
        Ok(())
    }
}

/// Encode a full-frame redraw into `out`.
pub fn encode_full_into(fb: &FrameBuffer, out: &mut Vec<u8>) -> Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    out.queue(cursor::MoveTo(0, 0))?;

    let mut current_style: Option<CellStyle> = None;
    for y in 0..fb.height() {
        for x in 0..fb.width() {
            let cell = fb.get(x, y).unwrap_or_default();
            if current_style != Some(cell.style) {
                apply_style_into(out, cell.style)?;
                current_style = Some(cell.style);
            }
            out.queue(Print(cell.ch))?;
        }
        if y + 1 < fb.height() {
            out.queue(Print("\r\n"))?;
        }
    }

    out.queue(ResetColor)?;
    out.queue(SetAttribute(Attribute::Reset))?;
    Ok(())
}

/// Encode only the runs that changed between `prev` and `next` into `out`.
///
/// Writes nothing at all when the frames are identical.
pub fn encode_diff_into(prev: &FrameBuffer, next: &FrameBuffer, out: &mut Vec<u8>) -> Result<()> {
    let runs = changed_runs(prev, next);
    if runs.is_empty() {
        return Ok(());
    }

    let mut current_style: Option<CellStyle> = None;
    for (x, y, len) in runs {
        out.queue(cursor::MoveTo(x, y))?;
        for dx in 0..len {
            let cell = next.get(x + dx, y).unwrap_or_default();
            if current_style != Some(cell.style) {
                apply_style_into(out, cell.style)?;
                current_style = Some(cell.style);
            }
            out.queue(Print(cell.ch))?;
        }
    }

    out.queue(ResetColor)?;
    out.queue(SetAttribute(Attribute::Reset))?;
    Ok(())
}

fn apply_style_into(out: &mut Vec<u8>, style: CellStyle) -> Result<()> {
    out.queue(SetForegroundColor(rgb_to_color(style.fg)))?;
    out.queue(SetBackgroundColor(rgb_to_color(style.bg)))?;
    out.queue(SetAttribute(Attribute::Reset))?;
    if style.bold {
        out.queue(SetAttribute(Attribute::Bold))?;
    }
    if style.dim {
        out.queue(SetAttribute(Attribute::Dim))?;
    }
    Ok(())
}

fn rgb_to_color(rgb: Rgb) -> Color {
    Color::Rgb {
        r: rgb.r,
        g: rgb.g,
        b: rgb.b,
    }
}

/// `(x, y, len)` runs of cells that differ. Mismatched sizes mark every row dirty.
fn changed_runs(prev: &FrameBuffer, next: &FrameBuffer) -> Vec<(u16, u16, u16)> {
    let (w, h) = (next.width(), next.height());
    if prev.width() != w || prev.height() != h {
        return (0..h).map(|y| (0, y, w)).collect();
    }

    let mut runs = Vec::new();
    for y in 0..h {
        let mut start: Option<u16> = None;
        for x in 0..w {
            let dirty = prev.get(x, y) != next.get(x, y);
            match (dirty, start) {
                (true, None) => start = Some(x),
                (false, Some(s)) => {
                    runs.push((s, y, x - s));
                    start = None;
                }
                _ => {}
            }
        }
        if let Some(s) = start {
            runs.push((s, y, w - s));
        }
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fb::Cell;

    fn mark(fb: &mut FrameBuffer, x: u16, y: u16) {
        fb.set(
            x,
            y,
            Cell {
                ch: 'X',
                style: CellStyle::default(),
            },
        );
    }

    #[test]
    fn changed_runs_coalesce_adjacent_cells() {
        let a = FrameBuffer::new(6, 2);
        let mut b = FrameBuffer::new(6, 2);
        for x in 1..=3 {
            mark(&mut b, x, 0);
        }
        mark(&mut b, 5, 1);

        assert_eq!(changed_runs(&a, &b), vec![(1, 0, 3), (5, 1, 1)]);
    }

    #[test]
    fn resized_frame_is_fully_dirty() {
        let a = FrameBuffer::new(3, 1);
        let b = FrameBuffer::new(4, 2);
        assert_eq!(changed_runs(&a, &b), vec![(0, 0, 4), (0, 1, 4)]);
    }

    #[test]
    fn identical_frames_encode_nothing() {
        let a = FrameBuffer::new(4, 4);
        let mut out = Vec::new();
        encode_diff_into(&a, &a.clone(), &mut out).unwrap();
        assert!(out.is_empty());

        let mut b = a.clone();
        mark(&mut b, 2, 2);
        encode_diff_into(&a, &b, &mut out).unwrap();
        assert!(!out.is_empty());
    }
}
