//! Grid module - the authoritative cell values
//!
//! The grid is a fixed `rows x cols` matrix stored as a flat buffer
//! (`row * cols + col`). Row 0 is the top row, so "down" means a higher row index.
//!
//! Mutations are plain synchronous writes. Callers are expected to mutate the
//! grid only from a completed transition's action; the grid itself does not
//! enforce that. Out-of-range coordinates are programming errors and panic.

use crate::types::{CellPos, CellValue};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridModel {
    rows: u8,
    cols: u8,
    /// Flat array of cells, row-major order (row * cols + col)
    cells: Vec<CellValue>,
}

impl GridModel {
    /// Create a new empty grid.
    pub fn new(rows: u8, cols: u8) -> Self {
        assert!(rows > 0 && cols > 0, "grid dimensions must be non-zero");
        Self {
            rows,
            cols,
            cells: vec![None; rows as usize * cols as usize],
        }
    }

    /// Build a grid from rows of values, top row first. `0` means empty.
    ///
    /// # Panics
    ///
    /// Panics if the rows are empty or ragged.
    pub fn from_rows(rows: &[&[u32]]) -> Self {
        assert!(!rows.is_empty(), "grid needs at least one row");
        let cols = rows[0].len();
        assert!(cols > 0, "grid needs at least one column");
        assert!(
            rows.iter().all(|r| r.len() == cols),
            "all grid rows must have the same width"
        );

        let mut grid = Self::new(rows.len() as u8, cols as u8);
        for (row, values) in rows.iter().enumerate() {
            for (col, &v) in values.iter().enumerate() {
                if v != 0 {
                    grid.set(row as u8, col as u8, v);
                }
            }
        }
        grid
    }

    #[inline(always)]
    pub fn index(&self, row: u8, col: u8) -> usize {
        assert!(
            row < self.rows && col < self.cols,
            "cell ({}, {}) outside {}x{} grid",
            row,
            col,
            self.rows,
            self.cols
        );
        (row as usize) * (self.cols as usize) + (col as usize)
    }

    pub fn rows(&self) -> u8 {
        self.rows
    }

    pub fn cols(&self) -> u8 {
        self.cols
    }

    pub fn get(&self, row: u8, col: u8) -> CellValue {
        self.cells[self.index(row, col)]
    }

    pub fn get_at(&self, pos: CellPos) -> CellValue {
        self.get(pos.row, pos.col)
    }

    pub fn set(&mut self, row: u8, col: u8, value: u32) {
        let idx = self.index(row, col);
        self.cells[idx] = Some(value);
    }

    pub fn clear(&mut self, row: u8, col: u8) {
        let idx = self.index(row, col);
        self.cells[idx] = None;
    }

    pub fn is_occupied(&self, row: u8, col: u8) -> bool {
        self.get(row, col).is_some()
    }

    /// Whether the top cell (row 0) of `col` is filled.
    pub fn is_top_occupied(&self, col: u8) -> bool {
        self.is_occupied(0, col)
    }

    /// Lowest empty row in `col`, scanning from the bottom.
    ///
    /// Returns `None` when the column is full.
    pub fn lowest_empty_row(&self, col: u8) -> Option<u8> {
        (0..self.rows).rev().find(|&row| !self.is_occupied(row, col))
    }

    /// Whether no occupied cell in any column sits above an empty one.
    pub fn is_settled(&self) -> bool {
        (0..self.cols).all(|col| {
            let mut seen_empty = false;
            for row in (0..self.rows).rev() {
                match self.get(row, col) {
                    None => seen_empty = true,
                    Some(_) if seen_empty => return false,
                    Some(_) => {}
                }
            }
            true
        })
    }

    /// Whether any two orthogonally adjacent cells hold the same value.
    pub fn has_adjacent_pair(&self) -> bool {
        for row in 0..self.rows {
            for col in 0..self.cols {
                let Some(v) = self.get(row, col) else {
                    continue;
                };
                if row > 0 && self.get(row - 1, col) == Some(v) {
                    return true;
                }
                if col > 0 && self.get(row, col - 1) == Some(v) {
                    return true;
                }
            }
        }
        false
    }

    /// Iterate over occupied cells as `(pos, value)` in row-major order.
    pub fn occupied(&self) -> impl Iterator<Item = (CellPos, u32)> + '_ {
        let cols = self.cols as usize;
        self.cells.iter().enumerate().filter_map(move |(i, c)| {
            c.map(|v| (CellPos::new((i / cols) as u8, (i % cols) as u8), v))
        })
    }

    /// Get a reference to the internal cells array
    pub fn cells(&self) -> &[CellValue] {
        &self.cells
    }

    /// Number of occupied cells.
    pub fn filled(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Convert to rows of values (`0` = empty), top row first.
    pub fn to_rows(&self) -> Vec<Vec<u32>> {
        self.cells
            .chunks(self.cols as usize)
            .map(|row| row.iter().map(|c| c.unwrap_or(0)).collect())
            .collect()
    }
}
