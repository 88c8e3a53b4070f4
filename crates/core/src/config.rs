//! Engine configuration
//!
//! Every engine instance owns its configuration; there is no process-wide
//! settings object. Defaults match the classic 6x5 board.

use std::env;
use std::fmt;

use crate::types::{
    BOARD_PADDING, CELL_GAP, CELL_SIZE, DEFAULT_COLS, DEFAULT_ROWS, DROP_MS, MERGE_MS,
    PREVIEW_SMOOTHING,
};

/// Board geometry in abstract pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub cell_size: f32,
    pub gap: f32,
    pub padding: f32,
    /// Where a freshly spawned block starts (above the grid).
    pub spawn_offset: f32,
    /// Where the falling-block preview rests.
    pub preview_offset: f32,
    /// Fraction of the remaining distance covered per frame.
    pub preview_smoothing: f32,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            cell_size: CELL_SIZE,
            gap: CELL_GAP,
            padding: BOARD_PADDING,
            spawn_offset: -CELL_SIZE,
            preview_offset: BOARD_PADDING,
            preview_smoothing: PREVIEW_SMOOTHING,
        }
    }
}

impl Layout {
    /// Distance between the top edges of two adjacent rows.
    pub fn pitch(&self) -> f32 {
        self.cell_size + self.gap
    }

    /// Vertical offset of `row`'s top edge.
    pub fn row_offset(&self, row: u8) -> f32 {
        row as f32 * self.pitch() + self.padding
    }

    /// Fractional row for a vertical offset (inverse of [`Layout::row_offset`]).
    pub fn row_at(&self, offset: f32) -> f32 {
        (offset - self.padding) / self.pitch()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    ZeroRows,
    ZeroCols,
    BadPitch,
    BadSmoothing,
}

impl ConfigError {
    pub fn code(self) -> &'static str {
        match self {
            ConfigError::ZeroRows | ConfigError::ZeroCols => "invalid_dimensions",
            ConfigError::BadPitch | ConfigError::BadSmoothing => "invalid_layout",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            ConfigError::ZeroRows => "grid needs at least one row",
            ConfigError::ZeroCols => "grid needs at least one column",
            ConfigError::BadPitch => "cell size plus gap must be positive",
            ConfigError::BadSmoothing => "preview smoothing must be in (0, 1]",
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

impl std::error::Error for ConfigError {}

/// Engine configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub rows: u8,
    pub cols: u8,
    /// Duration of a player drop. Gravity steps take half of this.
    pub drop_ms: u32,
    pub merge_ms: u32,
    pub layout: Layout,
    pub seed: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            drop_ms: DROP_MS,
            merge_ms: MERGE_MS,
            layout: Layout::default(),
            seed: 1,
        }
    }
}

impl EngineConfig {
    pub fn with_size(mut self, rows: u8, cols: u8) -> Self {
        self.rows = rows;
        self.cols = cols;
        self
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_timing(mut self, drop_ms: u32, merge_ms: u32) -> Self {
        self.drop_ms = drop_ms;
        self.merge_ms = merge_ms;
        self
    }

    /// Duration of one single-row gravity step.
    pub fn gravity_ms(&self) -> u32 {
        self.drop_ms / 2
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows == 0 {
            return Err(ConfigError::ZeroRows);
        }
        if self.cols == 0 {
            return Err(ConfigError::ZeroCols);
        }
        if !(self.layout.pitch() > 0.0) {
            return Err(ConfigError::BadPitch);
        }
        let s = self.layout.preview_smoothing;
        if !(s > 0.0 && s <= 1.0) {
            return Err(ConfigError::BadSmoothing);
        }
        Ok(())
    }

    /// Create from environment variables.
    ///
    /// - `MERGE_DROP_ROWS` / `MERGE_DROP_COLS`: grid size
    /// - `MERGE_DROP_DROP_MS` / `MERGE_DROP_MERGE_MS`: transition durations
    /// - `MERGE_DROP_SEED`: RNG seed
    ///
    /// Missing or unparsable values keep their defaults.
    pub fn from_env() -> Self {
        fn var<T: std::str::FromStr>(name: &str) -> Option<T> {
            env::var(name).ok().and_then(|s| s.trim().parse().ok())
        }

        let d = Self::default();
        Self {
            rows: var("MERGE_DROP_ROWS").unwrap_or(d.rows),
            cols: var("MERGE_DROP_COLS").unwrap_or(d.cols),
            drop_ms: var("MERGE_DROP_DROP_MS").unwrap_or(d.drop_ms),
            merge_ms: var("MERGE_DROP_MERGE_MS").unwrap_or(d.merge_ms),
            layout: d.layout,
            seed: var("MERGE_DROP_SEED").unwrap_or(d.seed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!((config.rows, config.cols), (6, 5));
        assert_eq!(config.gravity_ms(), 100);
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        let config = EngineConfig::default().with_size(0, 5);
        assert_eq!(config.validate(), Err(ConfigError::ZeroRows));
        let config = EngineConfig::default().with_size(6, 0);
        assert_eq!(config.validate(), Err(ConfigError::ZeroCols));
        assert_eq!(ConfigError::ZeroCols.code(), "invalid_dimensions");
    }

    #[test]
    fn test_bad_layout_rejected() {
        let mut config = EngineConfig::default();
        config.layout.cell_size = 0.0;
        config.layout.gap = 0.0;
        assert_eq!(config.validate(), Err(ConfigError::BadPitch));

        let mut config = EngineConfig::default();
        config.layout.preview_smoothing = 0.0;
        assert_eq!(config.validate(), Err(ConfigError::BadSmoothing));
    }

    #[test]
    fn test_row_offsets() {
        let layout = Layout::default();
        assert_eq!(layout.pitch(), 68.0);
        assert_eq!(layout.row_offset(0), 15.0);
        assert_eq!(layout.row_offset(5), 355.0);
        assert_eq!(layout.row_at(layout.row_offset(3)), 3.0);
    }
}
