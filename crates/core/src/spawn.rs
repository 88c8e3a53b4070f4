//! Spawn module - next falling block selection and preview tracking
//!
//! New blocks draw uniformly from the values unlocked so far. The falling block
//! follows the player's pointer column and eases toward its preview offset every
//! frame; that easing is cosmetic and not gated by the turn state machine.

use std::collections::VecDeque;

use crate::config::Layout;
use crate::grid::GridModel;
use crate::rng::SimpleRng;
use crate::types::SEED_VALUE;

/// Values a spawn may choose from. Starts as `{2}` and only ever grows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnlockedValues {
    /// Discovery order.
    values: Vec<u32>,
}

impl UnlockedValues {
    pub fn new() -> Self {
        Self {
            values: vec![SEED_VALUE],
        }
    }

    /// Add `value`. Returns true if it was not unlocked before.
    pub fn insert(&mut self, value: u32) -> bool {
        if self.contains(value) {
            return false;
        }
        self.values.push(value);
        true
    }

    pub fn contains(&self, value: u32) -> bool {
        self.values.contains(&value)
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Largest unlocked value.
    pub fn max(&self) -> u32 {
        self.values.iter().copied().max().unwrap_or(SEED_VALUE)
    }
}

impl Default for UnlockedValues {
    fn default() -> Self {
        Self::new()
    }
}

/// The block waiting above the grid. Not part of the grid model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FallingBlock {
    pub value: u32,
    pub column: u8,
    pub display_offset: f32,
    pub target_offset: f32,
}

impl FallingBlock {
    /// One frame of exponential approach toward the preview offset.
    pub fn ease(&mut self, smoothing: f32) {
        self.display_offset += (self.target_offset - self.display_offset) * smoothing;
    }
}

/// Result of [`SpawnController::spawn_next`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnOutcome {
    Spawned,
    /// The new block's column has its top cell filled: the game is over.
    Blocked,
}

#[derive(Debug, Clone)]
pub struct SpawnController {
    cols: u8,
    unlocked: UnlockedValues,
    rng: SimpleRng,
    /// Preset values consumed before falling back to random picks.
    script: VecDeque<u32>,
    pointer_column: u8,
    falling: Option<FallingBlock>,
}

impl SpawnController {
    pub fn new(cols: u8, seed: u32) -> Self {
        Self {
            cols,
            unlocked: UnlockedValues::new(),
            rng: SimpleRng::new(seed),
            script: VecDeque::new(),
            pointer_column: 0,
            falling: None,
        }
    }

    pub fn unlocked(&self) -> &UnlockedValues {
        &self.unlocked
    }

    /// Record a value produced by a merge (or present in a seeded grid).
    pub fn unlock(&mut self, value: u32) -> bool {
        self.unlocked.insert(value)
    }

    /// Queue preset values for upcoming spawns.
    ///
    /// A preset is only used if it is unlocked at spawn time; otherwise that
    /// spawn falls back to a random pick.
    pub fn queue_values(&mut self, values: impl IntoIterator<Item = u32>) {
        self.script.extend(values);
    }

    /// Current RNG state, used to seed the next game on restart.
    pub fn rng_state(&self) -> u32 {
        self.rng.state()
    }

    pub fn pointer_column(&self) -> u8 {
        self.pointer_column
    }

    /// Track the last known horizontal input position, clamped to the grid.
    /// The falling block follows it.
    pub fn set_pointer_column(&mut self, col: i32) {
        let clamped = col.clamp(0, self.cols as i32 - 1) as u8;
        self.pointer_column = clamped;
        if let Some(block) = self.falling.as_mut() {
            block.column = clamped;
        }
    }

    pub fn falling(&self) -> Option<&FallingBlock> {
        self.falling.as_ref()
    }

    /// Remove the falling block once its drop has landed.
    pub fn take_falling(&mut self) -> Option<FallingBlock> {
        self.falling.take()
    }

    pub fn ease_preview(&mut self, smoothing: f32) {
        if let Some(block) = self.falling.as_mut() {
            block.ease(smoothing);
        }
    }

    fn pick_value(&mut self) -> u32 {
        if let Some(v) = self.script.pop_front() {
            if self.unlocked.contains(v) {
                return v;
            }
        }
        self.rng
            .choose(self.unlocked.as_slice())
            .unwrap_or(SEED_VALUE)
    }

    /// Replace the falling block with a fresh one at the pointer column.
    ///
    /// The block is created either way; [`SpawnOutcome::Blocked`] tells the
    /// caller its column is already topped out.
    pub fn spawn_next(&mut self, grid: &GridModel, layout: &Layout) -> SpawnOutcome {
        let value = self.pick_value();
        let column = self.pointer_column;
        self.falling = Some(FallingBlock {
            value,
            column,
            display_offset: layout.spawn_offset,
            target_offset: layout.preview_offset,
        });

        if grid.is_top_occupied(column) {
            SpawnOutcome::Blocked
        } else {
            SpawnOutcome::Spawned
        }
    }
}
