//! Score tracking
//!
//! Merges add their resulting value to the running total as they complete.
//! The presented score only catches up at the end of each resolve iteration
//! ([`ScoreTracker::publish`]), so a cascade updates the display once per pass
//! rather than once per merge.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreTracker {
    total: u32,
    published: u32,
}

impl ScoreTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add points from a completed merge.
    pub fn add_score(&mut self, points: u32) {
        self.total = self.total.saturating_add(points);
    }

    /// Running total, including merges not yet published.
    pub fn total(&self) -> u32 {
        self.total
    }

    /// Score last presented to the player.
    pub fn published(&self) -> u32 {
        self.published
    }

    /// Present the running total. Returns true if the presented value changed.
    pub fn publish(&mut self) -> bool {
        let changed = self.published != self.total;
        self.published = self.total;
        changed
    }
}
