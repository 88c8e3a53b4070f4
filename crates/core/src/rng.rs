//! RNG module - deterministic block value selection
//!
//! A small LCG keeps games reproducible from a seed: the same seed and the same
//! sequence of column choices replay an identical game.

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Uniform index in `[0, len)`. `len` must be non-zero.
    ///
    /// Uses the high bits: the low bits of a power-of-two-modulus LCG cycle
    /// with a short period.
    pub fn next_index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0);
        ((self.next_u32() as u64 * len as u64) >> 32) as usize
    }

    /// Pick a uniformly random element, or `None` for an empty slice.
    pub fn choose<T: Copy>(&mut self, items: &[T]) -> Option<T> {
        if items.is_empty() {
            return None;
        }
        Some(items[self.next_index(items.len())])
    }

    /// Current RNG state (for restarting a game with a fresh but related sequence)
    pub fn state(&self) -> u32 {
        self.state
    }
}

impl Default for SimpleRng {
    fn default() -> Self {
        Self::new(1)
    }
}
