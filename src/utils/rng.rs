//! Simple random number generator for reproducibility.
//!
//! A lightweight xorshift-based PRNG without external dependencies, so that
//! weight initialization is reproducible across runs and platforms.

/// Xorshift PRNG used for parameter initialization.
pub struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    /// Create a new RNG with explicit seed (if zero, use a fixed value).
    pub fn new(seed: u64) -> Self {
        let state = if seed == 0 { 0x9e3779b97f4a7c15 } else { seed };
        Self { state }
    }

    /// Basic xorshift to generate u32.
    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        (x >> 32) as u32
    }

    /// Convert to [0, 1).
    pub fn next_f32(&mut self) -> f32 {
        self.next_u32() as f32 / u32::MAX as f32
    }

    /// Uniform sample in [low, high).
    pub fn gen_range_f32(&mut self, low: f32, high: f32) -> f32 {
        low + (high - low) * self.next_f32()
    }
}
