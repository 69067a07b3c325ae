//! Random number sources for chance conditions and templates
//!
//! The engine never reaches for a global RNG; every context carries its own
//! source so tests can pin the draws and replay an invocation exactly.

use std::collections::VecDeque;
use std::time::{SystemTime, UNIX_EPOCH};

/// A source of uniformly distributed integers
///
/// `uniform_int` draws from the inclusive range `[min, max]`.
pub trait RandomSource: Send {
    /// Draw one integer uniformly from `[min, max]`
    fn uniform_int(&mut self, min: i64, max: i64) -> i64;
}

/// Deterministic xorshift64 generator
///
/// Simple and reproducible across platforms; the same seed produces the same
/// sequence everywhere.
#[derive(Debug, Clone)]
pub struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    /// Create a new generator with the given seed
    pub fn new(seed: u64) -> Self {
        // xorshift requires non-zero state
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Create a generator seeded from the wall clock
    pub fn from_entropy() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0x9e37_79b9_7f4a_7c15);
        Self::new(nanos)
    }

    /// Generate the next raw u64 value
    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }
}

impl RandomSource for XorShift64 {
    fn uniform_int(&mut self, min: i64, max: i64) -> i64 {
        if min >= max {
            return min;
        }
        let range = (max - min + 1) as u64;
        let value = self.next_u64() % range;
        min + value as i64
    }
}

/// A source that replays a fixed queue of draws
///
/// Each draw is clamped into the requested range; an exhausted queue yields
/// the range minimum. Intended for tests that need a specific roll.
#[derive(Debug, Clone, Default)]
pub struct SequenceSource {
    draws: VecDeque<i64>,
}

impl SequenceSource {
    /// Create a source that replays the given draws in order
    pub fn new(draws: impl IntoIterator<Item = i64>) -> Self {
        Self {
            draws: draws.into_iter().collect(),
        }
    }
}

impl RandomSource for SequenceSource {
    fn uniform_int(&mut self, min: i64, max: i64) -> i64 {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        match self.draws.pop_front() {
            Some(v) => v.clamp(lo, hi),
            None => lo,
        }
    }
}
