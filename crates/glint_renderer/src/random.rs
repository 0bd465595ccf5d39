//! Uniform random sources.
//!
//! The renderer never reaches for a global generator; every sampling call is
//! handed a `UniformSource`. Seeded `StdRng` gives reproducible renders, and
//! the fixed sources below make individual rays fully deterministic.

use rand::rngs::{StdRng, ThreadRng};
use rand::Rng;

/// A stream of uniform samples in `[0, 1)`.
pub trait UniformSource {
    fn next_f64(&mut self) -> f64;

    /// Uniform sample in `[min, max)`.
    fn next_range(&mut self, min: f64, max: f64) -> f64 {
        min + (max - min) * self.next_f64()
    }
}

impl UniformSource for StdRng {
    fn next_f64(&mut self) -> f64 {
        self.gen()
    }
}

impl UniformSource for ThreadRng {
    fn next_f64(&mut self) -> f64 {
        self.gen()
    }
}

/// Always returns the same value.
#[derive(Debug, Clone, Copy)]
pub struct FixedSource(pub f64);

impl UniformSource for FixedSource {
    fn next_f64(&mut self) -> f64 {
        self.0
    }
}

/// Cycles through a list of values.
#[derive(Debug, Clone)]
pub struct SequenceSource {
    values: Vec<f64>,
    next: usize,
}

impl SequenceSource {
    /// An empty list yields `0.5` forever.
    pub fn new(values: Vec<f64>) -> Self {
        Self { values, next: 0 }
    }
}

impl UniformSource for SequenceSource {
    fn next_f64(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.5;
        }
        let value = self.values[self.next];
        self.next = (self.next + 1) % self.values.len();
        value
    }
}
