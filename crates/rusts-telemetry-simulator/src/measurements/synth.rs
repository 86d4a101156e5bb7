//! Field synthesis building blocks.
//!
//! Generators pick one of these per field:
//! - [`IntWalk`] / [`FloatWalk`]: bounded random walk, clamped to `[min, max]`
//! - [`Counter`] / [`FloatCounter`]: monotonic counter, never decreases
//! - plain per-row draws from [`crate::rng`] for independent values
//!
//! All state is atomic. Two callers that land on the same entity and
//! measurement at once both see their update applied; nothing is lost and no
//! counter moves backwards.

use crate::rng;
use std::sync::atomic::{AtomicU64, Ordering};

/// Integer random walk clamped to `[min, max]`.
#[derive(Debug)]
pub struct IntWalk {
    value: AtomicU64,
    min: u64,
    max: u64,
    step: u64,
}

impl IntWalk {
    pub fn new(initial: u64, min: u64, max: u64, step: u64) -> Self {
        debug_assert!(min <= max);
        Self {
            value: AtomicU64::new(initial.clamp(min, max)),
            min,
            max,
            step,
        }
    }

    /// Moves by a uniform delta in `[-step, step]` and returns the new value.
    pub fn advance(&self) -> u64 {
        let span = self.step.saturating_mul(2).saturating_add(1);
        let offset = (rng::draw64() % span) as i128 - self.step as i128;
        let (min, max) = (self.min as i128, self.max as i128);
        let apply = |v: u64| (v as i128 + offset).clamp(min, max) as u64;

        // The closure always returns Some, so this never fails
        let prev = self
            .value
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| Some(apply(v)))
            .unwrap_or_else(|v| v);
        apply(prev)
    }

    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }

    pub fn min(&self) -> u64 {
        self.min
    }

    pub fn max(&self) -> u64 {
        self.max
    }
}

/// Float random walk clamped to `[min, max]`, stored as bits.
#[derive(Debug)]
pub struct FloatWalk {
    bits: AtomicU64,
    min: f64,
    max: f64,
    step: f64,
}

impl FloatWalk {
    pub fn new(initial: f64, min: f64, max: f64, step: f64) -> Self {
        debug_assert!(min <= max);
        Self {
            bits: AtomicU64::new(initial.clamp(min, max).to_bits()),
            min,
            max,
            step,
        }
    }

    /// Moves by a uniform delta in `[-step, step)` and returns the new value.
    pub fn advance(&self) -> f64 {
        let delta = (rng::draw_unit() * 2.0 - 1.0) * self.step;
        let apply = |b: u64| (f64::from_bits(b) + delta).clamp(self.min, self.max);

        let prev = self
            .bits
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |b| {
                Some(apply(b).to_bits())
            })
            .unwrap_or_else(|b| b);
        apply(prev)
    }

    pub fn get(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Relaxed))
    }

    pub fn set(&self, value: f64) {
        self.bits
            .store(value.clamp(self.min, self.max).to_bits(), Ordering::Relaxed);
    }
}

/// Monotonic integer counter.
#[derive(Debug, Default)]
pub struct Counter {
    value: AtomicU64,
}

impl Counter {
    pub fn new(initial: u64) -> Self {
        Self {
            value: AtomicU64::new(initial),
        }
    }

    /// Adds `increment` and returns the value after this caller's addition.
    #[inline]
    pub fn add(&self, increment: u64) -> u64 {
        self.value
            .fetch_add(increment, Ordering::Relaxed)
            .wrapping_add(increment)
    }

    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

/// Monotonic float counter; negative increments are ignored.
#[derive(Debug, Default)]
pub struct FloatCounter {
    bits: AtomicU64,
}

impl FloatCounter {
    pub fn new(initial: f64) -> Self {
        Self {
            bits: AtomicU64::new(initial.max(0.0).to_bits()),
        }
    }

    pub fn add(&self, increment: f64) -> f64 {
        let increment = increment.max(0.0);
        let prev = self
            .bits
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |b| {
                Some((f64::from_bits(b) + increment).to_bits())
            })
            .unwrap_or_else(|b| b);
        f64::from_bits(prev) + increment
    }

    pub fn get(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Relaxed))
    }
}
