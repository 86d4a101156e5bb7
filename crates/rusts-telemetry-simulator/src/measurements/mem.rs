//! `mem` measurement: memory usage.
//!
//! `available` is a random walk clamped to `[0, total]`. `cached` and
//! `buffered` are per-row draws carved out of `available`, and `free` is what
//! remains, so every figure stays within `total`.

use super::synth::IntWalk;
use crate::rng;
use rand::prelude::*;
use rusts_core::Point;
use std::time::Duration;

pub const NAME: &str = "mem";

pub const FIELDS: [&str; 9] = [
    "total",
    "available",
    "used",
    "free",
    "cached",
    "buffered",
    "used_percent",
    "available_percent",
    "buffered_percent",
];

const GIB: u64 = 1 << 30;
const MEM_SIZES_GIB: [u64; 4] = [8, 16, 32, 64];

#[derive(Debug)]
pub struct MemMeasurement {
    total: u64,
    available: IntWalk,
}

impl MemMeasurement {
    pub fn new() -> Self {
        let mut rng = rand::thread_rng();
        let total = MEM_SIZES_GIB.choose(&mut rng).copied().unwrap_or(16) * GIB;
        Self {
            total,
            available: IntWalk::new(rng.gen_range(0..=total), 0, total, total / 100),
        }
    }

    pub fn tick(&self, _interval: Duration) {}

    pub fn emit(&self, point: &mut Point) -> bool {
        point.set_measurement(NAME);

        let available = self.available.advance();
        let used = self.total - available;
        let buffered = (available as f64 * rng::draw_unit() * 0.1) as u64;
        let cached = (available as f64 * rng::draw_unit() * 0.5) as u64;
        let free = available - buffered - cached;
        let total = self.total as f64;

        point.append_field(FIELDS[0], self.total);
        point.append_field(FIELDS[1], available);
        point.append_field(FIELDS[2], used);
        point.append_field(FIELDS[3], free);
        point.append_field(FIELDS[4], cached);
        point.append_field(FIELDS[5], buffered);
        point.append_field(FIELDS[6], used as f64 * 100.0 / total);
        point.append_field(FIELDS[7], available as f64 * 100.0 / total);
        point.append_field(FIELDS[8], buffered as f64 * 100.0 / total);
        true
    }
}

impl Default for MemMeasurement {
    fn default() -> Self {
        Self::new()
    }
}
