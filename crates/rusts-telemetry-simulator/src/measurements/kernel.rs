//! `kernel` measurement: boot time plus cumulative kernel counters.

use super::synth::Counter;
use crate::rng;
use rand::prelude::*;
use rusts_core::{Point, Timestamp};
use std::time::Duration;

pub const NAME: &str = "kernel";

pub const FIELDS: [&str; 6] = [
    "boot_time",
    "interrupts",
    "context_switches",
    "processes_forked",
    "disk_pages_in",
    "disk_pages_out",
];

const SLICE_BITS: u32 = 12;
const NANOS_PER_SEC: i64 = 1_000_000_000;

#[derive(Debug)]
pub struct KernelMeasurement {
    boot_time: i64,
    counters: [Counter; 5],
}

impl KernelMeasurement {
    /// Boot time is placed up to 30 days before the simulation start.
    pub fn new(start: Timestamp) -> Self {
        let uptime_secs = rand::thread_rng().gen_range(0..30 * 24 * 3600);
        Self {
            boot_time: start / NANOS_PER_SEC - uptime_secs,
            counters: Default::default(),
        }
    }

    pub fn tick(&self, _interval: Duration) {}

    pub fn emit(&self, point: &mut Point) -> bool {
        point.set_measurement(NAME);
        point.append_field(FIELDS[0], self.boot_time);

        let word = rng::draw64();
        for (i, (key, counter)) in FIELDS[1..].iter().zip(&self.counters).enumerate() {
            let increment = rng::bits(word, i as u32, SLICE_BITS) as u64;
            point.append_field(*key, counter.add(increment));
        }
        true
    }
}
