//! `diskio` measurement: cumulative block device counters.

use super::synth::Counter;
use crate::overrides::TagOverrides;
use crate::rng;
use rand::prelude::*;
use rusts_core::{Point, TagValue};
use std::time::Duration;

pub const NAME: &str = "diskio";

pub const TAGS: [&str; 1] = ["serial"];

pub const FIELDS: [&str; 7] = [
    "reads",
    "writes",
    "read_bytes",
    "write_bytes",
    "read_time",
    "write_time",
    "io_time",
];

const SLICE_BITS: u32 = 9;
const SECTOR: u64 = 512;

#[derive(Debug)]
pub struct DiskIoMeasurement {
    serial: TagValue,
    counters: [Counter; 7],
}

impl DiskIoMeasurement {
    pub fn new(overrides: &TagOverrides) -> Self {
        let mut rng = rand::thread_rng();
        let serial = format!(
            "{:03}-{:03}-{:04}",
            rng.gen_range(0..1000),
            rng.gen_range(0..1000),
            rng.gen_range(0..10000)
        );

        Self {
            serial: overrides.get_or(NAME, "serial", serial),
            counters: Default::default(),
        }
    }

    pub fn tick(&self, _interval: Duration) {}

    pub fn emit(&self, point: &mut Point) -> bool {
        point.set_measurement(NAME);
        point.append_tag(TAGS[0], &self.serial);

        // Seven 9-bit increments from one draw
        let word = rng::draw64();
        let inc = |i: u32| rng::bits(word, i, SLICE_BITS) as u64;
        let increments = [
            inc(0),
            inc(1),
            inc(2) * SECTOR,
            inc(3) * SECTOR,
            inc(4),
            inc(5),
            inc(6),
        ];

        for ((key, counter), increment) in FIELDS.iter().zip(&self.counters).zip(increments) {
            point.append_field(*key, counter.add(increment));
        }
        true
    }
}
