//! `net` measurement: cumulative interface counters.

use super::synth::Counter;
use crate::overrides::TagOverrides;
use crate::rng;
use rusts_core::{Point, TagValue};
use std::time::Duration;

pub const NAME: &str = "net";

pub const TAGS: [&str; 1] = ["interface"];

pub const FIELDS: [&str; 8] = [
    "bytes_sent",
    "bytes_recv",
    "packets_sent",
    "packets_recv",
    "err_in",
    "err_out",
    "drop_in",
    "drop_out",
];

const SLICE_BITS: u32 = 8;
const MTU: u64 = 1500;

#[derive(Debug)]
pub struct NetMeasurement {
    interface: TagValue,
    counters: [Counter; 8],
}

impl NetMeasurement {
    pub fn new(overrides: &TagOverrides) -> Self {
        Self {
            interface: overrides.get_or(NAME, "interface", "eth0"),
            counters: Default::default(),
        }
    }

    pub fn tick(&self, _interval: Duration) {}

    pub fn emit(&self, point: &mut Point) -> bool {
        point.set_measurement(NAME);
        point.append_tag(TAGS[0], &self.interface);

        let word = rng::draw64();
        let slice = |i: u32| rng::bits(word, i, SLICE_BITS) as u64;
        let packets_sent = slice(0);
        let packets_recv = slice(1);
        let increments = [
            packets_sent * (slice(2) % MTU + 64),
            packets_recv * (slice(3) % MTU + 64),
            packets_sent,
            packets_recv,
            // errors and drops are rare: only the top value of a slice counts
            (slice(4) == 255) as u64,
            (slice(5) == 255) as u64,
            (slice(6) == 255) as u64,
            (slice(7) == 255) as u64,
        ];

        for ((key, counter), increment) in FIELDS.iter().zip(&self.counters).zip(increments) {
            point.append_field(*key, counter.add(increment));
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_never_decrease() {
        let net = NetMeasurement::new(&TagOverrides::new());
        let mut point = Point::new();
        let mut last = [0u64; 8];
        for _ in 0..5000 {
            point.reset();
            net.emit(&mut point);
            assert_eq!(point.tag_keys().collect::<Vec<_>>(), TAGS.to_vec());
            assert_eq!(point.field_keys().collect::<Vec<_>>(), FIELDS.to_vec());
            for (i, field) in point.fields.iter().enumerate() {
                let v = field.value.as_u64().unwrap();
                assert!(v >= last[i], "{} went backwards", field.key);
                last[i] = v;
            }
        }
        assert_eq!(point.get_tag("interface"), Some("eth0"));
    }
}
