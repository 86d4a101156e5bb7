//! `nginx` measurement: stub_status counters and gauges.
//!
//! `accepts`, `handled` and `requests` are cumulative; the connection state
//! gauges are drawn independently per row.

use super::synth::Counter;
use crate::overrides::TagOverrides;
use crate::rng;
use rand::prelude::*;
use rusts_core::{Point, TagValue};
use std::time::Duration;

pub const NAME: &str = "nginx";

pub const TAGS: [&str; 2] = ["port", "server"];

pub const FIELDS: [&str; 7] = [
    "accepts",
    "handled",
    "requests",
    "active",
    "reading",
    "writing",
    "waiting",
];

#[derive(Debug)]
pub struct NginxMeasurement {
    port: TagValue,
    server: TagValue,
    accepts: Counter,
    handled: Counter,
    requests: Counter,
}

impl NginxMeasurement {
    pub fn new(overrides: &TagOverrides) -> Self {
        let server = format!("nginx_{}", rand::thread_rng().gen_range(0..100_000));
        Self {
            port: overrides.get_or(NAME, "port", "80"),
            server: overrides.get_or(NAME, "server", server),
            accepts: Counter::default(),
            handled: Counter::default(),
            requests: Counter::default(),
        }
    }

    pub fn tick(&self, _interval: Duration) {}

    pub fn emit(&self, point: &mut Point) -> bool {
        point.set_measurement(NAME);
        point.append_tag(TAGS[0], &self.port);
        point.append_tag(TAGS[1], &self.server);

        // Disjoint slices of one draw: accepted 0..8, drop roll 8..12,
        // request multiplier 12..15, then active, reading, writing, waiting.
        let word = rng::draw64();
        let accepted = rng::bits_at(word, 0, 8) as u64;
        // roughly one row in 16 drops a connection unhandled
        let dropped = (rng::bits_at(word, 8, 4) == 0 && accepted > 0) as u64;
        let requests = accepted * (1 + rng::bits_at(word, 12, 3) as u64);

        point.append_field(FIELDS[0], self.accepts.add(accepted));
        point.append_field(FIELDS[1], self.handled.add(accepted - dropped));
        point.append_field(FIELDS[2], self.requests.add(requests));
        point.append_field(FIELDS[3], rng::bits_at(word, 15, 10) as u64);
        point.append_field(FIELDS[4], rng::bits_at(word, 25, 6) as u64);
        point.append_field(FIELDS[5], rng::bits_at(word, 31, 6) as u64);
        point.append_field(FIELDS[6], rng::bits_at(word, 37, 10) as u64);
        true
    }
}
