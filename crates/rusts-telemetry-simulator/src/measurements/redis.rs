//! `redis` measurement: INFO statistics.
//!
//! `uptime_in_seconds` only moves on `tick`, once per simulated interval.
//! Cumulative stats are monotonic counters, `instantaneous_*` values are
//! drawn per row, and `connected_clients` / `used_memory` walk within fixed
//! bounds.

use super::synth::{Counter, FloatCounter, IntWalk};
use crate::overrides::TagOverrides;
use crate::rng;
use rand::prelude::*;
use rusts_core::{Point, TagValue};
use std::time::Duration;

pub const NAME: &str = "redis";

pub const TAGS: [&str; 2] = ["port", "server"];

pub const FIELDS: [&str; 13] = [
    "uptime_in_seconds",
    "total_connections_received",
    "expired_keys",
    "evicted_keys",
    "keyspace_hits",
    "keyspace_misses",
    "instantaneous_ops_per_sec",
    "instantaneous_input_kbps",
    "instantaneous_output_kbps",
    "connected_clients",
    "used_memory",
    "used_cpu_sys",
    "used_cpu_user",
];

const MIB: u64 = 1 << 20;
const NANOS_PER_SEC: u64 = 1_000_000_000;
pub const MIN_USED_MEMORY: u64 = MIB;
pub const MAX_MEMORY: u64 = 4096 * MIB;
pub const MAX_CLIENTS: u64 = 10_000;

#[derive(Debug)]
pub struct RedisMeasurement {
    port: TagValue,
    server: TagValue,
    uptime_nanos: Counter,
    stats: [Counter; 5],
    connected_clients: IntWalk,
    used_memory: IntWalk,
    used_cpu_sys: FloatCounter,
    used_cpu_user: FloatCounter,
}

impl RedisMeasurement {
    pub fn new(overrides: &TagOverrides) -> Self {
        let mut rng = rand::thread_rng();
        let server = format!("redis_{}", rng.gen_range(0..100_000));
        Self {
            port: overrides.get_or(NAME, "port", "6379"),
            server: overrides.get_or(NAME, "server", server),
            uptime_nanos: Counter::new(rng.gen_range(0..7 * 24 * 3600) * NANOS_PER_SEC),
            stats: Default::default(),
            connected_clients: IntWalk::new(rng.gen_range(0..=100), 0, MAX_CLIENTS, 50),
            used_memory: IntWalk::new(
                rng.gen_range(MIN_USED_MEMORY..=MAX_MEMORY / 4),
                MIN_USED_MEMORY,
                MAX_MEMORY,
                4 * MIB,
            ),
            used_cpu_sys: FloatCounter::default(),
            used_cpu_user: FloatCounter::default(),
        }
    }

    /// Advances uptime by one sampling interval.
    pub fn tick(&self, interval: Duration) {
        self.uptime_nanos.add(interval.as_nanos() as u64);
    }

    /// Uptime in whole seconds, as reported in `uptime_in_seconds`.
    pub fn uptime(&self) -> u64 {
        self.uptime_nanos.get() / NANOS_PER_SEC
    }

    pub fn emit(&self, point: &mut Point) -> bool {
        point.set_measurement(NAME);
        point.append_tag(TAGS[0], &self.port);
        point.append_tag(TAGS[1], &self.server);

        point.append_field(FIELDS[0], self.uptime());

        let word = rng::draw64();
        for (i, (key, counter)) in FIELDS[1..6].iter().zip(&self.stats).enumerate() {
            point.append_field(*key, counter.add(rng::bits(word, i as u32, 8) as u64));
        }

        let gauges = rng::draw64();
        point.append_field(FIELDS[6], rng::bits(gauges, 0, 16) as u64);
        point.append_field(FIELDS[7], rng::scale(rng::bits(gauges, 1, 16), 16, 0.0, 1024.0));
        point.append_field(FIELDS[8], rng::scale(rng::bits(gauges, 2, 16), 16, 0.0, 1024.0));

        point.append_field(FIELDS[9], self.connected_clients.advance());
        point.append_field(FIELDS[10], self.used_memory.advance());
        point.append_field(FIELDS[11], self.used_cpu_sys.add(rng::draw_unit()));
        point.append_field(FIELDS[12], self.used_cpu_user.add(rng::draw_unit()));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_advances_uptime_only() {
        let redis = RedisMeasurement::new(&TagOverrides::new());
        let before = redis.uptime();

        let mut point = Point::new();
        redis.emit(&mut point);
        redis.emit(&mut point);
        assert_eq!(redis.uptime(), before);

        redis.tick(Duration::from_secs(10));
        redis.tick(Duration::from_secs(10));
        assert_eq!(redis.uptime(), before + 20);
    }

    #[test]
    fn test_sub_second_ticks_accumulate() {
        let redis = RedisMeasurement::new(&TagOverrides::new());
        let before = redis.uptime();

        for _ in 0..10 {
            redis.tick(Duration::from_millis(500));
        }
        assert_eq!(redis.uptime(), before + 5);

        redis.tick(Duration::from_millis(250));
        let mut point = Point::new();
        redis.emit(&mut point);
        assert_eq!(point.get_field("uptime_in_seconds").unwrap().as_u64(), Some(before + 5));
    }

    #[test]
    fn test_bounds_and_monotonic_stats() {
        let redis = RedisMeasurement::new(&TagOverrides::new().with(NAME, "port", "7000"));
        let mut point = Point::new();
        let mut last_hits = 0;
        let mut last_cpu = 0.0;
        for _ in 0..10_000 {
            point.reset();
            redis.emit(&mut point);
            assert_eq!(point.field_keys().collect::<Vec<_>>(), FIELDS.to_vec());

            let mem = point.get_field("used_memory").unwrap().as_u64().unwrap();
            assert!((MIN_USED_MEMORY..=MAX_MEMORY).contains(&mem));
            let clients = point.get_field("connected_clients").unwrap().as_u64().unwrap();
            assert!(clients <= MAX_CLIENTS);

            let hits = point.get_field("keyspace_hits").unwrap().as_u64().unwrap();
            assert!(hits >= last_hits);
            last_hits = hits;

            let cpu = point.get_field("used_cpu_sys").unwrap().as_f64().unwrap();
            assert!(cpu >= last_cpu);
            last_cpu = cpu;
        }
        assert_eq!(point.get_tag("port"), Some("7000"));
    }
}
