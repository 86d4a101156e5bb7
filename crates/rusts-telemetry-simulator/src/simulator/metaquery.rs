//! Cardinality-stress generator for metadata queries.
//!
//! Produces rows over two independent tag dimensions, `tag_a` and `tag_b`,
//! each drawn from an `axis`-sized pool, so `axis²` distinct series appear
//! once `points >= axis²`. Timestamps increase by a fixed step precomputed
//! from the window.
//!
//! Unlike [`FleetSimulator`](super::FleetSimulator) this type keeps plain
//! counters and takes `&mut self`. It only backs single-threaded setup
//! paths, so it does not implement the shared [`Simulator`](super::Simulator)
//! contract.

use crate::error::{Result, SimError};
use crate::rng;
use rusts_core::{Point, TagValue, Timestamp};
use std::sync::Arc;
use tracing::info;

pub const NAME: &str = "metaquery";
pub const TAGS: [&str; 2] = ["tag_a", "tag_b"];
pub const FIELDS: [&str; 1] = ["value"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaQueryConfig {
    /// Distinct values per tag dimension
    pub axis: u64,
    /// Rows to generate
    pub points: u64,
    pub start: Timestamp,
    pub end: Timestamp,
}

impl Default for MetaQueryConfig {
    fn default() -> Self {
        Self {
            axis: 100,
            points: 10_000,
            start: 0,
            end: 0,
        }
    }
}

#[derive(Debug)]
pub struct MetaQuerySimulator {
    tag_a: Vec<TagValue>,
    tag_b: Vec<TagValue>,
    start: Timestamp,
    step: i64,
    made: u64,
    total: u64,
}

impl MetaQuerySimulator {
    pub fn new(config: &MetaQueryConfig) -> Result<Self> {
        if config.axis == 0 {
            return Err(SimError::InvalidConfig("axis must be positive".to_string()));
        }
        if config.points == 0 {
            return Err(SimError::InvalidConfig("points must be positive".to_string()));
        }
        if config.end <= config.start {
            return Err(SimError::InvalidConfig(format!(
                "empty time window [{}, {})",
                config.start, config.end
            )));
        }

        let pool = |prefix: &str| -> Vec<TagValue> {
            (0..config.axis)
                .map(|i| Arc::from(format!("{}_{}", prefix, i)))
                .collect()
        };
        let span = config.end.checked_sub(config.start).ok_or_else(|| {
            SimError::InvalidConfig(format!(
                "time window [{}, {}) is too wide",
                config.start, config.end
            ))
        })? as u64;
        let step = (span / config.points).max(1) as i64;

        info!(
            "Metaquery generator: axis {}, {} points, step {} ns",
            config.axis, config.points, step
        );

        Ok(Self {
            tag_a: pool("a"),
            tag_b: pool("b"),
            start: config.start,
            step,
            made: 0,
            total: config.points,
        })
    }

    /// Fills the next row and returns its sequence number. Past the end the
    /// point is left untouched.
    pub fn next(&mut self, point: &mut Point) -> u64 {
        self.made += 1;
        if self.made > self.total {
            return self.made;
        }

        let i = self.made - 1;
        let axis = self.tag_a.len() as u64;
        point.set_timestamp(self.start + i as i64 * self.step);
        point.set_measurement(NAME);
        point.append_tag(TAGS[0], &self.tag_a[(i % axis) as usize]);
        point.append_tag(TAGS[1], &self.tag_b[((i / axis) % axis) as usize]);
        point.append_field(FIELDS[0], rng::draw_unit() * 100.0);
        self.made
    }

    pub fn step(&self) -> i64 {
        self.step
    }

    pub fn seen_points(&self) -> u64 {
        self.made.min(self.total)
    }

    /// One field per row.
    pub fn seen_values(&self) -> u64 {
        self.seen_points()
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn finished(&self) -> bool {
        self.made >= self.total
    }
}
