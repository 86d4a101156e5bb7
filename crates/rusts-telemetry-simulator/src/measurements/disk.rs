//! `disk` measurement: filesystem capacity.
//!
//! `free` and `inodes_free` are random walks clamped to `[0, total]`; the
//! `used` figures are derived from them so they can never go negative.

use super::synth::IntWalk;
use crate::overrides::TagOverrides;
use rand::prelude::*;
use rusts_core::{Point, TagValue};
use std::time::Duration;

pub const NAME: &str = "disk";

pub const TAGS: [&str; 2] = ["path", "fstype"];

pub const FIELDS: [&str; 7] = [
    "total",
    "free",
    "used",
    "used_percent",
    "inodes_total",
    "inodes_free",
    "inodes_used",
];

const GIB: u64 = 1 << 30;
const DISK_SIZES_GIB: [u64; 4] = [256, 512, 1024, 2048];
const BYTES_PER_INODE: u64 = 16 * 1024;

#[derive(Debug)]
pub struct DiskMeasurement {
    path: TagValue,
    fstype: TagValue,
    total: u64,
    inodes_total: u64,
    free: IntWalk,
    inodes_free: IntWalk,
}

impl DiskMeasurement {
    pub fn new(overrides: &TagOverrides) -> Self {
        let mut rng = rand::thread_rng();
        let total = DISK_SIZES_GIB.choose(&mut rng).copied().unwrap_or(512) * GIB;
        let inodes_total = total / BYTES_PER_INODE;

        Self {
            path: overrides.get_or(NAME, "path", "/"),
            fstype: overrides.get_or(NAME, "fstype", "ext4"),
            total,
            inodes_total,
            free: IntWalk::new(rng.gen_range(0..=total), 0, total, GIB),
            inodes_free: IntWalk::new(
                rng.gen_range(0..=inodes_total),
                0,
                inodes_total,
                inodes_total / 1000,
            ),
        }
    }

    pub fn tick(&self, _interval: Duration) {}

    pub fn emit(&self, point: &mut Point) -> bool {
        point.set_measurement(NAME);
        point.append_tag(TAGS[0], &self.path);
        point.append_tag(TAGS[1], &self.fstype);

        let free = self.free.advance();
        let used = self.total - free;
        let inodes_free = self.inodes_free.advance();

        point.append_field(FIELDS[0], self.total);
        point.append_field(FIELDS[1], free);
        point.append_field(FIELDS[2], used);
        point.append_field(FIELDS[3], used as f64 * 100.0 / self.total as f64);
        point.append_field(FIELDS[4], self.inodes_total);
        point.append_field(FIELDS[5], inodes_free);
        point.append_field(FIELDS[6], self.inodes_total - inodes_free);
        true
    }
}
