//! Simulated entities.
//!
//! An entity is a fixed bundle of tag values plus the measurement generators
//! it reports. Tags are computed once at construction and shared into every
//! point by reference count. The only state that changes afterwards lives
//! inside the generators.

use crate::measurements::Measurement;
use rusts_core::{Point, Tag, TagValue};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

#[derive(Debug)]
pub struct Entity {
    index: u64,
    tags: Vec<Tag>,
    measurements: Vec<Measurement>,
    /// Highest epoch the generators have been ticked up to
    ticked_epoch: AtomicU64,
}

impl Entity {
    pub fn new(index: u64, tags: Vec<Tag>, measurements: Vec<Measurement>) -> Self {
        Self {
            index,
            tags,
            measurements,
            ticked_epoch: AtomicU64::new(0),
        }
    }

    /// Identity index including the configured offset.
    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn tag(&self, key: &str) -> Option<&TagValue> {
        self.tags.iter().find(|t| t.key == key).map(|t| &t.value)
    }

    pub fn tag_keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.tags.iter().map(|t| t.key)
    }

    pub fn measurements(&self) -> &[Measurement] {
        &self.measurements
    }

    pub fn measurement(&self, i: usize) -> &Measurement {
        &self.measurements[i]
    }

    /// Appends the entity's tags in construction order.
    #[inline]
    pub fn append_tags(&self, point: &mut Point) {
        for tag in &self.tags {
            point.append_tag(tag.key, &tag.value);
        }
    }

    /// Brings every generator's time state up to `epoch`.
    ///
    /// `fetch_max` hands each epoch transition to exactly one caller, which
    /// then ticks once per skipped epoch. Callers that arrive with an older
    /// or equal epoch do nothing. Returns the number of ticks applied.
    pub fn advance_to(&self, epoch: u64, interval: Duration) -> u64 {
        let previous = self.ticked_epoch.fetch_max(epoch, Ordering::AcqRel);
        if previous >= epoch {
            return 0;
        }

        for _ in previous..epoch {
            for measurement in &self.measurements {
                measurement.tick(interval);
            }
        }
        epoch - previous
    }

    pub fn ticked_epoch(&self) -> u64 {
        self.ticked_epoch.load(Ordering::Acquire)
    }
}
