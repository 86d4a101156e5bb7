//! Lock-free fleet simulator.
//!
//! Row `i` (zero based) of a fleet with `E` entities, each reporting `M`
//! measurements, is fully determined by `i`:
//!
//! ```text
//! entity      = (i / M) mod E
//! measurement =  i mod M
//! epoch       =  i / (E * M)
//! timestamp   =  start + epoch * interval
//! ```
//!
//! A single `fetch_add` on the shared point counter hands every caller its
//! own `i`; everything else is computed locally from it. Per-entity
//! timestamps therefore step by exactly one interval no matter how calls
//! interleave.

use crate::entity::Entity;
use crate::error::{Result, SimError};
use crate::simulator::Simulator;
use crate::sql::{SqlSource, SqlTemplate};
use rusts_core::{Point, TimeRange, Timestamp};
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info};

/// Shared progress counters.
#[derive(Debug, Default)]
struct Progress {
    made_points: AtomicU64,
    made_values: AtomicU64,
    made_sql: AtomicU64,
    written_points: AtomicU64,
}

#[derive(Debug)]
pub struct FleetSimulator {
    entities: Vec<Entity>,
    tag_keys: Vec<&'static str>,
    measurements_per_entity: u64,
    points_per_epoch: u64,
    range: TimeRange,
    interval: Duration,
    interval_nanos: i64,
    epochs: u64,
    total: u64,
    progress: Progress,
    templates: Vec<SqlTemplate>,
}

impl FleetSimulator {
    /// Builds a simulator over a pre-built entity array.
    ///
    /// Every entity must carry the same number of measurements and the same
    /// tag schema.
    pub fn from_entities(entities: Vec<Entity>, range: TimeRange, interval: Duration) -> Result<Self> {
        let first = entities
            .first()
            .ok_or_else(|| SimError::InvalidConfig("entity count must be positive".to_string()))?;
        let measurements_per_entity = first.measurements().len() as u64;
        if measurements_per_entity == 0 {
            return Err(SimError::InvalidConfig(
                "entities must carry at least one measurement".to_string(),
            ));
        }
        let tag_keys: Vec<&'static str> = first.tag_keys().collect();
        if entities.iter().any(|e| {
            e.measurements().len() as u64 != measurements_per_entity
                || !e.tag_keys().eq(tag_keys.iter().copied())
        }) {
            return Err(SimError::InvalidConfig(
                "entities must share one measurement count and tag schema".to_string(),
            ));
        }

        let interval_nanos = i64::try_from(interval.as_nanos())
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| SimError::InvalidConfig(format!("invalid interval {:?}", interval)))?;
        if range.is_empty() {
            return Err(SimError::InvalidConfig(format!(
                "empty time window [{}, {})",
                range.start, range.end
            )));
        }

        let span = range.duration_nanos().ok_or_else(|| {
            SimError::InvalidConfig(format!(
                "time window [{}, {}) is too wide",
                range.start, range.end
            ))
        })? as u64;
        // Epoch k starts at start + k * interval and must lie inside the window
        let epochs = span.div_ceil(interval_nanos as u64);
        let points_per_epoch = entities.len() as u64 * measurements_per_entity;
        let total = points_per_epoch
            .checked_mul(epochs)
            .ok_or_else(|| SimError::InvalidConfig("total point count overflows".to_string()))?;

        info!(
            "Simulator ready: {} entities x {} measurements, {} epochs of {:?}, {} points",
            entities.len(),
            measurements_per_entity,
            epochs,
            interval,
            total
        );

        Ok(Self {
            entities,
            tag_keys,
            measurements_per_entity,
            points_per_epoch,
            range,
            interval,
            interval_nanos,
            epochs,
            total,
            progress: Progress::default(),
            templates: Vec::new(),
        })
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Entity tag keys in emission order.
    pub fn tag_keys(&self) -> &[&'static str] {
        &self.tag_keys
    }

    pub fn measurements_per_entity(&self) -> u64 {
        self.measurements_per_entity
    }

    pub fn epochs(&self) -> u64 {
        self.epochs
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn range(&self) -> TimeRange {
        self.range
    }

    /// Timestamp of epoch `epoch`.
    #[inline]
    pub fn epoch_timestamp(&self, epoch: u64) -> Timestamp {
        self.range.start + epoch as i64 * self.interval_nanos
    }

    pub fn written_points(&self) -> u64 {
        self.progress.written_points.load(Ordering::Acquire)
    }

    /// Installs templates whose tag placeholders default to `repeat` values.
    pub fn set_sql_templates_with_repeat(&mut self, templates: &[&str], repeat: u32) -> Result<()> {
        if templates.is_empty() {
            return Err(SimError::NoTemplates);
        }
        let parsed = templates
            .iter()
            .map(|t| SqlTemplate::parse_with_repeat(t, &self.tag_keys, repeat))
            .collect::<Result<Vec<_>>>()?;

        for template in &parsed {
            debug!("Installed SQL template: {}", template.source());
        }
        info!("Installed {} SQL templates", parsed.len());

        self.templates = parsed;
        Ok(())
    }

    pub fn templates(&self) -> &[SqlTemplate] {
        &self.templates
    }
}

impl Simulator for FleetSimulator {
    fn next(&self, point: &mut Point) -> u64 {
        let made = self.progress.made_points.fetch_add(1, Ordering::Relaxed) + 1;
        if made > self.total {
            return made;
        }

        let index = made - 1;
        let entity_index = (index / self.measurements_per_entity) % self.entities.len() as u64;
        let epoch = index / self.points_per_epoch;
        let entity = &self.entities[entity_index as usize];
        let measurement = entity.measurement((index % self.measurements_per_entity) as usize);

        entity.advance_to(epoch, self.interval);

        point.set_timestamp(self.epoch_timestamp(epoch));
        point.set_measurement(measurement.name());
        entity.append_tags(point);

        let fields_before = point.fields.len();
        measurement.emit(point);
        self.progress
            .made_values
            .fetch_add((point.fields.len() - fields_before) as u64, Ordering::Relaxed);

        made
    }

    fn next_sql(&self, out: &mut dyn Write) -> Result<u64> {
        if self.templates.is_empty() {
            return Err(SimError::NoTemplates);
        }
        let made = self.progress.made_sql.fetch_add(1, Ordering::Relaxed) + 1;
        let template = &self.templates[((made - 1) % self.templates.len() as u64) as usize];
        template.write_to(self, out)?;
        Ok(made)
    }

    fn seen_points(&self) -> u64 {
        self.progress
            .made_points
            .load(Ordering::Relaxed)
            .min(self.total)
    }

    fn seen_values(&self) -> u64 {
        self.progress.made_values.load(Ordering::Relaxed)
    }

    fn total(&self) -> u64 {
        self.total
    }

    fn set_written_points(&self, count: u64) {
        self.progress
            .written_points
            .fetch_max(count, Ordering::AcqRel);
    }

    fn set_sql_template(&mut self, templates: &[&str]) -> Result<()> {
        self.set_sql_templates_with_repeat(templates, 1)
    }
}

impl SqlSource for FleetSimulator {
    fn entity_count(&self) -> usize {
        self.entities.len()
    }

    fn tag_value(&self, entity: usize, key: usize) -> &str {
        &self.entities[entity].tags()[key].value
    }

    fn start(&self) -> Timestamp {
        self.range.start
    }

    fn end(&self) -> Timestamp {
        self.range.end
    }

    /// Start of the epoch after the last fully written one, capped at `end`.
    fn now(&self) -> Timestamp {
        let epochs_written = self.written_points() / self.points_per_epoch;
        if epochs_written >= self.epochs {
            return self.range.end;
        }
        self.epoch_timestamp(epochs_written).min(self.range.end)
    }
}
