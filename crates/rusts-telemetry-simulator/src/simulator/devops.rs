//! Devops workload: a fleet of hosts reporting system and service metrics.

use crate::error::Result;
use crate::host::new_host;
use crate::measurements::MeasurementKind;
use crate::overrides::TagOverrides;
use crate::simulator::FleetSimulator;
use rusts_core::{TimeRange, Timestamp};
use std::time::Duration;
use tracing::info;

/// Parameters of a devops fleet.
#[derive(Debug, Clone)]
pub struct DevopsConfig {
    /// Window start, nanoseconds (inclusive)
    pub start: Timestamp,
    /// Window end, nanoseconds (exclusive)
    pub end: Timestamp,
    pub interval: Duration,
    pub host_count: u64,
    /// Added to every host index when deriving identity tags
    pub host_offset: u64,
    /// Measurements every host reports, in row order
    pub kinds: Vec<MeasurementKind>,
    pub overrides: TagOverrides,
}

impl Default for DevopsConfig {
    fn default() -> Self {
        Self {
            start: 0,
            end: 0,
            interval: Duration::from_secs(10),
            host_count: 100,
            host_offset: 0,
            kinds: MeasurementKind::devops().to_vec(),
            overrides: TagOverrides::default(),
        }
    }
}

impl FleetSimulator {
    /// Builds a devops fleet of `host_count` hosts.
    pub fn devops(config: &DevopsConfig) -> Result<Self> {
        info!(
            "Building devops fleet: {} hosts (offset {}), measurements {:?}",
            config.host_count, config.host_offset, config.kinds
        );

        let hosts = (0..config.host_count)
            .map(|i| {
                new_host(
                    i,
                    config.host_offset,
                    config.start,
                    &config.kinds,
                    &config.overrides,
                )
            })
            .collect();

        FleetSimulator::from_entities(
            hosts,
            TimeRange::new(config.start, config.end),
            config.interval,
        )
    }
}
