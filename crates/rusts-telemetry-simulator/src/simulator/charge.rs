//! Live/charge workload: EV charge devices grouped into sites across
//! administrative regions.

use crate::device::new_charge_device;
use crate::error::Result;
use crate::overrides::TagOverrides;
use crate::region::RegionLookup;
use crate::simulator::FleetSimulator;
use rusts_core::{TimeRange, Timestamp};
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone)]
pub struct ChargeConfig {
    pub start: Timestamp,
    pub end: Timestamp,
    pub interval: Duration,
    pub device_count: u64,
    pub device_offset: u64,
    /// Consecutive devices sharing one `site_id`
    pub devices_per_site: u64,
    pub overrides: TagOverrides,
}

impl Default for ChargeConfig {
    fn default() -> Self {
        Self {
            start: 0,
            end: 0,
            interval: Duration::from_secs(10),
            device_count: 1000,
            device_offset: 0,
            devices_per_site: 10,
            overrides: TagOverrides::default(),
        }
    }
}

impl FleetSimulator {
    /// Builds a charge-device fleet, resolving regions through `regions`.
    pub fn charge(config: &ChargeConfig, regions: &dyn RegionLookup) -> Result<Self> {
        info!(
            "Building charge fleet: {} devices (offset {}), {} per site, {} region codes",
            config.device_count,
            config.device_offset,
            config.devices_per_site,
            regions.codes().len()
        );

        let devices = (0..config.device_count)
            .map(|i| {
                new_charge_device(
                    i,
                    config.device_offset,
                    config.start,
                    config.devices_per_site,
                    regions,
                    &config.overrides,
                )
            })
            .collect::<Result<Vec<_>>>()?;

        FleetSimulator::from_entities(
            devices,
            TimeRange::new(config.start, config.end),
            config.interval,
        )
    }
}
