//! Configuration structs for the telemetry simulator.

use crate::error::{Result, SimError};
use crate::measurements::MeasurementKind;
use crate::overrides::TagOverrides;
use crate::region::{RegionLookup, StaticRegionTable};
use crate::simulator::{ChargeConfig, DevopsConfig, FleetSimulator, MetaQueryConfig, MetaQuerySimulator};
use chrono::{DateTime, TimeZone, Utc};
use rusts_core::{CoreError, TimeRange, Timestamp};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// 2016-01-01T00:00:00Z
const DEFAULT_START: Timestamp = 1_451_606_400_000_000_000;
const DAY: Timestamp = 86_400_000_000_000;

/// Workload family a configuration describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Workload {
    /// Hosts reporting system and service metrics
    Devops,
    /// EV charge devices grouped into sites
    Charge,
    /// Two-dimensional cardinality stress
    MetaQuery,
}

impl std::fmt::Display for Workload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Workload::Devops => write!(f, "devops"),
            Workload::Charge => write!(f, "charge"),
            Workload::MetaQuery => write!(f, "metaquery"),
        }
    }
}

impl FromStr for Workload {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "devops" => Ok(Workload::Devops),
            "charge" | "live" => Ok(Workload::Charge),
            "metaquery" => Ok(Workload::MetaQuery),
            other => Err(SimError::InvalidConfig(format!("unknown workload '{}'", other))),
        }
    }
}

/// Main configuration for the simulator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    pub workload: Workload,

    /// Window start (inclusive)
    pub start: DateTime<Utc>,

    /// Window end (exclusive)
    pub end: DateTime<Utc>,

    /// Sampling interval between two rows of the same entity
    pub interval: Duration,

    /// Hosts or devices to simulate
    pub entity_count: u64,

    /// Identity offset, so several generators can cover disjoint fleets
    pub offset: u64,

    /// Devops measurements per host; empty means all of them
    pub kinds: Vec<MeasurementKind>,

    /// Charge devices per site
    pub devices_per_site: u64,

    /// Metaquery pool size per tag dimension
    pub axis: u64,

    /// Metaquery row count
    pub points: u64,

    pub overrides: TagOverrides,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            workload: Workload::Devops,
            start: Utc.timestamp_nanos(DEFAULT_START),
            end: Utc.timestamp_nanos(DEFAULT_START + DAY),
            interval: Duration::from_secs(10),
            entity_count: 100,
            offset: 0,
            kinds: MeasurementKind::devops().to_vec(),
            devices_per_site: 10,
            axis: 100,
            points: 10_000,
            overrides: TagOverrides::default(),
        }
    }
}

impl SimulatorConfig {
    /// Checks the settings the selected workload depends on.
    pub fn validate(&self) -> Result<()> {
        let range = self.time_range()?;
        if range.is_empty() {
            return Err(SimError::InvalidConfig(format!(
                "end ({}) must be after start ({})",
                self.end, self.start
            )));
        }

        match self.workload {
            Workload::Devops | Workload::Charge => {
                if self.interval.is_zero() {
                    return Err(SimError::InvalidConfig("interval must be positive".to_string()));
                }
                if self.entity_count == 0 {
                    return Err(SimError::InvalidConfig(
                        "entity_count must be positive".to_string(),
                    ));
                }
                if self.workload == Workload::Charge && self.devices_per_site == 0 {
                    return Err(SimError::InvalidConfig(
                        "devices_per_site must be positive".to_string(),
                    ));
                }
            }
            Workload::MetaQuery => {
                if self.axis == 0 || self.points == 0 {
                    return Err(SimError::InvalidConfig(
                        "axis and points must be positive".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }

    /// The window in nanoseconds.
    pub fn time_range(&self) -> Result<TimeRange> {
        Ok(TimeRange::new(to_nanos(&self.start)?, to_nanos(&self.end)?))
    }

    /// Devops parameters; an empty kind list selects every devops measurement.
    pub fn devops(&self) -> Result<DevopsConfig> {
        let range = self.time_range()?;
        let kinds = if self.kinds.is_empty() {
            MeasurementKind::devops().to_vec()
        } else {
            self.kinds.clone()
        };
        Ok(DevopsConfig {
            start: range.start,
            end: range.end,
            interval: self.interval,
            host_count: self.entity_count,
            host_offset: self.offset,
            kinds,
            overrides: self.overrides.clone(),
        })
    }

    pub fn charge(&self) -> Result<ChargeConfig> {
        let range = self.time_range()?;
        Ok(ChargeConfig {
            start: range.start,
            end: range.end,
            interval: self.interval,
            device_count: self.entity_count,
            device_offset: self.offset,
            devices_per_site: self.devices_per_site,
            overrides: self.overrides.clone(),
        })
    }

    pub fn metaquery(&self) -> Result<MetaQueryConfig> {
        let range = self.time_range()?;
        Ok(MetaQueryConfig {
            axis: self.axis,
            points: self.points,
            start: range.start,
            end: range.end,
        })
    }

    /// Builds the concurrent simulator with the built-in region table.
    pub fn build(&self) -> Result<FleetSimulator> {
        self.build_with_regions(&StaticRegionTable::new())
    }

    pub fn build_with_regions(&self, regions: &dyn RegionLookup) -> Result<FleetSimulator> {
        self.validate()?;
        match self.workload {
            Workload::Devops => FleetSimulator::devops(&self.devops()?),
            Workload::Charge => FleetSimulator::charge(&self.charge()?, regions),
            Workload::MetaQuery => Err(SimError::InvalidConfig(
                "the metaquery workload is single-threaded; use build_metaquery".to_string(),
            )),
        }
    }

    pub fn build_metaquery(&self) -> Result<MetaQuerySimulator> {
        self.validate()?;
        MetaQuerySimulator::new(&self.metaquery()?)
    }
}

fn to_nanos(time: &DateTime<Utc>) -> Result<Timestamp> {
    time.timestamp_nanos_opt()
        .ok_or_else(|| CoreError::InvalidTimestamp(time.timestamp()).into())
}
