//! Measurement generators.
//!
//! Every generator is built once per entity and exposes the same two calls:
//! `tick(interval)` once per simulated epoch, and `emit(point)` once per row.
//! The set of kinds is fixed, so dispatch is a plain `match` over
//! [`Measurement`].

pub mod city;
pub mod cpu;
pub mod disk;
pub mod diskio;
pub mod kernel;
pub mod mem;
pub mod net;
pub mod nginx;
pub mod redis;
pub mod synth;

use crate::error::{Result, SimError};
use crate::overrides::TagOverrides;
use rusts_core::{Point, Timestamp};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

pub use city::CityUtilityMeasurement;
pub use cpu::CpuMeasurement;
pub use disk::DiskMeasurement;
pub use diskio::DiskIoMeasurement;
pub use kernel::KernelMeasurement;
pub use mem::MemMeasurement;
pub use net::NetMeasurement;
pub use nginx::NginxMeasurement;
pub use redis::RedisMeasurement;

/// Measurement kinds known to the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementKind {
    Cpu,
    Disk,
    DiskIo,
    Kernel,
    Mem,
    Net,
    Nginx,
    Redis,
    CityUtility,
}

impl MeasurementKind {
    /// Measurement name written into points.
    pub fn as_str(&self) -> &'static str {
        match self {
            MeasurementKind::Cpu => cpu::NAME,
            MeasurementKind::Disk => disk::NAME,
            MeasurementKind::DiskIo => diskio::NAME,
            MeasurementKind::Kernel => kernel::NAME,
            MeasurementKind::Mem => mem::NAME,
            MeasurementKind::Net => net::NAME,
            MeasurementKind::Nginx => nginx::NAME,
            MeasurementKind::Redis => redis::NAME,
            MeasurementKind::CityUtility => city::NAME,
        }
    }

    /// Tag keys the generator appends, in order.
    pub fn tag_keys(&self) -> &'static [&'static str] {
        match self {
            MeasurementKind::Cpu | MeasurementKind::Kernel | MeasurementKind::Mem => &[],
            MeasurementKind::Disk => &disk::TAGS,
            MeasurementKind::DiskIo => &diskio::TAGS,
            MeasurementKind::Net => &net::TAGS,
            MeasurementKind::Nginx => &nginx::TAGS,
            MeasurementKind::Redis => &redis::TAGS,
            MeasurementKind::CityUtility => &city::TAGS,
        }
    }

    /// Field keys the generator appends, in order.
    pub fn field_keys(&self) -> &'static [&'static str] {
        match self {
            MeasurementKind::Cpu => &cpu::FIELDS,
            MeasurementKind::Disk => &disk::FIELDS,
            MeasurementKind::DiskIo => &diskio::FIELDS,
            MeasurementKind::Kernel => &kernel::FIELDS,
            MeasurementKind::Mem => &mem::FIELDS,
            MeasurementKind::Net => &net::FIELDS,
            MeasurementKind::Nginx => &nginx::FIELDS,
            MeasurementKind::Redis => &redis::FIELDS,
            MeasurementKind::CityUtility => &city::FIELDS,
        }
    }

    /// The kinds every devops host carries by default.
    pub fn devops() -> &'static [MeasurementKind] {
        &[
            MeasurementKind::Cpu,
            MeasurementKind::Disk,
            MeasurementKind::DiskIo,
            MeasurementKind::Kernel,
            MeasurementKind::Mem,
            MeasurementKind::Net,
            MeasurementKind::Nginx,
            MeasurementKind::Redis,
        ]
    }
}

impl std::fmt::Display for MeasurementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MeasurementKind {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "cpu" => Ok(MeasurementKind::Cpu),
            "disk" => Ok(MeasurementKind::Disk),
            "diskio" | "disk_io" => Ok(MeasurementKind::DiskIo),
            "kernel" => Ok(MeasurementKind::Kernel),
            "mem" => Ok(MeasurementKind::Mem),
            "net" => Ok(MeasurementKind::Net),
            "nginx" => Ok(MeasurementKind::Nginx),
            "redis" => Ok(MeasurementKind::Redis),
            "city_utility" | "city-utility" => Ok(MeasurementKind::CityUtility),
            other => Err(SimError::InvalidConfig(format!(
                "unknown measurement '{}'",
                other
            ))),
        }
    }
}

/// One generator instance owned by an entity.
#[derive(Debug)]
pub enum Measurement {
    Cpu(CpuMeasurement),
    Disk(DiskMeasurement),
    DiskIo(DiskIoMeasurement),
    Kernel(KernelMeasurement),
    Mem(MemMeasurement),
    Net(NetMeasurement),
    Nginx(NginxMeasurement),
    Redis(RedisMeasurement),
    CityUtility(CityUtilityMeasurement),
}

impl Measurement {
    /// Builds a generator, resolving its tag overrides once.
    pub fn new(kind: MeasurementKind, start: Timestamp, overrides: &TagOverrides) -> Self {
        match kind {
            MeasurementKind::Cpu => Measurement::Cpu(CpuMeasurement::new()),
            MeasurementKind::Disk => Measurement::Disk(DiskMeasurement::new(overrides)),
            MeasurementKind::DiskIo => Measurement::DiskIo(DiskIoMeasurement::new(overrides)),
            MeasurementKind::Kernel => Measurement::Kernel(KernelMeasurement::new(start)),
            MeasurementKind::Mem => Measurement::Mem(MemMeasurement::new()),
            MeasurementKind::Net => Measurement::Net(NetMeasurement::new(overrides)),
            MeasurementKind::Nginx => Measurement::Nginx(NginxMeasurement::new(overrides)),
            MeasurementKind::Redis => Measurement::Redis(RedisMeasurement::new(overrides)),
            MeasurementKind::CityUtility => {
                Measurement::CityUtility(CityUtilityMeasurement::new(overrides))
            }
        }
    }

    pub fn kind(&self) -> MeasurementKind {
        match self {
            Measurement::Cpu(_) => MeasurementKind::Cpu,
            Measurement::Disk(_) => MeasurementKind::Disk,
            Measurement::DiskIo(_) => MeasurementKind::DiskIo,
            Measurement::Kernel(_) => MeasurementKind::Kernel,
            Measurement::Mem(_) => MeasurementKind::Mem,
            Measurement::Net(_) => MeasurementKind::Net,
            Measurement::Nginx(_) => MeasurementKind::Nginx,
            Measurement::Redis(_) => MeasurementKind::Redis,
            Measurement::CityUtility(_) => MeasurementKind::CityUtility,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind().as_str()
    }

    /// Advances time-driven state by one sampling interval.
    pub fn tick(&self, interval: Duration) {
        match self {
            Measurement::Cpu(m) => m.tick(interval),
            Measurement::Disk(m) => m.tick(interval),
            Measurement::DiskIo(m) => m.tick(interval),
            Measurement::Kernel(m) => m.tick(interval),
            Measurement::Mem(m) => m.tick(interval),
            Measurement::Net(m) => m.tick(interval),
            Measurement::Nginx(m) => m.tick(interval),
            Measurement::Redis(m) => m.tick(interval),
            Measurement::CityUtility(m) => m.tick(interval),
        }
    }

    /// Sets the measurement name, then appends tags and fields in schema order.
    pub fn emit(&self, point: &mut Point) -> bool {
        match self {
            Measurement::Cpu(m) => m.emit(point),
            Measurement::Disk(m) => m.emit(point),
            Measurement::DiskIo(m) => m.emit(point),
            Measurement::Kernel(m) => m.emit(point),
            Measurement::Mem(m) => m.emit(point),
            Measurement::Net(m) => m.emit(point),
            Measurement::Nginx(m) => m.emit(point),
            Measurement::Redis(m) => m.emit(point),
            Measurement::CityUtility(m) => m.emit(point),
        }
    }
}
