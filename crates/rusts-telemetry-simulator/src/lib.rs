//! Synthetic telemetry generator for RusTs benchmarking.
//!
//! This crate produces time-ordered, high-cardinality measurement points and
//! templated read queries fast enough to saturate a database's write and
//! query paths. Any number of worker threads can drive one simulator through
//! a shared reference; the hot path only touches atomics.
//!
//! # Workloads
//! - `devops`: hosts reporting cpu, disk, diskio, kernel, mem, net, nginx and
//!   redis metrics
//! - `charge`: EV charge devices grouped into sites across administrative
//!   regions, reporting `city_utility`
//! - `metaquery`: a single-threaded two-tag cardinality generator
//!
//! # Usage
//! ```bash
//! # One day of devops data for 100 hosts, line protocol on stdout
//! rusts-telemetry-simulator points --entities 100
//!
//! # Site IN-list queries against a charge fleet
//! rusts-telemetry-simulator queries --workload charge --repeat 3 \
//!     -t "SELECT * FROM city_utility WHERE site_id IN ('{{site_id}}')"
//! ```

pub mod config;
pub mod device;
pub mod entity;
pub mod error;
pub mod host;
pub mod measurements;
pub mod overrides;
pub mod region;
pub mod rng;
pub mod simulator;
pub mod sql;
pub mod writer;

pub use config::{SimulatorConfig, Workload};
pub use entity::Entity;
pub use error::{Result, SimError};
pub use measurements::{Measurement, MeasurementKind};
pub use overrides::TagOverrides;
pub use region::{Region, RegionLookup, StaticRegionTable};
pub use simulator::{
    ChargeConfig, DevopsConfig, FleetSimulator, MetaQueryConfig, MetaQuerySimulator, Simulator,
};
pub use sql::{SqlSource, SqlTemplate};
pub use writer::{OutputFormat, PointWriter, WriteStats};
