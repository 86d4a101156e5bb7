//! Simulators.
//!
//! - [`FleetSimulator`]: the concurrent engine behind the devops and
//!   live/charge workloads. Any number of threads may call
//!   [`Simulator::next`] on a shared reference.
//! - [`MetaQuerySimulator`]: a single-threaded cardinality generator. It
//!   takes `&mut self` and plain counters; it is only used on setup paths
//!   where nothing calls it concurrently.

pub mod charge;
pub mod devops;
pub mod fleet;
pub mod metaquery;

use crate::error::Result;
use rusts_core::Point;
use std::io::Write;

pub use charge::ChargeConfig;
pub use devops::DevopsConfig;
pub use fleet::FleetSimulator;
pub use metaquery::{MetaQueryConfig, MetaQuerySimulator};

/// The contract benchmark workers drive.
///
/// Every generating call returns a globally unique, strictly increasing
/// sequence number. Workers stop once the returned number exceeds
/// [`Simulator::total`]; reading [`Simulator::finished`] from several threads
/// is not enough to give every caller an exact share.
pub trait Simulator: Send + Sync {
    /// Fills `point` with the next row and returns its sequence number.
    ///
    /// The point must have been reset by the caller. Calls past the end
    /// return a number above `total()` and leave the point untouched.
    fn next(&self, point: &mut Point) -> u64;

    /// Writes the next query instantiation and returns its sequence number.
    fn next_sql(&self, out: &mut dyn Write) -> Result<u64>;

    /// Points generated so far (never above `total()`).
    fn seen_points(&self) -> u64;

    /// Field values generated so far.
    fn seen_values(&self) -> u64;

    /// Points this simulator produces in total.
    fn total(&self) -> u64;

    fn finished(&self) -> bool {
        self.seen_points() >= self.total()
    }

    /// Reports write progress confirmed by the store; lower values are ignored.
    fn set_written_points(&self, count: u64);

    /// Parses and installs the query templates used by `next_sql`.
    fn set_sql_template(&mut self, templates: &[&str]) -> Result<()>;
}
