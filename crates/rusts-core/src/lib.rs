//! RusTs Core - Core types for the time series database
//!
//! This crate provides the fundamental data types used throughout RusTs:
//! - `Timestamp`: Nanosecond-precision Unix epoch timestamps
//! - `SeriesId`: Unique identifier for a time series (measurement + tags)
//! - `Tag`: Key-value pair for series identification
//! - `FieldValue`: Typed field values (Float, Integer, Unsigned, Boolean)
//! - `Field`: Named field with a value
//! - `Point`: A reusable data point with timestamp, tags, and fields
//! - Line protocol serialization of points

pub mod error;
pub mod line_protocol;
pub mod types;

pub use error::{CoreError, Result};
pub use types::*;
