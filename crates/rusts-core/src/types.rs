//! Core data types for RusTs time series points

use crate::error::{CoreError, Result};
use fxhash::FxHasher;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Nanosecond-precision Unix epoch timestamp
pub type Timestamp = i64;

/// Unique identifier for a time series (hash of measurement + tags)
pub type SeriesId = u64;

/// Shared, immutable tag value.
///
/// Entities compute their tag values once; every emitted point only bumps a
/// reference count instead of copying the bytes.
pub type TagValue = Arc<str>;

/// A tag is a key-value pair used for series identification
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Tag {
    pub key: &'static str,
    pub value: TagValue,
}

impl Tag {
    /// Create a new tag
    pub fn new(key: &'static str, value: impl Into<TagValue>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }

    /// Validate the tag
    pub fn validate(&self) -> Result<()> {
        if self.key.is_empty() {
            return Err(CoreError::EmptyTagKey);
        }
        Ok(())
    }
}

/// Field value types produced by the generators
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    /// 64-bit floating point
    Float(f64),
    /// 64-bit signed integer
    Integer(i64),
    /// 64-bit unsigned integer
    UnsignedInteger(u64),
    /// Boolean value
    Boolean(bool),
}

impl FieldValue {
    /// Get the type name of this field value
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Float(_) => "float",
            FieldValue::Integer(_) => "integer",
            FieldValue::UnsignedInteger(_) => "unsigned",
            FieldValue::Boolean(_) => "boolean",
        }
    }

    /// Try to convert to f64
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(v) => Some(*v),
            FieldValue::Integer(v) => Some(*v as f64),
            FieldValue::UnsignedInteger(v) => Some(*v as f64),
            FieldValue::Boolean(_) => None,
        }
    }

    /// Try to convert to u64
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            FieldValue::UnsignedInteger(v) => Some(*v),
            FieldValue::Integer(v) if *v >= 0 => Some(*v as u64),
            _ => None,
        }
    }

    /// Try to get as boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Integer(v)
    }
}

impl From<u64> for FieldValue {
    fn from(v: u64) -> Self {
        FieldValue::UnsignedInteger(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Boolean(v)
    }
}

/// A field is a named value in a data point
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub key: &'static str,
    pub value: FieldValue,
}

impl Field {
    /// Create a new field
    pub fn new(key: &'static str, value: impl Into<FieldValue>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }

    /// Validate the field
    pub fn validate(&self) -> Result<()> {
        if self.key.is_empty() {
            return Err(CoreError::EmptyFieldKey);
        }
        Ok(())
    }
}

/// A reusable data point.
///
/// Producers fill a point in a fixed order: timestamp and measurement first,
/// then tags, then fields. Tags and fields are only ever appended; callers
/// call [`Point::reset`] between rows, which keeps the allocated capacity so
/// a hot loop settles into zero allocations.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Point {
    /// The measurement name (like a table name)
    pub measurement: &'static str,
    /// Timestamp in nanoseconds since Unix epoch
    pub timestamp: Timestamp,
    /// Tags in schema order
    pub tags: Vec<Tag>,
    /// Fields in schema order
    pub fields: Vec<Field>,
}

impl Point {
    /// Create an empty point
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty point with room for `tags` tags and `fields` fields
    pub fn with_capacity(tags: usize, fields: usize) -> Self {
        Self {
            measurement: "",
            timestamp: 0,
            tags: Vec::with_capacity(tags),
            fields: Vec::with_capacity(fields),
        }
    }

    /// Clear measurement, tags and fields, keeping allocations
    pub fn reset(&mut self) {
        self.measurement = "";
        self.timestamp = 0;
        self.tags.clear();
        self.fields.clear();
    }

    pub fn set_measurement(&mut self, measurement: &'static str) {
        self.measurement = measurement;
    }

    pub fn set_timestamp(&mut self, timestamp: Timestamp) {
        self.timestamp = timestamp;
    }

    /// Append a tag; the value is shared, not copied
    #[inline]
    pub fn append_tag(&mut self, key: &'static str, value: &TagValue) {
        self.tags.push(Tag {
            key,
            value: Arc::clone(value),
        });
    }

    /// Append a field
    #[inline]
    pub fn append_field(&mut self, key: &'static str, value: impl Into<FieldValue>) {
        self.fields.push(Field {
            key,
            value: value.into(),
        });
    }

    /// Validate the point
    pub fn validate(&self) -> Result<()> {
        if self.measurement.is_empty() {
            return Err(CoreError::EmptyMeasurement);
        }
        if self.fields.is_empty() {
            return Err(CoreError::NoFields);
        }
        for tag in &self.tags {
            tag.validate()?;
        }
        for field in &self.fields {
            field.validate()?;
        }
        Ok(())
    }

    /// Compute the series ID for this point
    pub fn series_id(&self) -> SeriesId {
        compute_series_id(self.measurement, &self.tags)
    }

    /// Get a tag value by key
    pub fn get_tag(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|t| t.key == key)
            .map(|t| t.value.as_ref())
    }

    /// Get a field value by key
    pub fn get_field(&self, key: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|f| f.key == key).map(|f| &f.value)
    }

    /// Tag keys in insertion order
    pub fn tag_keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.tags.iter().map(|t| t.key)
    }

    /// Field keys in insertion order
    pub fn field_keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.key)
    }
}

/// Compute a series ID from measurement and tags
/// Uses FxHash for fast hashing
pub fn compute_series_id(measurement: &str, tags: &[Tag]) -> SeriesId {
    let mut hasher = FxHasher::default();
    measurement.hash(&mut hasher);
    for tag in tags {
        tag.key.hash(&mut hasher);
        tag.value.hash(&mut hasher);
    }
    hasher.finish()
}

/// Time range for queries and simulated windows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    /// Start timestamp (inclusive)
    pub start: Timestamp,
    /// End timestamp (exclusive)
    pub end: Timestamp,
}

impl TimeRange {
    /// Create a new time range
    pub fn new(start: Timestamp, end: Timestamp) -> Self {
        Self { start, end }
    }

    /// Check if a timestamp falls within this range
    pub fn contains(&self, ts: Timestamp) -> bool {
        ts >= self.start && ts < self.end
    }

    /// Get the duration of this range in nanoseconds, or `None` when it does
    /// not fit in an `i64`
    pub fn duration_nanos(&self) -> Option<i64> {
        self.end.checked_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_creation_and_validation() {
        let tag = Tag::new("host", "server01");
        assert_eq!(tag.key, "host");
        assert_eq!(&*tag.value, "server01");
        assert!(tag.validate().is_ok());

        let empty_key = Tag::new("", "value");
        assert!(empty_key.validate().is_err());
    }

    #[test]
    fn test_field_value_conversions() {
        let fv = FieldValue::Float(3.5);
        assert_eq!(fv.as_f64(), Some(3.5));
        assert_eq!(fv.type_name(), "float");

        let fv = FieldValue::Integer(-42);
        assert_eq!(fv.as_f64(), Some(-42.0));
        assert_eq!(fv.as_u64(), None);

        let fv = FieldValue::UnsignedInteger(100);
        assert_eq!(fv.as_u64(), Some(100));

        let fv = FieldValue::Boolean(true);
        assert_eq!(fv.as_bool(), Some(true));
        assert_eq!(fv.as_f64(), None);
    }

    #[test]
    fn test_append_preserves_order() {
        let host: TagValue = Arc::from("server01");
        let region: TagValue = Arc::from("us-west");

        let mut point = Point::new();
        point.set_timestamp(1000);
        point.set_measurement("cpu");
        point.append_tag("region", &region);
        point.append_tag("host", &host);
        point.append_field("usage", 64.5_f64);
        point.append_field("cores", 8_i64);

        // Insertion order is kept, never sorted
        assert_eq!(point.tag_keys().collect::<Vec<_>>(), vec!["region", "host"]);
        assert_eq!(point.field_keys().collect::<Vec<_>>(), vec!["usage", "cores"]);
        assert_eq!(point.get_tag("host"), Some("server01"));
        assert_eq!(point.get_field("cores"), Some(&FieldValue::Integer(8)));
        assert!(point.validate().is_ok());

        // Appending shares the value
        assert_eq!(Arc::strong_count(&host), 2);
    }

    #[test]
    fn test_reset_keeps_capacity() {
        let mut point = Point::with_capacity(4, 8);
        point.set_measurement("mem");
        point.append_field("used", 1_u64);
        point.reset();

        assert_eq!(point.measurement, "");
        assert!(point.fields.is_empty());
        assert!(point.fields.capacity() >= 8);
        assert!(point.tags.capacity() >= 4);
    }

    #[test]
    fn test_point_validation() {
        let mut point = Point::new();
        point.append_field("value", 42_i64);
        assert!(matches!(point.validate(), Err(CoreError::EmptyMeasurement)));

        let mut point = Point::new();
        point.set_measurement("cpu");
        assert!(matches!(point.validate(), Err(CoreError::NoFields)));
    }

    #[test]
    fn test_series_id_depends_on_tags() {
        let a: TagValue = Arc::from("a");
        let b: TagValue = Arc::from("b");

        let mut p1 = Point::new();
        p1.set_measurement("cpu");
        p1.append_tag("host", &a);
        p1.append_field("value", 1_i64);

        let mut p2 = p1.clone();
        p2.fields[0].value = FieldValue::Integer(2);
        assert_eq!(p1.series_id(), p2.series_id());

        let mut p3 = Point::new();
        p3.set_measurement("cpu");
        p3.append_tag("host", &b);
        p3.append_field("value", 1_i64);
        assert_ne!(p1.series_id(), p3.series_id());
    }

    #[test]
    fn test_time_range() {
        let range = TimeRange::new(100, 200);

        assert!(range.contains(100));
        assert!(range.contains(150));
        assert!(!range.contains(200)); // end is exclusive
        assert!(!range.contains(50));
        assert_eq!(range.duration_nanos(), Some(100));
        assert_eq!(TimeRange::new(i64::MIN, i64::MAX).duration_nanos(), None);
        assert!(!range.is_empty());
        assert!(TimeRange::new(5, 5).is_empty());
    }

    #[test]
    fn test_json_serialization() {
        let host: TagValue = Arc::from("server01");
        let mut point = Point::new();
        point.set_timestamp(1609459200000000000);
        point.set_measurement("cpu");
        point.append_tag("host", &host);
        point.append_field("usage", 64.5_f64);

        let json = serde_json::to_string(&point).unwrap();
        assert!(json.contains("\"measurement\":\"cpu\""));
        assert!(json.contains("\"server01\""));
    }
}
