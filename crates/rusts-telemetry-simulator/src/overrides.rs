//! Per-measurement tag overrides.
//!
//! A benchmark scenario can force a tag value for a measurement (for example
//! pin `disk.path` to `/data`). Generators query the table once, at entity
//! construction, and fall back to their own default when nothing is forced.

use rusts_core::TagValue;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// `measurement -> tag -> forced value`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagOverrides {
    values: HashMap<String, HashMap<String, String>>,
}

impl TagOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to force a value.
    pub fn with(
        mut self,
        measurement: impl Into<String>,
        tag: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.set(measurement, tag, value);
        self
    }

    pub fn set(
        &mut self,
        measurement: impl Into<String>,
        tag: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.values
            .entry(measurement.into())
            .or_default()
            .insert(tag.into(), value.into());
    }

    /// The forced value, if one exists.
    pub fn get(&self, measurement: &str, tag: &str) -> Option<&str> {
        self.values
            .get(measurement)
            .and_then(|tags| tags.get(tag))
            .map(String::as_str)
    }

    /// The forced value for `measurement.tag`, or `default` when absent.
    pub fn get_or(&self, measurement: &str, tag: &str, default: impl AsRef<str>) -> TagValue {
        Arc::from(self.get(measurement, tag).unwrap_or(default.as_ref()))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_or_default() {
        let overrides = TagOverrides::new().with("disk", "path", "/data");

        assert_eq!(&*overrides.get_or("disk", "path", "/"), "/data");
        assert_eq!(&*overrides.get_or("disk", "fstype", "ext4"), "ext4");
        assert_eq!(&*overrides.get_or("net", "path", "/"), "/");
    }

    #[test]
    fn test_deserialize_from_nested_map() {
        let json = r#"{"redis": {"port": "7000"}, "net": {"interface": "bond0"}}"#;
        let overrides: TagOverrides = serde_json::from_str(json).unwrap();

        assert_eq!(overrides.get("redis", "port"), Some("7000"));
        assert_eq!(overrides.get("net", "interface"), Some("bond0"));
        assert_eq!(overrides.get("redis", "server"), None);
    }
}
