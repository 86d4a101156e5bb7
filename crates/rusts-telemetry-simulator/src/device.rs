//! Charge devices for the live/charge workload.
//!
//! Devices are grouped into sites; every site sits in one administrative
//! region resolved through a [`RegionLookup`]. Everything except `vendor` is
//! derived from `index + offset`.

use crate::entity::Entity;
use crate::error::{Result, SimError};
use crate::measurements::{Measurement, MeasurementKind};
use crate::overrides::TagOverrides;
use crate::region::RegionLookup;
use rand::prelude::*;
use rusts_core::{Tag, Timestamp};

/// Tag keys of every charge device, in emission order.
pub const TAGS: [&str; 6] = ["province", "city", "county", "site_id", "device_id", "vendor"];

/// Width of the zero-padded `device_id`.
pub const DEVICE_ID_WIDTH: usize = 10;

const VENDORS: [&str; 4] = ["abb", "delta", "siemens", "teld"];
const UNKNOWN: &str = "unknown";

/// Builds charge device `index` of a fleet whose identities start at `offset`.
pub fn new_charge_device(
    index: u64,
    offset: u64,
    start: Timestamp,
    devices_per_site: u64,
    regions: &dyn RegionLookup,
    overrides: &TagOverrides,
) -> Result<Entity> {
    let codes = regions.codes();
    if codes.is_empty() {
        return Err(SimError::InvalidConfig("region table is empty".to_string()));
    }
    if devices_per_site == 0 {
        return Err(SimError::InvalidConfig(
            "devices_per_site must be positive".to_string(),
        ));
    }

    let n = index + offset;
    let site = n / devices_per_site;
    let code = codes[(site % codes.len() as u64) as usize];
    let site_in_region = site / codes.len() as u64;

    let (province, city, county) = match regions.lookup(code) {
        Some(region) => (region.province, region.city, region.county),
        None => (UNKNOWN.to_string(), UNKNOWN.to_string(), UNKNOWN.to_string()),
    };
    let vendor = VENDORS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(UNKNOWN);

    let tags = vec![
        Tag::new(TAGS[0], province),
        Tag::new(TAGS[1], city),
        Tag::new(TAGS[2], county),
        Tag::new(TAGS[3], format!("site_{}_{:04}", code, site_in_region)),
        Tag::new(TAGS[4], format!("{:0width$}", n, width = DEVICE_ID_WIDTH)),
        Tag::new(TAGS[5], vendor),
    ];
    let measurements = vec![Measurement::new(
        MeasurementKind::CityUtility,
        start,
        overrides,
    )];

    Ok(Entity::new(n, tags, measurements))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::{Region, StaticRegionTable};

    fn tag<'a>(entity: &'a Entity, key: &str) -> &'a str {
        entity.tag(key).map(|v| &**v).unwrap()
    }

    #[test]
    fn test_identity_tags() {
        let table = StaticRegionTable::new();
        let overrides = TagOverrides::new();
        let device = new_charge_device(42, 0, 0, 10, &table, &overrides).unwrap();

        assert_eq!(device.tag_keys().collect::<Vec<_>>(), TAGS.to_vec());
        assert_eq!(tag(&device, "device_id"), "0000000042");

        // device 42 belongs to site 4, the fifth code of the table
        let code = table.codes()[4];
        let region = table.lookup(code).unwrap();
        assert_eq!(tag(&device, "province"), region.province);
        assert_eq!(tag(&device, "city"), region.city);
        assert_eq!(tag(&device, "county"), region.county);
        assert_eq!(tag(&device, "site_id"), format!("site_{}_0000", code));
    }

    #[test]
    fn test_devices_share_sites() {
        let table = StaticRegionTable::new();
        let overrides = TagOverrides::new();
        let a = new_charge_device(0, 20, 0, 4, &table, &overrides).unwrap();
        let b = new_charge_device(3, 20, 0, 4, &table, &overrides).unwrap();
        let c = new_charge_device(4, 20, 0, 4, &table, &overrides).unwrap();

        assert_eq!(tag(&a, "site_id"), tag(&b, "site_id"));
        assert_ne!(tag(&a, "site_id"), tag(&c, "site_id"));
    }

    struct EmptyTable;

    impl RegionLookup for EmptyTable {
        fn codes(&self) -> &[u32] {
            &[]
        }

        fn lookup(&self, _code: u32) -> Option<Region> {
            None
        }
    }

    #[test]
    fn test_empty_region_table_rejected() {
        let result = new_charge_device(0, 0, 0, 1, &EmptyTable, &TagOverrides::new());
        assert!(matches!(result, Err(SimError::InvalidConfig(_))));
    }
}
