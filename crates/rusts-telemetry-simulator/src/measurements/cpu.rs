//! `cpu` measurement: ten usage percentages, drawn independently per row.
//!
//! One 64-bit draw plus one 32-bit draw are sliced into 7-bit values, so a
//! whole row costs two RNG calls instead of ten.

use crate::rng;
use rusts_core::Point;
use std::time::Duration;

pub const NAME: &str = "cpu";

pub const FIELDS: [&str; 10] = [
    "usage_user",
    "usage_system",
    "usage_idle",
    "usage_nice",
    "usage_iowait",
    "usage_irq",
    "usage_softirq",
    "usage_steal",
    "usage_guest",
    "usage_guest_nice",
];

const SLICE_BITS: u32 = 7;

#[derive(Debug, Default)]
pub struct CpuMeasurement;

impl CpuMeasurement {
    pub fn new() -> Self {
        Self
    }

    pub fn tick(&self, _interval: Duration) {}

    pub fn emit(&self, point: &mut Point) -> bool {
        point.set_measurement(NAME);

        let word = rng::draw64();
        let extra = rng::draw32();
        for (i, key) in FIELDS.iter().enumerate() {
            // 9 slices fit in 63 bits; the tenth comes from the extra draw
            let slice = if i < 9 {
                rng::bits(word, i as u32, SLICE_BITS)
            } else {
                rng::bits(extra as u64, 0, SLICE_BITS)
            };
            point.append_field(*key, rng::scale(slice, SLICE_BITS, 0.0, 100.0));
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_in_order_and_bounded() {
        let cpu = CpuMeasurement::new();
        let mut point = Point::new();
        for _ in 0..1000 {
            point.reset();
            assert!(cpu.emit(&mut point));
            assert_eq!(point.measurement, NAME);
            assert!(point.tags.is_empty());
            assert_eq!(point.field_keys().collect::<Vec<_>>(), FIELDS.to_vec());
            for field in &point.fields {
                let v = field.value.as_f64().unwrap();
                assert!((0.0..=100.0).contains(&v));
            }
        }
    }
}
