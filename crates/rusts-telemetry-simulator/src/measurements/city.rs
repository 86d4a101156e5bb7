//! `city_utility` measurement: EV charging point telemetry.
//!
//! Voltage, current and temperature walk within physical bounds. Delivered
//! energy is integrated on `tick` from the last reported power, so it only
//! ever grows.

use super::synth::{FloatCounter, FloatWalk};
use crate::overrides::TagOverrides;
use crate::rng;
use rand::prelude::*;
use rusts_core::{Point, TagValue};
use std::time::Duration;

pub const NAME: &str = "city_utility";

pub const TAGS: [&str; 1] = ["station_type"];

pub const FIELDS: [&str; 6] = [
    "voltage",
    "current",
    "power",
    "energy_kwh",
    "temperature",
    "charging",
];

pub const VOLTAGE_RANGE: (f64, f64) = (200.0, 250.0);
pub const CURRENT_RANGE: (f64, f64) = (0.0, 250.0);
pub const TEMPERATURE_RANGE: (f64, f64) = (-10.0, 80.0);

const STATION_TYPES: [&str; 2] = ["ac_slow", "dc_fast"];

#[derive(Debug)]
pub struct CityUtilityMeasurement {
    station_type: TagValue,
    voltage: FloatWalk,
    current: FloatWalk,
    temperature: FloatWalk,
    energy_kwh: FloatCounter,
    /// Last emitted power in kW, stored as f64 bits
    last_power: FloatWalk,
}

impl CityUtilityMeasurement {
    pub fn new(overrides: &TagOverrides) -> Self {
        let mut rng = rand::thread_rng();
        let station_type = STATION_TYPES.choose(&mut rng).copied().unwrap_or("ac_slow");
        let max_power = VOLTAGE_RANGE.1 * CURRENT_RANGE.1 / 1000.0;

        Self {
            station_type: overrides.get_or(NAME, "station_type", station_type),
            voltage: FloatWalk::new(
                rng.gen_range(215.0..235.0),
                VOLTAGE_RANGE.0,
                VOLTAGE_RANGE.1,
                2.0,
            ),
            current: FloatWalk::new(
                rng.gen_range(0.0..100.0),
                CURRENT_RANGE.0,
                CURRENT_RANGE.1,
                5.0,
            ),
            temperature: FloatWalk::new(
                rng.gen_range(10.0..35.0),
                TEMPERATURE_RANGE.0,
                TEMPERATURE_RANGE.1,
                0.5,
            ),
            energy_kwh: FloatCounter::default(),
            last_power: FloatWalk::new(0.0, 0.0, max_power, 0.0),
        }
    }

    /// Integrates the last reported power over one interval.
    pub fn tick(&self, interval: Duration) {
        let hours = interval.as_secs_f64() / 3600.0;
        self.energy_kwh.add(self.last_power.get() * hours);
    }

    pub fn emit(&self, point: &mut Point) -> bool {
        point.set_measurement(NAME);
        point.append_tag(TAGS[0], &self.station_type);

        let voltage = self.voltage.advance();
        let current = self.current.advance();
        let power = voltage * current / 1000.0;
        self.last_power.set(power);

        point.append_field(FIELDS[0], voltage);
        point.append_field(FIELDS[1], current);
        point.append_field(FIELDS[2], power);
        point.append_field(FIELDS[3], self.energy_kwh.get());
        point.append_field(FIELDS[4], self.temperature.advance());
        point.append_field(FIELDS[5], rng::draw32_below(4) != 0);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        let city = CityUtilityMeasurement::new(&TagOverrides::new());
        let mut point = Point::new();
        for _ in 0..10_000 {
            point.reset();
            city.emit(&mut point);
            assert_eq!(point.field_keys().collect::<Vec<_>>(), FIELDS.to_vec());

            let v = point.get_field("voltage").unwrap().as_f64().unwrap();
            let c = point.get_field("current").unwrap().as_f64().unwrap();
            let t = point.get_field("temperature").unwrap().as_f64().unwrap();
            assert!((VOLTAGE_RANGE.0..=VOLTAGE_RANGE.1).contains(&v));
            assert!((CURRENT_RANGE.0..=CURRENT_RANGE.1).contains(&c));
            assert!((TEMPERATURE_RANGE.0..=TEMPERATURE_RANGE.1).contains(&t));
            assert!(point.get_field("charging").unwrap().as_bool().is_some());
        }
    }

    #[test]
    fn test_energy_grows_on_tick() {
        let city = CityUtilityMeasurement::new(&TagOverrides::new());
        let mut point = Point::new();
        let mut last = 0.0;
        for _ in 0..1000 {
            point.reset();
            city.emit(&mut point);
            let energy = point.get_field("energy_kwh").unwrap().as_f64().unwrap();
            assert!(energy >= last);
            last = energy;
            city.tick(Duration::from_secs(60));
        }
        assert!(last > 0.0);
    }
}
