//! Devops hosts.
//!
//! Identity tags (`hostname`, `region`, `datacenter`, `rack`) are a pure
//! function of `index + offset`, so two runs with the same offset describe
//! the same fleet. Attribute tags (os, arch, team, service...) are drawn at
//! random once per host and never change afterwards.

use crate::entity::Entity;
use crate::measurements::{Measurement, MeasurementKind};
use crate::overrides::TagOverrides;
use rand::prelude::*;
use rusts_core::{Tag, Timestamp};

/// Tag keys of every devops host, in emission order.
pub const TAGS: [&str; 10] = [
    "hostname",
    "region",
    "datacenter",
    "rack",
    "os",
    "arch",
    "team",
    "service",
    "service_version",
    "service_environment",
];

/// (region, datacenters)
const REGIONS: &[(&str, &[&str])] = &[
    ("us-east-1", &["us-east-1a", "us-east-1b", "us-east-1c", "us-east-1e"]),
    ("us-west-1", &["us-west-1a", "us-west-1b"]),
    ("us-west-2", &["us-west-2a", "us-west-2b", "us-west-2c"]),
    ("eu-west-1", &["eu-west-1a", "eu-west-1b", "eu-west-1c"]),
    ("eu-central-1", &["eu-central-1a", "eu-central-1b"]),
    ("ap-southeast-1", &["ap-southeast-1a", "ap-southeast-1b"]),
    ("ap-southeast-2", &["ap-southeast-2a", "ap-southeast-2b"]),
    ("ap-northeast-1", &["ap-northeast-1a", "ap-northeast-1c"]),
    ("sa-east-1", &["sa-east-1a", "sa-east-1b", "sa-east-1c"]),
];

const RACKS: u64 = 100;
const OS: [&str; 3] = ["Ubuntu16.10", "Ubuntu16.04LTS", "Ubuntu15.10"];
const ARCH: [&str; 2] = ["x64", "x86"];
const TEAMS: [&str; 4] = ["SF", "NYC", "LON", "CHI"];
const SERVICES: u32 = 20;
const SERVICE_VERSIONS: u32 = 2;
const ENVIRONMENTS: [&str; 3] = ["production", "staging", "test"];

/// Builds host `index` of a fleet whose identities start at `offset`.
pub fn new_host(
    index: u64,
    offset: u64,
    start: Timestamp,
    kinds: &[MeasurementKind],
    overrides: &TagOverrides,
) -> Entity {
    let n = index + offset;
    let (region, datacenters) = REGIONS[(n % REGIONS.len() as u64) as usize];
    let spread = n / REGIONS.len() as u64;
    let datacenter = datacenters[(spread % datacenters.len() as u64) as usize];

    let mut rng = rand::thread_rng();
    let pick = |choices: &[&'static str], rng: &mut ThreadRng| -> &'static str {
        choices.choose(rng).copied().unwrap_or_default()
    };

    let tags = vec![
        Tag::new(TAGS[0], format!("host_{}", n)),
        Tag::new(TAGS[1], region),
        Tag::new(TAGS[2], datacenter),
        Tag::new(TAGS[3], (spread % RACKS).to_string()),
        Tag::new(TAGS[4], pick(&OS, &mut rng)),
        Tag::new(TAGS[5], pick(&ARCH, &mut rng)),
        Tag::new(TAGS[6], pick(&TEAMS, &mut rng)),
        Tag::new(TAGS[7], rng.gen_range(0..SERVICES).to_string()),
        Tag::new(TAGS[8], rng.gen_range(0..SERVICE_VERSIONS).to_string()),
        Tag::new(TAGS[9], pick(&ENVIRONMENTS, &mut rng)),
    ];

    let measurements = kinds
        .iter()
        .map(|kind| Measurement::new(*kind, start, overrides))
        .collect();

    Entity::new(n, tags, measurements)
}
