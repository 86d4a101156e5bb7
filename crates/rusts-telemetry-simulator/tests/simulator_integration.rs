//! Concurrency and ordering tests for the fleet simulators.

use rusts_core::{FieldValue, Point};
use rusts_telemetry_simulator::{
    ChargeConfig, DevopsConfig, FleetSimulator, Measurement, MeasurementKind, MetaQueryConfig,
    MetaQuerySimulator, OutputFormat, PointWriter, SimError, Simulator, SimulatorConfig,
    StaticRegionTable, TagOverrides, Workload,
};
use std::collections::{HashMap, HashSet};
use std::time::Duration;

const START: i64 = 1_451_606_400_000_000_000;
const SEC: i64 = 1_000_000_000;

fn devops(hosts: u64, kinds: &[MeasurementKind], secs: i64, interval_secs: u64) -> FleetSimulator {
    FleetSimulator::devops(&DevopsConfig {
        start: START,
        end: START + secs * SEC,
        interval: Duration::from_secs(interval_secs),
        host_count: hosts,
        kinds: kinds.to_vec(),
        ..Default::default()
    })
    .unwrap()
}

/// A row captured by a worker: (sequence, hostname, measurement, timestamp, fields)
type Row = (u64, String, &'static str, i64, Vec<(&'static str, FieldValue)>);

fn drain(sim: &FleetSimulator, limit: Option<u64>) -> Vec<Row> {
    let mut rows = Vec::new();
    let mut point = Point::new();
    loop {
        if limit.is_some_and(|l| rows.len() as u64 >= l) {
            break;
        }
        point.reset();
        let seq = sim.next(&mut point);
        if seq > sim.total() {
            break;
        }
        rows.push((
            seq,
            point.get_tag("hostname").unwrap_or_default().to_string(),
            point.measurement,
            point.timestamp,
            point.fields.iter().map(|f| (f.key, f.value)).collect(),
        ));
    }
    rows
}

fn drain_parallel(sim: &FleetSimulator, threads: usize, limit: Option<u64>) -> Vec<Row> {
    let mut rows: Vec<Row> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..threads)
            .map(|_| s.spawn(|| drain(sim, limit)))
            .collect();
        handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect()
    });
    rows.sort_by_key(|r| r.0);
    rows
}

#[test]
fn test_two_callers_get_exactly_one_to_thousand() {
    // 10 hosts x 1 measurement x 100 epochs = 1000 points
    let sim = devops(10, &[MeasurementKind::Cpu], 100, 1);
    assert_eq!(sim.total(), 1000);

    let rows = drain_parallel(&sim, 2, Some(500));
    let seqs: Vec<u64> = rows.iter().map(|r| r.0).collect();
    assert_eq!(seqs, (1..=1000).collect::<Vec<_>>());
    assert!(sim.finished());
}

#[test]
fn test_many_callers_cover_total_exactly() {
    let sim = devops(7, MeasurementKind::devops(), 30, 1);
    let rows = drain_parallel(&sim, 8, None);

    let seqs: HashSet<u64> = rows.iter().map(|r| r.0).collect();
    assert_eq!(seqs.len() as u64, sim.total());
    assert_eq!(seqs, (1..=sim.total()).collect());
    assert_eq!(sim.seen_points(), sim.total());

    let values: u64 = rows.iter().map(|r| r.4.len() as u64).sum();
    assert_eq!(sim.seen_values(), values);
}

#[test]
fn test_entity_timestamps_spaced_by_interval_under_concurrency() {
    let sim = devops(5, &[MeasurementKind::Cpu, MeasurementKind::Mem], 600, 10);
    let rows = drain_parallel(&sim, 6, None);

    let mut series: HashMap<(String, &'static str), Vec<i64>> = HashMap::new();
    for (_, host, measurement, ts, _) in &rows {
        series.entry((host.clone(), *measurement)).or_default().push(*ts);
    }
    assert_eq!(series.len(), 10);

    for ((host, measurement), timestamps) in series {
        assert_eq!(timestamps.len(), 60, "{} {}", host, measurement);
        assert_eq!(timestamps[0], START);
        for pair in timestamps.windows(2) {
            assert_eq!(pair[1] - pair[0], 10 * SEC, "{} {}", host, measurement);
        }
    }
}

#[test]
fn test_key_order_fixed_per_measurement() {
    let sim = devops(3, MeasurementKind::devops(), 20, 1);
    let mut seen: HashMap<&'static str, (Vec<&'static str>, Vec<&'static str>)> = HashMap::new();

    let mut point = Point::new();
    while !sim.finished() {
        point.reset();
        sim.next(&mut point);
        let keys = (
            point.tag_keys().collect::<Vec<_>>(),
            point.field_keys().collect::<Vec<_>>(),
        );
        let expected = seen.entry(point.measurement).or_insert_with(|| keys.clone());
        assert_eq!(*expected, keys);
        assert!(point.validate().is_ok());
    }

    for kind in MeasurementKind::devops() {
        let (tags, fields) = &seen[kind.as_str()];
        assert_eq!(&tags[..10], &rusts_telemetry_simulator::host::TAGS[..]);
        assert_eq!(&tags[10..], kind.tag_keys());
        assert_eq!(&fields[..], kind.field_keys());
    }
}

/// Monotonic fields never decrease in the order one caller observes them.
fn assert_counters_monotonic(rows: &[Row]) -> usize {
    let counters: HashSet<(&str, &str)> = [
        ("diskio", "reads"),
        ("diskio", "write_bytes"),
        ("net", "bytes_sent"),
        ("net", "packets_recv"),
        ("kernel", "context_switches"),
        ("redis", "uptime_in_seconds"),
        ("redis", "total_connections_received"),
    ]
    .into_iter()
    .collect();

    let mut last: HashMap<(String, &str, &str), f64> = HashMap::new();
    for (_, host, measurement, _, fields) in rows {
        for (key, value) in fields {
            if !counters.contains(&(*measurement, *key)) {
                continue;
            }
            let value = value.as_f64().unwrap();
            let entry = last.entry((host.clone(), *measurement, *key)).or_insert(value);
            assert!(value >= *entry, "{} {}.{} went backwards", host, measurement, key);
            *entry = value;
        }
    }
    last.len()
}

#[test]
fn test_counters_never_decrease() {
    let kinds = [
        MeasurementKind::DiskIo,
        MeasurementKind::Net,
        MeasurementKind::Kernel,
        MeasurementKind::Redis,
    ];

    let sim = devops(4, &kinds, 200, 1);
    assert_eq!(assert_counters_monotonic(&drain(&sim, None)), 4 * 7);

    // Each worker checks its own view; rows of one epoch may be emitted
    // after rows of the next one by a slower worker.
    let sim = devops(4, &kinds, 200, 1);
    let per_worker: Vec<Vec<Row>> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..8).map(|_| s.spawn(|| drain(&sim, None))).collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    for rows in &per_worker {
        assert_counters_monotonic(rows);
    }
    assert_eq!(sim.seen_points(), sim.total());
}

fn redis_uptimes(sim: &FleetSimulator) -> Vec<u64> {
    sim.entities()
        .iter()
        .map(|entity| match entity.measurement(0) {
            Measurement::Redis(redis) => redis.uptime(),
            other => panic!("unexpected measurement {}", other.name()),
        })
        .collect()
}

#[test]
fn test_concurrent_drain_ticks_once_per_epoch() {
    for interval in [Duration::from_secs(10), Duration::from_millis(500)] {
        let sim = FleetSimulator::devops(&DevopsConfig {
            start: START,
            end: START + 300 * SEC,
            interval,
            host_count: 6,
            kinds: vec![MeasurementKind::Redis],
            ..Default::default()
        })
        .unwrap();
        let base = redis_uptimes(&sim);

        let rows = drain_parallel(&sim, 8, None);
        assert_eq!(rows.len() as u64, sim.total());

        let elapsed_nanos = (sim.epochs() - 1) * interval.as_nanos() as u64;
        let after = redis_uptimes(&sim);
        for (i, entity) in sim.entities().iter().enumerate() {
            assert_eq!(entity.ticked_epoch(), sim.epochs() - 1);
            assert_eq!(after[i], base[i] + elapsed_nanos / SEC as u64, "{:?}", interval);
        }
    }
}

#[test]
fn test_walks_stay_in_bounds() {
    let sim = devops(3, &[MeasurementKind::Disk, MeasurementKind::Mem], 500, 1);
    for (_, _, measurement, _, fields) in drain(&sim, None) {
        let get = |key: &str| {
            fields
                .iter()
                .find(|(k, _)| *k == key)
                .and_then(|(_, v)| v.as_f64())
                .unwrap()
        };
        match measurement {
            "disk" => {
                assert!(get("free") >= 0.0 && get("free") <= get("total"));
                assert!(get("inodes_free") <= get("inodes_total"));
                assert_eq!(get("used") + get("free"), get("total"));
            }
            "mem" => {
                assert!(get("available") >= 0.0 && get("available") <= get("total"));
                assert!((0.0..=100.0).contains(&get("used_percent")));
            }
            other => panic!("unexpected measurement {}", other),
        }
    }
}

#[test]
fn test_written_points_ratchet_across_threads() {
    let sim = devops(1, &[MeasurementKind::Cpu], 10, 1);
    std::thread::scope(|s| {
        for t in 0..4u64 {
            let sim = &sim;
            s.spawn(move || {
                for i in 0..100 {
                    sim.set_written_points(t * 100 + i);
                }
            });
        }
    });

    let mut sim = sim;
    sim.set_sql_template(&["{{now_ns}}"]).unwrap();
    let mut out = Vec::new();
    sim.next_sql(&mut out).unwrap();
    // 399 written points at one point per epoch: capped at the window end
    assert_eq!(String::from_utf8(out).unwrap(), (START + 10 * SEC).to_string());
}

#[test]
fn test_query_now_tracks_progress() {
    let mut sim = devops(2, &[MeasurementKind::Cpu], 10, 1);
    sim.set_sql_template(&["'{{start}}' '{{now}}' '{{end}}'"]).unwrap();

    let render = |sim: &FleetSimulator| {
        let mut out = Vec::new();
        sim.next_sql(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    };

    assert_eq!(
        render(&sim),
        "'2016-01-01T00:00:00Z' '2016-01-01T00:00:00Z' '2016-01-01T00:00:10Z'"
    );
    sim.set_written_points(7);
    assert_eq!(
        render(&sim),
        "'2016-01-01T00:00:00Z' '2016-01-01T00:00:03Z' '2016-01-01T00:00:10Z'"
    );
}

#[test]
fn test_concurrent_next_sql() {
    let mut sim = devops(50, &[MeasurementKind::Cpu], 10, 1);
    sim.set_sql_template(&[
        "SELECT * FROM cpu WHERE hostname = '{{hostname}}' AND region = '{{region}}'",
        "SELECT * FROM cpu WHERE hostname IN ('{{hostname:4}}')",
    ])
    .unwrap();

    let regions: HashMap<String, String> = sim
        .entities()
        .iter()
        .map(|e| {
            (
                e.tag("hostname").unwrap().to_string(),
                e.tag("region").unwrap().to_string(),
            )
        })
        .collect();

    let sim = &sim;
    let queries: Vec<(u64, String)> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                s.spawn(|| {
                    (0..250)
                        .map(|_| {
                            let mut out = Vec::new();
                            let seq = sim.next_sql(&mut out).unwrap();
                            (seq, String::from_utf8(out).unwrap())
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles.into_iter().flat_map(|h| h.join().unwrap()).collect()
    });

    let seqs: HashSet<u64> = queries.iter().map(|q| q.0).collect();
    assert_eq!(seqs, (1..=1000).collect());

    for (seq, sql) in &queries {
        if seq % 2 == 1 {
            // hostname and region come from the same host
            let host = sql.split('\'').nth(1).unwrap();
            let region = sql.split('\'').nth(3).unwrap();
            assert_eq!(regions[host], region);
        } else {
            let list = sql
                .strip_prefix("SELECT * FROM cpu WHERE hostname IN ('")
                .and_then(|s| s.strip_suffix("')"))
                .unwrap();
            assert_eq!(list.split("','").count(), 4);
        }
    }
}

#[test]
fn test_charge_fleet_under_concurrency() {
    let sim = FleetSimulator::charge(
        &ChargeConfig {
            start: START,
            end: START + 3600 * SEC,
            interval: Duration::from_secs(60),
            device_count: 40,
            device_offset: 1000,
            devices_per_site: 8,
            overrides: TagOverrides::new().with("city_utility", "station_type", "ac_slow"),
        },
        &StaticRegionTable::new(),
    )
    .unwrap();
    assert_eq!(sim.total(), 40 * 60);

    let seen = std::sync::Mutex::new(HashSet::new());
    std::thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                let mut point = Point::new();
                loop {
                    point.reset();
                    if sim.next(&mut point) > sim.total() {
                        break;
                    }
                    assert_eq!(point.get_tag("station_type"), Some("ac_slow"));
                    let device = point.get_tag("device_id").unwrap().to_string();
                    seen.lock().unwrap().insert(device);
                }
            });
        }
    });

    let seen = seen.into_inner().unwrap();
    assert_eq!(seen.len(), 40);
    assert!(seen.contains("0000001000"));
    assert!(seen.contains("0000001039"));
}

#[test]
fn test_config_to_file_pipeline() {
    let config = SimulatorConfig {
        workload: Workload::Devops,
        entity_count: 3,
        kinds: vec![MeasurementKind::Cpu, MeasurementKind::Nginx],
        interval: Duration::from_secs(60),
        end: SimulatorConfig::default().start + chrono::Duration::minutes(10),
        ..Default::default()
    };
    let sim = config.build().unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("devops.lp");
    let writer = PointWriter::create(&path, OutputFormat::Line).unwrap();

    let mut point = Point::new();
    let mut batch = Vec::new();
    while !sim.finished() {
        point.reset();
        sim.next(&mut point);
        writer.encode(&point, &mut batch).unwrap();
    }
    writer.write_batch(&batch, sim.seen_points()).unwrap();
    writer.flush().unwrap();
    sim.set_written_points(writer.stats().points());

    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len() as u64, 3 * 2 * 10);
    assert!(lines[0].starts_with("cpu,hostname=host_0,"));
    assert!(lines[1].starts_with("nginx,hostname=host_0,"));
    assert!(lines[1].contains(",port=80,server=nginx_"));
    assert!(lines[0].ends_with(&format!(" {}", START)));
}

#[test]
fn test_metaquery_cardinality() {
    let mut sim = MetaQuerySimulator::new(&MetaQueryConfig {
        axis: 10,
        points: 250,
        start: START,
        end: START + 250 * SEC,
    })
    .unwrap();

    let mut combos = HashSet::new();
    let mut point = Point::new();
    while !sim.finished() {
        point.reset();
        sim.next(&mut point);
        combos.insert((
            point.get_tag("tag_a").unwrap().to_string(),
            point.get_tag("tag_b").unwrap().to_string(),
        ));
    }
    assert_eq!(combos.len(), 100);
    assert_eq!(sim.seen_values(), 250);
}

#[test]
fn test_unknown_placeholder_is_setup_error() {
    let mut sim = devops(1, &[MeasurementKind::Cpu], 10, 1);
    let err = sim
        .set_sql_template(&["SELECT * FROM cpu WHERE site_id = '{{site_id}}'"])
        .unwrap_err();
    match err {
        SimError::UnknownPlaceholder { name, template } => {
            assert_eq!(name, "site_id");
            assert!(template.contains("FROM cpu"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}
