//! CLI entry point for the telemetry simulator.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use rusts_telemetry_simulator::{
    config::{SimulatorConfig, Workload},
    measurements::MeasurementKind,
    overrides::TagOverrides,
    simulator::Simulator,
    writer::{OutputFormat, PointWriter},
};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "rusts-telemetry-simulator")]
#[command(about = "Synthetic telemetry and query generator for RusTs benchmarking")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate points from parallel workers
    Points {
        #[command(flatten)]
        fleet: FleetArgs,

        /// Worker threads (defaults to the number of CPUs)
        #[arg(short = 'j', long)]
        workers: Option<usize>,

        /// Output format: line or json
        #[arg(short, long, default_value = "line")]
        format: OutputFormat,

        /// Points per output batch
        #[arg(short, long, default_value = "10000")]
        batch_size: usize,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Instantiate SQL templates against a fleet
    Queries {
        #[command(flatten)]
        fleet: FleetArgs,

        /// Query template (repeatable)
        #[arg(short, long = "template", required = true)]
        templates: Vec<String>,

        /// Values per tag placeholder without an explicit count
        #[arg(short, long, default_value = "1")]
        repeat: u32,

        /// Queries to generate
        #[arg(short, long, default_value = "10")]
        count: u64,

        /// Points reported as written, which moves `{{now}}`
        #[arg(long, default_value = "0")]
        written: u64,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate two-tag cardinality data on a single thread
    Metaquery {
        /// Distinct values per tag dimension
        #[arg(short, long, default_value = "100")]
        axis: u64,

        /// Points to generate
        #[arg(short, long, default_value = "10000")]
        points: u64,

        /// Window start (RFC 3339)
        #[arg(long, default_value = "2016-01-01T00:00:00Z")]
        start: DateTime<Utc>,

        /// Window end (RFC 3339)
        #[arg(long, default_value = "2016-01-02T00:00:00Z")]
        end: DateTime<Utc>,

        /// Output format: line or json
        #[arg(short, long, default_value = "line")]
        format: OutputFormat,

        /// Points per output batch
        #[arg(short, long, default_value = "10000")]
        batch_size: usize,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args)]
struct FleetArgs {
    /// Workload family: devops or charge
    #[arg(short, long, default_value = "devops")]
    workload: Workload,

    /// Number of hosts or devices
    #[arg(short, long, default_value = "100")]
    entities: u64,

    /// Identity offset of the first entity
    #[arg(long, default_value = "0")]
    offset: u64,

    /// Window start (RFC 3339)
    #[arg(long, default_value = "2016-01-01T00:00:00Z")]
    start: DateTime<Utc>,

    /// Window end (RFC 3339)
    #[arg(long, default_value = "2016-01-02T00:00:00Z")]
    end: DateTime<Utc>,

    /// Sampling interval in seconds
    #[arg(short, long, default_value = "10")]
    interval: u64,

    /// Devops measurements, comma separated (all when omitted)
    #[arg(short, long, value_delimiter = ',')]
    measurements: Vec<MeasurementKind>,

    /// Charge devices per site
    #[arg(long, default_value = "10")]
    devices_per_site: u64,

    /// Forced tag value as measurement.tag=value (repeatable)
    #[arg(long = "tag", value_parser = parse_override)]
    tags: Vec<(String, String, String)>,
}

impl FleetArgs {
    fn into_config(self) -> SimulatorConfig {
        let mut overrides = TagOverrides::new();
        for (measurement, tag, value) in self.tags {
            overrides.set(measurement, tag, value);
        }

        SimulatorConfig {
            workload: self.workload,
            start: self.start,
            end: self.end,
            interval: Duration::from_secs(self.interval),
            entity_count: self.entities,
            offset: self.offset,
            kinds: self.measurements,
            devices_per_site: self.devices_per_site,
            overrides,
            ..Default::default()
        }
    }
}

fn parse_override(s: &str) -> std::result::Result<(String, String, String), String> {
    let (target, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected measurement.tag=value, got '{}'", s))?;
    let (measurement, tag) = target
        .split_once('.')
        .ok_or_else(|| format!("expected measurement.tag=value, got '{}'", s))?;
    if measurement.is_empty() || tag.is_empty() {
        return Err(format!("empty measurement or tag in '{}'", s));
    }
    Ok((measurement.to_string(), tag.to_string(), value.to_string()))
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout can carry the generated data
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Points {
            fleet,
            workers,
            format,
            batch_size,
            output,
        } => {
            let config = fleet.into_config();
            info!("Starting {} point generation", config.workload);
            let sim = config.build()?;
            let writer = match &output {
                Some(path) => PointWriter::create(path, format)?,
                None => PointWriter::stdout(format),
            };
            let workers = workers.unwrap_or_else(num_cpus::get).max(1);
            run_points(&sim, &writer, workers, batch_size.max(1))?;
        }

        Commands::Queries {
            fleet,
            templates,
            repeat,
            count,
            written,
            output,
        } => {
            let config = fleet.into_config();
            info!("Generating {} {} queries", count, config.workload);
            let mut sim = config.build()?;
            let templates: Vec<&str> = templates.iter().map(String::as_str).collect();
            sim.set_sql_templates_with_repeat(&templates, repeat)?;
            sim.set_written_points(written);

            let mut out = BufWriter::new(open_output(output.as_deref())?);
            for _ in 0..count {
                sim.next_sql(&mut out)?;
                out.write_all(b"\n")?;
            }
            out.flush()?;
        }

        Commands::Metaquery {
            axis,
            points,
            start,
            end,
            format,
            batch_size,
            output,
        } => {
            let config = SimulatorConfig {
                workload: Workload::MetaQuery,
                start,
                end,
                axis,
                points,
                ..Default::default()
            };
            let mut sim = config.build_metaquery()?;
            let writer = match &output {
                Some(path) => PointWriter::create(path, format)?,
                None => PointWriter::stdout(format),
            };

            writer.write_rows(
                batch_size,
                |point| {
                    if sim.finished() {
                        return false;
                    }
                    sim.next(point);
                    true
                },
                |_| {},
            )?;
            writer.flush()?;
            info!("Generated {} metaquery points", sim.seen_points());
        }
    }

    Ok(())
}

fn open_output(path: Option<&Path>) -> io::Result<Box<dyn Write + Send>> {
    Ok(match path {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(io::stdout()),
    })
}

fn run_points(
    sim: &dyn Simulator,
    writer: &PointWriter,
    workers: usize,
    batch_size: usize,
) -> Result<()> {
    info!(
        "Generating {} points with {} workers ({} format)",
        sim.total(),
        workers,
        writer.format()
    );
    let started = Instant::now();

    std::thread::scope(|s| -> Result<()> {
        let handles: Vec<_> = (0..workers)
            .map(|_| s.spawn(move || produce(sim, writer, batch_size)))
            .collect();
        for handle in handles {
            handle.join().map_err(|_| anyhow!("worker thread panicked"))??;
        }
        Ok(())
    })?;
    writer.flush()?;

    let elapsed = started.elapsed();
    let stats = writer.stats();
    info!(
        "Generated {} points ({} values, {} bytes in {} batches) in {:.2?}: {:.0} points/sec",
        sim.seen_points(),
        sim.seen_values(),
        stats.bytes(),
        stats.batches(),
        elapsed,
        stats.points() as f64 / elapsed.as_secs_f64().max(f64::EPSILON)
    );
    Ok(())
}

/// Drains the simulator from one worker, writing in batches.
fn produce(
    sim: &dyn Simulator,
    writer: &PointWriter,
    batch_size: usize,
) -> rusts_telemetry_simulator::Result<()> {
    writer.write_rows(
        batch_size,
        |point| sim.next(point) <= sim.total(),
        |stats| sim.set_written_points(stats.points()),
    )?;
    Ok(())
}
