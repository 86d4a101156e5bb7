//! Batched output sink shared by worker threads.
//!
//! Workers encode rows into a private buffer and hand whole batches to
//! [`PointWriter::write_batch`], so the mutex is taken once per batch rather
//! than once per row.

use crate::error::{Result, SimError};
use parking_lot::Mutex;
use rusts_core::Point;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

/// Encoding of emitted points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// InfluxDB line protocol
    #[default]
    Line,
    /// One JSON object per line
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Line => write!(f, "line"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "line" | "lp" => Ok(OutputFormat::Line),
            "json" => Ok(OutputFormat::Json),
            other => Err(SimError::InvalidConfig(format!(
                "unknown output format '{}'",
                other
            ))),
        }
    }
}

impl OutputFormat {
    /// Appends one encoded point, newline terminated, to `buf`.
    pub fn encode(&self, point: &Point, buf: &mut Vec<u8>) -> io::Result<()> {
        match self {
            OutputFormat::Line => point.write_line_protocol(buf),
            OutputFormat::Json => {
                serde_json::to_writer(&mut *buf, point).map_err(io::Error::from)?;
                buf.push(b'\n');
                Ok(())
            }
        }
    }
}

/// Statistics for write operations.
#[derive(Debug, Default)]
pub struct WriteStats {
    pub points_written: AtomicU64,
    pub batches_written: AtomicU64,
    pub bytes_written: AtomicU64,
}

impl WriteStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&self, points: u64, bytes: u64) {
        self.points_written.fetch_add(points, Ordering::Relaxed);
        self.batches_written.fetch_add(1, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn points(&self) -> u64 {
        self.points_written.load(Ordering::Relaxed)
    }

    pub fn batches(&self) -> u64 {
        self.batches_written.load(Ordering::Relaxed)
    }

    pub fn bytes(&self) -> u64 {
        self.bytes_written.load(Ordering::Relaxed)
    }
}

/// Mutex-guarded buffered sink.
pub struct PointWriter {
    out: Mutex<BufWriter<Box<dyn Write + Send>>>,
    format: OutputFormat,
    stats: WriteStats,
}

impl PointWriter {
    pub fn new(out: Box<dyn Write + Send>, format: OutputFormat) -> Self {
        Self {
            out: Mutex::new(BufWriter::with_capacity(1 << 20, out)),
            format,
            stats: WriteStats::new(),
        }
    }

    pub fn stdout(format: OutputFormat) -> Self {
        Self::new(Box::new(io::stdout()), format)
    }

    /// Creates (or truncates) `path`.
    pub fn create(path: impl AsRef<Path>, format: OutputFormat) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(Box::new(file), format))
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn encode(&self, point: &Point, buf: &mut Vec<u8>) -> Result<()> {
        self.format.encode(point, buf)?;
        Ok(())
    }

    /// Writes a batch of `points` already encoded rows.
    pub fn write_batch(&self, batch: &[u8], points: u64) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }
        self.out.lock().write_all(batch)?;
        self.stats.record_success(points, batch.len() as u64);
        Ok(())
    }

    /// Fills rows with `fill` until it returns `false`, writing every
    /// `batch_size` rows and calling `on_batch` after each write. Returns the
    /// number of rows written.
    pub fn write_rows<F, B>(&self, batch_size: usize, mut fill: F, mut on_batch: B) -> Result<u64>
    where
        F: FnMut(&mut Point) -> bool,
        B: FnMut(&WriteStats),
    {
        let batch_size = batch_size.max(1);
        let mut point = Point::with_capacity(16, 16);
        let mut batch = Vec::with_capacity(batch_size * 128);
        let mut rows = 0u64;
        let mut total = 0u64;

        loop {
            point.reset();
            if !fill(&mut point) {
                break;
            }
            self.encode(&point, &mut batch)?;
            rows += 1;

            if rows as usize >= batch_size {
                self.write_batch(&batch, rows)?;
                on_batch(&self.stats);
                total += rows;
                batch.clear();
                rows = 0;
            }
        }

        if rows > 0 {
            self.write_batch(&batch, rows)?;
            on_batch(&self.stats);
            total += rows;
        }
        Ok(total)
    }

    pub fn flush(&self) -> Result<()> {
        self.out.lock().flush()?;
        Ok(())
    }

    pub fn stats(&self) -> &WriteStats {
        &self.stats
    }
}
