//! Scalar metrics sinks for generation summaries.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::Serialize;

/// Receives one scalar per name per generation boundary.
pub trait MetricsSink {
    fn add_scalar(&mut self, name: &str, value: f32, step: u64);
}

impl<T: MetricsSink + ?Sized> MetricsSink for Box<T> {
    fn add_scalar(&mut self, name: &str, value: f32, step: u64) {
        (**self).add_scalar(name, value, step);
    }
}

/// Discards everything. Useful in tests and benchmarks.
#[derive(Debug, Default)]
pub struct NullMetrics;

impl MetricsSink for NullMetrics {
    fn add_scalar(&mut self, _name: &str, _value: f32, _step: u64) {}
}

/// Forwards scalars to the `log` facade under the `metrics` target.
#[derive(Debug, Default)]
pub struct LogMetrics;

impl MetricsSink for LogMetrics {
    fn add_scalar(&mut self, name: &str, value: f32, step: u64) {
        log::info!(target: "metrics", "{name}={value} step={step}");
    }
}

#[derive(Serialize)]
struct ScalarRecord<'a> {
    name: &'a str,
    value: f32,
    step: u64,
}

/// Appends one JSON object per scalar to a file, newline-delimited.
pub struct JsonlMetrics {
    writer: BufWriter<File>,
}

impl JsonlMetrics {
    pub fn create<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        Ok(Self {
            writer: BufWriter::new(File::create(path)?),
        })
    }

    fn write_record(&mut self, record: &ScalarRecord<'_>) -> io::Result<()> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()
    }
}

impl MetricsSink for JsonlMetrics {
    fn add_scalar(&mut self, name: &str, value: f32, step: u64) {
        let record = ScalarRecord { name, value, step };
        // A full metrics disk is not worth killing the run over.
        if let Err(err) = self.write_record(&record) {
            log::error!("failed to write metrics record: {err}");
        }
    }
}
