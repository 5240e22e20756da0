//! Subscriber setup: console (text or JSON lines) plus an optional append-only log file.

use crate::config::LogConfig;
use crate::error::{PipelineError, Result};
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Mutex;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

pub struct StructuredLogger;

impl StructuredLogger {
    /// Install the global subscriber. `RUST_LOG` overrides the configured level.
    /// Log lines go to stderr; stdout is left for the run summary.
    pub fn init(config: &LogConfig) -> Result<()> {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

        let mut layers = Vec::new();
        if config.json {
            layers.push(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_span_events(FmtSpan::NONE)
                    .with_writer(std::io::stderr)
                    .boxed(),
            );
        } else {
            layers.push(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .boxed(),
            );
        }

        if let Some(path) = &config.file {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| PipelineError::io("open", path, e))?;
            layers.push(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .boxed(),
            );
        }

        tracing_subscriber::registry()
            .with(filter)
            .with(layers)
            .init();
        Ok(())
    }

    /// Emit a single structured line (e.g. the run summary) without going through tracing
    pub fn emit_json(event: &impl Serialize, w: &mut impl Write) {
        if let Ok(line) = serde_json::to_string(event) {
            let _ = writeln!(w, "{}", line);
        }
    }
}
