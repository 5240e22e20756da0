//! Append-only CSV sinks. Only the orchestrator thread holds them.

use super::csv::{complete_len, format_float, format_record};
use crate::error::{PipelineError, Result};
use crate::features::{FailureRecord, FeatureRow, FAILURE_COLUMNS, FEATURE_COLUMNS};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Cuts a trailing unterminated line left by an interrupted write, so the next record starts on its own line.
fn discard_torn_tail(path: &Path) -> Result<()> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(PipelineError::io("read", path, e)),
    };
    let keep = complete_len(&bytes);
    if keep == bytes.len() {
        return Ok(());
    }
    warn!(
        path = %path.display(),
        dropped_bytes = bytes.len() - keep,
        "discarding partial last line"
    );
    OpenOptions::new()
        .write(true)
        .open(path)
        .and_then(|f| f.set_len(keep as u64))
        .map_err(|e| PipelineError::io("truncate", path, e))
}

fn open_append(path: &Path) -> Result<File> {
    discard_torn_tail(path)?;
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| PipelineError::io("open", path, e))
}

fn is_empty(file: &File, path: &Path) -> Result<bool> {
    let meta = file
        .metadata()
        .map_err(|e| PipelineError::io("stat", path, e))?;
    Ok(meta.len() == 0)
}

/// Field strings for one feature row, in header order.
pub fn feature_record(row: &FeatureRow) -> Vec<String> {
    let mut fields = vec![
        row.identity.clone(),
        row.label.as_str().to_string(),
        row.stats.node_count.to_string(),
        row.stats.edge_count.to_string(),
    ];
    fields.extend(row.numeric_cells().into_iter().skip(2).map(format_float));
    fields
}

/// Feature table. A torn last line is dropped at open, the header written only when the file is
/// then empty; every row is flushed before returning.
pub struct ResultSink {
    file: File,
    path: PathBuf,
    sync: bool,
}

impl ResultSink {
    pub fn open(path: &Path, sync: bool) -> Result<Self> {
        let file = open_append(path)?;
        let mut sink = Self {
            file,
            path: path.to_path_buf(),
            sync,
        };
        if is_empty(&sink.file, path)? {
            sink.write_line(&format_record(&FEATURE_COLUMNS))?;
        }
        Ok(sink)
    }

    pub fn append(&mut self, row: &FeatureRow) -> Result<()> {
        self.write_line(&format_record(&feature_record(row)))
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        self.file
            .write_all(line.as_bytes())
            .and_then(|_| self.file.flush())
            .map_err(|e| PipelineError::io("write", &self.path, e))?;
        if self.sync {
            self.file
                .sync_data()
                .map_err(|e| PipelineError::io("sync", &self.path, e))?;
        }
        Ok(())
    }
}

/// Failure log: `identity, "<Class>: <message>"` per rejected item.
pub struct FailureSink {
    file: File,
    path: PathBuf,
}

impl FailureSink {
    pub fn open(path: &Path) -> Result<Self> {
        let mut file = open_append(path)?;
        if is_empty(&file, path)? {
            file.write_all(format_record(&FAILURE_COLUMNS).as_bytes())
                .map_err(|e| PipelineError::io("write", path, e))?;
        }
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    pub fn append(&mut self, record: &FailureRecord) -> Result<()> {
        let message = format!("{}: {}", record.class, record.message);
        self.file
            .write_all(format_record(&[record.identity.as_str(), message.as_str()]).as_bytes())
            .and_then(|_| self.file.flush())
            .map_err(|e| PipelineError::io("write", &self.path, e))
    }
}
