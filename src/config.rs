//! Pipeline configuration. Loaded from JSON; every section has defaults matching the batch job layout.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Labeled input roots and file selection
    pub corpus: CorpusConfig,
    /// Feature table and failure log locations
    pub output: OutputConfig,
    /// Worker pool size (0 = one per logical CPU)
    pub workers: usize,
    /// Logging
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    /// Root walked for malicious samples
    pub malicious_dir: PathBuf,
    /// Root walked for benign samples
    pub benign_dir: PathBuf,
    /// File extension of graph descriptions, without the dot
    pub extension: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub features_csv: PathBuf,
    pub failures_csv: PathBuf,
    /// fsync after every feature row, not just a buffer flush
    pub sync_every_row: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
    /// Also append log lines here
    pub file: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            corpus: CorpusConfig::default(),
            output: OutputConfig::default(),
            workers: 25,
            log: LogConfig::default(),
        }
    }
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            malicious_dir: PathBuf::from("Malicious"),
            benign_dir: PathBuf::from("Nonmalicious"),
            extension: "dot".to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            features_csv: PathBuf::from("lmoments.csv"),
            failures_csv: PathBuf::from("unprocessed_files.csv"),
            sync_every_row: true,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: Some(PathBuf::from("process_log.txt")),
        }
    }
}

impl PipelineConfig {
    /// Load from JSON file if present; otherwise return default
    pub fn load(path: &std::path::Path) -> Self {
        if path.exists() {
            if let Ok(data) = std::fs::read_to_string(path) {
                if let Ok(c) = serde_json::from_str::<PipelineConfig>(&data) {
                    return c;
                }
            }
        }
        Self::default()
    }
}
