//! Resume ledger: identities already present in the feature table.

use super::csv::{complete_len, parse_records};
use crate::features::FEATURE_COLUMNS;
use crate::error::{PipelineError, Result};
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

/// Owned by the orchestrator; workers never see it.
#[derive(Debug, Clone, Default)]
pub struct ResumeLedger {
    done: HashSet<String>,
}

impl ResumeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// First column of every complete row after the header, whitespace-trimmed.
    /// A trailing unterminated line or a record of the wrong width is not counted.
    /// A missing file is an empty ledger.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let bytes = std::fs::read(path).map_err(|e| PipelineError::io("read", path, e))?;
        let text = String::from_utf8_lossy(&bytes[..complete_len(&bytes)]);
        let done: HashSet<String> = parse_records(&text)
            .into_iter()
            .skip(1)
            .filter(|r| r.len() == FEATURE_COLUMNS.len())
            .filter_map(|r| r.into_iter().next())
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .collect();
        info!(path = %path.display(), completed = done.len(), "resume ledger loaded");
        Ok(Self { done })
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.done.contains(identity.trim())
    }

    /// Returns false if the identity was already recorded.
    pub fn insert(&mut self, identity: &str) -> bool {
        self.done.insert(identity.trim().to_string())
    }

    pub fn len(&self) -> usize {
        self.done.len()
    }

    pub fn is_empty(&self) -> bool {
        self.done.is_empty()
    }
}
