//! Labeled corpus: work items and the directory walk that produces them.

mod walker;

pub use walker::{enumerate, CorpusWalker};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    Malicious,
    Nonmalicious,
}

impl Label {
    /// Literal written to the label column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Malicious => "Malicious",
            Label::Nonmalicious => "Nonmalicious",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One graph file to process. Identity is the path as walked, used verbatim as the row key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub identity: String,
    pub path: PathBuf,
    pub label: Label,
}

impl WorkItem {
    pub fn new(path: PathBuf, label: Label) -> Self {
        Self {
            identity: path.to_string_lossy().to_string(),
            path,
            label,
        }
    }
}
