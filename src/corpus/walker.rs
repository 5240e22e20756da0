//! Recursive walk of the two labeled roots, skipping identities already in the ledger.

use super::{Label, WorkItem};
use crate::config::CorpusConfig;
use crate::storage::ResumeLedger;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

pub struct CorpusWalker {
    roots: Vec<(PathBuf, Label)>,
    extension: String,
}

impl CorpusWalker {
    pub fn new(config: &CorpusConfig) -> Self {
        Self {
            roots: vec![
                (config.malicious_dir.clone(), Label::Malicious),
                (config.benign_dir.clone(), Label::Nonmalicious),
            ],
            extension: config.extension.trim_start_matches('.').to_string(),
        }
    }

    fn selected(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e == self.extension)
    }

    /// Items not yet in `ledger`, in walk order. An identity reachable from both roots keeps its first label.
    pub fn pending(&self, ledger: &ResumeLedger) -> Vec<WorkItem> {
        let mut seen = HashSet::new();
        let mut items = Vec::new();

        for (root, label) in &self.roots {
            if !root.exists() {
                warn!(root = %root.display(), %label, "corpus root missing");
                continue;
            }
            for entry in WalkDir::new(root)
                .follow_links(false)
                .into_iter()
                .filter_map(|e| match e {
                    Ok(e) => Some(e),
                    Err(err) => {
                        warn!(error = %err, "skipping unreadable corpus entry");
                        None
                    }
                })
            {
                if !entry.path().is_file() || !self.selected(entry.path()) {
                    continue;
                }
                let item = WorkItem::new(entry.into_path(), *label);
                if ledger.contains(&item.identity) || !seen.insert(item.identity.clone()) {
                    continue;
                }
                debug!(identity = %item.identity, %label, "found graph file");
                items.push(item);
            }
        }
        items
    }
}

/// Convenience wrapper over [`CorpusWalker::pending`].
pub fn enumerate(config: &CorpusConfig, ledger: &ResumeLedger) -> Vec<WorkItem> {
    CorpusWalker::new(config).pending(ledger)
}
