//! Orchestrator: ledger, enumeration, dispatch, and the two sinks, all owned by one thread.

mod dispatcher;

pub use dispatcher::{Dispatcher, Outcome};

use crate::config::PipelineConfig;
use crate::corpus::{enumerate, WorkItem};
use crate::error::Result;
use crate::graph::{DotAnalytics, GraphAnalytics};
use crate::storage::{FailureSink, ResultSink, ResumeLedger};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Counters and timing for one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Items enumerated (not already in the ledger)
    pub total: usize,
    pub written: usize,
    pub failed: usize,
    pub cancelled: usize,
    /// Results dropped because their identity was already recorded
    pub duplicates: usize,
}

impl RunSummary {
    fn new(started_at: DateTime<Utc>, total: usize) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at,
            finished_at: None,
            total,
            written: 0,
            failed: 0,
            cancelled: 0,
            duplicates: 0,
        }
    }

    fn finish(mut self) -> Self {
        self.finished_at = Some(Utc::now());
        self
    }
}

pub struct Pipeline<A = DotAnalytics> {
    config: PipelineConfig,
    analytics: A,
    stop: Arc<AtomicBool>,
}

impl Pipeline<DotAnalytics> {
    pub fn new(config: PipelineConfig) -> Self {
        Self::with_analytics(config, DotAnalytics)
    }
}

impl<A: GraphAnalytics> Pipeline<A> {
    pub fn with_analytics(config: PipelineConfig, analytics: A) -> Self {
        Self {
            config,
            analytics,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Set to request a graceful stop: items not yet started are skipped.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    pub fn run(&self) -> Result<RunSummary> {
        let started_at = Utc::now();
        let out = &self.config.output;
        let mut failures = FailureSink::open(&out.failures_csv)?;
        let mut ledger = ResumeLedger::load(&out.features_csv)?;
        if !ledger.is_empty() {
            info!(completed = ledger.len(), "resuming from existing feature table");
        }

        let items = enumerate(&self.config.corpus, &ledger);
        let mut summary = RunSummary::new(started_at, items.len());
        if items.is_empty() {
            info!(
                extension = %self.config.corpus.extension,
                already_done = ledger.len(),
                "no graph files left to process"
            );
            return Ok(summary.finish());
        }

        self.process(items, &mut ledger, &mut failures, &mut summary)?;

        let summary = summary.finish();
        info!(
            written = summary.written,
            failed = summary.failed,
            cancelled = summary.cancelled,
            duplicates = summary.duplicates,
            output = %out.features_csv.display(),
            "feature table updated"
        );
        Ok(summary)
    }

    /// Dispatches `items` and records each outcome. A row whose identity the ledger already
    /// holds is dropped and counted as a duplicate.
    fn process(
        &self,
        items: Vec<WorkItem>,
        ledger: &mut ResumeLedger,
        failures: &mut FailureSink,
        summary: &mut RunSummary,
    ) -> Result<()> {
        let out = &self.config.output;
        let mut results = ResultSink::open(&out.features_csv, out.sync_every_row)?;
        let dispatcher = Dispatcher::new(self.config.workers, self.stop_handle())?;
        info!(
            run_id = %summary.run_id,
            total = items.len(),
            workers = dispatcher.workers(),
            "processing graph files"
        );

        dispatcher.run(&self.analytics, items, |outcome| {
            match outcome {
                Outcome::Row(row) => {
                    if !ledger.insert(&row.identity) {
                        warn!(identity = %row.identity, "duplicate result dropped");
                        summary.duplicates += 1;
                        return Ok(());
                    }
                    results.append(&row)?;
                    summary.written += 1;
                    info!(identity = %row.identity, label = %row.label, "finished processing");
                }
                Outcome::Failed(record) => {
                    warn!(
                        identity = %record.identity,
                        class = %record.class,
                        error = %record.message,
                        "file not processed"
                    );
                    failures.append(&record)?;
                    summary.failed += 1;
                }
                Outcome::Cancelled(_) => summary.cancelled += 1,
            }
            Ok(())
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CorpusConfig, OutputConfig};
    use crate::corpus::Label;
    use crate::storage::csv::parse_records;

    #[test]
    fn same_identity_twice_is_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let graph = dir.path().join("Malicious/loop.dot");
        std::fs::create_dir_all(graph.parent().unwrap()).unwrap();
        std::fs::write(&graph, "digraph { a -> b; b -> c; c -> a; }").unwrap();

        let config = PipelineConfig {
            corpus: CorpusConfig {
                malicious_dir: dir.path().join("Malicious"),
                benign_dir: dir.path().join("Nonmalicious"),
                extension: "dot".to_string(),
            },
            output: OutputConfig {
                features_csv: dir.path().join("lmoments.csv"),
                failures_csv: dir.path().join("unprocessed_files.csv"),
                sync_every_row: false,
            },
            workers: 2,
            ..PipelineConfig::default()
        };
        let pipeline = Pipeline::new(config.clone());
        let items = vec![
            WorkItem::new(graph.clone(), Label::Malicious),
            WorkItem::new(graph.clone(), Label::Nonmalicious),
        ];
        let mut ledger = ResumeLedger::new();
        let mut failures = FailureSink::open(&config.output.failures_csv).unwrap();
        let mut summary = RunSummary::new(Utc::now(), items.len());

        pipeline
            .process(items, &mut ledger, &mut failures, &mut summary)
            .unwrap();

        assert_eq!(summary.written, 1);
        assert_eq!(summary.duplicates, 1);
        assert_eq!(summary.failed, 0);
        let text = std::fs::read_to_string(&config.output.features_csv).unwrap();
        let records = parse_records(&text);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1][0], graph.to_string_lossy());
    }
}
