//! Graph Features — resumable, parallel conversion of labeled behavioral-graph corpora
//! into a fixed-width feature table.
//!
//! Modular structure:
//! - [`corpus`] — Labeled work items and the directory walk
//! - [`graph`] — DOT parsing and graph metrics behind the [`graph::GraphAnalytics`] seam
//! - [`features`] — L-moment estimator and the per-file feature row builder
//! - [`storage`] — Resume ledger, feature table and failure log sinks
//! - [`pipeline`] — Worker pool dispatch and the single-writer orchestrator
//! - [`logging`] — Structured logging

pub mod config;
pub mod corpus;
pub mod error;
pub mod features;
pub mod graph;
pub mod logging;
pub mod pipeline;
pub mod storage;

pub use config::PipelineConfig;
pub use corpus::{Label, WorkItem};
pub use error::PipelineError;
pub use features::{FailureClass, FailureRecord, FeatureRow, LMomentSummary};
pub use graph::{DotAnalytics, GraphAnalytics};
pub use logging::StructuredLogger;
pub use pipeline::{Pipeline, RunSummary};
pub use storage::ResumeLedger;
