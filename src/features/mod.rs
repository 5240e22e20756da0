//! Per-graph feature rows: structural statistics plus L-moment summaries of four centrality series.

mod builder;
mod lmoments;

pub use builder::{build_row, process_item};
pub use lmoments::{lmoments, LMomentSummary, MIN_OBSERVATIONS};

use crate::corpus::Label;
use crate::graph::StructuralStats;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Output table header, in column order.
pub const FEATURE_COLUMNS: [&str; 25] = [
    "Filename",
    "Malicious/Nonmalicious",
    "Number of Nodes",
    "Number of Edges",
    "Average Degree",
    "Density",
    "Diameter",
    "Average Clustering",
    "Average Path Length",
    "Degree L1",
    "Degree L2",
    "Degree T3",
    "Degree T4",
    "Betweenness L1",
    "Betweenness L2",
    "Betweenness T3",
    "Betweenness T4",
    "Closeness L1",
    "Closeness L2",
    "Closeness T3",
    "Closeness T4",
    "Clustering L1",
    "Clustering L2",
    "Clustering T3",
    "Clustering T4",
];

/// Failure log header.
pub const FAILURE_COLUMNS: [&str; 2] = ["Filename", "Error Message"];

/// One fully built output record. Written at most once per identity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureRow {
    pub identity: String,
    pub label: Label,
    pub stats: StructuralStats,
    pub degree: LMomentSummary,
    pub betweenness: LMomentSummary,
    pub closeness: LMomentSummary,
    pub clustering: LMomentSummary,
}

impl FeatureRow {
    /// The 23 numeric cells after identity and label, in header order.
    pub fn numeric_cells(&self) -> Vec<f64> {
        let s = &self.stats;
        let mut out = vec![
            s.node_count as f64,
            s.edge_count as f64,
            s.avg_degree,
            s.density,
            s.diameter,
            s.avg_clustering,
            s.avg_path_length,
        ];
        for summary in [&self.degree, &self.betweenness, &self.closeness, &self.clustering] {
            out.extend(summary.to_array());
        }
        out
    }
}

/// Why a work item produced no row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureClass {
    ParseFailure,
    EmptyGraph,
    StatisticsError,
    CentralityError,
    /// Graph code panicked inside a worker
    WorkerPanic,
}

impl FailureClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureClass::ParseFailure => "ParseFailure",
            FailureClass::EmptyGraph => "EmptyGraph",
            FailureClass::StatisticsError => "StatisticsError",
            FailureClass::CentralityError => "CentralityError",
            FailureClass::WorkerPanic => "WorkerPanic",
        }
    }
}

impl fmt::Display for FailureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified, item-level rejection.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{class}: {message}")]
pub struct Rejection {
    pub class: FailureClass,
    pub message: String,
}

impl Rejection {
    pub fn new(class: FailureClass, message: impl Into<String>) -> Self {
        Self {
            class,
            message: message.into(),
        }
    }
}

/// Failure log entry for one rejected work item.
#[derive(Debug, Clone, PartialEq)]
pub struct FailureRecord {
    pub identity: String,
    pub class: FailureClass,
    pub message: String,
}

impl FailureRecord {
    pub fn new(identity: impl Into<String>, rejection: Rejection) -> Self {
        Self {
            identity: identity.into(),
            class: rejection.class,
            message: rejection.message,
        }
    }
}
