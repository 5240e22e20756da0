//! Graph analytics capability: parse a behavioral graph description and measure it.
//!
//! The feature builder only sees [`GraphAnalytics`]; the handle type is opaque to it.
//! [`DotAnalytics`] is the default backend (Graphviz DOT text, petgraph model).

mod dot;
mod metrics;
mod model;

pub use dot::{parse_dot, DotDocument};
pub use metrics::DotAnalytics;
pub use model::BehaviorGraph;

use serde::Serialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("cannot read graph description: {0}")]
    Read(#[from] std::io::Error),

    #[error("syntax error at line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("found infinite path length because the digraph is not strongly connected")]
    InfinitePathLength,

    #[error("{0}")]
    Metric(String),
}

/// Whole-graph statistics. `diameter` and `avg_path_length` are NaN when the
/// undirected projection is disconnected; that is a value, not a failure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StructuralStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub avg_degree: f64,
    pub density: f64,
    pub diameter: f64,
    pub avg_path_length: f64,
    pub avg_clustering: f64,
}

/// Per-node centrality values. Series need not share node order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CentralitySeries {
    pub degree: Vec<f64>,
    pub betweenness: Vec<f64>,
    pub closeness: Vec<f64>,
    pub clustering: Vec<f64>,
}

pub trait GraphAnalytics: Send + Sync {
    /// Parsed graph, owned by the worker that produced it.
    type Handle;

    fn parse(&self, path: &Path) -> Result<Self::Handle, GraphError>;

    fn node_count(&self, graph: &Self::Handle) -> usize;

    fn edge_count(&self, graph: &Self::Handle) -> usize;

    fn structural_stats(&self, graph: &Self::Handle) -> Result<StructuralStats, GraphError>;

    fn centrality_series(&self, graph: &Self::Handle) -> Result<CentralitySeries, GraphError>;
}
