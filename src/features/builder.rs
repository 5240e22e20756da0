//! Feature row builder: one work item through parse, statistics, centralities and L-moments.
//!
//! Each stage maps its failure to one [`FailureClass`]; the first failure ends the item.

use super::{lmoments, FailureClass, FailureRecord, FeatureRow, Rejection};
use crate::corpus::WorkItem;
use crate::graph::GraphAnalytics;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use tracing::debug;

/// Build the row for an already parsed graph.
pub fn build_row<A: GraphAnalytics + ?Sized>(
    analytics: &A,
    item: &WorkItem,
    graph: &A::Handle,
) -> Result<FeatureRow, Rejection> {
    let nodes = analytics.node_count(graph);
    let edges = analytics.edge_count(graph);
    if nodes == 0 || edges == 0 {
        return Err(Rejection::new(
            FailureClass::EmptyGraph,
            format!("graph is empty ({nodes} nodes, {edges} edges)"),
        ));
    }

    let stats = analytics
        .structural_stats(graph)
        .map_err(|e| Rejection::new(FailureClass::StatisticsError, e.to_string()))?;

    debug!(identity = %item.identity, "calculating centrality measures");
    let series = analytics
        .centrality_series(graph)
        .map_err(|e| Rejection::new(FailureClass::CentralityError, e.to_string()))?;
    if series.degree.is_empty() {
        return Err(Rejection::new(
            FailureClass::CentralityError,
            "degree centrality series is missing",
        ));
    }

    debug!(identity = %item.identity, "calculating L-moments");
    Ok(FeatureRow {
        identity: item.identity.clone(),
        label: item.label,
        stats,
        degree: lmoments(&series.degree),
        betweenness: lmoments(&series.betweenness),
        closeness: lmoments(&series.closeness),
        clustering: lmoments(&series.clustering),
    })
}

/// Full per-item lifecycle as run on a worker. The parsed graph is dropped before returning.
pub fn process_item<A: GraphAnalytics + ?Sized>(
    analytics: &A,
    item: &WorkItem,
) -> Result<FeatureRow, FailureRecord> {
    debug!(identity = %item.identity, label = %item.label, "processing file");
    let attempt = panic::catch_unwind(AssertUnwindSafe(|| {
        let graph = analytics
            .parse(&item.path)
            .map_err(|e| Rejection::new(FailureClass::ParseFailure, e.to_string()))?;
        build_row(analytics, item, &graph)
    }));

    match attempt {
        Ok(Ok(row)) => Ok(row),
        Ok(Err(rejection)) => Err(FailureRecord::new(item.identity.clone(), rejection)),
        Err(payload) => Err(FailureRecord::new(
            item.identity.clone(),
            Rejection::new(FailureClass::WorkerPanic, panic_message(payload.as_ref())),
        )),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_string()
    }
}
