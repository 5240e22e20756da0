//! Structural statistics and centrality series over a [`BehaviorGraph`].
//!
//! All path-based measures are unweighted BFS. Directed semantics throughout,
//! except clustering and the connectivity test, which use the undirected projection.

use super::model::Adjacency;
use super::{
    parse_dot, BehaviorGraph, CentralitySeries, GraphAnalytics, GraphError, StructuralStats,
};
use petgraph::algo::connected_components;
use std::collections::VecDeque;
use std::path::Path;

const UNREACHED: usize = usize::MAX;

/// DOT files in, petgraph-backed metrics out.
#[derive(Debug, Clone, Copy, Default)]
pub struct DotAnalytics;

impl GraphAnalytics for DotAnalytics {
    type Handle = BehaviorGraph;

    fn parse(&self, path: &Path) -> Result<BehaviorGraph, GraphError> {
        let bytes = std::fs::read(path)?;
        let doc = parse_dot(&String::from_utf8_lossy(&bytes))?;
        Ok(BehaviorGraph::from_document(&doc))
    }

    fn node_count(&self, graph: &BehaviorGraph) -> usize {
        graph.node_count()
    }

    fn edge_count(&self, graph: &BehaviorGraph) -> usize {
        graph.edge_count()
    }

    fn structural_stats(&self, graph: &BehaviorGraph) -> Result<StructuralStats, GraphError> {
        structural_stats(graph)
    }

    fn centrality_series(&self, graph: &BehaviorGraph) -> Result<CentralitySeries, GraphError> {
        Ok(centrality_series(graph))
    }
}

pub fn structural_stats(graph: &BehaviorGraph) -> Result<StructuralStats, GraphError> {
    let n = graph.node_count();
    let m = graph.edge_count();
    if n == 0 {
        return Err(GraphError::Metric(
            "connectivity is undefined for the null graph".to_string(),
        ));
    }
    let adj = graph.adjacency();

    // Each edge adds one to an out-degree and one to an in-degree
    let avg_degree = 2.0 * m as f64 / n as f64;
    let density = if n > 1 {
        m as f64 / (n * (n - 1)) as f64
    } else {
        0.0
    };

    let (diameter, avg_path_length) = if connected_components(&graph.graph) == 1 {
        directed_path_lengths(&adj)?
    } else {
        (f64::NAN, f64::NAN)
    };

    let clustering = local_clustering(&adj);
    let avg_clustering = clustering.iter().sum::<f64>() / n as f64;

    Ok(StructuralStats {
        node_count: n,
        edge_count: m,
        avg_degree,
        density,
        diameter,
        avg_path_length,
        avg_clustering,
    })
}

pub fn centrality_series(graph: &BehaviorGraph) -> CentralitySeries {
    let adj = graph.adjacency();
    CentralitySeries {
        degree: adj.out.iter().map(|s| s.len() as f64).collect(),
        betweenness: betweenness(&adj),
        closeness: closeness(&adj),
        clustering: local_clustering(&adj),
    }
}

/// Hop counts from `source` along `lists`; [`UNREACHED`] where no path exists.
fn bfs(lists: &[Vec<usize>], source: usize) -> Vec<usize> {
    let mut dist = vec![UNREACHED; lists.len()];
    dist[source] = 0;
    let mut queue = VecDeque::from([source]);
    while let Some(v) = queue.pop_front() {
        for &w in &lists[v] {
            if dist[w] == UNREACHED {
                dist[w] = dist[v] + 1;
                queue.push_back(w);
            }
        }
    }
    dist
}

/// (diameter, mean shortest path over ordered pairs). Fails unless strongly connected.
fn directed_path_lengths(adj: &Adjacency) -> Result<(f64, f64), GraphError> {
    let n = adj.len();
    let mut diameter = 0usize;
    let mut total = 0usize;
    for s in 0..n {
        for d in bfs(&adj.out, s) {
            if d == UNREACHED {
                return Err(GraphError::InfinitePathLength);
            }
            diameter = diameter.max(d);
            total += d;
        }
    }
    let avg = if n > 1 {
        total as f64 / (n * (n - 1)) as f64
    } else {
        0.0
    };
    Ok((diameter as f64, avg))
}

/// Local clustering coefficient of each node in the undirected projection.
fn local_clustering(adj: &Adjacency) -> Vec<f64> {
    let und: Vec<Vec<usize>> = (0..adj.len()).map(|v| adj.undirected_neighbors(v)).collect();
    und.iter()
        .map(|ns| {
            let k = ns.len();
            if k < 2 {
                return 0.0;
            }
            let mut triangles = 0usize;
            for (i, &a) in ns.iter().enumerate() {
                for &b in &ns[i + 1..] {
                    if und[a].binary_search(&b).is_ok() {
                        triangles += 1;
                    }
                }
            }
            2.0 * triangles as f64 / (k * (k - 1)) as f64
        })
        .collect()
}

/// Brandes betweenness on the digraph, endpoints excluded, scaled by 1/((n-1)(n-2)).
fn betweenness(adj: &Adjacency) -> Vec<f64> {
    let n = adj.len();
    let mut bc = vec![0.0f64; n];

    for s in 0..n {
        let mut order = Vec::with_capacity(n);
        let mut preds: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut sigma = vec![0.0f64; n];
        let mut dist = vec![UNREACHED; n];
        sigma[s] = 1.0;
        dist[s] = 0;

        let mut queue = VecDeque::from([s]);
        while let Some(v) = queue.pop_front() {
            order.push(v);
            for &w in &adj.out[v] {
                if dist[w] == UNREACHED {
                    dist[w] = dist[v] + 1;
                    queue.push_back(w);
                }
                if dist[w] == dist[v] + 1 {
                    sigma[w] += sigma[v];
                    preds[w].push(v);
                }
            }
        }

        let mut delta = vec![0.0f64; n];
        while let Some(w) = order.pop() {
            for &v in &preds[w] {
                delta[v] += sigma[v] / sigma[w] * (1.0 + delta[w]);
            }
            if w != s {
                bc[w] += delta[w];
            }
        }
    }

    if n > 2 {
        let scale = 1.0 / ((n - 1) * (n - 2)) as f64;
        for b in &mut bc {
            *b *= scale;
        }
    }
    bc
}

/// Incoming-distance closeness with the Wasserman-Faust correction for unreachable nodes.
fn closeness(adj: &Adjacency) -> Vec<f64> {
    let n = adj.len();
    (0..n)
        .map(|v| {
            let (reached, total) = bfs(&adj.inc, v)
                .into_iter()
                .filter(|&d| d != UNREACHED)
                .fold((0usize, 0usize), |(r, t), d| (r + 1, t + d));
            if total == 0 || n < 2 {
                return 0.0;
            }
            let r = (reached - 1) as f64;
            (r / total as f64) * (r / (n - 1) as f64)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(edges: &[(&str, &str)]) -> BehaviorGraph {
        let mut g = BehaviorGraph::new();
        for (a, b) in edges {
            g.add_edge(a, b);
        }
        g
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn directed_triangle() {
        let g = graph(&[("a", "b"), ("b", "c"), ("c", "a")]);
        let s = structural_stats(&g).unwrap();
        assert_eq!(s.node_count, 3);
        assert_eq!(s.edge_count, 3);
        assert!(close(s.avg_degree, 2.0));
        assert!(close(s.density, 0.5));
        assert!(close(s.diameter, 2.0));
        assert!(close(s.avg_path_length, 1.5));
        assert!(close(s.avg_clustering, 1.0));

        let c = centrality_series(&g);
        assert_eq!(c.degree, vec![1.0, 1.0, 1.0]);
        for v in &c.closeness {
            assert!(close(*v, 2.0 / 3.0));
        }
        for v in &c.betweenness {
            assert!(close(*v, 0.5));
        }
        assert_eq!(c.clustering, vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn parallel_edges_collapse() {
        let g = graph(&[("a", "b"), ("a", "b"), ("b", "a")]);
        assert_eq!(g.edge_count(), 2);
    }

    #[test]
    fn disconnected_projection_yields_nan_paths() {
        let g = graph(&[("a", "b"), ("b", "a"), ("c", "d"), ("d", "c")]);
        let s = structural_stats(&g).unwrap();
        assert!(s.diameter.is_nan());
        assert!(s.avg_path_length.is_nan());
        assert!(close(s.density, 4.0 / 12.0));
    }

    #[test]
    fn weakly_but_not_strongly_connected_fails() {
        let g = graph(&[("a", "b"), ("b", "c")]);
        assert!(matches!(
            structural_stats(&g),
            Err(GraphError::InfinitePathLength)
        ));
    }

    #[test]
    fn chain_centralities() {
        let g = graph(&[("a", "b"), ("b", "c")]);
        let c = centrality_series(&g);
        let a = g.name_to_index["a"].index();
        let b = g.name_to_index["b"].index();
        let cc = g.name_to_index["c"].index();
        assert!(close(c.betweenness[b], 0.5));
        assert!(close(c.betweenness[a], 0.0));
        assert_eq!(c.degree[a], 1.0);
        assert_eq!(c.degree[cc], 0.0);
        // c is reached from b (1 hop) and a (2 hops)
        assert!(close(c.closeness[cc], (2.0 / 3.0) * (2.0 / 2.0)));
        // b is reached from a only
        assert!(close(c.closeness[b], (1.0 / 1.0) * (1.0 / 2.0)));
        assert_eq!(c.closeness[a], 0.0);
    }

    #[test]
    fn self_loop_single_node() {
        let g = graph(&[("a", "a")]);
        let s = structural_stats(&g).unwrap();
        assert_eq!(s.node_count, 1);
        assert_eq!(s.edge_count, 1);
        assert!(close(s.avg_degree, 2.0));
        assert_eq!(s.density, 0.0);
        assert_eq!(s.diameter, 0.0);
        assert_eq!(s.avg_path_length, 0.0);
        assert_eq!(s.avg_clustering, 0.0);
    }

    #[test]
    fn clustering_ignores_direction() {
        // a-b-c triangle plus pendant d on a
        let g = graph(&[("a", "b"), ("c", "b"), ("a", "c"), ("d", "a")]);
        let c = centrality_series(&g);
        let a = g.name_to_index["a"].index();
        let d = g.name_to_index["d"].index();
        assert!(close(c.clustering[a], 1.0 / 3.0));
        assert_eq!(c.clustering[d], 0.0);
    }
}
