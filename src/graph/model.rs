//! Simple directed graph over named nodes. Parallel edges collapse; self-loops stay.

use super::DotDocument;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct BehaviorGraph {
    pub graph: DiGraph<String, ()>,
    pub name_to_index: HashMap<String, NodeIndex>,
}

impl BehaviorGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the existing index if `name` is already present.
    pub fn add_node(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.name_to_index.get(name) {
            return idx;
        }
        let idx = self.graph.add_node(name.to_string());
        self.name_to_index.insert(name.to_string(), idx);
        idx
    }

    /// Adds `from -> to` unless that edge already exists.
    pub fn add_edge(&mut self, from: &str, to: &str) {
        let a = self.add_node(from);
        let b = self.add_node(to);
        self.graph.update_edge(a, b, ());
    }

    /// Undirected documents contribute both directions of every edge.
    pub fn from_document(doc: &DotDocument) -> Self {
        let mut g = Self::new();
        for name in &doc.nodes {
            g.add_node(name);
        }
        for (a, b) in &doc.edges {
            g.add_edge(a, b);
            if !doc.directed {
                g.add_edge(b, a);
            }
        }
        g
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Dense adjacency: `out[i]` successors and `inc[i]` predecessors of node `i`.
    pub(crate) fn adjacency(&self) -> Adjacency {
        let n = self.node_count();
        let mut out = vec![Vec::new(); n];
        let mut inc = vec![Vec::new(); n];
        for idx in self.graph.node_indices() {
            out[idx.index()] = self
                .graph
                .neighbors_directed(idx, Direction::Outgoing)
                .map(|m| m.index())
                .collect();
            inc[idx.index()] = self
                .graph
                .neighbors_directed(idx, Direction::Incoming)
                .map(|m| m.index())
                .collect();
        }
        Adjacency { out, inc }
    }
}

pub(crate) struct Adjacency {
    pub out: Vec<Vec<usize>>,
    pub inc: Vec<Vec<usize>>,
}

impl Adjacency {
    pub fn len(&self) -> usize {
        self.out.len()
    }

    /// Distinct neighbors in either direction, excluding the node itself.
    pub fn undirected_neighbors(&self, v: usize) -> Vec<usize> {
        let mut ns: Vec<usize> = self.out[v]
            .iter()
            .chain(self.inc[v].iter())
            .copied()
            .filter(|&u| u != v)
            .collect();
        ns.sort_unstable();
        ns.dedup();
        ns
    }
}
