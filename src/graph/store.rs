//! In-memory directed weighted graph.
//!
//! Nodes are identified by name. At most one edge is stored per ordered
//! `(source, target)` pair; re-adding an edge replaces its weight. Edge
//! endpoints must be member nodes, and removing a node cascades to every
//! incident edge in both directions.

use std::collections::{HashMap, HashSet};

use crate::error::{GraphError, Result};
use crate::graph::traversal::{self, UNREACHABLE};

/// Directed weighted graph keyed by node name.
///
/// Not synchronized — wrap in [`crate::graph::SharedGraph`] for concurrent
/// access from connection threads.
#[derive(Debug, Default)]
pub struct DirectedGraph {
    /// Node name -> outgoing edges (target -> weight). Every member node has
    /// an entry here, even with no outgoing edges.
    outgoing: HashMap<String, HashMap<String, u64>>,
    /// Node name -> sources of incoming edges. Kept in lockstep with
    /// `outgoing` for O(degree) cascade removal and the undirected view.
    incoming: HashMap<String, HashSet<String>>,
}

impl DirectedGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains_node(&self, name: &str) -> bool {
        self.outgoing.contains_key(name)
    }

    /// Insert a node. Returns false (and leaves the graph untouched) if a
    /// node with that name already exists.
    pub fn add_node(&mut self, name: &str) -> bool {
        if self.contains_node(name) {
            return false;
        }
        self.outgoing.insert(name.to_string(), HashMap::new());
        self.incoming.insert(name.to_string(), HashSet::new());
        true
    }

    /// Remove a node and every edge touching it. Returns false if absent.
    pub fn remove_node(&mut self, name: &str) -> bool {
        let Some(targets) = self.outgoing.remove(name) else {
            return false;
        };
        for target in targets.keys() {
            if let Some(sources) = self.incoming.get_mut(target) {
                sources.remove(name);
            }
        }
        if let Some(sources) = self.incoming.remove(name) {
            for source in sources {
                if let Some(targets) = self.outgoing.get_mut(&source) {
                    targets.remove(name);
                }
            }
        }
        true
    }

    /// Insert or replace the edge `source -> target`.
    ///
    /// Fails with `NodeNotFound` if either endpoint is not a member node.
    /// Self-loops are allowed. The caller is responsible for rejecting
    /// non-positive weights before they reach the store.
    pub fn add_edge(&mut self, source: &str, target: &str, weight: u64) -> Result<()> {
        if !self.contains_node(source) {
            return Err(GraphError::NodeNotFound(source.to_string()));
        }
        if !self.contains_node(target) {
            return Err(GraphError::NodeNotFound(target.to_string()));
        }
        self.outgoing
            .get_mut(source)
            .expect("endpoint checked above")
            .insert(target.to_string(), weight);
        self.incoming
            .get_mut(target)
            .expect("endpoint checked above")
            .insert(source.to_string());
        Ok(())
    }

    /// Remove the edge `source -> target`. Returns false when no such edge
    /// exists, including when either endpoint is absent.
    pub fn remove_edge(&mut self, source: &str, target: &str) -> bool {
        let Some(targets) = self.outgoing.get_mut(source) else {
            return false;
        };
        if targets.remove(target).is_none() {
            return false;
        }
        if let Some(sources) = self.incoming.get_mut(target) {
            sources.remove(source);
        }
        true
    }

    /// Minimum total weight over directed paths from `source` to `target`.
    ///
    /// Returns [`UNREACHABLE`] when no directed path exists, and 0 when
    /// `source == target`. Fails with `NodeNotFound` if either endpoint is
    /// absent.
    pub fn shortest_path(&self, source: &str, target: &str) -> Result<u64> {
        if !self.contains_node(source) {
            return Err(GraphError::NodeNotFound(source.to_string()));
        }
        if !self.contains_node(target) {
            return Err(GraphError::NodeNotFound(target.to_string()));
        }
        let dist = traversal::dijkstra(source, |n| self.weighted_neighbors(n));
        Ok(dist.get(target).copied().unwrap_or(UNREACHABLE))
    }

    /// Names of all nodes whose directed distance from `name` is strictly
    /// below `threshold`, excluding `name` itself, sorted lexicographically.
    ///
    /// Candidates are first restricted to the weakly-connected component of
    /// `name` (direction ignored); the directed distance then enforces the
    /// actual asymmetric cost, so a weak neighbor behind the wrong arrow
    /// still drops out.
    pub fn closer_than(&self, name: &str, threshold: u64) -> Result<Vec<String>> {
        if !self.contains_node(name) {
            return Err(GraphError::NodeNotFound(name.to_string()));
        }
        let component = traversal::undirected_component(name, |n| self.undirected_neighbors(n));
        let dist = traversal::dijkstra(name, |n| self.weighted_neighbors(n));

        let mut result: Vec<String> = component
            .into_iter()
            .filter(|candidate| candidate != name)
            .filter(|candidate| {
                dist.get(candidate)
                    .is_some_and(|d| *d < threshold)
            })
            .collect();
        result.sort();
        Ok(result)
    }

    pub fn node_count(&self) -> usize {
        self.outgoing.len()
    }

    pub fn edge_count(&self) -> usize {
        self.outgoing.values().map(HashMap::len).sum()
    }

    fn weighted_neighbors(&self, name: &str) -> Vec<(String, u64)> {
        self.outgoing
            .get(name)
            .map(|targets| targets.iter().map(|(t, w)| (t.clone(), *w)).collect())
            .unwrap_or_default()
    }

    fn undirected_neighbors(&self, name: &str) -> Vec<String> {
        let mut neighbors: Vec<String> = self
            .outgoing
            .get(name)
            .map(|targets| targets.keys().cloned().collect())
            .unwrap_or_default();
        if let Some(sources) = self.incoming.get(name) {
            neighbors.extend(sources.iter().cloned());
        }
        neighbors
    }
}
