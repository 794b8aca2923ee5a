//! Graph store and traversal algorithms.

pub mod store;
pub mod traversal;

pub use store::DirectedGraph;
pub use traversal::UNREACHABLE;

use std::sync::Mutex;

use crate::error::Result;

/// Process-wide graph handle shared by every connection thread.
///
/// A single coarse lock serializes all operations: each public method takes
/// the mutex exactly once, so multi-step computations (shortest path,
/// closer-than) observe a consistent snapshot of the graph and can never
/// interleave with another session's mutation.
///
/// Constructed once at process start and passed around behind an `Arc` —
/// there is deliberately no global instance.
#[derive(Debug, Default)]
pub struct SharedGraph {
    inner: Mutex<DirectedGraph>,
}

impl SharedGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&self, name: &str) -> bool {
        self.inner.lock().unwrap().add_node(name)
    }

    pub fn remove_node(&self, name: &str) -> bool {
        self.inner.lock().unwrap().remove_node(name)
    }

    pub fn add_edge(&self, source: &str, target: &str, weight: u64) -> Result<()> {
        self.inner.lock().unwrap().add_edge(source, target, weight)
    }

    pub fn remove_edge(&self, source: &str, target: &str) -> bool {
        self.inner.lock().unwrap().remove_edge(source, target)
    }

    pub fn shortest_path(&self, source: &str, target: &str) -> Result<u64> {
        self.inner.lock().unwrap().shortest_path(source, target)
    }

    pub fn closer_than(&self, name: &str, threshold: u64) -> Result<Vec<String>> {
        self.inner.lock().unwrap().closer_than(name, threshold)
    }

    pub fn node_count(&self) -> usize {
        self.inner.lock().unwrap().node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.lock().unwrap().edge_count()
    }
}

#[cfg(test)]
mod shared_tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn concurrent_node_inserts_are_serialized() {
        let graph = Arc::new(SharedGraph::new());

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let graph = Arc::clone(&graph);
                thread::spawn(move || {
                    for i in 0..100 {
                        graph.add_node(&format!("node-{}-{}", t, i));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(graph.node_count(), 800);
    }

    #[test]
    fn duplicate_insert_races_resolve_to_one_winner() {
        let graph = Arc::new(SharedGraph::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let graph = Arc::clone(&graph);
                thread::spawn(move || graph.add_node("contested"))
            })
            .collect();
        let wins: usize = handles
            .into_iter()
            .map(|h| h.join().unwrap() as usize)
            .sum();

        assert_eq!(wins, 1);
        assert_eq!(graph.node_count(), 1);
    }
}
