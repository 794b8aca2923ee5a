//! Graph traversal algorithms.
//!
//! Free functions over a neighbor closure so they stay independent of how
//! the store lays out its adjacency. `dijkstra` drives the SHORTEST PATH
//! command; `undirected_component` supplies the candidate set for CLOSER THAN.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};

/// Distance value reserved for "no directed path exists".
pub const UNREACHABLE: u64 = u64::MAX;

/// Heap entry for Dijkstra. Ordered by cost, reversed for a min-heap.
#[derive(Clone, PartialEq, Eq)]
struct State {
    cost: u64,
    node: String,
}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Single-source shortest distances over positive edge weights.
///
/// `neighbors` yields `(target, weight)` pairs for the outgoing edges of a
/// node. Returns the distance map for every node reachable from `source`;
/// nodes absent from the map are unreachable. `dist[source]` is always 0.
pub fn dijkstra<F>(source: &str, neighbors: F) -> HashMap<String, u64>
where
    F: Fn(&str) -> Vec<(String, u64)>,
{
    let mut dist: HashMap<String, u64> = HashMap::new();
    let mut heap = BinaryHeap::new();

    dist.insert(source.to_string(), 0);
    heap.push(State {
        cost: 0,
        node: source.to_string(),
    });

    while let Some(State { cost, node }) = heap.pop() {
        // Stale entry: a shorter path to this node was already settled.
        if cost > *dist.get(&node).unwrap_or(&UNREACHABLE) {
            continue;
        }

        for (next, weight) in neighbors(&node) {
            let next_cost = cost.saturating_add(weight);
            if next_cost < *dist.get(&next).unwrap_or(&UNREACHABLE) {
                dist.insert(next.clone(), next_cost);
                heap.push(State {
                    cost: next_cost,
                    node: next,
                });
            }
        }
    }

    dist
}

/// Nodes in the weakly-connected component of `start`, including `start`.
///
/// Plain BFS; `neighbors` must yield adjacency with edge direction ignored
/// (outgoing targets plus incoming sources).
pub fn undirected_component<F>(start: &str, neighbors: F) -> HashSet<String>
where
    F: Fn(&str) -> Vec<String>,
{
    let mut visited: HashSet<String> = HashSet::new();
    let mut queue: VecDeque<String> = VecDeque::new();

    visited.insert(start.to_string());
    queue.push_back(start.to_string());

    while let Some(current) = queue.pop_front() {
        for next in neighbors(&current) {
            if visited.insert(next.clone()) {
                queue.push_back(next);
            }
        }
    }

    visited
}
