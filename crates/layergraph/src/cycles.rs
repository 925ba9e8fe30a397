//! Cycle breaking through an approximate feedback arc set
//!
//! A minimum feedback arc set is NP-hard to compute, so this uses the greedy
//! ordering of Eades, Lin and Smyth: sinks are peeled off to the back of a
//! linear vertex order, sources to the front, and when neither exists the
//! vertex with the largest out-degree minus in-degree goes to the front.
//! Every edge pointing backwards in that order is part of the set.

use petgraph::graphmap::{DiGraphMap, NodeTrait};
use petgraph::visit::{IntoNeighborsDirected, IntoNodeIdentifiers};
use petgraph::Direction;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::hash::Hash;
use tracing::{debug, trace};

/// Compute edges whose reversal makes the graph acyclic
///
/// The result is not guaranteed to be minimal, but an acyclic input always
/// yields an empty set. Self-loops are ignored and parallel edges count once.
/// Ties are broken towards the smallest node id, so the result is
/// deterministic for a given graph.
pub fn feedback_arc_set<G>(graph: G) -> BTreeSet<(G::NodeId, G::NodeId)>
where
    G: IntoNodeIdentifiers + IntoNeighborsDirected,
    G::NodeId: Copy + Ord + Hash,
{
    let order = Peeler::new(graph).into_order();
    let position: HashMap<_, usize> = order
        .iter()
        .enumerate()
        .map(|(index, &node)| (node, index))
        .collect();

    let mut arcs = BTreeSet::new();
    for from in graph.node_identifiers() {
        for to in graph.neighbors_directed(from, Direction::Outgoing) {
            if let (Some(f), Some(t)) = (position.get(&from), position.get(&to)) {
                if t < f {
                    arcs.insert((from, to));
                }
            }
        }
    }

    debug!(
        "Feedback arc set of {} nodes has {} edges",
        order.len(),
        arcs.len()
    );
    arcs
}

/// Reverse every edge of `arcs` present in `graph`
///
/// An edge that is not in the graph is left alone, so applying the same set
/// twice is the same as applying it once.
pub fn reverse_edges<N: NodeTrait>(graph: &mut DiGraphMap<N, ()>, arcs: &BTreeSet<(N, N)>) {
    for &(from, to) in arcs {
        if graph.remove_edge(from, to).is_some() {
            graph.add_edge(to, from, ());
        }
    }
}

/// Working state of the greedy ordering, shrinking as nodes are peeled off
struct Peeler<N> {
    successors: HashMap<N, BTreeSet<N>>,
    predecessors: HashMap<N, BTreeSet<N>>,
    remaining: BTreeSet<N>,
    sinks: BTreeSet<N>,
    sources: BTreeSet<N>,
    /// Remaining nodes keyed by out-degree minus in-degree
    by_delta: BTreeMap<i64, BTreeSet<N>>,
}

impl<N> Peeler<N>
where
    N: Copy + Ord + Hash,
{
    fn new<G>(graph: G) -> Self
    where
        G: IntoNodeIdentifiers<NodeId = N> + IntoNeighborsDirected,
    {
        let remaining: BTreeSet<N> = graph.node_identifiers().collect();
        let mut successors: HashMap<N, BTreeSet<N>> = HashMap::new();
        let mut predecessors: HashMap<N, BTreeSet<N>> = HashMap::new();

        for &from in &remaining {
            successors.entry(from).or_default();
            predecessors.entry(from).or_default();
            for to in graph.neighbors_directed(from, Direction::Outgoing) {
                if to == from || !remaining.contains(&to) {
                    continue;
                }
                successors.entry(from).or_default().insert(to);
                predecessors.entry(to).or_default().insert(from);
            }
        }

        let sinks = remaining
            .iter()
            .copied()
            .filter(|node| degree(&successors, node) == 0)
            .collect();
        let sources = remaining
            .iter()
            .copied()
            .filter(|node| degree(&predecessors, node) == 0)
            .collect();

        let mut peeler = Self {
            successors,
            predecessors,
            remaining,
            sinks,
            sources,
            by_delta: BTreeMap::new(),
        };
        let nodes: Vec<N> = peeler.remaining.iter().copied().collect();
        for node in nodes {
            peeler.bucket(node);
        }
        peeler
    }

    /// Consume the graph and return the linear order
    fn into_order(mut self) -> Vec<N> {
        let mut head = Vec::with_capacity(self.remaining.len());
        let mut tail = Vec::new();

        while !self.remaining.is_empty() {
            if let Some(&sink) = self.sinks.first() {
                self.remove(sink);
                tail.push(sink);
            } else if let Some(&source) = self.sources.first() {
                self.remove(source);
                head.push(source);
            } else {
                // Only cycles are left
                let Some(node) = self.max_delta() else {
                    break;
                };
                trace!(delta = self.delta(&node), "Peeling node off a cycle");
                self.remove(node);
                head.push(node);
            }
        }

        head.extend(tail.into_iter().rev());
        head
    }

    fn delta(&self, node: &N) -> i64 {
        degree(&self.successors, node) as i64 - degree(&self.predecessors, node) as i64
    }

    /// Largest delta, smallest node among equals
    fn max_delta(&self) -> Option<N> {
        self.by_delta
            .last_key_value()
            .and_then(|(_, nodes)| nodes.first().copied())
    }

    fn bucket(&mut self, node: N) {
        let delta = self.delta(&node);
        self.by_delta.entry(delta).or_default().insert(node);
    }

    /// Must run before the degrees of `node` change
    fn unbucket(&mut self, node: N) {
        let delta = self.delta(&node);
        if let Entry::Occupied(mut bucket) = self.by_delta.entry(delta) {
            bucket.get_mut().remove(&node);
            if bucket.get().is_empty() {
                bucket.remove();
            }
        }
    }

    fn remove(&mut self, node: N) {
        self.unbucket(node);
        self.remaining.remove(&node);
        self.sinks.remove(&node);
        self.sources.remove(&node);

        for succ in self.successors.remove(&node).unwrap_or_default() {
            self.unbucket(succ);
            if let Some(preds) = self.predecessors.get_mut(&succ) {
                preds.remove(&node);
                if preds.is_empty() {
                    self.sources.insert(succ);
                }
            }
            self.bucket(succ);
        }
        for pred in self.predecessors.remove(&node).unwrap_or_default() {
            self.unbucket(pred);
            if let Some(succs) = self.successors.get_mut(&pred) {
                succs.remove(&node);
                if succs.is_empty() {
                    self.sinks.insert(pred);
                }
            }
            self.bucket(pred);
        }
    }
}

fn degree<N: Hash + Eq>(adjacency: &HashMap<N, BTreeSet<N>>, node: &N) -> usize {
    adjacency.get(node).map_or(0, BTreeSet::len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use petgraph::algo::{is_cyclic_directed, toposort};
    use petgraph::graph::{DiGraph, NodeIndex};
    use test_log::test;

    fn graph(n: usize, edges: &[(usize, usize)]) -> DiGraphMap<usize, ()> {
        let mut graph = DiGraphMap::new();
        for node in 0..n {
            graph.add_node(node);
        }
        for &(from, to) in edges {
            graph.add_edge(from, to, ());
        }
        graph
    }

    #[test]
    fn empty_graph_has_no_arcs() {
        let graph = graph(0, &[]);
        assert!(feedback_arc_set(&graph).is_empty());
    }

    #[test]
    fn acyclic_graph_has_no_arcs() {
        let graph = graph(6, &[(0, 1), (1, 2), (1, 3), (0, 4), (4, 3), (5, 2)]);
        assert!(feedback_arc_set(&graph).is_empty());
    }

    #[test]
    fn two_cycle_reverses_one_edge() {
        let graph = graph(2, &[(0, 1), (1, 0)]);
        assert_eq!(feedback_arc_set(&graph).len(), 1);
    }

    #[test]
    fn three_cycle_reverses_closing_edge() {
        let graph = graph(3, &[(0, 1), (1, 2), (2, 0)]);
        let arcs = feedback_arc_set(&graph);
        assert_eq!(arcs, BTreeSet::from([(2, 0)]));
    }

    #[test]
    fn reversal_breaks_every_cycle() {
        let edges = [
            (0, 1),
            (1, 2),
            (2, 0),
            (2, 3),
            (3, 4),
            (4, 2),
            (4, 5),
            (5, 1),
            (6, 7),
            (7, 6),
        ];
        let mut graph = graph(8, &edges);
        assert!(is_cyclic_directed(&graph));

        let arcs = feedback_arc_set(&graph);
        reverse_edges(&mut graph, &arcs);
        assert!(!is_cyclic_directed(&graph));
    }

    #[test]
    fn reversal_is_idempotent() {
        let mut graph = graph(3, &[(0, 1), (1, 2), (2, 0)]);
        let arcs = feedback_arc_set(&graph);

        reverse_edges(&mut graph, &arcs);
        let once: Vec<_> = graph.all_edges().map(|(a, b, _)| (a, b)).collect();
        reverse_edges(&mut graph, &arcs);
        let twice: Vec<_> = graph.all_edges().map(|(a, b, _)| (a, b)).collect();

        assert_eq!(once, twice);
        assert!(graph.contains_edge(0, 2));
        assert!(!graph.contains_edge(2, 0));
    }

    #[test]
    fn parallel_edges_count_once() {
        let mut graph = DiGraph::<(), ()>::new();
        let a = graph.add_node(());
        let b = graph.add_node(());
        graph.add_edge(a, b, ());
        graph.add_edge(a, b, ());
        graph.add_edge(b, a, ());

        let arcs: BTreeSet<(NodeIndex, NodeIndex)> = feedback_arc_set(&graph);
        assert_eq!(arcs.len(), 1);
    }

    #[test]
    fn large_cyclic_graph_is_broken() {
        // A ring with forward and backward chords
        let n = 20_000;
        let mut graph = DiGraphMap::with_capacity(n, 3 * n);
        for node in 0..n {
            graph.add_node(node);
        }
        for node in 0..n {
            graph.add_edge(node, (node + 1) % n, ());
            graph.add_edge(node, (node * 7 + 3) % n, ());
            graph.add_edge(node, (node + n - 13) % n, ());
        }
        assert!(toposort(&graph, None).is_err());

        let arcs = feedback_arc_set(&graph);
        assert!(!arcs.is_empty());
        assert!(arcs.len() < graph.edge_count());
        reverse_edges(&mut graph, &arcs);
        assert!(toposort(&graph, None).is_ok());
    }

    #[test]
    fn cycle_peeling_prefers_larger_delta() {
        // 1 has two successors on the cycle, so it is peeled first and only
        // its incoming edge turns backwards
        let graph = graph(3, &[(0, 1), (1, 2), (2, 0), (1, 0)]);
        let arcs = feedback_arc_set(&graph);
        assert_eq!(arcs, BTreeSet::from([(0, 1)]));
    }

    #[test]
    fn self_loops_are_ignored() {
        let graph = graph(2, &[(0, 0), (0, 1)]);
        assert!(feedback_arc_set(&graph).is_empty());
    }
}
