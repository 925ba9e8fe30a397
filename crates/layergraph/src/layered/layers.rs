use super::LayeredLayoutError;
use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use petgraph::visit::{IntoNeighborsDirected, IntoNodeIdentifiers};
use petgraph::Direction;
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::hash::Hash;

/// Layer index of every node, ordered by node
pub type LayerMap<N> = BTreeMap<N, usize>;

/// Assign layers to nodes with longest-path layering
///
/// Nodes without predecessors go to layer 0, every other node to the layer
/// after its deepest predecessor. This gives the lowest possible height
/// under that rule but says nothing about width or edge span.
///
/// # Errors
/// Returns an error if the graph contains cycles
pub fn assign_layers<G>(graph: G) -> Result<LayerMap<G::NodeId>, LayeredLayoutError<G::NodeId>>
where
    G: IntoNodeIdentifiers + IntoNeighborsDirected,
    G::NodeId: Copy + Ord + Hash + Debug,
{
    let mut layer_map = LayerMap::new();

    for node in topological_order(graph)? {
        let layer = graph
            .neighbors_directed(node, Direction::Incoming)
            .map(|pred| layer_map.get(&pred).unwrap_or(&0) + 1)
            .max()
            .unwrap_or(0);
        layer_map.insert(node, layer);
    }

    Ok(layer_map)
}

/// Group nodes by layer
///
/// Only non-empty layers are returned, in ascending layer order, with nodes
/// ascending inside each layer.
pub fn group_layers<N: Copy + Ord>(layer_map: &LayerMap<N>) -> Vec<Vec<N>> {
    let mut grouped: BTreeMap<usize, Vec<N>> = BTreeMap::new();
    for (&node, &layer) in layer_map {
        grouped.entry(layer).or_default().push(node);
    }
    grouped.into_values().collect()
}

/// Check that every edge goes from a lower to a strictly higher layer
pub fn is_monotonic<G>(graph: G, layer_map: &LayerMap<G::NodeId>) -> bool
where
    G: IntoNodeIdentifiers + IntoNeighborsDirected,
    G::NodeId: Copy + Ord,
{
    graph.node_identifiers().all(|from| {
        graph
            .neighbors_directed(from, Direction::Outgoing)
            .all(|to| match (layer_map.get(&from), layer_map.get(&to)) {
                (Some(a), Some(b)) => a < b,
                _ => false,
            })
    })
}

pub(super) fn topological_order<G>(
    graph: G,
) -> Result<Vec<G::NodeId>, LayeredLayoutError<G::NodeId>>
where
    G: IntoNodeIdentifiers + IntoNeighborsDirected,
    G::NodeId: Copy + Ord + Hash + Debug,
{
    // Convert to DiGraphMap for toposort
    let mut graph_map = DiGraphMap::new();
    for node in graph.node_identifiers() {
        graph_map.add_node(node);
    }
    for node in graph.node_identifiers() {
        for succ in graph.neighbors_directed(node, Direction::Outgoing) {
            graph_map.add_edge(node, succ, ());
        }
    }

    toposort(&graph_map, None).map_err(|cycle| LayeredLayoutError::GraphHasCycle(cycle.node_id()))
}

#[cfg(test)]
mod tests {
    use super::*;
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
    fn chain_gets_one_layer_per_node() {
        let graph = graph(4, &[(0, 1), (1, 2), (2, 3)]);
        let layers = assign_layers(&graph).unwrap();
        assert_eq!(group_layers(&layers), vec![vec![0], vec![1], vec![2], vec![3]]);
    }

    #[test]
    fn deepest_predecessor_wins() {
        // 0 -> 1 -> 2 -> 3 and a shortcut 0 -> 3
        let graph = graph(4, &[(0, 1), (1, 2), (2, 3), (0, 3)]);
        let layers = assign_layers(&graph).unwrap();
        assert_eq!(layers[&3], 3);
        assert!(is_monotonic(&graph, &layers));
    }

    #[test]
    fn every_source_starts_at_zero() {
        let graph = graph(4, &[(0, 2), (1, 2), (3, 1)]);
        let layers = assign_layers(&graph).unwrap();
        assert_eq!(layers[&0], 0);
        assert_eq!(layers[&3], 0);
        assert_eq!(layers[&1], 1);
        assert_eq!(layers[&2], 2);
    }

    #[test]
    fn cycle_is_an_error() {
        let graph = graph(3, &[(0, 1), (1, 2), (2, 0)]);
        assert!(matches!(
            assign_layers(&graph),
            Err(LayeredLayoutError::GraphHasCycle(_))
        ));
    }

    #[test]
    fn grouping_skips_empty_layers() {
        let layers = LayerMap::from([(2, 4), (0, 0), (1, 4), (3, 1)]);
        assert_eq!(group_layers(&layers), vec![vec![0], vec![3], vec![1, 2]]);
    }

    #[test]
    fn monotonic_check_rejects_flat_edges() {
        let graph = graph(2, &[(0, 1)]);
        assert!(!is_monotonic(&graph, &LayerMap::from([(0, 1), (1, 1)])));
        assert!(is_monotonic(&graph, &LayerMap::from([(0, 0), (1, 1)])));
    }
}
