use petgraph::graphmap::{DiGraphMap, NodeTrait, UnGraphMap};
use petgraph::visit::{IntoNeighborsDirected, IntoNodeIdentifiers};
use petgraph::Direction;
use std::collections::{HashMap, HashSet, VecDeque};

/// Weakly-connected set of nodes, in discovery order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component<N> {
    nodes: Vec<N>,
}

impl<N: NodeTrait> Component<N> {
    /// Nodes of the component; the position of a node is its local id
    pub fn nodes(&self) -> &[N] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Map a local id of the induced subgraph back to the original node
    pub fn to_global(&self, local: usize) -> Option<N> {
        self.nodes.get(local).copied()
    }

    /// Build the subgraph induced by this component, renumbered densely
    ///
    /// Local ids follow the component's node order. Edges leaving the
    /// component are dropped.
    pub fn induce<G>(&self, graph: G) -> DiGraphMap<usize, ()>
    where
        G: IntoNeighborsDirected<NodeId = N>,
    {
        let local: HashMap<N, usize> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(index, &node)| (node, index))
            .collect();

        let mut subgraph = DiGraphMap::with_capacity(self.nodes.len(), 0);
        for index in 0..self.nodes.len() {
            subgraph.add_node(index);
        }
        for (from, &node) in self.nodes.iter().enumerate() {
            for succ in graph.neighbors_directed(node, Direction::Outgoing) {
                if let Some(&to) = local.get(&succ) {
                    subgraph.add_edge(from, to, ());
                }
            }
        }
        subgraph
    }
}

/// Symmetric closure of a directed graph, self-loops left out
pub fn build_undirected<G>(graph: G) -> UnGraphMap<G::NodeId, ()>
where
    G: IntoNodeIdentifiers + IntoNeighborsDirected,
    G::NodeId: NodeTrait,
{
    let mut undirected = UnGraphMap::new();
    for node in graph.node_identifiers() {
        undirected.add_node(node);
    }
    for from in graph.node_identifiers() {
        for to in graph.neighbors_directed(from, Direction::Outgoing) {
            if from != to {
                undirected.add_edge(from, to, ());
            }
        }
    }
    undirected
}

/// Partition an undirected graph into connected components
///
/// Components are discovered from the smallest unvisited node upwards, and
/// each is explored breadth-first with neighbors taken in ascending order.
/// Isolated nodes form singleton components.
pub fn split<N: NodeTrait>(graph: &UnGraphMap<N, ()>) -> Vec<Component<N>> {
    let mut starts: Vec<N> = graph.nodes().collect();
    starts.sort_unstable();

    let mut visited = HashSet::with_capacity(starts.len());
    let mut components = Vec::new();

    for start in starts {
        if !visited.insert(start) {
            continue;
        }

        let mut nodes = vec![start];
        let mut queue = VecDeque::from([start]);
        while let Some(node) = queue.pop_front() {
            let mut neighbors: Vec<N> = graph.neighbors(node).collect();
            neighbors.sort_unstable();
            for neighbor in neighbors {
                if visited.insert(neighbor) {
                    nodes.push(neighbor);
                    queue.push_back(neighbor);
                }
            }
        }

        components.push(Component { nodes });
    }

    components
}
