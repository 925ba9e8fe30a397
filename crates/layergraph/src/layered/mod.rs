mod compact;
mod layers;

use crate::components::{build_undirected, split};
use crate::cycles::{feedback_arc_set, reverse_edges};
use crate::{
    ComponentLayout, GraphLayout, LayoutEngine, LayoutError, LayoutEvent, LayoutObserver,
    LayoutRequest,
};
use petgraph::visit::{IntoNeighborsDirected, IntoNodeIdentifiers};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;
use thiserror::Error;
use tracing::debug;

pub use compact::compact_layers;
pub use layers::{assign_layers, group_layers, is_monotonic, LayerMap};

/// Errors that can occur during layer assignment
#[derive(Debug, Error)]
pub enum LayeredLayoutError<N>
where
    N: fmt::Debug,
{
    /// The graph contains a cycle at the given node
    #[error("graph contains a cycle at node {0:?}")]
    GraphHasCycle(N),
}

/// What to do with edges that have an endpoint out of range or are self-loops
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgePolicy {
    /// Leave the edge out of the graph
    #[default]
    Drop,
    /// Fail the whole layout
    Reject,
}

/// Configuration for the layered (Sugiyama-style) layer assignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayeredLayout {
    /// Handling of invalid edges in a request
    pub edge_policy: EdgePolicy,

    /// Whether to run layer compaction after the initial layering
    pub compact: bool,

    /// Maximum sweeps of layer compaction
    pub max_compaction_passes: usize,
}

impl Default for LayeredLayout {
    fn default() -> Self {
        Self {
            edge_policy: EdgePolicy::Drop,
            compact: true,
            max_compaction_passes: 16,
        }
    }
}

impl LayeredLayout {
    /// Create a new layered layout with the given edge policy
    pub fn new(edge_policy: EdgePolicy) -> Self {
        Self {
            edge_policy,
            ..Default::default()
        }
    }
}

/// Layer structure of one acyclic graph
#[derive(Debug, Clone)]
pub struct Layers<N>
where
    N: Copy + Ord + Hash,
{
    /// Layer index of every node
    pub layer_map: LayerMap<N>,

    /// Nodes organized into non-empty layers
    pub nodes: Vec<Vec<N>>,

    /// Number of layers before compaction
    pub naive_height: usize,

    /// Number of nodes moved by compaction
    pub moves: usize,
}

impl LayeredLayout {
    /// Compute the layer structure of an acyclic graph
    ///
    /// Nodes get their longest-path layer first, then are compacted towards
    /// layer 0 if enabled.
    ///
    /// # Errors
    /// Returns an error if the graph contains cycles
    pub fn compute_layers<G>(
        &self,
        graph: G,
    ) -> Result<Layers<G::NodeId>, LayeredLayoutError<G::NodeId>>
    where
        G: IntoNodeIdentifiers + IntoNeighborsDirected,
        G::NodeId: Copy + Ord + Hash + fmt::Debug,
    {
        let mut layer_map = assign_layers(graph)?;
        let naive_height = group_layers(&layer_map).len();

        let moves = if self.compact {
            compact_layers(graph, &mut layer_map, self.max_compaction_passes)?
        } else {
            0
        };

        Ok(Layers {
            nodes: group_layers(&layer_map),
            layer_map,
            naive_height,
            moves,
        })
    }
}

impl LayoutEngine for LayeredLayout {
    type Error = LayoutError;

    fn layout_with<O>(
        &self,
        request: &LayoutRequest,
        observer: &mut O,
    ) -> Result<GraphLayout, Self::Error>
    where
        O: LayoutObserver + ?Sized,
    {
        debug!(
            "Layout of {} vertices and {} edges",
            request.vertex_count,
            request.edges.len()
        );

        let mut graph = request.build_graph(self.edge_policy, observer)?;

        let arcs = feedback_arc_set(&graph);
        reverse_edges(&mut graph, &arcs);
        for &(from, to) in &arcs {
            observer.on_event(&LayoutEvent::EdgeReversed { from, to });
        }

        let edges: Vec<(usize, usize)> = graph.all_edges().map(|(from, to, _)| (from, to)).collect();
        observer.on_event(&LayoutEvent::AcyclicGraph { edges: &edges });

        let components = split(&build_undirected(&graph));
        debug!("Graph splits into {} components", components.len());

        let mut laid_out = Vec::with_capacity(components.len());
        for (index, component) in components.iter().enumerate() {
            let subgraph = component.induce(&graph);
            let layers = self.compute_layers(&subgraph).map_err(
                |LayeredLayoutError::GraphHasCycle(local)| {
                    LayeredLayoutError::GraphHasCycle(component.to_global(local).unwrap_or(local))
                },
            )?;

            let global_layers: Vec<Vec<usize>> = layers
                .nodes
                .iter()
                .map(|layer| {
                    let mut vertices: Vec<usize> = layer
                        .iter()
                        .filter_map(|&local| component.to_global(local))
                        .collect();
                    vertices.sort_unstable();
                    vertices
                })
                .collect();

            observer.on_event(&LayoutEvent::ComponentLaidOut {
                index,
                vertices: component.nodes(),
                naive_layers: layers.naive_height,
                layers: global_layers.len(),
            });
            laid_out.push(ComponentLayout {
                layers: global_layers,
            });
        }

        Ok(GraphLayout {
            components: laid_out,
            reversed: arcs.into_iter().collect(),
        })
    }
}

/// Lay out a graph given in the flat edge encoding with the default configuration
///
/// Invalid edges are dropped, so this only fails on internal errors.
pub fn layout_graph(
    vertex_count: usize,
    edges: &[i64],
    labels: &[String],
) -> Result<GraphLayout, LayoutError> {
    let request = LayoutRequest::from_flat(vertex_count, edges, labels.to_vec());
    LayeredLayout::default().layout(&request)
}
