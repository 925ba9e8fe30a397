use super::layers::{topological_order, LayerMap};
use super::LayeredLayoutError;
use petgraph::visit::{IntoNeighborsDirected, IntoNodeIdentifiers};
use petgraph::Direction;
use std::fmt::Debug;
use std::hash::Hash;
use tracing::{debug, trace};

/// Pull every node up towards layer 0 as far as its predecessors allow
///
/// The input must already be a valid layering of `graph` (every edge going
/// to a strictly higher layer). Nodes are swept in topological order, each
/// one moved to the layer right after its deepest predecessor whenever that
/// is lower than its current layer, until a sweep moves nothing or
/// `max_passes` sweeps have run. A node is never moved down, so successors
/// stay strictly below it and the layering remains valid after every sweep.
///
/// A longest-path layering from [`assign_layers`](super::assign_layers) is
/// already tight, so compacting it moves nothing; only layerings built by
/// the caller some other way can change.
///
/// Returns the number of moves made.
///
/// # Errors
/// Returns an error if the graph contains cycles
pub fn compact_layers<G>(
    graph: G,
    layer_map: &mut LayerMap<G::NodeId>,
    max_passes: usize,
) -> Result<usize, LayeredLayoutError<G::NodeId>>
where
    G: IntoNodeIdentifiers + IntoNeighborsDirected,
    G::NodeId: Copy + Ord + Hash + Debug,
{
    let order = topological_order(graph)?;
    let mut moves = 0;

    for pass in 0..max_passes {
        let mut changed = false;

        for &node in &order {
            let Some(&current) = layer_map.get(&node) else {
                continue;
            };
            let lowest = graph
                .neighbors_directed(node, Direction::Incoming)
                .filter_map(|pred| layer_map.get(&pred))
                .map(|layer| layer + 1)
                .max()
                .unwrap_or(0);

            if lowest < current {
                trace!(node = ?node, from = current, to = lowest, "Moving node up");
                layer_map.insert(node, lowest);
                moves += 1;
                changed = true;
            }
        }

        if !changed {
            debug!("Compaction settled after {} passes with {moves} moves", pass + 1);
            return Ok(moves);
        }
    }

    debug!("Compaction stopped at {max_passes} passes with {moves} moves");
    Ok(moves)
}
