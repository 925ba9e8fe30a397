use crate::{DropReason, RawEdge};
use tracing::{debug, trace};

/// Something worth reporting while a layout is computed
///
/// Events borrow from the layout in progress and are only valid for the
/// duration of [`LayoutObserver::on_event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutEvent<'a> {
    /// An edge of the request was dropped instead of rejected
    EdgeDropped {
        index: usize,
        edge: RawEdge,
        reason: DropReason,
    },

    /// An edge was reversed to break a cycle
    EdgeReversed { from: usize, to: usize },

    /// Every edge of the graph once all cycles are broken
    AcyclicGraph { edges: &'a [(usize, usize)] },

    /// A connected component received its final layers
    ComponentLaidOut {
        index: usize,
        vertices: &'a [usize],
        naive_layers: usize,
        layers: usize,
    },
}

/// Receiver for diagnostic events of a layout computation
pub trait LayoutObserver {
    fn on_event(&mut self, event: &LayoutEvent<'_>);
}

/// Ignore every event
impl LayoutObserver for () {
    fn on_event(&mut self, _event: &LayoutEvent<'_>) {}
}

// Blanket implementation for closures
impl<F> LayoutObserver for F
where
    F: FnMut(&LayoutEvent<'_>),
{
    fn on_event(&mut self, event: &LayoutEvent<'_>) {
        self(event)
    }
}

/// Forward every event to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TraceObserver;

impl LayoutObserver for TraceObserver {
    fn on_event(&mut self, event: &LayoutEvent<'_>) {
        match *event {
            LayoutEvent::EdgeDropped {
                index,
                edge: RawEdge(from, to),
                reason,
            } => debug!("Dropped edge {index} ({from} -> {to}): {reason}"),
            LayoutEvent::EdgeReversed { from, to } => debug!("Reversed {from} -> {to}"),
            LayoutEvent::AcyclicGraph { edges } => {
                trace!("Graph dump begin");
                for (from, to) in edges {
                    trace!("{from} -> {to}");
                }
                trace!("Graph dump end");
            }
            LayoutEvent::ComponentLaidOut {
                index,
                vertices,
                naive_layers,
                layers,
            } => debug!(
                "Component {index} with {} vertices laid out on {layers} layers ({naive_layers} before compaction)",
                vertices.len()
            ),
        }
    }
}
