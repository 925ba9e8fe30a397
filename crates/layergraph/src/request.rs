use crate::layered::EdgePolicy;
use crate::{EdgeError, LayoutEvent, LayoutObserver};
use petgraph::graphmap::DiGraphMap;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Directed edge as received from a front-end, not validated yet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RawEdge(pub i64, pub i64);

impl RawEdge {
    /// Check the edge against a graph of `vertex_count` vertices
    pub fn validate(self, index: usize, vertex_count: usize) -> Result<(usize, usize), EdgeError> {
        let in_range = |v: i64| usize::try_from(v).ok().filter(|&v| v < vertex_count);
        match (in_range(self.0), in_range(self.1)) {
            (Some(from), Some(to)) if from == to => Err(EdgeError::SelfLoop {
                index,
                vertex: from,
            }),
            (Some(from), Some(to)) => Ok((from, to)),
            _ => Err(EdgeError::OutOfRange {
                index,
                from: self.0,
                to: self.1,
                vertex_count,
            }),
        }
    }
}

/// Graph to lay out
///
/// Vertices are the ids `0..vertex_count`. Labels are positional and only
/// carried along for front-ends; they never influence the layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutRequest {
    pub vertex_count: usize,

    #[serde(default)]
    pub edges: Vec<RawEdge>,

    #[serde(default)]
    pub labels: Vec<String>,
}

impl LayoutRequest {
    /// Create a request with `vertex_count` vertices and no edges
    pub fn new(vertex_count: usize) -> Self {
        Self {
            vertex_count,
            ..Default::default()
        }
    }

    /// Decode edges from the flat `from0, to0, from1, to1, ...` encoding
    ///
    /// A trailing unpaired value is ignored.
    pub fn from_flat(vertex_count: usize, edges: &[i64], labels: Vec<String>) -> Self {
        Self {
            vertex_count,
            edges: edges
                .chunks_exact(2)
                .map(|pair| RawEdge(pair[0], pair[1]))
                .collect(),
            labels,
        }
    }

    pub fn with_edge(mut self, from: i64, to: i64) -> Self {
        self.edges.push(RawEdge(from, to));
        self
    }

    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    /// Display label of a vertex, if the request carries one
    pub fn label(&self, vertex: usize) -> Option<&str> {
        self.labels.get(vertex).map(String::as_str)
    }

    /// Build the directed graph of the request
    ///
    /// Every vertex is present, duplicate edges collapse into one. Invalid
    /// edges are reported to `observer` and skipped under
    /// [`EdgePolicy::Drop`], or returned as an error under
    /// [`EdgePolicy::Reject`].
    pub fn build_graph<O>(
        &self,
        policy: EdgePolicy,
        observer: &mut O,
    ) -> Result<DiGraphMap<usize, ()>, EdgeError>
    where
        O: LayoutObserver + ?Sized,
    {
        let mut graph = DiGraphMap::with_capacity(self.vertex_count, self.edges.len());
        for vertex in 0..self.vertex_count {
            graph.add_node(vertex);
        }

        for (index, &edge) in self.edges.iter().enumerate() {
            match edge.validate(index, self.vertex_count) {
                Ok((from, to)) => {
                    graph.add_edge(from, to, ());
                }
                Err(err) if policy == EdgePolicy::Drop => {
                    trace!("Dropping {err}");
                    observer.on_event(&LayoutEvent::EdgeDropped {
                        index,
                        edge,
                        reason: err.reason(),
                    });
                }
                Err(err) => return Err(err),
            }
        }

        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DropReason;
    use test_log::test;

    #[test]
    fn flat_edges_are_paired() {
        let request = LayoutRequest::from_flat(3, &[0, 1, 1, 2, 2], vec![]);
        assert_eq!(request.edges, vec![RawEdge(0, 1), RawEdge(1, 2)]);
    }

    #[test]
    fn invalid_edges_are_dropped() {
        let request = LayoutRequest::new(3)
            .with_edge(0, 1)
            .with_edge(-1, 2)
            .with_edge(2, 3)
            .with_edge(1, 1)
            .with_edge(0, 1);

        let mut dropped = Vec::new();
        let graph = request
            .build_graph(EdgePolicy::Drop, &mut |event: &LayoutEvent<'_>| {
                if let LayoutEvent::EdgeDropped { index, reason, .. } = *event {
                    dropped.push((index, reason));
                }
            })
            .unwrap();

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.contains_edge(0, 1));
        assert_eq!(
            dropped,
            vec![
                (1, DropReason::OutOfRange),
                (2, DropReason::OutOfRange),
                (3, DropReason::SelfLoop)
            ]
        );
    }

    #[test]
    fn invalid_edges_are_rejected() {
        let request = LayoutRequest::new(2).with_edge(0, 1).with_edge(1, 1);
        let err = request.build_graph(EdgePolicy::Reject, &mut ()).unwrap_err();
        assert_eq!(err, EdgeError::SelfLoop { index: 1, vertex: 1 });
    }

    #[test]
    fn labels_are_positional() {
        let request = LayoutRequest::new(2).with_labels(["main", "feature"]);
        assert_eq!(request.label(1), Some("feature"));
        assert_eq!(request.label(2), None);
    }

    #[test]
    fn request_reads_from_json() {
        let request: LayoutRequest =
            serde_json::from_str(r#"{"vertex_count": 2, "edges": [[0, 1]]}"#).unwrap();
        assert_eq!(request, LayoutRequest::new(2).with_edge(0, 1));
    }
}
