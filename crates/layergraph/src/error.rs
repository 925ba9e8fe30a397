use crate::layered::LayeredLayoutError;
use std::fmt;
use thiserror::Error;

/// Why an edge of a request cannot be part of the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    OutOfRange,
    SelfLoop,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::OutOfRange => f.write_str("endpoint out of range"),
            DropReason::SelfLoop => f.write_str("self-loop"),
        }
    }
}

/// An edge of a request that was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EdgeError {
    #[error("edge {index} ({from} -> {to}) has an endpoint outside 0..{vertex_count}")]
    OutOfRange {
        index: usize,
        from: i64,
        to: i64,
        vertex_count: usize,
    },

    #[error("edge {index} is a self-loop on vertex {vertex}")]
    SelfLoop { index: usize, vertex: usize },
}

impl EdgeError {
    pub fn reason(&self) -> DropReason {
        match self {
            EdgeError::OutOfRange { .. } => DropReason::OutOfRange,
            EdgeError::SelfLoop { .. } => DropReason::SelfLoop,
        }
    }
}

/// Errors that can occur while laying out a request
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("invalid edge: {0}")]
    InvalidEdge(#[from] EdgeError),

    #[error(transparent)]
    Layering(#[from] LayeredLayoutError<usize>),
}
