//! Layer assignment for directed graphs
//!
//! This crate computes the hierarchical part of a Sugiyama-style drawing of a
//! directed graph, such as a commit graph or a dependency diagram: which
//! layer every vertex goes to. Drawing coordinates and edge routing are left
//! to the front-end.
//!
//! A layout runs in four steps:
//!
//! - [`cycles`]: an approximate feedback arc set is reversed to make the
//!   graph acyclic
//! - [`components`]: the graph is split into weakly-connected components
//! - [`layered::assign_layers`]: each component gets a longest-path layering
//! - [`layered::compact_layers`]: vertices are pulled up as far as their
//!   predecessors allow
//!
//! # Example
//!
//! ```
//! use layergraph::{LayeredLayout, LayoutEngine, LayoutRequest};
//!
//! // 0 -> 1 -> 2 -> 0 is a cycle, 3 stands alone
//! let request = LayoutRequest::from_flat(4, &[0, 1, 1, 2, 2, 0], vec![]);
//!
//! let layout = LayeredLayout::default().layout(&request).unwrap();
//!
//! assert_eq!(layout.reversed, vec![(2, 0)]);
//! assert_eq!(layout.components[0].layers, vec![vec![0], vec![1], vec![2]]);
//! assert_eq!(layout.components[1].layers, vec![vec![3]]);
//! ```
//!
//! The individual steps are generic over petgraph's visitor traits and can be
//! used on any petgraph graph.

mod engine;
mod error;
mod observer;
mod request;
mod response;

pub mod components;
pub mod cycles;
pub mod layered;

// Re-export core types and traits
pub use engine::LayoutEngine;
pub use error::{DropReason, EdgeError, LayoutError};
pub use observer::{LayoutEvent, LayoutObserver, TraceObserver};
pub use request::{LayoutRequest, RawEdge};
pub use response::{ComponentLayout, GraphLayout};

// Re-export layered layout types
pub use layered::{layout_graph, EdgePolicy, LayeredLayout, LayeredLayoutError, Layers};
