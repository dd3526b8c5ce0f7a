//! The reference graph between versions.
//!
//! A version "references" the versions it was built from. The edges form a
//! directed graph that must stay acyclic. [`ReferenceGraph`] is an in-memory
//! adjacency view of those edges: it is loaded from the store, asked whether
//! an edge is acceptable, and only then is the edge persisted.
//!
//! # Modules
//!
//! - [`error`] — [`GraphError`]: self references and cycles
//! - [`graph`] — [`ReferenceGraph`], its traversals, and [`CheckedEdge`]

pub mod error;
pub mod graph;

pub use error::{GraphError, GraphResult};
pub use graph::{CheckedEdge, ReferenceGraph};
