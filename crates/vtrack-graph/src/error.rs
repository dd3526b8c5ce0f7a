//! Error types for the reference graph.

use vtrack_types::VersionId;

/// An edge the graph refuses to hold.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// A version cannot reference itself.
    #[error("version {0} cannot reference itself")]
    SelfReference(VersionId),

    /// The edge would close a cycle: `referencer` is already reachable from
    /// `reference`.
    #[error("circular dependency: {reference} already depends on {referencer}")]
    CircularDependency {
        /// The version that would gain the edge.
        referencer: VersionId,
        /// The version it would point at.
        reference: VersionId,
    },
}

/// Convenience alias for graph results.
pub type GraphResult<T> = Result<T, GraphError>;
