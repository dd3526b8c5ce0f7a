//! High-level API for vtrack.
//!
//! [`Tracker`] ties the validated model, a [`VersionStore`] and the reference
//! graph together. It is the main entry point for tools embedding vtrack:
//! host-application integrations, batch scripts, and UI layers all go
//! through it.

pub mod error;
pub mod references;
pub mod tracker;

pub use error::{TrackerError, TrackerResult};
pub use tracker::Tracker;

// Re-export key types
pub use vtrack_graph::{CheckedEdge, ReferenceGraph};
pub use vtrack_model::{
    ModelError, OwnerChain, Project, Sequence, Status, StatusEntry, StatusList, TrackerConfig,
    ValidationError, Version, VersionDraft, VersionSummary, VersionType, VersionTypeDefinition,
    Versionable,
};
pub use vtrack_naming::{condition_code, condition_extension, condition_free_text};
pub use vtrack_store::{DeleteReport, InMemoryStore, StoreError, VersionFilter, VersionStore};
pub use vtrack_template::{Template, TemplateError};
pub use vtrack_types::{
    OwnerKind, ProjectId, SequenceId, User, VersionId, VersionTypeId, VersionableId,
};

#[cfg(test)]
pub(crate) mod testing;
