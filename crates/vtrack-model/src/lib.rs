//! # vtrack-model
//!
//! The validated domain model of the tracker: projects and sequences,
//! versionables (assets and shots), version types with their naming
//! templates, versions, statuses, and the [`TrackerConfig`] they are checked
//! against.
//!
//! Every constructor validates before it builds. Nothing here talks to a
//! store; number allocation and status inheritance need sibling versions and
//! are completed by the tracker in `vtrack-sdk`.

pub mod config;
pub mod error;
pub mod project;
pub mod status;
pub mod validate;
pub mod version;
pub mod version_type;
pub mod versionable;

pub use config::TrackerConfig;
pub use error::{ModelError, ModelResult, ValidationError};
pub use project::{Project, Sequence};
pub use status::{Status, StatusEntry, StatusList};
pub use version::{
    allocate_version_number, SiblingKey, ValidatedDraft, Version, VersionDraft, VersionSummary,
};
pub use version_type::{OwnerChain, RenderedPaths, VersionType, VersionTypeDefinition};
pub use versionable::Versionable;
