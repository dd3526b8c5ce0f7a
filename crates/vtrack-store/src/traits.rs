//! The [`VersionStore`] trait defining the record storage interface.
//!
//! Any backend (in-memory, file, database) implements this trait. The
//! tracker never enforces uniqueness itself; it relies on `save_*` rejecting
//! collisions with [`StoreError::UniquenessViolation`].

use serde::{Deserialize, Serialize};

use vtrack_model::{Project, Sequence, SiblingKey, Version, VersionType, Versionable};
use vtrack_types::{OwnerKind, ProjectId, SequenceId, VersionId, VersionTypeId, VersionableId};

use crate::error::{StoreError, StoreResult};
use crate::filter::VersionFilter;

/// What a delete removed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteReport {
    /// Ids of the deleted versions.
    pub versions_deleted: Vec<VersionId>,
    /// Reference edges removed from surviving versions.
    pub edges_dropped: usize,
}

/// Storage backend for tracker records.
///
/// `save_*` inserts or replaces by id. Each enforces the unique constraints
/// of its record kind:
///
/// - project: `code`
/// - sequence: `(project, code)`
/// - versionable: `(project, kind, name)` and `(project, kind, code)`
/// - version type: `name` and `code`
/// - version: `(versionable, version_type, take_name, version_number)`
///
/// Implementations must be thread-safe and must apply each call atomically.
pub trait VersionStore: Send + Sync {
    fn save_project(&self, project: &Project) -> StoreResult<()>;
    fn get_project(&self, id: ProjectId) -> StoreResult<Option<Project>>;
    fn list_projects(&self) -> StoreResult<Vec<Project>>;

    /// Fails with [`StoreError::DanglingParent`] if the project is unknown.
    fn save_sequence(&self, sequence: &Sequence) -> StoreResult<()>;
    fn get_sequence(&self, id: SequenceId) -> StoreResult<Option<Sequence>>;
    /// Sequences of a project, ordered by code.
    fn list_sequences(&self, project: ProjectId) -> StoreResult<Vec<Sequence>>;

    /// Fails with [`StoreError::DanglingParent`] if the project (or a shot's
    /// sequence) is unknown.
    fn save_versionable(&self, versionable: &Versionable) -> StoreResult<()>;
    fn get_versionable(&self, id: VersionableId) -> StoreResult<Option<Versionable>>;
    /// Owners of a project, optionally of one kind, ordered by code.
    fn list_versionables(
        &self,
        project: ProjectId,
        kind: Option<OwnerKind>,
    ) -> StoreResult<Vec<Versionable>>;

    fn save_version_type(&self, version_type: &VersionType) -> StoreResult<()>;
    fn get_version_type(&self, id: VersionTypeId) -> StoreResult<Option<VersionType>>;
    fn find_version_type(&self, code: &str) -> StoreResult<Option<VersionType>>;
    /// All version types, ordered by code.
    fn list_version_types(&self) -> StoreResult<Vec<VersionType>>;

    /// Fails with [`StoreError::DanglingParent`] if the owner or type is
    /// unknown.
    fn save_version(&self, version: &Version) -> StoreResult<()>;
    fn get_version(&self, id: VersionId) -> StoreResult<Option<Version>>;

    /// Versions matching `filter`, ordered by version number.
    fn query_versions(&self, filter: &VersionFilter) -> StoreResult<Vec<Version>>;

    /// Delete one version and drop every edge pointing at it.
    ///
    /// Versions it references are untouched.
    fn delete_version(&self, id: VersionId) -> StoreResult<DeleteReport>;

    /// Delete an owner together with all of its versions, dropping edges from
    /// surviving versions into the deleted ones.
    fn delete_versionable(&self, id: VersionableId) -> StoreResult<DeleteReport>;

    /// Fetch a version or fail with [`StoreError::NotFound`].
    fn require_version(&self, id: VersionId) -> StoreResult<Version> {
        self.get_version(id)?
            .ok_or_else(|| StoreError::not_found("version", id))
    }

    fn require_versionable(&self, id: VersionableId) -> StoreResult<Versionable> {
        self.get_versionable(id)?
            .ok_or_else(|| StoreError::not_found("versionable", id))
    }

    fn require_version_type(&self, id: VersionTypeId) -> StoreResult<VersionType> {
        self.get_version_type(id)?
            .ok_or_else(|| StoreError::not_found("version type", id))
    }

    fn require_project(&self, id: ProjectId) -> StoreResult<Project> {
        self.get_project(id)?
            .ok_or_else(|| StoreError::not_found("project", id))
    }

    fn require_sequence(&self, id: SequenceId) -> StoreResult<Sequence> {
        self.get_sequence(id)?
            .ok_or_else(|| StoreError::not_found("sequence", id))
    }

    /// Highest version number in a sibling set, or 0 when it is empty.
    fn max_version_number(&self, key: &SiblingKey) -> StoreResult<u32> {
        Ok(self
            .query_versions(&VersionFilter::siblings(key))?
            .iter()
            .map(Version::version_number)
            .max()
            .unwrap_or(0))
    }

    /// The highest-numbered version of a sibling set.
    fn latest_version(&self, key: &SiblingKey) -> StoreResult<Option<Version>> {
        Ok(self
            .query_versions(&VersionFilter::siblings(key))?
            .into_iter()
            .max_by_key(Version::version_number))
    }

    /// Versions with an outgoing edge to `id`.
    fn referrers(&self, id: VersionId) -> StoreResult<Vec<Version>> {
        self.query_versions(&VersionFilter::new().referencing(id))
    }
}
