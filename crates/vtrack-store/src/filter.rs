//! Version queries.

use vtrack_model::{SiblingKey, Version};
use vtrack_types::{VersionId, VersionTypeId, VersionableId};

/// Conjunctive filter over stored versions. Unset fields match everything.
///
/// Results of [`VersionStore::query_versions`](crate::VersionStore::query_versions)
/// are ordered by `version_number`, oldest first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VersionFilter {
    pub versionable: Option<VersionableId>,
    pub version_type: Option<VersionTypeId>,
    pub take_name: Option<String>,
    pub is_published: Option<bool>,
    /// Only versions with an outgoing edge to this version.
    pub references: Option<VersionId>,
}

impl VersionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// All versions sharing owner, type and take.
    pub fn siblings(key: &SiblingKey) -> Self {
        Self {
            versionable: Some(key.versionable),
            version_type: Some(key.version_type),
            take_name: Some(key.take_name.clone()),
            ..Self::default()
        }
    }

    pub fn versionable(mut self, versionable: VersionableId) -> Self {
        self.versionable = Some(versionable);
        self
    }

    pub fn version_type(mut self, version_type: VersionTypeId) -> Self {
        self.version_type = Some(version_type);
        self
    }

    pub fn take_name(mut self, take_name: impl Into<String>) -> Self {
        self.take_name = Some(take_name.into());
        self
    }

    pub fn published(mut self, is_published: bool) -> Self {
        self.is_published = Some(is_published);
        self
    }

    pub fn referencing(mut self, target: VersionId) -> Self {
        self.references = Some(target);
        self
    }

    /// Returns `true` if `version` satisfies every set criterion.
    pub fn matches(&self, version: &Version) -> bool {
        self.versionable.map_or(true, |id| version.versionable() == id)
            && self.version_type.map_or(true, |id| version.version_type() == id)
            && self
                .take_name
                .as_deref()
                .map_or(true, |take| version.take_name() == take)
            && self.is_published.map_or(true, |flag| version.is_published() == flag)
            && self
                .references
                .map_or(true, |target| version.references().contains(&target))
    }
}
