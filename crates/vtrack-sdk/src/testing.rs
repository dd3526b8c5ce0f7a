//! Shared fixture for tracker tests.

use vtrack_model::{
    Project, Sequence, TrackerConfig, Version, VersionDraft, VersionType, Versionable,
};
use vtrack_store::{DeleteReport, InMemoryStore, StoreResult, VersionFilter, VersionStore};
use vtrack_types::{OwnerKind, ProjectId, SequenceId, User, VersionId, VersionTypeId, VersionableId};

use crate::tracker::Tracker;

pub(crate) struct Studio {
    pub tracker: Tracker,
    pub project: Project,
    pub hero: Versionable,
    pub villain: Versionable,
    pub model: VersionType,
    pub user: User,
}

impl Studio {
    /// A project with two assets and the default version types.
    pub fn new() -> Self {
        let tracker = Tracker::in_memory(TrackerConfig::default());
        tracker.bootstrap_version_types().unwrap();
        let project = tracker.create_project("Test Project", "TP").unwrap();
        let hero = tracker.create_asset(&project, "Hero", "Hero").unwrap();
        let villain = tracker.create_asset(&project, "Villain", "Villain").unwrap();
        let model = tracker.find_version_type("MODEL").unwrap().unwrap();
        Self {
            tracker,
            project,
            hero,
            villain,
            model,
            user: User::new("Test User"),
        }
    }

    pub fn draft(&self, owner: &Versionable) -> VersionDraft {
        VersionDraft::new()
            .owner(owner.id)
            .version_type(self.model.id)
            .base_name(owner.code.as_str())
            .extension("ma")
            .created_by(self.user.clone())
    }

    pub fn version(&self, owner: &Versionable) -> Version {
        self.tracker.create_version(self.draft(owner)).unwrap()
    }

    pub fn published(&self, owner: &Versionable) -> Version {
        self.tracker.create_version(self.draft(owner).published(true)).unwrap()
    }
}

/// An in-memory store that answers version queries highest number first.
#[derive(Default)]
pub(crate) struct NewestFirst(InMemoryStore);

impl VersionStore for NewestFirst {
    fn save_project(&self, project: &Project) -> StoreResult<()> {
        self.0.save_project(project)
    }

    fn get_project(&self, id: ProjectId) -> StoreResult<Option<Project>> {
        self.0.get_project(id)
    }

    fn list_projects(&self) -> StoreResult<Vec<Project>> {
        self.0.list_projects()
    }

    fn save_sequence(&self, sequence: &Sequence) -> StoreResult<()> {
        self.0.save_sequence(sequence)
    }

    fn get_sequence(&self, id: SequenceId) -> StoreResult<Option<Sequence>> {
        self.0.get_sequence(id)
    }

    fn list_sequences(&self, project: ProjectId) -> StoreResult<Vec<Sequence>> {
        self.0.list_sequences(project)
    }

    fn save_versionable(&self, versionable: &Versionable) -> StoreResult<()> {
        self.0.save_versionable(versionable)
    }

    fn get_versionable(&self, id: VersionableId) -> StoreResult<Option<Versionable>> {
        self.0.get_versionable(id)
    }

    fn list_versionables(
        &self,
        project: ProjectId,
        kind: Option<OwnerKind>,
    ) -> StoreResult<Vec<Versionable>> {
        self.0.list_versionables(project, kind)
    }

    fn save_version_type(&self, version_type: &VersionType) -> StoreResult<()> {
        self.0.save_version_type(version_type)
    }

    fn get_version_type(&self, id: VersionTypeId) -> StoreResult<Option<VersionType>> {
        self.0.get_version_type(id)
    }

    fn find_version_type(&self, code: &str) -> StoreResult<Option<VersionType>> {
        self.0.find_version_type(code)
    }

    fn list_version_types(&self) -> StoreResult<Vec<VersionType>> {
        self.0.list_version_types()
    }

    fn save_version(&self, version: &Version) -> StoreResult<()> {
        self.0.save_version(version)
    }

    fn get_version(&self, id: VersionId) -> StoreResult<Option<Version>> {
        self.0.get_version(id)
    }

    fn query_versions(&self, filter: &VersionFilter) -> StoreResult<Vec<Version>> {
        let mut versions = self.0.query_versions(filter)?;
        versions.reverse();
        Ok(versions)
    }

    fn delete_version(&self, id: VersionId) -> StoreResult<DeleteReport> {
        self.0.delete_version(id)
    }

    fn delete_versionable(&self, id: VersionableId) -> StoreResult<DeleteReport> {
        self.0.delete_versionable(id)
    }
}
