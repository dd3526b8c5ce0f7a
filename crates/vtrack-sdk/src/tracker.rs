use std::path::Path;

use tracing::{debug, info, warn};

use vtrack_model::{
    allocate_version_number, OwnerChain, Project, Sequence, SiblingKey, Status, TrackerConfig,
    ValidatedDraft, Version, VersionDraft, VersionType, VersionTypeDefinition, Versionable,
};
use vtrack_store::{DeleteReport, InMemoryStore, VersionFilter, VersionStore};
use vtrack_types::{OwnerKind, ProjectId, VersionId, VersionTypeId, VersionableId};

use crate::error::TrackerResult;

/// High-level tracker API.
///
/// Owns a store and the configuration every operation is validated against.
/// All calls are synchronous; the store is the only shared resource.
pub struct Tracker<S: VersionStore = InMemoryStore> {
    pub(crate) store: S,
    pub(crate) config: TrackerConfig,
}

impl Tracker<InMemoryStore> {
    /// A tracker over a fresh in-memory store.
    pub fn in_memory(config: TrackerConfig) -> Self {
        Self::new(InMemoryStore::new(), config)
    }
}

impl<S: VersionStore> Tracker<S> {
    pub fn new(store: S, config: TrackerConfig) -> Self {
        Self { store, config }
    }

    /// A tracker configured from a TOML file.
    pub fn with_config_file(store: S, path: impl AsRef<Path>) -> TrackerResult<Self> {
        Ok(Self::new(store, TrackerConfig::load(path)?))
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ---- Owner chain ----

    pub fn create_project(&self, name: &str, code: &str) -> TrackerResult<Project> {
        let project = Project::new(name, code)?;
        self.store.save_project(&project)?;
        info!(project = %project.code, "created project");
        Ok(project)
    }

    pub fn create_sequence(
        &self,
        project: &Project,
        name: &str,
        code: &str,
    ) -> TrackerResult<Sequence> {
        let sequence = Sequence::new(project, name, code)?;
        self.store.save_sequence(&sequence)?;
        info!(project = %project.code, sequence = %sequence.code, "created sequence");
        Ok(sequence)
    }

    pub fn create_asset(
        &self,
        project: &Project,
        name: &str,
        code: &str,
    ) -> TrackerResult<Versionable> {
        self.add_versionable(Versionable::asset(project, name, code)?)
    }

    pub fn create_shot(
        &self,
        project: &Project,
        sequence: &Sequence,
        name: &str,
        code: &str,
    ) -> TrackerResult<Versionable> {
        self.add_versionable(Versionable::shot(project, sequence, name, code)?)
    }

    /// Persist an already validated owner.
    pub fn add_versionable(&self, versionable: Versionable) -> TrackerResult<Versionable> {
        self.store.save_versionable(&versionable)?;
        info!(kind = %versionable.kind, code = %versionable.code, "created versionable");
        Ok(versionable)
    }

    pub fn versionables(
        &self,
        project: ProjectId,
        kind: Option<OwnerKind>,
    ) -> TrackerResult<Vec<Versionable>> {
        Ok(self.store.list_versionables(project, kind)?)
    }

    // ---- Version types ----

    pub fn create_version_type(
        &self,
        definition: VersionTypeDefinition,
    ) -> TrackerResult<VersionType> {
        let version_type = VersionType::new(definition)?;
        self.store.save_version_type(&version_type)?;
        info!(
            code = %version_type.code(),
            owner_kind = %version_type.owner_kind(),
            "created version type"
        );
        Ok(version_type)
    }

    /// Create the configured version types that do not exist yet, matched by
    /// code. Returns the newly created ones.
    pub fn bootstrap_version_types(&self) -> TrackerResult<Vec<VersionType>> {
        let mut created = Vec::new();
        for definition in &self.config.version_types {
            if self.store.find_version_type(&definition.code)?.is_some() {
                debug!(code = %definition.code, "version type exists, skipping");
                continue;
            }
            created.push(self.create_version_type(definition.clone())?);
        }
        Ok(created)
    }

    /// Replace a version type's definition, keeping its identity.
    ///
    /// Existing versions keep the paths they were rendered with. They pick up
    /// the new templates the next time they are re-rendered (for instance
    /// when their extension is set).
    pub fn update_version_type(
        &self,
        id: VersionTypeId,
        definition: VersionTypeDefinition,
    ) -> TrackerResult<VersionType> {
        let current = self.store.require_version_type(id)?;
        let updated = current.redefine(definition)?;
        self.store.save_version_type(&updated)?;
        info!(code = %updated.code(), "updated version type");
        Ok(updated)
    }

    pub fn find_version_type(&self, code: &str) -> TrackerResult<Option<VersionType>> {
        Ok(self.store.find_version_type(code)?)
    }

    /// Version types usable in `environment` for owners of `kind`.
    pub fn version_types_for(
        &self,
        environment: &str,
        kind: OwnerKind,
    ) -> TrackerResult<Vec<VersionType>> {
        Ok(self
            .store
            .list_version_types()?
            .into_iter()
            .filter(|vt| vt.owner_kind() == kind && vt.applies_to_environment(environment))
            .collect())
    }

    // ---- Versions ----

    /// Validate, number, render and persist a new version.
    ///
    /// The number is `max + 1` over the sibling set unless the draft asks for
    /// a larger one; a smaller request is bumped without error. Without an
    /// explicit status the latest sibling's status is inherited, falling back
    /// to the first configured status.
    ///
    /// Reading the maximum and saving are separate store calls. A concurrent
    /// writer claiming the same number makes the save fail with a uniqueness
    /// violation, see [`TrackerError::is_uniqueness_violation`].
    ///
    /// [`TrackerError::is_uniqueness_violation`]: crate::TrackerError::is_uniqueness_violation
    pub fn create_version(&self, draft: VersionDraft) -> TrackerResult<Version> {
        let owner = self.store.require_versionable(draft.owner_id()?)?;
        let version_type = self.store.require_version_type(draft.version_type_id()?)?;
        let validated = draft.validate(&owner, &version_type, &self.config)?;

        let key = validated.sibling_key().clone();
        let latest = self.store.latest_version(&key)?;
        let max_existing = latest.as_ref().map_or(0, Version::version_number);
        let number = allocate_version_number(validated.requested_number(), max_existing);
        if let Some(requested) = validated.requested_number() {
            if requested != number {
                debug!(
                    requested,
                    allocated = number,
                    take = %key.take_name,
                    "bumped version number"
                );
            }
        }
        let status = self.initial_status(&validated, latest.as_ref());

        let mut version = validated.into_version(number, status);
        let records = self.owner_records(owner)?;
        version.rerender(&version_type, &records.chain(), &self.config.status_list)?;
        self.store.save_version(&version)?;
        info!(
            version = %version.id,
            filename = %version.filename(),
            number,
            status = %version.status(),
            "created version"
        );
        Ok(version)
    }

    fn initial_status(&self, validated: &ValidatedDraft, latest: Option<&Version>) -> Status {
        if let Some(status) = validated.requested_status() {
            return status.clone();
        }
        match latest {
            Some(previous) if self.config.status_list.contains(previous.status()) => {
                debug!(status = %previous.status(), from = %previous.id, "inherited status");
                previous.status().clone()
            }
            Some(previous) => {
                warn!(
                    status = %previous.status(),
                    "latest sibling has an unconfigured status, using the first configured one"
                );
                self.config.status_list.first()
            }
            None => self.config.status_list.first(),
        }
    }

    /// Load the records `owner` renders against.
    fn owner_records(&self, owner: Versionable) -> TrackerResult<OwnerRecords> {
        let project = self.store.require_project(owner.project)?;
        let sequences = self.store.list_sequences(project.id)?;
        let sequence = owner
            .sequence
            .map(|id| self.store.require_sequence(id))
            .transpose()?;
        Ok(OwnerRecords {
            project,
            sequences,
            sequence,
            owner,
        })
    }

    /// Load a stored version with its type and owner chain.
    fn load_for_render(
        &self,
        id: VersionId,
    ) -> TrackerResult<(Version, VersionType, OwnerRecords)> {
        let version = self.store.require_version(id)?;
        let version_type = self.store.require_version_type(version.version_type())?;
        let owner = self.store.require_versionable(version.versionable())?;
        let records = self.owner_records(owner)?;
        Ok((version, version_type, records))
    }

    /// Re-render a stored version with its type's current templates.
    pub fn refresh_paths(&self, id: VersionId) -> TrackerResult<Version> {
        let (mut version, version_type, records) = self.load_for_render(id)?;
        version.rerender(&version_type, &records.chain(), &self.config.status_list)?;
        self.store.save_version(&version)?;
        debug!(version = %id, filename = %version.filename(), "refreshed paths");
        Ok(version)
    }

    /// Load, modify and save a version whose locations do not change.
    fn update(&self, id: VersionId, change: impl FnOnce(&mut Version)) -> TrackerResult<Version> {
        let mut version = self.store.require_version(id)?;
        change(&mut version);
        self.store.save_version(&version)?;
        Ok(version)
    }

    /// Set the extension and re-render the file name and paths.
    pub fn set_extension(&self, id: VersionId, extension: &str) -> TrackerResult<Version> {
        let (mut version, version_type, records) = self.load_for_render(id)?;
        version.set_extension(
            extension,
            &version_type,
            &records.chain(),
            &self.config.status_list,
        )?;
        self.store.save_version(&version)?;
        debug!(version = %id, filename = %version.filename(), "re-rendered after extension change");
        Ok(version)
    }

    /// Set the status by code or display name.
    pub fn set_status(&self, id: VersionId, status: &str) -> TrackerResult<Version> {
        let status = self.config.status_list.resolve(status)?;
        let version = self.update(id, |v| v.set_status(status))?;
        debug!(version = %id, status = %version.status(), "set status");
        Ok(version)
    }

    pub fn set_published(&self, id: VersionId, is_published: bool) -> TrackerResult<Version> {
        let version = self.update(id, |v| v.set_published(is_published))?;
        info!(version = %id, is_published, "set published");
        Ok(version)
    }

    pub fn set_note(&self, id: VersionId, note: &str) -> TrackerResult<Version> {
        self.update(id, |v| v.set_note(note))
    }

    pub fn version(&self, id: VersionId) -> TrackerResult<Version> {
        Ok(self.store.require_version(id)?)
    }

    /// Versions of an owner, ordered by number.
    pub fn versions_of(&self, owner: VersionableId) -> TrackerResult<Vec<Version>> {
        Ok(self.store.query_versions(&VersionFilter::new().versionable(owner))?)
    }

    /// Siblings of a version (itself included), ordered by number.
    pub fn siblings(&self, id: VersionId) -> TrackerResult<Vec<Version>> {
        let key = self.store.require_version(id)?.sibling_key();
        Ok(self.store.query_versions(&VersionFilter::siblings(&key))?)
    }

    /// The highest-numbered sibling of a version (possibly itself).
    pub fn latest_version(&self, id: VersionId) -> TrackerResult<Version> {
        let version = self.store.require_version(id)?;
        Ok(self.store.latest_version(&version.sibling_key())?.unwrap_or(version))
    }

    /// The highest-numbered published sibling, if any is published.
    pub fn latest_published_version(&self, id: VersionId) -> TrackerResult<Option<Version>> {
        let key = self.store.require_version(id)?.sibling_key();
        self.latest_published(&key)
    }

    pub(crate) fn latest_published(&self, key: &SiblingKey) -> TrackerResult<Option<Version>> {
        Ok(self
            .store
            .query_versions(&VersionFilter::siblings(key).published(true))?
            .into_iter()
            .max_by_key(Version::version_number))
    }

    /// Returns `true` if no sibling has a higher number.
    pub fn is_latest_version(&self, id: VersionId) -> TrackerResult<bool> {
        let version = self.store.require_version(id)?;
        let max = self.store.max_version_number(&version.sibling_key())?;
        Ok(version.version_number() >= max)
    }

    /// Render the extra folders of a version's type for that version.
    pub fn render_extra_folders(&self, id: VersionId) -> TrackerResult<Vec<String>> {
        let (version, version_type, records) = self.load_for_render(id)?;
        Ok(version_type.render_extra_folders(&records.chain(), &version, &self.config.status_list)?)
    }

    // ---- Deletion ----

    /// Delete one version. Edges pointing at it are dropped; the versions it
    /// references survive.
    pub fn delete_version(&self, id: VersionId) -> TrackerResult<DeleteReport> {
        let report = self.store.delete_version(id)?;
        info!(version = %id, edges_dropped = report.edges_dropped, "deleted version");
        Ok(report)
    }

    /// Delete an asset or shot with all of its versions.
    pub fn delete_versionable(&self, id: VersionableId) -> TrackerResult<DeleteReport> {
        let report = self.store.delete_versionable(id)?;
        info!(
            versionable = %id,
            versions_deleted = report.versions_deleted.len(),
            edges_dropped = report.edges_dropped,
            "deleted versionable"
        );
        Ok(report)
    }
}

/// Owned owner chain of a version.
struct OwnerRecords {
    project: Project,
    sequences: Vec<Sequence>,
    sequence: Option<Sequence>,
    owner: Versionable,
}

impl OwnerRecords {
    fn chain(&self) -> OwnerChain<'_> {
        OwnerChain {
            project: &self.project,
            sequences: &self.sequences,
            sequence: self.sequence.as_ref(),
            owner: &self.owner,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TrackerError;
    use crate::testing::{NewestFirst, Studio};
    use vtrack_model::{ModelError, ValidationError};
    use vtrack_types::User;

    fn numbers(versions: &[Version]) -> Vec<u32> {
        versions.iter().map(Version::version_number).collect()
    }

    // ---- Test 1: first version is numbered, rendered, and waiting ----
    #[test]
    fn first_version_rendered() {
        let studio = Studio::new();
        let v1 = studio.version(&studio.hero);
        assert_eq!(v1.version_number(), 1);
        assert_eq!(v1.take_name(), "MAIN");
        assert_eq!(v1.status().code(), "WTS");
        assert_eq!(v1.filename(), "Hero_MAIN_MODEL_v001_tu.ma");
        assert_eq!(v1.path(), "TP/Assets/Hero/MODEL");
        assert_eq!(v1.output_path(), "TP/Assets/Hero/MODEL/Outputs");
        assert_eq!(v1.full_path(), "TP/Assets/Hero/MODEL/Hero_MAIN_MODEL_v001_tu.ma");
        assert_eq!(studio.tracker.version(v1.id).unwrap(), v1);
    }

    // ---- Test 2: numbers are max + 1, low requests are bumped ----
    #[test]
    fn numbering_follows_sibling_max() {
        let studio = Studio::new();
        for _ in 0..3 {
            studio.version(&studio.hero);
        }
        let bumped = studio
            .tracker
            .create_version(studio.draft(&studio.hero).version_number(2))
            .unwrap();
        assert_eq!(bumped.version_number(), 4);

        let equal = studio
            .tracker
            .create_version(studio.draft(&studio.hero).version_number(4))
            .unwrap();
        assert_eq!(equal.version_number(), 5);

        let jump = studio
            .tracker
            .create_version(studio.draft(&studio.hero).version_number(10))
            .unwrap();
        assert_eq!(jump.version_number(), 10);
        assert_eq!(studio.version(&studio.hero).version_number(), 11);

        let all = studio.tracker.versions_of(studio.hero.id).unwrap();
        assert_eq!(numbers(&all), vec![1, 2, 3, 4, 5, 10, 11]);
    }

    // ---- Test 3: takes and owners are numbered independently ----
    #[test]
    fn sibling_sets_are_independent() {
        let studio = Studio::new();
        studio.version(&studio.hero);
        studio.version(&studio.hero);
        let alt = studio
            .tracker
            .create_version(studio.draft(&studio.hero).take_name("alt"))
            .unwrap();
        assert_eq!(alt.take_name(), "Alt");
        assert_eq!(alt.version_number(), 1);
        assert_eq!(studio.version(&studio.villain).version_number(), 1);
        assert_eq!(numbers(&studio.tracker.siblings(alt.id).unwrap()), vec![1]);
    }

    // ---- Test 4: status is inherited from the latest sibling ----
    #[test]
    fn status_inherited_from_latest_sibling() {
        let studio = Studio::new();
        let v1 = studio
            .tracker
            .create_version(studio.draft(&studio.hero).status("Work In Progress"))
            .unwrap();
        assert_eq!(v1.status().code(), "WIP");

        let v2 = studio.version(&studio.hero);
        assert_eq!(v2.status().code(), "WIP");

        studio.tracker.set_status(v2.id, "REV").unwrap();
        let v3 = studio.version(&studio.hero);
        assert_eq!(v3.status().code(), "REV");

        let other_take = studio
            .tracker
            .create_version(studio.draft(&studio.hero).take_name("Alt"))
            .unwrap();
        assert_eq!(other_take.status().code(), "WTS");
    }

    // ---- Test 5: unknown statuses are rejected everywhere ----
    #[test]
    fn invalid_status_rejected() {
        let studio = Studio::new();
        let err = studio
            .tracker
            .create_version(studio.draft(&studio.hero).status("Finished-ish"))
            .unwrap_err();
        assert!(matches!(err, TrackerError::Model(ModelError::InvalidStatus { .. })));

        let v1 = studio.version(&studio.hero);
        assert!(matches!(
            studio.tracker.set_status(v1.id, "nope").unwrap_err(),
            TrackerError::Model(ModelError::InvalidStatus { .. })
        ));
        let approved = studio.tracker.set_status(v1.id, "Approved").unwrap();
        assert_eq!(approved.status().code(), "APP");
        assert_eq!(studio.tracker.version(v1.id).unwrap().status().code(), "APP");
    }

    // ---- Test 6: setting the extension re-renders ----
    #[test]
    fn extension_change_rerenders() {
        let studio = Studio::new();
        let v1 = studio.version(&studio.hero);
        let updated = studio.tracker.set_extension(v1.id, "mb").unwrap();
        assert_eq!(updated.extension(), ".mb");
        assert_eq!(updated.filename(), "Hero_MAIN_MODEL_v001_tu.mb");
        assert_eq!(studio.tracker.version(v1.id).unwrap().filename(), "Hero_MAIN_MODEL_v001_tu.mb");
    }

    #[test]
    fn refresh_without_changes_is_stable() {
        let studio = Studio::new();
        let v1 = studio.version(&studio.hero);
        let first = studio.tracker.refresh_paths(v1.id).unwrap();
        let second = studio.tracker.refresh_paths(v1.id).unwrap();
        assert_eq!(first, v1);
        assert_eq!(second, first);
        assert_eq!(studio.tracker.set_extension(v1.id, "ma").unwrap(), v1);
    }

    #[test]
    fn output_path_follows_rendered_path() {
        let studio = Studio::new();
        let mut definition = studio.model.definition();
        definition.output_path = "{{version.path}}/Outputs".into();
        studio.tracker.update_version_type(studio.model.id, definition.clone()).unwrap();
        let v1 = studio.version(&studio.hero);
        assert_eq!(v1.path(), "TP/Assets/Hero/MODEL");
        assert_eq!(v1.output_path(), "TP/Assets/Hero/MODEL/Outputs");

        definition.path = "NEW/{{asset.code}}".into();
        studio.tracker.update_version_type(studio.model.id, definition).unwrap();
        let refreshed = studio.tracker.refresh_paths(v1.id).unwrap();
        assert_eq!(refreshed.path(), "NEW/Hero");
        assert_eq!(refreshed.output_path(), "NEW/Hero/Outputs");
        assert_eq!(studio.tracker.refresh_paths(v1.id).unwrap(), refreshed);
    }

    // ---- Test 7: latest and latest published ----
    #[test]
    fn latest_and_published_queries() {
        let studio = Studio::new();
        let v1 = studio.version(&studio.hero);
        assert!(studio.tracker.latest_published_version(v1.id).unwrap().is_none());
        assert!(studio.tracker.is_latest_version(v1.id).unwrap());

        let v2 = studio.version(&studio.hero);
        let v3 = studio.version(&studio.hero);
        let v4 = studio.version(&studio.hero);
        studio.tracker.set_published(v1.id, true).unwrap();
        studio.tracker.set_published(v3.id, true).unwrap();

        let published = studio.tracker.latest_published_version(v2.id).unwrap().unwrap();
        assert_eq!(published.id, v3.id);
        assert_eq!(studio.tracker.latest_version(v1.id).unwrap().id, v4.id);
        assert!(!studio.tracker.is_latest_version(v1.id).unwrap());
        assert!(studio.tracker.is_latest_version(v4.id).unwrap());
    }

    #[test]
    fn numbering_does_not_depend_on_query_order() {
        let tracker = Tracker::new(NewestFirst::default(), TrackerConfig::default());
        tracker.bootstrap_version_types().unwrap();
        let project = tracker.create_project("Test Project", "TP").unwrap();
        let hero = tracker.create_asset(&project, "Hero", "Hero").unwrap();
        let model = tracker.find_version_type("MODEL").unwrap().unwrap();
        let draft = || {
            VersionDraft::new()
                .owner(hero.id)
                .version_type(model.id)
                .base_name("Hero")
                .extension("ma")
                .created_by(User::new("Test User"))
        };

        let versions: Vec<Version> = (0..4)
            .map(|_| tracker.create_version(draft()).unwrap())
            .collect();
        assert_eq!(numbers(&versions), vec![1, 2, 3, 4]);

        tracker.set_published(versions[0].id, true).unwrap();
        tracker.set_published(versions[2].id, true).unwrap();
        let published = tracker.latest_published_version(versions[0].id).unwrap().unwrap();
        assert_eq!(published.id, versions[2].id);
        assert_eq!(tracker.latest_version(versions[0].id).unwrap().id, versions[3].id);
    }

    // ---- Test 8: type must match owner kind ----
    #[test]
    fn incompatible_type_rejected() {
        let studio = Studio::new();
        let anim = studio.tracker.find_version_type("ANIM").unwrap().unwrap();
        let err = studio
            .tracker
            .create_version(studio.draft(&studio.hero).version_type(anim.id))
            .unwrap_err();
        assert!(matches!(
            err,
            TrackerError::Model(ModelError::IncompatibleType {
                expected: OwnerKind::Shot,
                actual: OwnerKind::Asset,
                ..
            })
        ));
    }

    // ---- Test 9: missing fields surface as validation errors ----
    #[test]
    fn missing_fields_rejected() {
        let studio = Studio::new();
        let no_creator = VersionDraft::new()
            .owner(studio.hero.id)
            .version_type(studio.model.id)
            .base_name("Hero");
        let err = studio.tracker.create_version(no_creator).unwrap_err();
        assert_eq!(err.validation(), Some(&ValidationError::missing("created_by")));

        let no_owner = VersionDraft::new()
            .version_type(studio.model.id)
            .base_name("Hero")
            .created_by(User::new("Test User"));
        let err = studio.tracker.create_version(no_owner).unwrap_err();
        assert_eq!(err.validation(), Some(&ValidationError::missing("versionable")));
    }

    // ---- Test 10: store collisions are distinguishable ----
    #[test]
    fn uniqueness_violations_propagate() {
        let studio = Studio::new();
        let err = studio.tracker.create_asset(&studio.project, "Other", "Hero").unwrap_err();
        assert!(err.is_uniqueness_violation());

        let v1 = studio.version(&studio.hero);
        let config = studio.tracker.config();
        let racer = studio
            .draft(&studio.hero)
            .validate(&studio.hero, &studio.model, config)
            .unwrap()
            .into_version(v1.version_number(), config.status_list.first());
        let err = TrackerError::from(studio.tracker.store().save_version(&racer).unwrap_err());
        assert!(err.is_uniqueness_violation());

        assert!(!TrackerError::from(ValidationError::missing("x")).is_uniqueness_violation());
    }

    // ---- Test 11: bootstrap skips existing types ----
    #[test]
    fn bootstrap_is_idempotent() {
        let studio = Studio::new();
        assert!(studio.tracker.bootstrap_version_types().unwrap().is_empty());
        assert_eq!(
            studio.tracker.store().list_version_types().unwrap().len(),
            studio.tracker.config().version_types.len()
        );
    }

    // ---- Test 12: type lookup by environment and owner kind ----
    #[test]
    fn version_types_filtered_by_environment() {
        let studio = Studio::new();
        let codes = |env: &str, kind: OwnerKind| -> Vec<String> {
            studio
                .tracker
                .version_types_for(env, kind)
                .unwrap()
                .iter()
                .map(|vt| vt.code().to_string())
                .collect()
        };
        assert_eq!(codes("Maya", OwnerKind::Asset), vec!["MODEL", "RIG"]);
        assert_eq!(codes("Maya", OwnerKind::Shot), vec!["ANIM", "LIGHT"]);
        assert_eq!(codes("Nuke", OwnerKind::Shot), vec!["COMP"]);
        assert!(codes("Blender", OwnerKind::Asset).is_empty());
    }

    // ---- Test 13: redefined types leave existing paths until re-rendered ----
    #[test]
    fn updated_type_applies_on_rerender() {
        let studio = Studio::new();
        let v1 = studio.version(&studio.hero);

        let mut definition = studio.model.definition();
        definition.filename = "{{version.base_name}}_v{{'%03d'|format(version.version_number)}}{{version.extension}}".into();
        let updated = studio.tracker.update_version_type(studio.model.id, definition).unwrap();
        assert_eq!(updated.id, studio.model.id);

        assert_eq!(studio.tracker.version(v1.id).unwrap().filename(), "Hero_MAIN_MODEL_v001_tu.ma");
        assert_eq!(studio.version(&studio.hero).filename(), "Hero_v002.ma");
        assert_eq!(studio.tracker.set_extension(v1.id, "ma").unwrap().filename(), "Hero_v001.ma");
    }

    #[test]
    fn owner_kind_of_type_cannot_change() {
        let studio = Studio::new();
        let mut definition = studio.model.definition();
        definition.owner_kind = OwnerKind::Shot;
        assert!(studio.tracker.update_version_type(studio.model.id, definition).is_err());
    }

    #[test]
    fn malformed_template_rejected_at_type_creation() {
        let studio = Studio::new();
        let mut definition = studio.model.definition();
        definition.name = "Broken".into();
        definition.code = "BROKEN".into();
        definition.path = "{{ project.code ".into();
        let err = studio.tracker.create_version_type(definition).unwrap_err();
        assert!(matches!(
            err,
            TrackerError::Model(ModelError::TemplateSyntax { ref field, .. }) if field == "path_template"
        ));
        assert!(studio.tracker.find_version_type("BROKEN").unwrap().is_none());
    }

    // ---- Test 14: shots render through their sequence ----
    #[test]
    fn shot_paths_include_sequence() {
        let studio = Studio::new();
        let sequence = studio
            .tracker
            .create_sequence(&studio.project, "Opening", "SEQ010")
            .unwrap();
        let shot = studio
            .tracker
            .create_shot(&studio.project, &sequence, "Shot 10", "SH010")
            .unwrap();
        let anim = studio.tracker.find_version_type("ANIM").unwrap().unwrap();
        let v1 = studio
            .tracker
            .create_version(
                VersionDraft::new()
                    .owner(shot.id)
                    .version_type(anim.id)
                    .base_name("SH010")
                    .extension("ma")
                    .created_by(studio.user.clone()),
            )
            .unwrap();
        assert_eq!(v1.path(), "TP/Sequences/SEQ010/Shots/SH010/ANIM");
        assert_eq!(v1.filename(), "SH010_MAIN_ANIM_v001_tu.ma");
        assert_eq!(
            studio.tracker.versionables(studio.project.id, Some(OwnerKind::Shot)).unwrap(),
            vec![shot]
        );
    }

    // ---- Test 15: extra folders render per version ----
    #[test]
    fn extra_folders_rendered() {
        let studio = Studio::new();
        studio.tracker.create_sequence(&studio.project, "Seq 2", "SEQ2").unwrap();
        studio.tracker.create_sequence(&studio.project, "Seq 1", "SEQ1").unwrap();
        let mut definition = studio.model.definition();
        definition.extra_folders = vec![
            "{{project.code}}/Assets/{{asset.code}}/Textures".into(),
            "{% for seq in project.sequences %}{{project.code}}/Sequences/{{seq.code}}\n{% endfor %}".into(),
        ];
        studio.tracker.update_version_type(studio.model.id, definition).unwrap();
        let v1 = studio.version(&studio.hero);
        assert_eq!(
            studio.tracker.render_extra_folders(v1.id).unwrap(),
            vec![
                "TP/Assets/Hero/Textures".to_string(),
                "TP/Sequences/SEQ1".to_string(),
                "TP/Sequences/SEQ2".to_string(),
            ]
        );
    }

    // ---- Test 16: notes and config files ----
    #[test]
    fn note_is_stored() {
        let studio = Studio::new();
        let v1 = studio.version(&studio.hero);
        studio.tracker.set_note(v1.id, "fixed topology").unwrap();
        assert_eq!(studio.tracker.version(v1.id).unwrap().note(), "fixed topology");
    }

    #[test]
    fn tracker_from_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vtrack.toml");
        std::fs::write(
            &path,
            r#"
            default_take_name = "Main"
            status_list = [["NEW", "New"], ["OK", "Approved"]]
            "#,
        )
        .unwrap();
        let tracker = Tracker::with_config_file(InMemoryStore::new(), &path).unwrap();
        assert_eq!(tracker.config().default_take_name, "Main");
        assert_eq!(tracker.config().status_list.first().code(), "NEW");
    }
}
