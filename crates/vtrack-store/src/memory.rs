//! In-memory store for tests and ephemeral use.
//!
//! [`InMemoryStore`] keeps every table in `HashMap`s behind a single
//! `RwLock`, so each trait call (cascading deletes included) is atomic.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use vtrack_model::{Project, Sequence, Version, VersionType, Versionable};
use vtrack_types::{OwnerKind, ProjectId, SequenceId, VersionId, VersionTypeId, VersionableId};

use crate::error::{StoreError, StoreResult};
use crate::filter::VersionFilter;
use crate::traits::{DeleteReport, VersionStore};

#[derive(Debug, Default)]
struct Tables {
    projects: HashMap<ProjectId, Project>,
    sequences: HashMap<SequenceId, Sequence>,
    versionables: HashMap<VersionableId, Versionable>,
    version_types: HashMap<VersionTypeId, VersionType>,
    versions: HashMap<VersionId, Version>,
}

impl Tables {
    /// Remove the given versions and every edge into them from the rest.
    fn purge_versions(&mut self, doomed: &[VersionId]) -> DeleteReport {
        let mut report = DeleteReport::default();
        for id in doomed {
            if self.versions.remove(id).is_some() {
                report.versions_deleted.push(*id);
            }
        }
        for survivor in self.versions.values_mut() {
            for id in &report.versions_deleted {
                if survivor.unlink_reference(id) {
                    report.edges_dropped += 1;
                }
            }
        }
        report
    }
}

/// An in-memory implementation of [`VersionStore`].
///
/// Data is lost when the store is dropped.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }
}

fn sorted_by<T, K: Ord>(mut items: Vec<T>, key: impl Fn(&T) -> K) -> Vec<T> {
    items.sort_by_key(key);
    items
}

impl VersionStore for InMemoryStore {
    fn save_project(&self, project: &Project) -> StoreResult<()> {
        let mut tables = self.write()?;
        if let Some(clash) = tables
            .projects
            .values()
            .find(|other| other.id != project.id && other.code == project.code)
        {
            return Err(StoreError::unique(
                "project(code)",
                format!("code {:?} is taken by project {}", project.code, clash.id),
            ));
        }
        tables.projects.insert(project.id, project.clone());
        Ok(())
    }

    fn get_project(&self, id: ProjectId) -> StoreResult<Option<Project>> {
        Ok(self.read()?.projects.get(&id).cloned())
    }

    fn list_projects(&self) -> StoreResult<Vec<Project>> {
        let projects = self.read()?.projects.values().cloned().collect();
        Ok(sorted_by(projects, |p: &Project| p.code.clone()))
    }

    fn save_sequence(&self, sequence: &Sequence) -> StoreResult<()> {
        let mut tables = self.write()?;
        if !tables.projects.contains_key(&sequence.project) {
            return Err(StoreError::DanglingParent {
                kind: "sequence",
                id: sequence.id.to_string(),
                parent: "project",
            });
        }
        if tables.sequences.values().any(|other| {
            other.id != sequence.id
                && other.project == sequence.project
                && other.code == sequence.code
        }) {
            return Err(StoreError::unique(
                "sequence(project, code)",
                format!("code {:?} already used in this project", sequence.code),
            ));
        }
        tables.sequences.insert(sequence.id, sequence.clone());
        Ok(())
    }

    fn get_sequence(&self, id: SequenceId) -> StoreResult<Option<Sequence>> {
        Ok(self.read()?.sequences.get(&id).cloned())
    }

    fn list_sequences(&self, project: ProjectId) -> StoreResult<Vec<Sequence>> {
        let sequences = self
            .read()?
            .sequences
            .values()
            .filter(|s| s.project == project)
            .cloned()
            .collect();
        Ok(sorted_by(sequences, |s: &Sequence| s.code.clone()))
    }

    fn save_versionable(&self, versionable: &Versionable) -> StoreResult<()> {
        let mut tables = self.write()?;
        let dangling = |parent| StoreError::DanglingParent {
            kind: "versionable",
            id: versionable.id.to_string(),
            parent,
        };
        if !tables.projects.contains_key(&versionable.project) {
            return Err(dangling("project"));
        }
        if let Some(sequence) = versionable.sequence {
            if !tables.sequences.contains_key(&sequence) {
                return Err(dangling("sequence"));
            }
        }

        for other in tables.versionables.values() {
            if other.id == versionable.id
                || other.project != versionable.project
                || other.kind != versionable.kind
            {
                continue;
            }
            if other.name == versionable.name {
                return Err(StoreError::unique(
                    "versionable(project, kind, name)",
                    format!(
                        "{} name {:?} already used in this project",
                        versionable.kind, versionable.name
                    ),
                ));
            }
            if other.code == versionable.code {
                return Err(StoreError::unique(
                    "versionable(project, kind, code)",
                    format!(
                        "{} code {:?} already used in this project",
                        versionable.kind, versionable.code
                    ),
                ));
            }
        }
        tables.versionables.insert(versionable.id, versionable.clone());
        Ok(())
    }

    fn get_versionable(&self, id: VersionableId) -> StoreResult<Option<Versionable>> {
        Ok(self.read()?.versionables.get(&id).cloned())
    }

    fn list_versionables(
        &self,
        project: ProjectId,
        kind: Option<OwnerKind>,
    ) -> StoreResult<Vec<Versionable>> {
        let owners = self
            .read()?
            .versionables
            .values()
            .filter(|v| v.project == project && kind.map_or(true, |kind| v.kind == kind))
            .cloned()
            .collect();
        Ok(sorted_by(owners, |v: &Versionable| v.code.clone()))
    }

    fn save_version_type(&self, version_type: &VersionType) -> StoreResult<()> {
        let mut tables = self.write()?;
        for other in tables.version_types.values() {
            if other.id == version_type.id {
                continue;
            }
            if other.name() == version_type.name() {
                return Err(StoreError::unique(
                    "version_type(name)",
                    format!("name {:?} is taken", version_type.name()),
                ));
            }
            if other.code() == version_type.code() {
                return Err(StoreError::unique(
                    "version_type(code)",
                    format!("code {:?} is taken", version_type.code()),
                ));
            }
        }
        tables.version_types.insert(version_type.id, version_type.clone());
        Ok(())
    }

    fn get_version_type(&self, id: VersionTypeId) -> StoreResult<Option<VersionType>> {
        Ok(self.read()?.version_types.get(&id).cloned())
    }

    fn find_version_type(&self, code: &str) -> StoreResult<Option<VersionType>> {
        Ok(self
            .read()?
            .version_types
            .values()
            .find(|vt| vt.code() == code)
            .cloned())
    }

    fn list_version_types(&self) -> StoreResult<Vec<VersionType>> {
        let types = self.read()?.version_types.values().cloned().collect();
        Ok(sorted_by(types, |vt: &VersionType| vt.code().to_string()))
    }

    fn save_version(&self, version: &Version) -> StoreResult<()> {
        let mut tables = self.write()?;
        let dangling = |parent| StoreError::DanglingParent {
            kind: "version",
            id: version.id.to_string(),
            parent,
        };
        if !tables.versionables.contains_key(&version.versionable()) {
            return Err(dangling("versionable"));
        }
        if !tables.version_types.contains_key(&version.version_type()) {
            return Err(dangling("version type"));
        }

        if let Some(clash) = tables.versions.values().find(|other| {
            other.id != version.id
                && other.is_sibling_of(version)
                && other.version_number() == version.version_number()
        }) {
            return Err(StoreError::unique(
                "version(versionable, version_type, take_name, version_number)",
                format!(
                    "take {:?} already has version {} ({})",
                    version.take_name(),
                    version.version_number(),
                    clash.id
                ),
            ));
        }
        tables.versions.insert(version.id, version.clone());
        Ok(())
    }

    fn get_version(&self, id: VersionId) -> StoreResult<Option<Version>> {
        Ok(self.read()?.versions.get(&id).cloned())
    }

    fn query_versions(&self, filter: &VersionFilter) -> StoreResult<Vec<Version>> {
        let versions = self
            .read()?
            .versions
            .values()
            .filter(|v| filter.matches(v))
            .cloned()
            .collect();
        Ok(sorted_by(versions, |v: &Version| (v.version_number(), v.id)))
    }

    fn delete_version(&self, id: VersionId) -> StoreResult<DeleteReport> {
        let mut tables = self.write()?;
        if !tables.versions.contains_key(&id) {
            return Err(StoreError::not_found("version", id));
        }
        let report = tables.purge_versions(&[id]);
        debug!(version = %id, edges_dropped = report.edges_dropped, "deleted version");
        Ok(report)
    }

    fn delete_versionable(&self, id: VersionableId) -> StoreResult<DeleteReport> {
        let mut tables = self.write()?;
        if tables.versionables.remove(&id).is_none() {
            return Err(StoreError::not_found("versionable", id));
        }
        let doomed: Vec<VersionId> = tables
            .versions
            .values()
            .filter(|v| v.versionable() == id)
            .map(|v| v.id)
            .collect();
        let report = tables.purge_versions(&doomed);
        debug!(
            versionable = %id,
            versions_deleted = report.versions_deleted.len(),
            edges_dropped = report.edges_dropped,
            "deleted versionable with its versions"
        );
        Ok(report)
    }
}
