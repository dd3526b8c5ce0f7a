//! Owners of versions: Assets and Shots.

use serde::{Deserialize, Serialize};

use vtrack_types::{OwnerKind, ProjectId, SequenceId, VersionableId};

use crate::error::{ModelResult, ValidationError};
use crate::project::{Project, Sequence};
use crate::validate;

/// An Asset or a Shot: an entity that accumulates versions.
///
/// `name` and `code` are unique inside the project for the same kind; the
/// store enforces that.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Versionable {
    pub id: VersionableId,
    pub project: ProjectId,
    pub kind: OwnerKind,
    /// Set for shots only.
    pub sequence: Option<SequenceId>,
    pub name: String,
    pub code: String,
    pub description: String,
}

impl Versionable {
    /// Create an asset in a project.
    pub fn asset(project: &Project, name: &str, code: &str) -> ModelResult<Self> {
        Self::new(OwnerKind::Asset, project, None, name, code)
    }

    /// Create a shot in a sequence.
    pub fn shot(
        project: &Project,
        sequence: &Sequence,
        name: &str,
        code: &str,
    ) -> ModelResult<Self> {
        Self::new(OwnerKind::Shot, project, Some(sequence), name, code)
    }

    /// Create an owner of the given kind.
    ///
    /// Shots need a sequence belonging to the same project; assets must not
    /// have one.
    pub fn new(
        kind: OwnerKind,
        project: &Project,
        sequence: Option<&Sequence>,
        name: &str,
        code: &str,
    ) -> ModelResult<Self> {
        let sequence = match (kind, sequence) {
            (OwnerKind::Shot, None) => return Err(ValidationError::missing("sequence").into()),
            (OwnerKind::Shot, Some(sequence)) if sequence.project != project.id => {
                return Err(ValidationError::invalid(
                    "sequence",
                    format!("sequence {:?} belongs to another project", sequence.code),
                )
                .into());
            }
            (OwnerKind::Shot, Some(sequence)) => Some(sequence.id),
            (OwnerKind::Asset, Some(_)) => {
                return Err(ValidationError::invalid(
                    "sequence",
                    "assets do not belong to sequences",
                )
                .into());
            }
            (OwnerKind::Asset, None) => None,
        };

        Ok(Self {
            id: VersionableId::new(),
            project: project.id,
            kind,
            sequence,
            name: validate::name("name", name)?,
            code: validate::code("code", code)?,
            description: String::new(),
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelError;

    fn project() -> Project {
        Project::new("Test Project", "TP").unwrap()
    }

    #[test]
    fn asset_has_no_sequence() {
        let asset = Versionable::asset(&project(), "hero character", "hero").unwrap();
        assert_eq!(asset.kind, OwnerKind::Asset);
        assert!(asset.sequence.is_none());
        assert_eq!(asset.name, "Hero character");
        assert_eq!(asset.code, "Hero");
    }

    #[test]
    fn shot_links_sequence() {
        let project = project();
        let sequence = Sequence::new(&project, "Seq1", "SEQ1").unwrap();
        let shot = Versionable::shot(&project, &sequence, "Shot 10", "SH010").unwrap();
        assert_eq!(shot.kind, OwnerKind::Shot);
        assert_eq!(shot.sequence, Some(sequence.id));
        assert_eq!(shot.code, "SH010");
    }

    #[test]
    fn shot_without_sequence_is_missing_field() {
        let err = Versionable::new(OwnerKind::Shot, &project(), None, "S", "S").unwrap_err();
        assert!(matches!(
            err,
            ModelError::Validation(ValidationError::MissingRequiredField { ref field }) if field == "sequence"
        ));
    }

    #[test]
    fn shot_with_foreign_sequence_rejected() {
        let other = Project::new("Other", "OTH").unwrap();
        let sequence = Sequence::new(&other, "Seq", "SEQ").unwrap();
        assert!(Versionable::shot(&project(), &sequence, "S", "S").is_err());
    }

    #[test]
    fn asset_with_sequence_rejected() {
        let project = project();
        let sequence = Sequence::new(&project, "Seq", "SEQ").unwrap();
        assert!(Versionable::new(OwnerKind::Asset, &project, Some(&sequence), "A", "A").is_err());
    }

    #[test]
    fn empty_name_after_normalization_rejected() {
        assert!(Versionable::asset(&project(), "%%%", "hero").is_err());
    }
}
