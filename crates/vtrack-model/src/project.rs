//! Projects and sequences: the top of every owner chain.

use serde::{Deserialize, Serialize};

use vtrack_types::{ProjectId, SequenceId};

use crate::error::ModelResult;
use crate::validate;

/// A production project.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    /// Conditioned display name.
    pub name: String,
    /// Conditioned code, unique across projects.
    pub code: String,
    pub description: String,
}

impl Project {
    /// Create a project, conditioning its name and code.
    pub fn new(name: &str, code: &str) -> ModelResult<Self> {
        Ok(Self {
            id: ProjectId::new(),
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

/// A sequence of shots inside a project.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequence {
    pub id: SequenceId,
    pub project: ProjectId,
    pub name: String,
    /// Conditioned code, unique inside the project.
    pub code: String,
}

impl Sequence {
    pub fn new(project: &Project, name: &str, code: &str) -> ModelResult<Self> {
        Ok(Self {
            id: SequenceId::new(),
            project: project.id,
            name: validate::name("name", name)?,
            code: validate::code("code", code)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ModelError, ValidationError};

    #[test]
    fn project_fields_are_conditioned() {
        let project = Project::new("test project", "test project").unwrap();
        assert_eq!(project.name, "Test project");
        assert_eq!(project.code, "Test_Project");
    }

    #[test]
    fn project_rejects_unusable_code() {
        let err = Project::new("Test", "???").unwrap_err();
        assert!(matches!(
            err,
            ModelError::Validation(ValidationError::InvalidValue { ref field, .. }) if field == "code"
        ));
    }

    #[test]
    fn sequence_belongs_to_project() {
        let project = Project::new("Test", "TST").unwrap();
        let sequence = Sequence::new(&project, "test sequence", "test sequence").unwrap();
        assert_eq!(sequence.project, project.id);
        assert_eq!(sequence.code, "Test_Sequence");
    }
}
