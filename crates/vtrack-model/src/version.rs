//! Versions: numbered iterations of work on an Asset or Shot.
//!
//! Construction is split in two steps. A [`VersionDraft`] collects caller
//! input and is validated against the owner, the version type and the
//! configuration into a [`ValidatedDraft`]. The tracker then allocates a
//! number and a status (both depend on sibling versions in the store) and
//! turns the validated draft into a [`Version`].
//!
//! Owner, type, take and number are fixed once a `Version` exists; there are
//! no setters for them.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use vtrack_graph::CheckedEdge;
use vtrack_naming::condition_extension;
use vtrack_types::{User, VersionId, VersionTypeId, VersionableId};

use crate::config::TrackerConfig;
use crate::error::{ModelResult, ValidationError};
use crate::status::{Status, StatusList};
use crate::validate;
use crate::version_type::{OwnerChain, VersionType};
use crate::versionable::Versionable;

/// The grouping versions are numbered within: same owner, same type, same
/// take.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SiblingKey {
    pub versionable: VersionableId,
    pub version_type: VersionTypeId,
    pub take_name: String,
}

/// Caller input for a new version. Nothing is checked until
/// [`VersionDraft::validate`].
#[derive(Clone, Debug, Default)]
pub struct VersionDraft {
    owner: Option<VersionableId>,
    version_type: Option<VersionTypeId>,
    base_name: Option<String>,
    take_name: Option<String>,
    version_number: Option<u32>,
    revision_number: u32,
    extension: String,
    note: String,
    created_by: Option<User>,
    status: Option<String>,
    is_published: bool,
}

impl VersionDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn owner(mut self, owner: VersionableId) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn version_type(mut self, version_type: VersionTypeId) -> Self {
        self.version_type = Some(version_type);
        self
    }

    pub fn base_name(mut self, base_name: impl Into<String>) -> Self {
        self.base_name = Some(base_name.into());
        self
    }

    /// Take name; defaults to the configured take (usually `"MAIN"`).
    pub fn take_name(mut self, take_name: impl Into<String>) -> Self {
        self.take_name = Some(take_name.into());
        self
    }

    /// Requested number. Replaced by `max + 1` unless it is greater than
    /// every existing sibling number.
    pub fn version_number(mut self, version_number: u32) -> Self {
        self.version_number = Some(version_number);
        self
    }

    pub fn revision_number(mut self, revision_number: u32) -> Self {
        self.revision_number = revision_number;
        self
    }

    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    pub fn created_by(mut self, user: User) -> Self {
        self.created_by = Some(user);
        self
    }

    /// Status code or display name. Inherited from the latest sibling when
    /// omitted.
    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn published(mut self, is_published: bool) -> Self {
        self.is_published = is_published;
        self
    }

    /// The owner id, or [`ValidationError::MissingRequiredField`].
    pub fn owner_id(&self) -> Result<VersionableId, ValidationError> {
        self.owner.ok_or_else(|| ValidationError::missing("versionable"))
    }

    /// The version type id, or [`ValidationError::MissingRequiredField`].
    pub fn version_type_id(&self) -> Result<VersionTypeId, ValidationError> {
        self.version_type.ok_or_else(|| ValidationError::missing("version_type"))
    }

    /// Check the draft against its resolved owner and type.
    ///
    /// Fails with `MissingRequiredField` for an absent owner, type, creator or
    /// base name; `InvalidValue` when a name conditions to nothing or an id
    /// does not match; `IncompatibleType` when the type is for another owner
    /// kind; `InvalidStatus` for an unknown status.
    pub fn validate(
        self,
        owner: &Versionable,
        version_type: &VersionType,
        config: &TrackerConfig,
    ) -> ModelResult<ValidatedDraft> {
        if self.owner_id()? != owner.id {
            return Err(
                ValidationError::invalid("versionable", "does not match the resolved owner").into(),
            );
        }
        if self.version_type_id()? != version_type.id {
            return Err(ValidationError::invalid(
                "version_type",
                "does not match the resolved version type",
            )
            .into());
        }
        version_type.ensure_compatible(owner)?;

        let created_by = self.created_by.ok_or_else(|| ValidationError::missing("created_by"))?;
        let base_name = match &self.base_name {
            Some(base_name) => validate::code("base_name", base_name)?,
            None => return Err(ValidationError::missing("base_name").into()),
        };
        let take_name = match self.take_name.as_deref().map(str::trim) {
            Some(take) if !take.is_empty() => validate::code("take_name", take)?,
            _ => config.default_take_name.clone(),
        };
        let status = self
            .status
            .as_deref()
            .map(|value| config.status_list.resolve(value))
            .transpose()?;

        Ok(ValidatedDraft {
            key: SiblingKey {
                versionable: owner.id,
                version_type: version_type.id,
                take_name,
            },
            base_name,
            requested_number: self.version_number,
            revision_number: self.revision_number,
            extension: condition_extension(&self.extension),
            note: self.note,
            created_by,
            status,
            is_published: self.is_published,
        })
    }
}

/// A draft that passed validation and waits for a number and a status.
#[derive(Clone, Debug)]
pub struct ValidatedDraft {
    key: SiblingKey,
    base_name: String,
    requested_number: Option<u32>,
    revision_number: u32,
    extension: String,
    note: String,
    created_by: User,
    status: Option<Status>,
    is_published: bool,
}

impl ValidatedDraft {
    pub fn sibling_key(&self) -> &SiblingKey {
        &self.key
    }

    pub fn requested_number(&self) -> Option<u32> {
        self.requested_number
    }

    /// The explicitly requested status, if any.
    pub fn requested_status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    /// Build the version. Rendered locations stay empty until
    /// [`Version::rerender`].
    pub fn into_version(self, version_number: u32, status: Status) -> Version {
        Version {
            id: VersionId::new(),
            versionable: self.key.versionable,
            version_type: self.key.version_type,
            base_name: self.base_name,
            take_name: self.key.take_name,
            revision_number: self.revision_number,
            version_number,
            extension: self.extension,
            note: self.note,
            created_by: self.created_by,
            is_published: self.is_published,
            status,
            filename: String::new(),
            path: String::new(),
            output_path: String::new(),
            references: BTreeSet::new(),
        }
    }
}

/// Allocate the number of a new version.
///
/// `max_existing` is the highest number among the siblings (0 when there are
/// none). A requested number is kept only if it is greater than that;
/// anything else becomes `max_existing + 1`.
pub fn allocate_version_number(requested: Option<u32>, max_existing: u32) -> u32 {
    match requested {
        Some(number) if number > max_existing => number,
        _ => max_existing.saturating_add(1),
    }
}

/// One numbered iteration of work.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    pub id: VersionId,
    versionable: VersionableId,
    version_type: VersionTypeId,
    base_name: String,
    take_name: String,
    revision_number: u32,
    version_number: u32,
    extension: String,
    note: String,
    created_by: User,
    is_published: bool,
    status: Status,
    filename: String,
    path: String,
    output_path: String,
    references: BTreeSet<VersionId>,
}

impl Version {
    pub fn versionable(&self) -> VersionableId {
        self.versionable
    }

    pub fn version_type(&self) -> VersionTypeId {
        self.version_type
    }

    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    pub fn take_name(&self) -> &str {
        &self.take_name
    }

    pub fn revision_number(&self) -> u32 {
        self.revision_number
    }

    pub fn version_number(&self) -> u32 {
        self.version_number
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn note(&self) -> &str {
        &self.note
    }

    pub fn created_by(&self) -> &User {
        &self.created_by
    }

    pub fn is_published(&self) -> bool {
        self.is_published
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn output_path(&self) -> &str {
        &self.output_path
    }

    /// `path` joined with `filename`.
    pub fn full_path(&self) -> String {
        let path = self.path.trim_end_matches('/');
        if path.is_empty() {
            self.filename.clone()
        } else {
            format!("{path}/{}", self.filename)
        }
    }

    /// Outgoing reference edges.
    pub fn references(&self) -> &BTreeSet<VersionId> {
        &self.references
    }

    pub fn sibling_key(&self) -> SiblingKey {
        SiblingKey {
            versionable: self.versionable,
            version_type: self.version_type,
            take_name: self.take_name.clone(),
        }
    }

    /// Returns `true` if both versions share owner, type and take.
    pub fn is_sibling_of(&self, other: &Version) -> bool {
        self.versionable == other.versionable
            && self.version_type == other.version_type
            && self.take_name == other.take_name
    }

    pub fn summary(&self) -> VersionSummary {
        VersionSummary {
            id: self.id,
            versionable: self.versionable,
            version_type: self.version_type,
            take_name: self.take_name.clone(),
            version_number: self.version_number,
            filename: self.filename.clone(),
        }
    }

    pub fn set_status(&mut self, status: Status) {
        self.status = status;
    }

    /// Condition and store a new extension, then re-render the file name
    /// and paths. On a render error the version is left unchanged.
    pub fn set_extension(
        &mut self,
        extension: &str,
        version_type: &VersionType,
        chain: &OwnerChain<'_>,
        statuses: &StatusList,
    ) -> ModelResult<()> {
        let previous = std::mem::replace(&mut self.extension, condition_extension(extension));
        if let Err(err) = self.rerender(version_type, chain, statuses) {
            self.extension = previous;
            return Err(err);
        }
        Ok(())
    }

    pub fn set_published(&mut self, is_published: bool) {
        self.is_published = is_published;
    }

    pub fn set_note(&mut self, note: impl Into<String>) {
        self.note = note.into();
    }

    /// Render the file name and paths from `version_type` and store them.
    ///
    /// `version_type` must be the version's own type.
    pub fn rerender(
        &mut self,
        version_type: &VersionType,
        chain: &OwnerChain<'_>,
        statuses: &StatusList,
    ) -> ModelResult<()> {
        if version_type.id != self.version_type {
            return Err(ValidationError::invalid(
                "version_type",
                format!("version is not of type {}", version_type.code()),
            )
            .into());
        }
        let rendered = version_type.render(chain, self, statuses)?;
        self.filename = rendered.filename;
        self.path = rendered.path;
        self.output_path = rendered.output_path;
        Ok(())
    }

    /// Record an outgoing edge checked against the reference graph. Returns
    /// `false` if the edge already existed.
    pub fn link_reference(&mut self, edge: CheckedEdge) -> ModelResult<bool> {
        if edge.referencer() != self.id {
            return Err(ValidationError::invalid(
                "references",
                "edge does not start at this version",
            )
            .into());
        }
        Ok(self.references.insert(edge.reference()))
    }

    /// Drop an outgoing edge. Returns `true` if it existed.
    pub fn unlink_reference(&mut self, target: &VersionId) -> bool {
        self.references.remove(target)
    }
}

/// Enough of a version to identify it in error messages.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionSummary {
    pub id: VersionId,
    pub versionable: VersionableId,
    pub version_type: VersionTypeId,
    pub take_name: String,
    pub version_number: u32,
    pub filename: String,
}

impl fmt::Display for VersionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.filename.is_empty() {
            write!(f, "{} v{:03} ({})", self.take_name, self.version_number, self.id.short_id())
        } else {
            f.write_str(&self.filename)
        }
    }
}
