//! Version statuses.
//!
//! A status is one entry of an ordered, configured list. Each entry has a
//! short code (`"WIP"`) and a display name (`"Work In Progress"`); either
//! form is accepted as input, and [`Status`] always holds the canonical code.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult, ValidationError};

/// A canonical status code.
///
/// Obtained from [`StatusList::resolve`]. Equality compares codes only.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Status(String);

impl Status {
    /// The short code.
    pub fn code(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One configured status.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub code: String,
    pub name: String,
}

impl StatusEntry {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

/// The ordered list of allowed statuses.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<StatusEntry>", into = "Vec<StatusEntry>")]
pub struct StatusList {
    entries: Vec<StatusEntry>,
}

impl StatusList {
    /// Build a status list.
    ///
    /// The list must be non-empty, every code and name must be non-blank, and
    /// no code or name may appear twice (across both forms).
    pub fn new(entries: Vec<StatusEntry>) -> Result<Self, ValidationError> {
        if entries.is_empty() {
            return Err(ValidationError::invalid(
                "status_list",
                "at least one status is required",
            ));
        }

        let mut seen = HashSet::new();
        let mut cleaned = Vec::with_capacity(entries.len());
        for entry in entries {
            let code = entry.code.trim().to_string();
            let name = entry.name.trim().to_string();
            if code.is_empty() || name.is_empty() {
                return Err(ValidationError::invalid(
                    "status_list",
                    "status codes and names must not be empty",
                ));
            }
            // A code may equal its own display name.
            let forms = if code == name { vec![&code] } else { vec![&code, &name] };
            for form in forms {
                if !seen.insert(form.clone()) {
                    return Err(ValidationError::invalid(
                        "status_list",
                        format!("duplicate status {form:?}"),
                    ));
                }
            }
            cleaned.push(StatusEntry { code, name });
        }

        Ok(Self { entries: cleaned })
    }

    /// Resolve a code or display name to its canonical status.
    pub fn resolve(&self, value: &str) -> ModelResult<Status> {
        let value = value.trim();
        self.entries
            .iter()
            .find(|entry| entry.code == value || entry.name == value)
            .map(|entry| Status(entry.code.clone()))
            .ok_or_else(|| ModelError::InvalidStatus {
                value: value.to_string(),
                allowed: self.describe(),
            })
    }

    /// The first configured status, used when nothing else applies.
    pub fn first(&self) -> Status {
        Status(self.entries[0].code.clone())
    }

    /// Display name for a status, if it belongs to this list.
    pub fn display_name(&self, status: &Status) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.code == status.0)
            .map(|entry| entry.name.as_str())
    }

    /// Position of a status in the configured order.
    pub fn position(&self, status: &Status) -> Option<usize> {
        self.entries.iter().position(|entry| entry.code == status.0)
    }

    /// Returns `true` if `value` names `status` in either its short or long
    /// form.
    pub fn matches(&self, status: &Status, value: &str) -> bool {
        self.resolve(value).is_ok_and(|resolved| &resolved == status)
    }

    /// Returns `true` if the status is part of this list.
    pub fn contains(&self, status: &Status) -> bool {
        self.position(status).is_some()
    }

    pub fn entries(&self) -> &[StatusEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn describe(&self) -> String {
        self.entries
            .iter()
            .map(|entry| format!("{} ({})", entry.code, entry.name))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Default for StatusList {
    fn default() -> Self {
        Self {
            entries: vec![
                StatusEntry::new("WTS", "Waiting To Start"),
                StatusEntry::new("WIP", "Work In Progress"),
                StatusEntry::new("REV", "For Review"),
                StatusEntry::new("APP", "Approved"),
                StatusEntry::new("CMP", "Completed"),
            ],
        }
    }
}

impl TryFrom<Vec<StatusEntry>> for StatusList {
    type Error = ValidationError;

    fn try_from(entries: Vec<StatusEntry>) -> Result<Self, Self::Error> {
        Self::new(entries)
    }
}

impl From<StatusList> for Vec<StatusEntry> {
    fn from(list: StatusList) -> Self {
        list.entries
    }
}
