use std::fmt;

use serde::{Deserialize, Serialize};

/// The creator of a version.
///
/// Opaque to the tracker: it is stored and exposed to templates, never
/// interpreted.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    /// Display name, e.g. "Jane Doe".
    pub name: String,
    /// Short initials used in file names, e.g. "jd".
    pub initials: String,
    /// Optional contact address.
    pub email: Option<String>,
}

impl User {
    /// Create a user, deriving initials from the display name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let initials = name
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .flat_map(char::to_lowercase)
            .collect();
        Self {
            name,
            initials,
            email: None,
        }
    }

    /// Override the derived initials.
    pub fn with_initials(mut self, initials: impl Into<String>) -> Self {
        self.initials = initials.into();
        self
    }

    /// Attach an email address.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
