use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// The kind of entity that owns versions.
///
/// Version types declare which kind they apply to, and a version can only be
/// created for an owner of the matching kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OwnerKind {
    /// A reusable asset (character, prop, environment).
    Asset,
    /// A shot inside a sequence.
    Shot,
}

impl OwnerKind {
    /// Every owner kind, in declaration order.
    pub const ALL: [OwnerKind; 2] = [OwnerKind::Asset, OwnerKind::Shot];

    /// The canonical name, also used as the template context key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asset => "Asset",
            Self::Shot => "Shot",
        }
    }

    /// Lowercase key under which the owner appears in a render context.
    pub fn context_key(&self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Shot => "shot",
        }
    }
}

impl fmt::Display for OwnerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OwnerKind {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Asset" => Ok(Self::Asset),
            "Shot" => Ok(Self::Shot),
            other => Err(TypeError::UnknownOwnerKind(other.to_string())),
        }
    }
}
