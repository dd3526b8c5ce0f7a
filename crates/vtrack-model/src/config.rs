//! Tracker configuration.
//!
//! A [`TrackerConfig`] is passed explicitly to everything that needs it.
//! It can be built in code, taken from [`Default`], or loaded from TOML:
//!
//! ```toml
//! default_take_name = "MAIN"
//! status_list = [["WTS", "Waiting To Start"], ["WIP", "Work In Progress"]]
//!
//! [[version_types]]
//! name = "Model"
//! code = "MODEL"
//! filename = "{{version.base_name}}_v{{'%03d'|format(version.version_number)}}{{version.extension}}"
//! path = "{{project.code}}/Assets/{{asset.code}}/{{type.code}}"
//! output_path = "{{version.path}}/Outputs"
//! environments = ["Maya"]
//! owner_kind = "Asset"
//! ```
//!
//! Every key is optional; missing top-level keys fall back to the defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};
use toml::{Table, Value};
use tracing::debug;

use vtrack_types::OwnerKind;

use crate::error::{ModelError, ModelResult, ValidationError};
use crate::status::{StatusEntry, StatusList};
use crate::validate;
use crate::version_type::VersionTypeDefinition;

const FILENAME: &str =
    "{{version.base_name}}_{{version.take_name}}_{{type.code}}_v{{'%03d'|format(version.version_number)}}_{{version.created_by.initials}}{{version.extension}}";
const ASSET_PATH: &str = "{{project.code}}/Assets/{{asset.code}}/{{type.code}}";
const SHOT_PATH: &str =
    "{{project.code}}/Sequences/{{sequence.code}}/Shots/{{shot.code}}/{{type.code}}";
/// Rendered after `path`, so it can build on it.
const OUTPUT_PATH: &str = "{{version.path}}/Outputs";

/// Settings shared by every tracker operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Take used when a version is created without one.
    pub default_take_name: String,
    /// Allowed statuses, in order. The first is the fallback for new versions.
    pub status_list: StatusList,
    /// Version types created by `bootstrap_version_types`.
    pub version_types: Vec<VersionTypeDefinition>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            default_take_name: "MAIN".to_string(),
            status_list: StatusList::default(),
            version_types: vec![
                definition("Model", "MODEL", OwnerKind::Asset, &["Maya", "Houdini"]),
                definition("Rig", "RIG", OwnerKind::Asset, &["Maya"]),
                definition("Texture", "TEXTURE", OwnerKind::Asset, &["Photoshop"]),
                definition("Animation", "ANIM", OwnerKind::Shot, &["Maya"]),
                definition("Lighting", "LIGHT", OwnerKind::Shot, &["Maya", "Houdini"]),
                definition("Comp", "COMP", OwnerKind::Shot, &["Nuke"]),
            ],
        }
    }
}

fn definition(
    name: &str,
    code: &str,
    owner_kind: OwnerKind,
    environments: &[&str],
) -> VersionTypeDefinition {
    let path = match owner_kind {
        OwnerKind::Asset => ASSET_PATH,
        OwnerKind::Shot => SHOT_PATH,
    };
    VersionTypeDefinition {
        name: name.to_string(),
        code: code.to_string(),
        filename: FILENAME.to_string(),
        path: path.to_string(),
        output_path: OUTPUT_PATH.to_string(),
        extra_folders: vec![],
        environments: environments.iter().map(|env| env.to_string()).collect(),
        owner_kind,
    }
}

impl TrackerConfig {
    /// Parse a TOML document.
    ///
    /// Values are checked key by key: a value of the wrong TOML type is a
    /// [`ValidationError::TypeMismatch`], a version type without a required
    /// key is a [`ValidationError::MissingRequiredField`], and an empty or
    /// duplicated status list is a [`ValidationError::InvalidValue`].
    pub fn from_toml_str(source: &str) -> ModelResult<Self> {
        let table: Table = source.parse()?;
        let mut config = Self::default();

        if let Some(value) = table.get("default_take_name") {
            let take = expect_str("default_take_name", value)?;
            config.default_take_name = validate::code("default_take_name", take)?;
        }
        if let Some(value) = table.get("status_list") {
            config.status_list = parse_status_list(value)?;
        }
        if let Some(value) = table.get("version_types") {
            let entries = expect_array("version_types", value)?;
            config.version_types = entries
                .iter()
                .enumerate()
                .map(|(index, entry)| parse_version_type(&format!("version_types[{index}]"), entry))
                .collect::<Result<Vec<_>, _>>()?;
        }

        for key in table.keys() {
            if !matches!(key.as_str(), "default_take_name" | "status_list" | "version_types") {
                debug!(key = %key, "ignoring unknown configuration key");
            }
        }
        Ok(config)
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> ModelResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&source)?;
        debug!(
            path = %path.display(),
            statuses = config.status_list.len(),
            version_types = config.version_types.len(),
            "loaded tracker configuration"
        );
        Ok(config)
    }

    /// Serialize to TOML. The output loads back with [`Self::from_toml_str`].
    pub fn to_toml_string(&self) -> ModelResult<String> {
        toml::to_string(self).map_err(|e| ModelError::Serialization(e.to_string()))
    }

    /// The bootstrap definition with the given code, if configured.
    pub fn version_type(&self, code: &str) -> Option<&VersionTypeDefinition> {
        self.version_types.iter().find(|def| def.code == code)
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::String(_) => "string",
        Value::Integer(_) => "integer",
        Value::Float(_) => "float",
        Value::Boolean(_) => "boolean",
        Value::Datetime(_) => "datetime",
        Value::Array(_) => "array",
        Value::Table(_) => "table",
    }
}

fn mismatch(field: &str, expected: &str, value: &Value) -> ValidationError {
    ValidationError::type_mismatch(field, format!("{expected}, found {}", type_name(value)))
}

fn expect_str<'a>(field: &str, value: &'a Value) -> Result<&'a str, ValidationError> {
    value.as_str().ok_or_else(|| mismatch(field, "string", value))
}

fn expect_array<'a>(field: &str, value: &'a Value) -> Result<&'a [Value], ValidationError> {
    value
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| mismatch(field, "array", value))
}

fn required<'a>(table: &'a Table, prefix: &str, key: &str) -> Result<&'a Value, ValidationError> {
    table
        .get(key)
        .ok_or_else(|| ValidationError::missing(format!("{prefix}.{key}")))
}

fn string_list(field: &str, value: &Value) -> Result<Vec<String>, ValidationError> {
    expect_array(field, value)?
        .iter()
        .enumerate()
        .map(|(index, item)| expect_str(&format!("{field}[{index}]"), item).map(str::to_string))
        .collect()
}

/// Entries are `["WIP", "Work In Progress"]` pairs or `{ code, name }` tables.
fn parse_status_list(value: &Value) -> Result<StatusList, ValidationError> {
    let mut entries = Vec::new();
    for (index, item) in expect_array("status_list", value)?.iter().enumerate() {
        let field = format!("status_list[{index}]");
        let entry = match item {
            Value::Array(pair) if pair.len() == 2 => StatusEntry::new(
                expect_str(&format!("{field}[0]"), &pair[0])?,
                expect_str(&format!("{field}[1]"), &pair[1])?,
            ),
            Value::Array(pair) => {
                return Err(ValidationError::invalid(
                    field,
                    format!("expected a [code, name] pair, found {} items", pair.len()),
                ));
            }
            Value::Table(table) => StatusEntry::new(
                expect_str(&format!("{field}.code"), required(table, &field, "code")?)?,
                expect_str(&format!("{field}.name"), required(table, &field, "name")?)?,
            ),
            other => return Err(mismatch(&field, "[code, name] pair or table", other)),
        };
        entries.push(entry);
    }
    StatusList::new(entries)
}

fn parse_version_type(
    field: &str,
    value: &Value,
) -> Result<VersionTypeDefinition, ValidationError> {
    let table = value.as_table().ok_or_else(|| mismatch(field, "table", value))?;
    let text = |key: &str| -> Result<String, ValidationError> {
        let value = required(table, field, key)?;
        expect_str(&format!("{field}.{key}"), value).map(str::to_string)
    };
    let list = |key: &str| -> Result<Vec<String>, ValidationError> {
        match table.get(key) {
            Some(value) => string_list(&format!("{field}.{key}"), value),
            None => Ok(Vec::new()),
        }
    };

    let name = text("name")?;
    let code = text("code")?;
    let filename = text("filename")?;
    let path = text("path")?;
    let output_path = text("output_path")?;
    let owner_kind = text("owner_kind")?
        .parse::<OwnerKind>()
        .map_err(|e| ValidationError::invalid(format!("{field}.owner_kind"), e.to_string()))?;

    Ok(VersionTypeDefinition {
        name,
        code,
        filename,
        path,
        output_path,
        extra_folders: list("extra_folders")?,
        environments: list("environments")?,
        owner_kind,
    })
}
