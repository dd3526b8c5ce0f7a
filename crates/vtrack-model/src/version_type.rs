//! Version types: reusable naming and location profiles.
//!
//! A [`VersionType`] describes how every version of one class of work
//! (modeling, animation, compositing, ...) is named and where it lives. Its
//! templates are parsed when the type is created, so a malformed template is
//! reported once, up front, instead of on every render.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use vtrack_template::Template;
use vtrack_types::{OwnerKind, VersionTypeId};

use crate::error::{ModelError, ModelResult, ValidationError};
use crate::project::{Project, Sequence};
use crate::status::StatusList;
use crate::validate;
use crate::version::Version;
use crate::versionable::Versionable;

/// Unvalidated description of a version type, as found in configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionTypeDefinition {
    pub name: String,
    pub code: String,
    pub filename: String,
    pub path: String,
    pub output_path: String,
    #[serde(default)]
    pub extra_folders: Vec<String>,
    #[serde(default)]
    pub environments: Vec<String>,
    pub owner_kind: OwnerKind,
}

/// A validated version type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionType {
    pub id: VersionTypeId,
    name: String,
    code: String,
    filename_template: Template,
    path_template: Template,
    output_path_template: Template,
    extra_folder_templates: Vec<Template>,
    applicable_environments: BTreeSet<String>,
    owner_kind: OwnerKind,
}

/// The three rendered locations of a version.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedPaths {
    pub filename: String,
    pub path: String,
    pub output_path: String,
}

/// The owner chain a version is rendered against.
#[derive(Clone, Copy, Debug)]
pub struct OwnerChain<'a> {
    pub project: &'a Project,
    /// All sequences of the project, exposed as `project.sequences`.
    pub sequences: &'a [Sequence],
    /// The shot's sequence; `None` for assets.
    pub sequence: Option<&'a Sequence>,
    pub owner: &'a Versionable,
}

impl VersionType {
    /// Validate a definition and parse its templates.
    pub fn new(definition: VersionTypeDefinition) -> ModelResult<Self> {
        let name = validate::text("name", &definition.name)?;
        let code = validate::text("code", &definition.code)?;
        if code.chars().any(char::is_whitespace) {
            return Err(ValidationError::invalid("code", "must not contain whitespace").into());
        }

        let filename_template = required_template("filename_template", &definition.filename)?;
        let path_template = required_template("path_template", &definition.path)?;
        let output_path_template =
            required_template("output_path_template", &definition.output_path)?;

        let extra_folder_templates = definition
            .extra_folders
            .iter()
            .enumerate()
            .map(|(index, source)| {
                parse_template(&format!("extra_folder_templates[{index}]"), source)
            })
            .collect::<ModelResult<Vec<_>>>()?;

        let mut applicable_environments = BTreeSet::new();
        for environment in &definition.environments {
            applicable_environments.insert(validate::text("applicable_environments", environment)?);
        }

        Ok(Self {
            id: VersionTypeId::new(),
            name,
            code,
            filename_template,
            path_template,
            output_path_template,
            extra_folder_templates,
            applicable_environments,
            owner_kind: definition.owner_kind,
        })
    }

    /// Replace the templates and environments with those of `definition`,
    /// keeping the identity. Name and code are replaced too.
    ///
    /// Versions that were already rendered keep their stored paths.
    pub fn redefine(&self, definition: VersionTypeDefinition) -> ModelResult<Self> {
        if definition.owner_kind != self.owner_kind {
            return Err(ValidationError::invalid(
                "owner_kind",
                "the owner kind of an existing version type cannot change",
            )
            .into());
        }
        let mut redefined = Self::new(definition)?;
        redefined.id = self.id;
        Ok(redefined)
    }

    /// The definition this type was built from.
    pub fn definition(&self) -> VersionTypeDefinition {
        VersionTypeDefinition {
            name: self.name.clone(),
            code: self.code.clone(),
            filename: self.filename_template.source().to_string(),
            path: self.path_template.source().to_string(),
            output_path: self.output_path_template.source().to_string(),
            extra_folders: self
                .extra_folder_templates
                .iter()
                .map(|t| t.source().to_string())
                .collect(),
            environments: self.applicable_environments.iter().cloned().collect(),
            owner_kind: self.owner_kind,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn owner_kind(&self) -> OwnerKind {
        self.owner_kind
    }

    pub fn filename_template(&self) -> &Template {
        &self.filename_template
    }

    pub fn path_template(&self) -> &Template {
        &self.path_template
    }

    pub fn output_path_template(&self) -> &Template {
        &self.output_path_template
    }

    pub fn extra_folder_templates(&self) -> &[Template] {
        &self.extra_folder_templates
    }

    pub fn applicable_environments(&self) -> &BTreeSet<String> {
        &self.applicable_environments
    }

    /// Returns `true` if the type is usable from the given environment.
    pub fn applies_to_environment(&self, environment: &str) -> bool {
        self.applicable_environments.contains(environment)
    }

    /// Fail with [`ModelError::IncompatibleType`] unless this type applies
    /// to `owner`.
    pub fn ensure_compatible(&self, owner: &Versionable) -> ModelResult<()> {
        if owner.kind == self.owner_kind {
            Ok(())
        } else {
            Err(ModelError::IncompatibleType {
                version_type: self.code.clone(),
                expected: self.owner_kind,
                actual: owner.kind,
            })
        }
    }

    /// Render the file name, path and output path of a version.
    ///
    /// Templates render in that order, each one seeing the results before
    /// it: `version.filename` is available to `path`, and both are available
    /// to `output_path`. Locations already stored on `version` are never
    /// read, so re-rendering an unchanged version reproduces its paths.
    ///
    /// Pure: nothing is stored, the caller assigns the result.
    pub fn render(
        &self,
        chain: &OwnerChain<'_>,
        version: &Version,
        statuses: &StatusList,
    ) -> ModelResult<RenderedPaths> {
        let mut context = self.context(chain, version, statuses)?;
        self.render_locations(&mut context)
    }

    /// Render the extra folder templates into a flat folder list.
    ///
    /// The version's locations are rendered first so the folders may refer
    /// to them. Each template may produce several folders, one per line
    /// (typically from a `{% for %}` loop). Lines are trimmed and blank lines
    /// dropped.
    pub fn render_extra_folders(
        &self,
        chain: &OwnerChain<'_>,
        version: &Version,
        statuses: &StatusList,
    ) -> ModelResult<Vec<String>> {
        let mut context = self.context(chain, version, statuses)?;
        self.render_locations(&mut context)?;
        let mut folders = Vec::new();
        for (index, template) in self.extra_folder_templates.iter().enumerate() {
            let field = format!("extra_folder_templates[{index}]");
            let rendered = render_field(&field, template, &context)?;
            folders.extend(
                rendered
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(str::to_string),
            );
        }
        Ok(folders)
    }

    /// Build the template context for a version and its owner chain.
    ///
    /// Keys: `project` (with `sequences`), `sequence`, `asset` or `shot`,
    /// `versionable`, `type`, `version` (with `status_name`). The version's
    /// `filename`, `path` and `output_path` start out empty.
    pub fn context(
        &self,
        chain: &OwnerChain<'_>,
        version: &Version,
        statuses: &StatusList,
    ) -> ModelResult<Value> {
        let mut project = to_value(chain.project)?;
        project["sequences"] = to_value(chain.sequences)?;

        let owner = to_value(chain.owner)?;

        let mut version_value = to_value(version)?;
        version_value["status_name"] = match statuses.display_name(version.status()) {
            Some(name) => Value::String(name.to_string()),
            None => Value::Null,
        };
        for key in LOCATION_KEYS {
            version_value[key] = Value::String(String::new());
        }

        let sequence = match chain.sequence {
            Some(sequence) => to_value(sequence)?,
            None => Value::Null,
        };

        let mut context = json!({
            "project": project,
            "sequence": sequence,
            "versionable": owner.clone(),
            "type": {
                "name": self.name,
                "code": self.code,
                "owner_kind": self.owner_kind.as_str(),
                "environments": self.applicable_environments,
            },
            "version": version_value,
        });
        context[chain.owner.kind.context_key()] = owner;
        Ok(context)
    }

    /// Render the three locations in order, publishing each into
    /// `context["version"]` before the next one renders.
    fn render_locations(&self, context: &mut Value) -> ModelResult<RenderedPaths> {
        let filename = render_field("filename_template", &self.filename_template, context)?;
        context["version"]["filename"] = Value::String(filename.clone());
        let path = render_field("path_template", &self.path_template, context)?;
        context["version"]["path"] = Value::String(path.clone());
        let output_path =
            render_field("output_path_template", &self.output_path_template, context)?;
        context["version"]["output_path"] = Value::String(output_path.clone());
        Ok(RenderedPaths {
            filename,
            path,
            output_path,
        })
    }
}

/// Context keys of the rendered locations.
const LOCATION_KEYS: [&str; 3] = ["filename", "path", "output_path"];

fn parse_template(field: &str, source: &str) -> ModelResult<Template> {
    Template::parse(source).map_err(|source| ModelError::TemplateSyntax {
        field: field.to_string(),
        source,
    })
}

fn required_template(field: &str, source: &str) -> ModelResult<Template> {
    if source.trim().is_empty() {
        return Err(ValidationError::invalid(field, "must not be empty").into());
    }
    parse_template(field, source)
}

fn render_field(field: &str, template: &Template, context: &Value) -> ModelResult<String> {
    template.render(context).map_err(|source| ModelError::Render {
        field: field.to_string(),
        source,
    })
}

fn to_value<T: Serialize + ?Sized>(value: &T) -> ModelResult<Value> {
    serde_json::to_value(value).map_err(|e| ModelError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrackerConfig;
    use crate::version::VersionDraft;
    use vtrack_template::TemplateError;
    use vtrack_types::User;

    const FILENAME: &str = "{{version.base_name}}_{{version.take_name}}_{{type.code}}_v{{'%03d'|format(version.version_number)}}_{{version.created_by.initials}}{{version.extension}}";

    fn definition(owner_kind: OwnerKind) -> VersionTypeDefinition {
        VersionTypeDefinition {
            name: "Model".into(),
            code: "MODEL".into(),
            filename: FILENAME.into(),
            path: "Assets/{{asset.code}}/{{type.code}}".into(),
            output_path: "Assets/{{asset.code}}/{{type.code}}/Outputs".into(),
            extra_folders: vec![],
            environments: vec!["Maya".into(), "Houdini".into()],
            owner_kind,
        }
    }

    struct Fixture {
        project: Project,
        sequences: Vec<Sequence>,
        owner: Versionable,
        version_type: VersionType,
        version: Version,
        statuses: StatusList,
    }

    impl Fixture {
        fn new(def: VersionTypeDefinition) -> Self {
            let project = Project::new("Test Project", "TP").unwrap();
            let sequences = vec![
                Sequence::new(&project, "Seq 1", "SEQ1").unwrap(),
                Sequence::new(&project, "Seq 2", "SEQ2").unwrap(),
            ];
            let owner = Versionable::asset(&project, "Hero", "Hero").unwrap();
            let version_type = VersionType::new(def).unwrap();
            let config = TrackerConfig::default();
            let statuses = config.status_list.clone();
            let draft = VersionDraft::new()
                .owner(owner.id)
                .version_type(version_type.id)
                .base_name("hero")
                .extension("ma")
                .created_by(User::new("Test User"));
            let version = draft
                .validate(&owner, &version_type, &config)
                .unwrap()
                .into_version(3, statuses.first());
            Self {
                project,
                sequences,
                owner,
                version_type,
                version,
                statuses,
            }
        }

        fn chain(&self) -> OwnerChain<'_> {
            OwnerChain {
                project: &self.project,
                sequences: &self.sequences,
                sequence: None,
                owner: &self.owner,
            }
        }
    }

    #[test]
    fn renders_all_three_locations() {
        let fx = Fixture::new(definition(OwnerKind::Asset));
        let paths = fx.version_type.render(&fx.chain(), &fx.version, &fx.statuses).unwrap();
        assert_eq!(paths.filename, "Hero_MAIN_MODEL_v003_tu.ma");
        assert_eq!(paths.path, "Assets/Hero/MODEL");
        assert_eq!(paths.output_path, "Assets/Hero/MODEL/Outputs");
    }

    #[test]
    fn rendering_is_deterministic() {
        let fx = Fixture::new(definition(OwnerKind::Asset));
        let first = fx.version_type.render(&fx.chain(), &fx.version, &fx.statuses).unwrap();
        let second = fx.version_type.render(&fx.chain(), &fx.version, &fx.statuses).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn output_path_sees_freshly_rendered_path() {
        let mut def = definition(OwnerKind::Asset);
        def.output_path = "{{version.path}}/Outputs".into();
        def.path = "Assets/{{asset.code}}/{{version.filename|length}}".into();
        let fx = Fixture::new(def);
        let paths = fx.version_type.render(&fx.chain(), &fx.version, &fx.statuses).unwrap();
        assert_eq!(paths.path, "Assets/Hero/26");
        assert_eq!(paths.output_path, "Assets/Hero/26/Outputs");
    }

    #[test]
    fn stored_locations_do_not_leak_into_render() {
        let mut def = definition(OwnerKind::Asset);
        def.output_path = "{{version.path}}/Outputs".into();
        def.filename = "{{version.output_path}}{{version.base_name}}{{version.extension}}".into();
        let mut fx = Fixture::new(def);
        let fresh = fx.version_type.render(&fx.chain(), &fx.version, &fx.statuses).unwrap();
        assert_eq!(fresh.filename, "Hero.ma");

        let chain = OwnerChain {
            project: &fx.project,
            sequences: &fx.sequences,
            sequence: None,
            owner: &fx.owner,
        };
        fx.version.rerender(&fx.version_type, &chain, &fx.statuses).unwrap();
        let again = fx.version_type.render(&fx.chain(), &fx.version, &fx.statuses).unwrap();
        assert_eq!(again, fresh);
        assert_eq!(fx.version.output_path(), "Assets/Hero/MODEL/Outputs");
    }

    #[test]
    fn context_exposes_owner_under_kind_key() {
        let fx = Fixture::new(definition(OwnerKind::Asset));
        let ctx = fx.version_type.context(&fx.chain(), &fx.version, &fx.statuses).unwrap();
        assert_eq!(ctx["asset"]["code"], "Hero");
        assert_eq!(ctx["versionable"]["code"], "Hero");
        assert!(ctx["shot"].is_null());
        assert_eq!(ctx["version"]["status"], "WTS");
        assert_eq!(ctx["version"]["status_name"], "Waiting To Start");
        assert_eq!(ctx["project"]["sequences"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn extra_folders_split_lines() {
        let mut def = definition(OwnerKind::Asset);
        def.extra_folders = vec![
            "{% for seq in project.sequences %}\n{{project.code}}/Sequences/{{seq.code}}\n{% endfor %}".into(),
            "  Assets/{{asset.code}}/Textures  ".into(),
        ];
        let fx = Fixture::new(def);
        let folders = fx
            .version_type
            .render_extra_folders(&fx.chain(), &fx.version, &fx.statuses)
            .unwrap();
        assert_eq!(
            folders,
            vec![
                "TP/Sequences/SEQ1".to_string(),
                "TP/Sequences/SEQ2".to_string(),
                "Assets/Hero/Textures".to_string(),
            ]
        );
    }

    #[test]
    fn empty_templates_rejected() {
        for field in ["filename", "path", "output_path"] {
            let mut def = definition(OwnerKind::Asset);
            match field {
                "filename" => def.filename = "  ".into(),
                "path" => def.path.clear(),
                _ => def.output_path.clear(),
            }
            let err = VersionType::new(def).unwrap_err();
            assert!(
                matches!(err, ModelError::Validation(ValidationError::InvalidValue { .. })),
                "{field}: {err}"
            );
        }
    }

    #[test]
    fn malformed_template_is_syntax_error() {
        let mut def = definition(OwnerKind::Asset);
        def.path = "Assets/{% if asset.code %}{{asset.code}}".into();
        let err = VersionType::new(def).unwrap_err();
        assert!(matches!(
            err,
            ModelError::TemplateSyntax { ref field, source: TemplateError::Syntax { .. } } if field == "path_template"
        ));
    }

    #[test]
    fn malformed_extra_folder_reports_index() {
        let mut def = definition(OwnerKind::Asset);
        def.extra_folders = vec!["ok".into(), "{{ broken".into()];
        let err = VersionType::new(def).unwrap_err();
        assert!(matches!(err, ModelError::TemplateSyntax { ref field, .. } if field == "extra_folder_templates[1]"));
    }

    #[test]
    fn empty_name_and_code_rejected() {
        let mut def = definition(OwnerKind::Asset);
        def.name = "".into();
        assert!(VersionType::new(def).is_err());

        let mut def = definition(OwnerKind::Asset);
        def.code = "MO DEL".into();
        assert!(VersionType::new(def).is_err());
    }

    #[test]
    fn compatibility_check() {
        let fx = Fixture::new(definition(OwnerKind::Asset));
        assert!(fx.version_type.ensure_compatible(&fx.owner).is_ok());

        let shot_type = VersionType::new(definition(OwnerKind::Shot)).unwrap();
        let err = shot_type.ensure_compatible(&fx.owner).unwrap_err();
        assert!(matches!(
            err,
            ModelError::IncompatibleType { expected: OwnerKind::Shot, actual: OwnerKind::Asset, .. }
        ));
    }

    #[test]
    fn environments() {
        let vt = VersionType::new(definition(OwnerKind::Asset)).unwrap();
        assert!(vt.applies_to_environment("Maya"));
        assert!(!vt.applies_to_environment("Nuke"));
    }

    #[test]
    fn definition_roundtrip() {
        let def = definition(OwnerKind::Asset);
        let vt = VersionType::new(def.clone()).unwrap();
        let mut expected = def;
        expected.environments.sort();
        assert_eq!(vt.definition(), expected);
    }

    #[test]
    fn redefine_keeps_identity_and_kind() {
        let vt = VersionType::new(definition(OwnerKind::Asset)).unwrap();
        let mut def = definition(OwnerKind::Asset);
        def.path = "Library/{{asset.code}}".into();
        let redefined = vt.redefine(def).unwrap();
        assert_eq!(redefined.id, vt.id);
        assert_eq!(redefined.path_template().source(), "Library/{{asset.code}}");

        assert!(vt.redefine(definition(OwnerKind::Shot)).is_err());
    }
}
