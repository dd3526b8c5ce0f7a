use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

use crate::ast::Node;
use crate::error::{TemplateError, TemplateResult};
use crate::{parser, render};

/// A parsed template.
///
/// Holding a `Template` guarantees the source is syntactically valid. It
/// serializes as its source string and re-parses on deserialization.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Template {
    source: String,
    nodes: Vec<Node>,
}

impl Template {
    /// Parse template source.
    pub fn parse(source: impl Into<String>) -> TemplateResult<Self> {
        let source = source.into();
        let nodes = parser::parse(&source)?;
        Ok(Self { source, nodes })
    }

    /// Render against a context. Unknown variables render as empty strings.
    pub fn render(&self, context: &Value) -> TemplateResult<String> {
        let out = render::render_nodes(&self.nodes, context)?;
        trace!(template = %self.source, rendered = %out, "rendered template");
        Ok(out)
    }

    /// The original source text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns `true` if the source is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.source.trim().is_empty()
    }
}

impl PartialEq for Template {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Template {}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Template").field(&self.source).finish()
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl TryFrom<String> for Template {
    type Error = TemplateError;

    fn try_from(source: String) -> Result<Self, Self::Error> {
        Self::parse(source)
    }
}

impl From<Template> for String {
    fn from(template: Template) -> Self {
        template.source
    }
}
