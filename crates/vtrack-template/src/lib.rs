//! Template rendering for vtrack.
//!
//! Version types describe file names and storage locations as templates such
//! as
//!
//! ```text
//! {{project.code}}/Assets/{{asset.code}}/{{type.code}}
//! ```
//!
//! which are rendered against a context built from a version and its owner
//! chain. The language is a small Jinja subset:
//!
//! - `{{ expr }}` interpolation with dotted paths (`version.take_name`),
//!   string/integer literals and filters (`"%03d"|format(version.version_number)`)
//! - `{% if %}` / `{% elif %}` / `{% else %}` / `{% endif %}` with `not`,
//!   `and`, `or`, `==` and `!=`
//! - `{% for item in list %}` / `{% endfor %}` with a `loop` helper
//! - `{# comments #}`
//! - `-` trim markers (`{%-`, `-%}`) that swallow adjacent whitespace
//!
//! Templates are parsed once ([`Template::parse`]); syntax errors surface at
//! that point as [`TemplateError::Syntax`]. Rendering is pure: the same
//! template and context always produce the same string, and unknown variables
//! render as the empty string.
//!
//! ```
//! use serde_json::json;
//! use vtrack_template::Template;
//!
//! let tpl = Template::parse("{{version.base_name}}_v{{'%03d'|format(version.version_number)}}").unwrap();
//! let out = tpl.render(&json!({"version": {"base_name": "Hero", "version_number": 7}})).unwrap();
//! assert_eq!(out, "Hero_v007");
//! ```

pub mod ast;
pub mod error;
pub mod filters;
pub mod lexer;
pub mod parser;
pub mod render;
pub mod template;

pub use error::{TemplateError, TemplateResult};
pub use template::Template;
