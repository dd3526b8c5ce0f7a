//! Parsed template structure.

use std::fmt;

use serde_json::Value;

/// A node in a parsed template body.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    /// Literal text.
    Text(String),
    /// `{{ expr }}`
    Emit(Expr),
    /// `{% if %}` with any number of `elif` branches and an optional `else`.
    If {
        branches: Vec<(Expr, Vec<Node>)>,
        otherwise: Vec<Node>,
    },
    /// `{% for binding in iterable %}`
    For {
        binding: String,
        iterable: Expr,
        body: Vec<Node>,
    },
}

/// An expression inside markup.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Literal(Value),
    Path(Vec<PathSegment>),
    Filter {
        filter: Filter,
        input: Box<Expr>,
        args: Vec<Expr>,
    },
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Compare {
        op: CompareOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

/// One step of a dotted variable path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathSegment {
    /// `.name`
    Key(String),
    /// `.0`
    Index(usize),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
}

/// The built-in filters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Filter {
    /// printf-style formatting: `"%03d"|format(n)`.
    Format,
    Lower,
    Upper,
    /// Substitute a fallback for null or empty input.
    Default,
    Replace,
    Join,
    Length,
}

impl Filter {
    /// Look up a filter by its template name.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "format" => Self::Format,
            "lower" => Self::Lower,
            "upper" => Self::Upper,
            "default" => Self::Default,
            "replace" => Self::Replace,
            "join" => Self::Join,
            "length" => Self::Length,
            _ => return None,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Format => "format",
            Self::Lower => "lower",
            Self::Upper => "upper",
            Self::Default => "default",
            Self::Replace => "replace",
            Self::Join => "join",
            Self::Length => "length",
        }
    }

    /// Accepted argument counts as an inclusive `(min, max)` pair.
    pub fn arity(&self) -> (usize, usize) {
        match self {
            Self::Format => (0, usize::MAX),
            Self::Lower | Self::Upper | Self::Length => (0, 0),
            Self::Default => (1, 1),
            Self::Replace => (2, 2),
            Self::Join => (0, 1),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
