//! Built-in filter implementations and value helpers shared with the
//! renderer.

use serde_json::Value;

use crate::ast::Filter;
use crate::error::{TemplateError, TemplateResult};

/// Render a value the way it appears in output.
///
/// Null renders as the empty string so that partially populated contexts
/// still produce output.
pub fn display(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Template truthiness: null, `false`, zero and empty containers are false.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Apply a filter to its input.
pub fn apply(filter: Filter, input: Value, args: &[Value]) -> TemplateResult<Value> {
    match filter {
        Filter::Format => {
            let Value::String(spec) = &input else {
                return Err(TemplateError::filter(
                    "format",
                    "input must be a format string",
                ));
            };
            printf(spec, args).map(Value::String)
        }
        Filter::Lower => Ok(Value::String(display(&input).to_lowercase())),
        Filter::Upper => Ok(Value::String(display(&input).to_uppercase())),
        Filter::Default => {
            let fallback = argument("default", args, 0)?;
            let empty = match &input {
                Value::Null => true,
                Value::String(s) => s.is_empty(),
                _ => false,
            };
            Ok(if empty { fallback.clone() } else { input })
        }
        Filter::Replace => {
            let from = display(argument("replace", args, 0)?);
            let to = display(argument("replace", args, 1)?);
            Ok(Value::String(display(&input).replace(&from, &to)))
        }
        Filter::Join => {
            let separator = args.first().map(display).unwrap_or_default();
            match input {
                Value::Array(items) => Ok(Value::String(
                    items.iter().map(display).collect::<Vec<_>>().join(&separator),
                )),
                other => Ok(Value::String(display(&other))),
            }
        }
        Filter::Length => {
            let len = match &input {
                Value::Null => 0,
                Value::String(s) => s.chars().count(),
                Value::Array(items) => items.len(),
                Value::Object(map) => map.len(),
                Value::Bool(_) | Value::Number(_) => {
                    return Err(TemplateError::filter("length", "value has no length"));
                }
            };
            Ok(Value::from(len))
        }
    }
}

/// Positional filter argument, or an error naming the filter.
fn argument<'a>(filter: &str, args: &'a [Value], index: usize) -> TemplateResult<&'a Value> {
    args.get(index)
        .ok_or_else(|| TemplateError::filter(filter, format!("missing argument {}", index + 1)))
}

/// printf-style formatting supporting `%s`, `%d`/`%i` with optional zero
/// padding and width, and `%%`.
fn printf(spec: &str, args: &[Value]) -> TemplateResult<String> {
    let mut out = String::with_capacity(spec.len());
    let mut args = args.iter();
    let mut chars = spec.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        if chars.next_if_eq(&'%').is_some() {
            out.push('%');
            continue;
        }

        let zero_pad = chars.next_if_eq(&'0').is_some();
        let mut width = 0usize;
        while let Some(digit) = chars.next_if(char::is_ascii_digit) {
            width = width
                .saturating_mul(10)
                .saturating_add(digit.to_digit(10).unwrap_or(0) as usize);
        }

        let conversion = chars
            .next()
            .ok_or_else(|| {
                TemplateError::filter("format", "incomplete conversion at end of format")
            })?;
        let arg = args
            .next()
            .ok_or_else(|| {
                TemplateError::filter("format", "not enough arguments for format string")
            })?;

        match conversion {
            'd' | 'i' => {
                let n = as_integer(arg).ok_or_else(|| {
                    TemplateError::filter(
                        "format",
                        format!("%{conversion} requires a number, got {arg}"),
                    )
                })?;
                if zero_pad {
                    out.push_str(&format!("{n:0width$}"));
                } else {
                    out.push_str(&format!("{n:>width$}"));
                }
            }
            's' => out.push_str(&format!("{:>width$}", display(arg))),
            other => {
                return Err(TemplateError::filter(
                    "format",
                    format!("unsupported conversion %{other}"),
                ));
            }
        }
    }

    if args.next().is_some() {
        return Err(TemplateError::filter(
            "format",
            "not all arguments converted during string formatting",
        ));
    }
    Ok(out)
}

fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}
