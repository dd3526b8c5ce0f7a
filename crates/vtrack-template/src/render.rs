//! Evaluating a node tree against a context.

use serde_json::{Map, Value};

use crate::ast::{CompareOp, Expr, Node, PathSegment};
use crate::error::TemplateResult;
use crate::filters;

/// Render nodes against a context value.
///
/// The context is normally a JSON object whose top-level keys are the
/// symbolic names used by templates (`project`, `version`, ...).
pub fn render_nodes(nodes: &[Node], context: &Value) -> TemplateResult<String> {
    let mut scope = Scope {
        root: context,
        locals: Vec::new(),
    };
    let mut out = String::new();
    scope.render(nodes, &mut out)?;
    Ok(out)
}

/// Variable scope: the root context plus a stack of loop bindings.
struct Scope<'a> {
    root: &'a Value,
    locals: Vec<(String, Value)>,
}

impl Scope<'_> {
    fn render(&mut self, nodes: &[Node], out: &mut String) -> TemplateResult<()> {
        for node in nodes {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Emit(expr) => {
                    let value = self.eval(expr)?;
                    out.push_str(&filters::display(&value));
                }
                Node::If { branches, otherwise } => {
                    let mut taken = false;
                    for (condition, body) in branches {
                        if filters::is_truthy(&self.eval(condition)?) {
                            self.render(body, out)?;
                            taken = true;
                            break;
                        }
                    }
                    if !taken {
                        self.render(otherwise, out)?;
                    }
                }
                Node::For {
                    binding,
                    iterable,
                    body,
                } => {
                    let items = iteration_items(self.eval(iterable)?);
                    let length = items.len();
                    for (index, item) in items.into_iter().enumerate() {
                        self.locals.push(("loop".to_string(), loop_helper(index, length)));
                        self.locals.push((binding.clone(), item));
                        let result = self.render(body, out);
                        self.locals.truncate(self.locals.len() - 2);
                        result?;
                    }
                }
            }
        }
        Ok(())
    }

    fn eval(&self, expr: &Expr) -> TemplateResult<Value> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Path(segments) => Ok(self.lookup(segments)),
            Expr::Filter {
                filter,
                input,
                args,
            } => {
                let input = self.eval(input)?;
                let args = args
                    .iter()
                    .map(|arg| self.eval(arg))
                    .collect::<TemplateResult<Vec<_>>>()?;
                filters::apply(*filter, input, &args)
            }
            Expr::Not(inner) => Ok(Value::Bool(!filters::is_truthy(&self.eval(inner)?))),
            Expr::And(left, right) => {
                let left = self.eval(left)?;
                if !filters::is_truthy(&left) {
                    return Ok(left);
                }
                self.eval(right)
            }
            Expr::Or(left, right) => {
                let left = self.eval(left)?;
                if filters::is_truthy(&left) {
                    return Ok(left);
                }
                self.eval(right)
            }
            Expr::Compare { op, left, right } => {
                let equal = values_equal(&self.eval(left)?, &self.eval(right)?);
                Ok(Value::Bool(match op {
                    CompareOp::Eq => equal,
                    CompareOp::Ne => !equal,
                }))
            }
        }
    }

    /// Resolve a dotted path. Anything missing resolves to null.
    fn lookup(&self, segments: &[PathSegment]) -> Value {
        let Some((PathSegment::Key(head), rest)) = segments.split_first() else {
            return Value::Null;
        };

        let start = self
            .locals
            .iter()
            .rev()
            .find(|(name, _)| name == head)
            .map(|(_, value)| value)
            .or_else(|| self.root.get(head.as_str()));

        let mut current = match start {
            Some(value) => value,
            None => return Value::Null,
        };
        for segment in rest {
            let next = match segment {
                PathSegment::Key(key) => current.get(key.as_str()),
                PathSegment::Index(index) => current.get(*index),
            };
            match next {
                Some(value) => current = value,
                None => return Value::Null,
            }
        }
        current.clone()
    }
}

/// Items visited by a `for` loop. Objects iterate over their keys; scalars
/// and null produce no iterations.
fn iteration_items(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Object(map) => map.into_iter().map(|(key, _)| Value::String(key)).collect(),
        _ => Vec::new(),
    }
}

fn loop_helper(index: usize, length: usize) -> Value {
    let mut map = Map::new();
    map.insert("index".into(), Value::from(index + 1));
    map.insert("index0".into(), Value::from(index));
    map.insert("first".into(), Value::Bool(index == 0));
    map.insert("last".into(), Value::Bool(index + 1 == length));
    map.insert("length".into(), Value::from(length));
    Value::Object(map)
}

/// Equality with integer/float unification so that `1 == 1.0`.
fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(a), Some(b)) => a == b,
            _ => a.as_f64() == b.as_f64(),
        },
        _ => left == right,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use serde_json::json;

    fn render(source: &str, context: &Value) -> String {
        render_nodes(&parse(source).unwrap(), context).unwrap()
    }

    #[test]
    fn interpolates_paths() {
        let ctx = json!({"asset": {"code": "Hero"}, "type": {"code": "MODEL"}});
        assert_eq!(render("{{asset.code}}/{{ type.code }}", &ctx), "Hero/MODEL");
    }

    #[test]
    fn unknown_variables_render_empty() {
        let ctx = json!({"asset": {"code": "Hero"}});
        assert_eq!(render("[{{shot.code}}][{{asset.missing.deeper}}]", &ctx), "[][]");
        assert_eq!(render("{{ nothing }}", &Value::Null), "");
    }

    #[test]
    fn conditional_branches() {
        let tpl = "{% if version.take_name == 'MAIN' %}main{% elif version.take_name %}{{version.take_name}}{% else %}none{% endif %}";
        assert_eq!(render(tpl, &json!({"version": {"take_name": "MAIN"}})), "main");
        assert_eq!(render(tpl, &json!({"version": {"take_name": "Alt"}})), "Alt");
        assert_eq!(render(tpl, &json!({"version": {}})), "none");
    }

    #[test]
    fn loops_over_lists_with_helper() {
        let ctx = json!({"project": {"sequences": [{"code": "SEQ1"}, {"code": "SEQ2"}]}});
        let tpl = "{% for seq in project.sequences %}{{loop.index}}:{{seq.code}}{% if not loop.last %},{% endif %}{% endfor %}";
        assert_eq!(render(tpl, &ctx), "1:SEQ1,2:SEQ2");
    }

    #[test]
    fn loop_over_missing_list_renders_nothing() {
        assert_eq!(render("a{% for s in project.sequences %}x{% endfor %}b", &json!({})), "ab");
    }

    #[test]
    fn loop_binding_shadows_and_restores() {
        let ctx = json!({"x": "outer", "items": ["a", "b"]});
        assert_eq!(render("{% for x in items %}{{x}}{% endfor %}{{x}}", &ctx), "abouter");
    }

    #[test]
    fn nested_loops() {
        let ctx = json!({"rows": [[1, 2], [3]]});
        assert_eq!(
            render("{% for r in rows %}({% for c in r %}{{c}}{% endfor %}){% endfor %}", &ctx),
            "(12)(3)"
        );
    }

    #[test]
    fn boolean_operators_short_circuit() {
        let ctx = json!({"a": "", "b": "B"});
        assert_eq!(render("{{ a or b }}", &ctx), "B");
        assert_eq!(render("{{ a and b }}", &ctx), "");
        assert_eq!(render("{% if not a %}yes{% endif %}", &ctx), "yes");
    }

    #[test]
    fn numeric_comparison_unifies_int_and_float() {
        let ctx = json!({"n": 1.0});
        assert_eq!(render("{% if n == 1 %}one{% endif %}", &ctx), "one");
        assert_eq!(render("{% if n != 2 %}not-two{% endif %}", &ctx), "not-two");
    }

    #[test]
    fn format_filter_in_template() {
        let ctx = json!({"version": {"version_number": 12}});
        assert_eq!(render("v{{ '%03d'|format(version.version_number) }}", &ctx), "v012");
    }

    #[test]
    fn filter_errors_propagate() {
        let nodes = parse("{{ 'x'|format(1) }}").unwrap();
        assert!(render_nodes(&nodes, &json!({})).is_err());
    }
}
