//! Turning segments into a node tree.

use serde_json::Value;

use crate::ast::{CompareOp, Expr, Filter, Node, PathSegment};
use crate::error::{TemplateError, TemplateResult};
use crate::lexer::{self, Segment, Token};

/// Parse template source into its node tree.
pub fn parse(source: &str) -> TemplateResult<Vec<Node>> {
    let segments = lexer::split(source)?;
    let mut parser = BlockParser {
        segments,
        pos: 0,
    };
    let (nodes, _) = parser.parse_nodes(&[])?;
    Ok(nodes)
}

/// A statement that ended a block: its keyword, the remaining body, and
/// its line.
struct Terminator {
    keyword: String,
    rest: String,
    line: usize,
}

struct BlockParser {
    segments: Vec<Segment>,
    pos: usize,
}

impl BlockParser {
    /// Parse nodes until one of the `until` keywords (or end of input when
    /// `until` is empty).
    fn parse_nodes(&mut self, until: &[&str]) -> TemplateResult<(Vec<Node>, Option<Terminator>)> {
        let mut nodes = Vec::new();

        while let Some(segment) = self.segments.get(self.pos).cloned() {
            self.pos += 1;
            match segment {
                Segment::Text(text) => nodes.push(Node::Text(text)),
                Segment::Expr { body, line } => {
                    nodes.push(Node::Emit(parse_expression(&body, line)?))
                }
                Segment::Tag { body, line } => {
                    let (keyword, rest) = match body.split_once(char::is_whitespace) {
                        Some((keyword, rest)) => (keyword.to_string(), rest.trim().to_string()),
                        None => (body.clone(), String::new()),
                    };
                    if until.contains(&keyword.as_str()) {
                        return Ok((nodes, Some(Terminator { keyword, rest, line })));
                    }
                    match keyword.as_str() {
                        "if" => nodes.push(self.parse_if(&rest, line)?),
                        "for" => nodes.push(self.parse_for(&rest, line)?),
                        other => {
                            return Err(TemplateError::syntax(
                                line,
                                format!("unexpected statement '{other}'"),
                            ));
                        }
                    }
                }
            }
        }

        if until.is_empty() {
            Ok((nodes, None))
        } else {
            let line = self.last_line();
            Err(TemplateError::syntax(
                line,
                format!("unexpected end of template, expected one of: {}", until.join(", ")),
            ))
        }
    }

    fn parse_if(&mut self, condition: &str, line: usize) -> TemplateResult<Node> {
        let mut branches = Vec::new();
        let mut condition = parse_expression(condition, line)?;

        loop {
            let (body, terminator) = self.parse_nodes(&["elif", "else", "endif"])?;
            let Some(terminator) = terminator else {
                return Err(TemplateError::syntax(line, "unclosed 'if'"));
            };
            branches.push((condition, body));

            match terminator.keyword.as_str() {
                "elif" => {
                    condition = parse_expression(&terminator.rest, terminator.line)?;
                }
                "else" => {
                    expect_bare(&terminator)?;
                    let (otherwise, end) = self.parse_nodes(&["endif"])?;
                    if let Some(end) = end {
                        expect_bare(&end)?;
                    }
                    return Ok(Node::If { branches, otherwise });
                }
                _ => {
                    expect_bare(&terminator)?;
                    return Ok(Node::If {
                        branches,
                        otherwise: Vec::new(),
                    });
                }
            }
        }
    }

    fn parse_for(&mut self, header: &str, line: usize) -> TemplateResult<Node> {
        let tokens = lexer::tokenize(header, line)?;
        let (binding, iterable) = match tokens.as_slice() {
            [Token::Ident(binding), Token::Ident(kw), rest @ ..]
                if kw == "in" && !rest.is_empty() =>
            {
                (binding.clone(), rest.to_vec())
            }
            _ => {
                return Err(TemplateError::syntax(
                    line,
                    format!(
                        "malformed for statement: expected 'for <name> in <expr>', got {header:?}"
                    ),
                ));
            }
        };
        if is_keyword(&binding) {
            return Err(TemplateError::syntax(
                line,
                format!("cannot bind loop variable to keyword '{binding}'"),
            ));
        }

        let iterable = ExprParser::new(iterable, line).parse_all()?;
        let (body, terminator) = self.parse_nodes(&["endfor"])?;
        if let Some(terminator) = terminator {
            expect_bare(&terminator)?;
        }
        Ok(Node::For {
            binding,
            iterable,
            body,
        })
    }

    fn last_line(&self) -> usize {
        self.segments
            .iter()
            .rev()
            .find_map(|segment| match segment {
                Segment::Expr { line, .. } | Segment::Tag { line, .. } => Some(*line),
                Segment::Text(_) => None,
            })
            .unwrap_or(1)
    }
}

fn expect_bare(terminator: &Terminator) -> TemplateResult<()> {
    if terminator.rest.is_empty() {
        Ok(())
    } else {
        Err(TemplateError::syntax(
            terminator.line,
            format!(
                "'{}' takes no arguments, got {:?}",
                terminator.keyword, terminator.rest
            ),
        ))
    }
}

fn is_keyword(word: &str) -> bool {
    matches!(
        word,
        "not" | "and" | "or" | "in" | "true" | "false" | "none" | "True" | "False" | "None"
    )
}

/// Parse a complete expression body.
pub fn parse_expression(body: &str, line: usize) -> TemplateResult<Expr> {
    let tokens = lexer::tokenize(body, line)?;
    ExprParser::new(tokens, line).parse_all()
}

/// Recursive-descent expression parser.
///
/// ```text
/// expr     := and ("or" and)*
/// and      := not ("and" not)*
/// not      := "not" not | compare
/// compare  := filtered (("==" | "!=") filtered)?
/// filtered := primary ("|" ident ("(" args ")")?)*
/// primary  := literal | path | "(" expr ")"
/// ```
struct ExprParser {
    tokens: Vec<Token>,
    pos: usize,
    line: usize,
}

impl ExprParser {
    fn new(tokens: Vec<Token>, line: usize) -> Self {
        Self {
            tokens,
            pos: 0,
            line,
        }
    }

    fn parse_all(mut self) -> TemplateResult<Expr> {
        let expr = self.parse_or()?;
        if let Some(token) = self.peek() {
            return Err(self.error(format!("unexpected token {token:?}")));
        }
        Ok(expr)
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if matches!(self.peek(), Some(Token::Ident(word)) if word == keyword) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn error(&self, message: impl Into<String>) -> TemplateError {
        TemplateError::syntax(self.line, message)
    }

    fn parse_or(&mut self) -> TemplateResult<Expr> {
        let mut left = self.parse_and()?;
        while self.eat_keyword("or") {
            let right = self.parse_and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> TemplateResult<Expr> {
        let mut left = self.parse_not()?;
        while self.eat_keyword("and") {
            let right = self.parse_not()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> TemplateResult<Expr> {
        if self.eat_keyword("not") {
            let inner = self.parse_not()?;
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.parse_compare()
    }

    fn parse_compare(&mut self) -> TemplateResult<Expr> {
        let left = self.parse_filtered()?;
        let op = if self.eat(&Token::Eq) {
            CompareOp::Eq
        } else if self.eat(&Token::Ne) {
            CompareOp::Ne
        } else {
            return Ok(left);
        };
        let right = self.parse_filtered()?;
        Ok(Expr::Compare {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn parse_filtered(&mut self) -> TemplateResult<Expr> {
        let mut expr = self.parse_primary()?;
        while self.eat(&Token::Pipe) {
            let name = match self.advance() {
                Some(Token::Ident(name)) => name,
                other => {
                    return Err(
                        self.error(format!("expected filter name after '|', got {other:?}"))
                    )
                }
            };
            let filter = Filter::from_name(&name).ok_or_else(|| TemplateError::UnknownFilter {
                name: name.clone(),
                line: self.line,
            })?;

            let mut args = Vec::new();
            if self.eat(&Token::LParen) {
                if !self.eat(&Token::RParen) {
                    loop {
                        args.push(self.parse_or()?);
                        if self.eat(&Token::Comma) {
                            continue;
                        }
                        if self.eat(&Token::RParen) {
                            break;
                        }
                        return Err(self.error(format!(
                            "expected ',' or ')' in arguments to '{name}'"
                        )));
                    }
                }
            }

            let (min, max) = filter.arity();
            if args.len() < min || args.len() > max {
                return Err(self.error(format!(
                    "filter '{name}' got {} argument(s)",
                    args.len()
                )));
            }

            expr = Expr::Filter {
                filter,
                input: Box::new(expr),
                args,
            };
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> TemplateResult<Expr> {
        match self.advance() {
            Some(Token::Str(s)) => Ok(Expr::Literal(Value::String(s))),
            Some(Token::Int(n)) => Ok(Expr::Literal(Value::from(n))),
            Some(Token::LParen) => {
                let inner = self.parse_or()?;
                if !self.eat(&Token::RParen) {
                    return Err(self.error("expected ')'"));
                }
                Ok(inner)
            }
            Some(Token::Ident(word)) => match word.as_str() {
                "true" | "True" => Ok(Expr::Literal(Value::Bool(true))),
                "false" | "False" => Ok(Expr::Literal(Value::Bool(false))),
                "none" | "None" => Ok(Expr::Literal(Value::Null)),
                "not" | "and" | "or" | "in" => {
                    Err(self.error(format!("unexpected keyword '{word}'")))
                }
                _ => self.parse_path(word),
            },
            Some(other) => Err(self.error(format!("unexpected token {other:?}"))),
            None => Err(self.error("unexpected end of expression")),
        }
    }

    fn parse_path(&mut self, head: String) -> TemplateResult<Expr> {
        let mut segments = vec![PathSegment::Key(head)];
        while self.eat(&Token::Dot) {
            match self.advance() {
                Some(Token::Ident(key)) => segments.push(PathSegment::Key(key)),
                Some(Token::Int(index)) if index >= 0 => {
                    segments.push(PathSegment::Index(index as usize));
                }
                other => {
                    return Err(
                        self.error(format!("expected attribute after '.', got {other:?}"))
                    )
                }
            }
        }
        Ok(Expr::Path(segments))
    }
}
