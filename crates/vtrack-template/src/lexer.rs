//! Splitting template source into text and markup segments, and tokenizing
//! the expressions found inside markup.

use crate::error::{TemplateError, TemplateResult};

/// A top-level piece of template source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    /// Literal text copied to the output.
    Text(String),
    /// The body of a `{{ ... }}` interpolation.
    Expr { body: String, line: usize },
    /// The body of a `{% ... %}` statement.
    Tag { body: String, line: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Delimiter {
    Expr,
    Tag,
    Comment,
}

impl Delimiter {
    fn open(&self) -> &'static str {
        match self {
            Self::Expr => "{{",
            Self::Tag => "{%",
            Self::Comment => "{#",
        }
    }

    fn close(&self) -> &'static str {
        match self {
            Self::Expr => "}}",
            Self::Tag => "%}",
            Self::Comment => "#}",
        }
    }
}

/// Find the next opening delimiter in `text`.
fn next_open(text: &str) -> Option<(usize, Delimiter)> {
    let bytes = text.as_bytes();
    let mut from = 0;
    while let Some(offset) = text[from..].find('{') {
        let idx = from + offset;
        let delimiter = match bytes.get(idx + 1) {
            Some(b'{') => Some(Delimiter::Expr),
            Some(b'%') => Some(Delimiter::Tag),
            Some(b'#') => Some(Delimiter::Comment),
            _ => None,
        };
        if let Some(delimiter) = delimiter {
            return Some((idx, delimiter));
        }
        from = idx + 1;
    }
    None
}

/// Split template source into segments. Comments are dropped here.
pub fn split(source: &str) -> TemplateResult<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut rest = source;
    let mut line = 1;
    let mut trim_next_text = false;

    loop {
        let Some((start, delimiter)) = next_open(rest) else {
            let text = if trim_next_text { rest.trim_start() } else { rest };
            if !text.is_empty() {
                segments.push(Segment::Text(text.to_string()));
            }
            return Ok(segments);
        };

        let raw_text = &rest[..start];
        line += raw_text.matches('\n').count();

        let after_open = &rest[start + 2..];
        let (trim_before, after_open) = match after_open.strip_prefix('-') {
            Some(stripped) => (true, stripped),
            None => (false, after_open),
        };

        let mut text = raw_text;
        if trim_next_text {
            text = text.trim_start();
        }
        if trim_before {
            text = text.trim_end();
        }
        if !text.is_empty() {
            segments.push(Segment::Text(text.to_string()));
        }

        let close = delimiter.close();
        let Some(end) = after_open.find(close) else {
            return Err(TemplateError::syntax(
                line,
                format!("unclosed '{}' (missing '{}')", delimiter.open(), close),
            ));
        };

        let raw_body = &after_open[..end];
        let body = match raw_body.strip_suffix('-') {
            Some(stripped) => {
                trim_next_text = true;
                stripped
            }
            None => {
                trim_next_text = false;
                raw_body
            }
        };

        let body_line = line;
        line += raw_body.matches('\n').count();

        match delimiter {
            Delimiter::Comment => {}
            Delimiter::Expr => {
                let body = body.trim();
                if body.is_empty() {
                    return Err(TemplateError::syntax(body_line, "empty expression"));
                }
                segments.push(Segment::Expr {
                    body: body.to_string(),
                    line: body_line,
                });
            }
            Delimiter::Tag => {
                let body = body.trim();
                if body.is_empty() {
                    return Err(TemplateError::syntax(body_line, "empty statement"));
                }
                segments.push(Segment::Tag {
                    body: body.to_string(),
                    line: body_line,
                });
            }
        }

        rest = &after_open[end + close.len()..];
    }
}

/// A token inside an expression or statement body.
#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    Ident(String),
    Str(String),
    Int(i64),
    Dot,
    Pipe,
    Comma,
    LParen,
    RParen,
    Eq,
    Ne,
}

/// Tokenize an expression body.
pub fn tokenize(body: &str, line: usize) -> TemplateResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = body.char_indices().peekable();

    while let Some(&(idx, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '.' => {
                chars.next();
                tokens.push(Token::Dot);
            }
            '|' => {
                chars.next();
                tokens.push(Token::Pipe);
            }
            ',' => {
                chars.next();
                tokens.push(Token::Comma);
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '=' | '!' => {
                chars.next();
                if chars.next_if(|&(_, next)| next == '=').is_none() {
                    return Err(TemplateError::syntax(
                        line,
                        format!("unexpected character {c:?} in {body:?}"),
                    ));
                }
                tokens.push(if c == '=' { Token::Eq } else { Token::Ne });
            }
            '"' | '\'' => {
                chars.next();
                let mut value = String::new();
                let mut closed = false;
                while let Some((_, next)) = chars.next() {
                    match next {
                        '\\' => match chars.next() {
                            Some((_, 'n')) => value.push('\n'),
                            Some((_, 't')) => value.push('\t'),
                            Some((_, escaped)) => value.push(escaped),
                            None => break,
                        },
                        q if q == c => {
                            closed = true;
                            break;
                        }
                        other => value.push(other),
                    }
                }
                if !closed {
                    return Err(TemplateError::syntax(
                        line,
                        format!("unterminated string literal in {body:?}"),
                    ));
                }
                tokens.push(Token::Str(value));
            }
            c if c.is_ascii_digit() => {
                let mut end = idx;
                while let Some(&(i, d)) = chars.peek() {
                    if !d.is_ascii_digit() {
                        break;
                    }
                    end = i + d.len_utf8();
                    chars.next();
                }
                let digits = &body[idx..end];
                let value = digits.parse::<i64>().map_err(|_| {
                    TemplateError::syntax(line, format!("integer literal out of range: {digits}"))
                })?;
                tokens.push(Token::Int(value));
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut end = idx;
                while let Some(&(i, d)) = chars.peek() {
                    if !(d.is_alphanumeric() || d == '_') {
                        break;
                    }
                    end = i + d.len_utf8();
                    chars.next();
                }
                tokens.push(Token::Ident(body[idx..end].to_string()));
            }
            other => {
                return Err(TemplateError::syntax(
                    line,
                    format!("unexpected character {other:?} in {body:?}"),
                ));
            }
        }
    }

    Ok(tokens)
}
