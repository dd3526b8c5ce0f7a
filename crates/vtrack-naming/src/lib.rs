//! Name conditioning for vtrack.
//!
//! Users type names like `"  my  hero-character!! "` into dialogs; the tracker
//! needs tokens it can put into file names. The functions here convert
//! arbitrary text into such tokens:
//!
//! - Characters other than ASCII alphanumerics, whitespace, `_` and `-` are
//!   removed.
//! - Anything before the first alphanumeric character is removed.
//! - Whitespace runs collapse to a single space ([`condition_free_text`]) or
//!   to a single underscore ([`condition_code`]).
//! - The first letter of every `_`/`-` delimited segment is upper-cased; the
//!   rest of the segment keeps its casing.
//!
//! The conditioners never fail. An empty result means nothing usable survived
//! and it is up to the caller to reject it.
//!
//! # Examples
//!
//! ```
//! use vtrack_naming::{condition_code, condition_free_text};
//!
//! assert_eq!(condition_free_text("test project"), "Test project");
//! assert_eq!(condition_code("test sequence"), "Test_Sequence");
//! assert_eq!(condition_code("***"), "");
//! ```

/// Characters that survive filtering besides ASCII alphanumerics and
/// whitespace.
const KEPT_PUNCTUATION: &[char] = &['_', '-'];

/// Characters that start a new capitalized segment.
const SEGMENT_DELIMITERS: &[char] = &['_', '-'];

/// Condition a display name.
///
/// Whitespace runs become a single space.
pub fn condition_free_text(input: &str) -> String {
    condition(input, " ")
}

/// Condition a code used directly inside rendered file names.
///
/// Whitespace runs become a single underscore, so the result never contains
/// raw spaces.
pub fn condition_code(input: &str) -> String {
    condition(input, "_")
}

/// Normalize a file extension to carry exactly one leading dot.
///
/// Surrounding whitespace is dropped. An empty (or all-dot) extension stays
/// empty.
pub fn condition_extension(input: &str) -> String {
    let trimmed = input.trim().trim_start_matches('.');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(".{trimmed}")
    }
}

fn condition(input: &str, whitespace_replacement: &str) -> String {
    let filtered: String = input
        .trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace() || KEPT_PUNCTUATION.contains(c))
        .collect();

    let Some(start) = filtered.find(|c: char| c.is_ascii_alphanumeric()) else {
        return String::new();
    };
    let body = filtered[start..].trim_end();

    let collapsed = collapse_whitespace(body, whitespace_replacement);
    capitalize_segments(&collapsed)
}

fn collapse_whitespace(input: &str, replacement: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_run = false;
    for c in input.chars() {
        if c.is_whitespace() {
            if !in_run {
                out.push_str(replacement);
                in_run = true;
            }
        } else {
            out.push(c);
            in_run = false;
        }
    }
    out
}

fn capitalize_segments(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut segment_start = true;
    for c in input.chars() {
        if segment_start {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
        segment_start = SEGMENT_DELIMITERS.contains(&c);
    }
    out
}
