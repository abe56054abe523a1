//! Line-oriented `key = value` source format.
//!
//! # Format
//! - `#` or `!` starts a comment line; blank lines are ignored
//! - `=` or `:` separates key from value; both sides are trimmed
//! - a line ending in an unescaped `\` continues on the next line
//! - `include = a.cfg, b.cfg` names further sources, never stored as a key
//! - repeating a key collects every value, in order
//!
//! Backslashes inside values are kept as written so that `\,` survives
//! until the value is split as an array.

use std::path::Path;

use crate::error::{ConfigError, Result};
use crate::store::Snapshot;

/// Directive naming further sources to load before this one.
pub const INCLUDE_KEY: &str = "include";

/// One parsed source file.
#[derive(Debug, Default)]
pub struct ParsedSource {
    /// Direct entries, with repeated keys collected.
    pub entries: Snapshot,
    /// Include targets with the line they appeared on.
    pub includes: Vec<(usize, String)>,
}

/// Parse the content of one source. `path` is only used in errors.
pub fn parse_source(path: &Path, content: &str) -> Result<ParsedSource> {
    let mut parsed = ParsedSource::default();

    for (line_no, line) in logical_lines(content) {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
            continue;
        }

        let (key, value) = split_line(trimmed).ok_or_else(|| ConfigError::Parse {
            path: path.to_path_buf(),
            line: line_no,
            message: format!("missing '=' separator in '{}'", trimmed),
        })?;

        if key.is_empty() {
            return Err(ConfigError::Parse {
                path: path.to_path_buf(),
                line: line_no,
                message: "empty key".to_string(),
            });
        }
        if key.chars().any(char::is_whitespace) {
            return Err(ConfigError::Parse {
                path: path.to_path_buf(),
                line: line_no,
                message: format!("whitespace in key '{}'", key),
            });
        }

        if key == INCLUDE_KEY {
            parsed.includes.extend(
                split_escaped(&value, ',')
                    .into_iter()
                    .map(|target| (line_no, target)),
            );
        } else {
            parsed.entries.append(key, value);
        }
    }

    Ok(parsed)
}

/// Split `value` on every `separator` not preceded by a backslash.
///
/// Each element is trimmed, `\<separator>` becomes a literal separator and
/// empty elements are dropped.
pub fn split_escaped(value: &str, separator: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut chars = value.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\\' && chars.peek() == Some(&separator) {
            current.push(separator);
            chars.next();
        } else if c == separator {
            parts.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    parts.push(current);

    parts
        .into_iter()
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .collect()
}

/// Join `values` with `separator`, escaping separators inside each value
/// so that [`split_escaped`] gives the same values back.
pub fn join_escaped(values: &[String], separator: char) -> String {
    let escaped = format!("\\{}", separator);
    values
        .iter()
        .map(|value| value.replace(separator, &escaped))
        .collect::<Vec<_>>()
        .join(&separator.to_string())
}

/// Join continuation lines, yielding each logical line with the 1-based
/// number of its first physical line.
fn logical_lines(content: &str) -> Vec<(usize, String)> {
    let mut lines = Vec::new();
    let mut pending: Option<(usize, String)> = None;

    for (idx, raw) in content.lines().enumerate() {
        let piece = match &pending {
            Some(_) => raw.trim_start(),
            None => raw,
        };
        let continued = ends_with_continuation(piece);
        let piece = if continued { &piece[..piece.len() - 1] } else { piece };

        let (start, mut text) = pending.take().unwrap_or((idx + 1, String::new()));
        text.push_str(piece);

        if continued && !is_comment(&text) {
            pending = Some((start, text));
        } else {
            lines.push((start, text));
        }
    }
    if let Some(last) = pending {
        lines.push(last);
    }
    lines
}

fn is_comment(text: &str) -> bool {
    let trimmed = text.trim_start();
    trimmed.starts_with('#') || trimmed.starts_with('!')
}

fn ends_with_continuation(line: &str) -> bool {
    let trailing = line.chars().rev().take_while(|c| *c == '\\').count();
    trailing % 2 == 1
}

/// Split at the first unescaped `=` or `:`.
fn split_line(line: &str) -> Option<(String, String)> {
    let mut escaped = false;
    for (idx, c) in line.char_indices() {
        match c {
            '\\' => escaped = !escaped,
            '=' | ':' if !escaped => {
                let key = unescape_key(line[..idx].trim());
                let value = line[idx + 1..].trim().to_string();
                return Some((key, value));
            }
            _ => escaped = false,
        }
    }
    None
}

fn unescape_key(key: &str) -> String {
    key.replace("\\=", "=").replace("\\:", ":")
}
