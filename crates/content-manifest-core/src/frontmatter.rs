//! Front-matter parsing and serialization.
//!
//! A document starts with a line containing exactly `---`, followed by a
//! block of `key: value` lines, followed by another `---` line. Everything
//! after the closing delimiter is the body and is returned byte-for-byte.
//!
//! The block is parsed with `serde_yaml` and converted to JSON values so the
//! passthrough keys can be carried opaquely. [`FrontMatter::to_block`] writes
//! the block back in the same line-oriented form (sequences as `[a, b]`), and
//! parsing the rendered text reproduces the original [`FrontMatter`].
//!
//! # Example
//!
//! ```rust
//! use content_manifest_core::frontmatter::{parse_document, render_document};
//!
//! let raw = "---\ntitle: About\npermalink: /about/\n---\nHello.\n";
//! let (fm, body) = parse_document("about.md", raw).unwrap();
//! assert_eq!(fm.title, "About");
//! assert_eq!(fm.permalink(), Some("/about/"));
//! assert_eq!(body, "Hello.\n");
//!
//! let again = parse_document("about.md", &render_document(&fm, &body)).unwrap();
//! assert_eq!(again, (fm, body));
//! ```

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::error::PipelineError;
use crate::models::FrontMatter;

const DELIMITER: &str = "---";

/// Parse `raw` into front matter and body.
///
/// Fails with [`PipelineError::MalformedFrontMatter`] when either delimiter
/// is missing or the block is not a key-value mapping, and with
/// [`PipelineError::MissingRequiredField`] when `title` is absent or blank.
pub fn parse_document(path: &str, raw: &str) -> Result<(FrontMatter, String), PipelineError> {
    let (block, body) = split_front_matter(path, raw)?;
    let front_matter = parse_block(path, block)?;
    Ok((front_matter, body.to_string()))
}

/// Split `raw` into the text between the delimiters and the body.
pub fn split_front_matter<'a>(path: &str, raw: &'a str) -> Result<(&'a str, &'a str), PipelineError> {
    let text = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    let mut lines = text.split_inclusive('\n');

    let first = lines
        .next()
        .ok_or_else(|| PipelineError::malformed(path, "document is empty"))?;
    if trim_eol(first) != DELIMITER {
        return Err(PipelineError::malformed(
            path,
            "missing opening `---` delimiter",
        ));
    }

    let block_start = first.len();
    let mut offset = block_start;
    for line in lines {
        if trim_eol(line) == DELIMITER {
            let block = &text[block_start..offset];
            let body = &text[offset + line.len()..];
            return Ok((block, body));
        }
        offset += line.len();
    }

    Err(PipelineError::malformed(
        path,
        "missing closing `---` delimiter",
    ))
}

fn trim_eol(line: &str) -> &str {
    match line.strip_suffix('\n') {
        Some(l) => l.strip_suffix('\r').unwrap_or(l),
        None => line,
    }
}

/// Parse the text between the delimiters into a [`FrontMatter`].
pub fn parse_block(path: &str, block: &str) -> Result<FrontMatter, PipelineError> {
    let mut map = parse_mapping(path, block)?;

    let title = match map.remove("title") {
        None | Some(Value::Null) => return Err(PipelineError::missing(path, "title")),
        Some(value) => scalar_to_string(&value)
            .ok_or_else(|| PipelineError::malformed(path, "`title` must be a scalar"))?,
    };
    if title.trim().is_empty() {
        return Err(PipelineError::missing(path, "title"));
    }

    let date = match map.remove("date") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(parse_date(&s).ok_or_else(|| {
            PipelineError::malformed(path, format!("`date` is not a valid calendar date: {s}"))
        })?),
        Some(other) => {
            return Err(PipelineError::malformed(
                path,
                format!("`date` is not a valid calendar date: {other}"),
            ))
        }
    };

    let categories = string_set(path, "categories", map.remove("categories"))?;
    let tags = string_set(path, "tags", map.remove("tags"))?;

    Ok(FrontMatter {
        title,
        date,
        categories,
        tags,
        extra: map.into_iter().collect(),
    })
}

fn parse_mapping(path: &str, block: &str) -> Result<Map<String, Value>, PipelineError> {
    if block.trim().is_empty() {
        return Ok(Map::new());
    }

    let yaml: serde_yaml::Value = serde_yaml::from_str(block)
        .map_err(|e| PipelineError::malformed(path, e.to_string()))?;
    let json = serde_json::to_value(yaml)
        .map_err(|e| PipelineError::malformed(path, e.to_string()))?;

    match json {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        _ => Err(PipelineError::malformed(
            path,
            "front matter is not a mapping of keys to values",
        )),
    }
}

/// Parse `YYYY-MM-DD`, ignoring any time part after whitespace or `T`.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let day = value
        .trim()
        .split(|c: char| c.is_whitespace() || c == 'T')
        .next()?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn string_set(
    path: &str,
    key: &str,
    value: Option<Value>,
) -> Result<BTreeSet<String>, PipelineError> {
    match value {
        None | Some(Value::Null) => Ok(BTreeSet::new()),
        // A bare string is a whitespace-separated list.
        Some(Value::String(s)) => Ok(s.split_whitespace().map(str::to_string).collect()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                scalar_to_string(item).ok_or_else(|| {
                    PipelineError::malformed(path, format!("`{key}` entries must be scalars"))
                })
            })
            .collect(),
        Some(_) => Err(PipelineError::malformed(
            path,
            format!("`{key}` must be a sequence of strings"),
        )),
    }
}

impl FrontMatter {
    /// Serialize to the line-oriented block written between the delimiters.
    ///
    /// Output is deterministic: recognized keys first, then passthrough keys
    /// in key order. Used both for round-tripping and for content hashing.
    pub fn to_block(&self) -> String {
        let mut out = String::new();

        push_line(&mut out, "title", &quoted(&self.title));
        if let Some(date) = self.date {
            push_line(&mut out, "date", &date.format("%Y-%m-%d").to_string());
        }
        if !self.categories.is_empty() {
            push_line(&mut out, "categories", &string_list(&self.categories));
        }
        if !self.tags.is_empty() {
            push_line(&mut out, "tags", &string_list(&self.tags));
        }
        for (key, value) in &self.extra {
            let mut rendered = String::new();
            write_flow(value, &mut rendered);
            push_line(&mut out, &yaml_key(key), &rendered);
        }

        out
    }
}

/// Render a full document: delimiters, front matter, then `body` verbatim.
pub fn render_document(front_matter: &FrontMatter, body: &str) -> String {
    format!("{DELIMITER}\n{}{DELIMITER}\n{body}", front_matter.to_block())
}

fn push_line(out: &mut String, key: &str, value: &str) {
    out.push_str(key);
    out.push_str(": ");
    out.push_str(value);
    out.push('\n');
}

fn string_list(items: &BTreeSet<String>) -> String {
    let quoted: Vec<String> = items
        .iter()
        .map(|s| quoted(s))
        .collect();
    format!("[{}]", quoted.join(", "))
}

/// Keys stay plain only when YAML reads them back as the same string;
/// `null`, `0x1A` or `1e3` would come back as other types.
fn yaml_key(key: &str) -> String {
    let simple = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    let reparsed = simple
        && matches!(
            serde_yaml::from_str::<serde_yaml::Value>(key),
            Ok(serde_yaml::Value::String(ref s)) if s == key
        );
    if reparsed {
        key.to_string()
    } else {
        quoted(key)
    }
}

/// A double-quoted YAML scalar.
///
/// JSON string syntax is valid YAML, except that JSON leaves DEL, the C1
/// controls and a few other non-printable code points raw. libyaml rejects
/// or folds those, so they are written as `\uXXXX` escapes.
fn quoted(s: &str) -> String {
    let json = Value::String(s.to_string()).to_string();
    if !json.chars().any(needs_escape) {
        return json;
    }
    let mut out = String::with_capacity(json.len() + 8);
    for c in json.chars() {
        if needs_escape(c) {
            out.push_str(&format!("\\u{:04X}", c as u32));
        } else {
            out.push(c);
        }
    }
    out
}

fn needs_escape(c: char) -> bool {
    matches!(
        c,
        '\u{7f}'..='\u{9f}' | '\u{2028}' | '\u{2029}' | '\u{feff}' | '\u{fffe}' | '\u{ffff}'
    )
}

/// Write a JSON value as YAML flow syntax. JSON scalars are valid YAML
/// scalars; collections get explicit `", "` and `": "` separators.
fn write_flow(value: &Value, out: &mut String) {
    match value {
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_flow(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            out.push('{');
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(&quoted(key));
                out.push_str(": ");
                write_flow(item, out);
            }
            out.push('}');
        }
        Value::String(s) => out.push_str(&quoted(s)),
        scalar => out.push_str(&scalar.to_string()),
    }
}
