//! Line-oriented recovery for frontmatter that YAML rejects.
//!
//! Only handles the shapes people actually write by hand: `key: value`,
//! `key:` followed by `- item` lines, and indented continuation lines.
//! Anything else is either skipped or, when the closing delimiter is missing,
//! taken as the start of the body.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_yaml::Value;

static KEY_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z_][A-Za-z0-9_-]*)[ \t]*:(?:[ \t]+(.*?))?[ \t]*$").unwrap()
});

/// Recover fields from `lines`. Returns the fields and how many lines belong
/// to the block.
///
/// With `stop_at_foreign` set, the first blank line or unrecognised line ends
/// the block (blank lines are counted as consumed, foreign lines are not).
/// Otherwise unrecognised lines are skipped and every line is consumed.
pub(super) fn salvage_fields(lines: &[&str], stop_at_foreign: bool) -> (Vec<(String, Value)>, usize) {
    let mut fields: Vec<(String, Value)> = Vec::new();
    let mut current: Option<usize> = None;

    for (i, line) in lines.iter().enumerate() {
        if line.trim().is_empty() {
            if stop_at_foreign {
                return (fields, i + 1);
            }
            continue;
        }

        if let Some(caps) = KEY_LINE.captures(line) {
            let key = caps[1].to_string();
            let value = caps
                .get(2)
                .map(|m| parse_inline(m.as_str()))
                .unwrap_or(Value::Null);
            current = Some(upsert(&mut fields, key, value));
            continue;
        }

        let indented = line.starts_with(' ') || line.starts_with('\t');
        if let (true, Some(idx)) = (indented, current) {
            extend_value(&mut fields[idx].1, line.trim());
            continue;
        }

        if stop_at_foreign {
            return (fields, i);
        }
    }

    (fields, lines.len())
}

fn upsert(fields: &mut Vec<(String, Value)>, key: String, value: Value) -> usize {
    if let Some(idx) = fields.iter().position(|(k, _)| *k == key) {
        fields[idx].1 = value;
        idx
    } else {
        fields.push((key, value));
        fields.len() - 1
    }
}

/// Apply an indented line to the value of the preceding key.
fn extend_value(value: &mut Value, line: &str) {
    let item = line
        .strip_prefix("- ")
        .or_else(|| (line == "-").then_some(""));

    if let Some(item) = item {
        let entry = Value::String(unquote(item.trim()));
        match value {
            Value::Null => *value = Value::Sequence(vec![entry]),
            Value::Sequence(items) => items.push(entry),
            Value::String(s) => append_folded(s, line),
            _ => {}
        }
        return;
    }

    match value {
        Value::Null => *value = Value::String(line.to_string()),
        Value::String(s) => append_folded(s, line),
        _ => {}
    }
}

fn append_folded(s: &mut String, line: &str) {
    if !s.is_empty() {
        s.push(' ');
    }
    s.push_str(line);
}

fn parse_inline(raw: &str) -> Value {
    let raw = raw.trim();
    if raw.starts_with('[') && raw.ends_with(']') {
        if let Ok(value @ Value::Sequence(_)) = serde_yaml::from_str::<Value>(raw) {
            return value;
        }
    }
    Value::String(unquote(raw))
}

fn unquote(raw: &str) -> String {
    let bytes = raw.as_bytes();
    if bytes.len() < 2 {
        return raw.to_string();
    }
    let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
    if first != last || !matches!(first, b'"' | b'\'') {
        return raw.to_string();
    }

    if let Ok(Value::String(s)) = serde_yaml::from_str::<Value>(raw) {
        return s;
    }

    let inner = &raw[1..raw.len() - 1];
    if first == b'\'' {
        inner.replace("''", "'")
    } else {
        unescape_double_quoted(inner)
    }
}

/// Single left-to-right pass over double-quoted escapes, so `\\"` is a
/// backslash followed by a quote and never a quote escape.
fn unescape_double_quoted(inner: &str) -> String {
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
