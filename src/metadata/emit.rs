//! Frontmatter serialization.
//!
//! Emits the small YAML subset the converters need, with a fixed field order
//! chosen by the caller. Scalars stay plain whenever YAML would read them back
//! unchanged, and are double-quoted otherwise. Multi-line strings become
//! literal blocks.

use serde_yaml::Value;

const INDENT: &str = "  ";

/// Characters that change meaning at the start of a plain YAML scalar.
const RESERVED_LEADING: &[char] = &[
    '-', '?', ':', ',', '[', ']', '{', '}', '#', '&', '*', '!', '|', '>', '\'', '"', '%', '@', '`',
];

/// Wrap rendered fields and a body into a complete document.
///
/// With no fields the body is returned as is.
pub fn compose(fields: &[(String, Value)], body: &str) -> String {
    if fields.is_empty() {
        return body.to_string();
    }
    format!("---\n{}---\n{}", render_fields(fields), body)
}

/// Render `key: value` lines in the given order.
pub fn render_fields(fields: &[(String, Value)]) -> String {
    let mut out = String::new();
    for (key, value) in fields {
        render_field(&mut out, key, value);
    }
    out
}

fn render_field(out: &mut String, key: &str, value: &Value) {
    match value {
        Value::Null => {
            out.push_str(key);
            out.push_str(":\n");
        }
        Value::Bool(b) => out.push_str(&format!("{}: {}\n", key, b)),
        Value::Number(n) => out.push_str(&format!("{}: {}\n", key, n)),
        Value::String(s) if s.contains('\n') && literal_block_safe(s) => {
            let indicator = if s.ends_with('\n') { "|" } else { "|-" };
            out.push_str(&format!("{}: {}\n", key, indicator));
            for line in s.trim_end_matches('\n').split('\n') {
                if line.is_empty() {
                    out.push('\n');
                } else {
                    out.push_str(INDENT);
                    out.push_str(line);
                    out.push('\n');
                }
            }
        }
        Value::String(s) => out.push_str(&format!("{}: {}\n", key, scalar(s))),
        Value::Sequence(items) if items.is_empty() => {
            out.push_str(&format!("{}: []\n", key));
        }
        Value::Sequence(items) if items.iter().all(is_scalar) => {
            out.push_str(key);
            out.push_str(":\n");
            for item in items {
                out.push_str(INDENT);
                out.push_str("- ");
                out.push_str(&inline_scalar(item));
                out.push('\n');
            }
        }
        nested => match serde_yaml::to_string(nested) {
            Ok(yaml) => {
                out.push_str(key);
                out.push_str(":\n");
                for line in yaml.lines() {
                    out.push_str(INDENT);
                    out.push_str(line);
                    out.push('\n');
                }
            }
            Err(e) => tracing::warn!(key, error = %e, "dropping unserializable frontmatter value"),
        },
    }
}

fn is_scalar(value: &Value) -> bool {
    matches!(
        value,
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_)
    )
}

fn inline_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => scalar(s),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        _ => "null".to_string(),
    }
}

/// Emit a single-line scalar, quoting only when a plain scalar would not
/// round-trip.
pub fn scalar(value: &str) -> String {
    if is_plain_safe(value) {
        value.to_string()
    } else {
        quote(value)
    }
}

fn is_plain_safe(value: &str) -> bool {
    let Some(first) = value.chars().next() else {
        return false;
    };

    !value.contains(['\n', '\r', '#'])
        && value.trim() == value
        && !RESERVED_LEADING.contains(&first)
        && !value.contains(": ")
        && !value.contains(":\t")
        && !value.ends_with(':')
        && !reads_as_non_string(value)
}

/// Plain scalars YAML would load as booleans, nulls or numbers.
fn reads_as_non_string(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    if matches!(
        lower.as_str(),
        "true" | "false" | "yes" | "no" | "on" | "off" | "null" | "~" | "y" | "n"
            | ".inf" | "-.inf" | "+.inf" | ".nan"
    ) {
        return true;
    }
    value.parse::<f64>().is_ok()
        || value.parse::<i64>().is_ok()
        || lower.starts_with("0x")
        || lower.starts_with("0o")
        || lower.starts_with("0b")
}

fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// A literal block can hold the value without an indentation indicator or
/// chomping tricks.
fn literal_block_safe(value: &str) -> bool {
    !value.contains('\r')
        && !value.starts_with([' ', '\t'])
        && !value.starts_with('\n')
        && !value.ends_with("\n\n")
        && !value.trim_end_matches('\n').ends_with([' ', '\t'])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::split;

    fn s(value: &str) -> Value {
        Value::String(value.to_string())
    }

    #[test]
    fn test_plain_scalar() {
        assert_eq!(scalar("Reviews pull requests"), "Reviews pull requests");
        assert_eq!(scalar("https://example.com/a"), "https://example.com/a");
    }

    #[test]
    fn test_quoted_scalars() {
        assert_eq!(scalar(""), "\"\"");
        assert_eq!(scalar(" padded"), "\" padded\"");
        assert_eq!(scalar("- dash first"), "\"- dash first\"");
        assert_eq!(scalar("has # comment"), "\"has # comment\"");
        assert_eq!(scalar("key: value"), "\"key: value\"");
        assert_eq!(scalar("say \"hi\" \\o/"), "\"say \\\"hi\\\" \\\\o/\"");
        assert_eq!(scalar("true"), "\"true\"");
        assert_eq!(scalar("42"), "\"42\"");
    }

    #[test]
    fn test_literal_block_for_multiline() {
        let out = render_fields(&[("description".to_string(), s("line one\nline two"))]);
        assert_eq!(out, "description: |-\n  line one\n  line two\n");
    }

    #[test]
    fn test_literal_block_keeps_trailing_newline() {
        let out = render_fields(&[("description".to_string(), s("line one\n\nline three\n"))]);
        assert_eq!(out, "description: |\n  line one\n\n  line three\n");
    }

    #[test]
    fn test_multiline_with_leading_space_is_quoted() {
        let out = render_fields(&[("description".to_string(), s("  indented\nnext"))]);
        assert_eq!(out, "description: \"  indented\\nnext\"\n");
    }

    #[test]
    fn test_sequence_rendering() {
        let tools = Value::Sequence(vec![s("Read"), s("mcp__github__create_issue")]);
        let out = render_fields(&[("tools".to_string(), tools)]);
        assert_eq!(out, "tools:\n  - Read\n  - mcp__github__create_issue\n");

        let empty = render_fields(&[("tools".to_string(), Value::Sequence(vec![]))]);
        assert_eq!(empty, "tools: []\n");
    }

    #[test]
    fn test_compose_without_fields_returns_body() {
        assert_eq!(compose(&[], "Body\n"), "Body\n");
    }

    #[test]
    fn test_rendered_values_split_back_identically() {
        let fields = vec![
            ("name".to_string(), s("reviewer")),
            ("description".to_string(), s("Use when: \"quoted\" # tricky")),
            ("notes".to_string(), s("multi\nline\n")),
            ("odd".to_string(), s("  edge\n\n\n")),
            ("flag".to_string(), s("yes")),
            ("tabbed".to_string(), s("run a:\tb")),
            ("binary".to_string(), s("0b101")),
            ("tools".to_string(), Value::Sequence(vec![s("Read"), s("[x]")])),
        ];

        let text = compose(&fields, "Body\n");
        let block = split(&text);

        assert_eq!(block.fields, fields);
        assert_eq!(block.body, "Body\n");
    }
}
