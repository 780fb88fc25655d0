//! Frontmatter handling for plugin markdown files.
//!
//! Agents, commands and skills all start with an optional `---` delimited YAML
//! block followed by a markdown body. Upstream files are hand written and
//! frequently not valid YAML (unquoted `: ` inside descriptions is the usual
//! culprit), so [`split`] never fails: when the structured parse is rejected,
//! the narrow line scan in [`salvage`] recovers what it can.

pub mod emit;
mod salvage;

use serde_yaml::Value;

pub use emit::{compose, render_fields};

const DELIMITER: &str = "---";

/// How the metadata block was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataStatus {
    /// The text has no leading delimiter
    Absent,
    /// The block parsed as a YAML mapping
    Parsed,
    /// The block was present but malformed; fields come from the line scan
    Salvaged,
}

/// Ordered frontmatter fields plus the body that follows them.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataBlock {
    pub fields: Vec<(String, Value)>,
    pub body: String,
    pub status: MetadataStatus,
}

impl MetadataBlock {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Scalar value as trimmed text; `None` when absent, empty or not a scalar.
    pub fn scalar(&self, key: &str) -> Option<String> {
        let text = match self.get(key)? {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => return None,
        };

        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    /// Capability tokens declared under `key`, as a sequence or a delimited string.
    pub fn token_list(&self, key: &str) -> Vec<String> {
        match self.get(key) {
            Some(Value::String(s)) => split_tokens(s),
            Some(Value::Sequence(items)) => items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.trim().to_string()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .filter(|s| !s.is_empty())
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn is_salvaged(&self) -> bool {
        self.status == MetadataStatus::Salvaged
    }

    fn absent(text: &str) -> Self {
        Self {
            fields: Vec::new(),
            body: text.to_string(),
            status: MetadataStatus::Absent,
        }
    }
}

/// Separate the leading metadata block from the body.
pub fn split(text: &str) -> MetadataBlock {
    let content = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut lines = content.split_inclusive('\n');
    let opening = match lines.next() {
        Some(line) => line,
        None => return MetadataBlock::absent(text),
    };
    if opening.trim_end() != DELIMITER || !opening.ends_with('\n') {
        return MetadataBlock::absent(text);
    }

    let mut block_lines: Vec<&str> = Vec::new();
    let mut offset = opening.len();
    let mut closed = false;

    for line in lines {
        offset += line.len();
        if line.trim_end() == DELIMITER {
            closed = true;
            break;
        }
        block_lines.push(line.trim_end_matches(['\n', '\r']));
    }

    if !closed {
        // Best guess: the block ends where key/value lines stop
        let (fields, consumed) = salvage::salvage_fields(&block_lines, true);
        let body_start = opening.len()
            + content[opening.len()..]
                .split_inclusive('\n')
                .take(consumed)
                .map(str::len)
                .sum::<usize>();
        tracing::debug!(fields = fields.len(), "frontmatter has no closing delimiter");
        return MetadataBlock {
            fields,
            body: content[body_start..].to_string(),
            status: MetadataStatus::Salvaged,
        };
    }

    let body = content[offset..].to_string();
    let yaml = block_lines.join("\n");
    if yaml.trim().is_empty() {
        return MetadataBlock {
            fields: Vec::new(),
            body,
            status: MetadataStatus::Parsed,
        };
    }

    match serde_yaml::from_str::<Value>(&yaml) {
        Ok(Value::Mapping(mapping)) => {
            let fields = mapping
                .into_iter()
                .filter_map(|(k, v)| key_string(&k).map(|k| (k, v)))
                .collect();
            MetadataBlock {
                fields,
                body,
                status: MetadataStatus::Parsed,
            }
        }
        Ok(Value::Null) => MetadataBlock {
            fields: Vec::new(),
            body,
            status: MetadataStatus::Parsed,
        },
        Ok(_) | Err(_) => {
            let (fields, _) = salvage::salvage_fields(&block_lines, false);
            tracing::debug!(fields = fields.len(), "frontmatter salvaged by line scan");
            MetadataBlock {
                fields,
                body,
                status: MetadataStatus::Salvaged,
            }
        }
    }
}

fn key_string(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Split a tool declaration such as `Read, Bash(git add:*, git commit:*)`.
///
/// Commas and whitespace separate tokens only outside parentheses.
pub fn split_tokens(raw: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;

    for ch in raw.chars() {
        match ch {
            '(' => {
                depth += 1;
                current.push(ch);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                current.push(ch);
            }
            c if depth == 0 && (c == ',' || c.is_whitespace()) => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }

    if !current.trim().is_empty() {
        tokens.push(current.trim().to_string());
    }

    tokens
}
