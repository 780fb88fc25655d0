use super::{Conversion, Converter};
use crate::artifact::ArtifactKind;
use crate::metadata::{self, compose};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_yaml::Value;

const DEFAULT_MODEL: &str = "inherit";

static ESCAPE_SEQUENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\[nrt]").unwrap());
static HTML_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<br\s*/?>").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static ROLE_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([A-Za-z][A-Za-z0-9_-]*): ").unwrap());

/// Flatten an agent description into one line of prose.
///
/// Literal `\n` escapes, `<br>` tags and real newlines become spaces, and
/// `Label: ` markers (`Context:`, `user:`, ...) become `Label - ` so the value
/// does not read as nested YAML.
pub fn normalize_description(description: &str) -> String {
    let text = ESCAPE_SEQUENCE.replace_all(description, " ");
    let text = HTML_BREAK.replace_all(&text, " ");
    let text = WHITESPACE.replace_all(&text, " ");
    let text = ROLE_LABEL.replace_all(&text, "${1} - ");
    text.trim().to_string()
}

impl Converter {
    /// Convert a Claude Code agent into a Droid definition.
    ///
    /// Salvaged frontmatter is used as is: informal agent descriptions are the
    /// main reason parsing fails, and they are rewritten to one line anyway.
    pub fn convert_droid(&self, name: &str, text: &str) -> Conversion {
        let block = metadata::split(text);
        let tools = self.resolve_tools(ArtifactKind::Droid, &block);

        let mut fields: Vec<(String, Value)> = Vec::new();

        let name = block.scalar("name").unwrap_or_else(|| name.to_string());
        fields.push(("name".to_string(), Value::String(name)));

        if let Some(description) = block.scalar("description") {
            fields.push((
                "description".to_string(),
                Value::String(normalize_description(&description)),
            ));
        }

        let model = match block.scalar("model") {
            Some(model) => self
                .catalog
                .map_model(&model)
                .map(str::to_string)
                .unwrap_or(model),
            None => DEFAULT_MODEL.to_string(),
        };
        fields.push(("model".to_string(), Value::String(model)));

        if block.has(ArtifactKind::Droid.tools_field()) {
            let list = tools.tools.iter().cloned().map(Value::String).collect();
            fields.push(("tools".to_string(), Value::Sequence(list)));
        }

        let (body, normalized) = self.normalize_body(ArtifactKind::Droid, &block.body);

        Conversion {
            text: compose(&fields, &body),
            converted: true,
            tools,
            normalized,
        }
    }
}
