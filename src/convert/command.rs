use super::{Conversion, Converter};
use crate::artifact::ArtifactKind;
use crate::metadata::{self, compose};
use serde_yaml::Value;

impl Converter {
    /// Convert a slash command. Unparseable frontmatter leaves the text as is.
    pub fn convert_command(&self, text: &str) -> Conversion {
        let block = metadata::split(text);
        if block.is_salvaged() {
            tracing::warn!("command frontmatter is not valid YAML; leaving it unchanged");
            return Conversion::unchanged(text);
        }

        let tools_field = ArtifactKind::Command.tools_field();
        let tools = self.resolve_tools(ArtifactKind::Command, &block);
        let mut fields: Vec<(String, Value)> = Vec::new();

        if let Some(description) = block.get("description") {
            fields.push(("description".to_string(), description.clone()));
        }
        if let Some(hint) = block.get("argument-hint") {
            fields.push(("argument-hint".to_string(), argument_hint(hint)));
        }
        if block.has(tools_field) {
            fields.push((
                tools_field.to_string(),
                Value::String(tools.tools.join(", ")),
            ));
        }

        let (body, normalized) = self.normalize_body(ArtifactKind::Command, &block.body);

        Conversion {
            text: compose(&fields, &body),
            converted: true,
            tools,
            normalized,
        }
    }
}

/// `argument-hint: [message]` loads as a one-item list; turn it back into the
/// hint text the author wrote.
fn argument_hint(value: &Value) -> Value {
    match value {
        Value::Sequence(items) => {
            let parts: Vec<String> = items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    Value::Bool(b) => Some(b.to_string()),
                    _ => None,
                })
                .collect();
            Value::String(format!("[{}]", parts.join(", ")))
        }
        other => other.clone(),
    }
}
