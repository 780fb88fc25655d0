use super::{tools_value, Conversion, Converter};
use crate::artifact::ArtifactKind;
use crate::metadata::{self, compose};
use serde_yaml::Value;

impl Converter {
    /// Convert a skill's main file. Unparseable frontmatter leaves the text as is.
    pub fn convert_skill(&self, name: &str, text: &str) -> Conversion {
        let block = metadata::split(text);
        if block.is_salvaged() {
            tracing::warn!(skill = name, "skill frontmatter is not valid YAML; leaving it unchanged");
            return Conversion::unchanged(text);
        }

        let tools_field = ArtifactKind::Skill.tools_field();
        let tools = self.resolve_tools(ArtifactKind::Skill, &block);
        let mut fields: Vec<(String, Value)> = Vec::new();

        let name = block.scalar("name").unwrap_or_else(|| name.to_string());
        fields.push(("name".to_string(), Value::String(name)));

        if let Some(description) = block.get("description") {
            fields.push(("description".to_string(), description.clone()));
        }
        if let Some(original) = block.get(tools_field) {
            fields.push((tools_field.to_string(), tools_value(original, &tools.tools)));
        }

        let (body, normalized) = self.normalize_body(ArtifactKind::Skill, &block.body);

        Conversion {
            text: compose(&fields, &body),
            converted: true,
            tools,
            normalized,
        }
    }
}
