//! JSON schema builder for tool parameters.
//!
//! Every parameter is declared required; optional inputs are expressed with
//! sentinels such as `position: -1` so models always send every key.
//!
//! ```rust
//! use dtooling::{ParamType, ToolSchema};
//!
//! let definition = ToolSchema::new()
//!     .param("from_index", ParamType::Integer)
//!     .param("to_index", ParamType::Integer)
//!     .into_definition("reorder_slides", "Move a slide to a new position");
//!
//! let schema: serde_json::Value =
//!     serde_json::from_str(&definition.input_schema).expect("schema should be JSON");
//! assert_eq!(schema["required"], serde_json::json!(["from_index", "to_index"]));
//! assert_eq!(schema["properties"]["to_index"]["type"], "integer");
//! ```

use dprovider::ToolDefinition;
use serde_json::{Map, Value, json};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
    Integer,
    Number,
    Boolean,
    Object,
    Array,
}

impl ParamType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Param {
    name: String,
    param_type: ParamType,
    description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolSchema {
    params: Vec<Param>,
}

impl ToolSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, name: impl Into<String>, param_type: ParamType) -> Self {
        self.params.push(Param {
            name: name.into(),
            param_type,
            description: None,
        });
        self
    }

    pub fn described_param(
        mut self,
        name: impl Into<String>,
        param_type: ParamType,
        description: impl Into<String>,
    ) -> Self {
        self.params.push(Param {
            name: name.into(),
            param_type,
            description: Some(description.into()),
        });
        self
    }

    pub fn to_value(&self) -> Value {
        let mut properties = Map::new();
        for param in &self.params {
            let mut property = Map::new();
            property.insert("type".to_string(), json!(param.param_type.as_str()));
            if let Some(description) = &param.description {
                property.insert("description".to_string(), json!(description));
            }
            properties.insert(param.name.clone(), Value::Object(property));
        }

        let required = self
            .params
            .iter()
            .map(|param| json!(param.name))
            .collect::<Vec<_>>();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    pub fn into_definition(
        self,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> ToolDefinition {
        ToolDefinition {
            name: name.into(),
            description: description.into(),
            input_schema: self.to_value().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{ParamType, ToolSchema};

    #[test]
    fn empty_schema_is_an_object_without_properties() {
        assert_eq!(
            ToolSchema::new().to_value(),
            json!({"type": "object", "properties": {}, "required": []})
        );
    }

    #[test]
    fn descriptions_are_attached_only_when_given() {
        let schema = ToolSchema::new()
            .described_param("theme", ParamType::Object, "Colors and fonts")
            .param("dummy", ParamType::String)
            .to_value();

        assert_eq!(schema["properties"]["theme"]["description"], "Colors and fonts");
        assert!(schema["properties"]["dummy"].get("description").is_none());
        assert_eq!(schema["required"], json!(["theme", "dummy"]));
    }
}
