//! Tool definitions and the JSON-Schema subset describing their parameters.

use regex::Regex;
use schemars::JsonSchema;
use schemars::r#gen::SchemaGenerator;
use schemars::schema::{RootSchema, Schema};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use super::ToolError;

/// A named capability that can be offered to an assistant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    /// Unique name of the tool
    pub name: String,
    /// What the tool does
    #[serde(default)]
    pub description: String,
    /// Parameter contract; `None` accepts any arguments
    #[serde(default)]
    pub parameters: Option<ToolSchema>,
}

/// Top-level parameter contract of a tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ToolSchema {
    /// Must be `"object"` or empty
    #[serde(rename = "type", default)]
    pub schema_type: String,
    #[serde(default)]
    pub properties: BTreeMap<String, Property>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<bool>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

/// The declared type of a [`Property`].
///
/// Unrecognized type strings are kept verbatim so that a definition using
/// them can still be loaded; validating a value against one fails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PropertyType {
    #[default]
    Unset,
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
    Null,
    Unknown(String),
}

impl PropertyType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Unset => "",
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
            Self::Null => "null",
            Self::Unknown(other) => other,
        }
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }
}

impl From<String> for PropertyType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "" => Self::Unset,
            "string" => Self::String,
            "number" => Self::Number,
            "integer" => Self::Integer,
            "boolean" => Self::Boolean,
            "array" => Self::Array,
            "object" => Self::Object,
            "null" => Self::Null,
            _ => Self::Unknown(value),
        }
    }
}

impl From<&str> for PropertyType {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<PropertyType> for String {
    fn from(value: PropertyType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl JsonSchema for PropertyType {
    fn schema_name() -> String {
        "PropertyType".to_string()
    }

    fn json_schema(generator: &mut SchemaGenerator) -> Schema {
        String::json_schema(generator)
    }
}

/// A node of the parameter contract. Nests through `items` and `properties`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    #[serde(rename = "type", default, skip_serializing_if = "PropertyType::is_unset")]
    pub kind: PropertyType,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusive_maximum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Property>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_items: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_items: Option<bool>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Property>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<bool>,
}

impl Tool {
    /// Creates a tool without a parameter contract.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: None,
        }
    }

    /// Attaches a parameter contract.
    pub fn with_parameters(mut self, parameters: ToolSchema) -> Self {
        self.parameters = Some(parameters);
        self
    }

    /// Checks that the definition is well formed.
    ///
    /// A tool needs a non-empty name, and its schema must be of type
    /// `object` (or untyped), only require declared properties, and contain
    /// only well-formed properties.
    pub fn validate(&self) -> Result<(), ToolError> {
        if self.name.is_empty() {
            return Err(ToolError::InvalidDefinition {
                tool: String::new(),
                reason: "tool name cannot be empty".to_string(),
            });
        }

        if let Some(schema) = &self.parameters {
            schema
                .validate()
                .map_err(|reason| ToolError::InvalidDefinition {
                    tool: self.name.clone(),
                    reason,
                })?;
        }

        Ok(())
    }
}

impl ToolSchema {
    /// An empty `object` schema.
    pub fn object() -> Self {
        Self {
            schema_type: "object".to_string(),
            ..Self::default()
        }
    }

    pub fn with_property(mut self, name: impl Into<String>, property: Property) -> Self {
        self.properties.insert(name.into(), property);
        self
    }

    pub fn with_required<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_additional_properties(mut self, allowed: bool) -> Self {
        self.additional_properties = Some(allowed);
        self
    }

    fn validate(&self) -> Result<(), String> {
        if !self.schema_type.is_empty() && self.schema_type != "object" {
            return Err(format!(
                "schema type must be 'object', got '{}'",
                self.schema_type
            ));
        }

        check_required_declared("", &self.required, &self.properties)?;

        for (name, property) in &self.properties {
            property.validate(name)?;
        }

        Ok(())
    }
}

impl Property {
    pub fn new(kind: impl Into<PropertyType>) -> Self {
        Self {
            kind: kind.into(),
            ..Self::default()
        }
    }

    /// An `array` property whose elements follow `items`.
    pub fn array_of(items: Property) -> Self {
        Self {
            kind: PropertyType::Array,
            items: Some(Box::new(items)),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    fn validate(&self, path: &str) -> Result<(), String> {
        if let (Some(min), Some(max)) = (self.min_length, self.max_length) {
            if min > max {
                return Err(format!(
                    "property '{path}': minLength {min} exceeds maxLength {max}"
                ));
            }
        }

        if let (Some(min), Some(max)) = (self.minimum, self.maximum) {
            if min > max {
                return Err(format!(
                    "property '{path}': minimum {min} exceeds maximum {max}"
                ));
            }
        }

        if let (Some(min), Some(max)) = (self.min_items, self.max_items) {
            if min > max {
                return Err(format!(
                    "property '{path}': minItems {min} exceeds maxItems {max}"
                ));
            }
        }

        if let Some(step) = self.multiple_of {
            if step <= 0.0 || !step.is_finite() {
                return Err(format!(
                    "property '{path}': multipleOf must be a positive number"
                ));
            }
        }

        if let Some(pattern) = &self.pattern {
            Regex::new(pattern)
                .map_err(|e| format!("property '{path}': invalid pattern: {e}"))?;
        }

        match (&self.kind, &self.items) {
            (PropertyType::Array, None) => {
                return Err(format!("property '{path}': array type requires items"));
            }
            (_, Some(items)) => items.validate(&format!("{path}[]"))?,
            _ => {}
        }

        check_required_declared(path, &self.required, &self.properties)?;

        for (name, property) in &self.properties {
            property.validate(&format!("{path}.{name}"))?;
        }

        Ok(())
    }
}

fn check_required_declared(
    path: &str,
    required: &[String],
    properties: &BTreeMap<String, Property>,
) -> Result<(), String> {
    for name in required {
        if !properties.contains_key(name) {
            return Err(if path.is_empty() {
                format!("required property '{name}' is not defined")
            } else {
                format!("property '{path}': required property '{name}' is not defined")
            });
        }
    }
    Ok(())
}

/// JSON Schema describing the tool-definition wire format.
pub fn tool_definition_schema() -> RootSchema {
    schemars::schema_for!(Vec<Tool>)
}
