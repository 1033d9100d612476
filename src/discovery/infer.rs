//! Best-effort schema inference from an example tool call.
//!
//! Inference is deliberately shallow: array item types come from the first
//! element only and object members are not inspected. The result is a hint,
//! never a replacement for a real definition.

use serde_json::{Map, Value};

use crate::tool::{Property, PropertyType, ToolSchema};

/// Infers an `object` schema from the JSON-encoded `arguments` of a call.
///
/// Returns `None` when the arguments are not a JSON object.
pub fn infer_schema_from_arguments(arguments: &str) -> Option<ToolSchema> {
    let args: Map<String, Value> = serde_json::from_str(arguments).ok()?;

    let mut schema = ToolSchema::object();
    for (name, value) in &args {
        schema.properties.insert(name.clone(), infer_property(value));
    }
    Some(schema)
}

fn infer_property(value: &Value) -> Property {
    match value {
        Value::String(_) => Property::new(PropertyType::String),
        Value::Number(n) => {
            let whole = n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0);
            if whole {
                Property::new(PropertyType::Integer)
            } else {
                Property::new(PropertyType::Number)
            }
        }
        Value::Bool(_) => Property::new(PropertyType::Boolean),
        // An empty example array says nothing about its items.
        Value::Array(elements) => {
            Property::array_of(elements.first().map(infer_property).unwrap_or_default())
        }
        Value::Object(_) => Property::new(PropertyType::Object),
        Value::Null => Property::new(PropertyType::Null),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infers_primitive_types() {
        let schema = infer_schema_from_arguments(
            r#"{"city": "Oslo", "days": 3, "ratio": 0.5, "whole": 2.0, "metric": true, "cursor": null}"#,
        )
        .unwrap();

        let kind = |name: &str| schema.properties[name].kind.clone();
        assert_eq!(schema.schema_type, "object");
        assert_eq!(kind("city"), PropertyType::String);
        assert_eq!(kind("days"), PropertyType::Integer);
        assert_eq!(kind("ratio"), PropertyType::Number);
        assert_eq!(kind("whole"), PropertyType::Integer);
        assert_eq!(kind("metric"), PropertyType::Boolean);
        assert_eq!(kind("cursor"), PropertyType::Null);
        assert!(schema.required.is_empty());
    }

    #[test]
    fn test_array_items_come_from_first_element() {
        let schema = infer_schema_from_arguments(r#"{"ids": [1, "two", 3.5], "empty": []}"#).unwrap();

        let ids = &schema.properties["ids"];
        assert_eq!(ids.kind, PropertyType::Array);
        assert_eq!(ids.items.as_ref().unwrap().kind, PropertyType::Integer);

        let empty = &schema.properties["empty"];
        assert_eq!(empty.items.as_ref().unwrap().kind, PropertyType::Unset);
    }

    #[test]
    fn test_objects_are_not_recursed() {
        let schema = infer_schema_from_arguments(r#"{"filter": {"tag": "x", "limit": 3}}"#).unwrap();
        let filter = &schema.properties["filter"];
        assert_eq!(filter.kind, PropertyType::Object);
        assert!(filter.properties.is_empty());
    }

    #[test]
    fn test_non_object_arguments_yield_nothing() {
        assert!(infer_schema_from_arguments("[1, 2]").is_none());
        assert!(infer_schema_from_arguments("not json").is_none());
        assert!(infer_schema_from_arguments("").is_none());
    }
}
