//! Argument validation against a [`ToolSchema`].
//!
//! Checks run fail-fast in a fixed order: required fields, then unknown
//! fields (when `additionalProperties` is `false`), then each supplied
//! property recursively. Within a property an `enum` list, when present,
//! decides on its own: a listed value skips every other check.
//!
//! The `format` checks are shallow heuristics, not RFC validators.

use regex::Regex;
use serde_json::{Map, Value};
use once_cell::sync::Lazy;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::sync::{Mutex, PoisonError};

use super::ToolError;
use super::schema::{Property, PropertyType, ToolSchema};

static DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-(0[1-9]|1[0-2])-(0[1-9]|[12]\d|3[01])$").expect("valid date regex")
});

static TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([01]\d|2[0-3]):[0-5]\d:[0-5]\d$").expect("valid time regex")
});

static UUID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$")
        .expect("valid uuid regex")
});

/// Compiled `pattern` constraints, keyed by source text.
static PATTERNS: Lazy<Mutex<HashMap<String, Regex>>> = Lazy::new(|| Mutex::new(HashMap::new()));

/// Upper bound on cached patterns; the cache is emptied when it is reached.
const PATTERN_CACHE_LIMIT: usize = 256;

const URI_SCHEMES: [&str; 4] = ["http://", "https://", "ftp://", "file://"];

/// Tolerance used by the `multipleOf` check.
const MULTIPLE_OF_EPSILON: f64 = 1e-9;

/// A value that does not satisfy a tool's parameter contract.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Path of the offending field, e.g. `config.host` or `tags[2]`
    pub field: String,
    pub message: String,
    /// The rejected value, when one was supplied
    pub value: Option<Value>,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            value: None,
        }
    }

    pub fn with_value(mut self, value: &Value) -> Self {
        self.value = Some(value.clone());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "validation error for field '{}': {}",
            self.field, self.message
        )?;
        match &self.value {
            Some(Value::String(s)) => write!(f, " (value: {s})"),
            Some(value) => write!(f, " (value: {value})"),
            None => Ok(()),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validates argument maps against an optional schema.
///
/// Without a schema every argument map is accepted.
#[derive(Debug, Clone, Copy)]
pub struct Validator<'a> {
    schema: Option<&'a ToolSchema>,
}

impl<'a> Validator<'a> {
    pub fn new(schema: Option<&'a ToolSchema>) -> Self {
        Self { schema }
    }

    /// Validates `args`, returning the first violation found.
    pub fn validate(&self, args: &Map<String, Value>) -> Result<(), ValidationError> {
        let Some(schema) = self.schema else {
            return Ok(());
        };

        validate_members(
            "",
            args,
            &schema.properties,
            &schema.required,
            schema.additional_properties,
        )
    }
}

/// Decodes JSON-encoded call arguments into an argument map.
///
/// Blank input means no arguments. Anything that is not a JSON object is
/// rejected.
pub fn parse_arguments(raw: &str) -> Result<Map<String, Value>, ToolError> {
    if raw.trim().is_empty() {
        return Ok(Map::new());
    }
    serde_json::from_str(raw).map_err(|e| ToolError::InvalidArguments(e.to_string()))
}

/// Applies the object rules shared by the top-level schema and nested
/// `object` properties. `prefix` is empty at the top level.
fn validate_members(
    prefix: &str,
    args: &Map<String, Value>,
    properties: &BTreeMap<String, Property>,
    required: &[String],
    additional_properties: Option<bool>,
) -> Result<(), ValidationError> {
    for name in required {
        if !args.contains_key(name) {
            return Err(ValidationError::new(
                join_path(prefix, name),
                "required field is missing",
            ));
        }
    }

    if additional_properties == Some(false) {
        if let Some((key, value)) = args.iter().find(|(key, _)| !properties.contains_key(*key)) {
            return Err(
                ValidationError::new(join_path(prefix, key), "additional property is not allowed")
                    .with_value(value),
            );
        }
    }

    for (name, property) in properties {
        if let Some(value) = args.get(name) {
            let is_required = required.iter().any(|r| r == name);
            validate_property(&join_path(prefix, name), value, property, is_required)?;
        }
    }

    Ok(())
}

fn validate_property(
    field: &str,
    value: &Value,
    property: &Property,
    is_required: bool,
) -> Result<(), ValidationError> {
    if value.is_null() {
        // Null counts as absent for optional fields, whatever their type.
        if property.kind == PropertyType::Null || !is_required {
            return Ok(());
        }
        return Err(type_mismatch(field, &property.kind, value));
    }

    if !property.enum_values.is_empty() {
        if property.enum_values.iter().any(|allowed| values_equal(allowed, value)) {
            return Ok(());
        }
        return Err(ValidationError::new(
            field,
            format!(
                "value must be one of {}",
                Value::Array(property.enum_values.clone())
            ),
        )
        .with_value(value));
    }

    match &property.kind {
        PropertyType::String => validate_string(field, value, property),
        PropertyType::Number | PropertyType::Integer => validate_number(field, value, property),
        PropertyType::Boolean => match value {
            Value::Bool(_) => Ok(()),
            _ => Err(type_mismatch(field, &property.kind, value)),
        },
        PropertyType::Array => validate_array(field, value, property),
        PropertyType::Object => match value {
            Value::Object(members) => validate_members(
                field,
                members,
                &property.properties,
                &property.required,
                property.additional_properties,
            ),
            _ => Err(type_mismatch(field, &property.kind, value)),
        },
        // Non-null values were handled above.
        PropertyType::Null => Err(type_mismatch(field, &property.kind, value)),
        PropertyType::Unset => Ok(()),
        PropertyType::Unknown(kind) => Err(ValidationError::new(
            field,
            format!("unknown property type '{kind}'"),
        )),
    }
}

fn validate_string(field: &str, value: &Value, property: &Property) -> Result<(), ValidationError> {
    let Value::String(text) = value else {
        return Err(type_mismatch(field, &property.kind, value));
    };

    let length = text.chars().count();
    if let Some(min) = property.min_length {
        if length < min {
            return Err(ValidationError::new(
                field,
                format!("string length must be at least {min}"),
            )
            .with_value(value));
        }
    }
    if let Some(max) = property.max_length {
        if length > max {
            return Err(ValidationError::new(
                field,
                format!("string length must be at most {max}"),
            )
            .with_value(value));
        }
    }

    if let Some(pattern) = &property.pattern {
        let re = compiled_pattern(pattern).map_err(|e| {
            ValidationError::new(field, format!("invalid pattern '{pattern}': {e}"))
        })?;
        if !re.is_match(text) {
            return Err(ValidationError::new(
                field,
                format!("string does not match pattern '{pattern}'"),
            )
            .with_value(value));
        }
    }

    if let Some(format) = &property.format {
        if !matches_format(format, text) {
            return Err(ValidationError::new(field, format!("invalid {format} format"))
                .with_value(value));
        }
    }

    Ok(())
}

fn compiled_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    let mut cache = PATTERNS.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(re) = cache.get(pattern) {
        return Ok(re.clone());
    }
    let re = Regex::new(pattern)?;
    if cache.len() >= PATTERN_CACHE_LIMIT {
        cache.clear();
    }
    cache.insert(pattern.to_string(), re.clone());
    Ok(re)
}

/// Unknown formats are accepted.
fn matches_format(format: &str, text: &str) -> bool {
    match format {
        "email" => text.contains('@') && text.contains('.'),
        "uri" | "url" => URI_SCHEMES.iter().any(|scheme| text.starts_with(scheme)),
        "date" => DATE_RE.is_match(text),
        "time" => TIME_RE.is_match(text),
        "date-time" => text.contains('T'),
        "uuid" => UUID_RE.is_match(text),
        _ => true,
    }
}

fn validate_number(field: &str, value: &Value, property: &Property) -> Result<(), ValidationError> {
    let Some(number) = value.as_f64() else {
        return Err(type_mismatch(field, &property.kind, value));
    };

    if property.kind == PropertyType::Integer && number.fract() != 0.0 {
        return Err(ValidationError::new(field, "expected integer, got number").with_value(value));
    }

    if let Some(min) = property.minimum {
        if number < min {
            return Err(ValidationError::new(field, format!("value must be >= {min}"))
                .with_value(value));
        }
    }
    if let Some(max) = property.maximum {
        if number > max {
            return Err(ValidationError::new(field, format!("value must be <= {max}"))
                .with_value(value));
        }
    }
    if let Some(min) = property.exclusive_minimum {
        if number <= min {
            return Err(ValidationError::new(field, format!("value must be > {min}"))
                .with_value(value));
        }
    }
    if let Some(max) = property.exclusive_maximum {
        if number >= max {
            return Err(ValidationError::new(field, format!("value must be < {max}"))
                .with_value(value));
        }
    }

    if let Some(step) = property.multiple_of {
        if step > 0.0 {
            let quotient = number / step;
            if (quotient - quotient.round()).abs() > MULTIPLE_OF_EPSILON {
                return Err(ValidationError::new(
                    field,
                    format!("value must be a multiple of {step}"),
                )
                .with_value(value));
            }
        }
    }

    Ok(())
}

fn validate_array(field: &str, value: &Value, property: &Property) -> Result<(), ValidationError> {
    let Value::Array(elements) = value else {
        return Err(type_mismatch(field, &property.kind, value));
    };

    if let Some(min) = property.min_items {
        if elements.len() < min {
            return Err(ValidationError::new(
                field,
                format!("array must have at least {min} items"),
            )
            .with_value(value));
        }
    }
    if let Some(max) = property.max_items {
        if elements.len() > max {
            return Err(ValidationError::new(
                field,
                format!("array must have at most {max} items"),
            )
            .with_value(value));
        }
    }

    if property.unique_items == Some(true) {
        let mut seen = HashSet::with_capacity(elements.len());
        for (index, element) in elements.iter().enumerate() {
            if !seen.insert(element.to_string()) {
                return Err(ValidationError::new(
                    format!("{field}[{index}]"),
                    "array items must be unique",
                )
                .with_value(element));
            }
        }
    }

    if let Some(items) = &property.items {
        for (index, element) in elements.iter().enumerate() {
            validate_property(&format!("{field}[{index}]"), element, items, true)?;
        }
    }

    Ok(())
}

fn type_mismatch(field: &str, expected: &PropertyType, value: &Value) -> ValidationError {
    ValidationError::new(
        field,
        format!("expected {expected}, got {}", json_kind(value)),
    )
    .with_value(value)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Numbers compare by value so `2` matches `2.0`; anything else compares
/// structurally and then by its JSON text.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b || a.to_string() == b.to_string(),
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected an object, got {other}"),
        }
    }

    fn check(schema: &ToolSchema, cases: &[(&str, Value, bool)]) {
        let validator = Validator::new(Some(schema));
        for (name, input, want_err) in cases {
            let result = validator.validate(&args(input.clone()));
            assert_eq!(
                result.is_err(),
                *want_err,
                "case '{name}': got {result:?}"
            );
        }
    }

    fn property(kind: &str) -> Property {
        Property::new(kind)
    }

    #[test]
    fn test_string_constraints() {
        let schema = ToolSchema::object()
            .with_property(
                "text",
                Property {
                    min_length: Some(2),
                    max_length: Some(10),
                    ..property("string")
                },
            )
            .with_property(
                "email",
                Property {
                    format: Some("email".into()),
                    ..property("string")
                },
            )
            .with_property(
                "pattern",
                Property {
                    pattern: Some("^[A-Z]+$".into()),
                    ..property("string")
                },
            );

        check(
            &schema,
            &[
                (
                    "valid strings",
                    json!({"text": "hello", "email": "test@example.com", "pattern": "ABC"}),
                    false,
                ),
                ("text too short", json!({"text": "a"}), true),
                ("text too long", json!({"text": "this is way too long"}), true),
                ("invalid email", json!({"email": "not-an-email"}), true),
                ("pattern mismatch", json!({"pattern": "abc"}), true),
                ("wrong type", json!({"text": 123}), true),
            ],
        );
    }

    #[test]
    fn test_string_length_counts_characters() {
        let schema = ToolSchema::object().with_property(
            "word",
            Property {
                max_length: Some(3),
                ..property("string")
            },
        );
        check(&schema, &[("three chars", json!({"word": "äöü"}), false)]);
    }

    #[test]
    fn test_numeric_constraints() {
        let schema = ToolSchema::object()
            .with_property(
                "age",
                Property {
                    minimum: Some(0.0),
                    maximum: Some(150.0),
                    ..property("integer")
                },
            )
            .with_property(
                "score",
                Property {
                    minimum: Some(0.0),
                    maximum: Some(100.0),
                    multiple_of: Some(0.5),
                    ..property("number")
                },
            )
            .with_property(
                "temperature",
                Property {
                    exclusive_minimum: Some(-273.15),
                    exclusive_maximum: Some(1000.0),
                    ..property("number")
                },
            );

        check(
            &schema,
            &[
                (
                    "valid numbers",
                    json!({"age": 25, "score": 87.5, "temperature": 20.5}),
                    false,
                ),
                ("integer as whole float", json!({"age": 25.0}), false),
                ("integer as float", json!({"age": 25.5}), true),
                ("below minimum", json!({"age": -1}), true),
                ("above maximum", json!({"score": 101}), true),
                ("not multiple of", json!({"score": 87.3}), true),
                ("exclusive min violated", json!({"temperature": -273.15}), true),
                ("exclusive max violated", json!({"temperature": 1000}), true),
                ("string is not a number", json!({"score": "87"}), true),
            ],
        );
    }

    #[test]
    fn test_multiple_of_tolerates_float_error() {
        let schema = ToolSchema::object().with_property(
            "price",
            Property {
                multiple_of: Some(0.1),
                ..property("number")
            },
        );
        check(&schema, &[("0.3 is a multiple of 0.1", json!({"price": 0.3}), false)]);
    }

    #[test]
    fn test_boolean_is_strict() {
        let schema = ToolSchema::object().with_property("enabled", property("boolean"));
        check(
            &schema,
            &[
                ("valid true", json!({"enabled": true}), false),
                ("valid false", json!({"enabled": false}), false),
                ("wrong type", json!({"enabled": "true"}), true),
                ("number is not boolean", json!({"enabled": 1}), true),
            ],
        );
    }

    #[test]
    fn test_array_constraints() {
        let schema = ToolSchema::object()
            .with_property(
                "tags",
                Property {
                    min_items: Some(1),
                    max_items: Some(5),
                    unique_items: Some(true),
                    ..Property::array_of(property("string"))
                },
            )
            .with_property(
                "numbers",
                Property::array_of(Property {
                    minimum: Some(0.0),
                    ..property("number")
                }),
            );

        check(
            &schema,
            &[
                (
                    "valid arrays",
                    json!({"tags": ["a", "b", "c"], "numbers": [1.0, 2.0, 3.0]}),
                    false,
                ),
                ("empty array when min required", json!({"tags": []}), true),
                ("too many items", json!({"tags": ["a", "b", "c", "d", "e", "f"]}), true),
                ("duplicate items", json!({"tags": ["a", "b", "a"]}), true),
                ("wrong item type", json!({"tags": ["a", 123, "c"]}), true),
                ("item constraint violation", json!({"numbers": [1.0, -1.0, 3.0]}), true),
                ("not an array", json!({"tags": "a"}), true),
            ],
        );
    }

    #[test]
    fn test_array_errors_name_the_failing_element() {
        let schema = ToolSchema::object().with_property(
            "tags",
            Property {
                min_items: Some(1),
                ..Property::array_of(property("string"))
            },
        );
        let validator = Validator::new(Some(&schema));

        let err = validator.validate(&args(json!({"tags": []}))).unwrap_err();
        assert_eq!(err.field, "tags");
        assert_eq!(err.message, "array must have at least 1 items");

        let err = validator.validate(&args(json!({"tags": ["x", 1]}))).unwrap_err();
        assert_eq!(err.field, "tags[1]");
        assert_eq!(err.message, "expected string, got number");
        assert_eq!(err.value, Some(json!(1)));
    }

    #[test]
    fn test_nested_objects() {
        let config = Property {
            properties: BTreeMap::from([
                ("host".to_string(), property("string")),
                ("port".to_string(), property("integer")),
            ]),
            required: vec!["host".into()],
            additional_properties: Some(false),
            ..property("object")
        };
        let schema = ToolSchema::object().with_property("config", config);

        check(
            &schema,
            &[
                (
                    "valid object",
                    json!({"config": {"host": "localhost", "port": 8080}}),
                    false,
                ),
                ("missing required in nested", json!({"config": {"port": 8080}}), true),
                (
                    "additional property not allowed",
                    json!({"config": {"host": "localhost", "extra": "not allowed"}}),
                    true,
                ),
                ("wrong type", json!({"config": "not an object"}), true),
            ],
        );

        let validator = Validator::new(Some(&schema));
        let err = validator
            .validate(&args(json!({"config": {"host": 1}})))
            .unwrap_err();
        assert_eq!(err.field, "config.host");

        let err = validator
            .validate(&args(json!({"config": {"port": 1}})))
            .unwrap_err();
        assert_eq!(err.field, "config.host");
        assert_eq!(err.message, "required field is missing");

        let err = validator
            .validate(&args(json!({"config": {"host": "h", "extra": true}})))
            .unwrap_err();
        assert_eq!(err.field, "config.extra");
    }

    #[test]
    fn test_enum_membership() {
        let schema = ToolSchema::object()
            .with_property(
                "status",
                Property {
                    enum_values: vec![json!("pending"), json!("active"), json!("completed")],
                    ..property("string")
                },
            )
            .with_property(
                "priority",
                Property {
                    enum_values: vec![json!(1), json!(2), json!(3)],
                    ..property("integer")
                },
            );

        check(
            &schema,
            &[
                ("valid enum values", json!({"status": "active", "priority": 2}), false),
                ("float matches integer member", json!({"priority": 2.0}), false),
                ("invalid string enum", json!({"status": "invalid"}), true),
                ("invalid number enum", json!({"priority": 4}), true),
            ],
        );
    }

    #[test]
    fn test_enum_checked_before_type() {
        let schema = ToolSchema::object().with_property(
            "level",
            Property {
                enum_values: vec![json!(1), json!(2), json!(3)],
                ..property("integer")
            },
        );
        let err = Validator::new(Some(&schema))
            .validate(&args(json!({"level": "x"})))
            .unwrap_err();
        assert_eq!(err.field, "level");
        assert!(err.message.starts_with("value must be one of"), "{}", err.message);
    }

    #[test]
    fn test_enum_match_skips_other_checks() {
        let schema = ToolSchema::object().with_property(
            "code",
            Property {
                enum_values: vec![json!("x")],
                min_length: Some(5),
                ..property("string")
            },
        );
        check(&schema, &[("listed value wins", json!({"code": "x"}), false)]);
    }

    #[test]
    fn test_required_fields() {
        let schema = ToolSchema::object()
            .with_property("required1", property("string"))
            .with_property("required2", property("number"))
            .with_property("optional", property("boolean"))
            .with_required(["required1", "required2"]);

        check(
            &schema,
            &[
                ("all required present", json!({"required1": "value", "required2": 42}), false),
                (
                    "with optional",
                    json!({"required1": "value", "required2": 42, "optional": true}),
                    false,
                ),
                ("missing required1", json!({"required2": 42}), true),
                ("missing required2", json!({"required1": "value"}), true),
                ("missing both required", json!({"optional": true}), true),
            ],
        );
    }

    #[test]
    fn test_required_reported_before_shape() {
        let schema = ToolSchema::object()
            .with_property("a", property("string"))
            .with_required(["a"]);
        let err = Validator::new(Some(&schema)).validate(&Map::new()).unwrap_err();
        assert_eq!(err.field, "a");
        assert_eq!(err.message, "required field is missing");
        assert_eq!(err.value, None);
    }

    #[test]
    fn test_additional_properties() {
        let closed = ToolSchema::object()
            .with_property("known", property("string"))
            .with_additional_properties(false);
        check(
            &closed,
            &[
                ("only known", json!({"known": "value"}), false),
                ("unknown key", json!({"known": "value", "unknown": "extra"}), true),
            ],
        );

        let open = ToolSchema::object()
            .with_property("known", property("string"))
            .with_additional_properties(true);
        check(
            &open,
            &[("unknown key allowed", json!({"known": "value", "unknown": "extra"}), false)],
        );
    }

    #[test]
    fn test_null_handling() {
        let schema = ToolSchema::object()
            .with_property("nullable", property("null"))
            .with_property("optional", property("string"))
            .with_property("mandatory", property("string"))
            .with_required(["mandatory"]);

        check(
            &schema,
            &[
                ("valid null", json!({"mandatory": "m", "nullable": null}), false),
                ("non-null for null type", json!({"mandatory": "m", "nullable": "x"}), true),
                ("null for optional field", json!({"mandatory": "m", "optional": null}), false),
                ("null for required field", json!({"mandatory": null}), true),
            ],
        );
    }

    #[test]
    fn test_formats() {
        let schema = ToolSchema::object()
            .with_property("email", Property { format: Some("email".into()), ..property("string") })
            .with_property("url", Property { format: Some("url".into()), ..property("string") })
            .with_property("date", Property { format: Some("date".into()), ..property("string") })
            .with_property("time", Property { format: Some("time".into()), ..property("string") })
            .with_property("stamp", Property { format: Some("date-time".into()), ..property("string") })
            .with_property("uuid", Property { format: Some("uuid".into()), ..property("string") })
            .with_property("color", Property { format: Some("hex-color".into()), ..property("string") });

        check(
            &schema,
            &[
                (
                    "valid formats",
                    json!({
                        "email": "test@example.com",
                        "url": "https://example.com",
                        "date": "2024-01-15",
                        "time": "14:30:00",
                        "stamp": "2024-01-15T14:30:00Z",
                        "uuid": "550E8400-e29b-41d4-a716-446655440000",
                        "color": "anything goes"
                    }),
                    false,
                ),
                ("ftp url", json!({"url": "ftp://files.example.com"}), false),
                ("invalid email", json!({"email": "not-email"}), true),
                ("invalid url", json!({"url": "not a url"}), true),
                ("invalid date", json!({"date": "2024-13-40"}), true),
                ("invalid time", json!({"time": "25:00:00"}), true),
                ("date-time without T", json!({"stamp": "2024-01-15 14:30"}), true),
                ("invalid uuid", json!({"uuid": "not-a-uuid"}), true),
            ],
        );
    }

    #[test]
    fn test_untyped_and_unknown_types() {
        let schema = ToolSchema::object()
            .with_property("anything", Property::default())
            .with_property("decimal", property("decimal"));

        check(
            &schema,
            &[
                ("untyped accepts objects", json!({"anything": {"k": [1, 2]}}), false),
                ("unknown type rejects", json!({"decimal": 1.5}), true),
            ],
        );
    }

    #[test]
    fn test_patterns_compile_once_for_array_items() {
        let pattern = r"^sku-[0-9]{3}$";
        let mut item = property("string");
        item.pattern = Some(pattern.to_string());
        let schema = ToolSchema::object().with_property("skus", Property::array_of(item));

        check(
            &schema,
            &[
                ("all match", json!({"skus": ["sku-001", "sku-002", "sku-003"]}), false),
                ("second fails", json!({"skus": ["sku-001", "sku-2"]}), true),
            ],
        );

        let first = compiled_pattern(pattern).unwrap();
        let cached = PATTERNS.lock().unwrap().get(pattern).cloned().unwrap();
        assert_eq!(first.as_str(), cached.as_str());
        assert!(compiled_pattern("(unclosed").is_err());
        assert!(!PATTERNS.lock().unwrap().contains_key("(unclosed"));
    }

    #[test]
    fn test_no_schema_accepts_anything() {
        let validator = Validator::new(None);
        let result = validator.validate(&args(json!({
            "anything": "goes",
            "number": 123,
            "nested": {"key": "value"}
        })));
        assert!(result.is_ok());
    }

    #[test]
    fn test_error_display() {
        let err = ValidationError::new("test_field", "validation failed")
            .with_value(&json!("bad_value"));
        assert_eq!(
            err.to_string(),
            "validation error for field 'test_field': validation failed (value: bad_value)"
        );

        let err = ValidationError::new("other_field", "is required");
        assert_eq!(
            err.to_string(),
            "validation error for field 'other_field': is required"
        );

        let err = ValidationError::new("n", "too big").with_value(&json!(42));
        assert_eq!(err.to_string(), "validation error for field 'n': too big (value: 42)");
    }
}
