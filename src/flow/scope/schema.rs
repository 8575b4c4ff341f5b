// SPDX-License-Identifier: MIT

//! Declared scope attributes and their coercion into run values

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::ScopeError;
use crate::value::Value;

/// Attributes a run starts with
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ScopeSchema {
    /// Attribute definitions
    #[serde(flatten)]
    pub attributes: BTreeMap<String, AttributeDef>,
}

/// Definition of a single attribute
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AttributeDef {
    /// Declared type of the attribute
    #[serde(rename = "type", default)]
    pub attr_type: AttrType,
    /// Initial value
    #[serde(default)]
    pub value: Option<JsonValue>,
}

/// Supported attribute types
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AttrType {
    String,
    Integer,
    Number,
    Boolean,
    /// Mapping whose nested numbers stay literal tokens
    Object,
    /// Type taken from the value itself
    #[default]
    Any,
}

impl ScopeSchema {
    /// Load a schema from a YAML or JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScopeError> {
        let content = fs::read_to_string(path)?;
        Self::parse_yaml(&content)
    }

    /// Parse a schema from a YAML string
    pub fn parse_yaml(content: &str) -> Result<Self, ScopeError> {
        Ok(serde_yaml::from_str(content)?)
    }
}

impl AttrType {
    pub fn name(&self) -> &'static str {
        match self {
            AttrType::String => "string",
            AttrType::Integer => "integer",
            AttrType::Number => "number",
            AttrType::Boolean => "boolean",
            AttrType::Object => "object",
            AttrType::Any => "any",
        }
    }

    /// Coerce a declared JSON value into a run value of this type
    pub fn coerce(&self, name: &str, value: &JsonValue) -> Result<Value, ScopeError> {
        if value.is_null() {
            return Ok(Value::Undefined);
        }
        if value.is_array() {
            return Err(ScopeError::UnsupportedArray {
                name: name.to_string(),
            });
        }
        let fail = || ScopeError::coercion(name, self.name(), value);

        match (self, value) {
            (AttrType::String, JsonValue::String(s)) => Ok(Value::String(s.clone())),
            (AttrType::String, JsonValue::Number(n)) => Ok(Value::String(n.to_string())),
            (AttrType::String, JsonValue::Bool(b)) => Ok(Value::String(b.to_string())),

            (AttrType::Integer, JsonValue::Number(n)) => n.as_i64().map(Value::Int).ok_or_else(fail),
            (AttrType::Integer, JsonValue::String(s)) => {
                s.trim().parse::<i64>().map(Value::Int).map_err(|_| fail())
            }

            (AttrType::Number, JsonValue::Number(n)) => {
                n.as_f64().map(Value::Float).ok_or_else(fail)
            }
            (AttrType::Number, JsonValue::String(s)) => {
                s.trim().parse::<f64>().map(Value::Float).map_err(|_| fail())
            }

            (AttrType::Boolean, JsonValue::Bool(b)) => Ok(Value::Bool(*b)),
            (AttrType::Boolean, JsonValue::String(s)) => match s.trim() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => Err(fail()),
            },

            (AttrType::Object, JsonValue::Object(_)) => object_value(name, value),
            (AttrType::Object, JsonValue::String(s)) => {
                match serde_json::from_str::<JsonValue>(s) {
                    Ok(parsed @ JsonValue::Object(_)) => object_value(name, &parsed),
                    _ => Err(fail()),
                }
            }

            (AttrType::Any, JsonValue::Bool(b)) => Ok(Value::Bool(*b)),
            (AttrType::Any, JsonValue::Number(n)) => Ok(n
                .as_i64()
                .map(Value::Int)
                .or_else(|| n.as_f64().map(Value::Float))
                .unwrap_or_else(|| Value::token(n.to_string()))),
            (AttrType::Any, JsonValue::String(s)) => Ok(Value::String(s.clone())),
            (AttrType::Any, JsonValue::Object(_)) => object_value(name, value),

            _ => Err(fail()),
        }
    }
}

/// Convert untyped object content. Numbers are kept as decimal tokens
/// until something dereferences them.
fn object_value(name: &str, value: &JsonValue) -> Result<Value, ScopeError> {
    match value {
        JsonValue::Null => Ok(Value::Undefined),
        JsonValue::Bool(b) => Ok(Value::Bool(*b)),
        JsonValue::Number(n) => Ok(Value::token(n.to_string())),
        JsonValue::String(s) => Ok(Value::String(s.clone())),
        JsonValue::Array(_) => Err(ScopeError::UnsupportedArray {
            name: name.to_string(),
        }),
        JsonValue::Object(map) => {
            let mut entries = BTreeMap::new();
            for (k, v) in map {
                entries.insert(k.clone(), object_value(name, v)?);
            }
            Ok(Value::Mapping(entries))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scope_schema_deserialize() {
        let yaml = r#"
            status:
              type: string
              value: done
            retries:
              type: integer
              value: 3
            order:
              type: object
              value:
                total: 10.5
            anything:
              value: true
        "#;
        let schema = ScopeSchema::parse_yaml(yaml).unwrap();

        assert_eq!(schema.attributes.len(), 4);
        assert_eq!(schema.attributes["status"].attr_type, AttrType::String);
        assert_eq!(schema.attributes["retries"].value, Some(json!(3)));
        assert_eq!(schema.attributes["order"].attr_type, AttrType::Object);
        assert_eq!(schema.attributes["anything"].attr_type, AttrType::Any);
    }

    #[test]
    fn test_coerce_scalars() {
        assert_eq!(AttrType::Integer.coerce("n", &json!(10)).unwrap(), Value::Int(10));
        assert_eq!(AttrType::Integer.coerce("n", &json!(" 42 ")).unwrap(), Value::Int(42));
        assert_eq!(AttrType::Number.coerce("n", &json!(2)).unwrap(), Value::Float(2.0));
        assert_eq!(AttrType::Number.coerce("n", &json!("2.5")).unwrap(), Value::Float(2.5));
        assert_eq!(AttrType::Boolean.coerce("b", &json!("true")).unwrap(), Value::Bool(true));
        assert_eq!(AttrType::String.coerce("s", &json!(7)).unwrap(), Value::from("7"));
        assert_eq!(AttrType::Any.coerce("a", &json!(1.5)).unwrap(), Value::Float(1.5));
        assert_eq!(AttrType::Any.coerce("a", &json!(null)).unwrap(), Value::Undefined);
    }

    #[test]
    fn test_coerce_object_keeps_tokens() {
        let value = AttrType::Object
            .coerce("order", &json!({"total": 10.5, "count": 2, "meta": {"vip": true}}))
            .unwrap();
        assert_eq!(
            value,
            Value::mapping([
                ("count", Value::token("2")),
                ("meta", Value::mapping([("vip", Value::Bool(true))])),
                ("total", Value::token("10.5")),
            ])
        );
    }

    #[test]
    fn test_coerce_object_from_string() {
        let value = AttrType::Object
            .coerce("order", &json!(r#"{"total": 3}"#))
            .unwrap();
        assert_eq!(value, Value::mapping([("total", Value::token("3"))]));
    }

    #[test]
    fn test_coerce_failures() {
        assert!(matches!(
            AttrType::Integer.coerce("n", &json!(1.5)),
            Err(ScopeError::Coercion { expected: "integer", .. })
        ));
        assert!(matches!(
            AttrType::Boolean.coerce("b", &json!("yes")),
            Err(ScopeError::Coercion { .. })
        ));
        assert!(matches!(
            AttrType::Object.coerce("o", &json!("not json")),
            Err(ScopeError::Coercion { .. })
        ));
        assert!(matches!(
            AttrType::Any.coerce("list", &json!([1, 2])),
            Err(ScopeError::UnsupportedArray { .. })
        ));
        assert!(matches!(
            AttrType::Object.coerce("o", &json!({"items": [1]})),
            Err(ScopeError::UnsupportedArray { .. })
        ));
    }
}
