// SPDX-License-Identifier: MIT

//! Dynamic values shared by run scopes and the script engine

use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fmt;

/// A value held in a run scope or produced by an expression
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// Decimal literal kept as text, not yet typed as Int or Float
    Token(String),
    Mapping(BTreeMap<String, Value>),
    /// No value: unresolved attribute, missing key, or `null`
    #[default]
    Undefined,
}

impl Value {
    /// Create a decimal literal token
    pub fn token(text: impl Into<String>) -> Self {
        Self::Token(text.into())
    }

    /// Build a mapping from key/value pairs
    pub fn mapping<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Self::Mapping(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Name of the variant, used in diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Token(_) => "literal token",
            Value::Mapping(_) => "mapping",
            Value::Undefined => "undefined",
        }
    }

    /// Turn a literal token into an Int (no `.` in its text) or a Float.
    ///
    /// Tokens that do not parse, and every other variant, come back
    /// unchanged.
    pub fn normalize_token(self) -> Self {
        match self {
            Value::Token(text) => {
                let parsed = if text.contains('.') {
                    text.parse::<f64>().ok().map(Value::Float)
                } else {
                    text.parse::<i64>().ok().map(Value::Int)
                };
                parsed.unwrap_or(Value::Token(text))
            }
            other => other,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Convert to JSON for output. Tokens that read as numbers become
    /// JSON numbers, Undefined becomes null.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::Int(i) => JsonValue::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Value::String(s) => JsonValue::String(s.clone()),
            Value::Token(t) => serde_json::from_str::<serde_json::Number>(t)
                .map(JsonValue::Number)
                .unwrap_or_else(|_| JsonValue::String(t.clone())),
            Value::Mapping(m) => {
                JsonValue::Object(m.iter().map(|(k, v)| (k.clone(), v.to_json())).collect())
            }
            Value::Undefined => JsonValue::Null,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::String(s) => write!(f, "{:?}", s),
            Value::Token(t) => write!(f, "{}", t),
            Value::Mapping(m) => {
                write!(f, "{{")?;
                for (i, (k, v)) in m.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:?}: {}", k, v)?;
                }
                write!(f, "}}")
            }
            Value::Undefined => write!(f, "undefined"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(m: BTreeMap<String, Value>) -> Self {
        Value::Mapping(m)
    }
}
