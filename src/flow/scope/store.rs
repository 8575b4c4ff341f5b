// SPDX-License-Identifier: MIT

//! Runtime attribute storage for one flow run

use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::Arc;

use super::schema::ScopeSchema;
use super::Scope;
use crate::error::ScopeError;
use crate::value::Value;

/// Attribute values of one run, optionally backed by a parent scope
#[derive(Debug, Clone, Default)]
pub struct RunScope {
    /// Attributes set on this scope
    values: HashMap<String, Value>,
    /// Consulted for names not set here
    parent: Option<Arc<RunScope>>,
}

impl RunScope {
    /// Create an empty scope
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty scope that falls back to `parent`
    pub fn with_parent(parent: Arc<RunScope>) -> Self {
        Self {
            values: HashMap::new(),
            parent: Some(parent),
        }
    }

    /// Create a scope holding the declared attributes of `schema`
    pub fn from_schema(schema: &ScopeSchema) -> Result<Self, ScopeError> {
        let mut scope = Self::new();
        for (name, def) in &schema.attributes {
            let value = match &def.value {
                Some(v) => def.attr_type.coerce(name, v)?,
                None => Value::Undefined,
            };
            scope.values.insert(name.clone(), value);
        }
        Ok(scope)
    }

    /// Set an attribute, replacing any previous value
    pub fn set(&mut self, name: &str, value: impl Into<Value>) {
        self.values.insert(name.to_string(), value.into());
    }

    /// Remove an attribute from this scope (the parent is untouched)
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.values.remove(name)
    }

    /// Get an attribute, looking through parents
    pub fn value(&self, name: &str) -> Option<&Value> {
        match self.values.get(name) {
            Some(v) => Some(v),
            None => self.parent.as_ref().and_then(|p| p.value(name)),
        }
    }

    /// Names set directly on this scope
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.values.keys()
    }

    /// Convert to a JSON object, parent attributes first
    pub fn to_json(&self) -> JsonValue {
        let mut object = match self.parent.as_ref().map(|p| p.to_json()) {
            Some(JsonValue::Object(map)) => map,
            _ => serde_json::Map::new(),
        };
        for (k, v) in &self.values {
            object.insert(k.clone(), v.to_json());
        }
        JsonValue::Object(object)
    }
}

impl Scope for RunScope {
    fn get(&self, name: &str) -> Option<Value> {
        self.value(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_scope() {
        let scope = RunScope::new();
        assert!(scope.get("anything").is_none());
    }

    #[test]
    fn test_set_and_get() {
        let mut scope = RunScope::new();
        scope.set("status", "first");
        assert_eq!(scope.get("status"), Some(Value::from("first")));

        scope.set("status", "second");
        assert_eq!(scope.get("status"), Some(Value::from("second")));

        assert_eq!(scope.remove("status"), Some(Value::from("second")));
        assert!(scope.get("status").is_none());
    }

    #[test]
    fn test_from_schema() {
        let schema = ScopeSchema::parse_yaml(
            r#"
            count: { type: integer, value: 0 }
            name: { type: string, value: default }
            unset: { type: string }
            "#,
        )
        .unwrap();
        let scope = RunScope::from_schema(&schema).unwrap();

        assert_eq!(scope.get("count"), Some(Value::Int(0)));
        assert_eq!(scope.get("name"), Some(Value::from("default")));
        // Declared without a value: present but undefined
        assert_eq!(scope.get("unset"), Some(Value::Undefined));
    }

    #[test]
    fn test_from_schema_coercion_error() {
        let schema =
            ScopeSchema::parse_yaml("count: { type: integer, value: lots }").unwrap();
        assert!(matches!(
            RunScope::from_schema(&schema),
            Err(ScopeError::Coercion { .. })
        ));
    }

    #[test]
    fn test_parent_fallback() {
        let mut parent = RunScope::new();
        parent.set("region", "eu");
        parent.set("tier", "gold");

        let mut child = RunScope::with_parent(Arc::new(parent));
        child.set("tier", "silver");

        assert_eq!(child.get("region"), Some(Value::from("eu")));
        assert_eq!(child.get("tier"), Some(Value::from("silver")));
        assert_eq!(child.keys().count(), 1);
    }

    #[test]
    fn test_to_json() {
        let mut parent = RunScope::new();
        parent.set("a", 1i64);
        parent.set("b", "parent");

        let mut scope = RunScope::with_parent(Arc::new(parent));
        scope.set("b", "hello");

        let json = scope.to_json();
        assert_eq!(json, json!({"a": 1, "b": "hello"}));
    }
}
