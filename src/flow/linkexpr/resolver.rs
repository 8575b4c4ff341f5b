// SPDX-License-Identifier: MIT

//! Resolves attribute references against a run scope

use crate::error::LinkExprError;
use crate::flow::diagnostics::Diagnostics;
use crate::flow::scope::Scope;
use crate::value::Value;

/// Split `name` at the first `.` into the scope attribute and one path
/// segment. An empty segment (`name.`) counts as no path.
pub fn split_path(name: &str) -> (&str, Option<&str>) {
    match name.split_once('.') {
        Some((head, path)) if !path.is_empty() => (head, Some(path)),
        Some((head, _)) => (head, None),
        None => (name, None),
    }
}

/// Resolve `name` (`attr` or `attr.key`) against `scope`.
///
/// A top-level attribute is returned exactly as the scope holds it. A
/// value read through a path segment has its literal token normalized to
/// Int or Float. Reading a path from a value that is not a mapping is a
/// [`LinkExprError::ResolutionTypeMismatch`].
pub fn try_resolve(name: &str, scope: &dyn Scope) -> Result<Option<Value>, LinkExprError> {
    let (head, path) = split_path(name);
    let Some(value) = scope.get(head) else {
        return Ok(None);
    };
    let Some(path) = path else {
        return Ok(Some(value));
    };

    match value {
        Value::Mapping(mut map) => Ok(map.remove(path).map(Value::normalize_token)),
        Value::Undefined => Ok(None),
        other => Err(LinkExprError::ResolutionTypeMismatch {
            attribute: name.to_string(),
            path: path.to_string(),
            found: other.kind(),
        }),
    }
}

/// Like [`try_resolve`], reporting a type mismatch and treating it as absent
pub fn resolve(name: &str, scope: &dyn Scope, diagnostics: &Diagnostics) -> Option<Value> {
    match try_resolve(name, scope) {
        Ok(value) => value,
        Err(err) => {
            diagnostics.warn(format_args!("{}; treating it as undefined", err));
            None
        }
    }
}
