// SPDX-License-Identifier: MIT

//! Run scopes
//!
//! This module provides:
//! - `Scope` - read access to the attributes of one run
//! - `RunScope` - in-memory scope with optional parent fallback
//! - `ScopeSchema` - typed attribute declarations a run starts from

mod schema;
mod store;

pub use schema::{AttrType, AttributeDef, ScopeSchema};
pub use store::RunScope;

use std::collections::HashMap;

use crate::value::Value;

/// Attribute lookup for one run
pub trait Scope: Send + Sync {
    /// Value of attribute `name`, `None` when the scope does not hold it
    fn get(&self, name: &str) -> Option<Value>;
}

impl Scope for HashMap<String, Value> {
    fn get(&self, name: &str) -> Option<Value> {
        HashMap::get(self, name).cloned()
    }
}
