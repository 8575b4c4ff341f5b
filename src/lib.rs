// SPDX-License-Identifier: MIT

//! Conditional links for flow graphs
//!
//! - [`script`] - the expression engine link expressions compile to
//! - [`flow`] - flow definitions, run scopes and the link gate
//! - [`error`] - error types
//! - [`value`] - dynamic values shared by both

pub mod error;
pub mod flow;
pub mod script;
pub mod value;

pub use error::{DefinitionError, EngineError, LinkExprError, ScopeError};
pub use flow::definition::{FlowDefinition, FlowLoader, LinkDefinition, LinkId, LinkType};
pub use flow::linkexpr::{LinkExprRegistry, LinkGate};
pub use flow::scope::{RunScope, Scope, ScopeSchema};
pub use flow::Diagnostics;
pub use script::{CompiledExpression, ExpressionEngine, ScriptEngine};
pub use value::Value;
