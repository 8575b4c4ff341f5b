// SPDX-License-Identifier: MIT

//! Embeddable expression engine
//!
//! Link expressions are compiled once into a [`CompiledExpression`] and
//! evaluated many times against a flat name → value [`Context`].
//! The language is small:
//! - literals: `10`, `10.5`, `'text'`, `"text"`, `true`, `false`, `null`
//! - `lookup("name")` reads `name` from the context
//! - `target["key"]` reads a key from a mapping
//! - `|| && == != < <= > >= contains + - * / % ! -` and the keyword forms
//!   `and`, `or`, `not`

mod ast;
mod evaluator;
mod lexer;
mod parser;

pub use ast::{BinaryOp, Expr, UnaryOp};
pub use evaluator::evaluate;
pub use parser::parse;

use std::collections::HashMap;
use std::fmt::Debug;

use crate::error::EngineError;
use crate::value::Value;

/// Values visible to an expression while it is evaluated
pub type Context = HashMap<String, Value>;

/// Compiles expression text into reusable compiled forms
pub trait ExpressionEngine: Send + Sync {
    /// Compile `text`, reporting syntax problems as errors
    fn compile(&self, text: &str) -> Result<Box<dyn CompiledExpression>, EngineError>;
}

/// An expression ready to run.
///
/// Implementations hold no mutable state, so one compiled expression can
/// be evaluated from many threads at once, each call with its own context.
pub trait CompiledExpression: Send + Sync + Debug {
    /// Evaluate against `ctx`
    fn evaluate(&self, ctx: &Context) -> Result<Value, EngineError>;

    /// Text the expression was compiled from
    fn source(&self) -> &str;
}

/// The built-in engine
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptEngine;

impl ScriptEngine {
    pub fn new() -> Self {
        Self
    }
}

impl ExpressionEngine for ScriptEngine {
    fn compile(&self, text: &str) -> Result<Box<dyn CompiledExpression>, EngineError> {
        let expr = parse(text)?;
        Ok(Box::new(Program {
            source: text.to_string(),
            expr,
        }))
    }
}

/// Parsed form produced by [`ScriptEngine`]
#[derive(Debug, Clone)]
pub struct Program {
    source: String,
    expr: Expr,
}

impl CompiledExpression for Program {
    fn evaluate(&self, ctx: &Context) -> Result<Value, EngineError> {
        evaluate(&self.expr, ctx)
    }

    fn source(&self) -> &str {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_and_evaluate() {
        let engine = ScriptEngine::new();
        let compiled = engine.compile(r#"lookup("n") * 2 == 8"#).unwrap();
        assert_eq!(compiled.source(), r#"lookup("n") * 2 == 8"#);

        let mut ctx = Context::new();
        ctx.insert("n".to_string(), Value::Int(4));
        assert_eq!(compiled.evaluate(&ctx), Ok(Value::Bool(true)));

        ctx.insert("n".to_string(), Value::Int(5));
        assert_eq!(compiled.evaluate(&ctx), Ok(Value::Bool(false)));
    }

    #[test]
    fn test_compile_error() {
        let engine = ScriptEngine::new();
        assert!(engine.compile("lookup(\"a\") >").is_err());
    }

    #[test]
    fn test_compiled_expression_is_shareable() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn CompiledExpression>();
        assert_send_sync::<Program>();
    }
}
