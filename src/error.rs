// SPDX-License-Identifier: MIT

//! Typed error handling for linkexpr-rs
//!
//! Every failure the link-expression core can observe is one of these
//! variants. None of them is fatal to a flow run: the gate converts them
//! into a non-firing decision.

use thiserror::Error;

use crate::flow::definition::LinkId;

/// Errors raised while compiling or evaluating a script expression
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EngineError {
    /// Unexpected character in the source text
    #[error("unexpected character '{ch}' at position {position}")]
    UnexpectedChar { ch: char, position: usize },

    /// String literal without a closing quote
    #[error("unterminated string literal starting at position {position}")]
    UnterminatedString { position: usize },

    /// Numeric literal that does not fit its type
    #[error("invalid number literal '{text}' at position {position}")]
    InvalidNumber { text: String, position: usize },

    /// Parser met a token it did not expect
    #[error("syntax error at position {position}: {message}")]
    Syntax { message: String, position: usize },

    /// Expression nests deeper than the parser accepts
    #[error("expression nested too deeply at position {position}")]
    TooDeep { position: usize },

    /// Call to a function the engine does not provide
    #[error("unknown function '{name}' at position {position}")]
    UnknownFunction { name: String, position: usize },

    /// Operator applied to operands of the wrong kind
    #[error("cannot apply '{op}' to {left} and {right}")]
    OperandMismatch {
        op: String,
        left: &'static str,
        right: &'static str,
    },

    /// Unary operator applied to an operand of the wrong kind
    #[error("cannot apply '{op}' to {operand}")]
    UnaryMismatch { op: String, operand: &'static str },

    /// Index applied to something that is not a mapping
    #[error("cannot index into {target}")]
    NotIndexable { target: &'static str },

    /// Integer division or remainder by zero
    #[error("division by zero")]
    DivisionByZero,

    /// Integer arithmetic overflowed
    #[error("integer overflow in '{op}'")]
    Overflow { op: String },
}

/// Failures of the link-expression core, one per kind of problem a
/// conditional link can run into
#[derive(Debug, Error)]
pub enum LinkExprError {
    /// Link expression did not compile
    #[error("link {link}: expression '{text}' failed to compile: {source}")]
    Compile {
        link: LinkId,
        text: String,
        #[source]
        source: EngineError,
    },

    /// Evaluation requested for a link with no compiled expression
    #[error("link {link}: no compiled expression for '{text}'")]
    MissingEntry { link: LinkId, text: String },

    /// Path dereference on a value that is not a mapping
    #[error("attribute '{attribute}': cannot read path '{path}' from {found}")]
    ResolutionTypeMismatch {
        attribute: String,
        path: String,
        found: &'static str,
    },

    /// Engine failed while evaluating
    #[error("link {link}: evaluation failed: {source}")]
    Eval {
        link: LinkId,
        #[source]
        source: EngineError,
    },

    /// Expression produced something other than a boolean
    #[error("link {link}: expression produced {found}, expected a boolean")]
    NonBoolean { link: LinkId, found: &'static str },
}

/// Problems in a flow definition
#[derive(Debug, Error)]
pub enum DefinitionError {
    /// Two links share an identity
    #[error("duplicate link id: {0}")]
    DuplicateLink(LinkId),

    /// Two nodes share an identity
    #[error("duplicate node id: {0}")]
    DuplicateNode(String),

    /// Link endpoint does not name a node of the flow
    #[error("link {link} references unknown node '{node}'")]
    UnknownNode { link: LinkId, node: String },

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// YAML (or JSON) parsing errors
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

/// Problems building a run scope from declared attributes
#[derive(Debug, Error)]
pub enum ScopeError {
    /// Declared value could not be coerced to its declared type
    #[error("attribute '{name}': cannot coerce {value} to {expected}")]
    Coercion {
        name: String,
        expected: &'static str,
        value: String,
    },

    /// Arrays have no scope representation
    #[error("attribute '{name}': arrays are not supported")]
    UnsupportedArray { name: String },

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// YAML (or JSON) parsing errors
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl ScopeError {
    /// Create a coercion error
    pub fn coercion(
        name: impl Into<String>,
        expected: &'static str,
        value: impl std::fmt::Display,
    ) -> Self {
        Self::Coercion {
            name: name.into(),
            expected,
            value: value.to_string(),
        }
    }
}
