// SPDX-License-Identifier: MIT

//! Abstract Syntax Tree for script expressions

use crate::value::Value;

/// A script expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Literal value (`null` is `Value::Undefined`)
    Literal(Value),
    /// `lookup("name")`: read `name` from the evaluation context
    Lookup(String),
    /// `target[key]`
    Index { target: Box<Expr>, key: Box<Expr> },
    /// Prefix operator
    Unary { op: UnaryOp, operand: Box<Expr> },
    /// Infix operator
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

/// Prefix operators
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnaryOp {
    /// `!` or `not`
    Not,
    /// `-`
    Neg,
}

/// Infix operators
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    NotEq,
    Lt,
    Lte,
    Gt,
    Gte,
    /// Substring or mapping key membership
    Contains,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl Expr {
    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }
}

impl std::fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnaryOp::Not => write!(f, "!"),
            UnaryOp::Neg => write!(f, "-"),
        }
    }
}

impl std::fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BinaryOp::Or => write!(f, "||"),
            BinaryOp::And => write!(f, "&&"),
            BinaryOp::Eq => write!(f, "=="),
            BinaryOp::NotEq => write!(f, "!="),
            BinaryOp::Lt => write!(f, "<"),
            BinaryOp::Lte => write!(f, "<="),
            BinaryOp::Gt => write!(f, ">"),
            BinaryOp::Gte => write!(f, ">="),
            BinaryOp::Contains => write!(f, "contains"),
            BinaryOp::Add => write!(f, "+"),
            BinaryOp::Sub => write!(f, "-"),
            BinaryOp::Mul => write!(f, "*"),
            BinaryOp::Div => write!(f, "/"),
            BinaryOp::Rem => write!(f, "%"),
        }
    }
}
