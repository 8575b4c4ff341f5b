//! Script expression evaluator

use std::cmp::Ordering;

use super::ast::{BinaryOp, Expr, UnaryOp};
use super::Context;
use crate::error::EngineError;
use crate::value::Value;

/// Evaluate an expression against a context
pub fn evaluate(expr: &Expr, ctx: &Context) -> Result<Value, EngineError> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Lookup(name) => Ok(ctx.get(name).cloned().unwrap_or_default()),
        Expr::Index { target, key } => {
            let target = evaluate(target, ctx)?;
            let key = evaluate(key, ctx)?;
            index(target, key)
        }
        Expr::Unary { op, operand } => {
            let operand = evaluate(operand, ctx)?;
            evaluate_unary(*op, operand)
        }
        Expr::Binary {
            op: BinaryOp::And,
            left,
            right,
        } => {
            if !require_bool(BinaryOp::And, evaluate(left, ctx)?)? {
                return Ok(Value::Bool(false));
            }
            Ok(Value::Bool(require_bool(BinaryOp::And, evaluate(right, ctx)?)?))
        }
        Expr::Binary {
            op: BinaryOp::Or,
            left,
            right,
        } => {
            if require_bool(BinaryOp::Or, evaluate(left, ctx)?)? {
                return Ok(Value::Bool(true));
            }
            Ok(Value::Bool(require_bool(BinaryOp::Or, evaluate(right, ctx)?)?))
        }
        Expr::Binary { op, left, right } => {
            let left = evaluate(left, ctx)?;
            let right = evaluate(right, ctx)?;
            evaluate_binary(*op, &left, &right)
        }
    }
}

fn require_bool(op: BinaryOp, value: Value) -> Result<bool, EngineError> {
    value.as_bool().ok_or_else(|| EngineError::UnaryMismatch {
        op: op.to_string(),
        operand: value.kind(),
    })
}

fn index(target: Value, key: Value) -> Result<Value, EngineError> {
    match (target, key) {
        // Absent stays absent
        (Value::Undefined, _) => Ok(Value::Undefined),
        (Value::Mapping(mut map), Value::String(k) | Value::Token(k)) => {
            Ok(map.remove(&k).unwrap_or_default())
        }
        (Value::Mapping(_), key) => Err(EngineError::OperandMismatch {
            op: "[]".to_string(),
            left: "mapping",
            right: key.kind(),
        }),
        (target, _) => Err(EngineError::NotIndexable {
            target: target.kind(),
        }),
    }
}

fn evaluate_unary(op: UnaryOp, operand: Value) -> Result<Value, EngineError> {
    match (op, operand) {
        (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
        (UnaryOp::Neg, Value::Int(i)) => i
            .checked_neg()
            .map(Value::Int)
            .ok_or_else(|| EngineError::Overflow { op: op.to_string() }),
        (UnaryOp::Neg, Value::Float(f)) => Ok(Value::Float(-f)),
        (op, operand) => Err(EngineError::UnaryMismatch {
            op: op.to_string(),
            operand: operand.kind(),
        }),
    }
}

fn evaluate_binary(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, EngineError> {
    match op {
        BinaryOp::Eq => Ok(Value::Bool(values_equal(left, right))),
        BinaryOp::NotEq => Ok(Value::Bool(!values_equal(left, right))),
        BinaryOp::Lt => compare(op, left, right, Ordering::is_lt),
        BinaryOp::Lte => compare(op, left, right, Ordering::is_le),
        BinaryOp::Gt => compare(op, left, right, Ordering::is_gt),
        BinaryOp::Gte => compare(op, left, right, Ordering::is_ge),
        BinaryOp::Contains => contains(left, right),
        BinaryOp::Add => match (left, right) {
            (Value::String(a), Value::String(b)) => Ok(Value::String(format!("{}{}", a, b))),
            _ => arithmetic(op, left, right, i64::checked_add, |a, b| a + b),
        },
        BinaryOp::Sub => arithmetic(op, left, right, i64::checked_sub, |a, b| a - b),
        BinaryOp::Mul => arithmetic(op, left, right, i64::checked_mul, |a, b| a * b),
        BinaryOp::Div => {
            if matches!(right, Value::Int(0)) && matches!(left, Value::Int(_)) {
                return Err(EngineError::DivisionByZero);
            }
            arithmetic(op, left, right, i64::checked_div, |a, b| a / b)
        }
        BinaryOp::Rem => {
            if matches!(right, Value::Int(0)) && matches!(left, Value::Int(_)) {
                return Err(EngineError::DivisionByZero);
            }
            arithmetic(op, left, right, i64::checked_rem, |a, b| a % b)
        }
        BinaryOp::And | BinaryOp::Or => Ok(Value::Bool(
            require_bool(op, left.clone())? && require_bool(op, right.clone())?,
        )),
    }
}

/// Structural equality; numbers compare across Int and Float, tokens
/// compare by text with tokens and strings
fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => (*a as f64) == *b,
        (Value::Token(a), Value::Token(b))
        | (Value::Token(a), Value::String(b))
        | (Value::String(b), Value::Token(a)) => a == b,
        (Value::Mapping(a), Value::Mapping(b)) => {
            a.len() == b.len()
                && a
                    .iter()
                    .all(|(k, v)| b.get(k).is_some_and(|w| values_equal(v, w)))
        }
        _ => left == right,
    }
}

fn compare<F>(op: BinaryOp, left: &Value, right: &Value, accept: F) -> Result<Value, EngineError>
where
    F: Fn(Ordering) -> bool,
{
    let ordering = match (left, right) {
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
        (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
        (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => return Err(mismatch(op, left, right)),
    };
    // NaN compares false both ways
    Ok(Value::Bool(ordering.is_some_and(accept)))
}

fn contains(left: &Value, right: &Value) -> Result<Value, EngineError> {
    match (left, right) {
        (Value::String(s), Value::String(sub)) => Ok(Value::Bool(s.contains(sub.as_str()))),
        (Value::Mapping(m), Value::String(key)) => Ok(Value::Bool(m.contains_key(key))),
        (Value::Undefined, _) => Ok(Value::Bool(false)),
        _ => Err(mismatch(BinaryOp::Contains, left, right)),
    }
}

fn arithmetic<I, F>(
    op: BinaryOp,
    left: &Value,
    right: &Value,
    int_op: I,
    float_op: F,
) -> Result<Value, EngineError>
where
    I: Fn(i64, i64) -> Option<i64>,
    F: Fn(f64, f64) -> f64,
{
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => int_op(*a, *b)
            .map(Value::Int)
            .ok_or_else(|| EngineError::Overflow { op: op.to_string() }),
        (Value::Int(a), Value::Float(b)) => Ok(Value::Float(float_op(*a as f64, *b))),
        (Value::Float(a), Value::Int(b)) => Ok(Value::Float(float_op(*a, *b as f64))),
        (Value::Float(a), Value::Float(b)) => Ok(Value::Float(float_op(*a, *b))),
        _ => Err(mismatch(op, left, right)),
    }
}

fn mismatch(op: BinaryOp, left: &Value, right: &Value) -> EngineError {
    EngineError::OperandMismatch {
        op: op.to_string(),
        left: left.kind(),
        right: right.kind(),
    }
}
