//! Operator semantics over concrete values.
//!
//! Dispatch is a static table from operator symbol to a function over value
//! pairs; the evaluator looks operators up here after it has dealt with
//! unknown operands. The functions never see an [`ValueKind::Unknown`] and
//! report failures as [`OpError`] signals, which the evaluator turns into
//! spanned diagnostics.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use thiserror::Error;

use crate::ast::{BinaryOp, UnaryOp};
use crate::value::{Value, ValueKind};

/// Failure signals raised by operator functions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OpError {
    #[error("unsupported operand types")]
    Unsupported,
    #[error("division by zero")]
    DivisionByZero,
    #[error("integer overflow")]
    Overflow,
}

pub type BinaryFn = fn(&Value, &Value) -> Result<Value, OpError>;
pub type UnaryFn = fn(&Value) -> Result<Value, OpError>;

/// Looks up the implementation of a binary operator.
pub fn binary_fn(op: BinaryOp) -> Option<BinaryFn> {
    BINARY_OPS.get(&op).copied()
}

/// Looks up the implementation of a unary operator.
pub fn unary_fn(op: UnaryOp) -> Option<UnaryFn> {
    UNARY_OPS.get(&op).copied()
}

static BINARY_OPS: Lazy<HashMap<BinaryOp, BinaryFn>> = Lazy::new(|| {
    let mut table: HashMap<BinaryOp, BinaryFn> = HashMap::new();
    table.insert(BinaryOp::Add, add);
    table.insert(BinaryOp::Sub, sub);
    table.insert(BinaryOp::Mul, mul);
    table.insert(BinaryOp::Div, div);
    table.insert(BinaryOp::Mod, rem);
    table.insert(BinaryOp::Eq, eq);
    table.insert(BinaryOp::NotEq, not_eq);
    table.insert(BinaryOp::Lt, |a, b| compare(a, b, |ord| ord.is_lt()));
    table.insert(BinaryOp::Gt, |a, b| compare(a, b, |ord| ord.is_gt()));
    table.insert(BinaryOp::LtEq, |a, b| compare(a, b, |ord| ord.is_le()));
    table.insert(BinaryOp::GtEq, |a, b| compare(a, b, |ord| ord.is_ge()));
    table.insert(BinaryOp::And, and);
    table.insert(BinaryOp::Or, or);
    table
});

static UNARY_OPS: Lazy<HashMap<UnaryOp, UnaryFn>> = Lazy::new(|| {
    let mut table: HashMap<UnaryOp, UnaryFn> = HashMap::new();
    table.insert(UnaryOp::Neg, neg);
    table.insert(UnaryOp::Not, not);
    table
});

fn add(left: &Value, right: &Value) -> Result<Value, OpError> {
    match (left.kind(), right.kind()) {
        (ValueKind::Int(a), ValueKind::Int(b)) => {
            a.checked_add(*b).map(Value::int).ok_or(OpError::Overflow)
        }
        (ValueKind::Int(a), ValueKind::Float(b)) => Ok(Value::float(*a as f64 + b)),
        (ValueKind::Float(a), ValueKind::Int(b)) => Ok(Value::float(a + *b as f64)),
        (ValueKind::Float(a), ValueKind::Float(b)) => Ok(Value::float(a + b)),
        (ValueKind::String(a), ValueKind::String(b)) => {
            Ok(Value::string(format!("{a}{b}")))
        }
        _ => Err(OpError::Unsupported),
    }
}

fn sub(left: &Value, right: &Value) -> Result<Value, OpError> {
    match (left.kind(), right.kind()) {
        (ValueKind::Int(a), ValueKind::Int(b)) => {
            a.checked_sub(*b).map(Value::int).ok_or(OpError::Overflow)
        }
        (ValueKind::Int(a), ValueKind::Float(b)) => Ok(Value::float(*a as f64 - b)),
        (ValueKind::Float(a), ValueKind::Int(b)) => Ok(Value::float(a - *b as f64)),
        (ValueKind::Float(a), ValueKind::Float(b)) => Ok(Value::float(a - b)),
        _ => Err(OpError::Unsupported),
    }
}

fn mul(left: &Value, right: &Value) -> Result<Value, OpError> {
    match (left.kind(), right.kind()) {
        (ValueKind::Int(a), ValueKind::Int(b)) => {
            a.checked_mul(*b).map(Value::int).ok_or(OpError::Overflow)
        }
        (ValueKind::Int(a), ValueKind::Float(b)) => Ok(Value::float(*a as f64 * b)),
        (ValueKind::Float(a), ValueKind::Int(b)) => Ok(Value::float(a * *b as f64)),
        (ValueKind::Float(a), ValueKind::Float(b)) => Ok(Value::float(a * b)),
        (ValueKind::String(a), ValueKind::Int(b)) => {
            let count = usize::try_from(*b).unwrap_or(0);
            Ok(Value::string(a.repeat(count)))
        }
        _ => Err(OpError::Unsupported),
    }
}

fn div(left: &Value, right: &Value) -> Result<Value, OpError> {
    let (a, b) = numeric_pair(left, right).ok_or(OpError::Unsupported)?;
    if b == 0.0 {
        return Err(OpError::DivisionByZero);
    }
    Ok(Value::float(a / b))
}

// `%` is floor-modulo: the result's sign follows the divisor.
fn rem(left: &Value, right: &Value) -> Result<Value, OpError> {
    match (left.kind(), right.kind()) {
        (ValueKind::Int(a), ValueKind::Int(b)) => {
            if *b == 0 {
                return Err(OpError::DivisionByZero);
            }
            let r = a.checked_rem(*b).ok_or(OpError::Overflow)?;
            Ok(Value::int(if r != 0 && (r < 0) != (*b < 0) {
                r + b
            } else {
                r
            }))
        }
        _ => {
            let (a, b) = numeric_pair(left, right).ok_or(OpError::Unsupported)?;
            if b == 0.0 {
                return Err(OpError::DivisionByZero);
            }
            let r = a % b;
            Ok(Value::float(if r != 0.0 && (r < 0.0) != (b < 0.0) {
                r + b
            } else {
                r
            }))
        }
    }
}

fn eq(left: &Value, right: &Value) -> Result<Value, OpError> {
    Ok(Value::bool(values_equal(left, right)))
}

fn not_eq(left: &Value, right: &Value) -> Result<Value, OpError> {
    Ok(Value::bool(!values_equal(left, right)))
}

/// Equality across any pair of concrete values. Different types compare
/// unequal, except Int/Float which compare numerically.
pub fn values_equal(left: &Value, right: &Value) -> bool {
    match (left.kind(), right.kind()) {
        (ValueKind::Int(a), ValueKind::Float(b)) => *a as f64 == *b,
        (ValueKind::Float(a), ValueKind::Int(b)) => *a == *b as f64,
        _ => left == right,
    }
}

fn compare(
    left: &Value,
    right: &Value,
    accept: fn(std::cmp::Ordering) -> bool,
) -> Result<Value, OpError> {
    let (a, b) = numeric_pair(left, right).ok_or(OpError::Unsupported)?;
    let ordering = a.partial_cmp(&b).ok_or(OpError::Unsupported)?;
    Ok(Value::bool(accept(ordering)))
}

fn and(left: &Value, right: &Value) -> Result<Value, OpError> {
    match (left.kind(), right.kind()) {
        (ValueKind::Bool(a), ValueKind::Bool(b)) => Ok(Value::bool(*a && *b)),
        _ => Err(OpError::Unsupported),
    }
}

fn or(left: &Value, right: &Value) -> Result<Value, OpError> {
    match (left.kind(), right.kind()) {
        (ValueKind::Bool(a), ValueKind::Bool(b)) => Ok(Value::bool(*a || *b)),
        _ => Err(OpError::Unsupported),
    }
}

fn neg(value: &Value) -> Result<Value, OpError> {
    match value.kind() {
        ValueKind::Int(raw) => raw.checked_neg().map(Value::int).ok_or(OpError::Overflow),
        ValueKind::Float(raw) => Ok(Value::float(-raw)),
        _ => Err(OpError::Unsupported),
    }
}

fn not(value: &Value) -> Result<Value, OpError> {
    match value.kind() {
        ValueKind::Bool(raw) => Ok(Value::bool(!raw)),
        _ => Err(OpError::Unsupported),
    }
}

fn numeric_pair(left: &Value, right: &Value) -> Option<(f64, f64)> {
    let as_f64 = |value: &Value| match value.kind() {
        ValueKind::Int(raw) => Some(*raw as f64),
        ValueKind::Float(raw) => Some(*raw),
        _ => None,
    };
    Some((as_f64(left)?, as_f64(right)?))
}
