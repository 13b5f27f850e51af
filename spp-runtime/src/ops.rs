// Copyright 2026 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Operators of the expression language, evaluated over [`Value`].
//!
//! Booleans take part in arithmetic as the integers 0 and 1. Mixed
//! integer and float operands are promoted to float. Integer
//! division and remainder round toward negative infinity.
//! The logical operators `&&` and `||` are not listed here: generated
//! code evaluates them inline to preserve short-circuiting.

use crate::{DecodeError, Result, Value};
use std::cmp::Ordering;

#[derive(Debug, Copy, Clone, PartialEq)]
enum Number {
    Int(i128),
    Float(f64),
}

fn number(value: &Value) -> Option<Number> {
    match value {
        Value::Bool(b) => Some(Number::Int(*b as i128)),
        Value::Int(i) => Some(Number::Int(*i)),
        Value::Float(f) => Some(Number::Float(*f)),
        _ => None,
    }
}

fn invalid(op: &'static str, lhs: &Value, rhs: &Value) -> DecodeError {
    DecodeError::InvalidOperands { op, lhs: lhs.kind(), rhs: rhs.kind() }
}

fn numbers(op: &'static str, lhs: &Value, rhs: &Value) -> Result<(Number, Number)> {
    match (number(lhs), number(rhs)) {
        (Some(l), Some(r)) => Ok((l, r)),
        _ => Err(invalid(op, lhs, rhs)),
    }
}

fn as_float(n: Number) -> f64 {
    match n {
        Number::Int(i) => i as f64,
        Number::Float(f) => f,
    }
}

fn arithmetic(
    op: &'static str,
    lhs: &Value,
    rhs: &Value,
    int: fn(i128, i128) -> Option<i128>,
    float: fn(f64, f64) -> f64,
) -> Result<Value> {
    match numbers(op, lhs, rhs)? {
        (Number::Int(l), Number::Int(r)) => {
            int(l, r).map(Value::Int).ok_or(DecodeError::ArithmeticOverflow { op })
        }
        (l, r) => Ok(Value::Float(float(as_float(l), as_float(r)))),
    }
}

pub fn add(lhs: &Value, rhs: &Value) -> Result<Value> {
    arithmetic("+", lhs, rhs, i128::checked_add, |l, r| l + r)
}

pub fn sub(lhs: &Value, rhs: &Value) -> Result<Value> {
    arithmetic("-", lhs, rhs, i128::checked_sub, |l, r| l - r)
}

pub fn mul(lhs: &Value, rhs: &Value) -> Result<Value> {
    arithmetic("*", lhs, rhs, i128::checked_mul, |l, r| l * r)
}

pub fn div(lhs: &Value, rhs: &Value) -> Result<Value> {
    match numbers("/", lhs, rhs)? {
        (_, Number::Int(0)) => Err(DecodeError::DivisionByZero),
        (_, Number::Float(r)) if r == 0.0 => Err(DecodeError::DivisionByZero),
        (Number::Int(l), Number::Int(r)) => {
            let quotient = l.checked_div(r).ok_or(DecodeError::ArithmeticOverflow { op: "/" })?;
            if l % r != 0 && ((l < 0) != (r < 0)) {
                Ok(Value::Int(quotient - 1))
            } else {
                Ok(Value::Int(quotient))
            }
        }
        (l, r) => Ok(Value::Float(as_float(l) / as_float(r))),
    }
}

pub fn rem(lhs: &Value, rhs: &Value) -> Result<Value> {
    match numbers("%", lhs, rhs)? {
        (_, Number::Int(0)) => Err(DecodeError::DivisionByZero),
        (_, Number::Float(r)) if r == 0.0 => Err(DecodeError::DivisionByZero),
        (Number::Int(l), Number::Int(r)) => {
            let remainder =
                l.checked_rem(r).ok_or(DecodeError::ArithmeticOverflow { op: "%" })?;
            if remainder != 0 && ((remainder < 0) != (r < 0)) {
                Ok(Value::Int(remainder + r))
            } else {
                Ok(Value::Int(remainder))
            }
        }
        (l, r) => {
            let (l, r) = (as_float(l), as_float(r));
            Ok(Value::Float(l - r * (l / r).floor()))
        }
    }
}

fn bitwise(
    op: &'static str,
    lhs: &Value,
    rhs: &Value,
    bool_op: fn(bool, bool) -> bool,
    int_op: fn(i128, i128) -> i128,
) -> Result<Value> {
    match (lhs, rhs) {
        (Value::Bool(l), Value::Bool(r)) => Ok(Value::Bool(bool_op(*l, *r))),
        _ => match (number(lhs), number(rhs)) {
            (Some(Number::Int(l)), Some(Number::Int(r))) => Ok(Value::Int(int_op(l, r))),
            _ => Err(invalid(op, lhs, rhs)),
        },
    }
}

pub fn bitand(lhs: &Value, rhs: &Value) -> Result<Value> {
    bitwise("&", lhs, rhs, |l, r| l & r, |l, r| l & r)
}

pub fn bitor(lhs: &Value, rhs: &Value) -> Result<Value> {
    bitwise("|", lhs, rhs, |l, r| l | r, |l, r| l | r)
}

pub fn bitxor(lhs: &Value, rhs: &Value) -> Result<Value> {
    bitwise("^", lhs, rhs, |l, r| l ^ r, |l, r| l ^ r)
}

/// Equality never fails: values of unrelated kinds compare unequal.
/// Raw bytes compare equal to the string with the same UTF-8 bytes.
fn equal(lhs: &Value, rhs: &Value) -> bool {
    match (lhs, rhs) {
        (Value::Bytes(bytes), Value::Str(text)) | (Value::Str(text), Value::Bytes(bytes)) => {
            bytes.as_ref() == text.as_bytes()
        }
        _ => match (number(lhs), number(rhs)) {
            (Some(Number::Int(l)), Some(Number::Int(r))) => l == r,
            (Some(l), Some(r)) => as_float(l) == as_float(r),
            _ => lhs == rhs,
        },
    }
}

pub fn eq(lhs: &Value, rhs: &Value) -> Result<Value> {
    Ok(Value::Bool(equal(lhs, rhs)))
}

pub fn ne(lhs: &Value, rhs: &Value) -> Result<Value> {
    Ok(Value::Bool(!equal(lhs, rhs)))
}

fn compare(op: &'static str, lhs: &Value, rhs: &Value) -> Result<Option<Ordering>> {
    match (lhs, rhs) {
        (Value::Str(l), Value::Str(r)) => Ok(Some(l.cmp(r))),
        (Value::Bytes(l), Value::Bytes(r)) => Ok(Some(l.cmp(r))),
        _ => match numbers(op, lhs, rhs)? {
            (Number::Int(l), Number::Int(r)) => Ok(Some(l.cmp(&r))),
            (l, r) => Ok(as_float(l).partial_cmp(&as_float(r))),
        },
    }
}

pub fn lt(lhs: &Value, rhs: &Value) -> Result<Value> {
    Ok(Value::Bool(compare("<", lhs, rhs)? == Some(Ordering::Less)))
}

pub fn le(lhs: &Value, rhs: &Value) -> Result<Value> {
    Ok(Value::Bool(matches!(
        compare("<=", lhs, rhs)?,
        Some(Ordering::Less | Ordering::Equal)
    )))
}

pub fn gt(lhs: &Value, rhs: &Value) -> Result<Value> {
    Ok(Value::Bool(compare(">", lhs, rhs)? == Some(Ordering::Greater)))
}

pub fn ge(lhs: &Value, rhs: &Value) -> Result<Value> {
    Ok(Value::Bool(matches!(
        compare(">=", lhs, rhs)?,
        Some(Ordering::Greater | Ordering::Equal)
    )))
}

pub fn neg(operand: &Value) -> Result<Value> {
    match number(operand) {
        Some(Number::Int(i)) => {
            i.checked_neg().map(Value::Int).ok_or(DecodeError::ArithmeticOverflow { op: "-" })
        }
        Some(Number::Float(f)) => Ok(Value::Float(-f)),
        None => Err(DecodeError::InvalidOperand { op: "-", operand: operand.kind() }),
    }
}

pub fn plus(operand: &Value) -> Result<Value> {
    match number(operand) {
        Some(Number::Int(i)) => Ok(Value::Int(i)),
        Some(Number::Float(f)) => Ok(Value::Float(f)),
        None => Err(DecodeError::InvalidOperand { op: "+", operand: operand.kind() }),
    }
}

pub fn not(operand: &Value) -> Result<Value> {
    Ok(Value::Bool(!operand.is_truthy()))
}

pub fn bitnot(operand: &Value) -> Result<Value> {
    match number(operand) {
        Some(Number::Int(i)) => Ok(Value::Int(!i)),
        _ => Err(DecodeError::InvalidOperand { op: "~", operand: operand.kind() }),
    }
}
