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

//! Lowering of SPP expressions to Rust expressions over
//! `spp_runtime::Value`.

use super::Routine;
use crate::ast;
use crate::parser::unquote;
use quote::{format_ident, quote};

/// Generated read of a parameter or field.
///
/// Reads of parameters and of fields bound unconditionally earlier
/// in the routine cannot fail and index the record directly. Any
/// other read is defensive and yields `Value::Absent` when the field
/// was not decoded.
enum Access {
    /// Place expression of type `Value`.
    Place(proc_macro2::TokenStream),
    /// Expression of type `&Value`.
    Ref(proc_macro2::TokenStream),
    /// Expression of type `Option<&Value>`.
    Maybe(proc_macro2::TokenStream),
}

impl Routine<'_> {
    fn lookup(&self, name: &str) -> Access {
        if self.params.contains(&name) {
            Access::Place(quote!(args[#name]))
        } else if self.bound.contains(name) {
            Access::Place(quote!(ctx[#name]))
        } else {
            Access::Maybe(quote!(ctx.get(#name)))
        }
    }

    fn access(&self, expr: &ast::Expr) -> Option<Access> {
        match expr {
            ast::Expr::Identifier { name, .. } => Some(self.lookup(name)),
            ast::Expr::FieldAccess { target, field, .. } => {
                let field = field.as_str();
                Some(match self.access(target) {
                    Some(Access::Place(target) | Access::Ref(target)) => {
                        Access::Ref(quote!(#target.field(#field)?))
                    }
                    Some(Access::Maybe(target)) => {
                        Access::Maybe(quote!(#target.and_then(|value| value.get(#field))))
                    }
                    None => {
                        let target = self.value(target);
                        Access::Maybe(quote!(Value::get(#target, #field)))
                    }
                })
            }
            _ => None,
        }
    }

    /// Generate an expression of type `&Value` evaluating `expr`.
    pub(super) fn value(&self, expr: &ast::Expr) -> proc_macro2::TokenStream {
        if let Some(access) = self.access(expr) {
            return match access {
                Access::Place(place) => quote!(&#place),
                Access::Ref(reference) => reference,
                Access::Maybe(option) => quote!(spp_runtime::or_absent(#option)),
            };
        }
        match expr {
            ast::Expr::Number { raw, number_kind, .. } => {
                let literal = number(raw, *number_kind);
                quote!(&#literal)
            }
            ast::Expr::String { raw, .. } => {
                let text = unquote(raw);
                quote!(&Value::from(#text))
            }
            ast::Expr::Binary { left, op: ast::BinaryOp::And, right, .. } => {
                let left = self.value(left);
                let right = self.value(right);
                quote!(&Value::Bool(Value::is_truthy(#left) && Value::is_truthy(#right)))
            }
            ast::Expr::Binary { left, op: ast::BinaryOp::Or, right, .. } => {
                let left = self.value(left);
                let right = self.value(right);
                quote!(&Value::Bool(Value::is_truthy(#left) || Value::is_truthy(#right)))
            }
            ast::Expr::Binary { left, op, right, .. } => {
                let op = binary_op(*op);
                let left = self.value(left);
                let right = self.value(right);
                quote!(&spp_runtime::ops::#op(#left, #right)?)
            }
            ast::Expr::Unary { op, operand, .. } => {
                let op = unary_op(*op);
                let operand = self.value(operand);
                quote!(&spp_runtime::ops::#op(#operand)?)
            }
            ast::Expr::Call { callee, .. } => {
                let message = format!("call to `{callee}` is only valid as a field type");
                quote!(compile_error!(#message))
            }
            ast::Expr::Identifier { .. } | ast::Expr::FieldAccess { .. } => {
                unreachable!("accesses are handled above")
            }
        }
    }
}

fn binary_op(op: ast::BinaryOp) -> proc_macro2::Ident {
    format_ident!(
        "{}",
        match op {
            ast::BinaryOp::Add => "add",
            ast::BinaryOp::Sub => "sub",
            ast::BinaryOp::Mul => "mul",
            ast::BinaryOp::Div => "div",
            ast::BinaryOp::Rem => "rem",
            ast::BinaryOp::BitAnd => "bitand",
            ast::BinaryOp::BitOr => "bitor",
            ast::BinaryOp::BitXor => "bitxor",
            ast::BinaryOp::Eq => "eq",
            ast::BinaryOp::Ne => "ne",
            ast::BinaryOp::Lt => "lt",
            ast::BinaryOp::Le => "le",
            ast::BinaryOp::Gt => "gt",
            ast::BinaryOp::Ge => "ge",
            // Short circuiting operators are inlined.
            ast::BinaryOp::And | ast::BinaryOp::Or => unreachable!(),
        }
    )
}

fn unary_op(op: ast::UnaryOp) -> proc_macro2::Ident {
    format_ident!(
        "{}",
        match op {
            ast::UnaryOp::Plus => "plus",
            ast::UnaryOp::Minus => "neg",
            ast::UnaryOp::Not => "not",
            ast::UnaryOp::BitNot => "bitnot",
        }
    )
}

/// Rust spelling of an integer lexeme: the radix prefix is lower case.
fn integer_lexeme(raw: &str) -> String {
    match raw.get(..2) {
        Some("0X" | "0O" | "0B") => format!("0{}{}", raw[1..2].to_ascii_lowercase(), &raw[2..]),
        _ => raw.to_owned(),
    }
}

/// Rust spelling of a float lexeme: a digit is required on both
/// sides of the decimal point.
fn float_lexeme(raw: &str) -> String {
    let mut text = String::with_capacity(raw.len() + 2);
    if raw.starts_with('.') {
        text.push('0');
    }
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        text.push(c);
        if c == '.' && !chars.peek().is_some_and(|next| next.is_ascii_digit()) {
            text.push('0');
        }
    }
    text
}

/// Generate an `Int` constructor for an integer lexeme, keeping its
/// spelling. Values outside of the `i128` range are rejected.
fn integer(raw: &str, digits: &str) -> Result<proc_macro2::TokenStream, String> {
    match ast::parse_integer(digits) {
        Some(value) if i128::try_from(value).is_ok() => {
            syn::parse_str::<syn::LitInt>(&integer_lexeme(digits))
                .map(|lit| quote!(Value::Int(#lit)))
                .map_err(|err| format!("invalid numeric literal `{raw}`: {err}"))
        }
        // The lexer only produces well formed digits.
        _ => Err(format!("integer literal `{raw}` does not fit in 128 bits")),
    }
}

/// Generate a `Value` constructor for a numeric literal. Size
/// literals evaluate to their byte count.
pub(super) fn number(raw: &str, kind: ast::NumberKind) -> proc_macro2::TokenStream {
    let literal = match kind {
        ast::NumberKind::Integer => integer(raw, raw),
        ast::NumberKind::Size => integer(raw, raw.strip_suffix(['B', 'b']).unwrap_or(raw)),
        ast::NumberKind::Float => syn::parse_str::<syn::LitFloat>(&float_lexeme(raw))
            .map(|lit| quote!(Value::Float(#lit)))
            .map_err(|err| format!("invalid numeric literal `{raw}`: {err}")),
    };
    literal.unwrap_or_else(|message| quote!(compile_error!(#message)))
}
