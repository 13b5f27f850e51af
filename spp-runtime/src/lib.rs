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

//! Helper definitions used by the parsers generated by the SPP compiler.
//!
//! Every generated routine has the signature
//!
//! ```ignore
//! fn parse_name(buf: &[u8], offset: usize, args: &Record)
//!     -> Result<(Record, usize), DecodeError>;
//! ```
//!
//! and is built from the primitive decoders [`decode_fixed`] and
//! [`raw_bytes`], the dynamic [`Value`] model, and the expression
//! operators in [`ops`].

use bytes::{Buf, Bytes};

pub mod ops;
mod value;

pub use value::{Record, Value};

/// Type of parsing errors.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("argument `{name}` is not passed")]
    MissingArgument { name: &'static str },
    #[error("when reading {wanted} bytes at offset {offset}, input has only {len} bytes")]
    OutOfBounds { offset: usize, wanted: usize, len: usize },
    #[error("value has no field `{field}`")]
    MissingField { field: &'static str },
    #[error("array size must be a non-negative integer, got {value}")]
    InvalidArraySize { value: String },
    #[error(
        "array of {count} elements consuming no input exceeds the limit of {limit}",
        limit = MAX_EMPTY_ELEMENTS
    )]
    ArrayTooLarge { count: usize },
    #[error("unsupported operand kinds for `{op}`: {lhs} and {rhs}")]
    InvalidOperands { op: &'static str, lhs: &'static str, rhs: &'static str },
    #[error("unsupported operand kind for unary `{op}`: {operand}")]
    InvalidOperand { op: &'static str, operand: &'static str },
    #[error("arithmetic overflow in `{op}`")]
    ArithmeticOverflow { op: &'static str },
    #[error("division by zero")]
    DivisionByZero,
    #[error("struct `{name}` is not defined")]
    UndefinedStruct { name: &'static str },
    #[error("{message}")]
    Raised { message: &'static str },
}

pub type Result<T> = std::result::Result<T, DecodeError>;

/// Byte order applied by the fixed width decoders.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    #[default]
    Little,
    Big,
}

/// Fixed width primitive kinds.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FixedWidth {
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
}

impl FixedWidth {
    /// Width of the encoded value in bytes.
    pub fn width(&self) -> usize {
        match self {
            FixedWidth::U8 | FixedWidth::I8 => 1,
            FixedWidth::U16 | FixedWidth::I16 => 2,
            FixedWidth::U32 | FixedWidth::I32 | FixedWidth::F32 => 4,
            FixedWidth::U64 | FixedWidth::I64 | FixedWidth::F64 => 8,
        }
    }
}

/// Return the `n` bytes starting at `offset`, or `OutOfBounds`
/// if the buffer is too short.
fn take(buf: &[u8], offset: usize, n: usize) -> Result<&[u8]> {
    offset
        .checked_add(n)
        .filter(|end| *end <= buf.len())
        .map(|end| &buf[offset..end])
        .ok_or(DecodeError::OutOfBounds { offset, wanted: n, len: buf.len() })
}

/// Decode one fixed width primitive at `offset`.
/// Returns the decoded value and the offset following it.
pub fn decode_fixed(
    kind: FixedWidth,
    order: ByteOrder,
    buf: &[u8],
    offset: usize,
) -> Result<(Value, usize)> {
    let mut chunk = take(buf, offset, kind.width())?;
    let value = match (kind, order) {
        (FixedWidth::U8, _) => Value::from(chunk.get_u8()),
        (FixedWidth::I8, _) => Value::from(chunk.get_i8()),
        (FixedWidth::U16, ByteOrder::Little) => Value::from(chunk.get_u16_le()),
        (FixedWidth::U16, ByteOrder::Big) => Value::from(chunk.get_u16()),
        (FixedWidth::U32, ByteOrder::Little) => Value::from(chunk.get_u32_le()),
        (FixedWidth::U32, ByteOrder::Big) => Value::from(chunk.get_u32()),
        (FixedWidth::U64, ByteOrder::Little) => Value::from(chunk.get_u64_le()),
        (FixedWidth::U64, ByteOrder::Big) => Value::from(chunk.get_u64()),
        (FixedWidth::I16, ByteOrder::Little) => Value::from(chunk.get_i16_le()),
        (FixedWidth::I16, ByteOrder::Big) => Value::from(chunk.get_i16()),
        (FixedWidth::I32, ByteOrder::Little) => Value::from(chunk.get_i32_le()),
        (FixedWidth::I32, ByteOrder::Big) => Value::from(chunk.get_i32()),
        (FixedWidth::I64, ByteOrder::Little) => Value::from(chunk.get_i64_le()),
        (FixedWidth::I64, ByteOrder::Big) => Value::from(chunk.get_i64()),
        (FixedWidth::F32, ByteOrder::Little) => Value::from(chunk.get_f32_le()),
        (FixedWidth::F32, ByteOrder::Big) => Value::from(chunk.get_f32()),
        (FixedWidth::F64, ByteOrder::Little) => Value::from(chunk.get_f64_le()),
        (FixedWidth::F64, ByteOrder::Big) => Value::from(chunk.get_f64()),
    };
    Ok((value, offset + kind.width()))
}

/// Extract `n` raw bytes at `offset`, without any byte order
/// interpretation.
pub fn raw_bytes(buf: &[u8], offset: usize, n: usize) -> Result<(Value, usize)> {
    let slice = take(buf, offset, n)?;
    Ok((Value::Bytes(Bytes::copy_from_slice(slice)), offset + n))
}

static ABSENT: Value = Value::Absent;

/// Resolve a defensive read, substituting [`Value::Absent`] when
/// the field is missing.
pub fn or_absent(value: Option<&Value>) -> &Value {
    value.unwrap_or(&ABSENT)
}

/// Convert an evaluated array size into an element count.
pub fn array_count(size: &Value) -> Result<usize> {
    match size {
        Value::Int(count) => usize::try_from(*count)
            .map_err(|_| DecodeError::InvalidArraySize { value: size.to_string() }),
        _ => Err(DecodeError::InvalidArraySize { value: size.to_string() }),
    }
}

/// Maximum element count of an array whose elements consume no
/// input, such as arrays of empty structs or of `0B`.
pub const MAX_EMPTY_ELEMENTS: usize = 1 << 16;

/// Check the decoding of one array element spanning `offset..next`.
///
/// Element decoding is deterministic, so an element consuming no
/// input implies that all elements of the array consume no input, and
/// the array size is then bounded by [`MAX_EMPTY_ELEMENTS`].
pub fn check_element(offset: usize, next: usize, count: usize) -> Result<()> {
    if next == offset && count > MAX_EMPTY_ELEMENTS {
        Err(DecodeError::ArrayTooLarge { count })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_fixed_little_endian() {
        let buf = [0x01, 0x02, 0x03, 0x04, 0xff];
        assert_eq!(
            decode_fixed(FixedWidth::U32, ByteOrder::Little, &buf, 0),
            Ok((Value::Int(0x04030201), 4))
        );
        assert_eq!(
            decode_fixed(FixedWidth::U16, ByteOrder::Little, &buf, 1),
            Ok((Value::Int(0x0302), 3))
        );
    }

    #[test]
    fn decode_fixed_big_endian() {
        let buf = [0x01, 0x02, 0x03, 0x04];
        assert_eq!(
            decode_fixed(FixedWidth::U32, ByteOrder::Big, &buf, 0),
            Ok((Value::Int(0x01020304), 4))
        );
    }

    #[test]
    fn decode_fixed_signed_reinterprets_bits() {
        let buf = [0xff, 0xfe, 0xff];
        assert_eq!(decode_fixed(FixedWidth::I8, ByteOrder::Little, &buf, 0), Ok((Value::Int(-1), 1)));
        assert_eq!(
            decode_fixed(FixedWidth::I16, ByteOrder::Little, &buf, 1),
            Ok((Value::Int(-2), 3))
        );
        assert_eq!(decode_fixed(FixedWidth::U8, ByteOrder::Big, &buf, 0), Ok((Value::Int(255), 1)));
    }

    #[test]
    fn decode_fixed_float() {
        let buf = 1.5f32.to_le_bytes();
        assert_eq!(
            decode_fixed(FixedWidth::F32, ByteOrder::Little, &buf, 0),
            Ok((Value::Float(1.5), 4))
        );
        let buf = (-0.25f64).to_be_bytes();
        assert_eq!(
            decode_fixed(FixedWidth::F64, ByteOrder::Big, &buf, 0),
            Ok((Value::Float(-0.25), 8))
        );
    }

    #[test]
    fn decode_fixed_out_of_bounds() {
        let buf = [0x01, 0x02, 0x03];
        assert_eq!(
            decode_fixed(FixedWidth::U32, ByteOrder::Little, &buf, 0),
            Err(DecodeError::OutOfBounds { offset: 0, wanted: 4, len: 3 })
        );
        assert_eq!(
            decode_fixed(FixedWidth::U8, ByteOrder::Little, &buf, usize::MAX),
            Err(DecodeError::OutOfBounds { offset: usize::MAX, wanted: 1, len: 3 })
        );
    }

    #[test]
    fn raw_bytes_slice() {
        let buf = [b'B', b'M', 0x10];
        assert_eq!(
            raw_bytes(&buf, 0, 2),
            Ok((Value::Bytes(Bytes::from_static(b"BM")), 2))
        );
        assert_eq!(raw_bytes(&buf, 3, 0), Ok((Value::Bytes(Bytes::new()), 3)));
        assert!(matches!(raw_bytes(&buf, 2, 2), Err(DecodeError::OutOfBounds { .. })));
    }

    #[test]
    fn array_count_requires_non_negative_integer() {
        assert_eq!(array_count(&Value::Int(3)), Ok(3));
        assert_eq!(array_count(&Value::Int(0)), Ok(0));
        assert!(matches!(array_count(&Value::Int(-1)), Err(DecodeError::InvalidArraySize { .. })));
        assert!(matches!(array_count(&Value::Float(2.0)), Err(DecodeError::InvalidArraySize { .. })));
        assert!(matches!(array_count(&Value::Absent), Err(DecodeError::InvalidArraySize { .. })));
    }

    #[test]
    fn check_element_bounds_empty_elements() {
        assert_eq!(check_element(4, 8, usize::MAX), Ok(()));
        assert_eq!(check_element(4, 4, MAX_EMPTY_ELEMENTS), Ok(()));
        assert_eq!(
            check_element(4, 4, MAX_EMPTY_ELEMENTS + 1),
            Err(DecodeError::ArrayTooLarge { count: MAX_EMPTY_ELEMENTS + 1 })
        );
    }
}
