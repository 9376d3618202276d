//! Built-in scalar types: empty, boolean, ranged integers, decimal64, string
//! and binary.

use base64::Engine as _;
use bindec_core::{Decimal64, NormalizedValue, TypedValue};

use super::ValueCodec;
use crate::error::CodecError;

/// Width of an integer type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntWidth {
    W8,
    W16,
    W32,
    W64,
}

/// The scalar family a [`ScalarCodec`] handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Empty,
    Boolean,
    Signed(IntWidth),
    Unsigned(IntWidth),
    Decimal64 { fraction_digits: u8 },
    String,
    Binary,
}

impl ScalarKind {
    fn keyword(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Boolean => "boolean",
            Self::Signed(IntWidth::W8) => "int8",
            Self::Signed(IntWidth::W16) => "int16",
            Self::Signed(IntWidth::W32) => "int32",
            Self::Signed(IntWidth::W64) => "int64",
            Self::Unsigned(IntWidth::W8) => "uint8",
            Self::Unsigned(IntWidth::W16) => "uint16",
            Self::Unsigned(IntWidth::W32) => "uint32",
            Self::Unsigned(IntWidth::W64) => "uint64",
            Self::Decimal64 { .. } => "decimal64",
            Self::String => "string",
            Self::Binary => "binary",
        }
    }
}

/// Codec for one scalar leaf type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScalarCodec {
    kind: ScalarKind,
}

impl ScalarCodec {
    pub fn new(kind: ScalarKind) -> Self {
        Self { kind }
    }

    pub fn signed(width: IntWidth) -> Self {
        Self::new(ScalarKind::Signed(width))
    }

    pub fn unsigned(width: IntWidth) -> Self {
        Self::new(ScalarKind::Unsigned(width))
    }

    fn mismatch(&self, found: impl Into<String>) -> CodecError {
        CodecError::value_mismatch(self.kind.keyword(), found)
    }

    fn out_of_range(&self, v: impl std::fmt::Display) -> CodecError {
        self.mismatch(format!("{v} (out of range)"))
    }

    /// Narrow `v` to the normalized value of `width`.
    fn signed_value(&self, width: IntWidth, v: i64) -> Result<NormalizedValue, CodecError> {
        let narrowed = match width {
            IntWidth::W8 => i8::try_from(v).map(NormalizedValue::Int8),
            IntWidth::W16 => i16::try_from(v).map(NormalizedValue::Int16),
            IntWidth::W32 => i32::try_from(v).map(NormalizedValue::Int32),
            IntWidth::W64 => Ok(NormalizedValue::Int64(v)),
        };
        narrowed.map_err(|_| self.out_of_range(v))
    }

    fn unsigned_value(&self, width: IntWidth, v: u64) -> Result<NormalizedValue, CodecError> {
        let narrowed = match width {
            IntWidth::W8 => u8::try_from(v).map(NormalizedValue::Uint8),
            IntWidth::W16 => u16::try_from(v).map(NormalizedValue::Uint16),
            IntWidth::W32 => u32::try_from(v).map(NormalizedValue::Uint32),
            IntWidth::W64 => Ok(NormalizedValue::Uint64(v)),
        };
        narrowed.map_err(|_| self.out_of_range(v))
    }

    fn decode_signed(&self, width: IntWidth, value: &NormalizedValue) -> Result<i64, CodecError> {
        match (width, value) {
            (IntWidth::W8, NormalizedValue::Int8(v)) => Ok(i64::from(*v)),
            (IntWidth::W16, NormalizedValue::Int16(v)) => Ok(i64::from(*v)),
            (IntWidth::W32, NormalizedValue::Int32(v)) => Ok(i64::from(*v)),
            (IntWidth::W64, NormalizedValue::Int64(v)) => Ok(*v),
            (_, NormalizedValue::String(s)) => {
                let v: i64 = s.parse().map_err(|_| self.mismatch(format!("'{s}'")))?;
                self.signed_value(width, v)?;
                Ok(v)
            }
            (_, other) => Err(self.mismatch(other.kind())),
        }
    }

    fn decode_unsigned(&self, width: IntWidth, value: &NormalizedValue) -> Result<u64, CodecError> {
        match (width, value) {
            (IntWidth::W8, NormalizedValue::Uint8(v)) => Ok(u64::from(*v)),
            (IntWidth::W16, NormalizedValue::Uint16(v)) => Ok(u64::from(*v)),
            (IntWidth::W32, NormalizedValue::Uint32(v)) => Ok(u64::from(*v)),
            (IntWidth::W64, NormalizedValue::Uint64(v)) => Ok(*v),
            (_, NormalizedValue::String(s)) => {
                let v: u64 = s.parse().map_err(|_| self.mismatch(format!("'{s}'")))?;
                self.unsigned_value(width, v)?;
                Ok(v)
            }
            (_, other) => Err(self.mismatch(other.kind())),
        }
    }
}

impl ValueCodec for ScalarCodec {
    fn encode(&self, value: &TypedValue) -> Result<NormalizedValue, CodecError> {
        match (self.kind, value) {
            (ScalarKind::Empty, TypedValue::Empty) => Ok(NormalizedValue::Empty),
            (ScalarKind::Boolean, TypedValue::Boolean(b)) => Ok(NormalizedValue::Boolean(*b)),
            (ScalarKind::Signed(width), TypedValue::Int(v)) => self.signed_value(width, *v),
            (ScalarKind::Unsigned(width), TypedValue::Uint(v)) => self.unsigned_value(width, *v),
            (ScalarKind::Decimal64 { fraction_digits }, TypedValue::Decimal(d))
                if d.fraction_digits() == fraction_digits =>
            {
                Ok(NormalizedValue::Decimal(*d))
            }
            (ScalarKind::String, TypedValue::String(s)) => Ok(NormalizedValue::String(s.clone())),
            (ScalarKind::Binary, TypedValue::Binary(b)) => Ok(NormalizedValue::Binary(b.clone())),
            (_, other) => Err(self.mismatch(other.kind())),
        }
    }

    fn decode(&self, value: &NormalizedValue) -> Result<TypedValue, CodecError> {
        match (self.kind, value) {
            (ScalarKind::Empty, NormalizedValue::Empty) => Ok(TypedValue::Empty),
            (ScalarKind::Empty, NormalizedValue::String(s)) if s.is_empty() => Ok(TypedValue::Empty),

            (ScalarKind::Boolean, NormalizedValue::Boolean(b)) => Ok(TypedValue::Boolean(*b)),
            (ScalarKind::Boolean, NormalizedValue::String(s)) => match s.as_str() {
                "true" => Ok(TypedValue::Boolean(true)),
                "false" => Ok(TypedValue::Boolean(false)),
                _ => Err(self.mismatch(format!("'{s}'"))),
            },

            (ScalarKind::Signed(width), value) => self.decode_signed(width, value).map(TypedValue::Int),
            (ScalarKind::Unsigned(width), value) => {
                self.decode_unsigned(width, value).map(TypedValue::Uint)
            }

            (ScalarKind::Decimal64 { fraction_digits }, NormalizedValue::Decimal(d))
                if d.fraction_digits() == fraction_digits =>
            {
                Ok(TypedValue::Decimal(*d))
            }
            (ScalarKind::Decimal64 { fraction_digits }, NormalizedValue::String(s)) => {
                Decimal64::parse(s, fraction_digits)
                    .map(TypedValue::Decimal)
                    .map_err(|_| self.mismatch(format!("'{s}'")))
            }

            (ScalarKind::String, NormalizedValue::String(s)) => Ok(TypedValue::String(s.clone())),

            (ScalarKind::Binary, NormalizedValue::Binary(b)) => Ok(TypedValue::Binary(b.clone())),
            (ScalarKind::Binary, NormalizedValue::String(s)) => base64::engine::general_purpose::STANDARD
                .decode(s)
                .map(TypedValue::Binary)
                .map_err(|_| self.mismatch(format!("'{s}' (not base64)"))),

            (_, other) => Err(self.mismatch(other.kind())),
        }
    }
}
