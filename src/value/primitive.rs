//! Primitive scalars and array element kinds.

use crate::hash::{string_hash, FALSE_HASH, TRUE_HASH};
use std::fmt;
use std::hash::{Hash, Hasher};

/// The width and interpretation of a primitive scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrimitiveKind {
    /// 8-bit signed integer.
    I8,
    /// 16-bit signed integer.
    I16,
    /// 32-bit signed integer.
    I32,
    /// 64-bit signed integer.
    I64,
    /// Unicode scalar value.
    Char,
    /// Single precision float.
    F32,
    /// Double precision float.
    F64,
    /// Boolean.
    Bool,
}

impl PrimitiveKind {
    /// Descriptor of an array of this kind, used to tag array contributions.
    pub fn array_descriptor(self) -> &'static str {
        match self {
            PrimitiveKind::I8 => "[B",
            PrimitiveKind::I16 => "[S",
            PrimitiveKind::I32 => "[I",
            PrimitiveKind::I64 => "[J",
            PrimitiveKind::Char => "[C",
            PrimitiveKind::F32 => "[F",
            PrimitiveKind::F64 => "[D",
            PrimitiveKind::Bool => "[Z",
        }
    }

    /// Tag folded into a parent ahead of an array of this kind.
    ///
    /// Two empty arrays of different kinds differ only by this tag.
    pub fn array_tag(self) -> i64 {
        string_hash(self.array_descriptor())
    }

    /// Human readable name of the kind.
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::I8 => "int8",
            PrimitiveKind::I16 => "int16",
            PrimitiveKind::I32 => "int32",
            PrimitiveKind::I64 => "int64",
            PrimitiveKind::Char => "char",
            PrimitiveKind::F32 => "float32",
            PrimitiveKind::F64 => "float64",
            PrimitiveKind::Bool => "bool",
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Element kind of an [`Array`](super::Array).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArrayKind {
    /// Array of one primitive kind.
    Primitive(PrimitiveKind),
    /// Array of arbitrary values.
    Reference,
}

impl fmt::Display for ArrayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArrayKind::Primitive(kind) => write!(f, "{}[]", kind),
            ArrayKind::Reference => f.write_str("value[]"),
        }
    }
}

/// A primitive scalar carrying its exact bit pattern.
///
/// Equality and hashing compare the kind and the raw bits, so `NaN` equals
/// itself and `0.0` differs from `-0.0`.
#[derive(Debug, Clone, Copy)]
pub enum Primitive {
    /// 8-bit signed integer.
    I8(i8),
    /// 16-bit signed integer.
    I16(i16),
    /// 32-bit signed integer.
    I32(i32),
    /// 64-bit signed integer.
    I64(i64),
    /// Unicode scalar value.
    Char(char),
    /// Single precision float.
    F32(f32),
    /// Double precision float.
    F64(f64),
    /// Boolean.
    Bool(bool),
}

impl Primitive {
    /// Returns the kind of this primitive.
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Primitive::I8(_) => PrimitiveKind::I8,
            Primitive::I16(_) => PrimitiveKind::I16,
            Primitive::I32(_) => PrimitiveKind::I32,
            Primitive::I64(_) => PrimitiveKind::I64,
            Primitive::Char(_) => PrimitiveKind::Char,
            Primitive::F32(_) => PrimitiveKind::F32,
            Primitive::F64(_) => PrimitiveKind::F64,
            Primitive::Bool(_) => PrimitiveKind::Bool,
        }
    }

    /// Returns the raw bit pattern, sign-extended for integers.
    pub fn bits(&self) -> u64 {
        match *self {
            Primitive::I8(v) => v as i64 as u64,
            Primitive::I16(v) => v as i64 as u64,
            Primitive::I32(v) => v as i64 as u64,
            Primitive::I64(v) => v as u64,
            Primitive::Char(v) => u64::from(u32::from(v)),
            Primitive::F32(v) => u64::from(v.to_bits()),
            Primitive::F64(v) => v.to_bits(),
            Primitive::Bool(v) => u64::from(v),
        }
    }

    /// Contribution of this primitive to a hash fold.
    ///
    /// Floats contribute their bit pattern, never a rounded integer, so
    /// `1.5` and `1.7` stay apart.
    pub fn hash_contribution(&self) -> i64 {
        match *self {
            Primitive::I8(v) => i64::from(v),
            Primitive::I16(v) => i64::from(v),
            Primitive::I32(v) => i64::from(v),
            Primitive::I64(v) => v,
            Primitive::Char(v) => i64::from(u32::from(v)),
            Primitive::F32(v) => i64::from(v.to_bits() as i32),
            Primitive::F64(v) => v.to_bits() as i64,
            Primitive::Bool(true) => TRUE_HASH,
            Primitive::Bool(false) => FALSE_HASH,
        }
    }
}

impl PartialEq for Primitive {
    fn eq(&self, other: &Self) -> bool {
        self.kind() == other.kind() && self.bits() == other.bits()
    }
}

impl Eq for Primitive {}

impl Hash for Primitive {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind().hash(state);
        state.write_u64(self.bits());
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Primitive::I8(v) => write!(f, "{}i8", v),
            Primitive::I16(v) => write!(f, "{}i16", v),
            Primitive::I32(v) => write!(f, "{}", v),
            Primitive::I64(v) => write!(f, "{}i64", v),
            Primitive::Char(v) => write!(f, "{:?}", v),
            Primitive::F32(v) => write!(f, "{}f32", v),
            Primitive::F64(v) => write!(f, "{}f64", v),
            Primitive::Bool(v) => write!(f, "{}", v),
        }
    }
}

macro_rules! primitive_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Primitive {
                fn from(value: $ty) -> Self {
                    Primitive::$variant(value)
                }
            }
        )*
    };
}

primitive_from! {
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    char => Char,
    f32 => F32,
    f64 => F64,
    bool => Bool,
}
