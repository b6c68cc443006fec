//! Conversions from ordinary Rust values into [`Value`]s.

use super::{Array, ArrayKind, EnumValue, Primitive, PrimitiveKind, Shared, TypeName, Value};
use crate::reflect::Reflect;
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::rc::Rc;
use std::sync::Arc;

/// Converts a value into an argument graph node.
///
/// Sequences map as follows: slices, fixed-size arrays and boxed slices become
/// [`Value::Array`], `Vec` and `VecDeque` become [`Value::List`], hash and
/// btree sets become [`Value::Set`], and maps become [`Value::Map`]. Sets and
/// maps keep whatever order their iterator yields.
pub trait ToValue {
    /// Element kind of an array built from a slice of `Self`.
    #[doc(hidden)]
    const ARRAY_KIND: ArrayKind = ArrayKind::Reference;

    /// Converts `self` into a [`Value`].
    fn to_value(&self) -> Value;
}

macro_rules! primitive_to_value {
    ($($ty:ty => $kind:ident via $conv:expr),* $(,)?) => {
        $(
            impl ToValue for $ty {
                const ARRAY_KIND: ArrayKind = ArrayKind::Primitive(PrimitiveKind::$kind);

                fn to_value(&self) -> Value {
                    let convert: fn($ty) -> Primitive = $conv;
                    Value::Primitive(convert(*self))
                }
            }
        )*
    };
}

// Unsigned integers widen to the next signed kind; the 64-bit ones keep
// their bit pattern.
primitive_to_value! {
    i8 => I8 via Primitive::I8,
    i16 => I16 via Primitive::I16,
    i32 => I32 via Primitive::I32,
    i64 => I64 via Primitive::I64,
    isize => I64 via |v| Primitive::I64(v as i64),
    u8 => I16 via |v| Primitive::I16(i16::from(v)),
    u16 => I32 via |v| Primitive::I32(i32::from(v)),
    u32 => I64 via |v| Primitive::I64(i64::from(v)),
    u64 => I64 via |v| Primitive::I64(v as i64),
    usize => I64 via |v| Primitive::I64(v as i64),
    char => Char via Primitive::Char,
    f32 => F32 via Primitive::F32,
    f64 => F64 via Primitive::F64,
    bool => Bool via Primitive::Bool,
}

impl ToValue for Primitive {
    fn to_value(&self) -> Value {
        Value::Primitive(*self)
    }
}

impl ToValue for str {
    fn to_value(&self) -> Value {
        Value::Text(Arc::from(self))
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::Text(Arc::from(self.as_str()))
    }
}

impl ToValue for Cow<'_, str> {
    fn to_value(&self) -> Value {
        Value::Text(Arc::from(self.as_ref()))
    }
}

impl ToValue for Arc<str> {
    fn to_value(&self) -> Value {
        Value::Text(Arc::clone(self))
    }
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl ToValue for TypeName {
    fn to_value(&self) -> Value {
        Value::Type(self.clone())
    }
}

impl ToValue for EnumValue {
    fn to_value(&self) -> Value {
        Value::Enum(self.clone())
    }
}

impl ToValue for Array {
    fn to_value(&self) -> Value {
        Value::Array(self.clone())
    }
}

impl<T: ToValue + ?Sized> ToValue for &T {
    const ARRAY_KIND: ArrayKind = T::ARRAY_KIND;

    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: ToValue + ?Sized> ToValue for Box<T> {
    const ARRAY_KIND: ArrayKind = T::ARRAY_KIND;

    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: ToValue + ?Sized> ToValue for Rc<T> {
    const ARRAY_KIND: ArrayKind = T::ARRAY_KIND;

    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

/// Reflectable values behind an `Arc` keep their identity.
impl<T: Reflect> ToValue for Arc<T> {
    fn to_value(&self) -> Value {
        Value::Object(Arc::clone(self) as Arc<dyn Reflect>)
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        match self {
            Some(value) => value.to_value(),
            None => Value::Null,
        }
    }
}

impl<T: ToValue> ToValue for [T] {
    fn to_value(&self) -> Value {
        Value::Array(Array::from_parts(
            T::ARRAY_KIND,
            self.iter().map(ToValue::to_value).collect(),
        ))
    }
}

impl<T: ToValue, const N: usize> ToValue for [T; N] {
    fn to_value(&self) -> Value {
        self.as_slice().to_value()
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Value {
        Value::List(Shared::new(self.iter().map(ToValue::to_value).collect()))
    }
}

impl<T: ToValue> ToValue for VecDeque<T> {
    fn to_value(&self) -> Value {
        Value::List(Shared::new(self.iter().map(ToValue::to_value).collect()))
    }
}

impl<T: ToValue, S> ToValue for HashSet<T, S> {
    fn to_value(&self) -> Value {
        Value::Set(Shared::new(self.iter().map(ToValue::to_value).collect()))
    }
}

impl<T: ToValue> ToValue for BTreeSet<T> {
    fn to_value(&self) -> Value {
        Value::Set(Shared::new(self.iter().map(ToValue::to_value).collect()))
    }
}

impl<K: ToValue, V: ToValue, S> ToValue for HashMap<K, V, S> {
    fn to_value(&self) -> Value {
        Value::Map(Shared::new(
            self.iter().map(|(k, v)| (k.to_value(), v.to_value())).collect(),
        ))
    }
}

impl<K: ToValue, V: ToValue> ToValue for BTreeMap<K, V> {
    fn to_value(&self) -> Value {
        Value::Map(Shared::new(
            self.iter().map(|(k, v)| (k.to_value(), v.to_value())).collect(),
        ))
    }
}
