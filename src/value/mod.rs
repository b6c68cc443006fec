//! Runtime representation of call arguments.
//!
//! A [`Value`] is one node of an argument graph. Scalars are stored inline;
//! composites ([`Array`], lists, sets and maps) are [`Shared`] handles whose
//! identity is what the cycle guard tracks.

mod convert;
mod primitive;
mod shared;

pub use convert::ToValue;
pub use primitive::{ArrayKind, Primitive, PrimitiveKind};
pub use shared::{Array, Identity, Shared};

use crate::hash::string_hash;
use crate::reflect::Reflect;
use std::any::Any;
use std::borrow::Cow;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A reference to a type itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeName(Cow<'static, str>);

impl TypeName {
    /// Creates a type literal from a name.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        TypeName(name.into())
    }

    /// Returns the type literal of `T`.
    pub fn of<T: ?Sized>() -> Self {
        TypeName(Cow::Borrowed(std::any::type_name::<T>()))
    }

    /// Returns the type name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Contribution of this type literal to a hash fold.
    pub fn hash_contribution(&self) -> i64 {
        string_hash(&self.0)
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for TypeName {
    fn from(name: &'static str) -> Self {
        TypeName(Cow::Borrowed(name))
    }
}

impl From<String> for TypeName {
    fn from(name: String) -> Self {
        TypeName(Cow::Owned(name))
    }
}

/// An enumerated constant, identified by its declared name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumValue {
    type_name: TypeName,
    member: Cow<'static, str>,
}

impl EnumValue {
    /// Creates an enum constant.
    pub fn new(type_name: impl Into<TypeName>, member: impl Into<Cow<'static, str>>) -> Self {
        Self {
            type_name: type_name.into(),
            member: member.into(),
        }
    }

    /// Returns the enum's type.
    pub fn type_name(&self) -> &TypeName {
        &self.type_name
    }

    /// Returns the member name.
    pub fn member(&self) -> &str {
        &self.member
    }

    /// Contribution of this constant to a hash fold.
    ///
    /// Only names take part; ordinals and addresses never do.
    pub fn hash_contribution(&self) -> i64 {
        self.type_name
            .hash_contribution()
            .wrapping_mul(31)
            .wrapping_add(string_hash(&self.member))
    }
}

impl fmt::Display for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.type_name, self.member)
    }
}

/// A value compared through its own equality and hash.
///
/// Implemented for every `Hash + Eq + Debug` type, so most plain values can be
/// passed as opaque arguments without further work.
pub trait OpaqueValue: Send + Sync + fmt::Debug + 'static {
    /// Hash of the value, stable for the life of the process.
    fn key_hash(&self) -> i64;

    /// Compares against another opaque value.
    fn key_eq(&self, other: &dyn OpaqueValue) -> bool;

    /// Upcast used for downcasting in `key_eq`.
    fn as_any(&self) -> &dyn Any;
}

impl<T> OpaqueValue for T
where
    T: Hash + Eq + fmt::Debug + Send + Sync + 'static,
{
    fn key_hash(&self) -> i64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish() as i64
    }

    fn key_eq(&self, other: &dyn OpaqueValue) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .map_or(false, |other| self == other)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A node of an argument graph.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Absent value.
    #[default]
    Null,
    /// Primitive scalar.
    Primitive(Primitive),
    /// Character sequence.
    Text(Arc<str>),
    /// Enumerated constant.
    Enum(EnumValue),
    /// Type literal.
    Type(TypeName),
    /// Fixed-length array.
    Array(Array),
    /// Order-significant collection.
    List(Shared<Vec<Value>>),
    /// Set-like collection, kept in its source's iteration order.
    Set(Shared<Vec<Value>>),
    /// Key/value pairs in their source's iteration order.
    Map(Shared<Vec<(Value, Value)>>),
    /// A value that can expose its fields.
    Object(Arc<dyn Reflect>),
    /// A value used as-is through its own equality and hash.
    Opaque(Arc<dyn OpaqueValue>),
}

impl Value {
    /// Creates a text value.
    pub fn text(value: impl Into<Arc<str>>) -> Self {
        Value::Text(value.into())
    }

    /// Creates an enum constant.
    pub fn enum_value(
        type_name: impl Into<TypeName>,
        member: impl Into<Cow<'static, str>>,
    ) -> Self {
        Value::Enum(EnumValue::new(type_name, member))
    }

    /// Creates the type literal of `T`.
    pub fn type_of<T: ?Sized>() -> Self {
        Value::Type(TypeName::of::<T>())
    }

    /// Creates a list.
    pub fn list<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        Value::List(Shared::new(items.into_iter().map(Into::into).collect()))
    }

    /// Creates a set, keeping the iterator's order.
    pub fn set<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        Value::Set(Shared::new(items.into_iter().map(Into::into).collect()))
    }

    /// Creates a map, keeping the iterator's order.
    pub fn map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Value>,
        V: Into<Value>,
    {
        Value::Map(Shared::new(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        ))
    }

    /// Wraps a reflectable value.
    pub fn object<T: Reflect>(object: T) -> Self {
        Value::Object(Arc::new(object))
    }

    /// Wraps a value compared by its own equality and hash.
    pub fn opaque<T: OpaqueValue>(value: T) -> Self {
        Value::Opaque(Arc::new(value))
    }

    /// Returns true for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the identity of a shared composite, if this is one.
    pub fn identity(&self) -> Option<Identity> {
        match self {
            Value::Array(array) => Some(array.identity()),
            Value::List(items) | Value::Set(items) => Some(items.identity()),
            Value::Map(entries) => Some(entries.identity()),
            Value::Object(object) => Some(Identity::of(object)),
            _ => None,
        }
    }

    /// Short description used in error messages.
    pub(crate) fn describe(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Primitive(p) => p.kind().to_string(),
            Value::Text(_) => "text".to_string(),
            Value::Enum(e) => e.type_name().to_string(),
            Value::Type(_) => "type literal".to_string(),
            Value::Array(array) => array.kind().to_string(),
            Value::List(_) => "list".to_string(),
            Value::Set(_) => "set".to_string(),
            Value::Map(_) => "map".to_string(),
            Value::Object(object) => object.type_info().name.to_string(),
            Value::Opaque(_) => "opaque value".to_string(),
        }
    }
}

macro_rules! value_from_primitive {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Primitive(Primitive::from(value))
                }
            }
        )*
    };
}

value_from_primitive!(i8, i16, i32, i64, char, f32, f64, bool);

impl From<Primitive> for Value {
    fn from(value: Primitive) -> Self {
        Value::Primitive(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(Arc::from(value))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(Arc::from(value))
    }
}

impl From<Array> for Value {
    fn from(value: Array) -> Self {
        Value::Array(value)
    }
}

impl From<EnumValue> for Value {
    fn from(value: EnumValue) -> Self {
        Value::Enum(value)
    }
}

impl From<TypeName> for Value {
    fn from(value: TypeName) -> Self {
        Value::Type(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}
