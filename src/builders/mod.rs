//! Terminal strategies that turn a walk into a key.
//!
//! The [`GraphWalker`](crate::walker::GraphWalker) drives a builder with one
//! event per node. Composites are bracketed by [`KeyBuilder::begin`] and
//! [`KeyBuilder::end`]; the builder starts with an implicit root sequence that
//! receives the signature prefix and the arguments.

use crate::reflect::FieldSlot;
use crate::value::{ArrayKind, EnumValue, Identity, OpaqueValue, Primitive, TypeName};
use crate::Reflect;
use std::fmt::{self, Debug};
use std::sync::Arc;

pub mod hash_code;
pub mod structural;

/// A composite node announced to a builder.
#[derive(Debug, Clone, Copy)]
pub enum Composite<'a> {
    /// Fixed-length array of the given kind.
    Array(ArrayKind),
    /// Order-significant collection.
    List,
    /// Set-like collection.
    Set,
    /// Key/value mapping; its children are [`Composite::Entry`] nodes.
    Map,
    /// One mapping entry holding exactly a key and a value.
    Entry,
    /// Object decomposed into the fields of `layout`.
    Object {
        /// Name of the object's type.
        type_name: &'static str,
        /// Field slots, one per child.
        layout: &'a Arc<[FieldSlot]>,
    },
}

/// A value kept undecomposed in a key.
#[derive(Clone)]
pub enum Opaque {
    /// Compared through its own equality and hash.
    Value(Arc<dyn OpaqueValue>),
    /// A reflectable object compared by identity because reflection is off.
    ///
    /// Its hash contribution is the object's address. A hash key does not
    /// keep the object alive, so once the object is dropped a later object
    /// allocated at the same address produces the same hash key. Structural
    /// keys hold the object and are not affected.
    Identity(Arc<dyn Reflect>),
}

impl Opaque {
    /// Contribution of this value to a hash fold.
    pub fn hash_contribution(&self) -> i64 {
        match self {
            Opaque::Value(value) => value.key_hash(),
            Opaque::Identity(object) => Identity::of(object).addr() as i64,
        }
    }
}

impl PartialEq for Opaque {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Opaque::Value(a), Opaque::Value(b)) => a.key_eq(b.as_ref()),
            (Opaque::Identity(a), Opaque::Identity(b)) => Identity::of(a) == Identity::of(b),
            _ => false,
        }
    }
}

impl Eq for Opaque {}

impl Debug for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Opaque::Value(value) => Debug::fmt(value, f),
            Opaque::Identity(object) => write!(
                f,
                "{}@{:#x}",
                object.type_info().name,
                Identity::of(object).addr()
            ),
        }
    }
}

/// Receives the events of one walk and produces a key.
///
/// Builders are created fresh for every key and are never shared.
pub trait KeyBuilder: Default {
    /// The key produced by this strategy.
    type Key;

    /// An absent value.
    fn null(&mut self);

    /// A primitive scalar.
    fn primitive(&mut self, value: Primitive);

    /// A character sequence.
    fn text(&mut self, value: &Arc<str>);

    /// An enum constant.
    fn enum_value(&mut self, value: &EnumValue);

    /// A type literal.
    fn type_literal(&mut self, value: &TypeName);

    /// A value kept as-is.
    fn opaque(&mut self, value: Opaque);

    /// A value cut because it is its own ancestor.
    fn cycle(&mut self);

    /// Opens a composite; its children follow until the matching `end`.
    fn begin(&mut self, composite: Composite<'_>);

    /// Closes the innermost open composite.
    fn end(&mut self);

    /// Produces the key from the root sequence.
    fn finish(self) -> Self::Key;
}
