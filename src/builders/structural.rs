//! Structural keys: the decomposed argument graph as an immutable value.

use super::{Composite, KeyBuilder, Opaque};
use crate::hash::{fold, string_hash, NULL_HASH, SEED};
use crate::reflect::FieldSlot;
use crate::value::{ArrayKind, EnumValue, Primitive, TypeName};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// One node of a [`StructuralKey`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyNode {
    /// Absent value.
    Null,
    /// Primitive scalar.
    Primitive(Primitive),
    /// Character sequence.
    Text(Arc<str>),
    /// Enum constant.
    Enum(EnumValue),
    /// Type literal.
    Type(TypeName),
    /// Array elements with their element kind.
    Array(ArrayKind, Vec<KeyNode>),
    /// List elements.
    List(Vec<KeyNode>),
    /// Set elements in iteration order.
    Set(Vec<KeyNode>),
    /// Map entries in iteration order.
    Map(Vec<(KeyNode, KeyNode)>),
    /// Reflected object.
    Object {
        /// Name of the object's type.
        type_name: TypeName,
        /// Field names and values in layout order.
        fields: Vec<(&'static str, KeyNode)>,
    },
    /// Value kept undecomposed.
    Opaque(Opaque),
    /// Placeholder for a value that is its own ancestor.
    Cycle,
}

impl KeyNode {
    /// Shorthand for a text node.
    pub fn text(value: &str) -> Self {
        KeyNode::Text(Arc::from(value))
    }

    /// Contribution of this node to its parent's fold.
    ///
    /// For a primitive array this is the element fold alone; the kind tag is
    /// folded by [`KeyNode::fold_into`].
    pub fn hash_contribution(&self) -> i64 {
        match self {
            KeyNode::Null | KeyNode::Cycle => NULL_HASH,
            KeyNode::Primitive(value) => value.hash_contribution(),
            KeyNode::Text(value) => string_hash(value),
            KeyNode::Enum(value) => value.hash_contribution(),
            KeyNode::Type(value) => value.hash_contribution(),
            KeyNode::Array(_, items) | KeyNode::List(items) | KeyNode::Set(items) => {
                fold_nodes(items)
            }
            KeyNode::Map(entries) => entries.iter().fold(SEED, |seed, (key, value)| {
                fold(seed, value.fold_into(key.fold_into(SEED)))
            }),
            KeyNode::Object { type_name, fields } => fields
                .iter()
                .fold(fold(SEED, type_name.hash_contribution()), |seed, (_, value)| {
                    value.fold_into(seed)
                }),
            KeyNode::Opaque(value) => value.hash_contribution(),
        }
    }

    /// Folds this node into a parent accumulator.
    pub fn fold_into(&self, seed: i64) -> i64 {
        match self {
            KeyNode::Array(ArrayKind::Primitive(kind), _) => {
                fold(fold(seed, kind.array_tag()), self.hash_contribution())
            }
            _ => fold(seed, self.hash_contribution()),
        }
    }
}

impl Hash for KeyNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_i64(self.hash_contribution());
    }
}

fn fold_nodes(nodes: &[KeyNode]) -> i64 {
    nodes.iter().fold(SEED, |seed, node| node.fold_into(seed))
}

/// An immutable, order-significant key holding the full decomposed shape of
/// an invocation.
///
/// Equality is deep structural equality. [`StructuralKey::hash_code`] follows
/// the same fold as the hash strategy, so for one invocation it equals the
/// key a [`HashCodeKeyGenerator`](crate::HashCodeKeyGenerator) would produce.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StructuralKey {
    nodes: Vec<KeyNode>,
}

impl StructuralKey {
    /// Creates a key from its top-level nodes.
    pub fn new(nodes: Vec<KeyNode>) -> Self {
        Self { nodes }
    }

    /// Top-level nodes: signature prefix, then one node per argument.
    pub fn nodes(&self) -> &[KeyNode] {
        &self.nodes
    }

    /// Number of top-level nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true for the key of an argument-less call without prefixes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The combined polynomial hash of the key.
    pub fn hash_code(&self) -> i64 {
        fold_nodes(&self.nodes)
    }
}

impl Hash for StructuralKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_i64(self.hash_code());
    }
}

#[derive(Debug)]
enum Frame {
    Root(Vec<KeyNode>),
    Array(ArrayKind, Vec<KeyNode>),
    List(Vec<KeyNode>),
    Set(Vec<KeyNode>),
    Map(Vec<(KeyNode, KeyNode)>),
    Entry(Vec<KeyNode>),
    Object {
        type_name: &'static str,
        layout: Arc<[FieldSlot]>,
        values: Vec<KeyNode>,
    },
}

/// Builds a [`StructuralKey`] from a walk.
#[derive(Debug)]
pub struct StructuralKeyBuilder {
    stack: Vec<Frame>,
}

impl Default for StructuralKeyBuilder {
    fn default() -> Self {
        Self {
            stack: vec![Frame::Root(Vec::new())],
        }
    }
}

impl StructuralKeyBuilder {
    fn push(&mut self, node: KeyNode) {
        match self.stack.last_mut() {
            Some(
                Frame::Root(nodes)
                | Frame::Array(_, nodes)
                | Frame::List(nodes)
                | Frame::Set(nodes)
                | Frame::Entry(nodes),
            ) => nodes.push(node),
            Some(Frame::Object { values, .. }) => values.push(node),
            Some(Frame::Map(_)) | None => {
                debug_assert!(false, "map children must be entries");
            }
        }
    }
}

impl KeyBuilder for StructuralKeyBuilder {
    type Key = StructuralKey;

    fn null(&mut self) {
        self.push(KeyNode::Null);
    }

    fn primitive(&mut self, value: Primitive) {
        self.push(KeyNode::Primitive(value));
    }

    fn text(&mut self, value: &Arc<str>) {
        self.push(KeyNode::Text(Arc::clone(value)));
    }

    fn enum_value(&mut self, value: &EnumValue) {
        self.push(KeyNode::Enum(value.clone()));
    }

    fn type_literal(&mut self, value: &TypeName) {
        self.push(KeyNode::Type(value.clone()));
    }

    fn opaque(&mut self, value: Opaque) {
        self.push(KeyNode::Opaque(value));
    }

    fn cycle(&mut self) {
        self.push(KeyNode::Cycle);
    }

    fn begin(&mut self, composite: Composite<'_>) {
        let frame = match composite {
            Composite::Array(kind) => Frame::Array(kind, Vec::new()),
            Composite::List => Frame::List(Vec::new()),
            Composite::Set => Frame::Set(Vec::new()),
            Composite::Map => Frame::Map(Vec::new()),
            Composite::Entry => Frame::Entry(Vec::with_capacity(2)),
            Composite::Object { type_name, layout } => Frame::Object {
                type_name,
                layout: Arc::clone(layout),
                values: Vec::with_capacity(layout.len()),
            },
        };
        self.stack.push(frame);
    }

    fn end(&mut self) {
        if self.stack.len() < 2 {
            return;
        }
        let node = match self.stack.pop() {
            Some(Frame::Entry(mut pair)) => {
                let value = pair.pop().unwrap_or(KeyNode::Null);
                let key = pair.pop().unwrap_or(KeyNode::Null);
                if let Some(Frame::Map(entries)) = self.stack.last_mut() {
                    entries.push((key, value));
                }
                return;
            }
            Some(Frame::Array(kind, items)) => KeyNode::Array(kind, items),
            Some(Frame::List(items)) => KeyNode::List(items),
            Some(Frame::Set(items)) => KeyNode::Set(items),
            Some(Frame::Map(entries)) => KeyNode::Map(entries),
            Some(Frame::Object {
                type_name,
                layout,
                values,
            }) => KeyNode::Object {
                type_name: TypeName::from(type_name),
                fields: layout.iter().map(|slot| slot.name).zip(values).collect(),
            },
            Some(Frame::Root(_)) | None => return,
        };
        self.push(node);
    }

    fn finish(mut self) -> StructuralKey {
        match self.stack.drain(..).next() {
            Some(Frame::Root(nodes)) => StructuralKey::new(nodes),
            _ => StructuralKey::default(),
        }
    }
}
