//! Field-level decomposition of structured values.
//!
//! Rust has no runtime reflection, so a type opts in by implementing
//! [`Reflect`], usually through `#[derive(Reflect)]`. The trait describes the
//! type's fields once, statically, and reads individual fields on demand.
//! [`FieldExtractor`] flattens that description into a per-type layout and
//! caches it.
//!
//! ```
//! use deepkey::Reflect;
//!
//! #[derive(Debug, Reflect)]
//! struct Entity {
//!     id: i64,
//! }
//!
//! #[derive(Debug, Reflect)]
//! struct User {
//!     name: String,
//!     #[reflect(parent)]
//!     entity: Entity,
//!     #[reflect(skip)]
//!     cached_len: usize,
//! }
//!
//! let user = User { name: "ada".into(), entity: Entity { id: 7 }, cached_len: 3 };
//! let fields = deepkey::FieldExtractor::new().extract(&user, &Default::default()).unwrap();
//! let names: Vec<_> = fields.pairs().map(|(name, _)| name).collect();
//! assert_eq!(names, ["name", "id"]);
//! ```

use crate::error::{Error, Result};
use crate::metrics::KeyMetrics;
use crate::value::Value;
use dashmap::DashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::ptr;
use std::sync::Arc;
use tracing::debug;

/// Static description of one declared field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldInfo {
    /// Field name; tuple fields use their index.
    pub name: &'static str,
    /// Marker or derived state that is not part of the logical value.
    pub synthetic: bool,
}

impl FieldInfo {
    /// Describes an ordinary field.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            synthetic: false,
        }
    }

    /// Describes a field excluded from keys.
    pub const fn synthetic(name: &'static str) -> Self {
        Self {
            name,
            synthetic: true,
        }
    }
}

/// Static description of a reflectable type.
pub struct TypeInfo {
    /// Fully-qualified type name.
    pub name: &'static str,
    /// Fields declared directly on this type, in declaration order.
    pub fields: &'static [FieldInfo],
    /// The embedded ancestor whose fields this type inherits.
    pub parent: Option<fn() -> &'static TypeInfo>,
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeInfo")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .field("parent", &self.parent.map(|parent| parent().name))
            .finish()
    }
}

/// A field located within a type hierarchy.
///
/// The owner is compared by the address of its [`TypeInfo`], never by name,
/// so two types that happen to share a path stay distinct.
#[derive(Clone, Copy)]
pub struct FieldSlot {
    /// The type that declares the field.
    pub owner: &'static TypeInfo,
    /// Field name.
    pub name: &'static str,
}

impl FieldSlot {
    /// Returns true if `info` declares this field.
    pub fn is_owned_by(&self, info: &'static TypeInfo) -> bool {
        ptr::eq(self.owner, info)
    }
}

impl PartialEq for FieldSlot {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.owner, other.owner) && self.name == other.name
    }
}

impl Eq for FieldSlot {}

impl Hash for FieldSlot {
    fn hash<H: Hasher>(&self, state: &mut H) {
        ptr::hash(self.owner, state);
        self.name.hash(state);
    }
}

impl fmt::Debug for FieldSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.owner.name, self.name)
    }
}

/// A value that can expose its fields for key generation.
pub trait Reflect: Send + Sync + fmt::Debug + 'static {
    /// Returns the static description of `Self`.
    fn reflected_type() -> &'static TypeInfo
    where
        Self: Sized;

    /// Returns the static description of this value's type.
    fn type_info(&self) -> &'static TypeInfo;

    /// Reads one field, or `None` if the field cannot be read.
    fn read_field(&self, slot: &FieldSlot) -> Option<Value>;
}

/// Field values of one object, in layout order.
#[derive(Debug, Clone)]
pub struct ReflectedFields {
    /// Name of the object's type.
    pub type_name: &'static str,
    /// The flattened field layout.
    pub layout: Arc<[FieldSlot]>,
    /// One value per layout slot.
    pub values: Vec<Value>,
}

impl ReflectedFields {
    /// Iterates `(field name, value)` pairs.
    pub fn pairs(&self) -> impl Iterator<Item = (&'static str, &Value)> + '_ {
        self.layout.iter().map(|slot| slot.name).zip(self.values.iter())
    }
}

/// Reads the fields of reflectable values.
///
/// Layouts depend only on the type, so each one is computed once and shared.
/// Entries are keyed by the address of the type's static [`TypeInfo`].
/// Two threads racing on the same type compute identical layouts and either
/// result may be kept.
#[derive(Debug, Default)]
pub struct FieldExtractor {
    layouts: DashMap<usize, Arc<[FieldSlot]>>,
}

fn type_key(info: &'static TypeInfo) -> usize {
    info as *const TypeInfo as usize
}

impl FieldExtractor {
    /// Creates an extractor with an empty layout cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the flattened layout of a type: its own fields first, then
    /// each ancestor's in turn. Synthetic fields are left out.
    pub fn layout(&self, info: &'static TypeInfo, metrics: &KeyMetrics) -> Arc<[FieldSlot]> {
        if let Some(layout) = self.layouts.get(&type_key(info)) {
            metrics.record_layout_hit();
            return Arc::clone(layout.value());
        }

        metrics.record_layout_miss();
        let layout = flatten(info);
        debug!(
            type_name = info.name,
            fields = layout.len(),
            "Computed field layout"
        );
        Arc::clone(self.layouts.entry(type_key(info)).or_insert(layout).value())
    }

    /// Reads every field of `object` in layout order.
    pub fn extract(&self, object: &dyn Reflect, metrics: &KeyMetrics) -> Result<ReflectedFields> {
        let info = object.type_info();
        let layout = self.layout(info, metrics);
        let values = layout
            .iter()
            .map(|slot| {
                object
                    .read_field(slot)
                    .ok_or_else(|| Error::field_access(slot.owner.name, slot.name))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ReflectedFields {
            type_name: info.name,
            layout,
            values,
        })
    }

    /// Number of cached layouts.
    pub fn cached_layouts(&self) -> usize {
        self.layouts.len()
    }
}

/// Field values read out of a borrowed reflectable value.
///
/// `#[derive(Reflect)]` converts a struct held by value through this, so a
/// reflectable struct can nest another one without an `Arc`. The snapshot
/// reports its source's type and keys exactly as the source would under
/// reflection; its identity is the snapshot's own. Unreadable fields are
/// kept as gaps and still fail extraction.
pub struct FieldSnapshot<T> {
    info: &'static TypeInfo,
    layout: Arc<[FieldSlot]>,
    values: Vec<Option<Value>>,
    _source: PhantomData<fn() -> T>,
}

impl<T: Reflect> FieldSnapshot<T> {
    /// Reads every field of `source`.
    pub fn capture(source: &T) -> Self {
        let info = source.type_info();
        let layout = flatten(info);
        let values = layout.iter().map(|slot| source.read_field(slot)).collect();
        Self {
            info,
            layout,
            values,
            _source: PhantomData,
        }
    }
}

impl<T> fmt::Debug for FieldSnapshot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSnapshot")
            .field("type_name", &self.info.name)
            .field("layout", &self.layout)
            .finish()
    }
}

impl<T: Reflect> Reflect for FieldSnapshot<T> {
    fn reflected_type() -> &'static TypeInfo {
        T::reflected_type()
    }

    fn type_info(&self) -> &'static TypeInfo {
        self.info
    }

    fn read_field(&self, slot: &FieldSlot) -> Option<Value> {
        let index = self.layout.iter().position(|candidate| candidate == slot)?;
        self.values.get(index).cloned().flatten()
    }
}

fn flatten(info: &'static TypeInfo) -> Arc<[FieldSlot]> {
    let mut slots = Vec::new();
    let mut current = Some(info);
    while let Some(ty) = current {
        slots.extend(
            ty.fields
                .iter()
                .filter(|field| !field.synthetic)
                .map(|field| FieldSlot {
                    owner: ty,
                    name: field.name,
                }),
        );
        current = ty.parent.map(|parent| parent());
    }
    slots.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Base {
        id: i64,
    }

    impl Reflect for Base {
        fn reflected_type() -> &'static TypeInfo {
            static INFO: TypeInfo = TypeInfo {
                name: "tests::Base",
                fields: &[FieldInfo::new("id")],
                parent: None,
            };
            &INFO
        }

        fn type_info(&self) -> &'static TypeInfo {
            Self::reflected_type()
        }

        fn read_field(&self, slot: &FieldSlot) -> Option<Value> {
            match slot.name {
                "id" if slot.is_owned_by(Self::reflected_type()) => Some(Value::from(self.id)),
                _ => None,
            }
        }
    }

    #[derive(Debug)]
    struct Derived {
        id: i32,
        label: &'static str,
        base: Base,
    }

    impl Reflect for Derived {
        fn reflected_type() -> &'static TypeInfo {
            static INFO: TypeInfo = TypeInfo {
                name: "tests::Derived",
                fields: &[
                    FieldInfo::new("id"),
                    FieldInfo::synthetic("hash_cache"),
                    FieldInfo::new("label"),
                ],
                parent: Some(<Base as Reflect>::reflected_type),
            };
            &INFO
        }

        fn type_info(&self) -> &'static TypeInfo {
            Self::reflected_type()
        }

        fn read_field(&self, slot: &FieldSlot) -> Option<Value> {
            if !slot.is_owned_by(Self::reflected_type()) {
                return self.base.read_field(slot);
            }
            match slot.name {
                "id" => Some(Value::from(self.id)),
                // Simulates a field the type refuses to expose.
                "label" if self.label == "secret" => None,
                "label" => Some(Value::from(self.label)),
                _ => None,
            }
        }
    }

    fn derived(label: &'static str) -> Derived {
        Derived {
            id: 1,
            label,
            base: Base { id: 2 },
        }
    }

    #[test]
    fn test_layout_lists_own_fields_before_ancestors() {
        let extractor = FieldExtractor::new();
        let layout = extractor.layout(Derived::reflected_type(), &KeyMetrics::new());
        let derived = Derived::reflected_type();
        let base = Base::reflected_type();
        assert_eq!(
            &*layout,
            &[
                FieldSlot {
                    owner: derived,
                    name: "id"
                },
                FieldSlot {
                    owner: derived,
                    name: "label"
                },
                FieldSlot {
                    owner: base,
                    name: "id"
                },
            ]
        );
    }

    #[test]
    fn test_shadowed_fields_are_read_from_their_owner() {
        let extractor = FieldExtractor::new();
        let fields = extractor.extract(&derived("x"), &KeyMetrics::new()).unwrap();
        let values: Vec<String> = fields.values.iter().map(|v| format!("{:?}", v)).collect();
        assert_eq!(values.len(), 3);
        assert!(values[0].contains("I32(1)"));
        assert!(values[2].contains("I64(2)"));
    }

    #[test]
    fn test_layout_is_cached_per_type() {
        let extractor = FieldExtractor::new();
        let metrics = KeyMetrics::new();
        let first = extractor.layout(Derived::reflected_type(), &metrics);
        let second = extractor.layout(Derived::reflected_type(), &metrics);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(extractor.cached_layouts(), 1);
        assert_eq!(metrics.layout_misses(), 1);
        assert_eq!(metrics.layout_hits(), 1);
    }

    #[test]
    fn test_unreadable_field_is_an_error() {
        let extractor = FieldExtractor::new();
        let err = extractor
            .extract(&derived("secret"), &KeyMetrics::new())
            .unwrap_err();
        assert_eq!(err, Error::field_access("tests::Derived", "label"));
    }

    #[derive(Debug)]
    struct Renamed {
        id: i64,
    }

    impl Reflect for Renamed {
        fn reflected_type() -> &'static TypeInfo {
            // Shares its name with `Base` but declares a different field set.
            static INFO: TypeInfo = TypeInfo {
                name: "tests::Base",
                fields: &[FieldInfo::new("id"), FieldInfo::new("extra")],
                parent: None,
            };
            &INFO
        }

        fn type_info(&self) -> &'static TypeInfo {
            Self::reflected_type()
        }

        fn read_field(&self, slot: &FieldSlot) -> Option<Value> {
            match slot.name {
                "id" => Some(Value::from(self.id)),
                "extra" => Some(Value::from(true)),
                _ => None,
            }
        }
    }

    #[test]
    fn test_layouts_are_cached_by_type_not_name() {
        let extractor = FieldExtractor::new();
        let metrics = KeyMetrics::new();
        let base = extractor.extract(&Base { id: 1 }, &metrics).unwrap();
        let renamed = extractor.extract(&Renamed { id: 1 }, &metrics).unwrap();

        assert_eq!(base.values.len(), 1);
        assert_eq!(renamed.values.len(), 2);
        assert_eq!(extractor.cached_layouts(), 2);
        assert_eq!(metrics.layout_misses(), 2);
    }

    #[test]
    fn test_slots_compare_by_owner_identity() {
        let base = FieldSlot {
            owner: Base::reflected_type(),
            name: "id",
        };
        let renamed = FieldSlot {
            owner: Renamed::reflected_type(),
            name: "id",
        };
        assert_eq!(base.owner.name, renamed.owner.name);
        assert_ne!(base, renamed);
        assert!(base.is_owned_by(Base::reflected_type()));
        assert!(!base.is_owned_by(Renamed::reflected_type()));
    }

    #[test]
    fn test_snapshot_reads_like_its_source() {
        let extractor = FieldExtractor::new();
        let metrics = KeyMetrics::new();
        let direct = extractor.extract(&derived("x"), &metrics).unwrap();
        let snapshot = FieldSnapshot::capture(&derived("x"));
        let captured = extractor.extract(&snapshot, &metrics).unwrap();

        assert_eq!(captured.type_name, "tests::Derived");
        assert_eq!(captured.layout, direct.layout);
        assert_eq!(
            format!("{:?}", captured.values),
            format!("{:?}", direct.values)
        );
        assert_eq!(metrics.layout_hits(), 1);
    }

    #[test]
    fn test_snapshot_keeps_unreadable_fields_as_errors() {
        let snapshot = FieldSnapshot::capture(&derived("secret"));
        let err = FieldExtractor::new()
            .extract(&snapshot, &KeyMetrics::new())
            .unwrap_err();
        assert_eq!(err, Error::field_access("tests::Derived", "label"));
    }
}
