//! Shared, identity-bearing composite handles.

use super::{ArrayKind, Primitive, PrimitiveKind, Value};
use crate::error::{Error, Result};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Reference identity of a shared value: the address of its allocation.
///
/// Two handles have the same identity only if they point at the same
/// allocation, regardless of whether their contents compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity(usize);

impl Identity {
    /// Returns the identity of the value behind an `Arc`.
    pub fn of<T: ?Sized>(arc: &Arc<T>) -> Self {
        Identity(Arc::as_ptr(arc) as *const () as usize)
    }

    /// Returns the raw address.
    pub fn addr(self) -> usize {
        self.0
    }
}

/// A mutable value shared between several owners.
///
/// Handles are cheap to clone and all clones share one identity, which is
/// what lets a caller assemble a graph that refers back to itself.
pub struct Shared<T> {
    inner: Arc<RwLock<T>>,
}

impl<T> Shared<T> {
    /// Wraps a value in a new shared handle.
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(RwLock::new(value)),
        }
    }

    /// Returns the identity of this handle.
    pub fn identity(&self) -> Identity {
        Identity::of(&self.inner)
    }

    /// Returns true if both handles point at the same value.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Locks the value for reading.
    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Locks the value for writing.
    pub fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Clone> Shared<T> {
    /// Clones the current contents out of the lock.
    pub fn snapshot(&self) -> T {
        self.read().clone()
    }
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Default> Default for Shared<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

// Contents are not printed: the graph behind a handle may be cyclic.
impl<T> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Shared({:#x})", self.identity().addr())
    }
}

/// A fixed-length array whose slots can be replaced in place.
#[derive(Clone)]
pub struct Array {
    kind: ArrayKind,
    items: Shared<Vec<Value>>,
}

impl Array {
    /// Creates an array of `len` null slots that accepts any value.
    pub fn with_len(len: usize) -> Self {
        Self {
            kind: ArrayKind::Reference,
            items: Shared::new(vec![Value::Null; len]),
        }
    }

    /// Creates an array that accepts any value.
    pub fn of_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        Self {
            kind: ArrayKind::Reference,
            items: Shared::new(values.into_iter().collect()),
        }
    }

    /// Creates a primitive array of the given kind.
    ///
    /// Fails if any value is not a primitive of that kind.
    pub fn of_primitives<I>(kind: PrimitiveKind, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = Primitive>,
    {
        let items = values
            .into_iter()
            .map(|value| {
                if value.kind() == kind {
                    Ok(Value::Primitive(value))
                } else {
                    Err(Error::ElementKind {
                        expected: ArrayKind::Primitive(kind).to_string(),
                        found: value.kind().to_string(),
                    })
                }
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            kind: ArrayKind::Primitive(kind),
            items: Shared::new(items),
        })
    }

    /// Builds an array whose elements are already known to match `kind`.
    pub(crate) fn from_parts(kind: ArrayKind, items: Vec<Value>) -> Self {
        Self {
            kind,
            items: Shared::new(items),
        }
    }

    /// Returns the element kind.
    pub fn kind(&self) -> ArrayKind {
        self.kind
    }

    /// Returns the fixed length.
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    /// Returns true if the array has no slots.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the identity of this array.
    pub fn identity(&self) -> Identity {
        self.items.identity()
    }

    /// Returns a clone of the value in slot `index`.
    pub fn get(&self, index: usize) -> Option<Value> {
        self.items.read().get(index).cloned()
    }

    /// Replaces the value in slot `index`.
    pub fn set(&self, index: usize, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        if let ArrayKind::Primitive(kind) = self.kind {
            match &value {
                Value::Primitive(p) if p.kind() == kind => {}
                other => {
                    return Err(Error::ElementKind {
                        expected: self.kind.to_string(),
                        found: other.describe(),
                    })
                }
            }
        }

        let mut items = self.items.write();
        let len = items.len();
        let slot = items
            .get_mut(index)
            .ok_or(Error::IndexOutOfBounds { index, len })?;
        *slot = value;
        Ok(())
    }

    /// Clones the current elements out of the array.
    pub fn snapshot(&self) -> Vec<Value> {
        self.items.snapshot()
    }
}

impl fmt::Debug for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Array")
            .field("kind", &self.kind)
            .field("len", &self.len())
            .field("id", &format_args!("{:#x}", self.identity().addr()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_identity() {
        let shared = Shared::new(vec![1, 2, 3]);
        let other = shared.clone();
        assert_eq!(shared.identity(), other.identity());
        assert!(shared.ptr_eq(&other));

        other.write().push(4);
        assert_eq!(shared.snapshot(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_equal_contents_have_distinct_identities() {
        let a = Shared::new(vec![1]);
        let b = Shared::new(vec![1]);
        assert_ne!(a.identity(), b.identity());
    }

    #[test]
    fn test_array_set_checks_bounds() {
        let array = Array::with_len(2);
        array.set(1, "x").unwrap();
        assert_eq!(
            array.set(2, "y"),
            Err(Error::IndexOutOfBounds { index: 2, len: 2 })
        );
        assert!(matches!(array.get(1), Some(Value::Text(_))));
    }

    #[test]
    fn test_primitive_array_rejects_other_kinds() {
        let array = Array::of_primitives(PrimitiveKind::I32, [Primitive::I32(1)]).unwrap();
        assert!(array.set(0, 7i32).is_ok());
        assert!(matches!(
            array.set(0, 7i64),
            Err(Error::ElementKind { .. })
        ));
        assert!(Array::of_primitives(PrimitiveKind::I8, [Primitive::I16(1)]).is_err());
    }

    #[test]
    fn test_debug_does_not_follow_cycles() {
        let array = Array::with_len(1);
        array.set(0, array.clone()).unwrap();
        let printed = format!("{:?}", array);
        assert!(printed.starts_with("Array"));
    }
}
