//! Single-pass 64-bit hash key.

use super::{Composite, KeyBuilder, Opaque};
use crate::hash::{fold, string_hash, NULL_HASH, SEED};
use crate::value::{ArrayKind, EnumValue, Primitive, TypeName};
use std::sync::Arc;

/// Folds a walk into one `i64` without building an intermediate tree.
///
/// Each open composite owns an accumulator seeded with 1; closing it folds
/// the accumulator into its parent. Primitive arrays first fold a kind tag
/// into the parent so that empty arrays of different kinds stay distinct.
#[derive(Debug)]
pub struct HashCombiner {
    stack: Vec<i64>,
}

impl Default for HashCombiner {
    fn default() -> Self {
        Self { stack: vec![SEED] }
    }
}

impl HashCombiner {
    fn fold(&mut self, contribution: i64) {
        if let Some(seed) = self.stack.last_mut() {
            *seed = fold(*seed, contribution);
        }
    }

    /// Depth of open composites, not counting the root.
    pub fn depth(&self) -> usize {
        self.stack.len().saturating_sub(1)
    }
}

impl KeyBuilder for HashCombiner {
    type Key = i64;

    fn null(&mut self) {
        self.fold(NULL_HASH);
    }

    fn primitive(&mut self, value: Primitive) {
        self.fold(value.hash_contribution());
    }

    fn text(&mut self, value: &Arc<str>) {
        self.fold(string_hash(value));
    }

    fn enum_value(&mut self, value: &EnumValue) {
        self.fold(value.hash_contribution());
    }

    fn type_literal(&mut self, value: &TypeName) {
        self.fold(value.hash_contribution());
    }

    fn opaque(&mut self, value: Opaque) {
        self.fold(value.hash_contribution());
    }

    fn cycle(&mut self) {
        self.fold(NULL_HASH);
    }

    fn begin(&mut self, composite: Composite<'_>) {
        if let Composite::Array(ArrayKind::Primitive(kind)) = composite {
            self.fold(kind.array_tag());
        }
        self.stack.push(SEED);
        if let Composite::Object { type_name, .. } = composite {
            self.fold(string_hash(type_name));
        }
    }

    fn end(&mut self) {
        if self.stack.len() > 1 {
            if let Some(seed) = self.stack.pop() {
                self.fold(seed);
            }
        }
    }

    fn finish(self) -> i64 {
        self.stack.first().copied().unwrap_or(SEED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::PrimitiveKind;

    #[test]
    fn test_empty_root_is_seed() {
        assert_eq!(HashCombiner::default().finish(), 1);
    }

    #[test]
    fn test_single_int_folds_into_root() {
        let mut builder = HashCombiner::default();
        builder.primitive(Primitive::I32(-1));
        assert_eq!(builder.finish(), 30);
    }

    #[test]
    fn test_nested_composite_folds_into_parent() {
        let mut builder = HashCombiner::default();
        builder.begin(Composite::List);
        builder.primitive(Primitive::I32(1));
        builder.primitive(Primitive::I32(2));
        assert_eq!(builder.depth(), 1);
        builder.end();
        // root: 31 * 1 + (31 * (31 * 1 + 1) + 2)
        assert_eq!(builder.finish(), 31 + 994);
    }

    #[test]
    fn test_empty_arrays_of_different_kinds_differ() {
        let key = |kind| {
            let mut builder = HashCombiner::default();
            builder.begin(Composite::Array(ArrayKind::Primitive(kind)));
            builder.end();
            builder.finish()
        };
        assert_ne!(key(PrimitiveKind::I8), key(PrimitiveKind::I64));

        let mut builder = HashCombiner::default();
        builder.begin(Composite::Array(ArrayKind::Reference));
        builder.end();
        assert_eq!(builder.finish(), 32);
    }

    #[test]
    fn test_unbalanced_end_keeps_root() {
        let mut builder = HashCombiner::default();
        builder.end();
        builder.null();
        assert_eq!(builder.finish(), 31);
    }
}
