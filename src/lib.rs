#![warn(missing_docs)]
//! # deepkey
//!
//! Deterministic cache keys for arbitrary call arguments.
//!
//! A generator walks every argument graph depth first (nulls, primitives,
//! text, enums, type literals, arrays, lists, sets, maps and reflectable
//! objects), cuts circular references, and folds the walk either into a
//! [`StructuralKey`] compared by deep equality or into a single `i64`.
//!
//! ```
//! use deepkey::prelude::*;
//!
//! let generator = HashCodeKeyGenerator::with_config(KeyGeneratorConfig::arguments_only());
//!
//! let key = generator.generate_key(&Invocation::new().arg(&-1)).unwrap();
//! assert_eq!(key, 30);
//!
//! let a = generator.generate_key(&Invocation::new().arg(&1.5f32)).unwrap();
//! let b = generator.generate_key(&Invocation::new().arg(&1.7f32)).unwrap();
//! assert_ne!(a, b);
//! ```
//!
//! Structured values opt in to field-by-field decomposition with
//! `#[derive(Reflect)]`; enums become name-based constants with
//! `#[derive(KeyEnum)]`.
//!
//! ```
//! use deepkey::prelude::*;
//! use deepkey::{KeyEnum, Reflect};
//!
//! #[derive(Debug, Clone, Copy, KeyEnum)]
//! enum Region {
//!     Eu,
//!     Us,
//! }
//!
//! #[derive(Debug, Reflect)]
//! struct Query {
//!     region: Region,
//!     terms: Vec<String>,
//! }
//!
//! let generator = StructuralKeyGenerator::with_config(
//!     KeyGeneratorConfig::arguments_only().with_reflection(true),
//! );
//! let query = |region| Value::object(Query { region, terms: vec!["rust".into()] });
//!
//! let eu = generator.key_for(&[query(Region::Eu)]).unwrap();
//! assert_eq!(eu, generator.key_for(&[query(Region::Eu)]).unwrap());
//! assert_ne!(eu, generator.key_for(&[query(Region::Us)]).unwrap());
//! ```

// Lets derived code refer to `::deepkey` from inside this crate's tests.
extern crate self as deepkey;

pub mod builders;
pub mod config;
pub mod error;
pub mod guard;
pub mod hash;
pub mod key_derivation;
pub mod metrics;
pub mod reflect;
pub mod value;
pub mod walker;


pub use builders::hash_code::HashCombiner;
pub use builders::structural::{KeyNode, StructuralKey, StructuralKeyBuilder};
pub use builders::KeyBuilder;
pub use config::{KeyDerivation, KeyGeneratorConfig};
pub use error::Error;
pub use guard::CycleGuard;
pub use key_derivation::{
    CacheKey, CacheKeyGenerator, DeepKeyGenerator, HashCodeKeyGenerator, Invocation, KeyGenerator,
    MethodSignature, StructuralKeyGenerator,
};
pub use metrics::KeyMetrics;
pub use reflect::{
    FieldExtractor, FieldInfo, FieldSlot, FieldSnapshot, Reflect, ReflectedFields, TypeInfo,
};
pub use value::{
    Array, ArrayKind, EnumValue, Identity, OpaqueValue, Primitive, PrimitiveKind, Shared, ToValue,
    TypeName, Value,
};
pub use walker::GraphWalker;

/// Derive macros.
///
/// `Reflect` implements [`Reflect`](trait@Reflect) for a struct:
///
/// - `#[reflect(parent)]` marks one field as the embedded ancestor whose
///   fields are listed after the struct's own.
/// - `#[reflect(skip)]` leaves a field out of keys; `PhantomData` fields are
///   left out automatically.
///
/// `KeyEnum` implements [`ToValue`] for a fieldless enum, keyed by the
/// type and variant names.
#[doc(inline)]
pub use deepkey_macros::{KeyEnum, Reflect};

/// The main key generation result type.
pub type Result<T> = std::result::Result<T, error::Error>;

/// Common prelude for using the library.
pub mod prelude {
    pub use crate::{
        CacheKey, CacheKeyGenerator, Error, HashCodeKeyGenerator, Invocation, KeyDerivation,
        KeyGenerator, KeyGeneratorConfig, MethodSignature, Result, StructuralKey,
        StructuralKeyGenerator, ToValue, Value,
    };
}
