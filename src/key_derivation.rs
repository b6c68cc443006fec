//! Key derivation for intercepted calls
//!
//! This module turns an [`Invocation`] into a cache key. The generic
//! [`DeepKeyGenerator`] walks the arguments once and hands every node to a
//! [`KeyBuilder`]; the builder decides what kind of key comes out.

use crate::builders::hash_code::HashCombiner;
use crate::builders::structural::{StructuralKey, StructuralKeyBuilder};
use crate::builders::{Composite, KeyBuilder};
use crate::config::{KeyDerivation, KeyGeneratorConfig};
use crate::error::{Error, Result};
use crate::guard::CycleGuard;
use crate::metrics::KeyMetrics;
use crate::reflect::FieldExtractor;
use crate::value::{ToValue, TypeName, Value};
use crate::walker::GraphWalker;
use std::fmt::Debug;
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, trace};

/// Static description of the invoked method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    declaring_type: TypeName,
    name: Arc<str>,
    parameter_types: Vec<TypeName>,
}

impl MethodSignature {
    /// Describes method `name` declared on `declaring_type`, taking no
    /// parameters.
    pub fn new(declaring_type: impl Into<TypeName>, name: impl Into<Arc<str>>) -> Self {
        Self {
            declaring_type: declaring_type.into(),
            name: name.into(),
            parameter_types: Vec::new(),
        }
    }

    /// Appends a parameter type.
    pub fn param(mut self, parameter_type: impl Into<TypeName>) -> Self {
        self.parameter_types.push(parameter_type.into());
        self
    }

    /// Appends a parameter of Rust type `T`.
    pub fn param_of<T: ?Sized>(self) -> Self {
        self.param(TypeName::of::<T>())
    }

    /// The type declaring the method.
    pub fn declaring_type(&self) -> &TypeName {
        &self.declaring_type
    }

    /// The method name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared parameter types, in order.
    pub fn parameter_types(&self) -> &[TypeName] {
        &self.parameter_types
    }
}

/// One call handed to a generator: an optional signature and the ordered
/// argument values.
#[derive(Debug, Clone, Default)]
pub struct Invocation {
    signature: Option<MethodSignature>,
    arguments: Vec<Value>,
}

impl Invocation {
    /// Creates an invocation with no signature and no arguments.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an invocation of the given method with no arguments yet.
    pub fn for_method(signature: MethodSignature) -> Self {
        Self {
            signature: Some(signature),
            arguments: Vec::new(),
        }
    }

    /// Appends an argument.
    pub fn arg<T: ToValue + ?Sized>(mut self, argument: &T) -> Self {
        self.arguments.push(argument.to_value());
        self
    }

    /// Appends an already converted argument.
    pub fn value(mut self, argument: impl Into<Value>) -> Self {
        self.arguments.push(argument.into());
        self
    }

    /// The method signature, if the caller supplied one.
    pub fn signature(&self) -> Option<&MethodSignature> {
        self.signature.as_ref()
    }

    /// The argument values, in call order.
    pub fn arguments(&self) -> &[Value] {
        &self.arguments
    }
}

impl From<Vec<Value>> for Invocation {
    fn from(arguments: Vec<Value>) -> Self {
        Self {
            signature: None,
            arguments,
        }
    }
}

/// Produces cache keys for invocations.
///
/// Implementations hold no per-call state and may be shared across threads.
pub trait CacheKeyGenerator: Send + Sync + Debug {
    /// The key type.
    type Key: Clone + Eq + Hash + Debug + Send + Sync;

    /// Derives the key for one invocation.
    fn generate_key(&self, invocation: &Invocation) -> Result<Self::Key>;
}

/// Generator that walks the full argument graph and feeds it to builder `B`.
#[derive(Debug)]
pub struct DeepKeyGenerator<B> {
    config: KeyGeneratorConfig,
    fields: Arc<FieldExtractor>,
    metrics: KeyMetrics,
    builder: PhantomData<fn() -> B>,
}

/// Generator producing a single 64-bit hash.
pub type HashCodeKeyGenerator = DeepKeyGenerator<HashCombiner>;

/// Generator producing a [`StructuralKey`].
pub type StructuralKeyGenerator = DeepKeyGenerator<StructuralKeyBuilder>;

impl<B: KeyBuilder> Default for DeepKeyGenerator<B> {
    fn default() -> Self {
        Self::with_config(KeyGeneratorConfig::default())
    }
}

impl<B: KeyBuilder> DeepKeyGenerator<B> {
    /// Creates a generator with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a generator with the given configuration.
    pub fn with_config(config: KeyGeneratorConfig) -> Self {
        debug!(
            builder = std::any::type_name::<B>(),
            include_method_name = config.include_method_name,
            include_signature_types = config.include_declaring_type_and_param_types,
            check_for_cycles = config.check_for_cycles,
            use_reflection = config.use_reflection,
            "Created key generator"
        );
        Self {
            config,
            fields: Arc::new(FieldExtractor::new()),
            metrics: KeyMetrics::new(),
            builder: PhantomData,
        }
    }

    /// Shares a field layout cache with other generators.
    pub fn with_field_extractor(mut self, fields: Arc<FieldExtractor>) -> Self {
        self.fields = fields;
        self
    }

    /// The generator's configuration.
    pub fn config(&self) -> &KeyGeneratorConfig {
        &self.config
    }

    /// Counters accumulated by this generator.
    pub fn metrics(&self) -> &KeyMetrics {
        &self.metrics
    }

    /// The field layout cache used for reflected objects.
    pub fn field_extractor(&self) -> &Arc<FieldExtractor> {
        &self.fields
    }

    /// Derives a key from argument values alone, without a signature.
    pub fn key_for(&self, arguments: &[Value]) -> Result<B::Key> {
        self.build(None, arguments)
    }

    fn build(&self, signature: Option<&MethodSignature>, arguments: &[Value]) -> Result<B::Key> {
        let mut builder = B::default();
        self.write_signature(signature, &mut builder)?;

        let mut guard = if self.config.check_for_cycles {
            CycleGuard::new()
        } else {
            CycleGuard::disabled()
        };
        GraphWalker::new(&self.config, &self.fields, &self.metrics).walk_all(
            arguments,
            &mut guard,
            &mut builder,
        )?;

        self.metrics.record_key();
        trace!(arguments = arguments.len(), "Generated key");
        Ok(builder.finish())
    }

    fn write_signature(&self, signature: Option<&MethodSignature>, builder: &mut B) -> Result<()> {
        if !self.config.includes_signature() {
            return Ok(());
        }
        let signature = signature.ok_or_else(|| {
            Error::MissingSignature(
                if self.config.include_declaring_type_and_param_types {
                    "declaring type and parameter types"
                } else {
                    "method name"
                }
                .to_string(),
            )
        })?;

        if self.config.include_declaring_type_and_param_types {
            builder.type_literal(&signature.declaring_type);
        }
        if self.config.include_method_name {
            builder.text(&signature.name);
        }
        if self.config.include_declaring_type_and_param_types {
            builder.begin(Composite::List);
            for parameter_type in &signature.parameter_types {
                builder.type_literal(parameter_type);
            }
            builder.end();
        }
        Ok(())
    }
}

impl<B> CacheKeyGenerator for DeepKeyGenerator<B>
where
    B: KeyBuilder + Debug,
    B::Key: Clone + Eq + Hash + Debug + Send + Sync,
{
    type Key = B::Key;

    fn generate_key(&self, invocation: &Invocation) -> Result<Self::Key> {
        self.build(invocation.signature(), invocation.arguments())
    }
}

/// A key produced by [`KeyGenerator`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Full structural key.
    Structural(StructuralKey),
    /// Combined 64-bit hash.
    HashCode(i64),
}

impl CacheKey {
    /// The 64-bit hash of the key, whichever strategy produced it.
    pub fn hash_code(&self) -> i64 {
        match self {
            CacheKey::Structural(key) => key.hash_code(),
            CacheKey::HashCode(hash) => *hash,
        }
    }
}

/// Generator whose strategy is chosen by [`KeyGeneratorConfig::derivation`].
#[derive(Debug)]
pub enum KeyGenerator {
    /// Structural keys.
    Structural(StructuralKeyGenerator),
    /// Hash keys.
    HashCode(HashCodeKeyGenerator),
}

impl KeyGenerator {
    /// Builds the generator selected by `config`.
    pub fn from_config(config: KeyGeneratorConfig) -> Self {
        match config.derivation {
            KeyDerivation::Structural => {
                KeyGenerator::Structural(StructuralKeyGenerator::with_config(config))
            }
            KeyDerivation::HashCode => {
                KeyGenerator::HashCode(HashCodeKeyGenerator::with_config(config))
            }
        }
    }

    /// The generator's configuration.
    pub fn config(&self) -> &KeyGeneratorConfig {
        match self {
            KeyGenerator::Structural(generator) => generator.config(),
            KeyGenerator::HashCode(generator) => generator.config(),
        }
    }

    /// Counters accumulated by the generator.
    pub fn metrics(&self) -> &KeyMetrics {
        match self {
            KeyGenerator::Structural(generator) => generator.metrics(),
            KeyGenerator::HashCode(generator) => generator.metrics(),
        }
    }
}

impl Default for KeyGenerator {
    fn default() -> Self {
        Self::from_config(KeyGeneratorConfig::default())
    }
}

impl CacheKeyGenerator for KeyGenerator {
    type Key = CacheKey;

    fn generate_key(&self, invocation: &Invocation) -> Result<CacheKey> {
        match self {
            KeyGenerator::Structural(generator) => {
                generator.generate_key(invocation).map(CacheKey::Structural)
            }
            KeyGenerator::HashCode(generator) => {
                generator.generate_key(invocation).map(CacheKey::HashCode)
            }
        }
    }
}
