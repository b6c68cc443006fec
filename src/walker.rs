//! Recursive classification of argument graphs.

use crate::builders::{Composite, KeyBuilder, Opaque};
use crate::config::KeyGeneratorConfig;
use crate::error::Result;
use crate::guard::{CycleGuard, Visit};
use crate::metrics::KeyMetrics;
use crate::reflect::{FieldExtractor, Reflect};
use crate::value::{Identity, Value};
use std::sync::Arc;
use tracing::trace;

/// Walks argument graphs depth first, emitting one builder event per node.
///
/// The walker itself is stateless between calls; the per-call
/// [`CycleGuard`] is passed in by the caller.
#[derive(Debug, Clone, Copy)]
pub struct GraphWalker<'a> {
    config: &'a KeyGeneratorConfig,
    fields: &'a FieldExtractor,
    metrics: &'a KeyMetrics,
}

impl<'a> GraphWalker<'a> {
    /// Creates a walker over the given configuration and field extractor.
    pub fn new(
        config: &'a KeyGeneratorConfig,
        fields: &'a FieldExtractor,
        metrics: &'a KeyMetrics,
    ) -> Self {
        Self {
            config,
            fields,
            metrics,
        }
    }

    /// Walks each value in order.
    pub fn walk_all<B: KeyBuilder>(
        &self,
        values: &[Value],
        guard: &mut CycleGuard,
        builder: &mut B,
    ) -> Result<()> {
        for value in values {
            self.walk(value, guard, builder)?;
        }
        Ok(())
    }

    /// Walks one value and everything reachable from it.
    pub fn walk<B: KeyBuilder>(
        &self,
        value: &Value,
        guard: &mut CycleGuard,
        builder: &mut B,
    ) -> Result<()> {
        match value {
            Value::Null => builder.null(),
            Value::Primitive(primitive) => builder.primitive(*primitive),
            Value::Text(text) => builder.text(text),
            Value::Enum(member) => builder.enum_value(member),
            Value::Type(name) => builder.type_literal(name),
            Value::Array(array) => {
                return self.descend(array.identity(), guard, builder, |guard, builder| {
                    builder.begin(Composite::Array(array.kind()));
                    self.walk_all(&array.snapshot(), guard, builder)?;
                    builder.end();
                    Ok(())
                });
            }
            Value::Map(entries) => {
                return self.descend(entries.identity(), guard, builder, |guard, builder| {
                    builder.begin(Composite::Map);
                    for (key, value) in entries.snapshot() {
                        builder.begin(Composite::Entry);
                        self.walk(&key, guard, builder)?;
                        self.walk(&value, guard, builder)?;
                        builder.end();
                    }
                    builder.end();
                    Ok(())
                });
            }
            Value::List(items) => {
                return self.descend(items.identity(), guard, builder, |guard, builder| {
                    builder.begin(Composite::List);
                    self.walk_all(&items.snapshot(), guard, builder)?;
                    builder.end();
                    Ok(())
                });
            }
            Value::Set(items) => {
                return self.descend(items.identity(), guard, builder, |guard, builder| {
                    builder.begin(Composite::Set);
                    self.walk_all(&items.snapshot(), guard, builder)?;
                    builder.end();
                    Ok(())
                });
            }
            Value::Object(object) if self.config.use_reflection => {
                return self.descend(Identity::of(object), guard, builder, |guard, builder| {
                    self.reflect(object.as_ref(), guard, builder)
                });
            }
            Value::Object(object) => {
                self.metrics.record_opaque();
                builder.opaque(Opaque::Identity(Arc::clone(object)));
            }
            Value::Opaque(opaque) => {
                self.metrics.record_opaque();
                builder.opaque(Opaque::Value(Arc::clone(opaque)));
            }
        }
        Ok(())
    }

    fn reflect<B: KeyBuilder>(
        &self,
        object: &dyn Reflect,
        guard: &mut CycleGuard,
        builder: &mut B,
    ) -> Result<()> {
        let fields = self.fields.extract(object, self.metrics)?;
        self.metrics.record_reflected();

        builder.begin(Composite::Object {
            type_name: fields.type_name,
            layout: &fields.layout,
        });
        self.walk_all(&fields.values, guard, builder)?;
        builder.end();
        Ok(())
    }

    /// Runs `body` with `id` pushed on the guard's path, or emits a cycle
    /// marker if `id` is already an ancestor.
    fn descend<B, F>(
        &self,
        id: Identity,
        guard: &mut CycleGuard,
        builder: &mut B,
        body: F,
    ) -> Result<()>
    where
        B: KeyBuilder,
        F: FnOnce(&mut CycleGuard, &mut B) -> Result<()>,
    {
        match guard.enter(id) {
            Visit::Cycle => {
                trace!(depth = guard.depth(), "Circular reference cut");
                self.metrics.record_cycle();
                builder.cycle();
                Ok(())
            }
            Visit::First => {
                let result = body(guard, builder);
                guard.exit(id);
                result
            }
            Visit::Untracked => body(guard, builder),
        }
    }
}
