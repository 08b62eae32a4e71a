// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Compiled mappers.
//!
//! A `CompiledMapper` is built once per (source, target) pair: field matching
//! and strategy resolution happen at compile time, execution only walks the
//! resulting entries. Small pairs that need no nested mapping or user code also
//! get a flat slot list (the fast plan) that skips per-strategy dispatch.

use super::convert::{apply, CollectionShape, ConvertContext, ConvertError, Conversion};
use super::custom::{ConverterFn, FieldMappingFn};
use super::diagnostics::{DiagnosticSink, SkipReason};
use super::key::TypeKey;
use super::matcher::{match_fields, normalize_name};
use super::resolve::Resolver;
use super::EngineState;
use crate::config::MapperConfig;
use crate::dynamic::{default_value, DynamicData, DynamicValue, TypeDescriptor};
use crate::error::{MapError, Result};
use crate::reflect::Mappable;
use std::fmt;
use std::sync::Arc;

/// How one target field is filled.
#[derive(Clone)]
pub enum Strategy {
    /// Same value type on both sides (or an `Any` target).
    DirectAssign,
    BuiltinConvert(Conversion),
    /// User converter registered for the field's value type pair.
    CustomConverter {
        key: TypeKey,
        convert: Arc<ConverterFn>,
    },
    /// User mapping registered for this target field.
    CustomMapping(Arc<FieldMappingFn>),
    /// Struct to struct through the nested pair's own mapper.
    RecursiveObject(NestedPair),
    /// Collection of structs, element by element.
    RecursiveCollection {
        element: NestedPair,
        shape: CollectionShape,
    },
    Skip,
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::DirectAssign => "DirectAssign",
            Strategy::BuiltinConvert(_) => "BuiltinConvert",
            Strategy::CustomConverter { .. } => "CustomConverter",
            Strategy::CustomMapping(_) => "CustomMapping",
            Strategy::RecursiveObject(_) => "RecursiveObject",
            Strategy::RecursiveCollection { .. } => "RecursiveCollection",
            Strategy::Skip => "Skip",
        }
    }
}

impl fmt::Debug for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::BuiltinConvert(c) => f.debug_tuple("BuiltinConvert").field(c).finish(),
            Strategy::CustomConverter { key, .. } => {
                f.debug_struct("CustomConverter").field("key", key).finish()
            }
            Strategy::RecursiveObject(pair) => {
                f.debug_tuple("RecursiveObject").field(&pair.key).finish()
            }
            Strategy::RecursiveCollection { element, shape } => f
                .debug_struct("RecursiveCollection")
                .field("element", &element.key)
                .field("shape", shape)
                .finish(),
            other => f.write_str(other.name()),
        }
    }
}

/// Resolved descriptors of a nested (source, target) struct pair.
#[derive(Debug, Clone)]
pub struct NestedPair {
    key: TypeKey,
    source: Arc<TypeDescriptor>,
    target: Arc<TypeDescriptor>,
}

impl NestedPair {
    pub(crate) fn new(source: Arc<TypeDescriptor>, target: Arc<TypeDescriptor>) -> Self {
        Self {
            key: TypeKey::of(&source, &target),
            source,
            target,
        }
    }

    pub fn key(&self) -> &TypeKey {
        &self.key
    }

    pub fn source(&self) -> &Arc<TypeDescriptor> {
        &self.source
    }

    pub fn target(&self) -> &Arc<TypeDescriptor> {
        &self.target
    }
}

/// One writable target field of a compiled plan.
#[derive(Debug, Clone)]
pub struct FieldPlanEntry {
    pub target_index: usize,
    pub target_name: String,
    /// Target field accepts null.
    pub target_nullable: bool,
    pub source_index: Option<usize>,
    pub strategy: Strategy,
}

#[derive(Debug, Clone)]
struct FastSlot {
    target_index: usize,
    target_name: String,
    target_nullable: bool,
    source_index: usize,
    conversion: Option<Conversion>,
}

/// Immutable copy routine for one (source, target) type pair.
pub struct CompiledMapper {
    key: TypeKey,
    source: Arc<TypeDescriptor>,
    target: Arc<TypeDescriptor>,
    entries: Vec<FieldPlanEntry>,
    fast: Option<Vec<FastSlot>>,
    template: DynamicValue,
}

impl CompiledMapper {
    /// Build the plan for `source -> target` (both resolved struct descriptors).
    pub(crate) fn compile(
        engine: &EngineState,
        config: &MapperConfig,
        source: Arc<TypeDescriptor>,
        target: Arc<TypeDescriptor>,
    ) -> Self {
        let key = TypeKey::of(&source, &target);
        let source_fields = engine.fields(&source);
        let target_fields = engine.fields(&target);
        let resolver = Resolver {
            types: &engine.types,
            custom: &engine.custom,
            key: &key,
        };

        let entries: Vec<FieldPlanEntry> = match_fields(&source_fields, &target_fields)
            .into_iter()
            .filter_map(|m| {
                let target_field = target_fields.get(m.target_index)?;
                let source_field = m.source_index.and_then(|i| source_fields.get(i));
                Some(FieldPlanEntry {
                    target_index: m.target_index,
                    target_name: target_field.name.clone(),
                    target_nullable: target_field.optional,
                    source_index: m.source_index,
                    strategy: resolver.resolve_field(target_field, source_field),
                })
            })
            .collect();

        let small = source_fields.len() <= config.fast_plan_max_fields
            && target_fields.len() <= config.fast_plan_max_fields;
        let fast = if config.fast_plan && small {
            flatten(&entries)
        } else {
            None
        };

        log::debug!(
            "[plan] compiled {}: {} entries, {} skipped{}",
            key,
            entries.len(),
            entries
                .iter()
                .filter(|e| matches!(e.strategy, Strategy::Skip))
                .count(),
            if fast.is_some() { ", fast" } else { "" }
        );

        let template = default_value(&target.kind);
        Self {
            key,
            source,
            target,
            entries,
            fast,
            template,
        }
    }

    pub fn key(&self) -> &TypeKey {
        &self.key
    }

    pub fn source(&self) -> &Arc<TypeDescriptor> {
        &self.source
    }

    pub fn target(&self) -> &Arc<TypeDescriptor> {
        &self.target
    }

    /// Plan entries in target declaration order.
    pub fn entries(&self) -> &[FieldPlanEntry] {
        &self.entries
    }

    /// Entry for a target field, by case-insensitive name.
    pub fn entry(&self, target_field: &str) -> Option<&FieldPlanEntry> {
        let wanted = normalize_name(target_field);
        self.entries
            .iter()
            .find(|e| normalize_name(&e.target_name) == wanted)
    }

    /// `true` if this mapper runs the flat fast plan.
    pub fn is_fast(&self) -> bool {
        self.fast.is_some()
    }

    /// Fresh target instance with every field at its default.
    pub fn instantiate(&self) -> DynamicData {
        DynamicData::from_parts(self.target.clone(), self.template.clone())
    }

    /// Same key and same descriptor shapes.
    pub(crate) fn matches(&self, source: &Arc<TypeDescriptor>, target: &Arc<TypeDescriptor>) -> bool {
        let same = |a: &Arc<TypeDescriptor>, b: &Arc<TypeDescriptor>| Arc::ptr_eq(a, b) || **a == **b;
        same(&self.source, source) && same(&self.target, target)
    }

    /// Copy `source` into `target`.
    pub(crate) fn execute(
        &self,
        source: &dyn Mappable,
        target: &mut dyn Mappable,
        session: &mut Session<'_>,
    ) -> Result<()> {
        match &self.fast {
            Some(slots) => {
                for slot in slots {
                    self.run_slot(slot, source, target, session);
                }
                Ok(())
            }
            None => {
                for entry in &self.entries {
                    self.run_entry(entry, source, target, session)?;
                }
                Ok(())
            }
        }
    }

    /// Same as `execute` but always through the full plan.
    #[cfg(test)]
    pub(crate) fn execute_full(
        &self,
        source: &dyn Mappable,
        target: &mut dyn Mappable,
        session: &mut Session<'_>,
    ) -> Result<()> {
        for entry in &self.entries {
            self.run_entry(entry, source, target, session)?;
        }
        Ok(())
    }

    fn run_slot(
        &self,
        slot: &FastSlot,
        source: &dyn Mappable,
        target: &mut dyn Mappable,
        session: &mut Session<'_>,
    ) {
        let field = Slot {
            target_index: slot.target_index,
            name: &slot.target_name,
            nullable: slot.target_nullable,
        };
        let Some(value) = take(&field, slot.source_index, source, target, &mut session.sink) else {
            return;
        };
        let value = match &slot.conversion {
            None => Some(value),
            Some(conversion) => session.convert(conversion, value, field.name),
        };
        if let Some(value) = value {
            put(&field, value, target, &mut session.sink);
        }
    }

    fn run_entry(
        &self,
        entry: &FieldPlanEntry,
        source: &dyn Mappable,
        target: &mut dyn Mappable,
        session: &mut Session<'_>,
    ) -> Result<()> {
        let field = Slot {
            target_index: entry.target_index,
            name: &entry.target_name,
            nullable: entry.target_nullable,
        };
        match &entry.strategy {
            Strategy::Skip => return Ok(()),
            Strategy::CustomMapping(f) => {
                let value = f(source).map_err(|e| MapError::field_mapping(field.name, e))?;
                put(&field, value, target, &mut session.sink);
                return Ok(());
            }
            _ => {}
        }

        let Some(index) = entry.source_index else {
            return Ok(());
        };
        let Some(value) = take(&field, index, source, target, &mut session.sink) else {
            return Ok(());
        };

        let value = match &entry.strategy {
            Strategy::DirectAssign => Some(value),
            Strategy::BuiltinConvert(conversion) => session.convert(conversion, value, field.name),
            Strategy::CustomConverter { key, convert } => {
                Some(convert(value).map_err(|source| MapError::Converter {
                    from: key.source().to_string(),
                    to: key.target().to_string(),
                    source,
                })?)
            }
            Strategy::RecursiveObject(pair) => {
                let base = target
                    .read_field(entry.target_index)
                    .filter(|v| matches!(v, DynamicValue::Struct(_)));
                session.map_nested(pair, value, base, field.name)?
            }
            Strategy::RecursiveCollection { element, shape } => {
                session.map_collection(element, shape, value, field.name)?
            }
            Strategy::Skip | Strategy::CustomMapping(_) => None,
        };
        if let Some(value) = value {
            put(&field, value, target, &mut session.sink);
        }
        Ok(())
    }
}

impl fmt::Debug for CompiledMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledMapper")
            .field("key", &self.key)
            .field("entries", &self.entries)
            .field("fast", &self.is_fast())
            .finish()
    }
}

/// Flat slots for a plan made only of direct assigns and built-in conversions.
fn flatten(entries: &[FieldPlanEntry]) -> Option<Vec<FastSlot>> {
    entries
        .iter()
        .filter(|e| !matches!(e.strategy, Strategy::Skip))
        .map(|e| {
            let conversion = match &e.strategy {
                Strategy::DirectAssign => None,
                Strategy::BuiltinConvert(c) => Some(c.clone()),
                _ => return None,
            };
            Some(FastSlot {
                target_index: e.target_index,
                target_name: e.target_name.clone(),
                target_nullable: e.target_nullable,
                source_index: e.source_index?,
                conversion,
            })
        })
        .collect()
}

struct Slot<'a> {
    target_index: usize,
    name: &'a str,
    nullable: bool,
}

/// Read a source value. Nulls are stored (or reported) here and yield `None`.
fn take(
    field: &Slot<'_>,
    source_index: usize,
    source: &dyn Mappable,
    target: &mut dyn Mappable,
    sink: &mut DiagnosticSink,
) -> Option<DynamicValue> {
    let Some(value) = source.read_field(source_index) else {
        sink.skip(field.name, SkipReason::Unreadable);
        return None;
    };
    if value.is_null() {
        put(field, value, target, sink);
        return None;
    }
    Some(value)
}

fn put(field: &Slot<'_>, value: DynamicValue, target: &mut dyn Mappable, sink: &mut DiagnosticSink) {
    if value.is_null() && !field.nullable {
        sink.skip(field.name, SkipReason::NullValue);
        return;
    }
    if let Err(e) = target.write_field(field.target_index, value) {
        sink.skip(field.name, SkipReason::Rejected(e.to_string()));
    }
}

/// State of one top-level mapping call.
pub(crate) struct Session<'a> {
    engine: &'a EngineState,
    config: &'a MapperConfig,
    pub(crate) sink: DiagnosticSink,
}

impl<'a> Session<'a> {
    pub(crate) fn new(engine: &'a EngineState, config: &'a MapperConfig, sink: DiagnosticSink) -> Self {
        Self {
            engine,
            config,
            sink,
        }
    }

    fn convert(&mut self, conversion: &Conversion, value: DynamicValue, name: &str) -> Option<DynamicValue> {
        let ctx = ConvertContext {
            enums: &self.engine.enums,
            separators: &self.config.enum_list_separators,
        };
        match apply(conversion, value, &ctx) {
            Ok(value) => Some(value),
            Err(e @ ConvertError::UnknownVariant { .. }) => {
                self.sink.skip(name, SkipReason::EnumParse(e.to_string()));
                None
            }
            Err(e) => {
                self.sink.skip(name, SkipReason::Conversion(e.to_string()));
                None
            }
        }
    }

    /// Map one nested struct value, starting from `base` or the target defaults.
    fn map_nested(
        &mut self,
        pair: &NestedPair,
        value: DynamicValue,
        base: Option<DynamicValue>,
        segment: &str,
    ) -> Result<Option<DynamicValue>> {
        if !matches!(value, DynamicValue::Struct(_)) {
            self.sink.skip(
                segment,
                SkipReason::Conversion(format!("expected struct, got {}", value.kind_name())),
            );
            return Ok(None);
        }
        let mapper = self.engine.mapper_for(&pair.source, &pair.target, self.config);
        let source = DynamicData::from_parts(pair.source.clone(), value);
        let mut target = DynamicData::from_parts(
            pair.target.clone(),
            base.unwrap_or_else(|| mapper.template.clone()),
        );

        let mark = self.sink.enter(segment);
        let result = mapper.execute(&source, &mut target, self);
        self.sink.leave(mark);
        result?;
        Ok(Some(target.into_value()))
    }

    fn map_collection(
        &mut self,
        element: &NestedPair,
        shape: &CollectionShape,
        value: DynamicValue,
        name: &str,
    ) -> Result<Option<DynamicValue>> {
        let items = match value {
            DynamicValue::Sequence(items) | DynamicValue::Array(items) => items,
            other => {
                self.sink.skip(
                    name,
                    SkipReason::Conversion(format!("expected sequence, got {}", other.kind_name())),
                );
                return Ok(None);
            }
        };
        let mut mapped = Vec::with_capacity(items.len());
        for (i, item) in items.into_iter().enumerate() {
            if item.is_null() {
                mapped.push(item);
                continue;
            }
            let segment = format!("{}[{}]", name, i);
            match self.map_nested(element, item, None, &segment)? {
                Some(value) => mapped.push(value),
                None => mapped.push(default_value(&element.target.kind)),
            }
        }
        Ok(Some(shape.apply(mapped)))
    }
}
