// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! User-registered field mappings and value converters.
//!
//! Registrations are read when a type pair is compiled. The compiled plan
//! keeps its own `Arc` to each closure, so later changes only apply after
//! the pair is invalidated.

use super::key::TypeKey;
use super::matcher::normalize_name;
use crate::dynamic::{DynamicData, DynamicValue, FromDynamicValue, ToDynamicValue};
use crate::error::{BoxError, MapError};
use crate::reflect::Mappable;
use dashmap::DashMap;
use std::sync::Arc;

/// Produces a target field value from the whole source object.
pub type FieldMappingFn =
    dyn Fn(&dyn Mappable) -> Result<DynamicValue, BoxError> + Send + Sync + 'static;

/// Converts one source field value into a target field value.
pub type ConverterFn =
    dyn Fn(DynamicValue) -> Result<DynamicValue, BoxError> + Send + Sync + 'static;

type FieldKey = (TypeKey, String);

/// Field mappings per (source, target, field) and converters per value pair.
#[derive(Default)]
pub struct CustomRegistry {
    field_mappings: DashMap<FieldKey, Arc<FieldMappingFn>>,
    converters: DashMap<TypeKey, Arc<ConverterFn>>,
}

impl CustomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a field mapping; replaces any mapping for the same field
    /// (compared case-insensitively).
    pub fn insert_field_mapping(&self, key: TypeKey, field: &str, f: Arc<FieldMappingFn>) {
        if self
            .field_mappings
            .insert((key.clone(), normalize_name(field)), f)
            .is_some()
        {
            log::debug!("[mapper] replaced field mapping {}::{}", key, field);
        }
    }

    pub fn field_mapping(&self, key: &TypeKey, field: &str) -> Option<Arc<FieldMappingFn>> {
        self.field_mappings
            .get(&(key.clone(), normalize_name(field)))
            .map(|f| f.clone())
    }

    pub fn remove_field_mapping(&self, key: &TypeKey, field: &str) -> bool {
        self.field_mappings
            .remove(&(key.clone(), normalize_name(field)))
            .is_some()
    }

    pub fn clear_field_mappings(&self) {
        self.field_mappings.clear();
    }

    /// Register a converter for a (source value, target value) pair.
    pub fn insert_converter(&self, key: TypeKey, f: Arc<ConverterFn>) {
        if self.converters.insert(key.clone(), f).is_some() {
            log::debug!("[mapper] replaced converter {}", key);
        }
    }

    pub fn converter(&self, key: &TypeKey) -> Option<Arc<ConverterFn>> {
        self.converters.get(key).map(|f| f.clone())
    }

    pub fn remove_converter(&self, key: &TypeKey) -> bool {
        self.converters.remove(key).is_some()
    }

    pub fn clear_converters(&self) {
        self.converters.clear();
    }

    pub fn field_mapping_count(&self) -> usize {
        self.field_mappings.len()
    }

    pub fn converter_count(&self) -> usize {
        self.converters.len()
    }
}

impl std::fmt::Debug for CustomRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomRegistry")
            .field("field_mappings", &self.field_mappings.len())
            .field("converters", &self.converters.len())
            .finish()
    }
}

/// Run `f` on `source` viewed as an `S`.
///
/// Native sources are downcast; `DynamicData` sources are rebuilt as an `S`
/// first, which is what nested mappings receive.
pub(crate) fn with_typed_source<S, R>(
    source: &dyn Mappable,
    f: impl FnOnce(&S) -> R,
) -> Result<R, BoxError>
where
    S: FromDynamicValue + 'static,
{
    let any = source.as_any();
    if let Some(typed) = any.downcast_ref::<S>() {
        return Ok(f(typed));
    }
    if let Some(data) = any.downcast_ref::<DynamicData>() {
        let typed = S::from_dynamic(data.value())?;
        return Ok(f(&typed));
    }
    Err(Box::new(MapError::SourceTypeMismatch {
        expected: std::any::type_name::<S>().to_string(),
        got: "unknown Mappable".to_string(),
    }))
}

/// Erase a typed, fallible field mapping.
pub(crate) fn erase_field_mapping<S, V, E, F>(f: F) -> Arc<FieldMappingFn>
where
    S: FromDynamicValue + 'static,
    V: ToDynamicValue,
    E: Into<BoxError>,
    F: Fn(&S) -> Result<V, E> + Send + Sync + 'static,
{
    Arc::new(move |source: &dyn Mappable| {
        with_typed_source::<S, _>(source, |s| f(s))?
            .map(|v| v.to_dynamic())
            .map_err(Into::into)
    })
}

/// Erase a typed, fallible converter.
pub(crate) fn erase_converter<A, B, E, F>(f: F) -> Arc<ConverterFn>
where
    A: FromDynamicValue,
    B: ToDynamicValue,
    E: Into<BoxError>,
    F: Fn(A) -> Result<B, E> + Send + Sync + 'static,
{
    Arc::new(move |value: DynamicValue| {
        let input = A::from_dynamic(&value)?;
        f(input).map(|out| out.to_dynamic()).map_err(Into::into)
    })
}
