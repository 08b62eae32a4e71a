// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Compiled mapping engine.
//!
//! # Architecture
//!
//! ```text
//! map::<S, T>(&s)
//!   -> TypeRegistry      descriptors of S and T (cached per type)
//!   -> MappingCache      CompiledMapper for (S, T), built at most once
//!        -> match_fields     pair target fields with source fields
//!        -> Resolver         pick a Strategy per target field
//!   -> CompiledMapper    copy fields into T::default()
//! ```
//!
//! # Example
//!
//! ```
//! use fieldmap::{Mappable, Mapper};
//!
//! #[derive(Mappable, Default)]
//! struct Employee {
//!     id: i64,
//!     name: String,
//!     salary: i64,
//! }
//!
//! #[derive(Mappable, Default, Debug, PartialEq)]
//! struct EmployeeDto {
//!     id: i32,
//!     name: String,
//!     salary: i32,
//! }
//!
//! let mapper = Mapper::new();
//! let dto: EmployeeDto = mapper
//!     .map(&Employee { id: 1, name: "Ada".into(), salary: 250_000_000_000 })
//!     .unwrap();
//! assert_eq!(dto.salary, i32::MAX);
//! ```

pub mod cache;
pub mod convert;
pub mod custom;
pub mod diagnostics;
pub mod enums;
pub mod key;
pub mod matcher;
pub mod plan;
pub mod registry;
mod resolve;

pub use cache::MappingCache;
pub use convert::{CollectionShape, Conversion, ConvertError};
pub use custom::{ConverterFn, CustomRegistry, FieldMappingFn};
pub use diagnostics::{FieldDiagnostic, SkipReason};
pub use enums::EnumCache;
pub use key::TypeKey;
pub use plan::{CompiledMapper, FieldPlanEntry, NestedPair, Strategy};
pub use registry::TypeRegistry;

use crate::config::MapperConfig;
use crate::dynamic::{
    DynamicData, DynamicValue, FieldDescriptor, FromDynamicValue, ToDynamicValue,
    TypeDescriptor, TypeOrigin,
};
use crate::error::{BoxError, MapError, Result};
use crate::reflect::{Mappable, TypeInfo};
use arc_swap::ArcSwap;
use diagnostics::DiagnosticSink;
use plan::Session;
use std::convert::Infallible;
use std::sync::{Arc, OnceLock};

/// Shared state behind every clone of a `Mapper`.
pub(crate) struct EngineState {
    config: ArcSwap<MapperConfig>,
    pub(crate) types: TypeRegistry,
    pub(crate) custom: CustomRegistry,
    pub(crate) cache: MappingCache,
    pub(crate) enums: EnumCache,
}

impl EngineState {
    fn new(config: MapperConfig) -> Self {
        Self {
            enums: EnumCache::new(config.enum_cache_capacity_nonzero()),
            config: ArcSwap::from_pointee(config),
            types: TypeRegistry::new(),
            custom: CustomRegistry::new(),
            cache: MappingCache::new(),
        }
    }

    /// Field list of a struct descriptor, refreshing runtime-built ones.
    pub(crate) fn fields(&self, desc: &Arc<TypeDescriptor>) -> Arc<[FieldDescriptor]> {
        if desc.ident().origin() == TypeOrigin::Dynamic {
            self.types.describe_dynamic(desc);
        }
        self.types.fields(desc)
    }

    /// Cached mapper for two resolved descriptors, rebuilt if either changed shape.
    pub(crate) fn mapper_for(
        &self,
        source: &Arc<TypeDescriptor>,
        target: &Arc<TypeDescriptor>,
        config: &MapperConfig,
    ) -> Arc<CompiledMapper> {
        let key = TypeKey::of(source, target);
        if let Some(existing) = self.cache.get(&key) {
            if existing.matches(source, target) {
                return existing;
            }
            log::debug!("[mapper] {} changed shape, recompiling", key);
            self.cache.invalidate(&key);
        }
        self.cache.get_or_build(&key, || {
            CompiledMapper::compile(self, config, source.clone(), target.clone())
        })
    }
}

/// Object-to-object mapper.
///
/// Cheap to clone: clones share registries, caches and configuration.
#[derive(Clone)]
pub struct Mapper {
    state: Arc<EngineState>,
}

static GLOBAL: OnceLock<Mapper> = OnceLock::new();

impl Mapper {
    /// Mapper with the default configuration.
    pub fn new() -> Self {
        Self::with_config(MapperConfig::default())
    }

    pub fn with_config(config: MapperConfig) -> Self {
        Self {
            state: Arc::new(EngineState::new(config)),
        }
    }

    /// Process-wide mapper, configured from `FIELDMAP_*` variables on first use.
    pub fn global() -> &'static Mapper {
        GLOBAL.get_or_init(|| {
            log::debug!("[mapper] initializing global mapper");
            Mapper::with_config(MapperConfig::from_env())
        })
    }

    pub(crate) fn state(&self) -> &EngineState {
        &self.state
    }

    // ========================================================================
    // Native mapping
    // ========================================================================

    /// Map `source` into a new `T`.
    ///
    /// Fields without a usable source keep their `Default` value.
    pub fn map<S, T>(&self, source: &S) -> Result<T>
    where
        S: Mappable + TypeInfo,
        T: Mappable + TypeInfo + Default,
    {
        let mut target = T::default();
        self.map_into(source, &mut target)?;
        Ok(target)
    }

    /// Map an optional source; `None` fails with `MapError::MissingSource`.
    pub fn map_option<S, T>(&self, source: Option<&S>) -> Result<T>
    where
        S: Mappable + TypeInfo,
        T: Mappable + TypeInfo + Default,
    {
        match source {
            Some(source) => self.map(source),
            None => Err(MapError::MissingSource {
                target: std::any::type_name::<T>().to_string(),
            }),
        }
    }

    /// Copy matching fields of `source` into an existing `target`.
    pub fn map_into<S, T>(&self, source: &S, target: &mut T) -> Result<()>
    where
        S: Mappable + TypeInfo,
        T: Mappable + TypeInfo,
    {
        let compiled = self.compiled::<S, T>();
        self.run(&compiled, source, target, DiagnosticSink::silent())
            .map(drop)
    }

    /// `map_into` for an optional source; `None` leaves `target` untouched.
    pub fn map_into_option<S, T>(&self, source: Option<&S>, target: &mut T) -> Result<()>
    where
        S: Mappable + TypeInfo,
        T: Mappable + TypeInfo,
    {
        match source {
            Some(source) => self.map_into(source, target),
            None => Ok(()),
        }
    }

    /// Map every item with one compiled mapper.
    pub fn map_all<S, T>(&self, sources: &[S]) -> Result<Vec<T>>
    where
        S: Mappable + TypeInfo,
        T: Mappable + TypeInfo + Default,
    {
        let compiled = self.compiled::<S, T>();
        sources
            .iter()
            .map(|source| {
                let mut target = T::default();
                self.run(&compiled, source, &mut target, DiagnosticSink::silent())?;
                Ok(target)
            })
            .collect()
    }

    /// `map`, also reporting every field skipped at runtime.
    pub fn map_with_diagnostics<S, T>(&self, source: &S) -> Result<(T, Vec<FieldDiagnostic>)>
    where
        S: Mappable + TypeInfo,
        T: Mappable + TypeInfo + Default,
    {
        let compiled = self.compiled::<S, T>();
        let mut target = T::default();
        let diagnostics = self.run(&compiled, source, &mut target, DiagnosticSink::collecting())?;
        Ok((target, diagnostics))
    }

    // ========================================================================
    // Dynamic mapping
    // ========================================================================

    /// Map dynamic data into a new instance of `target`.
    pub fn map_dynamic(&self, source: &DynamicData, target: &Arc<TypeDescriptor>) -> Result<DynamicData> {
        if source.is_null() {
            return Err(MapError::MissingSource {
                target: target.name.clone(),
            });
        }
        let compiled = self.compiled_dynamic(source.descriptor(), target);
        let mut out = compiled.instantiate();
        self.run(&compiled, source, &mut out, DiagnosticSink::silent())?;
        Ok(out)
    }

    /// Map dynamic data into existing dynamic data. A null source is a no-op;
    /// a null target is replaced by a default instance first.
    pub fn map_into_dynamic(&self, source: &DynamicData, target: &mut DynamicData) -> Result<()> {
        if source.is_null() {
            return Ok(());
        }
        let compiled = self.compiled_dynamic(source.descriptor(), target.descriptor());
        if target.is_null() {
            *target = compiled.instantiate();
        }
        self.run(&compiled, source, target, DiagnosticSink::silent())
            .map(drop)
    }

    /// Map a native value into a new instance of a runtime-built type.
    pub fn map_to_dynamic<S>(&self, source: &S, target: &Arc<TypeDescriptor>) -> Result<DynamicData>
    where
        S: Mappable + TypeInfo,
    {
        let source_desc = self.state.types.describe::<S>();
        let compiled = self.compiled_dynamic(&source_desc, target);
        let mut out = compiled.instantiate();
        self.run(&compiled, source, &mut out, DiagnosticSink::silent())?;
        Ok(out)
    }

    /// Map dynamic data into a new native `T`. A null source fails.
    pub fn map_from_dynamic<T>(&self, source: &DynamicData) -> Result<T>
    where
        T: Mappable + TypeInfo + Default,
    {
        if source.is_null() {
            return Err(MapError::MissingSource {
                target: std::any::type_name::<T>().to_string(),
            });
        }
        let target_desc = self.state.types.describe::<T>();
        let compiled = self.compiled_dynamic(source.descriptor(), &target_desc);
        let mut target = T::default();
        self.run(&compiled, source, &mut target, DiagnosticSink::silent())?;
        Ok(target)
    }

    fn run(
        &self,
        compiled: &CompiledMapper,
        source: &dyn Mappable,
        target: &mut dyn Mappable,
        sink: DiagnosticSink,
    ) -> Result<Vec<FieldDiagnostic>> {
        let config = self.state.config.load_full();
        let mut session = Session::new(&self.state, &config, sink);
        compiled.execute(source, target, &mut session)?;
        Ok(session.sink.into_diagnostics())
    }

    // ========================================================================
    // Compiled mappers
    // ========================================================================

    /// Compiled mapper for `S -> T`, building it on first request.
    pub fn compiled<S, T>(&self) -> Arc<CompiledMapper>
    where
        S: TypeInfo + 'static,
        T: TypeInfo + 'static,
    {
        let source = self.state.types.describe::<S>();
        let target = self.state.types.describe::<T>();
        let config = self.state.config.load_full();
        self.state.mapper_for(&source, &target, &config)
    }

    /// Compiled mapper for two descriptors.
    pub fn compiled_dynamic(
        &self,
        source: &Arc<TypeDescriptor>,
        target: &Arc<TypeDescriptor>,
    ) -> Arc<CompiledMapper> {
        let source = self.state.types.resolve(source);
        let target = self.state.types.resolve(target);
        let config = self.state.config.load_full();
        self.state.mapper_for(&source, &target, &config)
    }

    /// Drop the compiled mapper for `S -> T` so the next call recompiles it.
    pub fn invalidate<S: TypeInfo, T: TypeInfo>(&self) -> bool {
        self.invalidate_key(&TypeKey::of_types::<S, T>())
    }

    pub fn invalidate_key(&self, key: &TypeKey) -> bool {
        self.state.cache.invalidate(key)
    }

    /// Clear type descriptors, compiled mappers and the enum cache.
    /// Registrations are kept.
    pub fn clear_all_caches(&self) {
        self.state.types.clear();
        self.state.cache.clear();
        self.state.enums.clear();
        log::debug!("[mapper] caches cleared");
    }

    /// Keys of every compiled mapper.
    pub fn cached_mappers(&self) -> Vec<TypeKey> {
        self.state.cache.keys()
    }

    /// Mappers compiled since creation.
    pub fn build_count(&self) -> usize {
        self.state.cache.build_count()
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.state.types
    }

    pub fn enum_cache(&self) -> &EnumCache {
        &self.state.enums
    }

    // ========================================================================
    // Configuration
    // ========================================================================

    pub fn config(&self) -> Arc<MapperConfig> {
        self.state.config.load_full()
    }

    /// Replace the configuration. Compiled mappers are dropped so new
    /// thresholds apply; the enum cache is resized.
    pub fn set_config(&self, config: MapperConfig) {
        self.state
            .enums
            .resize(config.enum_cache_capacity_nonzero());
        self.state.config.store(Arc::new(config));
        self.state.cache.clear();
        log::debug!("[mapper] configuration replaced");
    }

    // ========================================================================
    // Field mappings
    // ========================================================================

    /// Compute target field `field` of `T` from the whole `S`.
    ///
    /// Overrides automatic matching for that field. Applies to pairs compiled
    /// after this call.
    pub fn register_field_mapping<S, T, V, F>(&self, field: &str, f: F)
    where
        S: TypeInfo + FromDynamicValue + 'static,
        T: TypeInfo,
        V: ToDynamicValue,
        F: Fn(&S) -> V + Send + Sync + 'static,
    {
        self.try_register_field_mapping::<S, T, V, Infallible, _>(field, move |s| Ok(f(s)));
    }

    /// Like `register_field_mapping` with a fallible closure; an error aborts
    /// the mapping call with `MapError::FieldMapping`.
    pub fn try_register_field_mapping<S, T, V, E, F>(&self, field: &str, f: F)
    where
        S: TypeInfo + FromDynamicValue + 'static,
        T: TypeInfo,
        V: ToDynamicValue,
        E: Into<BoxError>,
        F: Fn(&S) -> std::result::Result<V, E> + Send + Sync + 'static,
    {
        self.state.custom.insert_field_mapping(
            TypeKey::of_types::<S, T>(),
            field,
            custom::erase_field_mapping(f),
        );
    }

    /// Field mapping between runtime-built (or mixed) types.
    pub fn register_dynamic_field_mapping<F>(
        &self,
        source: &TypeDescriptor,
        target: &TypeDescriptor,
        field: &str,
        f: F,
    ) where
        F: Fn(&dyn Mappable) -> std::result::Result<DynamicValue, BoxError> + Send + Sync + 'static,
    {
        self.state
            .custom
            .insert_field_mapping(TypeKey::of(source, target), field, Arc::new(f));
    }

    pub fn remove_field_mapping<S: TypeInfo, T: TypeInfo>(&self, field: &str) -> bool {
        self.remove_field_mapping_key(&TypeKey::of_types::<S, T>(), field)
    }

    pub fn remove_field_mapping_key(&self, key: &TypeKey, field: &str) -> bool {
        self.state.custom.remove_field_mapping(key, field)
    }

    pub fn clear_field_mappings(&self) {
        self.state.custom.clear_field_mappings();
    }

    // ========================================================================
    // Converters
    // ========================================================================

    /// Convert every `A` field value feeding a `B` field, in any type pair
    /// compiled after this call.
    pub fn register_converter<A, B, F>(&self, f: F)
    where
        A: TypeInfo + FromDynamicValue,
        B: TypeInfo + ToDynamicValue,
        F: Fn(A) -> B + Send + Sync + 'static,
    {
        self.try_register_converter::<A, B, Infallible, _>(move |a| Ok(f(a)));
    }

    /// Like `register_converter` with a fallible closure; an error aborts the
    /// mapping call with `MapError::Converter`.
    pub fn try_register_converter<A, B, E, F>(&self, f: F)
    where
        A: TypeInfo + FromDynamicValue,
        B: TypeInfo + ToDynamicValue,
        E: Into<BoxError>,
        F: Fn(A) -> std::result::Result<B, E> + Send + Sync + 'static,
    {
        self.state
            .custom
            .insert_converter(TypeKey::of_types::<A, B>(), custom::erase_converter(f));
    }

    /// Converter between two value descriptors.
    pub fn register_dynamic_converter<F>(&self, source: &TypeDescriptor, target: &TypeDescriptor, f: F)
    where
        F: Fn(DynamicValue) -> std::result::Result<DynamicValue, BoxError> + Send + Sync + 'static,
    {
        self.state
            .custom
            .insert_converter(TypeKey::of(source, target), Arc::new(f));
    }

    pub fn remove_converter<A: TypeInfo, B: TypeInfo>(&self) -> bool {
        self.remove_converter_key(&TypeKey::of_types::<A, B>())
    }

    pub fn remove_converter_key(&self, key: &TypeKey) -> bool {
        self.state.custom.remove_converter(key)
    }

    pub fn clear_converters(&self) {
        self.state.custom.clear_converters();
    }
}

impl Default for Mapper {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Mapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mapper")
            .field("config", &*self.state.config.load())
            .field("types", &self.state.types)
            .field("cache", &self.state.cache)
            .field("custom", &self.state.custom)
            .finish()
    }
}
