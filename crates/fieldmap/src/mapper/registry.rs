// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type registry: cached descriptors and field lists.
//!
//! Descriptors are computed at most once per type (the `DashMap` entry lock
//! serializes concurrent first requests) and live until `clear()`.

use crate::dynamic::{FieldDescriptor, TypeDescriptor, TypeIdent, TypeKind};
use crate::reflect::TypeInfo;
use dashmap::DashMap;
use std::any::TypeId;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Longest chain of nested references followed by `resolve`.
const MAX_REF_CHAIN: usize = 16;

/// Concurrent descriptor cache shared by every compile of a `Mapper`.
#[derive(Default)]
pub struct TypeRegistry {
    native: DashMap<TypeId, Arc<TypeDescriptor>>,
    by_ident: DashMap<TypeIdent, Arc<TypeDescriptor>>,
    fields: DashMap<TypeIdent, Arc<[FieldDescriptor]>>,
    builds: AtomicUsize,
}

impl TypeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Descriptor of a native type.
    pub fn describe<T: TypeInfo + 'static>(&self) -> Arc<TypeDescriptor> {
        if let Some(desc) = self.native.get(&TypeId::of::<T>()) {
            return desc.clone();
        }
        self.native
            .entry(TypeId::of::<T>())
            .or_insert_with(|| {
                self.builds.fetch_add(1, Ordering::Relaxed);
                let desc = Arc::new(T::type_descriptor());
                log::debug!("[registry] described {}", desc.name);
                // Reuse the copy a nested reference may already have materialized.
                self.by_ident.entry(desc.ident()).or_insert(desc).clone()
            })
            .clone()
    }

    /// Register (or look up) a runtime-built descriptor.
    ///
    /// A different shape under an existing name replaces the old entry.
    pub fn describe_dynamic(&self, desc: &Arc<TypeDescriptor>) -> Arc<TypeDescriptor> {
        let ident = desc.ident();
        let mut entry = self.by_ident.entry(ident.clone()).or_insert_with(|| {
            self.builds.fetch_add(1, Ordering::Relaxed);
            desc.clone()
        });
        if !Arc::ptr_eq(entry.value(), desc) && **entry.value() != **desc {
            log::warn!("[registry] type {} redefined with a new shape", ident);
            *entry.value_mut() = desc.clone();
            self.fields.remove(&ident);
        }
        entry.value().clone()
    }

    /// Follow nested references down to a struct, enum or collection descriptor.
    pub fn resolve(&self, desc: &Arc<TypeDescriptor>) -> Arc<TypeDescriptor> {
        let mut current = desc.clone();
        for _ in 0..MAX_REF_CHAIN {
            let next = match &current.kind {
                TypeKind::Nested(target) => match target.get() {
                    Some(resolved) => resolved.clone(),
                    None => self
                        .by_ident
                        .entry(target.ident().clone())
                        .or_insert_with(|| {
                            self.builds.fetch_add(1, Ordering::Relaxed);
                            log::debug!("[registry] described {}", target.name());
                            target.materialize()
                        })
                        .clone(),
                },
                _ => return current,
            };
            current = next;
        }
        log::warn!("[registry] reference chain too deep at {}", current.name);
        current
    }

    /// Field list of a (resolved) struct; empty for every other kind.
    pub fn fields(&self, desc: &Arc<TypeDescriptor>) -> Arc<[FieldDescriptor]> {
        let resolved = self.resolve(desc);
        let ident = resolved.ident();
        if let Some(fields) = self.fields.get(&ident) {
            return fields.clone();
        }
        self.fields
            .entry(ident)
            .or_insert_with(|| Arc::from(resolved.fields().unwrap_or(&[])))
            .clone()
    }

    /// Look up a cached descriptor by ident.
    pub fn get(&self, ident: &TypeIdent) -> Option<Arc<TypeDescriptor>> {
        self.by_ident.get(ident).map(|d| d.clone())
    }

    /// Number of cached descriptors.
    pub fn len(&self) -> usize {
        self.by_ident.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_ident.is_empty()
    }

    /// Descriptors built since creation (survives `clear`).
    pub fn build_count(&self) -> usize {
        self.builds.load(Ordering::Relaxed)
    }

    /// Drop every cached descriptor.
    pub fn clear(&self) {
        self.native.clear();
        self.by_ident.clear();
        self.fields.clear();
    }
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.by_ident.len())
            .field("builds", &self.build_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamic::{PrimitiveKind, TypeDescriptorBuilder, TypeRef};

    struct Node;

    fn node_descriptor() -> TypeDescriptor {
        let next = Arc::new(TypeDescriptor::nested(TypeRef::deferred(
            "tests::Node",
            node_descriptor,
        )));
        TypeDescriptor::native(
            "tests::Node",
            TypeKind::Struct(vec![
                FieldDescriptor::new(
                    "value",
                    Arc::new(TypeDescriptor::primitive(PrimitiveKind::I32)),
                ),
                FieldDescriptor::new("next", next).optional(),
            ]),
        )
    }

    impl TypeInfo for Node {
        fn type_descriptor() -> TypeDescriptor {
            node_descriptor()
        }
    }

    #[test]
    fn test_describe_is_cached() {
        let registry = TypeRegistry::new();
        let a = registry.describe::<Node>();
        let b = registry.describe::<Node>();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.build_count(), 1);
    }

    #[test]
    fn test_resolve_self_reference() {
        let registry = TypeRegistry::new();
        let node = registry.describe::<Node>();
        let next = &node.fields().unwrap()[1].type_desc;
        let resolved = registry.resolve(next);
        assert!(Arc::ptr_eq(&resolved, &node));
        assert_eq!(registry.build_count(), 1);
    }

    #[test]
    fn test_fields_of_non_struct_is_empty() {
        let registry = TypeRegistry::new();
        let d = registry.describe::<i64>();
        assert!(registry.fields(&d).is_empty());
    }

    #[test]
    fn test_fields_follow_declaration_order() {
        let registry = TypeRegistry::new();
        let node = registry.describe::<Node>();
        let names: Vec<_> = registry.fields(&node).iter().map(|f| f.name.clone()).collect();
        assert_eq!(names, vec!["value", "next"]);
    }

    #[test]
    fn test_dynamic_redefinition_replaces() {
        let registry = TypeRegistry::new();
        let v1 = Arc::new(
            TypeDescriptorBuilder::new("Row")
                .field("a", PrimitiveKind::I32)
                .build(),
        );
        let v2 = Arc::new(
            TypeDescriptorBuilder::new("Row")
                .field("b", PrimitiveKind::I32)
                .build(),
        );
        registry.describe_dynamic(&v1);
        assert_eq!(registry.fields(&v1)[0].name, "a");
        let current = registry.describe_dynamic(&v2);
        assert!(Arc::ptr_eq(&current, &v2));
        assert_eq!(registry.fields(&v2)[0].name, "b");
    }

    #[test]
    fn test_clear() {
        let registry = TypeRegistry::new();
        registry.describe::<Node>();
        assert!(!registry.is_empty());
        registry.clear();
        assert!(registry.is_empty());
        registry.describe::<Node>();
        assert_eq!(registry.build_count(), 2);
    }
}
