// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Strategy selection for one target field.

use super::convert::{classify, CollectionShape};
use super::custom::CustomRegistry;
use super::key::TypeKey;
use super::plan::{NestedPair, Strategy};
use super::registry::TypeRegistry;
use crate::dynamic::{default_value, FieldDescriptor, TypeDescriptor, TypeKind};
use std::sync::Arc;

pub(crate) struct Resolver<'a> {
    pub types: &'a TypeRegistry,
    pub custom: &'a CustomRegistry,
    /// Key of the enclosing (source, target) pair.
    pub key: &'a TypeKey,
}

impl Resolver<'_> {
    /// Pick the strategy filling `target`, first match wins:
    /// custom mapping, direct assign, custom converter, built-in conversion,
    /// nested object, nested collection, skip.
    pub(crate) fn resolve_field(
        &self,
        target: &FieldDescriptor,
        source: Option<&FieldDescriptor>,
    ) -> Strategy {
        if let Some(f) = self.custom.field_mapping(self.key, &target.name) {
            return Strategy::CustomMapping(f);
        }
        let Some(source) = source else {
            return Strategy::Skip;
        };

        let s = self.types.resolve(&source.type_desc);
        let t = self.types.resolve(&target.type_desc);

        if matches!(t.kind, TypeKind::Any)
            || matches!(s.kind, TypeKind::Any)
            || (s.ident() == t.ident() && fits_bound(&s, &t))
        {
            return Strategy::DirectAssign;
        }

        let value_key = TypeKey::of(&s, &t);
        if let Some(convert) = self.custom.converter(&value_key) {
            return Strategy::CustomConverter {
                key: value_key,
                convert,
            };
        }

        if let Some(conversion) = classify(&s, &t, self.types) {
            return Strategy::BuiltinConvert(conversion);
        }

        if s.is_struct() && t.is_struct() {
            return Strategy::RecursiveObject(NestedPair::new(s, t));
        }

        if let Some((se, te)) = self.struct_elements(&s, &t) {
            let shape = CollectionShape::of(&t, default_value(&te.kind));
            return Strategy::RecursiveCollection {
                element: NestedPair::new(se, te),
                shape,
            };
        }

        log::debug!(
            "[plan] {}: no conversion from {} to {} for '{}'",
            self.key,
            s.name,
            t.name,
            target.name
        );
        Strategy::Skip
    }

    fn struct_elements(
        &self,
        source: &TypeDescriptor,
        target: &TypeDescriptor,
    ) -> Option<(Arc<TypeDescriptor>, Arc<TypeDescriptor>)> {
        let se = self.types.resolve(source.element_type()?);
        let te = self.types.resolve(target.element_type()?);
        (se.is_struct() && te.is_struct()).then_some((se, te))
    }
}

/// A value of `source` also satisfies any length cap on `target`.
fn fits_bound(source: &TypeDescriptor, target: &TypeDescriptor) -> bool {
    let TypeKind::Sequence(t) = &target.kind else {
        return true;
    };
    let Some(max) = t.max_length else {
        return true;
    };
    matches!(&source.kind, TypeKind::Sequence(s) if s.max_length.is_some_and(|m| m <= max))
}
