// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Field matching by case-insensitive name.

use crate::dynamic::FieldDescriptor;
use std::collections::HashMap;

/// A writable target field and the source field feeding it, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMatch {
    pub target_index: usize,
    pub source_index: Option<usize>,
}

/// Name comparison key: Unicode lowercase.
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase()
}

/// Pair every writable target field with the first readable source field of
/// the same name, ignoring case.
///
/// Results follow target declaration order. Unwritable target fields are
/// omitted; targets without a source get `source_index: None`.
pub fn match_fields(source: &[FieldDescriptor], target: &[FieldDescriptor]) -> Vec<FieldMatch> {
    let mut by_name: HashMap<String, usize> = HashMap::with_capacity(source.len());
    for (index, field) in source.iter().enumerate() {
        if field.readable {
            by_name.entry(normalize_name(&field.name)).or_insert(index);
        }
    }

    target
        .iter()
        .enumerate()
        .filter(|(_, field)| field.writable)
        .map(|(target_index, field)| FieldMatch {
            target_index,
            source_index: by_name.get(&normalize_name(&field.name)).copied(),
        })
        .collect()
}
