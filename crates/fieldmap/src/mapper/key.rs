// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Cache keys for compiled mappers and registrations.

use crate::dynamic::{TypeDescriptor, TypeIdent};
use crate::reflect::TypeInfo;
use std::fmt;

/// Ordered (source, target) type pair.
///
/// Equality compares both idents in full; the hash only picks a bucket.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TypeKey {
    source: TypeIdent,
    target: TypeIdent,
}

impl TypeKey {
    pub fn new(source: TypeIdent, target: TypeIdent) -> Self {
        Self { source, target }
    }

    /// Key of two descriptors.
    pub fn of(source: &TypeDescriptor, target: &TypeDescriptor) -> Self {
        Self::new(source.ident(), target.ident())
    }

    /// Key of two native types.
    pub fn of_types<S: TypeInfo, T: TypeInfo>() -> Self {
        Self::new(S::field_type().ident(), T::field_type().ident())
    }

    pub fn source(&self) -> &TypeIdent {
        &self.source
    }

    pub fn target(&self) -> &TypeIdent {
        &self.target
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeKey")
            .field("source", &self.source)
            .field("target", &self.target)
            .finish()
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamic::{PrimitiveKind, TypeOrigin};

    #[test]
    fn test_key_is_ordered() {
        let a = TypeIdent::new("A", TypeOrigin::Dynamic);
        let b = TypeIdent::new("B", TypeOrigin::Dynamic);
        assert_ne!(TypeKey::new(a.clone(), b.clone()), TypeKey::new(b, a));
    }

    #[test]
    fn test_same_pair_same_key() {
        assert_eq!(TypeKey::of_types::<i32, String>(), TypeKey::of_types::<i32, String>());
        let i = TypeDescriptor::primitive(PrimitiveKind::I32);
        let s = TypeDescriptor::primitive(PrimitiveKind::String);
        assert_eq!(TypeKey::of(&i, &s), TypeKey::of_types::<i32, String>());
    }

    #[test]
    fn test_display() {
        let key = TypeKey::of_types::<u8, Option<u8>>();
        assert_eq!(key.to_string(), "u8 -> u8");
    }
}
