// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Builders for runtime-defined record and enum types.
//!
//! ```
//! use fieldmap::dynamic::{EnumBuilder, PrimitiveKind, TypeDescriptorBuilder};
//! use std::sync::Arc;
//!
//! let status = Arc::new(EnumBuilder::new("Status").variant("Active").variant("Closed").build());
//! let row = TypeDescriptorBuilder::new("CustomerRow")
//!     .field("Id", PrimitiveKind::I64)
//!     .string_field("Name")
//!     .enum_field("Status", status)
//!     .build();
//! assert_eq!(row.fields().map(<[_]>::len), Some(3));
//! ```

use crate::dynamic::{
    EnumDescriptor, EnumVariant, FieldDescriptor, PrimitiveKind, SequenceDescriptor,
    TypeDescriptor, TypeKind, TypeRef,
};
use std::sync::Arc;

/// Collects fields for a dynamic record type.
///
/// Fields keep the order they are added in; the mapper matches on name, so
/// order only decides which duplicate wins.
#[derive(Debug)]
pub struct TypeDescriptorBuilder {
    name: String,
    fields: Vec<FieldDescriptor>,
}

impl TypeDescriptorBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    fn push(mut self, name: impl Into<String>, desc: TypeDescriptor, optional: bool) -> Self {
        let field = FieldDescriptor::new(name, Arc::new(desc));
        self.fields.push(if optional { field.optional() } else { field });
        self
    }

    /// Primitive field.
    pub fn field(self, name: impl Into<String>, kind: PrimitiveKind) -> Self {
        self.push(name, TypeDescriptor::primitive(kind), false)
    }

    /// Field of an existing descriptor, shared as is.
    pub fn field_with_type(
        mut self,
        name: impl Into<String>,
        type_desc: Arc<TypeDescriptor>,
    ) -> Self {
        self.fields.push(FieldDescriptor::new(name, type_desc));
        self
    }

    /// Field configured by the caller (access flags, id, nullability).
    pub fn field_with(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Nullable primitive field, null by default.
    pub fn optional_field(self, name: impl Into<String>, kind: PrimitiveKind) -> Self {
        self.push(name, TypeDescriptor::primitive(kind), true)
    }

    pub fn string_field(self, name: impl Into<String>) -> Self {
        self.field(name, PrimitiveKind::String)
    }

    /// Untyped slot: accepts any value, so every source field assigns directly.
    pub fn any_field(self, name: impl Into<String>) -> Self {
        self.push(name, TypeDescriptor::any(), true)
    }

    pub fn sequence_field(self, name: impl Into<String>, element_kind: PrimitiveKind) -> Self {
        self.sequence_of(name, Arc::new(TypeDescriptor::primitive(element_kind)))
    }

    /// Sequence holding at most `max_length` items; longer inputs are truncated
    /// when mapped.
    pub fn bounded_sequence_field(
        self,
        name: impl Into<String>,
        element_kind: PrimitiveKind,
        max_length: usize,
    ) -> Self {
        let element = Arc::new(TypeDescriptor::primitive(element_kind));
        let mut desc = TypeDescriptor::sequence(element.clone());
        desc.kind = TypeKind::Sequence(SequenceDescriptor::bounded(element, max_length));
        self.push(name, desc, false)
    }

    /// Sequence of records or enums.
    pub fn sequence_of(self, name: impl Into<String>, element: Arc<TypeDescriptor>) -> Self {
        self.push(name, TypeDescriptor::sequence(element), false)
    }

    pub fn array_field(
        self,
        name: impl Into<String>,
        element_kind: PrimitiveKind,
        length: usize,
    ) -> Self {
        self.array_of(name, Arc::new(TypeDescriptor::primitive(element_kind)), length)
    }

    /// Fixed-length array; mapped inputs are truncated or padded to `length`.
    pub fn array_of(
        self,
        name: impl Into<String>,
        element: Arc<TypeDescriptor>,
        length: usize,
    ) -> Self {
        self.push(name, TypeDescriptor::array(element, length), false)
    }

    pub fn enum_field(mut self, name: impl Into<String>, enum_type: Arc<TypeDescriptor>) -> Self {
        self.fields.push(FieldDescriptor::new(name, enum_type));
        self
    }

    /// Record-typed field.
    pub fn nested_field(self, name: impl Into<String>, nested: Arc<TypeDescriptor>) -> Self {
        self.push(name, TypeDescriptor::nested(TypeRef::resolved(nested)), false)
    }

    pub fn optional_nested_field(
        self,
        name: impl Into<String>,
        nested: Arc<TypeDescriptor>,
    ) -> Self {
        self.push(name, TypeDescriptor::nested(TypeRef::resolved(nested)), true)
    }

    pub fn build(self) -> TypeDescriptor {
        TypeDescriptor::struct_type(self.name, self.fields)
    }
}

/// Collects variants for a dynamic enum. Values continue from the last one
/// given, starting at 0; the zero-valued variant is the default.
#[derive(Debug)]
pub struct EnumBuilder {
    name: String,
    variants: Vec<EnumVariant>,
    next: i64,
}

impl EnumBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variants: Vec::new(),
            next: 0,
        }
    }

    pub fn variant(self, name: impl Into<String>) -> Self {
        let value = self.next;
        self.variant_value(name, value)
    }

    pub fn variant_value(mut self, name: impl Into<String>, value: i64) -> Self {
        self.variants.push(EnumVariant::new(name, value));
        self.next = value.saturating_add(1);
        self
    }

    pub fn build(self) -> TypeDescriptor {
        TypeDescriptor::new(self.name, TypeKind::Enum(EnumDescriptor::new(self.variants)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_item() -> Arc<TypeDescriptor> {
        Arc::new(
            TypeDescriptorBuilder::new("LineItem")
                .string_field("sku")
                .field("qty", PrimitiveKind::U32)
                .build(),
        )
    }

    #[test]
    fn test_order_row_shape() {
        let desc = TypeDescriptorBuilder::new("OrderRow")
            .field("id", PrimitiveKind::I64)
            .optional_field("discount", PrimitiveKind::F64)
            .sequence_of("lines", line_item())
            .bounded_sequence_field("tags", PrimitiveKind::String, 4)
            .any_field("extra")
            .build();

        assert!(desc.is_struct());
        let names: Vec<_> = desc
            .fields()
            .unwrap_or_default()
            .iter()
            .map(|f| (f.name.as_str(), f.optional))
            .collect();
        assert_eq!(
            names,
            vec![
                ("id", false),
                ("discount", true),
                ("lines", false),
                ("tags", false),
                ("extra", true),
            ]
        );
        match &desc.field("tags").expect("tags").type_desc.kind {
            TypeKind::Sequence(seq) => assert_eq!(seq.max_length, Some(4)),
            other => panic!("expected sequence, got {:?}", other),
        }
    }

    #[test]
    fn test_array_and_nested() {
        let item = line_item();
        let desc = TypeDescriptorBuilder::new("Basket")
            .array_of("slots", item.clone(), 3)
            .nested_field("featured", item.clone())
            .optional_nested_field("gift", item.clone())
            .build();

        match &desc.field("slots").expect("slots").type_desc.kind {
            TypeKind::Array(arr) => assert_eq!(arr.length, 3),
            other => panic!("expected array, got {:?}", other),
        }
        let featured = desc.field("featured").expect("featured");
        assert_eq!(featured.type_desc.ident(), item.ident());
        assert!(desc.field("gift").expect("gift").optional);
    }

    #[test]
    fn test_enum_values_continue_after_explicit() {
        let desc = EnumBuilder::new("Priority")
            .variant("Low")
            .variant_value("High", 10)
            .variant("Urgent")
            .build();

        let e = desc.enum_descriptor().expect("enum");
        let values: Vec<_> = e.variants.iter().map(|v| (v.name.as_str(), v.value)).collect();
        assert_eq!(values, vec![("Low", 0), ("High", 10), ("Urgent", 11)]);
        assert_eq!(e.default_variant().map(|v| v.name.as_str()), Some("Low"));
    }
}
