// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type descriptors for runtime type information.

use std::fmt;
use std::sync::Arc;

/// Primitive type kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
    Char,
    String,
    Duration,
    Uuid,
}

impl PrimitiveKind {
    /// Canonical name, shared by every descriptor of this kind.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Char => "char",
            Self::String => "String",
            Self::Duration => "Duration",
            Self::Uuid => "Uuid",
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            Self::U8
                | Self::U16
                | Self::U32
                | Self::U64
                | Self::I8
                | Self::I16
                | Self::I32
                | Self::I64
        )
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    pub fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_float()
    }

    /// Check whether `value` is the variant this kind stores.
    pub fn accepts(&self, value: &super::DynamicValue) -> bool {
        use super::DynamicValue as V;
        matches!(
            (self, value),
            (Self::Bool, V::Bool(_))
                | (Self::U8, V::U8(_))
                | (Self::U16, V::U16(_))
                | (Self::U32, V::U32(_))
                | (Self::U64, V::U64(_))
                | (Self::I8, V::I8(_))
                | (Self::I16, V::I16(_))
                | (Self::I32, V::I32(_))
                | (Self::I64, V::I64(_))
                | (Self::F32, V::F32(_))
                | (Self::F64, V::F64(_))
                | (Self::Char, V::Char(_))
                | (Self::String, V::String(_))
                | (Self::Duration, V::Duration(_))
                | (Self::Uuid, V::Uuid(_))
        )
    }
}

/// Where a descriptor came from.
///
/// Native and dynamic descriptors may share a name without being the same type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeOrigin {
    /// Primitives, `DynamicValue` and collections thereof.
    Builtin,
    /// Generated by `#[derive(Mappable)]` / `#[derive(MappableEnum)]`.
    Native,
    /// Built at runtime with `TypeDescriptorBuilder` / `EnumBuilder`.
    Dynamic,
}

/// Value identity of a type: full name plus origin.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TypeIdent {
    name: Arc<str>,
    origin: TypeOrigin,
}

impl TypeIdent {
    pub fn new(name: impl Into<Arc<str>>, origin: TypeOrigin) -> Self {
        Self {
            name: name.into(),
            origin,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn origin(&self) -> TypeOrigin {
        self.origin
    }
}

impl fmt::Debug for TypeIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self.origin, self.name)
    }
}

impl fmt::Display for TypeIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Reference to a struct or enum descriptor, possibly built on first use.
///
/// Derived types reference each other through deferred refs so that
/// self-referential types never recurse while their descriptor is built.
#[derive(Clone)]
pub struct TypeRef {
    ident: TypeIdent,
    target: RefTarget,
}

#[derive(Clone)]
enum RefTarget {
    Resolved(Arc<TypeDescriptor>),
    Deferred(fn() -> TypeDescriptor),
}

impl TypeRef {
    /// Reference an already built descriptor.
    pub fn resolved(desc: Arc<TypeDescriptor>) -> Self {
        Self {
            ident: desc.ident(),
            target: RefTarget::Resolved(desc),
        }
    }

    /// Reference a native type whose descriptor is produced by `build`.
    pub fn deferred(name: &str, build: fn() -> TypeDescriptor) -> Self {
        Self {
            ident: TypeIdent::new(name, TypeOrigin::Native),
            target: RefTarget::Deferred(build),
        }
    }

    pub fn ident(&self) -> &TypeIdent {
        &self.ident
    }

    pub fn name(&self) -> &str {
        self.ident.name()
    }

    /// The descriptor, if this ref already holds one.
    pub fn get(&self) -> Option<&Arc<TypeDescriptor>> {
        match &self.target {
            RefTarget::Resolved(desc) => Some(desc),
            RefTarget::Deferred(_) => None,
        }
    }

    /// Produce the referenced descriptor, building it if deferred.
    pub fn materialize(&self) -> Arc<TypeDescriptor> {
        match &self.target {
            RefTarget::Resolved(desc) => desc.clone(),
            RefTarget::Deferred(build) => Arc::new(build()),
        }
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        self.ident == other.ident
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeRef").field(&self.ident).finish()
    }
}

/// Shape of a described type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    Primitive(PrimitiveKind),
    /// Record with named fields, in declaration order.
    Struct(Vec<FieldDescriptor>),
    /// Growable collection, optionally capped.
    Sequence(SequenceDescriptor),
    /// Collection of exactly `length` items.
    Array(ArrayDescriptor),
    Enum(EnumDescriptor),
    /// Record or enum reached through a field.
    Nested(TypeRef),
    /// Untyped slot holding any `DynamicValue`.
    Any,
}

/// Runtime description of a mappable type.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDescriptor {
    /// Fully qualified for native types, caller-chosen for dynamic ones.
    pub name: String,
    pub kind: TypeKind,
    pub origin: TypeOrigin,
}

impl TypeDescriptor {
    /// Descriptor of a runtime-built type.
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self::with_origin(name, kind, TypeOrigin::Dynamic)
    }

    /// Descriptor of a compiled Rust type.
    pub fn native(name: impl Into<String>, kind: TypeKind) -> Self {
        Self::with_origin(name, kind, TypeOrigin::Native)
    }

    fn with_origin(name: impl Into<String>, kind: TypeKind, origin: TypeOrigin) -> Self {
        Self {
            name: name.into(),
            kind,
            origin,
        }
    }

    pub fn primitive(kind: PrimitiveKind) -> Self {
        Self::with_origin(kind.name(), TypeKind::Primitive(kind), TypeOrigin::Builtin)
    }

    /// Descriptor of an untyped `DynamicValue` slot.
    pub fn any() -> Self {
        Self::with_origin("DynamicValue", TypeKind::Any, TypeOrigin::Builtin)
    }

    pub fn struct_type(name: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        Self::new(name, TypeKind::Struct(fields))
    }

    /// `Vec<T>`-style collection; the origin follows the element.
    pub fn sequence(element: Arc<TypeDescriptor>) -> Self {
        let ident = element.ident();
        Self::with_origin(
            format!("Vec<{}>", ident.name()),
            TypeKind::Sequence(SequenceDescriptor::unbounded(element)),
            ident.origin(),
        )
    }

    /// `[T; N]`-style collection; the origin follows the element.
    pub fn array(element: Arc<TypeDescriptor>, length: usize) -> Self {
        let ident = element.ident();
        Self::with_origin(
            format!("[{}; {}]", ident.name(), length),
            TypeKind::Array(ArrayDescriptor::new(element, length)),
            ident.origin(),
        )
    }

    pub fn nested(target: TypeRef) -> Self {
        let ident = target.ident().clone();
        Self::with_origin(ident.name(), TypeKind::Nested(target), ident.origin())
    }

    /// Value identity used for cache keys and direct assignment.
    ///
    /// Primitive idents ignore the descriptor name so that a runtime `i64`
    /// field and a native `i64` field are the same value type.
    pub fn ident(&self) -> TypeIdent {
        match &self.kind {
            TypeKind::Primitive(p) => TypeIdent::new(p.name(), TypeOrigin::Builtin),
            TypeKind::Any => TypeIdent::new("DynamicValue", TypeOrigin::Builtin),
            TypeKind::Nested(target) => target.ident().clone(),
            _ => TypeIdent::new(self.name.as_str(), self.origin),
        }
    }

    pub fn is_struct(&self) -> bool {
        matches!(self.kind, TypeKind::Struct(_))
    }

    pub fn is_enum(&self) -> bool {
        matches!(self.kind, TypeKind::Enum(_))
    }

    /// Primitives and enums.
    pub fn is_scalar(&self) -> bool {
        matches!(self.kind, TypeKind::Primitive(_) | TypeKind::Enum(_))
    }

    /// Record fields; `None` for anything but a struct.
    pub fn fields(&self) -> Option<&[FieldDescriptor]> {
        match &self.kind {
            TypeKind::Struct(fields) => Some(fields),
            _ => None,
        }
    }

    /// Exact-name lookup. Case-insensitive matching lives in the matcher.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields()?.iter().find(|f| f.name == name)
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields()?.iter().position(|f| f.name == name)
    }

    /// Element type of a sequence or array.
    pub fn element_type(&self) -> Option<&Arc<TypeDescriptor>> {
        match &self.kind {
            TypeKind::Sequence(seq) => Some(&seq.element_type),
            TypeKind::Array(arr) => Some(&arr.element_type),
            _ => None,
        }
    }

    pub fn array_length(&self) -> Option<usize> {
        match &self.kind {
            TypeKind::Array(arr) => Some(arr.length),
            _ => None,
        }
    }

    pub fn enum_descriptor(&self) -> Option<&EnumDescriptor> {
        match &self.kind {
            TypeKind::Enum(e) => Some(e),
            _ => None,
        }
    }
}

/// One member of a record type, with the access rules the mapper honors.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    pub type_desc: Arc<TypeDescriptor>,
    /// Declaration index for derived types.
    pub id: Option<u32>,
    /// Accepts `DynamicValue::Null` (`Option<T>` on native types).
    pub optional: bool,
    /// Usable as a mapping source.
    pub readable: bool,
    /// Usable as a mapping target.
    pub writable: bool,
}

impl FieldDescriptor {
    /// Required, readable and writable field.
    pub fn new(name: impl Into<String>, type_desc: Arc<TypeDescriptor>) -> Self {
        Self {
            name: name.into(),
            type_desc,
            id: None,
            optional: false,
            readable: true,
            writable: true,
        }
    }

    pub fn with_id(mut self, id: u32) -> Self {
        self.id = Some(id);
        self
    }

    pub fn optional(self) -> Self {
        self.nullable(true)
    }

    pub fn nullable(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    /// Skipped when the record is a mapping target.
    pub fn read_only(mut self) -> Self {
        self.writable = false;
        self
    }

    /// Skipped when the record is a mapping source.
    pub fn write_only(mut self) -> Self {
        self.readable = false;
        self
    }

    /// Primitive or enum, copied by value.
    pub fn is_value_type(&self) -> bool {
        self.type_desc.is_scalar()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SequenceDescriptor {
    pub element_type: Arc<TypeDescriptor>,
    /// Cap on mapped length; longer inputs are truncated.
    pub max_length: Option<usize>,
}

impl SequenceDescriptor {
    pub fn unbounded(element_type: Arc<TypeDescriptor>) -> Self {
        Self {
            element_type,
            max_length: None,
        }
    }

    pub fn bounded(element_type: Arc<TypeDescriptor>, max_length: usize) -> Self {
        Self {
            element_type,
            max_length: Some(max_length),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayDescriptor {
    pub element_type: Arc<TypeDescriptor>,
    pub length: usize,
}

impl ArrayDescriptor {
    pub fn new(element_type: Arc<TypeDescriptor>, length: usize) -> Self {
        Self {
            element_type,
            length,
        }
    }
}

/// Variants of an enum type, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDescriptor {
    pub variants: Vec<EnumVariant>,
}

impl EnumDescriptor {
    pub fn new(variants: Vec<EnumVariant>) -> Self {
        Self { variants }
    }

    /// Exact-name lookup; token parsing is done by the enum cache.
    pub fn variant(&self, name: &str) -> Option<&EnumVariant> {
        self.variants.iter().find(|v| v.name == name)
    }

    pub fn variant_by_value(&self, value: i64) -> Option<&EnumVariant> {
        self.variants.iter().find(|v| v.value == value)
    }

    /// Zero value of the enum: the variant whose value is 0, else the first
    /// declared one. Used for fresh instances and array padding.
    pub fn default_variant(&self) -> Option<&EnumVariant> {
        self.variant_by_value(0).or_else(|| self.variants.first())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumVariant {
    pub name: String,
    pub value: i64,
}

impl EnumVariant {
    pub fn new(name: impl Into<String>, value: i64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}
