// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! `DynamicData`: a value paired with the descriptor it conforms to.
//!
//! Runtime-built records take part in mappings through this type. It
//! implements `Mappable` over the descriptor's field order, so the engine reads
//! and writes it exactly like a derived struct.

use crate::dynamic::{DynamicValue, FieldDescriptor, PrimitiveKind, TypeDescriptor, TypeKind};
use crate::reflect::Mappable;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Nested defaults stop expanding past this depth.
const MAX_DEFAULT_DEPTH: usize = 32;

/// Errors raised when reading or writing dynamic values.
#[derive(Debug)]
pub enum DynamicDataError {
    FieldNotFound(String),
    TypeMismatch { expected: String, got: String },
    InvalidOperation(String),
    IndexOutOfBounds { index: usize, length: usize },
    ReadOnly(String),
}

impl fmt::Display for DynamicDataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FieldNotFound(name) => write!(f, "Field not found: {}", name),
            Self::TypeMismatch { expected, got } => {
                write!(f, "Type mismatch: expected {}, got {}", expected, got)
            }
            Self::InvalidOperation(msg) => write!(f, "Invalid operation: {}", msg),
            Self::IndexOutOfBounds { index, length } => {
                write!(f, "Field index {} out of range ({} fields)", index, length)
            }
            Self::ReadOnly(name) => write!(f, "Field is read-only: {}", name),
        }
    }
}

impl std::error::Error for DynamicDataError {}

/// A record (or null) of a runtime-described type.
#[derive(Debug, Clone)]
pub struct DynamicData {
    descriptor: Arc<TypeDescriptor>,
    value: DynamicValue,
}

impl DynamicData {
    /// Instance with every field at its default; optional fields start null.
    pub fn new(descriptor: &Arc<TypeDescriptor>) -> Self {
        Self::from_parts(descriptor.clone(), default_value(&descriptor.kind))
    }

    /// A null instance of `descriptor`, the dynamic counterpart of `None`.
    pub fn null(descriptor: &Arc<TypeDescriptor>) -> Self {
        Self::from_parts(descriptor.clone(), DynamicValue::Null)
    }

    /// Wrap `value`, checking it against `descriptor` one level deep.
    pub fn from_value(
        descriptor: &Arc<TypeDescriptor>,
        value: DynamicValue,
    ) -> Result<Self, DynamicDataError> {
        if !value.is_null() && !value_conforms(descriptor, false, &value) {
            return Err(DynamicDataError::TypeMismatch {
                expected: descriptor.name.clone(),
                got: value.kind_name().to_string(),
            });
        }
        Ok(Self::from_parts(descriptor.clone(), value))
    }

    /// Pair a descriptor with a value the caller already validated.
    pub(crate) fn from_parts(descriptor: Arc<TypeDescriptor>, value: DynamicValue) -> Self {
        Self { descriptor, value }
    }

    pub fn descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.descriptor
    }

    pub fn type_name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn is_null(&self) -> bool {
        self.value.is_null()
    }

    pub fn value(&self) -> &DynamicValue {
        &self.value
    }

    pub fn into_value(self) -> DynamicValue {
        self.value
    }

    /// Typed read of field `name`.
    pub fn get<T: FromDynamicValue>(&self, name: &str) -> Result<T, DynamicDataError> {
        T::from_dynamic(self.get_field(name)?)
    }

    /// Typed write of field `name`. The value must conform to the field type.
    pub fn set<T: ToDynamicValue>(&mut self, name: &str, value: T) -> Result<(), DynamicDataError> {
        let field = self
            .descriptor
            .field(name)
            .ok_or_else(|| DynamicDataError::FieldNotFound(name.to_string()))?
            .clone();
        self.store(&field, value.to_dynamic())
    }

    pub fn get_field(&self, name: &str) -> Result<&DynamicValue, DynamicDataError> {
        let missing = || DynamicDataError::FieldNotFound(name.to_string());
        self.descriptor.field(name).ok_or_else(missing)?;
        match &self.value {
            DynamicValue::Struct(fields) => fields.get(name).ok_or_else(missing),
            other => Err(DynamicDataError::InvalidOperation(format!(
                "{} has no fields",
                other.kind_name()
            ))),
        }
    }

    /// Field values of a struct instance, in no particular order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &DynamicValue)> {
        let map = match &self.value {
            DynamicValue::Struct(map) => Some(map),
            _ => None,
        };
        map.into_iter()
            .flat_map(|map| map.iter().map(|(k, v)| (k.as_str(), v)))
    }

    fn store(&mut self, field: &FieldDescriptor, value: DynamicValue) -> Result<(), DynamicDataError> {
        if !value_conforms(&field.type_desc, field.optional, &value) {
            return Err(DynamicDataError::TypeMismatch {
                expected: field.type_desc.name.clone(),
                got: value.kind_name().to_string(),
            });
        }
        match &mut self.value {
            DynamicValue::Struct(map) => {
                map.insert(field.name.clone(), value);
                Ok(())
            }
            other => Err(DynamicDataError::InvalidOperation(format!(
                "cannot set field '{}' on {}",
                field.name,
                other.kind_name()
            ))),
        }
    }
}

impl PartialEq for DynamicData {
    fn eq(&self, other: &Self) -> bool {
        self.descriptor.name == other.descriptor.name && self.value == other.value
    }
}

impl Mappable for DynamicData {
    fn read_field(&self, index: usize) -> Option<DynamicValue> {
        let field = self.descriptor.fields()?.get(index)?;
        if !field.readable {
            return None;
        }
        self.value.get_field(&field.name).cloned()
    }

    fn write_field(&mut self, index: usize, value: DynamicValue) -> Result<(), DynamicDataError> {
        let fields = self.descriptor.fields().unwrap_or(&[]);
        let field = fields
            .get(index)
            .ok_or(DynamicDataError::IndexOutOfBounds {
                index,
                length: fields.len(),
            })?
            .clone();
        if !field.writable {
            return Err(DynamicDataError::ReadOnly(field.name));
        }
        self.store(&field, value)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Check that `value` may be stored in a slot of type `desc`.
///
/// Struct and collection contents are checked one level deep.
pub(crate) fn value_conforms(desc: &TypeDescriptor, optional: bool, value: &DynamicValue) -> bool {
    if value.is_null() {
        return optional;
    }
    match (&desc.kind, value) {
        (TypeKind::Any, _) => true,
        (TypeKind::Primitive(p), v) => p.accepts(v),
        (TypeKind::Struct(_) | TypeKind::Nested(_), DynamicValue::Struct(_)) => true,
        (TypeKind::Nested(_), DynamicValue::Enum(_, _)) => true,
        (
            TypeKind::Sequence(seq),
            DynamicValue::Sequence(items) | DynamicValue::Array(items),
        ) => seq.max_length.map_or(true, |max| items.len() <= max),
        (TypeKind::Array(arr), DynamicValue::Sequence(items) | DynamicValue::Array(items)) => {
            items.len() == arr.length
        }
        (TypeKind::Enum(e), DynamicValue::Enum(value, name)) => {
            e.variant(name).is_some() || e.variant_by_value(*value).is_some()
        }
        _ => false,
    }
}

/// Default instance of a type kind.
pub(crate) fn default_value(kind: &TypeKind) -> DynamicValue {
    default_value_at(kind, 0)
}

fn default_value_at(kind: &TypeKind, depth: usize) -> DynamicValue {
    match kind {
        TypeKind::Primitive(p) => default_primitive(*p),
        TypeKind::Struct(fields) => {
            let mut map = HashMap::with_capacity(fields.len());
            for field in fields {
                let value = if field.optional {
                    DynamicValue::Null
                } else {
                    default_value_at(&field.type_desc.kind, depth + 1)
                };
                map.insert(field.name.clone(), value);
            }
            DynamicValue::Struct(map)
        }
        TypeKind::Sequence(_) => DynamicValue::Sequence(Vec::new()),
        TypeKind::Array(arr) => {
            let elem_default = default_value_at(&arr.element_type.kind, depth + 1);
            DynamicValue::Array(vec![elem_default; arr.length])
        }
        TypeKind::Enum(e) => match e.default_variant() {
            Some(v) => DynamicValue::Enum(v.value, v.name.clone()),
            None => DynamicValue::Enum(0, String::new()),
        },
        TypeKind::Nested(target) => {
            if depth >= MAX_DEFAULT_DEPTH {
                return DynamicValue::Struct(HashMap::new());
            }
            default_value_at(&target.materialize().kind, depth + 1)
        }
        TypeKind::Any => DynamicValue::Null,
    }
}

fn default_primitive(kind: PrimitiveKind) -> DynamicValue {
    match kind {
        PrimitiveKind::Bool => DynamicValue::Bool(false),
        PrimitiveKind::U8 => DynamicValue::U8(0),
        PrimitiveKind::U16 => DynamicValue::U16(0),
        PrimitiveKind::U32 => DynamicValue::U32(0),
        PrimitiveKind::U64 => DynamicValue::U64(0),
        PrimitiveKind::I8 => DynamicValue::I8(0),
        PrimitiveKind::I16 => DynamicValue::I16(0),
        PrimitiveKind::I32 => DynamicValue::I32(0),
        PrimitiveKind::I64 => DynamicValue::I64(0),
        PrimitiveKind::F32 => DynamicValue::F32(0.0),
        PrimitiveKind::F64 => DynamicValue::F64(0.0),
        PrimitiveKind::Char => DynamicValue::Char('\0'),
        PrimitiveKind::String => DynamicValue::String(String::new()),
        PrimitiveKind::Duration => DynamicValue::Duration(Duration::ZERO),
        PrimitiveKind::Uuid => DynamicValue::Uuid(Uuid::nil()),
    }
}

/// Read a Rust value back out of a `DynamicValue`.
pub trait FromDynamicValue: Sized {
    fn from_dynamic(value: &DynamicValue) -> Result<Self, DynamicDataError>;
}

/// Snapshot a Rust value as a `DynamicValue`.
pub trait ToDynamicValue {
    fn to_dynamic(&self) -> DynamicValue;
}

impl<T: ToDynamicValue + ?Sized> ToDynamicValue for &T {
    fn to_dynamic(&self) -> DynamicValue {
        (**self).to_dynamic()
    }
}

// Copy scalars map one-to-one onto a `DynamicValue` variant.
macro_rules! scalar_conversions {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl FromDynamicValue for $ty {
                fn from_dynamic(value: &DynamicValue) -> Result<Self, DynamicDataError> {
                    match value {
                        DynamicValue::$variant(v) => Ok(*v),
                        other => Err(mismatch(stringify!($ty), other)),
                    }
                }
            }

            impl ToDynamicValue for $ty {
                fn to_dynamic(&self) -> DynamicValue {
                    DynamicValue::$variant(*self)
                }
            }
        )*
    };
}

scalar_conversions!(
    bool => Bool,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    f32 => F32,
    f64 => F64,
    char => Char,
    Duration => Duration,
    Uuid => Uuid,
);

fn mismatch(expected: &str, got: &DynamicValue) -> DynamicDataError {
    DynamicDataError::TypeMismatch {
        expected: expected.to_string(),
        got: got.kind_name().to_string(),
    }
}

impl FromDynamicValue for String {
    fn from_dynamic(value: &DynamicValue) -> Result<Self, DynamicDataError> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| mismatch("String", value))
    }
}

impl ToDynamicValue for String {
    fn to_dynamic(&self) -> DynamicValue {
        DynamicValue::String(self.clone())
    }
}

impl ToDynamicValue for str {
    fn to_dynamic(&self) -> DynamicValue {
        DynamicValue::String(self.to_string())
    }
}

impl FromDynamicValue for DynamicValue {
    fn from_dynamic(value: &DynamicValue) -> Result<Self, DynamicDataError> {
        Ok(value.clone())
    }
}

impl ToDynamicValue for DynamicValue {
    fn to_dynamic(&self) -> DynamicValue {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamic::TypeDescriptorBuilder;

    fn invoice() -> Arc<TypeDescriptor> {
        Arc::new(
            TypeDescriptorBuilder::new("Invoice")
                .field("number", PrimitiveKind::U32)
                .string_field("customer")
                .optional_field("paid_at", PrimitiveKind::Duration)
                .build(),
        )
    }

    #[test]
    fn test_new_uses_defaults_and_null_optionals() {
        let data = DynamicData::new(&invoice());
        assert_eq!(data.get::<u32>("number").unwrap(), 0);
        assert_eq!(data.get::<String>("customer").unwrap(), "");
        assert!(data.get_field("paid_at").unwrap().is_null());
        assert_eq!(data.fields().count(), 3);
    }

    #[test]
    fn test_set_checks_field_type() {
        let mut data = DynamicData::new(&invoice());
        data.set("number", 12u32).unwrap();
        data.set("paid_at", Duration::from_secs(5)).unwrap();
        data.set("paid_at", DynamicValue::Null).unwrap();

        let err = data.set("number", "twelve").unwrap_err();
        assert!(matches!(err, DynamicDataError::TypeMismatch { .. }));
        assert!(matches!(
            data.set("customer", DynamicValue::Null),
            Err(DynamicDataError::TypeMismatch { .. })
        ));
        assert!(matches!(
            data.set("total", 1u32),
            Err(DynamicDataError::FieldNotFound(_))
        ));
        assert_eq!(data.get::<u32>("number").unwrap(), 12);
    }

    #[test]
    fn test_mappable_access_by_index() {
        let mut data = DynamicData::new(&invoice());
        data.write_field(1, DynamicValue::from("ACME")).unwrap();
        assert_eq!(data.read_field(1), Some(DynamicValue::from("ACME")));
        assert!(matches!(
            data.write_field(7, DynamicValue::U32(1)),
            Err(DynamicDataError::IndexOutOfBounds { index: 7, length: 3 })
        ));
        assert!(data.read_field(7).is_none());
    }

    #[test]
    fn test_access_flags() {
        let desc = Arc::new(
            TypeDescriptorBuilder::new("Audit")
                .field_with(
                    FieldDescriptor::new("id", Arc::new(TypeDescriptor::primitive(PrimitiveKind::U32)))
                        .read_only(),
                )
                .field_with(
                    FieldDescriptor::new("secret", Arc::new(TypeDescriptor::primitive(PrimitiveKind::String)))
                        .write_only(),
                )
                .build(),
        );
        let mut data = DynamicData::new(&desc);
        assert!(matches!(
            data.write_field(0, DynamicValue::U32(1)),
            Err(DynamicDataError::ReadOnly(_))
        ));
        data.write_field(1, DynamicValue::from("s3cret")).unwrap();
        assert!(data.read_field(1).is_none());
    }

    #[test]
    fn test_null_instance_has_no_fields() {
        let mut data = DynamicData::null(&invoice());
        assert!(data.is_null());
        assert!(data.read_field(0).is_none());
        assert_eq!(data.fields().count(), 0);
        assert!(matches!(
            data.set("number", 1u32),
            Err(DynamicDataError::InvalidOperation(_))
        ));
    }

    #[test]
    fn test_from_value_validates_shape() {
        let desc = invoice();
        assert!(DynamicData::from_value(&desc, DynamicValue::I32(1)).is_err());
        assert!(DynamicData::from_value(&desc, DynamicValue::Struct(HashMap::new())).is_ok());
        assert!(DynamicData::from_value(&desc, DynamicValue::Null).unwrap().is_null());
    }

    #[test]
    fn test_enum_field_defaults_to_zero_value() {
        let lamp = Arc::new(
            crate::dynamic::EnumBuilder::new("Lamp")
                .variant_value("Red", 2)
                .variant_value("Off", 0)
                .build(),
        );
        let desc = Arc::new(TypeDescriptorBuilder::new("Signal").enum_field("lamp", lamp).build());
        let data = DynamicData::new(&desc);
        assert_eq!(
            data.get_field("lamp").unwrap(),
            &DynamicValue::Enum(0, "Off".to_string())
        );
    }

    #[test]
    fn test_scalar_conversions_reject_other_variants() {
        assert_eq!(i16::from_dynamic(&DynamicValue::I16(-3)).unwrap(), -3);
        let err = i16::from_dynamic(&DynamicValue::I32(-3)).unwrap_err();
        assert_eq!(err.to_string(), "Type mismatch: expected i16, got i32");
        assert_eq!(Uuid::nil().to_dynamic(), DynamicValue::Uuid(Uuid::nil()));
    }
}
