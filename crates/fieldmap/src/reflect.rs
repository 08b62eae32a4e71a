// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Static type information for native Rust types.
//!
//! `TypeInfo` describes a type's shape; `Mappable` gives index-based access to
//! its fields. Both are normally generated by `#[derive(Mappable)]`, and
//! `DynamicData` implements `Mappable` directly.

use crate::dynamic::{
    DynamicDataError, DynamicValue, FromDynamicValue, PrimitiveKind, ToDynamicValue,
    TypeDescriptor,
};
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Describes a type to the mapper.
pub trait TypeInfo {
    /// `true` for `Option<T>`: the slot accepts `DynamicValue::Null`.
    const NULLABLE: bool = false;

    /// Full descriptor of this type.
    fn type_descriptor() -> TypeDescriptor;

    /// Descriptor used when this type appears as a field or element.
    ///
    /// Derived structs return a deferred nested reference here, which keeps
    /// self-referential types finite.
    fn field_type() -> Arc<TypeDescriptor> {
        Arc::new(Self::type_descriptor())
    }
}

/// Index-based field access used by compiled mappers.
///
/// Indices follow the declaration order of the type's descriptor fields.
pub trait Mappable: Any {
    /// Snapshot of field `index`, or `None` if it cannot be read.
    fn read_field(&self, index: usize) -> Option<DynamicValue>;

    /// Store `value` into field `index`.
    fn write_field(&mut self, index: usize, value: DynamicValue) -> Result<(), DynamicDataError>;

    fn as_any(&self) -> &dyn Any;
}

macro_rules! impl_primitive_info {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl TypeInfo for $ty {
                fn type_descriptor() -> TypeDescriptor {
                    TypeDescriptor::primitive(PrimitiveKind::$kind)
                }
            }
        )*
    };
}

impl_primitive_info!(
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
    String => String,
    Duration => Duration,
    Uuid => Uuid,
);

impl TypeInfo for DynamicValue {
    const NULLABLE: bool = true;

    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::any()
    }
}

impl<T: TypeInfo> TypeInfo for Option<T> {
    const NULLABLE: bool = true;

    fn type_descriptor() -> TypeDescriptor {
        T::type_descriptor()
    }

    fn field_type() -> Arc<TypeDescriptor> {
        T::field_type()
    }
}

impl<T: TypeInfo> TypeInfo for Box<T> {
    const NULLABLE: bool = T::NULLABLE;

    fn type_descriptor() -> TypeDescriptor {
        T::type_descriptor()
    }

    fn field_type() -> Arc<TypeDescriptor> {
        T::field_type()
    }
}

impl<T: TypeInfo> TypeInfo for Vec<T> {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::sequence(T::field_type())
    }
}

impl<T: TypeInfo, const N: usize> TypeInfo for [T; N] {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::array(T::field_type(), N)
    }
}

impl<T: ToDynamicValue> ToDynamicValue for Option<T> {
    fn to_dynamic(&self) -> DynamicValue {
        match self {
            Some(v) => v.to_dynamic(),
            None => DynamicValue::Null,
        }
    }
}

impl<T: FromDynamicValue> FromDynamicValue for Option<T> {
    fn from_dynamic(value: &DynamicValue) -> Result<Self, DynamicDataError> {
        match value {
            DynamicValue::Null => Ok(None),
            other => T::from_dynamic(other).map(Some),
        }
    }
}

impl<T: ToDynamicValue> ToDynamicValue for Box<T> {
    fn to_dynamic(&self) -> DynamicValue {
        (**self).to_dynamic()
    }
}

impl<T: FromDynamicValue> FromDynamicValue for Box<T> {
    fn from_dynamic(value: &DynamicValue) -> Result<Self, DynamicDataError> {
        T::from_dynamic(value).map(Box::new)
    }
}

impl<T: ToDynamicValue> ToDynamicValue for Vec<T> {
    fn to_dynamic(&self) -> DynamicValue {
        DynamicValue::Sequence(self.iter().map(ToDynamicValue::to_dynamic).collect())
    }
}

impl<T: FromDynamicValue> FromDynamicValue for Vec<T> {
    fn from_dynamic(value: &DynamicValue) -> Result<Self, DynamicDataError> {
        match value {
            DynamicValue::Sequence(items) | DynamicValue::Array(items) => {
                items.iter().map(T::from_dynamic).collect()
            }
            other => Err(DynamicDataError::TypeMismatch {
                expected: "sequence".to_string(),
                got: other.kind_name().to_string(),
            }),
        }
    }
}

impl<T: ToDynamicValue, const N: usize> ToDynamicValue for [T; N] {
    fn to_dynamic(&self) -> DynamicValue {
        DynamicValue::Array(self.iter().map(ToDynamicValue::to_dynamic).collect())
    }
}

impl<T: FromDynamicValue, const N: usize> FromDynamicValue for [T; N] {
    fn from_dynamic(value: &DynamicValue) -> Result<Self, DynamicDataError> {
        let items: Vec<T> = Vec::from_dynamic(value)?;
        let length = items.len();
        items
            .try_into()
            .map_err(|_| DynamicDataError::TypeMismatch {
                expected: format!("array of {}", N),
                got: format!("{} elements", length),
            })
    }
}
