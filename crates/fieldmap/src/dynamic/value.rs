// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! `DynamicValue`, the uniform currency every mapping step reads and writes.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// One field's worth of data, native or runtime-described.
#[derive(Debug, Clone, PartialEq)]
pub enum DynamicValue {
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    Char(char),
    String(String),
    Duration(Duration),
    Uuid(Uuid),

    /// Record keyed by field name.
    Struct(HashMap<String, DynamicValue>),
    /// Growable collection.
    Sequence(Vec<DynamicValue>),
    /// Fixed-length collection.
    Array(Vec<DynamicValue>),
    /// Enum as (numeric value, variant name).
    Enum(i64, String),

    /// Absent value: `None`, or a null record.
    Null,
}

// Scalar payloads are plain copies out of a single variant.
macro_rules! copy_accessors {
    ($($name:ident: $ty:ty => $variant:ident),* $(,)?) => {
        $(
            pub fn $name(&self) -> Option<$ty> {
                match self {
                    Self::$variant(v) => Some(*v),
                    _ => None,
                }
            }
        )*
    };
}

impl DynamicValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Primitives and enums.
    pub fn is_scalar(&self) -> bool {
        !matches!(
            self,
            Self::Struct(_) | Self::Sequence(_) | Self::Array(_) | Self::Null
        )
    }

    /// Short variant label used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::U8(_) => "u8",
            Self::U16(_) => "u16",
            Self::U32(_) => "u32",
            Self::U64(_) => "u64",
            Self::I8(_) => "i8",
            Self::I16(_) => "i16",
            Self::I32(_) => "i32",
            Self::I64(_) => "i64",
            Self::F32(_) => "f32",
            Self::F64(_) => "f64",
            Self::Char(_) => "char",
            Self::String(_) => "String",
            Self::Duration(_) => "Duration",
            Self::Uuid(_) => "Uuid",
            Self::Struct(_) => "struct",
            Self::Sequence(_) => "sequence",
            Self::Array(_) => "array",
            Self::Enum(_, _) => "enum",
            Self::Null => "null",
        }
    }

    copy_accessors!(
        as_u32: u32 => U32,
        as_i32: i32 => I32,
        as_f64: f64 => F64,
        as_duration: Duration => Duration,
    );

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    /// Items of either collection kind.
    pub fn as_sequence(&self) -> Option<&[DynamicValue]> {
        match self {
            Self::Sequence(v) | Self::Array(v) => Some(v),
            _ => None,
        }
    }

    pub fn get_field(&self, name: &str) -> Option<&DynamicValue> {
        match self {
            Self::Struct(fields) => fields.get(name),
            _ => None,
        }
    }

    pub fn enum_variant(&self) -> Option<&str> {
        match self {
            Self::Enum(_, name) => Some(name),
            _ => None,
        }
    }

    pub fn enum_value(&self) -> Option<i64> {
        match self {
            Self::Enum(value, _) => Some(*value),
            _ => None,
        }
    }
}

/// Canonical text form: scalars print bare, enums print their variant name,
/// composites print bracketed with struct keys sorted.
impl fmt::Display for DynamicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{}", v),
            Self::U8(v) => write!(f, "{}", v),
            Self::U16(v) => write!(f, "{}", v),
            Self::U32(v) => write!(f, "{}", v),
            Self::U64(v) => write!(f, "{}", v),
            Self::I8(v) => write!(f, "{}", v),
            Self::I16(v) => write!(f, "{}", v),
            Self::I32(v) => write!(f, "{}", v),
            Self::I64(v) => write!(f, "{}", v),
            Self::F32(v) => write!(f, "{}", v),
            Self::F64(v) => write!(f, "{}", v),
            Self::Char(v) => write!(f, "{}", v),
            Self::String(v) => f.write_str(v),
            Self::Duration(v) => write!(f, "{:?}", v),
            Self::Uuid(v) => write!(f, "{}", v.hyphenated()),
            Self::Enum(_, name) => f.write_str(name),
            Self::Null => f.write_str("null"),
            Self::Sequence(items) | Self::Array(items) => {
                f.write_str("[")?;
                write_joined(f, items.iter())?;
                f.write_str("]")
            }
            Self::Struct(fields) => {
                let mut entries: Vec<_> = fields.iter().collect();
                entries.sort_by(|a, b| a.0.cmp(b.0));
                f.write_str("{")?;
                write_joined(f, entries.into_iter().map(|(k, v)| Entry(k, v)))?;
                f.write_str("}")
            }
        }
    }
}

struct Entry<'a>(&'a str, &'a DynamicValue);

impl fmt::Display for Entry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.0, self.1)
    }
}

fn write_joined<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    items: impl Iterator<Item = T>,
) -> fmt::Result {
    for (i, item) in items.enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

macro_rules! from_scalar {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for DynamicValue {
                fn from(v: $ty) -> Self {
                    Self::$variant(v)
                }
            }
        )*
    };
}

from_scalar!(
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

impl From<&str> for DynamicValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl<T: Into<DynamicValue>> From<Vec<T>> for DynamicValue {
    fn from(v: Vec<T>) -> Self {
        Self::Sequence(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<DynamicValue>> From<Option<T>> for DynamicValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors_match_exact_variant() {
        let qty = DynamicValue::from(42u32);
        assert_eq!(qty.as_u32(), Some(42));
        assert_eq!(qty.as_i32(), None);
        assert!(qty.is_scalar());
        assert_eq!(DynamicValue::from("sku-1").as_str(), Some("sku-1"));
        assert_eq!(
            DynamicValue::from(Duration::from_millis(250)).as_duration(),
            Some(Duration::from_millis(250))
        );
    }

    #[test]
    fn test_struct_lookup() {
        let order = DynamicValue::Struct(HashMap::from([
            ("id".to_string(), DynamicValue::I64(7)),
            ("note".to_string(), DynamicValue::Null),
        ]));
        assert_eq!(order.get_field("id"), Some(&DynamicValue::I64(7)));
        assert!(order.get_field("note").is_some_and(DynamicValue::is_null));
        assert!(order.get_field("total").is_none());
        assert!(!order.is_scalar());
        assert!(DynamicValue::I64(7).get_field("id").is_none());
    }

    #[test]
    fn test_collections_share_sequence_view() {
        let seq = DynamicValue::from(vec![3u32, 4]);
        let arr = DynamicValue::Array(vec![DynamicValue::U32(3), DynamicValue::U32(4)]);
        assert_eq!(seq.as_sequence(), arr.as_sequence());
        assert_ne!(seq, arr);
    }

    #[test]
    fn test_enum_parts() {
        let status = DynamicValue::Enum(9, "Retired".to_string());
        assert_eq!(status.enum_variant(), Some("Retired"));
        assert_eq!(status.enum_value(), Some(9));
        assert_eq!(status.to_string(), "Retired");
        assert_eq!(status.kind_name(), "enum");
    }

    #[test]
    fn test_display_scalars() {
        assert_eq!(DynamicValue::from(false).to_string(), "false");
        assert_eq!(DynamicValue::from(-7i16).to_string(), "-7");
        assert_eq!(DynamicValue::from(0.25f64).to_string(), "0.25");
        assert_eq!(
            DynamicValue::from(Duration::from_millis(1500)).to_string(),
            "1.5s"
        );
        assert_eq!(
            DynamicValue::from(Uuid::nil()).to_string(),
            "00000000-0000-0000-0000-000000000000"
        );
        assert_eq!(DynamicValue::Null.to_string(), "null");
    }

    #[test]
    fn test_display_composites_sort_keys() {
        let line = DynamicValue::Struct(HashMap::from([
            ("sku".to_string(), DynamicValue::from("A-1")),
            ("qty".to_string(), DynamicValue::from(vec![1u8, 2])),
        ]));
        assert_eq!(line.to_string(), "{qty: [1, 2], sku: A-1}");
    }

    #[test]
    fn test_option_into_null() {
        assert!(DynamicValue::from(None::<i32>).is_null());
        assert_eq!(DynamicValue::from(Some(3i32)), DynamicValue::I32(3));
    }
}
