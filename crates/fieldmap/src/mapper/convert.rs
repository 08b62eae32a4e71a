// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Built-in value conversions.
//!
//! `classify` picks a conversion once, at compile time, from the source and
//! target descriptors. `apply` runs it on each value.

use super::enums::{split_enum_list, EnumCache};
use super::registry::TypeRegistry;
use crate::dynamic::{
    default_value, DynamicValue, EnumDescriptor, PrimitiveKind, TypeDescriptor, TypeIdent,
    TypeKind,
};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Runtime conversion failure. The field is skipped.
#[derive(Debug, Clone, PartialEq)]
pub enum ConvertError {
    /// The value is not of the kind the conversion was compiled for.
    UnexpectedValue { expected: &'static str, got: &'static str },
    /// Float NaN cannot become an integer.
    NotANumber,
    /// Value outside the representable range (negative durations).
    OutOfRange(String),
    /// Text did not parse as the target type.
    Parse { input: String, target: &'static str },
    /// Token or value names no variant.
    UnknownVariant { enum_name: String, token: String },
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedValue { expected, got } => {
                write!(f, "expected {} value, got {}", expected, got)
            }
            Self::NotANumber => write!(f, "NaN has no integer value"),
            Self::OutOfRange(msg) => write!(f, "out of range: {}", msg),
            Self::Parse { input, target } => write!(f, "cannot parse {:?} as {}", input, target),
            Self::UnknownVariant { enum_name, token } => {
                write!(f, "{:?} is not a variant of {}", token, enum_name)
            }
        }
    }
}

impl std::error::Error for ConvertError {}

/// Target enum of a conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumTarget {
    ident: TypeIdent,
    desc: Arc<EnumDescriptor>,
}

impl EnumTarget {
    fn new(target: &TypeDescriptor, desc: &EnumDescriptor) -> Self {
        Self {
            ident: target.ident(),
            desc: Arc::new(desc.clone()),
        }
    }

    fn default_value(&self) -> DynamicValue {
        match self.desc.default_variant() {
            Some(v) => DynamicValue::Enum(v.value, v.name.clone()),
            None => DynamicValue::Null,
        }
    }

    fn parse(&self, token: &str, ctx: &ConvertContext<'_>) -> Result<DynamicValue, ConvertError> {
        ctx.enums
            .parse(&self.ident, &self.desc, token)
            .map(|v| DynamicValue::Enum(v.value, v.name))
            .ok_or_else(|| ConvertError::UnknownVariant {
                enum_name: self.ident.to_string(),
                token: token.to_string(),
            })
    }
}

/// Shape of a target collection.
#[derive(Debug, Clone, PartialEq)]
pub enum CollectionShape {
    /// `Vec<T>`; bounded sequences truncate at `max`.
    Growable { max: Option<usize> },
    /// `[T; N]`: truncated or padded with `fill`.
    Fixed { length: usize, fill: DynamicValue },
}

impl CollectionShape {
    /// Shape of `target`, padding arrays with `fill`.
    pub fn of(target: &TypeDescriptor, fill: DynamicValue) -> Self {
        match &target.kind {
            TypeKind::Array(arr) => Self::Fixed {
                length: arr.length,
                fill,
            },
            TypeKind::Sequence(seq) => Self::Growable {
                max: seq.max_length,
            },
            _ => Self::Growable { max: None },
        }
    }

    pub fn apply(&self, mut items: Vec<DynamicValue>) -> DynamicValue {
        match self {
            Self::Growable { max } => {
                if let Some(max) = max {
                    items.truncate(*max);
                }
                DynamicValue::Sequence(items)
            }
            Self::Fixed { length, fill } => {
                items.truncate(*length);
                items.resize(*length, fill.clone());
                DynamicValue::Array(items)
            }
        }
    }
}

/// A compiled built-in conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum Conversion {
    /// Numeric widening, or clamping narrowing.
    Numeric(PrimitiveKind),
    /// Any scalar to its canonical text.
    ToText,
    /// Duration to milliseconds.
    DurationToMillis(PrimitiveKind),
    /// Integer milliseconds to duration.
    MillisToDuration,
    ParseNumber(PrimitiveKind),
    ParseBool,
    ParseUuid,
    TextToEnum(EnumTarget),
    NumberToEnum(EnumTarget),
    EnumToEnum(EnumTarget),
    EnumToNumber(PrimitiveKind),
    /// Delimited string or JSON array literal to an enum collection.
    TextToEnumList {
        element: EnumTarget,
        shape: CollectionShape,
    },
    /// Enum collection to a comma separated string.
    EnumListToText,
    /// Element-wise conversion between scalar collections.
    Elements {
        element: Option<Box<Conversion>>,
        shape: CollectionShape,
    },
}

/// Shared state a conversion may consult.
pub struct ConvertContext<'a> {
    pub enums: &'a EnumCache,
    pub separators: &'a [char],
}

/// Pick the conversion from `source` to `target`, both already resolved.
pub fn classify(
    source: &TypeDescriptor,
    target: &TypeDescriptor,
    registry: &TypeRegistry,
) -> Option<Conversion> {
    use TypeKind::{Array, Enum, Primitive, Sequence};

    match (&source.kind, &target.kind) {
        (Primitive(s), Primitive(t)) => classify_primitive(*s, *t),
        (Enum(_), Primitive(PrimitiveKind::String)) => Some(Conversion::ToText),
        (Enum(_), Primitive(t)) if t.is_numeric() => Some(Conversion::EnumToNumber(*t)),
        (Primitive(PrimitiveKind::String), Enum(e)) => {
            Some(Conversion::TextToEnum(EnumTarget::new(target, e)))
        }
        (Primitive(s), Enum(e)) if s.is_integer() => {
            Some(Conversion::NumberToEnum(EnumTarget::new(target, e)))
        }
        (Enum(_), Enum(e)) => Some(Conversion::EnumToEnum(EnumTarget::new(target, e))),
        (Primitive(PrimitiveKind::String), Sequence(_) | Array(_)) => {
            let element = registry.resolve(target.element_type()?);
            let e = element.enum_descriptor()?;
            let element = EnumTarget::new(&element, e);
            let shape = CollectionShape::of(target, element.default_value());
            Some(Conversion::TextToEnumList { element, shape })
        }
        (Sequence(_) | Array(_), Primitive(PrimitiveKind::String)) => {
            let element = registry.resolve(source.element_type()?);
            element.is_enum().then_some(Conversion::EnumListToText)
        }
        (Sequence(_) | Array(_), Sequence(_) | Array(_)) => {
            let se = registry.resolve(source.element_type()?);
            let te = registry.resolve(target.element_type()?);
            if !se.is_scalar() || !te.is_scalar() {
                return None;
            }
            let element = if se.ident() == te.ident() {
                None
            } else {
                let inner = classify(&se, &te, registry)?;
                if matches!(
                    inner,
                    Conversion::TextToEnumList { .. }
                        | Conversion::EnumListToText
                        | Conversion::Elements { .. }
                ) {
                    return None;
                }
                Some(Box::new(inner))
            };
            let shape = CollectionShape::of(target, default_value(&te.kind));
            Some(Conversion::Elements { element, shape })
        }
        _ => None,
    }
}

fn classify_primitive(s: PrimitiveKind, t: PrimitiveKind) -> Option<Conversion> {
    use PrimitiveKind as P;

    if s == t {
        return None;
    }
    match (s, t) {
        _ if (s.is_numeric() || s == P::Bool) && t.is_numeric() => Some(Conversion::Numeric(t)),
        (_, P::String) => Some(Conversion::ToText),
        (P::Duration, t) if t.is_numeric() => Some(Conversion::DurationToMillis(t)),
        (s, P::Duration) if s.is_integer() => Some(Conversion::MillisToDuration),
        (P::String, t) if t.is_numeric() => Some(Conversion::ParseNumber(t)),
        (P::String, P::Bool) => Some(Conversion::ParseBool),
        (P::String, P::Uuid) => Some(Conversion::ParseUuid),
        _ => None,
    }
}

/// Run `conversion` on a non-null value.
pub fn apply(
    conversion: &Conversion,
    value: DynamicValue,
    ctx: &ConvertContext<'_>,
) -> Result<DynamicValue, ConvertError> {
    match conversion {
        Conversion::Numeric(kind) => number_to(number_of(&value)?, *kind),
        Conversion::ToText => {
            if value.is_scalar() {
                Ok(DynamicValue::String(value.to_string()))
            } else {
                Err(unexpected("scalar", &value))
            }
        }
        Conversion::DurationToMillis(kind) => {
            let d = value.as_duration().ok_or_else(|| unexpected("Duration", &value))?;
            let millis = if kind.is_float() {
                Number::Float(d.as_secs_f64() * 1000.0)
            } else {
                Number::Int(i128::try_from(d.as_millis()).unwrap_or(i128::MAX))
            };
            number_to(millis, *kind)
        }
        Conversion::MillisToDuration => match number_of(&value)? {
            Number::Int(ms) if ms < 0 => Err(ConvertError::OutOfRange(format!(
                "negative duration {}ms",
                ms
            ))),
            Number::Int(ms) => Ok(DynamicValue::Duration(Duration::from_millis(
                u64::try_from(ms).unwrap_or(u64::MAX),
            ))),
            Number::Float(_) => Err(unexpected("integer", &value)),
        },
        Conversion::ParseNumber(kind) => {
            let text = value.as_str().ok_or_else(|| unexpected("String", &value))?;
            number_to(parse_number(text, *kind)?, *kind)
        }
        Conversion::ParseBool => {
            let text = value.as_str().ok_or_else(|| unexpected("String", &value))?;
            match text.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Ok(DynamicValue::Bool(true)),
                "false" | "0" | "no" | "off" => Ok(DynamicValue::Bool(false)),
                _ => Err(parse_error(text, "bool")),
            }
        }
        Conversion::ParseUuid => {
            let text = value.as_str().ok_or_else(|| unexpected("String", &value))?;
            Uuid::parse_str(text.trim())
                .map(DynamicValue::Uuid)
                .map_err(|_| parse_error(text, "Uuid"))
        }
        Conversion::TextToEnum(target) => {
            let text = value.as_str().ok_or_else(|| unexpected("String", &value))?;
            target.parse(text, ctx)
        }
        Conversion::NumberToEnum(target) => {
            let raw = match number_of(&value)? {
                Number::Int(i) => i64::try_from(i).ok(),
                Number::Float(_) => None,
            };
            raw.and_then(|v| target.desc.variant_by_value(v))
                .map(|v| DynamicValue::Enum(v.value, v.name.clone()))
                .ok_or_else(|| ConvertError::UnknownVariant {
                    enum_name: target.ident.to_string(),
                    token: value.to_string(),
                })
        }
        Conversion::EnumToEnum(target) => {
            let name = value.enum_variant().ok_or_else(|| unexpected("enum", &value))?;
            target.parse(name, ctx)
        }
        Conversion::EnumToNumber(kind) => {
            let raw = value.enum_value().ok_or_else(|| unexpected("enum", &value))?;
            number_to(Number::Int(raw.into()), *kind)
        }
        Conversion::TextToEnumList { element, shape } => {
            let text = value.as_str().ok_or_else(|| unexpected("String", &value))?;
            let tokens =
                split_enum_list(text, ctx.separators).ok_or_else(|| parse_error(text, "enum list"))?;
            let items = tokens
                .iter()
                .map(|token| element.parse(token, ctx))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(shape.apply(items))
        }
        Conversion::EnumListToText => {
            let items = value.as_sequence().ok_or_else(|| unexpected("sequence", &value))?;
            let names = items
                .iter()
                .map(|item| item.enum_variant().ok_or_else(|| unexpected("enum", item)))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(DynamicValue::String(names.join(",")))
        }
        Conversion::Elements { element, shape } => {
            let items = match value {
                DynamicValue::Sequence(items) | DynamicValue::Array(items) => items,
                other => return Err(unexpected("sequence", &other)),
            };
            let items = match element {
                None => items,
                Some(inner) => items
                    .into_iter()
                    .map(|item| {
                        if item.is_null() {
                            Ok(item)
                        } else {
                            apply(inner, item, ctx)
                        }
                    })
                    .collect::<Result<Vec<_>, _>>()?,
            };
            Ok(shape.apply(items))
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Number {
    Int(i128),
    Float(f64),
}

fn number_of(value: &DynamicValue) -> Result<Number, ConvertError> {
    Ok(match *value {
        DynamicValue::Bool(b) => Number::Int(i128::from(b)),
        DynamicValue::U8(v) => Number::Int(v.into()),
        DynamicValue::U16(v) => Number::Int(v.into()),
        DynamicValue::U32(v) => Number::Int(v.into()),
        DynamicValue::U64(v) => Number::Int(v.into()),
        DynamicValue::I8(v) => Number::Int(v.into()),
        DynamicValue::I16(v) => Number::Int(v.into()),
        DynamicValue::I32(v) => Number::Int(v.into()),
        DynamicValue::I64(v) => Number::Int(v.into()),
        DynamicValue::F32(v) => Number::Float(v.into()),
        DynamicValue::F64(v) => Number::Float(v),
        DynamicValue::Enum(v, _) => Number::Int(v.into()),
        ref other => return Err(unexpected("number", other)),
    })
}

/// Convert to `kind`, clamping at the target range. Floats truncate toward zero.
fn number_to(n: Number, kind: PrimitiveKind) -> Result<DynamicValue, ConvertError> {
    macro_rules! int {
        ($ty:ty, $variant:ident) => {
            DynamicValue::$variant(match n {
                Number::Int(i) => i.clamp(<$ty>::MIN as i128, <$ty>::MAX as i128) as $ty,
                Number::Float(f) if f.is_nan() => return Err(ConvertError::NotANumber),
                // `as` saturates at the bounds and truncates toward zero.
                Number::Float(f) => f as $ty,
            })
        };
    }

    Ok(match kind {
        PrimitiveKind::U8 => int!(u8, U8),
        PrimitiveKind::U16 => int!(u16, U16),
        PrimitiveKind::U32 => int!(u32, U32),
        PrimitiveKind::U64 => int!(u64, U64),
        PrimitiveKind::I8 => int!(i8, I8),
        PrimitiveKind::I16 => int!(i16, I16),
        PrimitiveKind::I32 => int!(i32, I32),
        PrimitiveKind::I64 => int!(i64, I64),
        PrimitiveKind::F32 => DynamicValue::F32(match n {
            Number::Int(i) => i as f32,
            Number::Float(f) if f.is_finite() => f.clamp(f32::MIN as f64, f32::MAX as f64) as f32,
            Number::Float(f) => f as f32,
        }),
        PrimitiveKind::F64 => DynamicValue::F64(match n {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }),
        other => {
            return Err(ConvertError::UnexpectedValue {
                expected: other.name(),
                got: "number",
            })
        }
    })
}

fn parse_number(text: &str, kind: PrimitiveKind) -> Result<Number, ConvertError> {
    let trimmed = text.trim();
    if kind.is_integer() {
        if let Ok(i) = trimmed.parse::<i128>() {
            return Ok(Number::Int(i));
        }
    }
    trimmed
        .parse::<f64>()
        .map(Number::Float)
        .map_err(|_| parse_error(text, kind.name()))
}

fn unexpected(expected: &'static str, got: &DynamicValue) -> ConvertError {
    ConvertError::UnexpectedValue {
        expected,
        got: got.kind_name(),
    }
}

fn parse_error(input: &str, target: &'static str) -> ConvertError {
    ConvertError::Parse {
        input: input.to_string(),
        target,
    }
}
