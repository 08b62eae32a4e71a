// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime type model.
//!
//! Every mappable type, derived or built at runtime, is described by a
//! [`TypeDescriptor`]. Field data travels as [`DynamicValue`], and
//! [`DynamicData`] pairs a value with its descriptor so runtime-built records
//! can be mapped like native structs.
//!
//! ```rust
//! use fieldmap::dynamic::{DynamicData, PrimitiveKind, TypeDescriptorBuilder};
//! use std::sync::Arc;
//!
//! let row = Arc::new(
//!     TypeDescriptorBuilder::new("PaymentRow")
//!         .field("Id", PrimitiveKind::I64)
//!         .field("Amount", PrimitiveKind::F64)
//!         .optional_field("Reference", PrimitiveKind::String)
//!         .build(),
//! );
//!
//! let mut payment = DynamicData::new(&row);
//! payment.set("Id", 17i64).unwrap();
//! payment.set("Amount", 120.0f64).unwrap();
//! assert!(payment.get_field("Reference").unwrap().is_null());
//! assert_eq!(payment.get::<f64>("Amount").unwrap(), 120.0);
//! ```

mod builder;
mod dynamic_data;
mod type_descriptor;
mod value;

pub use builder::{EnumBuilder, TypeDescriptorBuilder};
pub use dynamic_data::{DynamicData, DynamicDataError, FromDynamicValue, ToDynamicValue};
pub(crate) use dynamic_data::{default_value, value_conforms};
pub use type_descriptor::{
    ArrayDescriptor, EnumDescriptor, EnumVariant, FieldDescriptor, PrimitiveKind,
    SequenceDescriptor, TypeDescriptor, TypeIdent, TypeKind, TypeOrigin, TypeRef,
};
pub use value::DynamicValue;
