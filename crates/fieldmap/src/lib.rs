// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # fieldmap - compiled object-to-object mapping
//!
//! Copies field values from a source object to a target object of another
//! shape. Fields are matched by case-insensitive name, incompatible values are
//! converted where it is safe (clamping numerics, parsing enums, reshaping
//! collections) and callers can override any field with their own logic.
//!
//! Each (source, target) type pair is compiled once into a `CompiledMapper`
//! and cached; later calls only execute the plan.
//!
//! ## Quick Start
//!
//! ```rust
//! use fieldmap::{Mappable, MappableEnum, Mapper, Result};
//!
//! #[derive(MappableEnum, Default, Debug, PartialEq)]
//! enum Status {
//!     #[default]
//!     Active,
//!     OnHold,
//! }
//!
//! #[derive(Mappable, Default)]
//! struct User {
//!     first: String,
//!     last: String,
//!     status: String,
//! }
//!
//! #[derive(Mappable, Default, Debug)]
//! struct UserDto {
//!     full_name: String,
//!     status: Status,
//! }
//!
//! fn main() -> Result<()> {
//!     let mapper = Mapper::new();
//!     mapper.register_field_mapping::<User, UserDto, _, _>("full_name", |u| {
//!         format!("{} {}", u.first, u.last)
//!     });
//!
//!     let user = User { first: "Ada".into(), last: "Lovelace".into(), status: "on-hold".into() };
//!     let dto: UserDto = mapper.map(&user)?;
//!     assert_eq!(dto.full_name, "Ada Lovelace");
//!     assert_eq!(dto.status, Status::OnHold);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------------+
//! |                       Mapper (facade, Clone)                        |
//! |   map | map_into | map_all | map_dynamic | registrations | config   |
//! +---------------------------------------------------------------------+
//! |                        Compilation                                  |
//! |   TypeRegistry -> match_fields -> Resolver -> CompiledMapper        |
//! +---------------------------------------------------------------------+
//! |                         Execution                                   |
//! |   MappingCache | built-in conversions | EnumCache | diagnostics     |
//! +---------------------------------------------------------------------+
//! |                        Type system                                  |
//! |   TypeInfo/Mappable (derive) | TypeDescriptor | DynamicData         |
//! +---------------------------------------------------------------------+
//! ```
//!
//! ## Modules Overview
//!
//! - [`mapper`] - engine, caches, registrations (start here)
//! - [`dynamic`] - runtime type descriptors and values
//! - [`reflect`] - `TypeInfo` and `Mappable` traits
//! - [`config`] - `MapperConfig`

// Allow the derive macros to work inside this crate's tests
extern crate self as fieldmap;

/// Mapper configuration (defaults, environment, YAML).
pub mod config;
/// Dynamic Types for runtime type manipulation without compile-time type knowledge.
pub mod dynamic;
/// Error types.
pub mod error;
/// Compiled mapping engine.
pub mod mapper;
/// Static type information for native types.
pub mod reflect;

pub use config::MapperConfig;
pub use dynamic::{
    DynamicData, DynamicValue, FromDynamicValue, ToDynamicValue, TypeDescriptor,
    TypeDescriptorBuilder,
};
pub use error::{BoxError, MapError, Result};
pub use mapper::{CompiledMapper, FieldDiagnostic, Mapper, SkipReason, Strategy, TypeKey};
pub use reflect::{Mappable, TypeInfo};

// Derive macros (for #[derive(fieldmap::Mappable)])
pub use fieldmap_codegen::{Mappable, MappableEnum};

/// Crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
