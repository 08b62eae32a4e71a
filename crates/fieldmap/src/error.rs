// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for mapping operations.

use crate::dynamic::DynamicDataError;

/// Boxed error returned by user-supplied mapping closures and converters.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by the mapper.
///
/// Per-field conversion problems are not errors: the field is skipped and
/// reported through diagnostics. Only failures the caller must see end up here.
#[derive(Debug)]
pub enum MapError {
    // ========================================================================
    // Input Errors
    // ========================================================================
    /// Source root is null (`None` or a null `DynamicData`).
    MissingSource {
        /// Name of the requested target type.
        target: String,
    },
    /// A custom mapping closure received a source it cannot handle.
    SourceTypeMismatch {
        /// Type the closure was registered for.
        expected: String,
        /// Type actually passed in.
        got: String,
    },

    // ========================================================================
    // User Callback Errors
    // ========================================================================
    /// A registered field mapping failed.
    FieldMapping { field: String, source: BoxError },
    /// A registered type converter failed.
    Converter {
        from: String,
        to: String,
        source: BoxError,
    },

    // ========================================================================
    // Other Errors
    // ========================================================================
    /// Dynamic data access failed.
    Data(DynamicDataError),
    /// Invalid configuration.
    Config(String),
}

impl MapError {
    pub(crate) fn field_mapping(field: &str, source: BoxError) -> Self {
        MapError::FieldMapping {
            field: field.to_string(),
            source,
        }
    }
}

impl std::fmt::Display for MapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MapError::MissingSource { target } => {
                write!(f, "Missing source: cannot map null into {}", target)
            }
            MapError::SourceTypeMismatch { expected, got } => {
                write!(f, "Source type mismatch: expected {}, got {}", expected, got)
            }
            MapError::FieldMapping { field, source } => {
                write!(f, "Custom mapping for field '{}' failed: {}", field, source)
            }
            MapError::Converter { from, to, source } => {
                write!(f, "Converter {} -> {} failed: {}", from, to, source)
            }
            MapError::Data(e) => write!(f, "Dynamic data error: {}", e),
            MapError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for MapError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MapError::FieldMapping { source, .. } | MapError::Converter { source, .. } => {
                Some(source.as_ref())
            }
            MapError::Data(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DynamicDataError> for MapError {
    fn from(e: DynamicDataError) -> Self {
        MapError::Data(e)
    }
}

/// Convenient alias for mapper results.
pub type Result<T> = core::result::Result<T, MapError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_display_messages() {
        let e = MapError::MissingSource {
            target: "Dto".into(),
        };
        assert_eq!(e.to_string(), "Missing source: cannot map null into Dto");

        let e = MapError::field_mapping("total", "boom".into());
        assert!(e.to_string().contains("'total'"));
        assert!(e.source().is_some());
    }

    #[test]
    fn test_from_dynamic_error() {
        let e: MapError = DynamicDataError::FieldNotFound("x".into()).into();
        assert!(matches!(e, MapError::Data(_)));
        assert!(e.source().is_some());
    }
}
