// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-field skip reports.
//!
//! Fields that cannot be mapped at runtime are left untouched on the target.
//! Each skip is logged at `debug` and, for `Mapper::map_with_diagnostics`,
//! collected into a `FieldDiagnostic`.

use std::fmt;

/// Why a field was left unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Source value is null and the target field is not nullable.
    NullValue,
    /// Source field could not be read.
    Unreadable,
    /// Built-in conversion failed (parse error, NaN, negative duration...).
    Conversion(String),
    /// Token did not name a variant of the target enum.
    EnumParse(String),
    /// Target refused the converted value.
    Rejected(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NullValue => write!(f, "null value for non-nullable field"),
            SkipReason::Unreadable => write!(f, "source field unreadable"),
            SkipReason::Conversion(msg) => write!(f, "conversion failed: {}", msg),
            SkipReason::EnumParse(msg) => write!(f, "enum parse failed: {}", msg),
            SkipReason::Rejected(msg) => write!(f, "target rejected value: {}", msg),
        }
    }
}

/// A target field skipped during one mapping call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDiagnostic {
    /// Dotted path from the root target, e.g. `address.zip` or `lines[2].qty`.
    pub field: String,
    pub reason: SkipReason,
}

impl fmt::Display for FieldDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// Collects skips for one mapping call, tracking the current nesting path.
#[derive(Debug, Default)]
pub(crate) struct DiagnosticSink {
    collected: Option<Vec<FieldDiagnostic>>,
    path: String,
}

impl DiagnosticSink {
    /// Log-only sink.
    pub(crate) fn silent() -> Self {
        Self::default()
    }

    /// Sink that also keeps every diagnostic.
    pub(crate) fn collecting() -> Self {
        Self {
            collected: Some(Vec::new()),
            path: String::new(),
        }
    }

    pub(crate) fn skip(&mut self, field: &str, reason: SkipReason) {
        let logging = log::log_enabled!(log::Level::Debug);
        if !logging && self.collected.is_none() {
            return;
        }
        let path = format!("{}{}", self.path, field);
        if logging {
            log::debug!("[mapper] skipped {}: {}", path, reason);
        }
        if let Some(collected) = self.collected.as_mut() {
            collected.push(FieldDiagnostic {
                field: path,
                reason,
            });
        }
    }

    /// Append `segment` to the current path; returns the mark for `leave`.
    pub(crate) fn enter(&mut self, segment: &str) -> usize {
        let mark = self.path.len();
        self.path.push_str(segment);
        self.path.push('.');
        mark
    }

    pub(crate) fn leave(&mut self, mark: usize) {
        self.path.truncate(mark);
    }

    /// Run `f` with `segment` appended to the current path.
    #[cfg(test)]
    fn nested<R>(&mut self, segment: &str, f: impl FnOnce(&mut Self) -> R) -> R {
        let mark = self.enter(segment);
        let result = f(self);
        self.leave(mark);
        result
    }

    pub(crate) fn into_diagnostics(self) -> Vec<FieldDiagnostic> {
        self.collected.unwrap_or_default()
    }
}
