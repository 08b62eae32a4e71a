// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Mapper configuration.
//!
//! # Architecture
//!
//! - **Level 1 (Static)**: compile-time defaults and environment variable names
//! - **Level 2 (Dynamic)**: `MapperConfig`, held in an `ArcSwap` by each
//!   `Mapper` and replaceable at runtime
//!
//! # Example
//!
//! ```
//! use fieldmap::config::MapperConfig;
//!
//! let config = MapperConfig::default()
//!     .with_fast_plan_max_fields(16)
//!     .with_enum_cache_capacity(4096);
//! assert!(config.fast_plan);
//! ```

use std::num::NonZeroUsize;

#[cfg(feature = "config-loaders")]
mod yaml;

// =======================================================================
// Defaults
// =======================================================================

/// Largest field count (either side) that still gets a flat fast plan.
pub const DEFAULT_FAST_PLAN_MAX_FIELDS: usize = 8;

/// Entries kept by the enum parse cache.
pub const DEFAULT_ENUM_CACHE_CAPACITY: usize = 1024;

/// Separators accepted between tokens of a string-encoded enum list.
pub const DEFAULT_ENUM_LIST_SEPARATORS: [char; 3] = [',', ';', '|'];

// =======================================================================
// Environment
// =======================================================================

/// `0`/`false`/`off` disables fast plans.
pub const ENV_FAST_PLAN: &str = "FIELDMAP_FAST_PLAN";

/// Overrides `fast_plan_max_fields`.
pub const ENV_FAST_PLAN_MAX_FIELDS: &str = "FIELDMAP_FAST_PLAN_MAX_FIELDS";

/// Overrides `enum_cache_capacity`.
pub const ENV_ENUM_CACHE_CAPACITY: &str = "FIELDMAP_ENUM_CACHE_CAPACITY";

/// Runtime configuration of a `Mapper`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config-loaders", derive(serde::Deserialize))]
#[cfg_attr(feature = "config-loaders", serde(default, deny_unknown_fields))]
pub struct MapperConfig {
    /// Compile flat plans for small, conversion-only type pairs.
    pub fast_plan: bool,
    /// Field-count threshold for fast plans.
    pub fast_plan_max_fields: usize,
    /// Capacity of the enum parse cache (0 is treated as 1).
    pub enum_cache_capacity: usize,
    /// Separators for string-encoded enum lists.
    pub enum_list_separators: Vec<char>,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            fast_plan: true,
            fast_plan_max_fields: DEFAULT_FAST_PLAN_MAX_FIELDS,
            enum_cache_capacity: DEFAULT_ENUM_CACHE_CAPACITY,
            enum_list_separators: DEFAULT_ENUM_LIST_SEPARATORS.to_vec(),
        }
    }
}

impl MapperConfig {
    /// Defaults overridden by `FIELDMAP_*` environment variables.
    pub fn from_env() -> Self {
        Self::default().apply_env_with(|key| std::env::var(key).ok())
    }

    /// Apply overrides read through `lookup`; invalid values are logged and ignored.
    pub fn apply_env_with<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_FAST_PLAN) {
            match parse_flag(&raw) {
                Some(flag) => self.fast_plan = flag,
                None => log::warn!("[config] ignoring {}={:?}: not a boolean", ENV_FAST_PLAN, raw),
            }
        }
        if let Some(raw) = lookup(ENV_FAST_PLAN_MAX_FIELDS) {
            match raw.trim().parse::<usize>() {
                Ok(n) => self.fast_plan_max_fields = n,
                Err(e) => log::warn!(
                    "[config] ignoring {}={:?}: {}",
                    ENV_FAST_PLAN_MAX_FIELDS,
                    raw,
                    e
                ),
            }
        }
        if let Some(raw) = lookup(ENV_ENUM_CACHE_CAPACITY) {
            match raw.trim().parse::<usize>() {
                Ok(n) => self.enum_cache_capacity = n,
                Err(e) => log::warn!(
                    "[config] ignoring {}={:?}: {}",
                    ENV_ENUM_CACHE_CAPACITY,
                    raw,
                    e
                ),
            }
        }
        self
    }

    /// Enable or disable fast plans.
    pub fn with_fast_plan(mut self, enabled: bool) -> Self {
        self.fast_plan = enabled;
        self
    }

    /// Set the fast plan field threshold.
    pub fn with_fast_plan_max_fields(mut self, max: usize) -> Self {
        self.fast_plan_max_fields = max;
        self
    }

    /// Set the enum parse cache capacity.
    pub fn with_enum_cache_capacity(mut self, capacity: usize) -> Self {
        self.enum_cache_capacity = capacity;
        self
    }

    /// Set the enum list separators.
    pub fn with_enum_list_separators(mut self, separators: impl Into<Vec<char>>) -> Self {
        self.enum_list_separators = separators.into();
        self
    }

    /// Capacity as the LRU wants it.
    pub(crate) fn enum_cache_capacity_nonzero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.enum_cache_capacity).unwrap_or(NonZeroUsize::MIN)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}
