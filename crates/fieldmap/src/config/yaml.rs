// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! YAML configuration loader.
//!
//! # Example YAML
//!
//! ```yaml
//! # fieldmap.yaml
//! fast_plan: true
//! fast_plan_max_fields: 12
//! enum_cache_capacity: 4096
//! enum_list_separators: [",", "|"]
//! ```
//!
//! Missing keys keep their defaults; unknown keys are rejected.

use super::MapperConfig;
use crate::error::{MapError, Result};
use std::fs;
use std::path::Path;

impl MapperConfig {
    /// Parse a configuration document.
    pub fn from_yaml_str(yaml_content: &str) -> Result<Self> {
        serde_yaml::from_str(yaml_content)
            .map_err(|e| MapError::Config(format!("Failed to parse YAML: {}", e)))
    }

    /// Load a configuration document from disk.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml_content = fs::read_to_string(path).map_err(|e| {
            MapError::Config(format!(
                "Failed to read YAML file {}: {}",
                path.display(),
                e
            ))
        })?;
        log::debug!("[config] loading {}", path.display());
        Self::from_yaml_str(&yaml_content)
    }
}
