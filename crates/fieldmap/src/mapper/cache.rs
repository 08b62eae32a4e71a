// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Compiled mapper cache.
//!
//! Each key owns a `OnceLock`: concurrent first requests for the same pair
//! block on a single build and share its result. A key never exposes a
//! partially built mapper.

use super::key::TypeKey;
use super::plan::CompiledMapper;
use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

type Slot = Arc<OnceLock<Arc<CompiledMapper>>>;

#[derive(Default)]
pub struct MappingCache {
    entries: DashMap<TypeKey, Slot>,
    builds: AtomicUsize,
}

impl MappingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached mapper for `key`, running `build` if there is none yet.
    pub fn get_or_build<F>(&self, key: &TypeKey, build: F) -> Arc<CompiledMapper>
    where
        F: FnOnce() -> CompiledMapper,
    {
        // The shard guard must be released before `entry()` takes the write lock.
        let existing = self.entries.get(key).map(|slot| slot.clone());
        let slot = match existing {
            Some(slot) => slot,
            None => self.entries.entry(key.clone()).or_default().clone(),
        };
        slot.get_or_init(|| {
            self.builds.fetch_add(1, Ordering::Relaxed);
            log::debug!("[cache] building mapper {}", key);
            Arc::new(build())
        })
        .clone()
    }

    /// Cached mapper for `key`, if fully built.
    pub fn get(&self, key: &TypeKey) -> Option<Arc<CompiledMapper>> {
        self.entries.get(key).and_then(|slot| slot.get().cloned())
    }

    /// Drop the mapper for `key`. Returns `true` if one was cached.
    pub fn invalidate(&self, key: &TypeKey) -> bool {
        let removed = self.entries.remove(key).is_some();
        if removed {
            log::debug!("[cache] invalidated {}", key);
        }
        removed
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Keys with a fully built mapper.
    pub fn keys(&self) -> Vec<TypeKey> {
        self.entries
            .iter()
            .filter(|e| e.value().get().is_some())
            .map(|e| e.key().clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.value().get().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Mappers built since creation (survives `clear`).
    pub fn build_count(&self) -> usize {
        self.builds.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for MappingCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappingCache")
            .field("len", &self.len())
            .field("builds", &self.build_count())
            .finish()
    }
}
