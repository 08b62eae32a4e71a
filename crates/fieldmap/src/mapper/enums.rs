// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Enum token parsing with a bounded cache of successful parses.

use crate::dynamic::{EnumDescriptor, EnumVariant, TypeIdent};
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;

/// Comparison form of an enum token: lowercase, without `-`, `_` or spaces.
pub fn normalize_token(token: &str) -> String {
    token
        .chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Parse `token` against `desc` without caching.
///
/// Tries, in order: exact name, normalized name, integer variant value.
pub fn parse_variant<'a>(desc: &'a EnumDescriptor, token: &str) -> Option<&'a EnumVariant> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    if let Some(v) = desc.variant(token) {
        return Some(v);
    }
    let wanted = normalize_token(token);
    if let Some(v) = desc
        .variants
        .iter()
        .find(|v| normalize_token(&v.name) == wanted)
    {
        return Some(v);
    }
    token
        .parse::<i64>()
        .ok()
        .and_then(|value| desc.variant_by_value(value))
}

/// Split a string-encoded enum list into tokens.
///
/// A value starting with `[` is read as a JSON array of strings or integers;
/// anything else is split on `separators`. Returns `None` for malformed JSON.
pub fn split_enum_list(raw: &str, separators: &[char]) -> Option<Vec<String>> {
    let trimmed = raw.trim();
    if trimmed.starts_with('[') {
        let items: Vec<serde_json::Value> = match serde_json::from_str(trimmed) {
            Ok(items) => items,
            Err(e) => {
                log::debug!("[convert] malformed enum list {:?}: {}", trimmed, e);
                return None;
            }
        };
        return items
            .into_iter()
            .map(|item| match item {
                serde_json::Value::String(s) => Some(s),
                serde_json::Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect();
    }
    Some(
        trimmed
            .split(|c| separators.contains(&c))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

type CacheKey = (TypeIdent, String);

/// LRU cache of `(enum, token) -> variant`. Only successes are stored.
pub struct EnumCache {
    entries: Mutex<LruCache<CacheKey, EnumVariant>>,
}

impl EnumCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Parse `token` as a variant of the enum `ident` described by `desc`.
    ///
    /// A cached variant is only returned while `desc` still declares it with
    /// the same value; a runtime enum redefined under the same name reparses.
    pub fn parse(&self, ident: &TypeIdent, desc: &EnumDescriptor, token: &str) -> Option<EnumVariant> {
        let key = (ident.clone(), token.to_string());
        if let Some(hit) = self.entries.lock().get(&key) {
            if desc.variant(&hit.name) == Some(hit) {
                return Some(hit.clone());
            }
            log::debug!("[enum] stale cache entry for {} {:?}", ident, token);
        }
        let variant = parse_variant(desc, token)?.clone();
        self.entries.lock().put(key, variant.clone());
        Some(variant)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Change capacity, evicting least recently used entries if shrinking.
    pub fn resize(&self, capacity: NonZeroUsize) {
        self.entries.lock().resize(capacity);
    }
}

impl std::fmt::Debug for EnumCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entries = self.entries.lock();
        f.debug_struct("EnumCache")
            .field("len", &entries.len())
            .field("capacity", &entries.cap())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamic::{EnumBuilder, TypeDescriptor};

    fn status() -> TypeDescriptor {
        EnumBuilder::new("Status")
            .variant("Active")
            .variant("OnHold")
            .variant_value("Closed", 10)
            .build()
    }

    #[test]
    fn test_normalize_token() {
        assert_eq!(normalize_token("On-Hold"), "onhold");
        assert_eq!(normalize_token("ON_HOLD"), "onhold");
        assert_eq!(normalize_token("on hold"), "onhold");
    }

    #[test]
    fn test_parse_variant_rules() {
        let desc = status();
        let e = desc.enum_descriptor().unwrap();
        assert_eq!(parse_variant(e, "Active").map(|v| v.value), Some(0));
        assert_eq!(parse_variant(e, "active").map(|v| v.value), Some(0));
        assert_eq!(parse_variant(e, " on_hold ").map(|v| v.value), Some(1));
        assert_eq!(parse_variant(e, "10").map(|v| v.name.as_str()), Some("Closed"));
        assert!(parse_variant(e, "7").is_none());
        assert!(parse_variant(e, "").is_none());
        assert!(parse_variant(e, "Pending").is_none());
    }

    #[test]
    fn test_cache_stores_only_successes() {
        let desc = status();
        let cache = EnumCache::new(NonZeroUsize::new(8).unwrap());
        let ident = desc.ident();
        let e = desc.enum_descriptor().unwrap();
        assert!(cache.parse(&ident, e, "ACTIVE").is_some());
        assert!(cache.parse(&ident, e, "nope").is_none());
        assert_eq!(cache.len(), 1);
        assert!(cache.parse(&ident, e, "ACTIVE").is_some());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_follows_redefined_enum() {
        let cache = EnumCache::new(NonZeroUsize::new(8).unwrap());
        let v1 = EnumBuilder::new("Status").variant("Open").variant("Closed").build();
        let v2 = EnumBuilder::new("Status")
            .variant("Open")
            .variant_value("Closed", 5)
            .build();
        assert_eq!(v1.ident(), v2.ident());

        let first = cache.parse(&v1.ident(), v1.enum_descriptor().unwrap(), "closed");
        assert_eq!(first.map(|v| v.value), Some(1));
        let second = cache.parse(&v2.ident(), v2.enum_descriptor().unwrap(), "closed");
        assert_eq!(second.map(|v| v.value), Some(5));
        assert_eq!(cache.len(), 1);

        let renamed = EnumBuilder::new("Status").variant("Open").variant("Done").build();
        assert!(cache
            .parse(&renamed.ident(), renamed.enum_descriptor().unwrap(), "closed")
            .is_none());
    }

    #[test]
    fn test_cache_is_bounded() {
        let desc = status();
        let cache = EnumCache::new(NonZeroUsize::new(2).unwrap());
        let ident = desc.ident();
        let e = desc.enum_descriptor().unwrap();
        for token in ["active", "ACTIVE", "Active", "onhold"] {
            cache.parse(&ident, e, token);
        }
        assert_eq!(cache.len(), 2);
        cache.resize(NonZeroUsize::new(1).unwrap());
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_split_enum_list() {
        let seps = [',', ';', '|'];
        assert_eq!(
            split_enum_list("a, b;c | d", &seps),
            Some(vec!["a".into(), "b".into(), "c".into(), "d".into()])
        );
        assert_eq!(
            split_enum_list(r#"["a", 2]"#, &seps),
            Some(vec!["a".into(), "2".into()])
        );
        assert_eq!(split_enum_list("[\"a\",", &seps), None);
        assert_eq!(split_enum_list("[true]", &seps), None);
        assert_eq!(split_enum_list("  ", &seps), Some(vec![]));
    }
}
