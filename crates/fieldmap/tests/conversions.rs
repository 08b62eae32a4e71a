// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Test readability over pedantic
#![allow(clippy::cast_possible_truncation)] // Expected values computed with casts
#![allow(clippy::float_cmp)] // Exact float comparisons on clamped bounds

//! Built-in conversions observed through native mappings.
//!
//! Numeric clamping, enum parsing, string-encoded enum collections,
//! collection reshaping, durations and UUIDs.

use fieldmap::{Mappable, MappableEnum, Mapper, SkipReason};
use std::time::Duration;
use uuid::Uuid;

#[derive(Mappable, Default)]
struct Wide {
    a: i64,
    b: i64,
    c: f64,
    d: u64,
}

#[derive(Mappable, Default, Debug, PartialEq)]
struct Narrow {
    a: i8,
    b: u16,
    c: f32,
    d: i32,
}

/// Reference clamp for an integer target.
fn clamp_i64(v: i64, min: i64, max: i64) -> i64 {
    v.max(min).min(max)
}

#[test]
fn test_numeric_clamp_bounds() {
    let mapper = Mapper::new();
    let low: Narrow = mapper
        .map(&Wide {
            a: i64::MIN,
            b: -1,
            c: -f64::MAX,
            d: 0,
        })
        .unwrap();
    assert_eq!(
        low,
        Narrow {
            a: i8::MIN,
            b: 0,
            c: f32::MIN,
            d: 0,
        }
    );

    let high: Narrow = mapper
        .map(&Wide {
            a: i64::MAX,
            b: i64::MAX,
            c: f64::MAX,
            d: u64::MAX,
        })
        .unwrap();
    assert_eq!(
        high,
        Narrow {
            a: i8::MAX,
            b: u16::MAX,
            c: f32::MAX,
            d: i32::MAX,
        }
    );
}

#[test]
fn test_numeric_clamp_random_values() {
    let mapper = Mapper::new();
    let mut rng = fastrand::Rng::with_seed(0x5eed);
    for _ in 0..500 {
        let source = Wide {
            a: rng.i64(..),
            b: rng.i64(-100_000..100_000),
            c: 0.0,
            d: rng.u64(..),
        };
        let out: Narrow = mapper.map(&source).unwrap();
        assert_eq!(
            i64::from(out.a),
            clamp_i64(source.a, i64::from(i8::MIN), i64::from(i8::MAX))
        );
        assert_eq!(i64::from(out.b), clamp_i64(source.b, 0, i64::from(u16::MAX)));
        assert_eq!(out.d, source.d.min(i32::MAX as u64) as i32);
    }
}

#[test]
fn test_float_to_int_truncates_and_nan_is_skipped() {
    #[derive(Mappable, Default)]
    struct Reading {
        value: f64,
    }

    #[derive(Mappable, Default)]
    struct Rounded {
        value: i32,
    }

    let mapper = Mapper::new();
    let out: Rounded = mapper.map(&Reading { value: -7.9 }).unwrap();
    assert_eq!(out.value, -7);

    let (out, diagnostics) = mapper
        .map_with_diagnostics::<Reading, Rounded>(&Reading { value: f64::NAN })
        .unwrap();
    assert_eq!(out.value, 0);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].field, "value");
    assert!(matches!(diagnostics[0].reason, SkipReason::Conversion(_)));
}

#[derive(MappableEnum, Default, Debug, Clone, Copy, PartialEq)]
enum Status {
    #[default]
    Active,
    OnHold,
    Retired = 9,
}

#[derive(MappableEnum, Default, Debug, Clone, Copy, PartialEq)]
enum LegacyStatus {
    #[default]
    Retired,
    Active,
}

#[derive(Mappable, Default)]
struct Raw {
    status: String,
    code: i32,
    legacy: LegacyStatus,
}

#[derive(Mappable, Default, Debug)]
struct Parsed {
    status: Status,
    code: Status,
    legacy: Status,
}

#[test]
fn test_enum_parsing_forms() {
    let mapper = Mapper::new();
    for (token, expected) in [
        ("OnHold", Status::OnHold),
        ("onhold", Status::OnHold),
        ("on-hold", Status::OnHold),
        ("ON_HOLD", Status::OnHold),
        (" retired ", Status::Retired),
        ("9", Status::Retired),
    ] {
        let out: Parsed = mapper
            .map(&Raw {
                status: token.into(),
                code: 9,
                legacy: LegacyStatus::Active,
            })
            .unwrap();
        assert_eq!(out.status, expected, "token {:?}", token);
        assert_eq!(out.code, Status::Retired);
        assert_eq!(out.legacy, Status::Active);
    }
}

#[test]
fn test_unknown_enum_token_keeps_default() {
    let mapper = Mapper::new();
    let (out, diagnostics) = mapper
        .map_with_diagnostics::<Raw, Parsed>(&Raw {
            status: "Vacation".into(),
            code: 3,
            legacy: LegacyStatus::Retired,
        })
        .unwrap();
    assert_eq!(out.status, Status::Active);
    assert_eq!(out.code, Status::Active);
    assert_eq!(out.legacy, Status::Retired);

    let skipped: Vec<_> = diagnostics.iter().map(|d| d.field.as_str()).collect();
    assert_eq!(skipped, vec!["status", "code"]);
    assert!(diagnostics
        .iter()
        .all(|d| matches!(d.reason, SkipReason::EnumParse(_))));
}

#[test]
fn test_enum_cache_only_keeps_successes() {
    let mapper = Mapper::new();
    let raw = Raw {
        status: "on-hold".into(),
        ..Raw::default()
    };
    let _: Parsed = mapper.map(&raw).unwrap();
    let after_first = mapper.enum_cache().len();
    assert!(after_first >= 1);

    let _: Parsed = mapper.map(&raw).unwrap();
    assert_eq!(mapper.enum_cache().len(), after_first);

    let _: Parsed = mapper
        .map(&Raw {
            status: "nope".into(),
            ..Raw::default()
        })
        .unwrap();
    assert_eq!(mapper.enum_cache().len(), after_first);
}

#[derive(Mappable, Default)]
struct Tagged {
    tags: String,
    slots: String,
}

#[derive(Mappable, Default, Debug)]
struct TaggedDto {
    tags: Vec<Status>,
    slots: [Status; 3],
}

#[test]
fn test_enum_collection_from_delimited_string() {
    let mapper = Mapper::new();
    let out: TaggedDto = mapper
        .map(&Tagged {
            tags: "active; on-hold |Retired,".into(),
            slots: "retired".into(),
        })
        .unwrap();
    assert_eq!(out.tags, vec![Status::Active, Status::OnHold, Status::Retired]);
    assert_eq!(out.slots, [Status::Retired, Status::Active, Status::Active]);
}

#[test]
fn test_enum_collection_from_json_array() {
    let mapper = Mapper::new();
    let out: TaggedDto = mapper
        .map(&Tagged {
            tags: r#"["OnHold", 9]"#.into(),
            slots: r#"["OnHold", "OnHold", "OnHold", "Retired"]"#.into(),
        })
        .unwrap();
    assert_eq!(out.tags, vec![Status::OnHold, Status::Retired]);
    assert_eq!(out.slots, [Status::OnHold; 3]);
}

#[test]
fn test_enum_collection_bad_token_skips_whole_field() {
    let mapper = Mapper::new();
    let (out, diagnostics) = mapper
        .map_with_diagnostics::<Tagged, TaggedDto>(&Tagged {
            tags: "active,bogus".into(),
            slots: "[not json".into(),
        })
        .unwrap();
    assert!(out.tags.is_empty());
    assert_eq!(out.slots, [Status::Active; 3]);
    assert_eq!(diagnostics.len(), 2);
    assert!(matches!(diagnostics[0].reason, SkipReason::EnumParse(_)));
    assert!(matches!(diagnostics[1].reason, SkipReason::Conversion(_)));
}

#[test]
fn test_enum_collection_to_text() {
    #[derive(Mappable, Default)]
    struct Flags {
        tags: Vec<Status>,
    }

    #[derive(Mappable, Default)]
    struct FlagsText {
        tags: String,
    }

    let mapper = Mapper::new();
    let out: FlagsText = mapper
        .map(&Flags {
            tags: vec![Status::OnHold, Status::Active],
        })
        .unwrap();
    assert_eq!(out.tags, "OnHold,Active");
}

#[test]
fn test_scalar_collection_reshape() {
    #[derive(Mappable, Default)]
    struct Samples {
        values: Vec<i64>,
        window: [u8; 2],
    }

    #[derive(Mappable, Default, Debug)]
    struct SampleDto {
        values: [i16; 4],
        window: Vec<String>,
    }

    let mapper = Mapper::new();
    let out: SampleDto = mapper
        .map(&Samples {
            values: vec![1, -70_000, 70_000],
            window: [7, 8],
        })
        .unwrap();
    assert_eq!(out.values, [1, i16::MIN, i16::MAX, 0]);
    assert_eq!(out.window, vec!["7".to_string(), "8".to_string()]);

    let compiled = mapper.compiled::<Samples, SampleDto>();
    assert!(compiled
        .entries()
        .iter()
        .all(|e| e.strategy.name() == "BuiltinConvert"));
}

#[derive(Mappable, Default)]
struct Job {
    timeout: Duration,
    retry_ms: u32,
    id: String,
    enabled: String,
    ratio: String,
}

#[derive(Mappable, Default, Debug)]
struct JobDto {
    timeout: i64,
    retry_ms: Duration,
    id: Uuid,
    enabled: bool,
    ratio: f64,
}

#[test]
fn test_duration_uuid_and_text_parsing() {
    let mapper = Mapper::new();
    let id = Uuid::new_v4();
    let out: JobDto = mapper
        .map(&Job {
            timeout: Duration::from_millis(2_500),
            retry_ms: 750,
            id: id.to_string(),
            enabled: "Yes".into(),
            ratio: " 0.25 ".into(),
        })
        .unwrap();
    assert_eq!(out.timeout, 2_500);
    assert_eq!(out.retry_ms, Duration::from_millis(750));
    assert_eq!(out.id, id);
    assert!(out.enabled);
    assert_eq!(out.ratio, 0.25);
}

#[test]
fn test_unparseable_text_keeps_default() {
    let mapper = Mapper::new();
    let (out, diagnostics) = mapper
        .map_with_diagnostics::<Job, JobDto>(&Job {
            id: "not-a-uuid".into(),
            enabled: "maybe".into(),
            ratio: "abc".into(),
            ..Job::default()
        })
        .unwrap();
    assert_eq!(out.id, Uuid::nil());
    assert!(!out.enabled);
    assert_eq!(out.ratio, 0.0);
    let fields: Vec<_> = diagnostics.iter().map(|d| d.field.as_str()).collect();
    assert_eq!(fields, vec!["id", "enabled", "ratio"]);
}
