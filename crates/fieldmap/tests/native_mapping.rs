// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Test readability over pedantic
#![allow(clippy::unreadable_literal)] // Large test constants
#![allow(clippy::too_many_lines)] // Test code

//! Native struct mapping through `#[derive(Mappable)]`.
//!
//! Covers identity mapping, case-insensitive matching, custom overrides,
//! defaults for unmatched fields, nested objects and collections.

use fieldmap::{MapError, Mappable, MappableEnum, Mapper};
use std::time::Duration;

#[derive(Mappable, Default, Debug, Clone, PartialEq)]
struct Employee {
    id: i64,
    name: String,
    salary: i64,
}

#[derive(Mappable, Default, Debug, PartialEq)]
struct EmployeeDto {
    #[fieldmap(rename = "Id")]
    id: i32,
    #[fieldmap(rename = "Name")]
    name: String,
    #[fieldmap(rename = "Salary")]
    salary: i32,
}

#[test]
fn test_salary_clamps_to_i32_max() {
    let mapper = Mapper::new();
    let source = Employee {
        id: 1,
        name: "Ada".into(),
        salary: 250_000_000_000,
    };
    let dto: EmployeeDto = mapper.map(&source).unwrap();
    assert_eq!(
        dto,
        EmployeeDto {
            id: 1,
            name: "Ada".into(),
            salary: i32::MAX,
        }
    );
}

#[test]
fn test_identity_mapping() {
    let mapper = Mapper::new();
    let source = Employee {
        id: -4,
        name: "Grace".into(),
        salary: 10,
    };
    let copy: Employee = mapper.map(&source).unwrap();
    assert_eq!(copy, source);

    let compiled = mapper.compiled::<Employee, Employee>();
    assert!(compiled
        .entries()
        .iter()
        .all(|e| e.strategy.name() == "DirectAssign"));
}

#[derive(Mappable, Default)]
struct Account {
    #[fieldmap(rename = "USERNAME")]
    user: String,
    #[fieldmap(rename = "eMail")]
    email: String,
}

#[derive(Mappable, Default, Debug, PartialEq)]
struct AccountView {
    username: String,
    email: String,
    #[fieldmap(rename = "Display")]
    display: String,
    created: u32,
}

impl AccountView {
    fn preset() -> Self {
        Self {
            display: "unset".into(),
            created: 2024,
            ..Self::default()
        }
    }
}

#[test]
fn test_case_insensitive_and_unmatched_keep_defaults() {
    let mapper = Mapper::new();
    let source = Account {
        user: "ada".into(),
        email: "ada@example.com".into(),
    };
    let mut view = AccountView::preset();
    mapper.map_into(&source, &mut view).unwrap();
    assert_eq!(
        view,
        AccountView {
            username: "ada".into(),
            email: "ada@example.com".into(),
            display: "unset".into(),
            created: 2024,
        }
    );
}

#[test]
fn test_custom_mapping_overrides_matching() {
    let mapper = Mapper::new();
    mapper.register_field_mapping::<Account, AccountView, _, _>("display", |a| {
        format!("{} <{}>", a.user, a.email)
    });
    mapper.register_field_mapping::<Account, AccountView, _, _>("email", |a| a.email.to_uppercase());

    let view: AccountView = mapper
        .map(&Account {
            user: "bob".into(),
            email: "bob@example.com".into(),
        })
        .unwrap();
    assert_eq!(view.display, "bob <bob@example.com>");
    assert_eq!(view.email, "BOB@EXAMPLE.COM");
    assert_eq!(view.username, "bob");
}

#[test]
fn test_custom_mapping_error_propagates() {
    let mapper = Mapper::new();
    mapper.try_register_field_mapping::<Account, AccountView, String, _, _>("display", |a| {
        if a.user.is_empty() {
            Err("user required")
        } else {
            Ok(a.user.clone())
        }
    });
    let err = mapper.map::<Account, AccountView>(&Account::default()).unwrap_err();
    match err {
        MapError::FieldMapping { field, source } => {
            assert_eq!(field, "Display");
            assert_eq!(source.to_string(), "user required");
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_none_source() {
    let mapper = Mapper::new();
    let err = mapper.map_option::<Employee, EmployeeDto>(None).unwrap_err();
    assert!(matches!(err, MapError::MissingSource { .. }));

    let mut dto = EmployeeDto {
        id: 9,
        ..EmployeeDto::default()
    };
    mapper.map_into_option::<Employee, _>(None, &mut dto).unwrap();
    assert_eq!(dto.id, 9);
}

#[derive(Mappable, Default, Debug, Clone, PartialEq)]
struct Address {
    street: String,
    zip: u32,
}

#[derive(Mappable, Default, Debug, PartialEq)]
struct AddressDto {
    street: String,
    zip: String,
    country: String,
}

#[derive(Mappable, Default, Debug, Clone)]
struct Customer {
    name: String,
    address: Address,
    billing: Option<Address>,
    previous: Vec<Address>,
}

#[derive(Mappable, Default, Debug)]
struct CustomerDto {
    name: String,
    address: AddressDto,
    billing: Option<AddressDto>,
    previous: [AddressDto; 2],
}

#[test]
fn test_nested_objects_and_collections() {
    let mapper = Mapper::new();
    let home = Address {
        street: "1 Main St".into(),
        zip: 12345,
    };
    let source = Customer {
        name: "Ada".into(),
        address: home.clone(),
        billing: None,
        previous: vec![
            Address {
                street: "a".into(),
                zip: 1,
            },
            Address {
                street: "b".into(),
                zip: 2,
            },
            Address {
                street: "c".into(),
                zip: 3,
            },
        ],
    };

    let dto: CustomerDto = mapper.map(&source).unwrap();
    assert_eq!(dto.address.street, "1 Main St");
    assert_eq!(dto.address.zip, "12345");
    assert!(dto.billing.is_none());
    assert_eq!(dto.previous[0].zip, "1");
    assert_eq!(dto.previous[1].street, "b");

    let compiled = mapper.compiled::<Customer, CustomerDto>();
    assert_eq!(compiled.entry("address").unwrap().strategy.name(), "RecursiveObject");
    assert_eq!(compiled.entry("previous").unwrap().strategy.name(), "RecursiveCollection");
    assert!(!compiled.is_fast());
}

#[test]
fn test_nested_target_keeps_constructor_defaults() {
    #[derive(Mappable, Debug)]
    struct Shipping {
        address: AddressDto,
    }

    impl Default for Shipping {
        fn default() -> Self {
            Self {
                address: AddressDto {
                    country: "FR".into(),
                    ..AddressDto::default()
                },
            }
        }
    }

    #[derive(Mappable, Default)]
    struct Parcel {
        address: Address,
    }

    let mapper = Mapper::new();
    let out: Shipping = mapper
        .map(&Parcel {
            address: Address {
                street: "x".into(),
                zip: 7,
            },
        })
        .unwrap();
    assert_eq!(out.address.country, "FR");
    assert_eq!(out.address.zip, "7");
}

#[test]
fn test_growable_collection_keeps_length() {
    #[derive(Mappable, Default)]
    struct Book {
        stops: Vec<Address>,
    }

    #[derive(Mappable, Default)]
    struct BookDto {
        stops: Vec<AddressDto>,
    }

    let mapper = Mapper::new();
    let stops: Vec<Address> = (0..5)
        .map(|i| Address {
            street: format!("s{}", i),
            zip: i,
        })
        .collect();
    let dto: BookDto = mapper.map(&Book { stops }).unwrap();
    assert_eq!(dto.stops.len(), 5);
    assert_eq!(dto.stops[4].street, "s4");
}

#[derive(Mappable, Default, Debug, Clone)]
struct TreeNode {
    label: String,
    children: Vec<TreeNode>,
    parent_hint: Option<Box<TreeNode>>,
}

#[derive(Mappable, Default, Debug)]
struct TreeView {
    label: String,
    children: Vec<TreeView>,
    parent_hint: Option<Box<TreeView>>,
}

#[test]
fn test_self_referential_types() {
    let mapper = Mapper::new();
    let tree = TreeNode {
        label: "root".into(),
        children: vec![TreeNode {
            label: "leaf".into(),
            children: vec![],
            parent_hint: Some(Box::new(TreeNode {
                label: "root".into(),
                ..TreeNode::default()
            })),
        }],
        parent_hint: None,
    };
    let view: TreeView = mapper.map(&tree).unwrap();
    assert_eq!(view.label, "root");
    assert_eq!(view.children[0].label, "leaf");
    assert_eq!(
        view.children[0].parent_hint.as_ref().map(|p| p.label.as_str()),
        Some("root")
    );
}

#[derive(MappableEnum, Default, Debug, Clone, Copy, PartialEq)]
enum Level {
    #[default]
    Junior,
    Senior = 10,
    Principal,
}

#[derive(Mappable, Default)]
struct Staff {
    level: Level,
    tenure: Duration,
    #[fieldmap(write_only)]
    password: String,
    #[fieldmap(skip)]
    #[allow(dead_code)]
    scratch: u8,
}

#[derive(Mappable, Default, Debug)]
struct StaffDto {
    level: String,
    level_code: u8,
    tenure: u64,
    password: String,
    #[fieldmap(read_only)]
    computed: u32,
}

#[test]
fn test_attributes_and_enums() {
    let mapper = Mapper::new();
    mapper.register_field_mapping::<Staff, StaffDto, _, _>("level_code", |s| s.level as u8);

    let staff = Staff {
        level: Level::Principal,
        tenure: Duration::from_secs(3),
        password: "hunter2".into(),
        scratch: 1,
    };
    let dto: StaffDto = mapper.map(&staff).unwrap();
    assert_eq!(dto.level, "Principal");
    assert_eq!(dto.level_code, 11);
    assert_eq!(dto.tenure, 3000);
    assert_eq!(dto.password, "");

    let compiled = mapper.compiled::<Staff, StaffDto>();
    assert!(compiled.entry("computed").is_none());
    assert_eq!(compiled.entry("password").unwrap().strategy.name(), "Skip");
}

#[test]
fn test_enum_value_to_integer_field() {
    #[derive(Mappable, Default)]
    struct Row {
        level: Level,
    }

    #[derive(Mappable, Default)]
    struct RowDto {
        level: u8,
    }

    let mapper = Mapper::new();
    let dto: RowDto = mapper.map(&Row { level: Level::Principal }).unwrap();
    assert_eq!(dto.level, 11);
}

#[test]
fn test_map_all_uses_one_mapper() {
    let mapper = Mapper::new();
    let people: Vec<Employee> = (0..10)
        .map(|i| Employee {
            id: i,
            name: format!("p{}", i),
            salary: i * 1_000_000_000,
        })
        .collect();
    let dtos: Vec<EmployeeDto> = mapper.map_all(&people).unwrap();
    assert_eq!(dtos.len(), 10);
    assert_eq!(dtos[1].salary, 1_000_000_000);
    assert_eq!(dtos[9].salary, i32::MAX);
    assert_eq!(mapper.build_count(), 1);
}
