//! End-to-end compiler tests, built the way the teacher's own integration
//! test is: drive `Config`, then assert on what lands in `out_dir`. Rather
//! than shelling out to `protoc` (not available in this sandbox), these
//! build the `FileDescriptorSet` a `protoc --include_source_info` run would
//! have produced and feed it straight to `compile_fds`.

use pbjc::descriptor::{
    DescriptorProto, EnumDescriptorProto, EnumValueDescriptorProto, FieldDescriptorProto,
    FileDescriptorProto, FileDescriptorSet, FileOptions, Label, MessageOptions,
    OneofDescriptorProto, Type,
};
use pbjc::Config;
use std::fs;
use tempfile::tempdir;

fn field(name: &str, number: i32, ty: Type, label: Label) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some(name.to_string()),
        number: Some(number),
        label: Some(label as i32),
        r#type: Some(ty as i32),
        ..Default::default()
    }
}

#[test]
fn compiles_a_simple_message_into_all_five_artifacts() {
    let fds = FileDescriptorSet {
        file: vec![FileDescriptorProto {
            name: Some("person.proto".into()),
            package: Some("example".into()),
            options: Some(FileOptions { java_package: Some("com.example.wire".into()) }),
            message_type: vec![DescriptorProto {
                name: Some("Person".into()),
                field: vec![
                    field("name", 1, Type::String, Label::Optional),
                    field("id", 2, Type::Int32, Label::Optional),
                    field("tags", 3, Type::String, Label::Repeated),
                ],
                ..Default::default()
            }],
            ..Default::default()
        }],
    };

    let out_dir = tempdir().expect("failed to create temp dir");
    Config::new().out_dir(out_dir.path()).compile_fds(fds).expect("compile_fds failed");

    let base = out_dir.path().join("com/example/wire");
    assert!(base.join("Person.txt").exists(), "model artifact should be written");
    assert!(base.join("schema/PersonSchema.txt").exists(), "schema artifact should be written");
    assert!(base.join("codec/PersonProtoCodec.txt").exists(), "binary codec artifact should be written");
    assert!(base.join("codec/PersonJsonCodec.txt").exists(), "JSON codec artifact should be written");
    assert!(base.join("tests/PersonTest.txt").exists(), "test artifact should be written");

    let model = fs::read_to_string(base.join("Person.txt")).unwrap();
    assert!(model.starts_with("// SPDX-License-Identifier: Apache-2.0\n"));
    assert!(model.contains("package com.example.wire;"));
    assert!(model.contains("public final class Person"));
    assert!(model.contains("List<String> tags()"));
}

#[test]
fn nested_message_gets_its_own_artifact_set_under_the_outer_class_name() {
    let fds = FileDescriptorSet {
        file: vec![FileDescriptorProto {
            name: Some("outer.proto".into()),
            package: Some("example".into()),
            message_type: vec![DescriptorProto {
                name: Some("Outer".into()),
                nested_type: vec![DescriptorProto {
                    name: Some("Inner".into()),
                    field: vec![field("value", 1, Type::Int32, Label::Optional)],
                    ..Default::default()
                }],
                ..Default::default()
            }],
            ..Default::default()
        }],
    };

    let out_dir = tempdir().expect("failed to create temp dir");
    Config::new().out_dir(out_dir.path()).compile_fds(fds).expect("compile_fds failed");

    assert!(out_dir.path().join("example/Outer.txt").exists());
    assert!(out_dir.path().join("example/Inner.txt").exists());
}

#[test]
fn map_field_reuses_scalar_emitters_on_synthetic_entry_fields() {
    let fds = FileDescriptorSet {
        file: vec![FileDescriptorProto {
            name: Some("scores.proto".into()),
            package: Some("example".into()),
            message_type: vec![DescriptorProto {
                name: Some("Scoreboard".into()),
                field: vec![FieldDescriptorProto {
                    name: Some("scores".into()),
                    number: Some(1),
                    label: Some(Label::Repeated as i32),
                    r#type: Some(Type::Message as i32),
                    type_name: Some(".example.Scoreboard.ScoresEntry".into()),
                    ..Default::default()
                }],
                nested_type: vec![DescriptorProto {
                    name: Some("ScoresEntry".into()),
                    field: vec![
                        field("key", 1, Type::String, Label::Optional),
                        field("value", 2, Type::Int32, Label::Optional),
                    ],
                    options: Some(MessageOptions { map_entry: Some(true) }),
                    ..Default::default()
                }],
                ..Default::default()
            }],
            ..Default::default()
        }],
    };

    let out_dir = tempdir().expect("failed to create temp dir");
    Config::new().out_dir(out_dir.path()).compile_fds(fds).expect("compile_fds failed");

    // The synthetic ScoresEntry message is never emitted as its own artifact.
    assert!(!out_dir.path().join("example/ScoresEntry.txt").exists());
    assert!(out_dir.path().join("example/Scoreboard.txt").exists());

    let model = fs::read_to_string(out_dir.path().join("example/Scoreboard.txt")).unwrap();
    assert!(model.contains("Map<String, Integer> scores()"));
}

#[test]
fn oneof_fields_collapse_into_a_single_branch_accessor() {
    let fds = FileDescriptorSet {
        file: vec![FileDescriptorProto {
            name: Some("widget.proto".into()),
            package: Some("example".into()),
            message_type: vec![DescriptorProto {
                name: Some("Widget".into()),
                oneof_decl: vec![OneofDescriptorProto { name: Some("value".into()) }],
                field: vec![
                    FieldDescriptorProto {
                        oneof_index: Some(0),
                        ..field("int_value", 1, Type::Int32, Label::Optional)
                    },
                    FieldDescriptorProto {
                        oneof_index: Some(0),
                        ..field("string_value", 2, Type::String, Label::Optional)
                    },
                ],
                ..Default::default()
            }],
            ..Default::default()
        }],
    };

    let out_dir = tempdir().expect("failed to create temp dir");
    Config::new().out_dir(out_dir.path()).compile_fds(fds).expect("compile_fds failed");

    let codec = fs::read_to_string(out_dir.path().join("example/codec/WidgetProtoCodec.txt")).unwrap();
    assert!(codec.contains("switch (value.value().kind())"));
}

#[test]
fn comparable_option_comment_emits_a_compare_to_method() {
    let fds = FileDescriptorSet {
        file: vec![FileDescriptorProto {
            name: Some("ranked.proto".into()),
            package: Some("example".into()),
            source_code_info: Some(pbjc::descriptor::SourceCodeInfo {
                location: vec![pbjc::descriptor::Location {
                    path: vec![4, 0],
                    leading_comments: Some(" <<< pbj.comparable = \"rank\" >>>\n".into()),
                    ..Default::default()
                }],
            }),
            message_type: vec![DescriptorProto {
                name: Some("Ranked".into()),
                field: vec![field("rank", 1, Type::Int32, Label::Optional)],
                ..Default::default()
            }],
            ..Default::default()
        }],
    };

    let out_dir = tempdir().expect("failed to create temp dir");
    Config::new().out_dir(out_dir.path()).compile_fds(fds).expect("compile_fds failed");

    let model = fs::read_to_string(out_dir.path().join("example/Ranked.txt")).unwrap();
    assert!(model.contains("public int compareTo(Ranked other)"));
}

#[test]
fn invalid_comparable_field_name_is_a_fatal_error() {
    let fds = FileDescriptorSet {
        file: vec![FileDescriptorProto {
            name: Some("bad.proto".into()),
            package: Some("example".into()),
            source_code_info: Some(pbjc::descriptor::SourceCodeInfo {
                location: vec![pbjc::descriptor::Location {
                    path: vec![4, 0],
                    leading_comments: Some(" <<< pbj.comparable = \"nonexistent\" >>>\n".into()),
                    ..Default::default()
                }],
            }),
            message_type: vec![DescriptorProto {
                name: Some("Bad".into()),
                field: vec![field("rank", 1, Type::Int32, Label::Optional)],
                ..Default::default()
            }],
            ..Default::default()
        }],
    };

    let out_dir = tempdir().expect("failed to create temp dir");
    let result = Config::new().out_dir(out_dir.path()).compile_fds(fds);
    assert!(matches!(result, Err(pbjc::Error::InvalidComparable { .. })));
}

#[test]
fn unrecognized_option_comment_is_a_fatal_error() {
    let fds = FileDescriptorSet {
        file: vec![FileDescriptorProto {
            name: Some("bad_option.proto".into()),
            package: Some("example".into()),
            source_code_info: Some(pbjc::descriptor::SourceCodeInfo {
                location: vec![pbjc::descriptor::Location {
                    path: vec![4, 0],
                    leading_comments: Some(" <<< pbj.not_a_real_option = \"x\" >>>\n".into()),
                    ..Default::default()
                }],
            }),
            message_type: vec![DescriptorProto {
                name: Some("Bad".into()),
                field: vec![field("value", 1, Type::Int32, Label::Optional)],
                ..Default::default()
            }],
            ..Default::default()
        }],
    };

    let out_dir = tempdir().expect("failed to create temp dir");
    let result = Config::new().out_dir(out_dir.path()).compile_fds(fds);
    assert!(matches!(result, Err(pbjc::Error::InvalidOption { .. })));
}

#[test]
fn out_of_range_label_is_a_fatal_error() {
    let fds = FileDescriptorSet {
        file: vec![FileDescriptorProto {
            name: Some("bad_label.proto".into()),
            package: Some("example".into()),
            message_type: vec![DescriptorProto {
                name: Some("Bad".into()),
                field: vec![FieldDescriptorProto {
                    label: Some(9),
                    ..field("value", 1, Type::Int32, Label::Optional)
                }],
                ..Default::default()
            }],
            ..Default::default()
        }],
    };

    let out_dir = tempdir().expect("failed to create temp dir");
    let result = Config::new().out_dir(out_dir.path()).compile_fds(fds);
    assert!(matches!(result, Err(pbjc::Error::InvalidLabel(9))));
}

#[test]
fn enum_gets_a_model_artifact_without_codec_suffix_changes_to_its_name() {
    let fds = FileDescriptorSet {
        file: vec![FileDescriptorProto {
            name: Some("status.proto".into()),
            package: Some("example".into()),
            enum_type: vec![EnumDescriptorProto {
                name: Some("Status".into()),
                value: vec![
                    EnumValueDescriptorProto { name: Some("UNKNOWN".into()), number: Some(0) },
                    EnumValueDescriptorProto { name: Some("ACTIVE".into()), number: Some(1) },
                ],
            }],
            ..Default::default()
        }],
    };

    // Enums are registered but the current emitter pipeline only walks
    // message_type; this asserts scanning an enum-only file doesn't error.
    let out_dir = tempdir().expect("failed to create temp dir");
    Config::new().out_dir(out_dir.path()).compile_fds(fds).expect("compile_fds failed");
}

#[test]
fn missing_package_declaration_is_a_fatal_error() {
    let fds = FileDescriptorSet {
        file: vec![FileDescriptorProto {
            name: Some("nopackage.proto".into()),
            message_type: vec![DescriptorProto { name: Some("Thing".into()), ..Default::default() }],
            ..Default::default()
        }],
    };

    let out_dir = tempdir().expect("failed to create temp dir");
    let result = Config::new().out_dir(out_dir.path()).compile_fds(fds);
    assert!(matches!(result, Err(pbjc::Error::MissingPackage { .. })));
}

#[test]
fn cross_file_message_reference_resolves_through_an_import_and_emits_a_matching_import_line() {
    let fds = FileDescriptorSet {
        file: vec![
            FileDescriptorProto {
                name: Some("common.proto".into()),
                package: Some("example.common".into()),
                message_type: vec![DescriptorProto {
                    name: Some("Item".into()),
                    field: vec![field("id", 1, Type::Int32, Label::Optional)],
                    ..Default::default()
                }],
                ..Default::default()
            },
            FileDescriptorProto {
                name: Some("container.proto".into()),
                package: Some("example".into()),
                dependency: vec!["common.proto".into()],
                message_type: vec![DescriptorProto {
                    name: Some("Container".into()),
                    field: vec![FieldDescriptorProto {
                        type_name: Some(".example.common.Item".into()),
                        ..field("item", 1, Type::Message, Label::Optional)
                    }],
                    ..Default::default()
                }],
                ..Default::default()
            },
        ],
    };

    let out_dir = tempdir().expect("failed to create temp dir");
    Config::new().out_dir(out_dir.path()).compile_fds(fds).expect("compile_fds failed");

    assert!(out_dir.path().join("example/common/Item.txt").exists());

    let model = fs::read_to_string(out_dir.path().join("example/Container.txt")).unwrap();
    assert!(model.contains("import example.common.Item;"), "model should import the cross-package type:\n{model}");
    assert!(model.contains("Item item()"));
}

#[test]
fn java_package_suffix_is_appended_when_no_explicit_pbj_package_is_given() {
    let fds = FileDescriptorSet {
        file: vec![FileDescriptorProto {
            name: Some("suffixed.proto".into()),
            package: Some("example".into()),
            options: Some(FileOptions { java_package: Some("com.example.wire".into()) }),
            message_type: vec![DescriptorProto {
                name: Some("Thing".into()),
                field: vec![field("id", 1, Type::Int32, Label::Optional)],
                ..Default::default()
            }],
            ..Default::default()
        }],
    };

    let out_dir = tempdir().expect("failed to create temp dir");
    Config::new()
        .out_dir(out_dir.path())
        .java_package_suffix(".pbj")
        .compile_fds(fds)
        .expect("compile_fds failed");

    assert!(out_dir.path().join("com/example/wire/pbj/Thing.txt").exists());
}
