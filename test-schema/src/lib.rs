//! # Test Schema
//!
//! **INTERNAL USE ONLY**: This crate exists solely to provide protobuf schemas for
//! testing the `protoclosure` codecs and CLI. It is not intended for production use.
//!
//! The descriptors mirror closure-library's `TestAllTypes` test message. They are
//! assembled from `prost-types` descriptor protos so that no `protoc` is needed at
//! build time.

use prost::Message;
use prost_reflect::{DescriptorPool, MessageDescriptor, ReflectMessage};
use prost_types::{
    DescriptorProto, EnumDescriptorProto, EnumValueDescriptorProto, FieldDescriptorProto,
    FieldOptions, FileDescriptorProto, FileDescriptorSet, MessageOptions,
    field_descriptor_proto::{Label, Type},
    field_options::JsType,
};
use std::sync::OnceLock;

pub const TEST_ALL_TYPES: &str = "protoclosure.test.TestAllTypes";
pub const NESTED_MESSAGE: &str = "protoclosure.test.TestAllTypes.NestedMessage";
pub const SAMPLE: &str = "protoclosure.test.Sample";
pub const ENVELOPE: &str = "protoclosure.test.Envelope";
pub const WITH_MAP: &str = "protoclosure.test.WithMap";
pub const TEST_PACKAGE_TYPES: &str = "someprotopackage.TestPackageTypes";

/// Returns the shared pool holding every test message.
pub fn descriptor_pool() -> DescriptorPool {
    static POOL: OnceLock<DescriptorPool> = OnceLock::new();
    POOL.get_or_init(|| {
        DescriptorPool::from_file_descriptor_set(file_descriptor_set())
            .expect("test schema must be valid")
    })
    .clone()
}

/// Looks up a message of the test pool by its fully qualified name.
pub fn message(full_name: &str) -> MessageDescriptor {
    descriptor_pool()
        .get_message_by_name(full_name)
        .unwrap_or_else(|| panic!("unknown test message '{full_name}'"))
}

/// The encoded `FileDescriptorSet`, as the CLI reads it from disk.
pub fn file_descriptor_set_bytes() -> Vec<u8> {
    file_descriptor_set().encode_to_vec()
}

pub fn file_descriptor_set() -> FileDescriptorSet {
    FileDescriptorSet {
        file: vec![test_file(), package_file()],
    }
}

/// A hand-written prost message matching `protoclosure.test.Sample`, used to
/// exercise the typed (`ReflectMessage`) entry points.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Sample {
    #[prost(int32, optional, tag = "1")]
    pub field1: Option<i32>,
    #[prost(int64, repeated, packed = "false", tag = "2")]
    pub field2: Vec<i64>,
    #[prost(string, repeated, tag = "3")]
    pub field3: Vec<String>,
}

impl ReflectMessage for Sample {
    fn descriptor(&self) -> MessageDescriptor {
        message(SAMPLE)
    }
}

fn scalar(name: &str, number: i32, label: Label, ty: Type) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some(name.to_string()),
        number: Some(number),
        label: Some(label as i32),
        r#type: Some(ty as i32),
        ..Default::default()
    }
}

fn typed(name: &str, number: i32, label: Label, ty: Type, type_name: &str) -> FieldDescriptorProto {
    FieldDescriptorProto {
        type_name: Some(type_name.to_string()),
        ..scalar(name, number, label, ty)
    }
}

fn with_jstype(mut field: FieldDescriptorProto, jstype: JsType) -> FieldDescriptorProto {
    field.options = Some(FieldOptions {
        jstype: Some(jstype as i32),
        ..Default::default()
    });
    field
}

fn simple_message(name: &str, field: Vec<FieldDescriptorProto>) -> DescriptorProto {
    DescriptorProto {
        name: Some(name.to_string()),
        field,
        ..Default::default()
    }
}

const SCALAR_TYPES: [(&str, Type); 15] = [
    ("int32", Type::Int32),
    ("int64", Type::Int64),
    ("uint32", Type::Uint32),
    ("uint64", Type::Uint64),
    ("sint32", Type::Sint32),
    ("sint64", Type::Sint64),
    ("fixed32", Type::Fixed32),
    ("fixed64", Type::Fixed64),
    ("sfixed32", Type::Sfixed32),
    ("sfixed64", Type::Sfixed64),
    ("float", Type::Float),
    ("double", Type::Double),
    ("bool", Type::Bool),
    ("string", Type::String),
    ("bytes", Type::Bytes),
];

fn test_all_types() -> DescriptorProto {
    use Label::{Optional, Repeated};

    let nested_message = ".protoclosure.test.TestAllTypes.NestedMessage";
    let nested_enum = ".protoclosure.test.TestAllTypes.NestedEnum";

    let mut field = Vec::new();
    // optional_* at tags 1..=15, repeated_* at tags 31..=45
    for (offset, (suffix, ty)) in (0..).zip(SCALAR_TYPES) {
        field.push(scalar(&format!("optional_{suffix}"), 1 + offset, Optional, ty));
    }
    field.push(typed(
        "optionalgroup",
        16,
        Optional,
        Type::Group,
        ".protoclosure.test.TestAllTypes.OptionalGroup",
    ));
    field.push(typed("optional_nested_message", 18, Optional, Type::Message, nested_message));
    field.push(typed("optional_nested_enum", 21, Optional, Type::Enum, nested_enum));
    for (offset, (suffix, ty)) in (0..).zip(SCALAR_TYPES) {
        field.push(scalar(&format!("repeated_{suffix}"), 31 + offset, Repeated, ty));
    }
    field.push(typed(
        "repeatedgroup",
        46,
        Repeated,
        Type::Group,
        ".protoclosure.test.TestAllTypes.RepeatedGroup",
    ));
    field.push(typed("repeated_nested_message", 48, Repeated, Type::Message, nested_message));
    field.push(typed("repeated_nested_enum", 49, Repeated, Type::Enum, nested_enum));
    field.push(with_jstype(
        scalar("optional_int64_number", 50, Optional, Type::Int64),
        JsType::JsNumber,
    ));
    field.push(with_jstype(
        scalar("optional_int64_string", 51, Optional, Type::Int64),
        JsType::JsString,
    ));

    DescriptorProto {
        name: Some("TestAllTypes".to_string()),
        field,
        nested_type: vec![
            simple_message("NestedMessage", vec![scalar("b", 1, Optional, Type::Int32)]),
            simple_message("OptionalGroup", vec![scalar("a", 17, Optional, Type::Int32)]),
            simple_message("RepeatedGroup", vec![scalar("a", 47, Optional, Type::Int32)]),
        ],
        enum_type: vec![EnumDescriptorProto {
            name: Some("NestedEnum".to_string()),
            value: [("FOO", 0), ("BAR", 1), ("BAZ", 2)]
                .into_iter()
                .map(|(name, number)| EnumValueDescriptorProto {
                    name: Some(name.to_string()),
                    number: Some(number),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }],
        ..Default::default()
    }
}

fn test_file() -> FileDescriptorProto {
    use Label::{Optional, Repeated};

    let sample = simple_message(
        "Sample",
        vec![
            scalar("field1", 1, Optional, Type::Int32),
            scalar("field2", 2, Repeated, Type::Int64),
            scalar("field3", 3, Repeated, Type::String),
        ],
    );

    let envelope = simple_message(
        "Envelope",
        vec![
            scalar("field1", 1, Optional, Type::Int32),
            scalar("field2", 2, Repeated, Type::String),
            typed("field3", 3, Optional, Type::Message, ".protoclosure.test.Sample"),
            typed("field4", 4, Repeated, Type::Message, ".protoclosure.test.Sample"),
            scalar("count_number", 5, Optional, Type::Uint64),
        ],
    );

    let with_map = DescriptorProto {
        name: Some("WithMap".to_string()),
        field: vec![
            scalar("label", 1, Optional, Type::String),
            typed(
                "counts",
                2,
                Repeated,
                Type::Message,
                ".protoclosure.test.WithMap.CountsEntry",
            ),
        ],
        nested_type: vec![DescriptorProto {
            name: Some("CountsEntry".to_string()),
            field: vec![
                scalar("key", 1, Optional, Type::String),
                scalar("value", 2, Optional, Type::Int32),
            ],
            options: Some(MessageOptions {
                map_entry: Some(true),
                ..Default::default()
            }),
            ..Default::default()
        }],
        ..Default::default()
    };

    FileDescriptorProto {
        name: Some("protoclosure/test.proto".to_string()),
        package: Some("protoclosure.test".to_string()),
        message_type: vec![test_all_types(), sample, envelope, with_map],
        syntax: Some("proto2".to_string()),
        ..Default::default()
    }
}

fn package_file() -> FileDescriptorProto {
    use Label::{Optional, Repeated};

    let all_types = ".protoclosure.test.TestAllTypes";

    FileDescriptorProto {
        name: Some("protoclosure/package_test.proto".to_string()),
        package: Some("someprotopackage".to_string()),
        dependency: vec!["protoclosure/test.proto".to_string()],
        message_type: vec![simple_message(
            "TestPackageTypes",
            vec![
                scalar("optional_int32", 1, Optional, Type::Int32),
                typed("other_all", 2, Optional, Type::Message, all_types),
                typed("rep_other_all", 3, Repeated, Type::Message, all_types),
            ],
        )],
        syntax: Some("proto2".to_string()),
        ..Default::default()
    }
}
