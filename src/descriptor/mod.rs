//! Descriptor types for a protobuf `FileDescriptorSet`.
//!
//! These mirror `google/protobuf/descriptor.proto` closely enough to decode
//! what `protoc --descriptor_set_out` produces, but are implemented
//! independently rather than generated, since the compiler that decodes them
//! cannot depend on itself (or on any other protobuf runtime) to bootstrap.
//! This is the concrete "already-produced parse tree" the front-end in
//! [`crate::lookup`] consumes; producing it from `.proto` source text is an
//! external collaborator's job (see `protoc::invoke_protoc`).

mod decode;

pub use decode::decode_file_descriptor_set;

use crate::Error;

/// A collection of file descriptors.
#[derive(Debug, Clone, Default)]
pub struct FileDescriptorSet {
    pub file: Vec<FileDescriptorProto>,
}

/// Describes a complete `.proto` file.
#[derive(Debug, Clone, Default)]
pub struct FileDescriptorProto {
    pub name: Option<String>,
    pub package: Option<String>,
    pub dependency: Vec<String>,
    pub message_type: Vec<DescriptorProto>,
    pub enum_type: Vec<EnumDescriptorProto>,
    pub service: Vec<ServiceDescriptorProto>,
    pub options: Option<FileOptions>,
    pub source_code_info: Option<SourceCodeInfo>,
    pub syntax: Option<String>,
}

/// Describes a message type.
#[derive(Debug, Clone, Default)]
pub struct DescriptorProto {
    pub name: Option<String>,
    pub field: Vec<FieldDescriptorProto>,
    pub nested_type: Vec<DescriptorProto>,
    pub enum_type: Vec<EnumDescriptorProto>,
    pub oneof_decl: Vec<OneofDescriptorProto>,
    pub options: Option<MessageOptions>,
}

/// Describes a field within a message.
#[derive(Debug, Clone, Default)]
pub struct FieldDescriptorProto {
    pub name: Option<String>,
    pub number: Option<i32>,
    pub label: Option<i32>,
    pub r#type: Option<i32>,
    pub type_name: Option<String>,
    pub default_value: Option<String>,
    pub oneof_index: Option<i32>,
    pub json_name: Option<String>,
    pub proto3_optional: Option<bool>,
}

impl FieldDescriptorProto {
    /// The field's label, defaulting to `Optional` when absent (proto3
    /// descriptors generally omit it for singular fields). A present but
    /// out-of-range value (anything but 1-3) is `invalid-label`, fatal per
    /// §7's error taxonomy rather than silently treated as `Optional`.
    pub fn label(&self) -> Result<Label, Error> {
        match self.label {
            None => Ok(Label::Optional),
            Some(raw) => Label::from_i32(raw).ok_or(Error::InvalidLabel(raw)),
        }
    }

    pub fn field_type(&self) -> Option<Type> {
        self.r#type.and_then(Type::from_i32)
    }

    /// `true` for Google wrapper message fields (`google.protobuf.*Value`),
    /// which the field model maps to boxed primitives rather than imported
    /// message types. See spec §9 design notes.
    pub fn is_wrapper_type(&self) -> bool {
        matches!(
            self.type_name.as_deref().map(|n| n.trim_start_matches('.')),
            Some(
                "google.protobuf.StringValue"
                    | "google.protobuf.Int32Value"
                    | "google.protobuf.UInt32Value"
                    | "google.protobuf.Int64Value"
                    | "google.protobuf.UInt64Value"
                    | "google.protobuf.FloatValue"
                    | "google.protobuf.DoubleValue"
                    | "google.protobuf.BoolValue"
                    | "google.protobuf.BytesValue"
            )
        )
    }
}

/// Describes an enum type.
#[derive(Debug, Clone, Default)]
pub struct EnumDescriptorProto {
    pub name: Option<String>,
    pub value: Vec<EnumValueDescriptorProto>,
}

/// Describes an enum value.
#[derive(Debug, Clone, Default)]
pub struct EnumValueDescriptorProto {
    pub name: Option<String>,
    pub number: Option<i32>,
}

/// Describes a oneof.
#[derive(Debug, Clone, Default)]
pub struct OneofDescriptorProto {
    pub name: Option<String>,
}

/// Describes a service. The core only needs enough of this to register
/// service names in the symbol tables (§3.3); RPC wiring is out of scope.
#[derive(Debug, Clone, Default)]
pub struct ServiceDescriptorProto {
    pub name: Option<String>,
}

/// Options for a message type.
#[derive(Debug, Clone, Default)]
pub struct MessageOptions {
    /// Set for the synthetic entry-message of a `map<K, V>` field.
    pub map_entry: Option<bool>,
}

/// File-level options. Only the field the Lookup engine queries
/// (`java_package`, used as the "reference implementation" package per
/// §3.3) is modeled; everything else is irrelevant to code generation.
#[derive(Debug, Clone, Default)]
pub struct FileOptions {
    pub java_package: Option<String>,
}

/// Field type enumeration (`google.protobuf.FieldDescriptorProto.Type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum Type {
    Double = 1,
    Float = 2,
    Int64 = 3,
    Uint64 = 4,
    Int32 = 5,
    Fixed64 = 6,
    Fixed32 = 7,
    Bool = 8,
    String = 9,
    Group = 10,
    Message = 11,
    Bytes = 12,
    Uint32 = 13,
    Enum = 14,
    Sfixed32 = 15,
    Sfixed64 = 16,
    Sint32 = 17,
    Sint64 = 18,
}

impl Type {
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            1 => Some(Self::Double),
            2 => Some(Self::Float),
            3 => Some(Self::Int64),
            4 => Some(Self::Uint64),
            5 => Some(Self::Int32),
            6 => Some(Self::Fixed64),
            7 => Some(Self::Fixed32),
            8 => Some(Self::Bool),
            9 => Some(Self::String),
            10 => Some(Self::Group),
            11 => Some(Self::Message),
            12 => Some(Self::Bytes),
            13 => Some(Self::Uint32),
            14 => Some(Self::Enum),
            15 => Some(Self::Sfixed32),
            16 => Some(Self::Sfixed64),
            17 => Some(Self::Sint32),
            18 => Some(Self::Sint64),
            _ => None,
        }
    }
}

/// Field label enumeration (`google.protobuf.FieldDescriptorProto.Label`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum Label {
    Optional = 1,
    Required = 2,
    Repeated = 3,
}

impl Label {
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            1 => Some(Self::Optional),
            2 => Some(Self::Required),
            3 => Some(Self::Repeated),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_label_defaults_to_optional() {
        let field = FieldDescriptorProto { label: None, ..Default::default() };
        assert_eq!(field.label().unwrap(), Label::Optional);
    }

    #[test]
    fn out_of_range_label_is_invalid_label() {
        let field = FieldDescriptorProto { label: Some(9), ..Default::default() };
        assert!(matches!(field.label(), Err(Error::InvalidLabel(9))));
    }
}

/// Carries the leading/trailing comments `protoc --include_source_info`
/// attaches to every node in the descriptor tree, keyed by a path of field
/// numbers. This is how the "parse tree" in spec §6.1 surfaces the raw
/// `docComment`/`optionComment` text the Lookup engine and emitters need.
#[derive(Debug, Clone, Default)]
pub struct SourceCodeInfo {
    pub location: Vec<Location>,
}

/// A single comment location within a `SourceCodeInfo`.
#[derive(Debug, Clone, Default)]
pub struct Location {
    /// Field-number path from the enclosing `FileDescriptorProto` down to
    /// the commented node (e.g. `[4, 0, 2, 1]` = first top-level message's
    /// second field).
    pub path: Vec<i32>,
    pub leading_comments: Option<String>,
    pub trailing_comments: Option<String>,
    pub leading_detached_comments: Vec<String>,
}
