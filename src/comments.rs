//! Comment extraction from protobuf `SourceCodeInfo`.
//!
//! `protoc --include_source_info` attaches leading/trailing comment text to
//! every node in the descriptor tree, keyed by a path of field numbers. This
//! is the mechanism that recovers both ordinary doc comments and the
//! `// <<< key = "value" >>>` option-comment annotations, since neither the
//! compiler nor `protoc` parses that special syntax itself — it's just text
//! living in a regular `//` comment.

use std::collections::HashMap;

use crate::descriptor::{FileDescriptorProto, Location};
use crate::names::clean_doc;
use crate::Error;

/// Field numbers from `google/protobuf/descriptor.proto`, used to build
/// paths into the descriptor tree that `SourceCodeInfo.location` keys on.
mod field_numbers {
    /// `FileDescriptorProto.message_type`
    pub const MESSAGE_TYPE: i32 = 4;
    /// `FileDescriptorProto.enum_type`
    pub const ENUM_TYPE: i32 = 5;
    /// `DescriptorProto.field`
    pub const FIELD: i32 = 2;
    /// `DescriptorProto.nested_type`
    pub const NESTED_TYPE: i32 = 3;
    /// `DescriptorProto.enum_type` (nested)
    pub const NESTED_ENUM_TYPE: i32 = 4;
    /// `DescriptorProto.oneof_decl`
    pub const ONEOF_DECL: i32 = 8;
    /// `EnumDescriptorProto.value`
    pub const ENUM_VALUE: i32 = 2;
}

/// A path to a location in the protobuf descriptor tree.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DescriptorPath(Vec<i32>);

impl DescriptorPath {
    /// Path to a top-level message.
    pub fn message(index: usize) -> Self {
        Self(vec![field_numbers::MESSAGE_TYPE, index as i32])
    }

    /// Path to a top-level enum.
    pub fn top_level_enum(index: usize) -> Self {
        Self(vec![field_numbers::ENUM_TYPE, index as i32])
    }

    /// Extend this path to a field within a message.
    pub fn field(&self, index: usize) -> Self {
        let mut path = self.0.clone();
        path.push(field_numbers::FIELD);
        path.push(index as i32);
        Self(path)
    }

    /// Extend this path to a nested message.
    pub fn nested_message(&self, index: usize) -> Self {
        let mut path = self.0.clone();
        path.push(field_numbers::NESTED_TYPE);
        path.push(index as i32);
        Self(path)
    }

    /// Extend this path to a nested enum.
    pub fn nested_enum(&self, index: usize) -> Self {
        let mut path = self.0.clone();
        path.push(field_numbers::NESTED_ENUM_TYPE);
        path.push(index as i32);
        Self(path)
    }

    /// Extend this path to a oneof declaration.
    pub fn oneof(&self, index: usize) -> Self {
        let mut path = self.0.clone();
        path.push(field_numbers::ONEOF_DECL);
        path.push(index as i32);
        Self(path)
    }

    /// Extend this path to an enum value.
    pub fn enum_value(&self, index: usize) -> Self {
        let mut path = self.0.clone();
        path.push(field_numbers::ENUM_VALUE);
        path.push(index as i32);
        Self(path)
    }

    /// Dotted rendering of the raw field-number path, used to attribute an
    /// `invalid-option` error to a location before any name is known for it
    /// (comment parsing happens before the scan that would give us one).
    pub fn as_attribution(&self) -> String {
        self.0.iter().map(i32::to_string).collect::<Vec<_>>().join(".")
    }
}

impl From<Vec<i32>> for DescriptorPath {
    fn from(path: Vec<i32>) -> Self {
        Self(path)
    }
}

/// Raw (unparsed) comment text, indexed by descriptor path, plus the parsed
/// option-comments found among them.
#[derive(Debug, Default)]
pub struct CommentMap {
    raw: HashMap<DescriptorPath, String>,
    options: HashMap<DescriptorPath, Vec<OptionComment>>,
}

/// A recognized `// <<< name = "value" >>>` annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionComment {
    pub name: String,
    pub value: String,
}

/// The five option-comment names the compiler recognizes (§6.1).
pub const RECOGNIZED_OPTION_NAMES: &[&str] = &[
    "pbj.java_package",
    "pbj.message_java_package",
    "pbj.enum_java_package",
    "pbj.service_java_package",
    "pbj.comparable",
];

impl CommentMap {
    /// Build a `CommentMap` from a `FileDescriptorProto`'s `SourceCodeInfo`.
    ///
    /// Fatal on a `<<< name = "value" >>>`-shaped annotation that doesn't
    /// parse cleanly or names something outside [`RECOGNIZED_OPTION_NAMES`]
    /// (§7 `invalid-option`). `file` is used purely for error attribution.
    pub fn from_file(file: &FileDescriptorProto, file_path: &str) -> Result<Self, Error> {
        let mut raw = HashMap::new();
        let mut options = HashMap::new();

        if let Some(source_code_info) = &file.source_code_info {
            for location in &source_code_info.location {
                let path = DescriptorPath::from(location.path.clone());
                if let Some(comment) = Self::extract_comment(location) {
                    let parsed = parse_option_comments(&comment).map_err(|reason| Error::InvalidOption {
                        file: file_path.to_string(),
                        element: path.as_attribution(),
                        reason,
                    })?;
                    if !parsed.is_empty() {
                        options.insert(path.clone(), parsed);
                    }
                    raw.insert(path, comment);
                }
            }
        }

        Ok(Self { raw, options })
    }

    /// Raw extracted comment text for a path (pre-`clean_doc`), if any.
    pub fn get(&self, path: &DescriptorPath) -> Option<&str> {
        self.raw.get(path).map(|s| s.as_str())
    }

    /// Doc text for a path, run through [`clean_doc`]'s HTML-safety pass.
    pub fn doc(&self, path: &DescriptorPath) -> Option<String> {
        self.get(path).map(clean_doc)
    }

    /// Recognized option-comments attached at a path, in source order.
    pub fn options(&self, path: &DescriptorPath) -> &[OptionComment] {
        self.options.get(path).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Convenience: the value of the first option-comment named `name` at
    /// `path`, if present.
    pub fn option_value(&self, path: &DescriptorPath, name: &str) -> Option<&str> {
        self.options(path).iter().find(|o| o.name == name).map(|o| o.value.as_str())
    }

    fn extract_comment(location: &Location) -> Option<String> {
        let mut parts = Vec::new();

        for detached in &location.leading_detached_comments {
            let cleaned = clean_comment(detached);
            if !cleaned.is_empty() {
                parts.push(cleaned);
            }
        }

        if let Some(leading) = &location.leading_comments {
            let cleaned = clean_comment(leading);
            if !cleaned.is_empty() {
                parts.push(cleaned);
            }
        }

        if let Some(trailing) = &location.trailing_comments {
            let cleaned = clean_comment(trailing);
            if !cleaned.is_empty() {
                parts.push(cleaned);
            }
        }

        if parts.is_empty() {
            None
        } else {
            Some(parts.join("\n\n"))
        }
    }
}

/// Strip protoc's per-line comment leader (`//` leaves a leading space;
/// block comments leave `*`), without the HTML-safety pass (that's
/// `clean_doc`'s job, applied only when producing actual doc text).
fn clean_comment(comment: &str) -> String {
    comment
        .lines()
        .map(|line| {
            let trimmed = line.trim();
            trimmed.trim_start_matches('*').trim().to_string()
        })
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Recognize `// <<< name = "value" >>>` lines. `protoc` strips the leading
/// `//`, so by the time we see this text it reads `<<< name = "value" >>>`.
///
/// A line framed with `<<< ... >>>` is a deliberate option-comment marker,
/// not prose, so any such line that fails to parse as `name = "value"`, or
/// whose name isn't in [`RECOGNIZED_OPTION_NAMES`], is `invalid-option`
/// (§7) rather than silently skipped. Ordinary doc-comment lines that don't
/// use the `<<< >>>` frame at all are left alone.
fn parse_option_comments(comment: &str) -> Result<Vec<OptionComment>, String> {
    let mut out = Vec::new();
    for line in comment.lines() {
        let line = line.trim();
        let Some(inner) = line.strip_prefix("<<<").and_then(|s| s.strip_suffix(">>>")) else {
            continue;
        };
        let inner = inner.trim();
        let Some((name, rest)) = inner.split_once('=') else {
            return Err(format!("malformed option comment \"{line}\" (expected `name = \"value\"`)"));
        };
        let name = name.trim();
        let rest = rest.trim();
        let Some(value) = rest.strip_prefix('"').and_then(|s| s.strip_suffix('"')) else {
            return Err(format!("malformed option comment \"{line}\" (value must be a quoted string)"));
        };
        if !RECOGNIZED_OPTION_NAMES.contains(&name) {
            return Err(format!("unrecognized option \"{name}\" (expected one of {RECOGNIZED_OPTION_NAMES:?})"));
        }
        out.push(OptionComment { name: name.to_string(), value: value.to_string() });
    }
    Ok(out)
}
