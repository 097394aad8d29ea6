//! Error types for the compiler.

use std::io;
use thiserror::Error as ThisError;

/// Errors that can occur while ingesting, resolving, or emitting a schema.
///
/// Every compiler-semantic variant carries a `file`/`element` attribution
/// string, per the rule that every error names `<file>:<element-name>`. All
/// variants are fatal: the compiler never produces partial output.
#[derive(Debug, ThisError)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("protoc not found. Set PROTOC env var or install protoc.")]
    ProtocNotFound,

    #[error("protoc failed: {0}")]
    ProtocFailed(String),

    #[error("failed to decode FileDescriptorSet: {0}")]
    DecodeError(String),

    #[error("out_dir not set; call Config::out_dir()")]
    MissingOutDir,

    #[error("file_descriptor_set_path required when skip_protoc_run is set")]
    MissingDescriptorPath,

    #[error("missing name in descriptor")]
    MissingName,

    #[error("missing field number in descriptor")]
    MissingFieldNumber,

    #[error("invalid field type: {0} (expected 1-18)")]
    InvalidFieldType(i32),

    #[error("invalid field label: {0} (expected 1-3)")]
    InvalidLabel(i32),

    #[error("invalid varint encoding")]
    InvalidVarint,

    #[error("unexpected end of buffer")]
    UnexpectedEof,

    #[error("invalid wire type: {0}")]
    InvalidWireType(u8),

    #[error("invalid UTF-8 in string field")]
    InvalidUtf8,

    /// §7 `missing-package`: neither `pbj.java_package`, a reference
    /// `java_package`, nor a bare `package` declaration is present.
    #[error("{file}: no package declared (need pbj.java_package, java_package, or package)")]
    MissingPackage { file: String },

    /// §7 `unresolved-import`: an import path matched zero or more than one
    /// known input file.
    #[error("{importing_file}: import \"{import_path}\" does not uniquely resolve ({match_count} matches)")]
    UnresolvedImport {
        importing_file: String,
        import_path: String,
        match_count: usize,
    },

    /// §7 `unresolved-type`: a type reference could not be resolved through
    /// local-nested -> outer-message -> package -> imports -> google-builtin.
    #[error("{file}: unresolved type \"{type_ref}\" (searched: {searched})")]
    UnresolvedType {
        file: String,
        type_ref: String,
        searched: String,
    },

    /// §7 `invalid-comparable`: `pbj.comparable` names a field that doesn't
    /// exist, is repeated, or (transitively, direct-only) isn't comparable.
    #[error("{file}:{element}: invalid pbj.comparable entry \"{field}\": {reason}")]
    InvalidComparable {
        file: String,
        element: String,
        field: String,
        reason: String,
    },

    /// §7 `invalid-option`: an unrecognized or malformed option on a
    /// field/oneof/option-comment.
    #[error("{file}:{element}: invalid option: {reason}")]
    InvalidOption {
        file: String,
        element: String,
        reason: String,
    },

    /// Raised by the Emitters stage (§4.6) when a message's `EmitSession`
    /// fails after `WALK_BODY`/`APPEND_ARTIFACTS`; no partial artifacts are
    /// written.
    #[error("{file}:{message}: emission failed at stage {stage}: {reason}")]
    EmitFailed {
        file: String,
        message: String,
        stage: &'static str,
        reason: String,
    },
}
