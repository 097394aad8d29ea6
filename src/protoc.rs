//! Protoc invocation utilities.
//!
//! The front-end described in the Lookup engine's module doc assumes an
//! already-produced parse tree; this module is how we obtain one without
//! writing a `.proto` grammar ourselves. We shell out to `protoc` for the
//! parse and ask it to also include source info, which is where the
//! `// <<< key = "value" >>>` option-comment annotations get recovered from.

use crate::descriptor::{decode_file_descriptor_set, FileDescriptorSet};
use crate::Error;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Find the protoc executable.
pub fn find_protoc() -> Result<PathBuf, Error> {
    // Check PROTOC environment variable first
    if let Ok(path) = std::env::var("PROTOC") {
        let path = PathBuf::from(path);
        if path.exists() {
            return Ok(path);
        }
    }

    // Try to find protoc in PATH
    which::which("protoc").map_err(|_| Error::ProtocNotFound)
}

/// Invoke protoc to generate a `FileDescriptorSet`.
pub fn invoke_protoc(
    protoc: &Path,
    protos: &[impl AsRef<Path>],
    includes: &[impl AsRef<Path>],
    extra_args: &[String],
) -> Result<FileDescriptorSet, Error> {
    let tempdir = tempfile::tempdir()?;
    let descriptor_path = tempdir.path().join("descriptor.bin");

    let mut cmd = Command::new(protoc);

    for include in includes {
        cmd.arg("-I").arg(include.as_ref());
    }

    cmd.arg("--descriptor_set_out").arg(&descriptor_path);

    // Full type information for cross-file imports, and source info so the
    // comment/option-comment recovery in `crate::comments` has something to
    // read.
    cmd.arg("--include_imports");
    cmd.arg("--include_source_info");

    for arg in extra_args {
        cmd.arg(arg);
    }

    for proto in protos {
        cmd.arg(proto.as_ref());
    }

    let output = cmd.output()?;

    if !output.status.success() {
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let combined = if stdout.is_empty() {
            stderr.into_owned()
        } else if stderr.is_empty() {
            stdout.into_owned()
        } else {
            format!("{}\n{}", stdout, stderr)
        };
        return Err(Error::ProtocFailed(combined));
    }

    let descriptor_bytes = std::fs::read(&descriptor_path)?;
    decode_file_descriptor_set(&descriptor_bytes)
}

/// Parse a `FileDescriptorSet` from bytes produced elsewhere (e.g. a cached
/// build artifact), bypassing `protoc` entirely.
pub fn parse_file_descriptor_set(bytes: &[u8]) -> Result<FileDescriptorSet, Error> {
    decode_file_descriptor_set(bytes)
}
