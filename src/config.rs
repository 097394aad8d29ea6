//! Configuration for schema compilation.

use std::path::{Path, PathBuf};

use crate::context::FileContext;
use crate::descriptor::FileDescriptorSet;
use crate::emit::{self, EmitOptions};
use crate::lookup::LookupEngine;
use crate::Error;

/// Default per-field length-delimited size ceiling (§6.4): 16 MiB.
const DEFAULT_MAX_MESSAGE_SIZE: u32 = 16 * 1024 * 1024;

/// Configuration for schema compilation, mirroring the two-entry-point
/// shape of a typical `build.rs` helper crate: `compile_protos` drives
/// `protoc` itself, `compile_fds` accepts an already-decoded descriptor set
/// (useful for tests, or callers with their own build-caching layer).
#[derive(Debug, Clone)]
pub struct Config {
    pub(crate) out_dir: Option<PathBuf>,
    pub(crate) protoc_path: Option<PathBuf>,
    pub(crate) protoc_args: Vec<String>,
    pub(crate) skip_protoc: bool,
    pub(crate) file_descriptor_set_path: Option<PathBuf>,
    /// Appended to the reference-impl `java_package` when deriving a PBJ
    /// package, unless an explicit `pbj.java_package` is given (§6.4).
    pub(crate) java_package_suffix: Option<String>,
    /// Per-field length-delimited size ceiling, overriding the §6.4 default.
    pub(crate) max_message_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            out_dir: None,
            protoc_path: None,
            protoc_args: Vec::new(),
            skip_protoc: false,
            file_descriptor_set_path: None,
            java_package_suffix: None,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output directory for generated artifact files.
    pub fn out_dir(&mut self, path: impl AsRef<Path>) -> &mut Self {
        self.out_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set path to the protoc executable.
    pub fn protoc_path(&mut self, path: impl AsRef<Path>) -> &mut Self {
        self.protoc_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Add an argument to pass to protoc.
    pub fn protoc_arg(&mut self, arg: impl Into<String>) -> &mut Self {
        self.protoc_args.push(arg.into());
        self
    }

    /// Skip running protoc; use an existing `FileDescriptorSet` instead.
    pub fn skip_protoc_run(&mut self) -> &mut Self {
        self.skip_protoc = true;
        self
    }

    /// Path to read a pre-existing `FileDescriptorSet` from (required when
    /// `skip_protoc_run` is set).
    pub fn file_descriptor_set_path(&mut self, path: impl AsRef<Path>) -> &mut Self {
        self.file_descriptor_set_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the PBJ package suffix (§6.4).
    pub fn java_package_suffix(&mut self, suffix: impl Into<String>) -> &mut Self {
        self.java_package_suffix = Some(suffix.into());
        self
    }

    /// Override the default 16 MiB per-field size ceiling (§6.4).
    pub fn max_message_size(&mut self, bytes: u32) -> &mut Self {
        self.max_message_size = bytes;
        self
    }

    /// Compile `.proto` files by invoking `protoc` to obtain a descriptor
    /// set, then running the full pipeline over it.
    pub fn compile_protos(&self, protos: &[impl AsRef<Path>], includes: &[impl AsRef<Path>]) -> Result<(), Error> {
        let fds = if self.skip_protoc {
            let path = self.file_descriptor_set_path.as_ref().ok_or(Error::MissingDescriptorPath)?;
            let bytes = std::fs::read(path)?;
            crate::protoc::parse_file_descriptor_set(&bytes)?
        } else {
            let protoc = match &self.protoc_path {
                Some(p) => p.clone(),
                None => crate::protoc::find_protoc()?,
            };
            crate::protoc::invoke_protoc(&protoc, protos, includes, &self.protoc_args)?
        };

        self.compile_fds(fds)
    }

    /// Compile from an already-decoded `FileDescriptorSet`.
    pub fn compile_fds(&self, fds: FileDescriptorSet) -> Result<(), Error> {
        let out_dir = self
            .out_dir
            .clone()
            .or_else(|| std::env::var_os("OUT_DIR").map(PathBuf::from))
            .ok_or(Error::MissingOutDir)?;
        let (engine, comment_maps) = LookupEngine::scan(&fds, self.java_package_suffix.as_deref())?;

        let opts = EmitOptions { out_dir, default_max_message_size: self.max_message_size };

        for file in &fds.file {
            let path = file.name.clone().ok_or(Error::MissingName)?;
            let proto_package = file.package.clone().unwrap_or_default();
            let comments = comment_maps.get(&path).ok_or(Error::MissingName)?;
            let ctx = FileContext::new(&engine, comments, &path);

            for message in &file.message_type {
                let Some(name) = &message.name else { continue };
                let fqname = if proto_package.is_empty() {
                    name.clone()
                } else {
                    format!("{}.{}", proto_package, name)
                };
                emit::compile_message(&ctx, message, &fqname, &opts)?;
            }
        }

        Ok(())
    }
}
