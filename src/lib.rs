//! `pbjc` compiles Protocol Buffers v3 schemas into a companion object model:
//! a plain data model, a field-descriptor schema, a binary protobuf codec,
//! a JSON codec, and a test harness, one set per message.
//!
//! `.proto` parsing itself is delegated to `protoc`; this crate consumes the
//! resulting `FileDescriptorSet` (with `--include_source_info`, to recover
//! doc comments and `pbj.*` option annotations) and drives everything from
//! there.
//!
//! # Example
//!
//! ```rust,no_run
//! // In build.rs
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     pbjc::compile_protos(&["src/messages.proto"], &["src/"])?;
//!     Ok(())
//! }
//! ```
//!
//! # Customizing Output
//!
//! A handful of comment-borne options steer package and comparability
//! decisions, written as a trailing comment on the declaration they modify:
//!
//! ```protobuf
//! // <<< pbj.message_java_package = "com.example.wire" >>>
//! message MyMessage {
//!   // <<< pbj.comparable = "id, name" >>>
//!   int64 id = 1;
//!   string name = 2;
//! }
//! ```
//!
//! # Advanced Usage
//!
//! ```rust,no_run
//! fn main() -> Result<(), pbjc::Error> {
//!     pbjc::Config::new()
//!         .out_dir("target/generated")
//!         .java_package_suffix(".pbj")
//!         .compile_protos(&["proto/messages.proto"], &["proto/"])?;
//!     Ok(())
//! }
//! ```

mod comments;
mod config;
mod context;
pub mod descriptor;
mod emit;
mod error;
mod field;
mod lookup;
mod names;
mod protoc;
mod writer;

pub use config::Config;
pub use error::Error;

use std::path::Path;

/// Compile `.proto` files with default settings.
///
/// # Arguments
/// * `protos` - Paths to `.proto` files to compile
/// * `includes` - Include paths for resolving imports
///
/// # Example
///
/// ```rust,no_run
/// fn main() -> Result<(), pbjc::Error> {
///     pbjc::compile_protos(&["proto/messages.proto"], &["proto/"])?;
///     Ok(())
/// }
/// ```
pub fn compile_protos(
    protos: &[impl AsRef<Path>],
    includes: &[impl AsRef<Path>],
) -> Result<(), Error> {
    Config::new().compile_protos(protos, includes)
}
