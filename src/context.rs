//! The contextual Lookup facade (Stage D): a thin per-file view over the
//! frozen [`LookupEngine`] that lets an emitter call `package(MODEL, node)`
//! without repeatedly threading the active file and current message.

use crate::comments::CommentMap;
use crate::lookup::{ArtifactKind, LookupEngine};
use crate::Error;

/// Bound to one source file currently being compiled, plus (while walking
/// inside a message) the fq-name of the message currently being descended
/// into. Emitters only ever see this, never the engine directly.
pub struct FileContext<'a> {
    engine: &'a LookupEngine,
    comments: &'a CommentMap,
    file: String,
    current_message: Option<String>,
}

impl<'a> FileContext<'a> {
    pub fn new(engine: &'a LookupEngine, comments: &'a CommentMap, file: impl Into<String>) -> Self {
        Self { engine, comments, file: file.into(), current_message: None }
    }

    /// A view with `current_message` set, for resolving references written
    /// inside that message's body without losing the outer file context.
    pub fn within_message(&self, fqname: impl Into<String>) -> Self {
        Self {
            engine: self.engine,
            comments: self.comments,
            file: self.file.clone(),
            current_message: Some(fqname.into()),
        }
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn comments(&self) -> &CommentMap {
        self.comments
    }

    pub fn resolve(&self, type_ref: &str) -> Result<String, Error> {
        self.engine.resolve(&self.file, self.current_message.as_deref(), type_ref)
    }

    pub fn unqualified_class(&self, artifact: ArtifactKind, fqname: &str) -> Option<String> {
        self.engine.unqualified_class(artifact, fqname)
    }

    pub fn package(&self, artifact: ArtifactKind, fqname: &str) -> Option<String> {
        self.engine.package(artifact, fqname)
    }

    pub fn complete_class(&self, artifact: ArtifactKind, fqname: &str) -> Option<String> {
        self.engine.complete_class(artifact, fqname)
    }

    pub fn is_enum(&self, fqname: &str) -> bool {
        self.engine.is_enum(fqname)
    }

    pub fn is_comparable(&self, fqname: &str) -> bool {
        self.engine.is_comparable(fqname)
    }

    pub fn comparable_fields(&self, fqname: &str) -> &[String] {
        self.engine.comparable_fields(fqname)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{DescriptorProto, FileDescriptorProto, FileDescriptorSet};

    #[test]
    fn facade_delegates_to_engine() {
        let fds = FileDescriptorSet {
            file: vec![FileDescriptorProto {
                name: Some("a.proto".into()),
                package: Some("demo".into()),
                message_type: vec![DescriptorProto { name: Some("Greeting".into()), ..Default::default() }],
                ..Default::default()
            }],
        };
        let (engine, comments) = LookupEngine::scan(&fds, None).unwrap();
        let comment_map = comments.get("a.proto").unwrap_or_else(|| panic!("missing comments for a.proto"));
        let ctx = FileContext::new(&engine, comment_map, "a.proto");
        assert_eq!(ctx.resolve("Greeting").unwrap(), "demo.Greeting");
        assert_eq!(ctx.package(ArtifactKind::Schema, "demo.Greeting").unwrap(), "demo.schema");
    }
}
