//! The Lookup engine (Stage C): a two-phase scan-then-resolve symbol table
//! builder over the whole input file set.
//!
//! Phase 1 (`LookupEngine::scan`) walks every `FileDescriptorProto` once,
//! populating the five symbol tables in §3.3. Phase 2 is the set of
//! read-only query methods emitters call through the per-file facade in
//! [`crate::context`]. Once `scan` returns, the tables are frozen; nothing
//! after that point mutates them (§5's "shared resource discipline").

use std::collections::{HashMap, HashSet};

use crate::comments::{CommentMap, DescriptorPath};
use crate::descriptor::{DescriptorProto, EnumDescriptorProto, FileDescriptorProto, FileDescriptorSet};
use crate::Error;

/// One of the five artifact kinds an entity may be emitted as, plus the
/// `Reference` pseudo-kind for interoperability with a third-party protobuf
/// implementation (glossary: "Artifact kind").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Model,
    Schema,
    Codec,
    JsonCodec,
    Test,
    Reference,
}

impl ArtifactKind {
    /// Package suffix appended to the base (model) package, per §6.2/§4.3.
    pub fn package_suffix(self) -> &'static str {
        match self {
            ArtifactKind::Model | ArtifactKind::Reference => "",
            ArtifactKind::Schema => ".schema",
            ArtifactKind::Codec | ArtifactKind::JsonCodec => ".codec",
            ArtifactKind::Test => ".tests",
        }
    }

    /// Class-name suffix applied to a message's unqualified name. Enums
    /// keep their raw name regardless of artifact kind (§4.3).
    pub fn class_suffix(self) -> &'static str {
        match self {
            ArtifactKind::Model | ArtifactKind::Reference => "",
            ArtifactKind::Schema => "Schema",
            ArtifactKind::Codec => "ProtoCodec",
            ArtifactKind::JsonCodec => "JsonCodec",
            ArtifactKind::Test => "Test",
        }
    }
}

/// Kind of a fully-qualified name registered during the scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Message,
    Enum,
    Service,
}

/// Everything the engine knows about one fq-name.
#[derive(Debug, Clone)]
struct Entity {
    kind: EntityKind,
    file: String,
    /// Dotted nested-class path within its file (e.g. `Outer.Middle.Inner`).
    complete_class: String,
    /// Base (model) package for PBJ-generated code.
    pbj_package: String,
    /// Package used by the reference implementation.
    wire_package: String,
}

/// Tracks "current file" / "current element" while Phase 1 walks the
/// descriptor tree, so errors can be attributed to `<file>:<element-name>`
/// (§7). This is the structural answer to the "transitive resolver" note in
/// §9: rather than threading loose string arguments through every recursive
/// call, the cursor carries attribution state explicitly.
struct ScanCursor {
    file: String,
    element_stack: Vec<String>,
}

impl ScanCursor {
    fn new(file: impl Into<String>) -> Self {
        Self { file: file.into(), element_stack: Vec::new() }
    }

    fn element(&self) -> String {
        self.element_stack.last().cloned().unwrap_or_else(|| "<file>".to_string())
    }

    fn push(&mut self, name: &str) {
        self.element_stack.push(name.to_string());
    }

    fn pop(&mut self) {
        self.element_stack.pop();
    }
}

/// The frozen, globally-shared symbol tables (§3.3), built once by
/// [`LookupEngine::scan`] and read thereafter only through Phase 2 queries.
#[derive(Debug, Default)]
pub struct LookupEngine {
    entities: HashMap<String, Entity>,
    /// source file path -> { short name -> candidate fq-names }. Per the §9
    /// REDESIGN FLAG, this replaces a naive single-valued short-name map
    /// (which breaks when two differently-nested messages share a short
    /// name) with a multi-valued index; `resolve` disambiguates by walking
    /// the current message's enclosing chain before falling back here.
    short_name_index: HashMap<String, HashMap<String, Vec<String>>>,
    import_map: HashMap<String, HashSet<String>>,
    enum_set: HashSet<String>,
    comparable_fields: HashMap<String, Vec<String>>,
}

impl LookupEngine {
    /// Phase 1: scan every file in the set, populating all symbol tables.
    /// Returns the frozen engine plus each file's `CommentMap` (needed again
    /// during emission for ordinary doc comments).
    pub fn scan(
        fds: &FileDescriptorSet,
        java_package_suffix: Option<&str>,
    ) -> Result<(Self, HashMap<String, CommentMap>), Error> {
        let mut engine = Self::default();
        let mut comment_maps = HashMap::new();

        let known_files: HashSet<String> = fds.file.iter().filter_map(|f| f.name.clone()).collect();

        for file in &fds.file {
            let path = file.name.clone().ok_or(Error::MissingName)?;
            let comments = CommentMap::from_file(file, &path)?;

            engine.scan_imports(file, &path, &known_files)?;
            engine.scan_file(file, &path, &comments, java_package_suffix)?;

            comment_maps.insert(path, comments);
        }

        Ok((engine, comment_maps))
    }

    fn scan_imports(&mut self, file: &FileDescriptorProto, path: &str, known_files: &HashSet<String>) -> Result<(), Error> {
        let mut resolved = HashSet::new();
        for dep in &file.dependency {
            let matches: Vec<&String> = known_files.iter().filter(|f| f.ends_with(dep.as_str())).collect();
            match matches.len() {
                1 => {
                    resolved.insert(matches[0].clone());
                }
                n => {
                    return Err(Error::UnresolvedImport {
                        importing_file: path.to_string(),
                        import_path: dep.clone(),
                        match_count: n,
                    });
                }
            }
        }
        self.import_map.insert(path.to_string(), resolved);
        Ok(())
    }

    fn scan_file(
        &mut self,
        file: &FileDescriptorProto,
        path: &str,
        comments: &CommentMap,
        java_package_suffix: Option<&str>,
    ) -> Result<(), Error> {
        let proto_package = file.package.clone().unwrap_or_default();

        let pbj_file_package = file_level_option(comments, "pbj.java_package");
        let reference_package = file.options.as_ref().and_then(|o| o.java_package.clone());

        let (base_pbj_package, base_wire_package) = match (&pbj_file_package, &reference_package) {
            (Some(pbj), Some(wire)) => (pbj.clone(), wire.clone()),
            (Some(pbj), None) => (pbj.clone(), proto_package.clone()),
            (None, Some(wire)) => {
                let pbj = match java_package_suffix {
                    Some(suffix) if !suffix.is_empty() => format!("{}{}", wire, suffix),
                    _ => wire.clone(),
                };
                (pbj, wire.clone())
            }
            (None, None) => {
                if proto_package.is_empty() {
                    return Err(Error::MissingPackage { file: path.to_string() });
                }
                (proto_package.clone(), proto_package.clone())
            }
        };

        let mut cursor = ScanCursor::new(path);
        let mut short_names = HashMap::new();

        for (i, message) in file.message_type.iter().enumerate() {
            let dp = DescriptorPath::message(i);
            self.scan_message(
                message,
                &dp,
                comments,
                &mut cursor,
                path,
                &proto_package,
                &base_pbj_package,
                &base_wire_package,
                None,
                &mut short_names,
            )?;
        }

        for (i, en) in file.enum_type.iter().enumerate() {
            let dp = DescriptorPath::top_level_enum(i);
            self.scan_enum(en, &dp, comments, path, &proto_package, &base_pbj_package, &base_wire_package, None, &mut short_names)?;
        }

        for svc in &file.service {
            if let Some(name) = &svc.name {
                let fqname = qualify(&proto_package, &[], name);
                self.register(
                    &fqname,
                    Entity {
                        kind: EntityKind::Service,
                        file: path.to_string(),
                        complete_class: name.clone(),
                        pbj_package: base_pbj_package.clone(),
                        wire_package: base_wire_package.clone(),
                    },
                    &mut short_names,
                );
            }
        }

        self.short_name_index.insert(path.to_string(), short_names);

        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn scan_message(
        &mut self,
        message: &DescriptorProto,
        dp: &DescriptorPath,
        comments: &CommentMap,
        cursor: &mut ScanCursor,
        file: &str,
        proto_package: &str,
        base_pbj_package: &str,
        base_wire_package: &str,
        enclosing: Option<(&str, &str)>,
        short_names: &mut HashMap<String, Vec<String>>,
    ) -> Result<(), Error> {
        // Synthetic map-entry messages are not user-facing entities.
        if message.options.as_ref().and_then(|o| o.map_entry).unwrap_or(false) {
            return Ok(());
        }

        let name = message.name.clone().ok_or(Error::MissingName)?;
        cursor.push(&name);

        let (enclosing_fqname, enclosing_class) = enclosing.unwrap_or(("", ""));
        let fqname = qualify(proto_package, &[enclosing_fqname], &name);
        let complete_class =
            if enclosing_class.is_empty() { name.clone() } else { format!("{}.{}", enclosing_class, name) };

        let pbj_package = comments
            .option_value(dp, "pbj.message_java_package")
            .map(str::to_string)
            .unwrap_or_else(|| base_pbj_package.to_string());

        self.register(
            &fqname,
            Entity {
                kind: EntityKind::Message,
                file: file.to_string(),
                complete_class: complete_class.clone(),
                pbj_package,
                wire_package: base_wire_package.to_string(),
            },
            short_names,
        );

        if let Some(list) = comments.option_value(dp, "pbj.comparable") {
            let fields: Vec<&str> = message.field.iter().filter_map(|f| f.name.as_deref()).collect();
            let mut ordered = Vec::new();
            for raw in list.split(',') {
                let field_name = raw.trim();
                if field_name.is_empty() {
                    continue;
                }
                if !fields.contains(&field_name) {
                    return Err(Error::InvalidComparable {
                        file: file.to_string(),
                        element: cursor.element(),
                        field: field_name.to_string(),
                        reason: "field does not exist on this message".to_string(),
                    });
                }
                let is_repeated = message
                    .field
                    .iter()
                    .find(|f| f.name.as_deref() == Some(field_name))
                    .map(|f| matches!(f.label(), Ok(crate::descriptor::Label::Repeated)))
                    .unwrap_or(false);
                if is_repeated {
                    return Err(Error::InvalidComparable {
                        file: file.to_string(),
                        element: cursor.element(),
                        field: field_name.to_string(),
                        reason: "repeated fields cannot participate in comparable ordering".to_string(),
                    });
                }
                ordered.push(field_name.to_string());
            }
            self.comparable_fields.insert(fqname.clone(), ordered);
        }

        for (i, nested) in message.nested_type.iter().enumerate() {
            let nested_dp = dp.nested_message(i);
            self.scan_message(
                nested,
                &nested_dp,
                comments,
                cursor,
                file,
                proto_package,
                base_pbj_package,
                base_wire_package,
                Some((&fqname, &complete_class)),
                short_names,
            )?;
        }

        for (i, en) in message.enum_type.iter().enumerate() {
            let nested_dp = dp.nested_enum(i);
            self.scan_enum(
                en,
                &nested_dp,
                comments,
                file,
                proto_package,
                base_pbj_package,
                base_wire_package,
                Some((&fqname, &complete_class)),
                short_names,
            )?;
        }

        cursor.pop();
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn scan_enum(
        &mut self,
        en: &EnumDescriptorProto,
        dp: &DescriptorPath,
        comments: &CommentMap,
        file: &str,
        proto_package: &str,
        base_pbj_package: &str,
        base_wire_package: &str,
        enclosing: Option<(&str, &str)>,
        short_names: &mut HashMap<String, Vec<String>>,
    ) -> Result<(), Error> {
        let name = en.name.clone().ok_or(Error::MissingName)?;
        let (enclosing_fqname, enclosing_class) = enclosing.unwrap_or(("", ""));
        let fqname = qualify(proto_package, &[enclosing_fqname], &name);
        let complete_class =
            if enclosing_class.is_empty() { name.clone() } else { format!("{}.{}", enclosing_class, name) };

        let pbj_package = comments
            .option_value(dp, "pbj.enum_java_package")
            .map(str::to_string)
            .unwrap_or_else(|| base_pbj_package.to_string());

        self.enum_set.insert(fqname.clone());
        self.register(
            &fqname,
            Entity {
                kind: EntityKind::Enum,
                file: file.to_string(),
                complete_class,
                pbj_package,
                wire_package: base_wire_package.to_string(),
            },
            short_names,
        );
        Ok(())
    }

    fn register(&mut self, fqname: &str, entity: Entity, short_names: &mut HashMap<String, Vec<String>>) {
        let short = fqname.rsplit('.').next().unwrap_or(fqname).to_string();
        short_names.entry(short).or_default().push(fqname.to_string());
        self.entities.insert(fqname.to_string(), entity);
    }

    // ---- Phase 2: read-only queries -----------------------------------

    /// Resolve a (possibly bare, possibly partially-qualified) type
    /// reference seen while compiling `file`, optionally nested inside
    /// `current_message` (a fq-name), to its fq-name.
    pub fn resolve(&self, file: &str, current_message: Option<&str>, type_ref: &str) -> Result<String, Error> {
        let type_ref = type_ref.trim_start_matches('.');

        if type_ref.starts_with("google.protobuf.") {
            return Ok(type_ref.to_string());
        }

        if self.entities.contains_key(type_ref) {
            return Ok(type_ref.to_string());
        }

        if let Some(current) = current_message {
            let mut segments: Vec<&str> = current.split('.').collect();
            while !segments.is_empty() {
                let candidate = format!("{}.{}", segments.join("."), type_ref);
                if self.entities.contains_key(&candidate) {
                    return Ok(candidate);
                }
                segments.pop();
            }
        }

        if let Some(index) = self.short_name_index.get(file) {
            if let Some(candidates) = index.get(type_ref.rsplit('.').next().unwrap_or(type_ref)) {
                if candidates.len() == 1 {
                    return Ok(candidates[0].clone());
                }
            }
        }

        let imported: Vec<String> = self.import_map.get(file).into_iter().flatten().cloned().collect();
        Err(Error::UnresolvedType {
            file: file.to_string(),
            type_ref: type_ref.to_string(),
            searched: format!("local-nested, outer-message, package, imports {:?}, google-builtin", imported),
        })
    }

    pub fn unqualified_class(&self, artifact: ArtifactKind, fqname: &str) -> Option<String> {
        let entity = self.entities.get(fqname)?;
        let base = entity.complete_class.rsplit('.').next().unwrap_or(&entity.complete_class);
        if entity.kind == EntityKind::Enum {
            Some(base.to_string())
        } else {
            Some(format!("{}{}", base, artifact.class_suffix()))
        }
    }

    pub fn package(&self, artifact: ArtifactKind, fqname: &str) -> Option<String> {
        let entity = self.entities.get(fqname)?;
        let base = match artifact {
            ArtifactKind::Reference => &entity.wire_package,
            _ => &entity.pbj_package,
        };
        Some(format!("{}{}", base, artifact.package_suffix()))
    }

    pub fn complete_class(&self, artifact: ArtifactKind, fqname: &str) -> Option<String> {
        let entity = self.entities.get(fqname)?;
        if entity.kind == EntityKind::Enum || artifact == ArtifactKind::Reference {
            return Some(entity.complete_class.clone());
        }
        let parts: Vec<&str> = entity.complete_class.split('.').collect();
        let (last, rest) = parts.split_last()?;
        let mut path: Vec<String> = rest.iter().map(|s| s.to_string()).collect();
        path.push(format!("{}{}", last, artifact.class_suffix()));
        Some(path.join("."))
    }

    pub fn is_enum(&self, fqname: &str) -> bool {
        self.enum_set.contains(fqname)
    }

    pub fn is_comparable(&self, fqname: &str) -> bool {
        self.comparable_fields.get(fqname).map(|v| !v.is_empty()).unwrap_or(false)
    }

    pub fn comparable_fields(&self, fqname: &str) -> &[String] {
        self.comparable_fields.get(fqname).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn imports_of(&self, file: &str) -> &HashSet<String> {
        static EMPTY: std::sync::OnceLock<HashSet<String>> = std::sync::OnceLock::new();
        self.import_map.get(file).unwrap_or_else(|| EMPTY.get_or_init(HashSet::new))
    }
}

fn qualify(proto_package: &str, enclosing: &[&str], name: &str) -> String {
    let enclosing = enclosing.iter().filter(|s| !s.is_empty()).next().copied();
    match enclosing {
        Some(parent) => format!("{}.{}", parent, name),
        None if proto_package.is_empty() => name.to_string(),
        None => format!("{}.{}", proto_package, name),
    }
}

/// Look for a file-level option-comment among only the shallow (depth <= 2)
/// paths, which is where `protoc` attaches top-of-file comments (before
/// `syntax`/`package` statements); falls back to a full scan if nothing
/// shallow matched, since exact attachment depth is not specified.
fn file_level_option(comments: &CommentMap, name: &str) -> Option<String> {
    for path in [vec![12], vec![2], vec![]] {
        if let Some(v) = comments.option_value(&DescriptorPath::from(path), name) {
            return Some(v.to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{DescriptorProto, FieldDescriptorProto, FileDescriptorProto, FileDescriptorSet, Label};

    fn simple_fds() -> FileDescriptorSet {
        FileDescriptorSet {
            file: vec![FileDescriptorProto {
                name: Some("a.proto".into()),
                package: Some("demo".into()),
                message_type: vec![DescriptorProto {
                    name: Some("Greeting".into()),
                    field: vec![FieldDescriptorProto {
                        name: Some("id".into()),
                        number: Some(1),
                        label: Some(Label::Optional as i32),
                        ..Default::default()
                    }],
                    ..Default::default()
                }],
                ..Default::default()
            }],
        }
    }

    #[test]
    fn scan_registers_fqname_and_package() {
        let fds = simple_fds();
        let (engine, _) = LookupEngine::scan(&fds, None).unwrap();
        assert_eq!(engine.package(ArtifactKind::Model, "demo.Greeting").unwrap(), "demo");
        assert_eq!(engine.package(ArtifactKind::Schema, "demo.Greeting").unwrap(), "demo.schema");
        assert_eq!(engine.unqualified_class(ArtifactKind::Schema, "demo.Greeting").unwrap(), "GreetingSchema");
    }

    #[test]
    fn resolve_bare_name_within_same_package() {
        let fds = simple_fds();
        let (engine, _) = LookupEngine::scan(&fds, None).unwrap();
        assert_eq!(engine.resolve("a.proto", None, "Greeting").unwrap(), "demo.Greeting");
    }

    #[test]
    fn missing_package_is_fatal() {
        let fds = FileDescriptorSet {
            file: vec![FileDescriptorProto { name: Some("b.proto".into()), ..Default::default() }],
        };
        let result = LookupEngine::scan(&fds, None);
        assert!(matches!(result, Err(Error::MissingPackage { .. })));
    }

    #[test]
    fn unresolved_import_is_fatal() {
        let fds = FileDescriptorSet {
            file: vec![FileDescriptorProto {
                name: Some("b.proto".into()),
                package: Some("demo".into()),
                dependency: vec!["missing.proto".into()],
                ..Default::default()
            }],
        };
        let result = LookupEngine::scan(&fds, None);
        assert!(matches!(result, Err(Error::UnresolvedImport { .. })));
    }
}
