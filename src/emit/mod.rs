//! The emitters (Stage F): one per artifact kind, driven by a per-message
//! [`EmitSession`] state machine (§4.6).

mod codec;
mod json_codec;
mod model;
mod schema;

use std::path::PathBuf;

use crate::context::FileContext;
use crate::descriptor::{DescriptorProto, FieldDescriptorProto, Label, Type};
use crate::field::{Field, FieldKind, MapField, OneOfField, SingleField};
use crate::lookup::ArtifactKind;
use crate::writer::ArtifactWriter;
use crate::Error;

/// The four states an `EmitSession` passes through for one top-level (or
/// nested) message. Transitions only ever move forward; there is no retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Init,
    WalkBody,
    AppendArtifacts,
    Flush,
}

/// Per-message emission, exactly as scoped in §3.4: one contextual facade,
/// one writer per artifact kind, a flat field list built once by walking the
/// message body. Nested messages are not descended into here — the caller
/// (`compile_message`) schedules a fresh `EmitSession` for each.
struct EmitSession<'a> {
    stage: Stage,
    fqname: String,
    fields: Vec<Field>,
    writers: Vec<(ArtifactKind, ArtifactWriter)>,
    ctx: FileContext<'a>,
}

/// Config knobs the emitters need that don't belong to any one artifact
/// kind: the output root and the default max-message-size ceiling (§6.4).
#[derive(Debug, Clone)]
pub struct EmitOptions {
    pub out_dir: PathBuf,
    pub default_max_message_size: u32,
}

/// Recursively emit `message` (already registered in the Lookup engine under
/// `fqname`) and every message nested inside it.
pub fn compile_message(
    ctx: &FileContext<'_>,
    message: &DescriptorProto,
    fqname: &str,
    opts: &EmitOptions,
) -> Result<(), Error> {
    if message.options.as_ref().and_then(|o| o.map_entry).unwrap_or(false) {
        return Ok(());
    }

    let inner_ctx = ctx.within_message(fqname);
    let mut session = EmitSession::init(inner_ctx, fqname, opts)?;
    session.walk_body(message)?;
    session.append_artifacts(message, opts)?;
    session.flush()?;

    for nested in &message.nested_type {
        if nested.options.as_ref().and_then(|o| o.map_entry).unwrap_or(false) {
            continue;
        }
        let Some(name) = &nested.name else { continue };
        let nested_fqname = format!("{}.{}", fqname, name);
        compile_message(ctx, nested, &nested_fqname, opts)?;
    }

    Ok(())
}

impl<'a> EmitSession<'a> {
    fn init(ctx: FileContext<'a>, fqname: &str, opts: &EmitOptions) -> Result<Self, Error> {
        let kinds = [
            ArtifactKind::Model,
            ArtifactKind::Schema,
            ArtifactKind::Codec,
            ArtifactKind::JsonCodec,
            ArtifactKind::Test,
        ];

        let mut writers = Vec::with_capacity(kinds.len());
        for kind in kinds {
            let package = ctx.package(kind, fqname).ok_or_else(|| Error::EmitFailed {
                file: ctx.file().to_string(),
                message: fqname.to_string(),
                stage: "INIT",
                reason: "message not registered in Lookup engine".to_string(),
            })?;
            let class = ctx.unqualified_class(kind, fqname).ok_or_else(|| Error::EmitFailed {
                file: ctx.file().to_string(),
                message: fqname.to_string(),
                stage: "INIT",
                reason: "message not registered in Lookup engine".to_string(),
            })?;
            let rel_dir = artifact_dir(kind, &package);
            let out_path = opts.out_dir.join(rel_dir).join(format!("{}.txt", class));
            writers.push((kind, ArtifactWriter::new(out_path, package)?));
        }

        Ok(Self { stage: Stage::Init, fqname: fqname.to_string(), fields: Vec::new(), writers, ctx })
    }

    fn writer_mut(&mut self, kind: ArtifactKind) -> &mut ArtifactWriter {
        &mut self.writers.iter_mut().find(|(k, _)| *k == kind).expect("all five writers constructed in init").1
    }

    /// Iterate the message's elements once, classifying each into the flat
    /// field list. Nested messages/enums are not handled here: they are
    /// scheduled for their own `EmitSession` by the caller.
    fn walk_body(&mut self, message: &DescriptorProto) -> Result<(), Error> {
        debug_assert_eq!(self.stage, Stage::Init);
        self.stage = Stage::WalkBody;

        let oneof_names: Vec<String> = message.oneof_decl.iter().filter_map(|o| o.name.clone()).collect();

        for (oneof_index, oneof_name) in oneof_names.iter().enumerate() {
            let children: Result<Vec<SingleField>, Error> = message
                .field
                .iter()
                .filter(|f| f.oneof_index == Some(oneof_index as i32) && f.proto3_optional != Some(true))
                .map(|f| self.build_single(f, Some(oneof_name)))
                .collect();
            let children = children?;
            if children.is_empty() {
                continue;
            }
            self.fields.push(Field::OneOf(OneOfField {
                parent_message: self.fqname.clone(),
                name: oneof_name.clone(),
                doc: None,
                children,
                deprecated: false,
                comparable: self.ctx.is_comparable(&self.fqname),
            }));
        }

        for field in &message.field {
            if field.oneof_index.is_some() && field.proto3_optional != Some(true) {
                continue;
            }
            if is_map_field(field, message) {
                self.fields.push(Field::Map(self.build_map(field, message)?));
            } else {
                self.fields.push(Field::Single(self.build_single(field, None)?));
            }
        }

        Ok(())
    }

    fn build_single(&self, field: &FieldDescriptorProto, parent_oneof: Option<&str>) -> Result<SingleField, Error> {
        let name = field.name.clone().ok_or(Error::MissingName)?;
        let number = field.number.ok_or(Error::MissingFieldNumber)? as u32;
        let kind = self.field_kind(field)?;

        let message_type = match field.type_name.as_deref() {
            Some(t) => Some(self.ctx.resolve(t)?),
            None => None,
        };

        Ok(SingleField {
            repeated: field.label()? == Label::Repeated,
            kind,
            field_number: number,
            name,
            message_type,
            complete_class: None,
            doc: None,
            deprecated: false,
            parent_oneof: parent_oneof.map(str::to_string),
            is_map_synthetic: false,
        })
    }

    fn build_map(&self, field: &FieldDescriptorProto, parent: &DescriptorProto) -> Result<MapField, Error> {
        let entry_name = field.type_name.clone().unwrap_or_default();
        let entry = parent
            .nested_type
            .iter()
            .find(|n| entry_name.ends_with(n.name.as_deref().unwrap_or("\u{0}")))
            .ok_or_else(|| Error::EmitFailed {
                file: self.ctx.file().to_string(),
                message: self.fqname.clone(),
                stage: "WALK_BODY",
                reason: format!("map entry type for field {:?} not found", field.name),
            })?;

        let key_field = entry.field.iter().find(|f| f.number == Some(1)).ok_or(Error::MissingFieldNumber)?;
        let value_field = entry.field.iter().find(|f| f.number == Some(2)).ok_or(Error::MissingFieldNumber)?;

        let mut key = self.build_single(key_field, None)?;
        key.is_map_synthetic = true;
        let mut value = self.build_single(value_field, None)?;
        value.is_map_synthetic = true;

        Ok(MapField {
            key: Box::new(key),
            value: Box::new(value),
            field_number: field.number.ok_or(Error::MissingFieldNumber)? as u32,
            name: field.name.clone().ok_or(Error::MissingName)?,
            doc: None,
            deprecated: false,
        })
    }

    fn field_kind(&self, field: &FieldDescriptorProto) -> Result<FieldKind, Error> {
        let proto_type = field.field_type().ok_or_else(|| Error::InvalidFieldType(field.r#type.unwrap_or(0)))?;
        Ok(match proto_type {
            Type::Int32 => FieldKind::Int32,
            Type::Uint32 => FieldKind::UInt32,
            Type::Sint32 => FieldKind::SInt32,
            Type::Fixed32 => FieldKind::Fixed32,
            Type::Sfixed32 => FieldKind::SFixed32,
            Type::Int64 => FieldKind::Int64,
            Type::Uint64 => FieldKind::UInt64,
            Type::Sint64 => FieldKind::SInt64,
            Type::Fixed64 => FieldKind::Fixed64,
            Type::Sfixed64 => FieldKind::SFixed64,
            Type::Float => FieldKind::Float,
            Type::Double => FieldKind::Double,
            Type::Bool => FieldKind::Bool,
            Type::String => FieldKind::String,
            Type::Bytes => FieldKind::Bytes,
            Type::Enum => FieldKind::Enum,
            Type::Message | Type::Group => FieldKind::Message,
        })
    }

    fn append_artifacts(&mut self, message: &DescriptorProto, opts: &EmitOptions) -> Result<(), Error> {
        debug_assert_eq!(self.stage, Stage::WalkBody);
        self.stage = Stage::AppendArtifacts;

        let unqualified = self
            .ctx
            .unqualified_class(ArtifactKind::Model, &self.fqname)
            .unwrap_or_else(|| self.fqname.clone());
        let comparable_fields = self.ctx.comparable_fields(&self.fqname).to_vec();

        let body = model::emit(&unqualified, &self.fields, &comparable_fields);
        self.writer_mut(ArtifactKind::Model).append(&body);
        self.add_field_imports(ArtifactKind::Model);

        let body = schema::emit(&unqualified, &self.fields);
        self.writer_mut(ArtifactKind::Schema).append(&body);
        self.add_field_imports(ArtifactKind::Schema);

        let body = codec::emit(&unqualified, &self.fields, opts.default_max_message_size);
        self.writer_mut(ArtifactKind::Codec).append(&body);
        self.add_field_imports(ArtifactKind::Codec);

        let body = json_codec::emit(&unqualified, &self.fields);
        self.writer_mut(ArtifactKind::JsonCodec).append(&body);
        self.add_field_imports(ArtifactKind::JsonCodec);

        let body = test::emit(&unqualified, &self.fields);
        self.writer_mut(ArtifactKind::Test).append(&body);
        self.add_field_imports(ArtifactKind::Test);

        let _ = message;
        Ok(())
    }

    /// Resolve every field's [`Field::import_contributions`] for `kind` into
    /// a concrete Java import and add it to that artifact's writer (§4.5,
    /// §6.2). A `java.*` contribution is already a concrete import; a
    /// cross-message contribution is a proto fq-name and is resolved through
    /// the Lookup engine to that artifact kind's own package/class.
    fn add_field_imports(&mut self, kind: ArtifactKind) {
        let mut symbols = Vec::new();
        for field in &self.fields {
            for contribution in field.import_contributions(kind) {
                if contribution.starts_with("java.") {
                    symbols.push(contribution);
                } else if let Some(class) = self.ctx.complete_class(kind, &contribution) {
                    if let Some(package) = self.ctx.package(kind, &contribution) {
                        symbols.push(format!("{}.{}", package, class));
                    }
                }
            }
        }
        let writer = self.writer_mut(kind);
        for symbol in symbols {
            writer.add_import(symbol);
        }
    }

    fn flush(mut self) -> Result<(), Error> {
        debug_assert_eq!(self.stage, Stage::AppendArtifacts);
        self.stage = Stage::Flush;
        for (_, writer) in &mut self.writers {
            writer.flush()?;
        }
        Ok(())
    }
}

fn is_map_field(field: &FieldDescriptorProto, parent: &DescriptorProto) -> bool {
    if !matches!(field.label(), Ok(Label::Repeated)) || field.field_type() != Some(Type::Message) {
        return false;
    }
    let Some(type_name) = &field.type_name else { return false };
    parent.nested_type.iter().any(|n| {
        type_name.ends_with(n.name.as_deref().unwrap_or("\u{0}"))
            && n.options.as_ref().and_then(|o| o.map_entry).unwrap_or(false)
    })
}

/// Directory fragment for an artifact kind under `<out_dir>/<package-as-path>/...`
/// (§6.2's `<P>/…` layout; `P` is the package with dots replaced by `/`).
fn artifact_dir(kind: ArtifactKind, package: &str) -> PathBuf {
    let package_path: PathBuf = package.split('.').collect();
    match kind {
        ArtifactKind::Model | ArtifactKind::Reference => package_path,
        ArtifactKind::Schema => {
            // package already carries the `.schema` suffix; strip it back off
            // so we don't double up the `schema/` directory.
            let base = package.strip_suffix(".schema").unwrap_or(package);
            base.split('.').collect::<PathBuf>().join("schema")
        }
        ArtifactKind::Codec | ArtifactKind::JsonCodec => {
            let base = package.strip_suffix(".codec").unwrap_or(package);
            base.split('.').collect::<PathBuf>().join("codec")
        }
        ArtifactKind::Test => {
            let base = package.strip_suffix(".tests").unwrap_or(package);
            base.split('.').collect::<PathBuf>().join("tests")
        }
    }
}
