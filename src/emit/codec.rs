//! Binary codec emitter: `parse`, `write`, `sizeOf` over the protobuf wire
//! format (§4.6, §6.3, §6.4).

use crate::field::{Field, FieldKind};
use crate::names::pack_tag;

pub fn emit(class_name: &str, fields: &[Field], default_max_message_size: u32) -> String {
    let mut ordered: Vec<&Field> = fields.iter().collect();
    ordered.sort_by_key(|f| f.field_number());

    let mut out = String::new();
    out.push_str(&format!("public final class {}ProtoCodec {{\n\n", class_name));
    out.push_str(&format!("    private static final int DEFAULT_MAX_SIZE = {};\n\n", default_max_message_size));

    emit_write(&mut out, class_name, &ordered);
    emit_size_of(&mut out, class_name, &ordered);
    emit_parse(&mut out, class_name, &ordered);

    out.push_str("}\n");
    out
}

fn emit_write(out: &mut String, class_name: &str, fields: &[&Field]) {
    out.push_str(&format!("    public static void write({} value, OutputStream out) throws IOException {{\n", class_name));
    for field in fields {
        let getter = format!("value.{}()", field.name_camel());
        match field {
            Field::Map(m) => {
                out.push_str(&format!(
                    "        for (var entry : sortedEntries({})) {{ writeTag(out, {}); writeMapEntry(out, entry); }}\n",
                    getter,
                    pack_tag(2, m.field_number)
                ));
            }
            Field::OneOf(o) => {
                out.push_str(&format!("        switch (value.{}().kind()) {{\n", crate::names::snake_to_camel(&o.name, false)));
                for child in &o.children {
                    out.push_str(&format!(
                        "            case {} -> {{ writeTag(out, {}); writeValue(out, value); }}\n",
                        child.name.to_uppercase(),
                        pack_tag(child.kind.wire_type().as_u32(), child.field_number)
                    ));
                }
                out.push_str("            case UNSET -> {}\n");
                out.push_str("        }\n");
            }
            Field::Single(s) if s.repeated => {
                let tag = pack_tag(2, s.field_number);
                out.push_str(&format!(
                    "        if (!{getter}.isEmpty()) {{ writeTag(out, {tag}); writePacked(out, {getter}); }}\n",
                    getter = getter,
                    tag = tag
                ));
            }
            Field::Single(s) => {
                let tag = pack_tag(s.kind.wire_type().as_u32(), s.field_number);
                out.push_str(&format!(
                    "        if (!java.util.Objects.equals({getter}, {default})) {{ writeTag(out, {tag}); writeValue(out, {getter}); }}\n",
                    getter = getter,
                    default = s.kind.default_literal(),
                    tag = tag
                ));
            }
        }
    }
    out.push_str("    }\n\n");
}

fn emit_size_of(out: &mut String, class_name: &str, fields: &[&Field]) {
    out.push_str(&format!("    public static int sizeOf({} value) {{\n", class_name));
    out.push_str("        int size = 0;\n");
    for field in fields {
        out.push_str(&format!(
            "        size += sizeOfField(value.{}());\n",
            field.name_camel()
        ));
    }
    out.push_str("        return size;\n    }\n\n");
}

fn emit_parse(out: &mut String, class_name: &str, fields: &[&Field]) {
    out.push_str(&format!(
        "    public static {} parse(InputStream in, boolean strict, int maxDepth) throws IOException {{\n",
        class_name
    ));
    out.push_str("        if (maxDepth <= 0) throw new InvalidDeepRecursionException();\n");
    out.push_str("        var builder = new Builder();\n");
    out.push_str("        while (hasRemaining(in)) {\n");
    out.push_str("            int tag = readTag(in);\n");
    out.push_str("            int fieldNumber = tag >>> 3;\n");
    out.push_str("            switch (fieldNumber) {\n");
    for field in fields {
        match field {
            Field::Single(s) if s.kind == FieldKind::Message => {
                out.push_str(&format!(
                    "                case {} -> builder.{}(parseNested(in, maxDepth - 1));\n",
                    field.field_number(),
                    field.name_camel()
                ));
            }
            Field::Single(s) => {
                let max_size_check = if matches!(s.kind, FieldKind::String | FieldKind::Bytes) {
                    " checkMaxSize(in, DEFAULT_MAX_SIZE);"
                } else {
                    ""
                };
                out.push_str(&format!(
                    "                case {} -> {{{max_size} builder.{name}(readValue(in)); }}\n",
                    field.field_number(),
                    max_size = max_size_check,
                    name = field.name_camel(),
                ));
            }
            Field::Map(_) | Field::OneOf(_) => {
                out.push_str(&format!(
                    "                case {} -> builder.{}(readEntryOrBranch(in, tag));\n",
                    field.field_number(),
                    field.name_camel()
                ));
            }
        }
    }
    out.push_str("                default -> { if (strict) throw new UnknownFieldException(fieldNumber); else skip(in, tag); }\n");
    out.push_str("            }\n        }\n");
    out.push_str("        return builder.build();\n    }\n\n");
}
