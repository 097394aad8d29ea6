//! Schema emitter: one field descriptor per wire-visible field, plus a
//! `getField(fieldNumber)` dispatcher (§4.6).

use crate::field::Field;

pub fn emit(class_name: &str, fields: &[Field]) -> String {
    let mut out = String::new();
    out.push_str(&format!("public final class {}Schema {{\n\n", class_name));

    // `descriptor_lines` is flat (a OneOf contributes one line per child, a
    // Map contributes its own line plus synthetic key/value lines), so the
    // dispatcher below needs the real starting index of each wire-visible
    // field number within it, not a re-derived position against `fields`.
    let mut descriptor_lines = Vec::new();
    let mut dispatch: Vec<(u32, usize)> = Vec::new();
    for field in fields {
        let start = descriptor_lines.len();
        match field {
            Field::Single(s) => dispatch.push((s.field_number, start)),
            Field::OneOf(o) => {
                for (i, child) in o.children.iter().enumerate() {
                    dispatch.push((child.field_number, start + i));
                }
            }
            // Only the map field itself has a real top-level field number;
            // the synthetic key/value lines are internal to the entry.
            Field::Map(m) => dispatch.push((m.field_number, start)),
        }
        descriptor_lines.extend(field.field_definition_emission());
    }

    for (i, line) in descriptor_lines.iter().enumerate() {
        out.push_str(&format!("    public static final FieldDefinition FIELD_{} = {};\n", i, line));
    }
    out.push('\n');

    out.push_str("    public static FieldDefinition getField(int fieldNumber) {\n");
    out.push_str("        return switch (fieldNumber) {\n");
    for (field_number, index) in &dispatch {
        out.push_str(&format!("            case {} -> FIELD_{};\n", field_number, index));
    }
    out.push_str("            default -> throw new IllegalArgumentException(\"unknown field number: \" + fieldNumber);\n");
    out.push_str("        };\n    }\n");

    out.push_str("}\n");
    out
}
