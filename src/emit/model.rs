//! Model emitter: an immutable data-carrier for one message (§4.6).

use crate::field::Field;

/// Emit the model body: field storage, accessors, a constructor, `equals`/
/// `hash`, an optional `compareTo`, and a `DEFAULT` singleton.
///
/// String fields are stored as UTF-8 byte arrays (§9 design note): encode/
/// decode cost moves from every read to the set/get boundary, and it's what
/// lets `equals`/`hash` compare byte arrays rather than decoded strings.
/// Cross-message field imports are resolved and added to the writer by the
/// caller (`EmitSession::add_field_imports`), not here.
pub fn emit(class_name: &str, fields: &[Field], comparable_fields: &[String]) -> String {
    let mut out = String::new();
    out.push_str(&format!("public final class {} {{\n\n", class_name));

    for field in fields {
        let storage_type = if field.kind() == crate::field::FieldKind::String {
            "byte[]".to_string()
        } else {
            field.display_type()
        };
        out.push_str(&format!("    private final {} {};\n", storage_type, field.name_camel()));
    }
    out.push('\n');

    out.push_str(&format!("    public {}(\n", class_name));
    let params: Vec<String> = fields
        .iter()
        .map(|f| format!("        {} {}", f.display_type(), f.name_camel()))
        .collect();
    out.push_str(&params.join(",\n"));
    out.push_str("\n    ) {\n");
    for field in fields {
        if field.kind() == crate::field::FieldKind::String {
            out.push_str(&format!(
                "        this.{name} = {name}.getBytes(java.nio.charset.StandardCharsets.UTF_8);\n",
                name = field.name_camel()
            ));
        } else {
            out.push_str(&format!("        this.{name} = {name};\n", name = field.name_camel()));
        }
    }
    out.push_str("    }\n\n");

    for field in fields {
        let non_null = if field.cannot_be_null() { " @NonNull" } else { "" };
        if field.kind() == crate::field::FieldKind::String {
            out.push_str(&format!(
                "    public{non_null} String {name}() {{ return new String({field}, java.nio.charset.StandardCharsets.UTF_8); }}\n",
                non_null = non_null,
                name = field.name_camel(),
                field = field.name_camel(),
            ));
        } else {
            out.push_str(&format!(
                "    public{non_null} {ty} {name}() {{ return {name}; }}\n",
                non_null = non_null,
                ty = field.display_type(),
                name = field.name_camel(),
            ));
        }
    }
    out.push('\n');

    out.push_str("    @Override\n    public boolean equals(Object o) {\n");
    out.push_str(&format!("        if (!(o instanceof {} other)) return false;\n", class_name));
    for field in fields {
        out.push_str(&format!(
            "        if (!java.util.Objects.equals(this.{name}, other.{name})) return false;\n",
            name = field.name_camel()
        ));
    }
    out.push_str("        return true;\n    }\n\n");

    out.push_str("    @Override\n    public int hashCode() {\n");
    let hash_args: Vec<String> = fields.iter().map(|f| f.name_camel()).collect();
    out.push_str(&format!("        return java.util.Objects.hash({});\n    }}\n\n", hash_args.join(", ")));

    if !comparable_fields.is_empty() {
        out.push_str(&format!("    public int compareTo({} other) {{\n", class_name));
        out.push_str("        int c;\n");
        for name in comparable_fields {
            out.push_str(&format!(
                "        c = compareField(this.{name}, other.{name}); if (c != 0) return c;\n",
                name = crate::names::snake_to_camel(name, false)
            ));
        }
        out.push_str("        return 0;\n    }\n\n");
    }

    out.push_str(&format!(
        "    public static final {} DEFAULT = new {}(\n",
        class_name, class_name
    ));
    let defaults: Vec<String> = fields.iter().map(|f| format!("        {}", f.default_literal())).collect();
    out.push_str(&defaults.join(",\n"));
    out.push_str("\n    );\n");

    out.push_str("}\n");
    out
}
