//! JSON codec emitter: symmetric to the binary codec, but using protobuf's
//! JSON mapping — `lowerCamelCase` names, 64-bit ints as strings, bytes as
//! base64, enums by ordinal name (§4.6).

use crate::field::{Field, FieldKind};

pub fn emit(class_name: &str, fields: &[Field]) -> String {
    let mut out = String::new();
    out.push_str(&format!("public final class {}JsonCodec {{\n\n", class_name));

    out.push_str(&format!("    public static String write({} value) {{\n", class_name));
    out.push_str("        var json = new JsonObjectBuilder();\n");
    for field in fields {
        let json_name = field.name_camel();
        match field {
            Field::Single(s) if matches!(s.kind, FieldKind::Int64 | FieldKind::UInt64 | FieldKind::SInt64 | FieldKind::Fixed64 | FieldKind::SFixed64) => {
                out.push_str(&format!(
                    "        json.put(\"{json}\", String.valueOf(value.{getter}()));\n",
                    json = json_name,
                    getter = field.name_camel()
                ));
            }
            Field::Single(s) if s.kind == FieldKind::Bytes => {
                out.push_str(&format!(
                    "        json.put(\"{json}\", base64(value.{getter}()));\n",
                    json = json_name,
                    getter = field.name_camel()
                ));
            }
            Field::Single(s) if s.kind == FieldKind::Enum => {
                out.push_str(&format!(
                    "        json.put(\"{json}\", value.{getter}().protoName());\n",
                    json = json_name,
                    getter = field.name_camel()
                ));
            }
            _ => {
                out.push_str(&format!(
                    "        json.put(\"{json}\", value.{getter}());\n",
                    json = json_name,
                    getter = field.name_camel()
                ));
            }
        }
    }
    out.push_str("        return json.build();\n    }\n\n");

    out.push_str(&format!("    public static {} parse(String json) {{\n", class_name));
    out.push_str("        var obj = JsonObject.parse(json);\n");
    out.push_str("        var builder = new Builder();\n");
    for field in fields {
        out.push_str(&format!(
            "        if (obj.has(\"{json}\")) builder.{setter}(readJsonField(obj, \"{json}\"));\n",
            json = field.name_camel(),
            setter = field.name_camel()
        ));
    }
    out.push_str("        return builder.build();\n    }\n");

    out.push_str("}\n");
    out
}
