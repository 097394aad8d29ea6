//! The field model (Stage B): a uniform API over scalar/enum/message/
//! repeated/map/one-of/wrapper fields that hides the Single/OneOf/Map
//! branching from every emitter.

use crate::lookup::ArtifactKind;

/// Wire types from the protobuf encoding (§4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireType {
    Varint = 0,
    Fixed64 = 1,
    LengthDelimited = 2,
    Fixed32 = 5,
}

impl WireType {
    pub fn as_u32(self) -> u32 {
        self as u32
    }
}

/// A closed tagged union over every protobuf field kind, plus the two
/// composite sentinels `OneOf` and `Map` (§3.1). Each variant's wire type,
/// default literal, display type, and boxed form are fixed properties of
/// the kind, not per-instance data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Int32,
    UInt32,
    SInt32,
    Fixed32,
    SFixed32,
    Int64,
    UInt64,
    SInt64,
    Fixed64,
    SFixed64,
    Float,
    Double,
    Bool,
    String,
    Bytes,
    Enum,
    Message,
    OneOf,
    Map,
}

impl FieldKind {
    pub fn wire_type(self) -> WireType {
        use FieldKind::*;
        match self {
            Int32 | UInt32 | SInt32 | Int64 | UInt64 | SInt64 | Bool | Enum => WireType::Varint,
            Fixed64 | SFixed64 | Double => WireType::Fixed64,
            Fixed32 | SFixed32 | Float => WireType::Fixed32,
            String | Bytes | Message | Map => WireType::LengthDelimited,
            // A OneOf has no wire presence of its own; its children carry
            // the real tags. The sentinel value is never written to a
            // stream.
            OneOf => WireType::Varint,
        }
    }

    /// Default-value literal in the target artifact's source text.
    pub fn default_literal(self) -> &'static str {
        use FieldKind::*;
        match self {
            Int32 | SInt32 | Fixed32 | SFixed32 => "0",
            UInt32 => "0",
            Int64 | SInt64 | Fixed64 | SFixed64 => "0L",
            UInt64 => "0L",
            Float => "0.0f",
            Double => "0.0",
            Bool => "false",
            String => "\"\"",
            Bytes => "Bytes.EMPTY",
            Enum => "DEFAULT",
            Message => "null",
            OneOf => "UNSET",
            Map => "Collections.emptyMap()",
        }
    }

    /// Primitive/unboxed display type name.
    pub fn display_type(self) -> &'static str {
        use FieldKind::*;
        match self {
            Int32 | SInt32 | Fixed32 | SFixed32 | UInt32 => "int",
            Int64 | SInt64 | Fixed64 | SFixed64 | UInt64 => "long",
            Float => "float",
            Double => "double",
            Bool => "boolean",
            String => "String",
            Bytes => "Bytes",
            Enum => "Enum",
            Message => "Message",
            OneOf => "OneOf",
            Map => "Map",
        }
    }

    /// Boxed/object form, used where a nullable representation is needed
    /// (optional wrappers, generics).
    pub fn boxed_type(self) -> &'static str {
        use FieldKind::*;
        match self {
            Int32 | SInt32 | Fixed32 | SFixed32 | UInt32 => "Integer",
            Int64 | SInt64 | Fixed64 | SFixed64 | UInt64 => "Long",
            Float => "Float",
            Double => "Double",
            Bool => "Boolean",
            String => "String",
            Bytes => "Bytes",
            Enum => "Enum",
            Message => "Message",
            OneOf => "OneOf",
            Map => "Map",
        }
    }

    pub fn is_unsigned(self) -> bool {
        matches!(self, FieldKind::UInt32 | FieldKind::UInt64)
    }

    pub fn is_numeric(self) -> bool {
        use FieldKind::*;
        matches!(
            self,
            Int32 | UInt32 | SInt32 | Fixed32 | SFixed32 | Int64 | UInt64 | SInt64 | Fixed64 | SFixed64 | Float | Double
        )
    }
}

/// The nine `google.protobuf.*Value` wrapper types, modeled as boxed
/// primitives rather than imported message types (§9 design note).
pub const WRAPPER_TYPES: &[&str] = &[
    "google.protobuf.StringValue",
    "google.protobuf.Int32Value",
    "google.protobuf.UInt32Value",
    "google.protobuf.Int64Value",
    "google.protobuf.UInt64Value",
    "google.protobuf.FloatValue",
    "google.protobuf.DoubleValue",
    "google.protobuf.BoolValue",
    "google.protobuf.BytesValue",
];

/// A polymorphic field (§3.2): the three shapes an emitter actually walks.
#[derive(Debug, Clone)]
pub enum Field {
    Single(SingleField),
    OneOf(OneOfField),
    Map(MapField),
}

#[derive(Debug, Clone)]
pub struct SingleField {
    pub repeated: bool,
    pub kind: FieldKind,
    pub field_number: u32,
    pub name: String,
    /// Fully-qualified protobuf type name, present for `Message`/`Enum`.
    pub message_type: Option<String>,
    pub complete_class: Option<String>,
    pub doc: Option<String>,
    pub deprecated: bool,
    /// Name of the enclosing OneOf, if this field is one of its branches.
    pub parent_oneof: Option<String>,
    /// True for the synthetic key/value fields a `MapField` wraps.
    pub is_map_synthetic: bool,
}

#[derive(Debug, Clone)]
pub struct OneOfField {
    pub parent_message: String,
    pub name: String,
    pub doc: Option<String>,
    pub children: Vec<SingleField>,
    pub deprecated: bool,
    pub comparable: bool,
}

#[derive(Debug, Clone)]
pub struct MapField {
    pub key: Box<SingleField>,
    pub value: Box<SingleField>,
    pub field_number: u32,
    pub name: String,
    pub doc: Option<String>,
    pub deprecated: bool,
}

impl Field {
    pub fn kind(&self) -> FieldKind {
        match self {
            Field::Single(s) => s.kind,
            Field::OneOf(_) => FieldKind::OneOf,
            Field::Map(_) => FieldKind::Map,
        }
    }

    pub fn wire_type(&self) -> WireType {
        self.kind().wire_type()
    }

    /// Field number used for wire-format ordering. A OneOf's number is its
    /// first child's number (§3.2).
    pub fn field_number(&self) -> u32 {
        match self {
            Field::Single(s) => s.field_number,
            Field::OneOf(o) => o.children.first().map(|c| c.field_number).unwrap_or(0),
            Field::Map(m) => m.field_number,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Field::Single(s) => &s.name,
            Field::OneOf(o) => &o.name,
            Field::Map(m) => &m.name,
        }
    }

    pub fn name_camel(&self) -> String {
        crate::names::snake_to_camel(self.name(), false)
    }

    pub fn name_pascal(&self) -> String {
        crate::names::snake_to_camel(self.name(), true)
    }

    pub fn name_upper_snake(&self) -> String {
        crate::names::camel_to_upper_snake(&self.name_camel())
    }

    pub fn doc(&self) -> Option<&str> {
        match self {
            Field::Single(s) => s.doc.as_deref(),
            Field::OneOf(o) => o.doc.as_deref(),
            Field::Map(m) => m.doc.as_deref(),
        }
    }

    pub fn deprecated(&self) -> bool {
        match self {
            Field::Single(s) => s.deprecated,
            Field::OneOf(o) => o.deprecated,
            Field::Map(m) => m.deprecated,
        }
    }

    pub fn is_repeated(&self) -> bool {
        matches!(self, Field::Single(s) if s.repeated)
    }

    /// True for Singles of kind Message whose message-type is one of the
    /// nine Google wrapper types (§4.2).
    pub fn is_optional_wrapper(&self) -> bool {
        match self {
            Field::Single(s) if s.kind == FieldKind::Message => {
                s.message_type.as_deref().map(|t| WRAPPER_TYPES.contains(&t)).unwrap_or(false)
            }
            _ => false,
        }
    }

    /// True when the field's model accessor never returns null: repeated
    /// fields, string, bytes, map.
    pub fn cannot_be_null(&self) -> bool {
        match self {
            Field::Single(s) => s.repeated || matches!(s.kind, FieldKind::String | FieldKind::Bytes),
            Field::Map(_) => true,
            Field::OneOf(_) => false,
        }
    }

    /// Display type, accounting for repeated/optional-wrapper/map shaping.
    pub fn display_type(&self) -> String {
        match self {
            Field::Single(s) => {
                let base = if self.is_optional_wrapper() {
                    s.kind.boxed_type().to_string()
                } else if let Some(msg) = &s.message_type {
                    msg.rsplit('.').next().unwrap_or(msg).to_string()
                } else {
                    s.kind.display_type().to_string()
                };
                if s.repeated {
                    format!("List<{}>", base)
                } else {
                    base
                }
            }
            Field::OneOf(_) => "OneOf".to_string(),
            Field::Map(m) => format!("Map<{}, {}>", m.key.kind.boxed_type(), m.value.kind.boxed_type()),
        }
    }

    pub fn default_literal(&self) -> String {
        match self {
            Field::Single(s) if s.repeated => "Collections.emptyList()".to_string(),
            Field::Single(s) => s.kind.default_literal().to_string(),
            Field::OneOf(_) => "UNSET".to_string(),
            Field::Map(_) => "Collections.emptyMap()".to_string(),
        }
    }

    /// External module paths this field requires when referenced from the
    /// given artifact kind.
    pub fn import_contributions(&self, artifact: ArtifactKind) -> Vec<String> {
        let mut imports = Vec::new();
        let add_message_import = |imports: &mut Vec<String>, msg: &str| {
            if !msg.starts_with("google.protobuf.") {
                imports.push(msg.to_string());
            }
        };

        match self {
            Field::Single(s) => {
                if let Some(msg) = &s.message_type {
                    if !self.is_optional_wrapper() {
                        add_message_import(&mut imports, msg);
                    }
                }
                if s.repeated && matches!(artifact, ArtifactKind::Model) {
                    imports.push("java.util.List".to_string());
                }
            }
            Field::OneOf(o) => {
                for child in &o.children {
                    if let Some(msg) = &child.message_type {
                        add_message_import(&mut imports, msg);
                    }
                }
            }
            Field::Map(m) => {
                imports.push("java.util.Map".to_string());
                if let Some(msg) = &m.value.message_type {
                    add_message_import(&mut imports, msg);
                }
            }
        }
        imports
    }

    /// Per-field descriptor line(s) for the schema artifact: one for a
    /// scalar, three for a map (map itself, key, value), one per branch of
    /// a OneOf.
    pub fn field_definition_emission(&self) -> Vec<String> {
        match self {
            Field::Single(s) => vec![format!(
                "FieldDefinition.create(\"{}\", {}, {}, {})",
                s.name, s.field_number, format!("{:?}", s.kind), s.repeated
            )],
            Field::OneOf(o) => o
                .children
                .iter()
                .map(|c| {
                    format!(
                        "FieldDefinition.create(\"{}\", {}, {}, false)",
                        c.name, c.field_number, format!("{:?}", c.kind)
                    )
                })
                .collect(),
            Field::Map(m) => vec![
                format!("FieldDefinition.create(\"{}\", {}, MAP, false)", m.name, m.field_number),
                format!("FieldDefinition.create(\"{}.key\", 1, {:?}, false)", m.name, m.key.kind),
                format!("FieldDefinition.create(\"{}.value\", 2, {:?}, false)", m.name, m.value.kind),
            ],
        }
    }
}

/// Ordering outcome for comparable-field semantics (§4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Less,
    Equal,
    Greater,
}

/// Compare two `i32`/`i64` values as unsigned, used for `UInt32`/`UInt64`
/// comparator emission (native `==` still applies to equality).
pub fn compare_unsigned_i32(a: i32, b: i32) -> Order {
    match (a as u32).cmp(&(b as u32)) {
        std::cmp::Ordering::Less => Order::Less,
        std::cmp::Ordering::Equal => Order::Equal,
        std::cmp::Ordering::Greater => Order::Greater,
    }
}

pub fn compare_unsigned_i64(a: i64, b: i64) -> Order {
    match (a as u64).cmp(&(b as u64)) {
        std::cmp::Ordering::Less => Order::Less,
        std::cmp::Ordering::Equal => Order::Equal,
        std::cmp::Ordering::Greater => Order::Greater,
    }
}

/// IEEE-754 bitwise-consistent float ordering (NaN sorts as greater than
/// everything including +infinity, matching `Float.compare`/`Double.compare`
/// rather than IEEE comparison operators, so NaN behaves predictably in a
/// total order).
pub fn compare_f64(a: f64, b: f64) -> Order {
    match a.total_cmp(&b) {
        std::cmp::Ordering::Less => Order::Less,
        std::cmp::Ordering::Equal => Order::Equal,
        std::cmp::Ordering::Greater => Order::Greater,
    }
}

pub fn compare_f32(a: f32, b: f32) -> Order {
    match a.total_cmp(&b) {
        std::cmp::Ordering::Less => Order::Less,
        std::cmp::Ordering::Equal => Order::Equal,
        std::cmp::Ordering::Greater => Order::Greater,
    }
}

/// Content-equality, lexicographic order for strings and byte arrays.
pub fn compare_bytes(a: &[u8], b: &[u8]) -> Order {
    match a.cmp(b) {
        std::cmp::Ordering::Less => Order::Less,
        std::cmp::Ordering::Equal => Order::Equal,
        std::cmp::Ordering::Greater => Order::Greater,
    }
}

/// Null-ordering rule: null sorts first; null-and-null counts equal.
pub fn compare_nullable<T>(a: Option<&T>, b: Option<&T>, cmp: impl FnOnce(&T, &T) -> Order) -> Order {
    match (a, b) {
        (None, None) => Order::Equal,
        (None, Some(_)) => Order::Less,
        (Some(_), None) => Order::Greater,
        (Some(a), Some(b)) => cmp(a, b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_kind_wire_types_match_spec() {
        assert_eq!(FieldKind::Int32.wire_type(), WireType::Varint);
        assert_eq!(FieldKind::Fixed64.wire_type(), WireType::Fixed64);
        assert_eq!(FieldKind::Fixed32.wire_type(), WireType::Fixed32);
        assert_eq!(FieldKind::String.wire_type(), WireType::LengthDelimited);
        assert_eq!(FieldKind::Message.wire_type(), WireType::LengthDelimited);
        assert_eq!(FieldKind::Map.wire_type(), WireType::LengthDelimited);
    }

    #[test]
    fn unsigned_comparison_treats_high_bit_as_magnitude() {
        assert_eq!(compare_unsigned_i32(-1, 1), Order::Greater);
        assert_eq!(compare_unsigned_i64(-1, 1), Order::Greater);
    }

    #[test]
    fn nan_sorts_above_everything_via_total_cmp() {
        assert_eq!(compare_f64(f64::NAN, f64::INFINITY), Order::Greater);
        assert_eq!(compare_f64(f64::NAN, f64::NAN), Order::Equal);
    }

    #[test]
    fn null_sorts_first() {
        let a: Option<&i32> = None;
        let b = Some(&5);
        assert_eq!(compare_nullable(a, b, |x, y| compare_unsigned_i32(*x, *y)), Order::Less);
        assert_eq!(compare_nullable(b, a, |x, y| compare_unsigned_i32(*x, *y)), Order::Greater);
        assert_eq!(compare_nullable(a, a, |x, y| compare_unsigned_i32(*x, *y)), Order::Equal);
    }

    #[test]
    fn wrapper_field_is_optional_wrapper() {
        let f = Field::Single(SingleField {
            repeated: false,
            kind: FieldKind::Message,
            field_number: 1,
            name: "name".into(),
            message_type: Some("google.protobuf.StringValue".into()),
            complete_class: None,
            doc: None,
            deprecated: false,
            parent_oneof: None,
            is_map_synthetic: false,
        });
        assert!(f.is_optional_wrapper());
        assert!(!f.cannot_be_null());
    }

    #[test]
    fn map_field_cannot_be_null() {
        let f = Field::Map(MapField {
            key: Box::new(SingleField {
                repeated: false,
                kind: FieldKind::Int32,
                field_number: 1,
                name: "key".into(),
                message_type: None,
                complete_class: None,
                doc: None,
                deprecated: false,
                parent_oneof: None,
                is_map_synthetic: true,
            }),
            value: Box::new(SingleField {
                repeated: false,
                kind: FieldKind::String,
                field_number: 2,
                name: "value".into(),
                message_type: None,
                complete_class: None,
                doc: None,
                deprecated: false,
                parent_oneof: None,
                is_map_synthetic: true,
            }),
            field_number: 1,
            name: "m".into(),
            doc: None,
            deprecated: false,
        });
        assert!(f.cannot_be_null());
        assert_eq!(f.field_definition_emission().len(), 3);
    }
}
