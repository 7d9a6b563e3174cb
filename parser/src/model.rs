// Parsed IR for .proto files, before any name resolution.
// - A file has a package, its imports, and top-level messages and enums.
// - Messages keep their nested messages and enums nested.
// - Field types referencing other declarations are kept as written.
// - `map<K, V>` and `group` fields are already desugared the way protoc does.

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProtoFile {
    pub name: String,
    pub package: Option<String>,
    pub imports: Vec<String>,
    pub messages: Vec<MessageDef>,
    pub enums: Vec<EnumDef>,
}

// ---------------- Message & Fields ----------------

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MessageDef {
    pub name: String,
    pub fields: Vec<FieldDef>,
    pub messages: Vec<MessageDef>,
    pub enums: Vec<EnumDef>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub number: u32,
    pub label: Label,
    pub ty: FieldType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Label {
    #[default]
    Optional,
    Required,
    Repeated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Scalar(ScalarType),
    Named(String), // relative or `.`-absolute message/enum name
    Group(String), // name of the nested message holding the group body
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    Double,
    Float,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Sint32,
    Sint64,
    Fixed32,
    Fixed64,
    Sfixed32,
    Sfixed64,
    Bool,
    String,
    Bytes,
}

impl ScalarType {
    pub fn from_keyword(s: &str) -> Option<Self> {
        let ty = match s {
            "double" => ScalarType::Double,
            "float" => ScalarType::Float,
            "int32" => ScalarType::Int32,
            "int64" => ScalarType::Int64,
            "uint32" => ScalarType::Uint32,
            "uint64" => ScalarType::Uint64,
            "sint32" => ScalarType::Sint32,
            "sint64" => ScalarType::Sint64,
            "fixed32" => ScalarType::Fixed32,
            "fixed64" => ScalarType::Fixed64,
            "sfixed32" => ScalarType::Sfixed32,
            "sfixed64" => ScalarType::Sfixed64,
            "bool" => ScalarType::Bool,
            "string" => ScalarType::String,
            "bytes" => ScalarType::Bytes,
            _ => return None,
        };
        Some(ty)
    }
}

// ---------------- Enum ----------------

#[derive(Debug, Clone, PartialEq, Default)]
pub struct EnumDef {
    pub name: String,
    pub values: Vec<EnumValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumValue {
    pub name: String,
    pub number: i32,
}
