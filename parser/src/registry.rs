//! Flattened, resolved view over parsed files.
//!
//! Every message and enum of every file is registered under its
//! fully-qualified name (`.package.Outer.Inner`), and every field that names
//! another declaration is resolved to a message or enum reference using
//! protobuf scoping rules.

use std::borrow::Cow;
use std::collections::HashMap;
use std::collections::hash_map::Entry;

use log::{debug, warn};

use crate::model::{
    EnumDef, EnumValue, FieldDef, FieldType, Label, MessageDef, ProtoFile, ScalarType,
};

/// Descriptor type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Double,
    Float,
    Int64,
    Uint64,
    Int32,
    Fixed64,
    Fixed32,
    Bool,
    String,
    Group,
    Message,
    Bytes,
    Uint32,
    Enum,
    Sfixed32,
    Sfixed64,
    Sint32,
    Sint64,
}

impl From<ScalarType> for FieldKind {
    fn from(ty: ScalarType) -> Self {
        match ty {
            ScalarType::Double => FieldKind::Double,
            ScalarType::Float => FieldKind::Float,
            ScalarType::Int32 => FieldKind::Int32,
            ScalarType::Int64 => FieldKind::Int64,
            ScalarType::Uint32 => FieldKind::Uint32,
            ScalarType::Uint64 => FieldKind::Uint64,
            ScalarType::Sint32 => FieldKind::Sint32,
            ScalarType::Sint64 => FieldKind::Sint64,
            ScalarType::Fixed32 => FieldKind::Fixed32,
            ScalarType::Fixed64 => FieldKind::Fixed64,
            ScalarType::Sfixed32 => FieldKind::Sfixed32,
            ScalarType::Sfixed64 => FieldKind::Sfixed64,
            ScalarType::Bool => FieldKind::Bool,
            ScalarType::String => FieldKind::String,
            ScalarType::Bytes => FieldKind::Bytes,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub number: u32,
    pub label: Label,
    /// `None` when the descriptor carries a type this crate does not know.
    pub kind: Option<FieldKind>,
    /// Referenced declaration for message, enum and group fields;
    /// `.`-absolute once resolved.
    pub type_name: Option<String>,
}

impl Field {
    pub fn is_repeated(&self) -> bool {
        self.label == Label::Repeated
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub name: String,
    pub full_name: String,
    pub package: Option<String>,
    pub file: String,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Enum {
    pub name: String,
    pub full_name: String,
    pub package: Option<String>,
    pub file: String,
    pub values: Vec<EnumValue>,
}

/// A file with its messages and enums flattened, nested ones included.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct File {
    pub name: String,
    pub package: Option<String>,
    pub dependencies: Vec<String>,
    pub messages: Vec<Message>,
    pub enums: Vec<Enum>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("no message named `{0}`")]
    Message(String),
    #[error("no enum named `{0}`")]
    Enum(String),
    #[error("no file named `{0}`")]
    File(String),
}

#[derive(Debug, Clone, Copy)]
enum Symbol {
    Message { file: usize, index: usize },
    Enum { file: usize, index: usize },
}

#[derive(Debug, Default)]
pub struct Registry {
    files: Vec<File>,
    file_index: HashMap<String, usize>,
    symbols: HashMap<String, Symbol>,
}

impl Registry {
    /// Registers every file, then resolves field references across all of them.
    pub fn from_files(files: Vec<ProtoFile>) -> Self {
        let mut registry = Registry::default();
        for proto in files {
            let file = flatten_file(proto);
            debug!(
                "registering {:?}: {} messages, {} enums",
                file.name,
                file.messages.len(),
                file.enums.len()
            );
            let file_idx = registry.files.len();
            for (index, m) in file.messages.iter().enumerate() {
                registry.define(&m.full_name, Symbol::Message { file: file_idx, index });
            }
            for (index, e) in file.enums.iter().enumerate() {
                registry.define(&e.full_name, Symbol::Enum { file: file_idx, index });
            }
            registry.file_index.insert(file.name.clone(), file_idx);
            registry.files.push(file);
        }
        registry.resolve_fields();
        registry
    }

    fn define(&mut self, full_name: &str, symbol: Symbol) {
        match self.symbols.entry(full_name.to_string()) {
            Entry::Vacant(slot) => {
                slot.insert(symbol);
            }
            Entry::Occupied(_) => {
                warn!("duplicate definition of {:?}, keeping the first", full_name);
            }
        }
    }

    fn resolve_fields(&mut self) {
        let symbols = &self.symbols;
        for file in self.files.iter_mut() {
            for message in file.messages.iter_mut() {
                let scope = message.full_name.as_str();
                for field in message.fields.iter_mut() {
                    resolve_field(symbols, scope, field);
                }
            }
        }
    }

    pub fn files(&self) -> impl Iterator<Item = &File> {
        self.files.iter()
    }

    pub fn lookup_file(&self, name: &str) -> Result<&File, LookupError> {
        self.file_index
            .get(name)
            .map(|&idx| &self.files[idx])
            .ok_or_else(|| LookupError::File(name.to_string()))
    }

    pub fn lookup_message(&self, name: &str) -> Result<&Message, LookupError> {
        match self.symbols.get(rooted(name).as_ref()) {
            Some(&Symbol::Message { file, index }) => Ok(&self.files[file].messages[index]),
            _ => Err(LookupError::Message(name.to_string())),
        }
    }

    pub fn lookup_enum(&self, name: &str) -> Result<&Enum, LookupError> {
        match self.symbols.get(rooted(name).as_ref()) {
            Some(&Symbol::Enum { file, index }) => Ok(&self.files[file].enums[index]),
            _ => Err(LookupError::Enum(name.to_string())),
        }
    }
}

fn rooted(name: &str) -> Cow<'_, str> {
    if name.starts_with('.') {
        Cow::Borrowed(name)
    } else {
        Cow::Owned(format!(".{name}"))
    }
}

fn resolve_field(symbols: &HashMap<String, Symbol>, scope: &str, field: &mut Field) {
    let Some(written) = field.type_name.clone() else {
        return;
    };
    match (field.kind, lookup_scoped(symbols, scope, &written)) {
        (Some(FieldKind::Group), Some((full_name, Symbol::Message { .. }))) => {
            field.type_name = Some(full_name);
        }
        (None, Some((full_name, Symbol::Message { .. }))) => {
            field.kind = Some(FieldKind::Message);
            field.type_name = Some(full_name);
        }
        (None, Some((full_name, Symbol::Enum { .. }))) => {
            field.kind = Some(FieldKind::Enum);
            field.type_name = Some(full_name);
        }
        (None, None) => {
            warn!(
                "field {:?} of {:?}: cannot resolve type {:?}",
                field.name, scope, written
            );
            field.kind = Some(FieldKind::Message);
        }
        _ => {}
    }
}

// Searches `name` from the innermost scope outwards, the way protoc does:
// `.a.B.C` + `D` tries `.a.B.C.D`, `.a.B.D`, `.a.D`, `.D`.
fn lookup_scoped(
    symbols: &HashMap<String, Symbol>,
    scope: &str,
    name: &str,
) -> Option<(String, Symbol)> {
    if name.starts_with('.') {
        return symbols.get(name).map(|&s| (name.to_string(), s));
    }
    let mut scope = scope;
    loop {
        let candidate = format!("{scope}.{name}");
        if let Some(&symbol) = symbols.get(&candidate) {
            return Some((candidate, symbol));
        }
        if scope.is_empty() {
            return None;
        }
        scope = scope.rfind('.').map_or("", |idx| &scope[..idx]);
    }
}

fn flatten_file(proto: ProtoFile) -> File {
    let mut file = File {
        name: proto.name,
        package: proto.package,
        dependencies: proto.imports,
        ..File::default()
    };
    let root = match &file.package {
        Some(pkg) => format!(".{pkg}"),
        None => String::new(),
    };
    register_messages(&mut file, &root, proto.messages);
    register_enums(&mut file, &root, proto.enums);
    file
}

// Messages are registered in pre-order; the enums nested in a message are
// registered right after its nested messages, before any later sibling.
fn register_messages(file: &mut File, outer: &str, defs: Vec<MessageDef>) {
    for def in defs {
        let full_name = format!("{outer}.{}", def.name);
        file.messages.push(Message {
            name: def.name,
            full_name: full_name.clone(),
            package: file.package.clone(),
            file: file.name.clone(),
            fields: def.fields.into_iter().map(unresolved_field).collect(),
        });
        register_messages(file, &full_name, def.messages);
        register_enums(file, &full_name, def.enums);
    }
}

fn register_enums(file: &mut File, outer: &str, defs: Vec<EnumDef>) {
    for def in defs {
        file.enums.push(Enum {
            full_name: format!("{outer}.{}", def.name),
            name: def.name,
            package: file.package.clone(),
            file: file.name.clone(),
            values: def.values,
        });
    }
}

fn unresolved_field(def: FieldDef) -> Field {
    let (kind, type_name) = match def.ty {
        FieldType::Scalar(ty) => (Some(ty.into()), None),
        FieldType::Named(name) => (None, Some(name)),
        FieldType::Group(name) => (Some(FieldKind::Group), Some(name)),
    };
    Field {
        name: def.name,
        number: def.number,
        label: def.label,
        kind,
        type_name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_proto_str;
    use pretty_assertions::assert_eq;

    fn registry(sources: &[(&str, &str)]) -> Registry {
        let files = sources
            .iter()
            .map(|(name, src)| parse_proto_str(name, src).expect("parse failed"))
            .collect();
        Registry::from_files(files)
    }

    fn field<'a>(message: &'a Message, name: &str) -> &'a Field {
        message.fields.iter().find(|f| f.name == name).unwrap()
    }

    const SHOP: &str = r#"
        syntax = "proto3";
        package shop;

        enum Currency { EUR = 0; USD = 1; }

        message Order {
            message Line {
                string sku = 1;
                Kind kind = 2;
                enum Kind { GOODS = 0; SERVICE = 1; }
            }
            repeated Line lines = 1;
            Currency currency = 2;
            Order.Line first = 3;
            .shop.Customer customer = 4;
        }

        message Customer { string name = 1; }
    "#;

    #[test]
    fn flattens_in_registration_order() {
        let reg = registry(&[("shop.proto", SHOP)]);
        let file = reg.lookup_file("shop.proto").unwrap();
        let messages: Vec<&str> = file.messages.iter().map(|m| m.full_name.as_str()).collect();
        assert_eq!(messages, vec![".shop.Order", ".shop.Order.Line", ".shop.Customer"]);
        let enums: Vec<&str> = file.enums.iter().map(|e| e.full_name.as_str()).collect();
        assert_eq!(enums, vec![".shop.Order.Line.Kind", ".shop.Currency"]);
    }

    #[test]
    fn resolves_relative_and_absolute_references() {
        let reg = registry(&[("shop.proto", SHOP)]);
        let order = reg.lookup_message(".shop.Order").unwrap();

        let lines = field(order, "lines");
        assert_eq!(lines.kind, Some(FieldKind::Message));
        assert_eq!(lines.type_name.as_deref(), Some(".shop.Order.Line"));

        let currency = field(order, "currency");
        assert_eq!(currency.kind, Some(FieldKind::Enum));
        assert_eq!(currency.type_name.as_deref(), Some(".shop.Currency"));

        assert_eq!(field(order, "first").type_name.as_deref(), Some(".shop.Order.Line"));
        assert_eq!(field(order, "customer").type_name.as_deref(), Some(".shop.Customer"));

        let line = reg.lookup_message("shop.Order.Line").unwrap();
        let kind = field(line, "kind");
        assert_eq!(kind.kind, Some(FieldKind::Enum));
        assert_eq!(kind.type_name.as_deref(), Some(".shop.Order.Line.Kind"));
    }

    #[test]
    fn resolves_across_files() {
        let common = r#"
            syntax = "proto3";
            package shop.common;
            message Money { int64 cents = 1; }
        "#;
        let billing = r#"
            syntax = "proto3";
            package shop.billing;
            import "common.proto";
            message Invoice { shop.common.Money total = 1; common.Money tax = 2; }
        "#;
        let reg = registry(&[("common.proto", common), ("billing.proto", billing)]);
        let invoice = reg.lookup_message(".shop.billing.Invoice").unwrap();
        assert_eq!(field(invoice, "total").type_name.as_deref(), Some(".shop.common.Money"));
        assert_eq!(field(invoice, "tax").type_name.as_deref(), Some(".shop.common.Money"));
        assert_eq!(
            reg.lookup_file("billing.proto").unwrap().dependencies,
            vec!["common.proto".to_string()]
        );
    }

    #[test]
    fn unresolved_reference_is_kept_as_message() {
        let reg = registry(&[(
            "a.proto",
            "syntax = \"proto3\"; message A { Missing m = 1; }",
        )]);
        let a = reg.lookup_message(".A").unwrap();
        let m = field(a, "m");
        assert_eq!(m.kind, Some(FieldKind::Message));
        assert_eq!(m.type_name.as_deref(), Some("Missing"));
        assert_eq!(
            reg.lookup_message("Missing").unwrap_err(),
            LookupError::Message("Missing".into())
        );
    }

    #[test]
    fn group_reference_points_at_nested_message() {
        let reg = registry(&[(
            "g.proto",
            "syntax = \"proto2\"; package g; message R { repeated group Hit = 1 { optional string url = 2; } }",
        )]);
        let r = reg.lookup_message(".g.R").unwrap();
        let hit = field(r, "hit");
        assert_eq!(hit.kind, Some(FieldKind::Group));
        assert_eq!(hit.type_name.as_deref(), Some(".g.R.Hit"));
        assert!(hit.is_repeated());
    }

    #[test]
    fn lookups_distinguish_kinds() {
        let reg = registry(&[("shop.proto", SHOP)]);
        assert!(reg.lookup_enum(".shop.Currency").is_ok());
        assert_eq!(
            reg.lookup_message(".shop.Currency").unwrap_err(),
            LookupError::Message(".shop.Currency".into())
        );
        assert_eq!(
            reg.lookup_enum(".shop.Order").unwrap_err(),
            LookupError::Enum(".shop.Order".into())
        );
        assert_eq!(
            reg.lookup_file("other.proto").unwrap_err(),
            LookupError::File("other.proto".into())
        );
        assert_eq!(reg.files().count(), 1);
    }
}
