mod model;
mod registry;

use heck::ToUpperCamelCase;
use log::{debug, warn};
use pest::Parser as _;
use pest::iterators::Pair;
use pest_derive::Parser;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

pub use model::*;
pub use registry::*;

const MAX_FIELD_NUMBER: u32 = (1 << 29) - 1;

#[derive(Parser)]
#[grammar = "resources/proto.pest"] // Path relative to the crate root
pub struct ProtoParser;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Syntax(Box<pest::error::Error<Rule>>),
    #[error("{0}")]
    Message(&'static str),
}

impl From<pest::error::Error<Rule>> for ParseError {
    fn from(e: pest::error::Error<Rule>) -> Self {
        Self::Syntax(Box::new(e))
    }
}

// Public API: parse a .proto file into the ProtoFile IR.
// The file is named after the path as given, with '/' separators.
pub fn parse_proto_file<P: AsRef<Path>>(path: P) -> Result<ProtoFile, ParseError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    parse_proto_str(&path_to_name(path), &content)
}

pub fn parse_proto_str(name: &str, content: &str) -> Result<ProtoFile, ParseError> {
    let mut pairs =
        ProtoParser::parse(Rule::proto, content).map_err(|e| e.with_path(name))?;
    let proto_pair = pairs
        .next()
        .ok_or(ParseError::Message("expected proto root"))?;
    let file = parse_proto(name, proto_pair)?;
    debug!(
        "parsed {:?}: {} messages, {} enums",
        file.name,
        file.messages.len(),
        file.enums.len()
    );
    Ok(file)
}

/// Parses `root` and every file it imports, transitively.
///
/// Imports are looked up in the root file's directory first, then in
/// `include_dirs` in order. An import that cannot be found is skipped; the
/// types it would have provided stay unresolved. Files are returned
/// dependencies first, each once; imported files are named after their
/// import path.
pub fn parse_proto_tree<P: AsRef<Path>>(
    root: P,
    include_dirs: &[PathBuf],
) -> Result<Vec<ProtoFile>, ParseError> {
    let root = root.as_ref();
    let mut search: Vec<PathBuf> = root.parent().map(Path::to_path_buf).into_iter().collect();
    search.extend(include_dirs.iter().cloned());

    let file = parse_proto_file(root)?;
    let mut seen = HashSet::from([file.name.clone()]);
    let mut files = Vec::new();
    load_imports(&file, &search, &mut seen, &mut files)?;
    files.push(file);
    Ok(files)
}

fn load_imports(
    file: &ProtoFile,
    search: &[PathBuf],
    seen: &mut HashSet<String>,
    out: &mut Vec<ProtoFile>,
) -> Result<(), ParseError> {
    for import in &file.imports {
        if !seen.insert(import.clone()) {
            continue;
        }
        let Some(path) = search.iter().map(|d| d.join(import)).find(|p| p.is_file()) else {
            warn!("import {:?} of {:?} not found", import, file.name);
            continue;
        };
        let content = fs::read_to_string(&path)?;
        let dep = parse_proto_str(import, &content)?;
        load_imports(&dep, search, seen, out)?;
        out.push(dep);
    }
    Ok(())
}

fn path_to_name(p: &Path) -> String {
    p.to_string_lossy().replace('\\', "/")
}

fn parse_proto(name: &str, pair: Pair<Rule>) -> Result<ProtoFile, ParseError> {
    let mut file = ProtoFile {
        name: name.to_string(),
        ..ProtoFile::default()
    };

    for inner in pair.into_inner() {
        if inner.as_rule() != Rule::proto_body {
            continue;
        }
        for b in inner.into_inner() {
            match b.as_rule() {
                Rule::package_statement => {
                    // package_statement = { "package" ~ package_name ~ ";" }
                    file.package = b
                        .into_inner()
                        .find(|p| p.as_rule() == Rule::package_name)
                        .and_then(|p| p.into_inner().find(|x| x.as_rule() == Rule::full_ident))
                        .map(|p| p.as_str().to_string());
                }
                Rule::import_statement => {
                    if let Some(path) = b.into_inner().find(|p| p.as_rule() == Rule::string_literal)
                    {
                        file.imports.push(unquote(path.as_str()));
                    }
                }
                Rule::top_level_definition => {
                    for def in b.into_inner() {
                        match def.as_rule() {
                            Rule::message_block => file.messages.push(parse_message_block(def)?),
                            Rule::enum_block => file.enums.push(parse_enum_block(def)?),
                            // services and extensions are not modelled
                            _ => {}
                        }
                    }
                }
                _ => {}
            }
        }
    }

    Ok(file)
}

fn unquote(s: &str) -> String {
    s.get(1..s.len().saturating_sub(1)).unwrap_or_default().to_string()
}

fn parse_message_block(block: Pair<Rule>) -> Result<MessageDef, ParseError> {
    // message_block = { "message" ~ message_name ~ message_body }
    let mut message = MessageDef::default();
    for p in block.into_inner() {
        match p.as_rule() {
            Rule::message_name => message.name = p.as_str().to_string(),
            Rule::message_body => parse_message_body(p, &mut message)?,
            _ => {}
        }
    }
    Ok(message)
}

fn parse_message_body(body: Pair<Rule>, message: &mut MessageDef) -> Result<(), ParseError> {
    for elem in body.into_inner() {
        if elem.as_rule() == Rule::message_element {
            for inner in elem.into_inner() {
                parse_message_element(inner, message)?;
            }
        }
    }
    Ok(())
}

fn parse_message_element(inner: Pair<Rule>, message: &mut MessageDef) -> Result<(), ParseError> {
    match inner.as_rule() {
        Rule::field => {
            if let Some(field) = parse_field(inner)? {
                message.fields.push(field);
            }
        }
        Rule::map_field => parse_map_field(inner, message)?,
        Rule::group_field => parse_group_field(inner, message)?,
        Rule::oneof => {
            // Flatten oneof fields into message fields (no grouping in IR)
            for oneof_inner in inner.into_inner() {
                if oneof_inner.as_rule() == Rule::oneof_field {
                    for f in oneof_inner.into_inner() {
                        parse_message_element(f, message)?;
                    }
                }
            }
        }
        Rule::message_block => message.messages.push(parse_message_block(inner)?),
        Rule::enum_block => message.enums.push(parse_enum_block(inner)?),
        _ => {}
    }
    Ok(())
}

fn parse_field(pair: Pair<Rule>) -> Result<Option<FieldDef>, ParseError> {
    // field = { field_modifier? ~ type_reference ~ field_name ~ "=" ~ tag ~ field_options? ~ ";" }
    let mut label = Label::Optional;
    let mut ty_opt: Option<FieldType> = None;
    let mut name_opt: Option<String> = None;
    let mut number_opt: Option<u32> = None;

    for p in pair.into_inner() {
        match p.as_rule() {
            Rule::field_modifier => label = parse_label(p.as_str()),
            Rule::type_reference => ty_opt = parse_type_reference(p),
            Rule::field_name => name_opt = Some(p.as_str().to_string()),
            Rule::tag => number_opt = Some(field_number(p.as_str())?),
            _ => {}
        }
    }

    Ok(match (ty_opt, name_opt, number_opt) {
        (Some(ty), Some(name), Some(number)) => Some(FieldDef {
            name,
            number,
            label,
            ty,
        }),
        _ => None,
    })
}

// Field numbers are positive 29-bit values.
fn field_number(tag: &str) -> Result<u32, ParseError> {
    u32::try_from(parse_integer_value(tag))
        .ok()
        .filter(|n| (1..=MAX_FIELD_NUMBER).contains(n))
        .ok_or(ParseError::Message("field number out of range"))
}

// map<K, V> name = N;  =>  repeated NameEntry name = N;
// plus  message NameEntry { K key = 1; V value = 2; }
fn parse_map_field(pair: Pair<Rule>, message: &mut MessageDef) -> Result<(), ParseError> {
    let mut key: Option<ScalarType> = None;
    let mut value: Option<FieldType> = None;
    let mut name_opt: Option<String> = None;
    let mut number_opt: Option<u32> = None;

    for p in pair.into_inner() {
        match p.as_rule() {
            Rule::scalar_type => key = ScalarType::from_keyword(p.as_str()),
            Rule::type_reference => value = parse_type_reference(p),
            Rule::field_name => name_opt = Some(p.as_str().to_string()),
            Rule::tag => number_opt = Some(field_number(p.as_str())?),
            _ => {}
        }
    }

    let (Some(key), Some(value), Some(name), Some(number)) = (key, value, name_opt, number_opt)
    else {
        return Ok(());
    };

    let entry = format!("{}Entry", name.to_upper_camel_case());
    message.messages.push(MessageDef {
        name: entry.clone(),
        fields: vec![
            FieldDef {
                name: "key".to_string(),
                number: 1,
                label: Label::Optional,
                ty: FieldType::Scalar(key),
            },
            FieldDef {
                name: "value".to_string(),
                number: 2,
                label: Label::Optional,
                ty: value,
            },
        ],
        ..MessageDef::default()
    });
    message.fields.push(FieldDef {
        name,
        number,
        label: Label::Repeated,
        ty: FieldType::Named(entry),
    });
    Ok(())
}

// repeated group Result = N { ... }  =>  repeated group result = N;  plus  message Result { ... }
fn parse_group_field(pair: Pair<Rule>, message: &mut MessageDef) -> Result<(), ParseError> {
    let mut label = Label::Optional;
    let mut group = MessageDef::default();
    let mut number_opt: Option<u32> = None;

    for p in pair.into_inner() {
        match p.as_rule() {
            Rule::field_modifier => label = parse_label(p.as_str()),
            Rule::group_name => group.name = p.as_str().to_string(),
            Rule::tag => number_opt = Some(field_number(p.as_str())?),
            Rule::message_body => parse_message_body(p, &mut group)?,
            _ => {}
        }
    }

    let Some(number) = number_opt else {
        return Ok(());
    };
    message.fields.push(FieldDef {
        name: group.name.to_lowercase(),
        number,
        label,
        ty: FieldType::Group(group.name.clone()),
    });
    message.messages.push(group);
    Ok(())
}

fn parse_enum_block(block: Pair<Rule>) -> Result<EnumDef, ParseError> {
    // enum_block = { "enum" ~ enum_name ~ "{" ~ enum_body* ~ "}" }
    let mut en = EnumDef::default();

    for p in block.into_inner() {
        match p.as_rule() {
            Rule::enum_name => en.name = p.as_str().to_string(),
            Rule::enum_body => {
                for eb in p.into_inner() {
                    if eb.as_rule() == Rule::enum_field {
                        let mut val_name: Option<String> = None;
                        let mut number: Option<i32> = None;
                        for ef in eb.into_inner() {
                            match ef.as_rule() {
                                Rule::enum_field_name => val_name = Some(ef.as_str().to_string()),
                                Rule::enum_field_value => {
                                    let value = parse_integer_value(ef.as_str());
                                    number = Some(i32::try_from(value).map_err(|_| {
                                        ParseError::Message("enum value out of range")
                                    })?);
                                }
                                _ => {}
                            }
                        }
                        if let (Some(vn), Some(num)) = (val_name, number) {
                            en.values.push(EnumValue {
                                name: vn,
                                number: num,
                            });
                        }
                    }
                }
            }
            _ => {}
        }
    }

    Ok(en)
}

fn parse_label(s: &str) -> Label {
    match s {
        "repeated" => Label::Repeated,
        "required" => Label::Required,
        _ => Label::Optional,
    }
}

fn parse_type_reference(pair: Pair<Rule>) -> Option<FieldType> {
    // type_reference = { scalar_type | message_type }
    let first = pair.into_inner().next()?;
    match first.as_rule() {
        Rule::scalar_type => ScalarType::from_keyword(first.as_str()).map(FieldType::Scalar),
        _ => Some(FieldType::Named(first.as_str().to_string())),
    }
}

fn parse_integer_value(s: &str) -> i64 {
    // dec|hex|oct with optional minus; out-of-range values saturate
    let (neg, rest) = match s.strip_prefix('-') {
        Some(stripped) => (true, stripped),
        None => (false, s),
    };
    let val: i128 = if let Some(hex) = rest.strip_prefix("0x").or_else(|| rest.strip_prefix("0X")) {
        i128::from_str_radix(hex, 16).unwrap_or(0)
    } else if rest.starts_with('0') && rest.len() > 1 {
        i128::from_str_radix(&rest[1..], 8).unwrap_or(0)
    } else {
        rest.parse::<i128>().unwrap_or(0)
    };
    let signed = if neg { -val } else { val };
    signed.clamp(i64::MIN as i128, i64::MAX as i128) as i64
}
