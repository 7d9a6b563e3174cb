//! Field descriptor to type tree mapping.

use log::trace;
use parser::{Field, FieldKind, LookupError, Message, Registry};

use crate::enums::materialize;
use crate::naming::{enum_name, message_name};
use crate::{Config, NamedField, Primitive, SchemaResolutionError, TypeNode};

/// Maps one field of `owner` to a named type.
///
/// Message and enum references are looked up in `registry`; a failed lookup
/// is an error. Kinds without a faithful mapping degrade instead of failing:
/// bytes become strings, groups a placeholder, and unknown kinds their raw
/// type name.
pub fn map_field(
    field: &Field,
    owner: &Message,
    registry: &Registry,
    config: &Config,
) -> Result<NamedField, SchemaResolutionError> {
    let type_name = field.type_name.as_deref().unwrap_or_default();
    let base = match field.kind {
        Some(FieldKind::Double | FieldKind::Float) => TypeNode::Primitive(Primitive::Float),
        Some(
            FieldKind::Int64
            | FieldKind::Uint64
            | FieldKind::Int32
            | FieldKind::Fixed64
            | FieldKind::Fixed32
            | FieldKind::Uint32
            | FieldKind::Sfixed32
            | FieldKind::Sfixed64
            | FieldKind::Sint32
            | FieldKind::Sint64,
        ) => TypeNode::Primitive(Primitive::Integer),
        Some(FieldKind::Bool) => TypeNode::Primitive(Primitive::Boolean),
        Some(FieldKind::String) => TypeNode::Primitive(Primitive::String),
        Some(FieldKind::Bytes) => bytes_as_string(),
        Some(FieldKind::Group) => TypeNode::Primitive(Primitive::Placeholder),
        Some(FieldKind::Message) => {
            let message = registry
                .lookup_message(type_name)
                .map_err(|e| unresolved(owner, field, e))?;
            TypeNode::Reference(message_name(message, config))
        }
        Some(FieldKind::Enum) => {
            let en = registry
                .lookup_enum(type_name)
                .map_err(|e| unresolved(owner, field, e))?;
            if config.inline_enums() {
                materialize(en)
            } else {
                TypeNode::Reference(enum_name(en, config))
            }
        }
        None => TypeNode::Primitive(Primitive::Raw(type_name.to_string())),
    };

    let ty = if field.is_repeated() {
        TypeNode::array_of(base)
    } else {
        base
    };
    trace!("    field: {:?}, type: {:?}", field.name, ty);

    Ok(NamedField {
        name: field.name.clone(),
        ty,
    })
}

// Binary payloads are typed as text; consumers receive them encoded.
fn bytes_as_string() -> TypeNode {
    TypeNode::Primitive(Primitive::String)
}

fn unresolved(owner: &Message, field: &Field, source: LookupError) -> SchemaResolutionError {
    SchemaResolutionError::Field {
        message: owner.full_name.clone(),
        field: field.name.clone(),
        type_name: field.type_name.clone().unwrap_or_default(),
        source,
    }
}
