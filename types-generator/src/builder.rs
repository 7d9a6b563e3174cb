use log::debug;
use parser::{File, Message, Registry};

use crate::enums::enum_declaration;
use crate::mapper::map_field;
use crate::naming::message_name;
use crate::{Config, Declaration, SchemaResolutionError, TypeNode};

/// Builds one declaration per enum, then one per message, each group in the
/// order the file declares them.
///
/// Stops at the first field that cannot be resolved; nothing is returned for
/// the file in that case.
pub fn build_declarations(
    file: &File,
    registry: &Registry,
    config: &Config,
) -> Result<Vec<Declaration>, SchemaResolutionError> {
    debug!("file: {:?}, package: {:?}", file.name, file.package);

    let mut declarations = Vec::with_capacity(file.enums.len() + file.messages.len());
    for en in &file.enums {
        declarations.push(enum_declaration(en, config));
    }
    for message in &file.messages {
        declarations.push(message_declaration(message, registry, config)?);
    }
    Ok(declarations)
}

fn message_declaration(
    message: &Message,
    registry: &Registry,
    config: &Config,
) -> Result<Declaration, SchemaResolutionError> {
    debug!("  message: {:?}", message.full_name);
    let fields = message
        .fields
        .iter()
        .map(|field| map_field(field, message, registry, config))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Declaration {
        name: message_name(message, config),
        body: TypeNode::Record(fields),
    })
}
