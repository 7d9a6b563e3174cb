use log::debug;
use parser::Enum;

use crate::naming::enum_name;
use crate::{Config, Declaration, TypeNode};

/// The enum's value names as a closed set of alternatives, in declared order.
pub fn materialize(en: &Enum) -> TypeNode {
    TypeNode::Alternatives(en.values.iter().map(|v| v.name.clone()).collect())
}

pub(crate) fn enum_declaration(en: &Enum, config: &Config) -> Declaration {
    debug!("  enum: {:?}", en.full_name);
    Declaration {
        name: enum_name(en, config),
        body: materialize(en),
    }
}
