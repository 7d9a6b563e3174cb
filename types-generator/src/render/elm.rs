use super::{Renderer, record_body};
use crate::{Declaration, Primitive, TypeNode};

/// Elm type aliases for records, union types for enums. Every record field
/// is wrapped in `Maybe`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ElmRenderer;

impl ElmRenderer {
    fn type_expr(&self, ty: &TypeNode) -> String {
        match ty {
            TypeNode::Primitive(p) => primitive(p).to_string(),
            TypeNode::ArrayOf(element) => format!("List {}", self.atom(element)),
            TypeNode::Reference(name) => name.clone(),
            TypeNode::Record(fields) => record_body(fields, |f| {
                format!("  {}: Maybe {}", f.name, self.atom(&f.ty))
            }),
            TypeNode::Alternatives(values) => values.join(" | "),
        }
    }

    // Type applications need parentheses when they are arguments.
    fn atom(&self, ty: &TypeNode) -> String {
        let expr = self.type_expr(ty);
        let compound = match ty {
            TypeNode::ArrayOf(_) => true,
            TypeNode::Alternatives(values) => values.len() > 1,
            TypeNode::Primitive(Primitive::Raw(name)) => name.contains(' '),
            _ => false,
        };
        if compound { format!("({expr})") } else { expr }
    }
}

fn primitive(p: &Primitive) -> &str {
    match p {
        Primitive::Float => "Float",
        Primitive::Integer => "Int",
        // Elm's core boolean type; `Boolean` would not resolve.
        Primitive::Boolean => "Bool",
        Primitive::String => "String",
        Primitive::Placeholder => "?",
        Primitive::Raw(name) => name,
    }
}

impl Renderer for ElmRenderer {
    fn banner(&self) -> &str {
        "-- this is a generated file"
    }

    fn declaration(&self, decl: &Declaration) -> String {
        if decl.is_alias() {
            format!("type alias {} =\n{}", decl.name, self.type_expr(&decl.body))
        } else {
            format!("type {} = {}", decl.name, self.type_expr(&decl.body))
        }
    }
}
