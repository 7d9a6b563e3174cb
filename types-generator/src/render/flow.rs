use super::{Renderer, record_body};
use crate::{Declaration, Primitive, TypeNode};

/// Flow exported type aliases. Every record property is optional; enums
/// become unions of string literals.
#[derive(Clone, Copy, Debug, Default)]
pub struct FlowRenderer;

impl FlowRenderer {
    fn type_expr(&self, ty: &TypeNode) -> String {
        match ty {
            TypeNode::Primitive(p) => primitive(p).to_string(),
            TypeNode::ArrayOf(element) => format!("Array<{}>", self.type_expr(element)),
            TypeNode::Reference(name) => name.clone(),
            TypeNode::Record(fields) => {
                record_body(fields, |f| format!("  {}?: {}", f.name, self.type_expr(&f.ty)))
            }
            TypeNode::Alternatives(values) => values
                .iter()
                .map(|v| format!("\"{v}\""))
                .collect::<Vec<_>>()
                .join(" | "),
        }
    }
}

fn primitive(p: &Primitive) -> &str {
    match p {
        Primitive::Float | Primitive::Integer => "number",
        Primitive::Boolean => "boolean",
        Primitive::String => "string",
        Primitive::Placeholder => "any",
        Primitive::Raw(name) => name,
    }
}

impl Renderer for FlowRenderer {
    fn banner(&self) -> &str {
        "/* @flow */"
    }

    fn declaration(&self, decl: &Declaration) -> String {
        format!("export type {} = {};", decl.name, self.type_expr(&decl.body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NamedField;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    fn field(name: &str, ty: TypeNode) -> NamedField {
        NamedField {
            name: name.into(),
            ty,
        }
    }

    #[test]
    fn record_properties_are_optional() {
        let decl = Declaration {
            name: "Person".into(),
            body: TypeNode::Record(vec![
                field("name", TypeNode::Primitive(Primitive::String)),
                field("age", TypeNode::Primitive(Primitive::Integer)),
                field("weight", TypeNode::Primitive(Primitive::Float)),
                field("active", TypeNode::Primitive(Primitive::Boolean)),
                field("tags", TypeNode::array_of(TypeNode::Primitive(Primitive::String))),
                field("extra", TypeNode::Primitive(Primitive::Placeholder)),
            ]),
        };
        assert_eq!(
            FlowRenderer.declaration(&decl),
            indoc! {"
                export type Person = {
                  name?: string,
                  age?: number,
                  weight?: number,
                  active?: boolean,
                  tags?: Array<string>,
                  extra?: any
                };"}
        );
    }

    #[test]
    fn enum_is_a_union_of_string_literals() {
        let decl = Declaration {
            name: "Status".into(),
            body: TypeNode::Alternatives(vec!["ACTIVE".into(), "INACTIVE".into()]),
        };
        assert_eq!(
            FlowRenderer.declaration(&decl),
            r#"export type Status = "ACTIVE" | "INACTIVE";"#
        );
    }

    #[test]
    fn inline_enum_inside_array() {
        let ty = TypeNode::array_of(TypeNode::Alternatives(vec!["A".into(), "B".into()]));
        assert_eq!(FlowRenderer.type_expr(&ty), r#"Array<"A" | "B">"#);
    }

    #[test]
    fn file_starts_with_flow_marker() {
        let decls = vec![Declaration {
            name: "Ping".into(),
            body: TypeNode::Record(vec![]),
        }];
        assert_eq!(
            FlowRenderer.render(&decls),
            "/* @flow */\nexport type Ping = {};\n\n"
        );
    }
}
