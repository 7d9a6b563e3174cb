//! Dialect-neutral type tree built from a schema file.

/// Leaf types. Each renderer picks its own token for every variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Primitive {
    Float,
    Integer,
    Boolean,
    String,
    /// Stand-in for legacy group fields, which are not materialized.
    Placeholder,
    /// Verbatim type name for field kinds this generator does not know.
    Raw(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeNode {
    Primitive(Primitive),
    ArrayOf(Box<TypeNode>),
    /// Public name of another declaration.
    Reference(String),
    Record(Vec<NamedField>),
    /// Closed set of enum value names, in declaration order.
    Alternatives(Vec<String>),
}

impl TypeNode {
    pub fn array_of(element: TypeNode) -> Self {
        TypeNode::ArrayOf(Box::new(element))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedField {
    pub name: String,
    pub ty: TypeNode,
}

/// One emitted top-level type, from a message or an enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub body: TypeNode,
}

impl Declaration {
    /// Record bodies are structural aliases; everything else is a
    /// nominal type in dialects that tell the two apart.
    pub fn is_alias(&self) -> bool {
        matches!(self.body, TypeNode::Record(_))
    }
}
