//! Configuration for type generation.

/// Output syntax.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Dialect {
    /// Elm records and union types.
    #[default]
    Elm,
    /// Flow type annotations.
    Flow,
}

#[derive(Clone, Debug, Default)]
pub struct Config {
    pub(crate) dialect: Dialect,
    /// Keep the package prefix on every type name
    pub(crate) always_qualify_type_names: bool,
    /// Inline enum alternatives at use sites (Flow only)
    pub(crate) embed_enums: bool,
}

impl Config {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            ..Self::default()
        }
    }

    /// Set whether type names always keep their package prefix.
    pub fn always_qualify_type_names(mut self, value: bool) -> Self {
        self.always_qualify_type_names = value;
        self
    }

    /// Set whether enum-typed fields inline the enum's alternatives.
    /// Ignored for [`Dialect::Elm`].
    pub fn embed_enums(mut self, value: bool) -> Self {
        self.embed_enums = value;
        self
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub(crate) fn inline_enums(&self) -> bool {
        self.embed_enums && self.dialect == Dialect::Flow
    }
}
