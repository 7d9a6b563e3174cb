//! Serializes declarations into dialect source text.

mod elm;
mod flow;

pub use elm::ElmRenderer;
pub use flow::FlowRenderer;

use crate::{Declaration, Dialect, NamedField};

/// One output syntax. Renderers see every declaration in the order given
/// and never reorder, merge, or drop any of them.
pub trait Renderer {
    /// Generated-file marker placed on the first line.
    fn banner(&self) -> &str;

    /// A single top-level declaration, without trailing newline.
    fn declaration(&self, decl: &Declaration) -> String;

    fn render(&self, declarations: &[Declaration]) -> String {
        let mut out = String::new();
        out.push_str(self.banner());
        out.push('\n');
        for decl in declarations {
            out.push_str(&self.declaration(decl));
            out.push_str("\n\n");
        }
        out
    }
}

pub fn render(declarations: &[Declaration], dialect: Dialect) -> String {
    match dialect {
        Dialect::Elm => ElmRenderer.render(declarations),
        Dialect::Flow => FlowRenderer.render(declarations),
    }
}

// `{\n<field>,\n<field>\n}`, one field per line.
fn record_body(fields: &[NamedField], field: impl Fn(&NamedField) -> String) -> String {
    if fields.is_empty() {
        return "{}".to_string();
    }
    let lines: Vec<String> = fields.iter().map(field).collect();
    format!("{{\n{}\n}}", lines.join(",\n"))
}
