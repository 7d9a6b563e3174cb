//! Static type declarations for Elm and Flow from protobuf schemas.
//!
//! A schema file is turned into a dialect-neutral list of [`Declaration`]s
//! (enums first, then messages) which a [`Renderer`] serializes.

use std::path::Path;

use parser::{ParseError, Registry, parse_proto_file, parse_proto_tree};

mod builder;
mod config;
mod enums;
mod error;
mod mapper;
mod naming;
mod render;
mod tree;

#[cfg(test)]
mod test_utils;

pub use builder::build_declarations;
pub use config::{Config, Dialect};
pub use enums::materialize;
pub use error::{GenerateError, SchemaResolutionError};
pub use mapper::map_field;
pub use naming::qualify;
pub use render::{ElmRenderer, FlowRenderer, Renderer, render};
pub use tree::{Declaration, NamedField, Primitive, TypeNode};

/// Generates the declarations of one registered file in the configured dialect.
pub fn generate(
    file_name: &str,
    registry: &Registry,
    config: &Config,
) -> Result<String, SchemaResolutionError> {
    let file = registry
        .lookup_file(file_name)
        .map_err(SchemaResolutionError::File)?;
    let declarations = build_declarations(file, registry, config)?;
    Ok(render(&declarations, config.dialect()))
}

/// Generate types from a .proto file path.
/// Imports are followed from the file's own directory.
pub fn generate_from_proto<P: AsRef<Path>>(
    proto_path: P,
    config: &Config,
) -> Result<String, GenerateError> {
    let files = parse_proto_tree(proto_path, &[])?;
    let root = files
        .last()
        .map(|f| f.name.clone())
        .ok_or(ParseError::Message("no file parsed"))?;
    let registry = Registry::from_files(files);
    Ok(generate(&root, &registry, config)?)
}

/// Generate types for several .proto files resolved against each other.
/// Returns a list of tuples: (file name, generated text), in input order.
pub fn generate_from_protos<P: AsRef<Path>>(
    proto_paths: &[P],
    config: &Config,
) -> Result<Vec<(String, String)>, GenerateError> {
    let files = proto_paths
        .iter()
        .map(parse_proto_file)
        .collect::<Result<Vec<_>, _>>()?;
    let names: Vec<String> = files.iter().map(|f| f.name.clone()).collect();
    let registry = Registry::from_files(files);

    let mut out = Vec::with_capacity(names.len());
    for name in names {
        let text = generate(&name, &registry, config)?;
        out.push((name, text));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::registry;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    const PEOPLE: &str = r#"
        syntax = "proto3";
        package people;

        message Person {
            string name = 1;
            int32 age = 2;
        }

        enum Status {
            ACTIVE = 0;
            INACTIVE = 1;
        }
    "#;

    #[test]
    fn elm_output() {
        let reg = registry(PEOPLE);
        let out = generate("test.proto", &reg, &Config::new(Dialect::Elm)).unwrap();
        assert_eq!(
            out,
            indoc! {"
                -- this is a generated file
                type Status = ACTIVE | INACTIVE

                type alias Person =
                {
                  name: Maybe String,
                  age: Maybe Int
                }

            "}
        );
    }

    #[test]
    fn flow_output() {
        let reg = registry(PEOPLE);
        let out = generate("test.proto", &reg, &Config::new(Dialect::Flow)).unwrap();
        assert_eq!(
            out,
            indoc! {r#"
                /* @flow */
                export type Status = "ACTIVE" | "INACTIVE";

                export type Person = {
                  name?: string,
                  age?: number
                };

            "#}
        );
    }

    #[test]
    fn unknown_file_is_a_resolution_error() {
        let reg = registry(PEOPLE);
        let err = generate("other.proto", &reg, &Config::default()).unwrap_err();
        assert!(matches!(err, SchemaResolutionError::File(_)));
        assert_eq!(err.to_string(), "no file named `other.proto`");
    }
}
