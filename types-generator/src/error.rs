use parser::{LookupError, ParseError};

/// A message or enum reference the registry cannot resolve. The schema is
/// inconsistent; generation of the file stops at the first one.
#[derive(Debug, thiserror::Error)]
pub enum SchemaResolutionError {
    #[error("field `{field}` of message `{message}` references unresolved type `{type_name}`")]
    Field {
        message: String,
        field: String,
        type_name: String,
        #[source]
        source: LookupError,
    },
    #[error(transparent)]
    File(LookupError),
}

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Resolution(#[from] SchemaResolutionError),
}
