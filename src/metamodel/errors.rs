use thiserror::Error;

/// Failure to read a schema document as a whole.
///
/// Individual declarations that cannot be understood are skipped and logged
/// instead of failing the load.
#[derive(Debug, Error)]
pub enum SchemaParseError {
    #[error("Invalid schema JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Schema document must be a JSON array of declarations")]
    NotAnArray,
}
