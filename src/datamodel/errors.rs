use thiserror::Error;

/// A date/time string matched none of the accepted formats.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Could not parse date-time string \"{input}\" with any known format")]
pub struct DateParseError {
    pub input: String,
}

/// Failure to build an entity graph from a records document.
#[derive(Debug, Error)]
pub enum DataParseError {
    #[error("Invalid records JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Records document must be a JSON array of record groups")]
    NotAnArray,

    /// A record group names neither a substantial nor a relationship type.
    #[error("Unknown type expression '{0}'")]
    UnknownTypeExpression(String),

    /// A required system field is present but cannot be read.
    #[error("Invalid system field '{field}' on element {uri}: {reason}")]
    InvalidSystemField {
        field: String,
        uri: String,
        reason: String,
    },
}
