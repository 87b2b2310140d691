//! Error types for `spritz-openapi-tools`.

use thiserror::Error;

/// Main error type for loading a spec and resolving tools against it.
#[derive(Error, Debug)]
pub enum OpenApiToolsError {
    /// A configured tool targets an operation the document does not declare.
    #[error(
        "operationId \"{operation_id}\" not found in OpenAPI spec. Available: {}",
        .available.join(", ")
    )]
    UnknownOperation {
        operation_id: String,
        available: Vec<String>,
    },

    #[error("Configuration error: duplicate tool name '{0}'")]
    DuplicateToolName(String),

    #[error("OpenAPI error: failed to fetch spec from '{url}': {message}")]
    SpecFetch { url: String, message: String },

    #[error("OpenAPI error: failed to read spec file '{path}': {source}")]
    SpecReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("OpenAPI error: failed to parse OpenAPI spec from '{location}': {message}")]
    SpecParse { location: String, message: String },

    #[error("OpenAPI error: spec hash mismatch. Expected: {expected}, Got: {actual}")]
    SpecHashMismatch { expected: String, actual: String },

    /// The spec location could not be turned into a request.
    #[error("Request error: {0}")]
    Request(String),
}

/// Result type alias for `OpenAPI` tooling operations.
pub type Result<T> = std::result::Result<T, OpenApiToolsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_operation_lists_available_ids() {
        let err = OpenApiToolsError::UnknownOperation {
            operation_id: "nonexistent".to_string(),
            available: vec!["getV1Bank-accounts".to_string(), "getV1Off-ramps".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "operationId \"nonexistent\" not found in OpenAPI spec. Available: getV1Bank-accounts, getV1Off-ramps"
        );
    }
}
