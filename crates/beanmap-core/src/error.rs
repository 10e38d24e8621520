//! Error types for beanmap

use thiserror::Error;

/// Result type alias for generation operations
pub type CodegenResult<T> = Result<T, CodegenError>;

/// Error type for generation operations
#[derive(Error, Debug)]
pub enum CodegenError {
    /// A type or shape cannot be mapped
    #[error("{reason}: {ty}")]
    UnsupportedType { ty: String, reason: String },

    /// Invalid mapper declaration or configuration
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Internal inconsistency or emission failure
    #[error("unexpected error: {0}")]
    Unexpected(String),

    /// Constructor parameters marked required were absent from the input
    #[error("Required properties are missing : {}", .0.join(", "))]
    MissingRequiredProperties(Vec<String>),

    /// A recoverable error met on a path that cannot be skipped
    #[error("{context} : {source}")]
    Aborted {
        context: String,
        #[source]
        source: Box<CodegenError>,
    },
}

impl CodegenError {
    pub fn unsupported(ty: impl std::fmt::Display, reason: impl Into<String>) -> Self {
        CodegenError::UnsupportedType {
            ty: ty.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether the caller may drop the offending unit and carry on.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CodegenError::UnsupportedType { .. })
    }

    /// Turn a recoverable error into one that aborts the current mapper.
    ///
    /// Fatal errors pass through unchanged.
    pub fn escalate(self, context: impl Into<String>) -> Self {
        if self.is_recoverable() {
            CodegenError::Aborted {
                context: context.into(),
                source: Box::new(self),
            }
        } else {
            self
        }
    }
}

impl From<std::io::Error> for CodegenError {
    fn from(err: std::io::Error) -> Self {
        CodegenError::Unexpected(err.to_string())
    }
}

impl From<serde_json::Error> for CodegenError {
    fn from(err: serde_json::Error) -> Self {
        CodegenError::Unexpected(err.to_string())
    }
}

impl From<toml::de::Error> for CodegenError {
    fn from(err: toml::de::Error) -> Self {
        CodegenError::Configuration(err.to_string())
    }
}
