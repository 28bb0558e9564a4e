//! Error types for the conversion pipeline

use thiserror::Error;

/// Errors that can stop a conversion
#[derive(Error, Debug)]
pub enum ConvertError {
    /// Error reading input or writing output
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed configuration file
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Configuration that parses but makes no sense
    #[error("Invalid setting: {0}")]
    InvalidSetting(String),

    /// Input the pipeline cannot handle
    #[error("Unsupported input: {0}")]
    UnsupportedInput(String),

    /// Failure reported by the document back end
    #[error("Document error: {0}")]
    Document(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ConvertError {
    /// Wrap a back-end error
    pub fn document(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Document(Box::new(err))
    }
}

/// Result type for conversion operations
pub type Result<T> = std::result::Result<T, ConvertError>;
