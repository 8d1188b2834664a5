//! Source store error types.

use thiserror::Error;

/// Errors raised while reading records from the source store.
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    /// Failed to establish a connection to the source store.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// A query against the source store failed.
    #[error("Read error: {0}")]
    ReadError(String),

    /// A stored document could not be converted into a record.
    #[error("Conversion error: {0}")]
    ConversionError(String),
}

impl SourceError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a read error.
    pub fn read(msg: impl Into<String>) -> Self {
        Self::ReadError(msg.into())
    }

    /// Create a conversion error.
    pub fn conversion(msg: impl Into<String>) -> Self {
        Self::ConversionError(msg.into())
    }
}
