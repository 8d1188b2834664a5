//! Destination store error types.

use thiserror::Error;

/// Errors raised by destination store operations.
///
/// Used by the `DestinationStore` trait for every operation, covering both
/// backend failures and records that cannot be represented in the store.
#[derive(Debug, Clone, Error)]
pub enum DestinationError {
    /// Failed to establish a connection to the destination store.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Failed to insert a record.
    #[error("Write error: {0}")]
    WriteError(String),

    /// Failed to list existing records.
    #[error("Scan error: {0}")]
    ScanError(String),

    /// Failed to delete records.
    #[error("Delete error: {0}")]
    DeleteError(String),

    /// A record or stored item could not be converted.
    #[error("Conversion error: {0}")]
    ConversionError(String),
}

impl DestinationError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a write error.
    pub fn write(msg: impl Into<String>) -> Self {
        Self::WriteError(msg.into())
    }

    /// Create a scan error.
    pub fn scan(msg: impl Into<String>) -> Self {
        Self::ScanError(msg.into())
    }

    /// Create a delete error.
    pub fn delete(msg: impl Into<String>) -> Self {
        Self::DeleteError(msg.into())
    }

    /// Create a conversion error.
    pub fn conversion(msg: impl Into<String>) -> Self {
        Self::ConversionError(msg.into())
    }
}
