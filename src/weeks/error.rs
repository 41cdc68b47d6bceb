//! Storage error types
//!
//! Defines the errors raised at the persistence boundary and the stage of
//! the storage pipeline each one came from.

use std::fmt;
use thiserror::Error;

/// Which step of a load/save/clear failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageStage {
    /// Reading the raw value from the adapter
    Get,
    /// Writing the raw value to the adapter
    Set,
    /// Removing the key from the adapter
    Remove,
    /// Encoding the value to text
    Serialize,
    /// Decoding stored text
    Deserialize,
}

impl fmt::Display for StorageStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageStage::Get => write!(f, "get"),
            StorageStage::Set => write!(f, "set"),
            StorageStage::Remove => write!(f, "remove"),
            StorageStage::Serialize => write!(f, "serialize"),
            StorageStage::Deserialize => write!(f, "deserialize"),
        }
    }
}

/// Errors that can occur in the storage layer
#[derive(Error, Debug)]
pub enum StorageError {
    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The adapter rejected the operation
    #[error("Adapter error: {0}")]
    Adapter(String),

    /// Key cannot be mapped onto the backing store
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StorageError::InvalidKey("../weeks".to_string());
        assert_eq!(err.to_string(), "Invalid storage key: ../weeks");

        assert_eq!(StorageStage::Deserialize.to_string(), "deserialize");
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not-json").unwrap_err();
        let storage_err: StorageError = json_err.into();
        assert!(matches!(storage_err, StorageError::Serialization(_)));
    }
}
