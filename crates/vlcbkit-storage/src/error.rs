//! Error types for the storage crate.
//!
//! This module provides structured error types for the persisted storage
//! collaborator and the event table built on top of it.

use std::io;
use thiserror::Error;

/// Errors raised by a [`Storage`](crate::Storage) backend.
#[derive(Error, Debug)]
pub enum StorageError {
    /// An address past the end of the storage was accessed.
    #[error("Address {address} out of bounds (capacity {capacity})")]
    AddressOutOfBounds { address: usize, capacity: usize },

    /// The storage is too small for the requested event layout.
    #[error("Storage too small: need {required} bytes, have {capacity}")]
    TooSmall { required: usize, capacity: usize },

    /// An existing image file has an unexpected size.
    #[error("Image size mismatch: expected {expected} bytes, found {found}")]
    ImageSizeMismatch { expected: usize, found: usize },

    /// I/O error while loading or committing a storage image.
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
}

/// Errors raised by the event table.
#[derive(Error, Debug)]
pub enum EventStoreError {
    /// The slot index is out of bounds or the slot is not occupied.
    #[error("Invalid event slot {slot}")]
    InvalidSlot { slot: u8 },

    /// The event variable index is outside 1..=max.
    #[error("Event variable index {ev_index} out of range (1..={max})")]
    OutOfRange { ev_index: u8, max: u8 },

    /// The underlying storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type alias for event table operations.
pub type EventStoreResult<T> = Result<T, EventStoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_display() {
        let err = StorageError::AddressOutOfBounds {
            address: 1024,
            capacity: 1024,
        };
        assert_eq!(err.to_string(), "Address 1024 out of bounds (capacity 1024)");

        let err = StorageError::TooSmall {
            required: 500,
            capacity: 256,
        };
        assert_eq!(err.to_string(), "Storage too small: need 500 bytes, have 256");
    }

    #[test]
    fn test_event_store_error_display() {
        let err = EventStoreError::InvalidSlot { slot: 7 };
        assert_eq!(err.to_string(), "Invalid event slot 7");

        let err = EventStoreError::OutOfRange {
            ev_index: 0,
            max: 4,
        };
        assert_eq!(err.to_string(), "Event variable index 0 out of range (1..=4)");
    }

    #[test]
    fn test_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let storage_err: StorageError = io_err.into();
        assert!(matches!(storage_err, StorageError::IoError(_)));

        let store_err: EventStoreError = storage_err.into();
        assert!(matches!(store_err, EventStoreError::Storage(_)));
    }
}
