//! Error handling for VLCBKit
//!
//! Provides error types for the protocol layers:
//! - Frame errors (construction and parsing)
//! - Transport errors (sending, receiving, text encoding)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Frame error type
///
/// Raised when a frame cannot be built from the supplied bytes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// More than seven data bytes were supplied
    #[error("Frame payload too long: {len} data bytes (max 7)")]
    PayloadTooLong {
        /// Number of data bytes supplied.
        len: usize,
    },

    /// A length field outside 0..=8
    #[error("Invalid frame length {len}")]
    InvalidLength {
        /// The offending length.
        len: usize,
    },
}

/// Transport error type
///
/// Represents failures at the boundary with the bus transport.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The transport has been closed
    #[error("Transport closed")]
    Closed,

    /// Outbound buffer is full
    #[error("Transport buffer full ({capacity} frames)")]
    BufferFull {
        /// Capacity of the outbound buffer.
        capacity: usize,
    },

    /// A frame could not be encoded for the wire
    #[error("Failed to encode frame: {reason}")]
    Encode {
        /// The reason encoding failed.
        reason: String,
    },

    /// Received text could not be decoded into a frame
    #[error("Failed to decode frame: {reason}")]
    Decode {
        /// The reason decoding failed.
        reason: String,
    },

    /// I/O failure in the underlying device
    #[error("Transport I/O error: {reason}")]
    Io {
        /// The reason for the I/O error.
        reason: String,
    },
}

/// Main error type for VLCBKit
///
/// A unified error type covering the protocol layers.
#[derive(Error, Debug)]
pub enum Error {
    /// Frame error
    #[error(transparent)]
    Frame(#[from] FrameError),

    /// Transport error
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a transport error
    pub fn is_transport_error(&self) -> bool {
        matches!(self, Error::Transport(_))
    }

    /// Check if this is a frame error
    pub fn is_frame_error(&self) -> bool {
        matches!(self, Error::Frame(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

/// Result type for frame construction
pub type FrameResult<T> = std::result::Result<T, FrameError>;

/// Result type for transport operations
pub type TransportResult<T> = std::result::Result<T, TransportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_error_display() {
        let err = FrameError::PayloadTooLong { len: 9 };
        assert_eq!(err.to_string(), "Frame payload too long: 9 data bytes (max 7)");
    }

    #[test]
    fn test_transport_error_display() {
        let err = TransportError::Decode {
            reason: "missing terminator".to_string(),
        };
        assert_eq!(err.to_string(), "Failed to decode frame: missing terminator");
        assert_eq!(TransportError::Closed.to_string(), "Transport closed");
    }

    #[test]
    fn test_error_conversion() {
        let err: Error = FrameError::InvalidLength { len: 12 }.into();
        assert!(err.is_frame_error());

        let err: Error = TransportError::Closed.into();
        assert!(err.is_transport_error());

        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
