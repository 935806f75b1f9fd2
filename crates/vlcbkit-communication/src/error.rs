//! Error types for controller assembly.

use thiserror::Error;
use vlcbkit_core::ServiceId;

/// Errors raised while building a [`Controller`](crate::Controller).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ControllerError {
    /// No event store was supplied to the builder.
    #[error("Controller requires an event store")]
    MissingEventStore,

    /// Two services with the same identifier were registered.
    #[error("Service {0} registered more than once")]
    DuplicateService(ServiceId),

    /// Service id 0 marks the directory entry in discovery replies.
    #[error("Service id 0 is reserved")]
    ReservedServiceId,

    /// More services than a discovery index can address.
    #[error("Too many services: {count} (at most 255)")]
    TooManyServices { count: usize },
}

/// Result type alias for controller assembly.
pub type ControllerResult<T> = Result<T, ControllerError>;
