//! # VLCBKit Core
//!
//! Core types for VLCBKit.
//! Provides the bus frame, protocol constants, event keys, service
//! identifiers and the shared error taxonomy.

pub mod constants;
pub mod error;
pub mod frame;
pub mod types;

pub use constants::{modes, opcodes, params, responses, MAX_DATA_BYTES};

pub use error::{Error, FrameError, FrameResult, Result, TransportError, TransportResult};

pub use frame::VlcbFrame;

pub use types::{EventKey, EventKind, ServiceDescriptor, ServiceId};
