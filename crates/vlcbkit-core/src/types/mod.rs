//! Protocol value types.
//!
//! ## Modules
//!
//! - [`event`]: Event keys and the event opcode families.
//! - [`service`]: Service identifiers and descriptors used by service discovery.

pub mod event;
pub mod service;

pub use event::{EventKey, EventKind};
pub use service::{ServiceDescriptor, ServiceId};
