//! # VLCBKit Communication
//!
//! Transports, service dispatch and service discovery for VLCBKit nodes.
//! The [`Controller`] routes inbound frames to registered [`Service`]s and
//! answers service discovery itself.

pub mod controller;
pub mod error;
pub mod node;
pub mod service;
pub mod services;
pub mod transport;

pub use controller::{Controller, ControllerBuilder, Dispatch};
pub use error::{ControllerError, ControllerResult};
pub use node::{Mode, ModuleParameters, NodeIdentity};
pub use service::{ProcessResult, Service, ServiceContext};
pub use services::{EventConsumerService, EventHandler, MinimumNodeService};
pub use transport::{gridconnect, GridConnectFrame, LoopbackTransport, Transport};
