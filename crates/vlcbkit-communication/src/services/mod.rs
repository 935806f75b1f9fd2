//! Built-in services
//!
//! - [`MinimumNodeService`]: node identity, parameters and mode changes
//! - [`EventConsumerService`]: matches inbound events against the event table

pub mod event_consumer;
pub mod minimum_node;

pub use event_consumer::{EventConsumerService, EventHandler};
pub use minimum_node::MinimumNodeService;
