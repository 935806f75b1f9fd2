//! Bus transport boundary
//!
//! The node core only needs two operations from the transport: send a frame
//! (fire-and-forget) and take the next received frame, if any. Framing,
//! arbitration and physical bus access belong to the implementation.
//!
//! Provided here:
//! - [`LoopbackTransport`]: queue-backed transport shared through cloneable
//!   handles, used by tests and by hosts that feed frames from elsewhere
//! - [`gridconnect`]: the GridConnect ASCII frame codec used by serial and
//!   TCP bus adapters

pub mod gridconnect;
pub mod loopback;

pub use gridconnect::GridConnectFrame;
pub use loopback::LoopbackTransport;

use vlcbkit_core::{TransportResult, VlcbFrame};

/// A bus transport.
pub trait Transport: Send {
    /// Queue a frame for transmission
    fn send(&mut self, frame: &VlcbFrame) -> TransportResult<()>;

    /// Take the next received frame, if one is waiting
    fn receive_next(&mut self) -> Option<VlcbFrame>;
}
