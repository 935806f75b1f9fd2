//! Service capability interface
//!
//! A service is a unit of node behaviour with a stable identifier and
//! version. The controller offers every inbound frame to every registered
//! service, in registration order, through [`Service::process`]. Responses go
//! out through the [`ServiceContext`] handed to each call.

use crate::node::{ModuleParameters, NodeIdentity};
use crate::transport::Transport;
use vlcbkit_core::{opcodes, FrameResult, ServiceDescriptor, ServiceId, VlcbFrame};
use vlcbkit_storage::EventStore;

/// Outcome of offering a frame to a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessResult {
    /// The service recognised the opcode
    Handled,
    /// The service declined the opcode
    NotHandled,
}

impl ProcessResult {
    pub fn is_handled(self) -> bool {
        self == Self::Handled
    }
}

/// Everything a service may touch while handling one frame.
pub struct ServiceContext<'a> {
    transport: &'a mut dyn Transport,
    identity: &'a mut NodeIdentity,
    parameters: &'a ModuleParameters,
    event_store: &'a EventStore,
    frames_sent: usize,
}

impl<'a> ServiceContext<'a> {
    pub fn new(
        transport: &'a mut dyn Transport,
        identity: &'a mut NodeIdentity,
        parameters: &'a ModuleParameters,
        event_store: &'a EventStore,
    ) -> Self {
        Self {
            transport,
            identity,
            parameters,
            event_store,
            frames_sent: 0,
        }
    }

    /// This node's identity
    pub fn identity(&self) -> &NodeIdentity {
        &*self.identity
    }

    /// This node's identity, for services that change it
    pub fn identity_mut(&mut self) -> &mut NodeIdentity {
        &mut *self.identity
    }

    pub fn parameters(&self) -> &ModuleParameters {
        self.parameters
    }

    pub fn event_store(&self) -> &EventStore {
        self.event_store
    }

    /// Number of frames successfully handed to the transport
    pub fn frames_sent(&self) -> usize {
        self.frames_sent
    }

    /// Send a frame. Transport failures are logged and otherwise dropped;
    /// delivery is the transport's concern.
    pub fn send(&mut self, frame: VlcbFrame) -> bool {
        tracing::trace!("TX {}", frame);
        match self.transport.send(&frame) {
            Ok(()) => {
                self.frames_sent += 1;
                true
            }
            Err(e) => {
                tracing::warn!("Failed to send {}: {}", frame, e);
                false
            }
        }
    }

    /// Send `opcode` with this node's number followed by `rest`
    pub fn send_with_node_number(&mut self, opcode: u8, rest: &[u8]) -> bool {
        let node_number = self.identity.node_number;
        self.send_built(VlcbFrame::with_node_number(opcode, node_number, rest))
    }

    /// Send a GRSP for `request` on behalf of `service`
    pub fn send_grsp(&mut self, request: u8, service: ServiceId, result: u8) -> bool {
        self.send_with_node_number(opcodes::GRSP, &[request, service.code(), result])
    }

    /// Send a CMDERR with `code`
    pub fn send_cmderr(&mut self, code: u8) -> bool {
        self.send_with_node_number(opcodes::CMDERR, &[code])
    }

    /// Send a frame that may have failed to build
    pub fn send_built(&mut self, frame: FrameResult<VlcbFrame>) -> bool {
        match frame {
            Ok(frame) => self.send(frame),
            Err(e) => {
                tracing::warn!("Dropped malformed response: {}", e);
                false
            }
        }
    }
}

/// A capability unit registered with the controller.
pub trait Service: Send {
    /// Stable service identifier
    fn id(&self) -> ServiceId;

    /// Service implementation version
    fn version(&self) -> u8;

    /// Examine an inbound frame and act on it if the opcode belongs to this
    /// service
    fn process(&mut self, frame: &VlcbFrame, ctx: &mut ServiceContext<'_>) -> ProcessResult;

    /// Emit one ESD frame describing this service, registered at `index`.
    ///
    /// The default carries no service data.
    fn report_service_data(&self, index: u8, ctx: &mut ServiceContext<'_>) {
        ctx.send_with_node_number(opcodes::ESD, &[index, self.id().code(), 0, 0, 0]);
    }

    /// Descriptor advertised during service discovery
    fn descriptor(&self) -> ServiceDescriptor {
        ServiceDescriptor::new(self.id(), self.version())
    }
}
