//! Controller: frame dispatch and service discovery
//!
//! The controller owns the transport, the node identity, the event store and
//! an ordered list of services. Each call to [`Controller::process`] takes at
//! most one inbound frame and runs it to completion before returning:
//!
//! - RQSD addressed to this node is answered by the controller itself
//!   (service directory for index 0, one ESD from the indexed service
//!   otherwise). RQSD is never offered to services.
//! - Every other frame is offered to every service in registration order.
//!   A service reporting `Handled` does not stop the others from seeing it.

use crate::error::{ControllerError, ControllerResult};
use crate::node::{ModuleParameters, NodeIdentity};
use crate::service::{Service, ServiceContext};
use crate::transport::Transport;
use vlcbkit_core::{opcodes, ServiceDescriptor, VlcbFrame};
use vlcbkit_storage::EventStore;

/// What the controller did with one inbound frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// RQSD answered with `frames` response frames
    Discovery { frames: usize },
    /// Frame dropped without any response
    Ignored,
    /// Frame offered to every service; `handled` of them recognised it
    Offered { handled: usize },
}

/// Builder for [`Controller`].
pub struct ControllerBuilder {
    transport: Box<dyn Transport>,
    identity: NodeIdentity,
    parameters: ModuleParameters,
    event_store: Option<EventStore>,
    services: Vec<Box<dyn Service>>,
}

impl ControllerBuilder {
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Box::new(transport),
            identity: NodeIdentity::default(),
            parameters: ModuleParameters::default(),
            event_store: None,
            services: Vec::new(),
        }
    }

    pub fn identity(mut self, identity: NodeIdentity) -> Self {
        self.identity = identity;
        self
    }

    pub fn parameters(mut self, parameters: ModuleParameters) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn event_store(mut self, event_store: EventStore) -> Self {
        self.event_store = Some(event_store);
        self
    }

    /// Register a service. Discovery indices follow registration order,
    /// starting at 1.
    pub fn service(mut self, service: impl Service + 'static) -> Self {
        self.services.push(Box::new(service));
        self
    }

    pub fn build(self) -> ControllerResult<Controller> {
        let event_store = self.event_store.ok_or(ControllerError::MissingEventStore)?;

        if self.services.len() > usize::from(u8::MAX) {
            return Err(ControllerError::TooManyServices {
                count: self.services.len(),
            });
        }

        for (i, service) in self.services.iter().enumerate() {
            let code = service.id().code();
            if code == 0 {
                return Err(ControllerError::ReservedServiceId);
            }
            if self.services[..i].iter().any(|s| s.id().code() == code) {
                return Err(ControllerError::DuplicateService(service.id()));
            }
        }

        for (i, service) in self.services.iter().enumerate() {
            tracing::debug!(
                "Registered service {} v{} at index {}",
                service.id(),
                service.version(),
                i + 1
            );
        }
        tracing::info!(
            "Controller ready: node {} ({}), {} services",
            self.identity.node_number,
            self.identity.mode,
            self.services.len()
        );

        Ok(Controller {
            transport: self.transport,
            identity: self.identity,
            parameters: self.parameters,
            event_store,
            services: self.services,
        })
    }
}

/// Message router for one node.
pub struct Controller {
    transport: Box<dyn Transport>,
    identity: NodeIdentity,
    parameters: ModuleParameters,
    event_store: EventStore,
    services: Vec<Box<dyn Service>>,
}

impl Controller {
    pub fn builder(transport: impl Transport + 'static) -> ControllerBuilder {
        ControllerBuilder::new(transport)
    }

    /// Take one frame from the transport and dispatch it.
    ///
    /// Returns `None` when no frame was waiting.
    pub fn process(&mut self) -> Option<Dispatch> {
        let frame = self.transport.receive_next()?;
        Some(self.dispatch(&frame))
    }

    /// Dispatch a single frame
    pub fn dispatch(&mut self, frame: &VlcbFrame) -> Dispatch {
        tracing::trace!("RX {}", frame);

        if frame.opcode() == opcodes::RQSD {
            return self.service_discovery(frame);
        }

        let mut handled = 0;
        for service in self.services.iter_mut() {
            let mut ctx = ServiceContext::new(
                self.transport.as_mut(),
                &mut self.identity,
                &self.parameters,
                &self.event_store,
            );
            if service.process(frame, &mut ctx).is_handled() {
                handled += 1;
            }
        }
        Dispatch::Offered { handled }
    }

    fn service_discovery(&mut self, frame: &VlcbFrame) -> Dispatch {
        let payload = frame.payload();
        if payload.len() < 3 {
            tracing::debug!("Ignoring short RQSD {}", frame);
            return Dispatch::Ignored;
        }

        let target = u16::from_be_bytes([payload[0], payload[1]]);
        if !self.identity.is_addressed(target) {
            return Dispatch::Ignored;
        }

        let index = payload[2];
        let mut ctx = ServiceContext::new(
            self.transport.as_mut(),
            &mut self.identity,
            &self.parameters,
            &self.event_store,
        );

        if index == 0 {
            // Directory first, then one descriptor per service in index order.
            ctx.send_with_node_number(opcodes::SD, &[0, 0, self.services.len() as u8]);
            for (i, service) in self.services.iter().enumerate() {
                let descriptor = service.descriptor();
                ctx.send_with_node_number(
                    opcodes::SD,
                    &[i as u8 + 1, descriptor.id.code(), descriptor.version],
                );
            }
        } else {
            match self.services.get(usize::from(index) - 1) {
                Some(service) => service.report_service_data(index, &mut ctx),
                None => {
                    tracing::debug!("RQSD for unknown service index {}", index);
                    return Dispatch::Ignored;
                }
            }
        }

        Dispatch::Discovery {
            frames: ctx.frames_sent(),
        }
    }

    /// Descriptors of the registered services, in discovery order
    pub fn descriptors(&self) -> Vec<ServiceDescriptor> {
        self.services.iter().map(|s| s.descriptor()).collect()
    }

    pub fn service_count(&self) -> usize {
        self.services.len()
    }

    pub fn identity(&self) -> &NodeIdentity {
        &self.identity
    }

    pub fn parameters(&self) -> &ModuleParameters {
        &self.parameters
    }

    pub fn event_store(&self) -> &EventStore {
        &self.event_store
    }

    /// Mutable access for learning and clearing events
    pub fn event_store_mut(&mut self) -> &mut EventStore {
        &mut self.event_store
    }
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("identity", &self.identity)
            .field("services", &self.descriptors())
            .field("event_store", &self.event_store)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::ProcessResult;
    use crate::transport::LoopbackTransport;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use vlcbkit_core::ServiceId;
    use vlcbkit_storage::{EventLayout, MemoryStorage};

    /// Records which services saw which opcodes.
    struct Recorder {
        id: ServiceId,
        claims: u8,
        log: Arc<Mutex<Vec<(ServiceId, u8)>>>,
    }

    impl Service for Recorder {
        fn id(&self) -> ServiceId {
            self.id
        }

        fn version(&self) -> u8 {
            1
        }

        fn process(&mut self, frame: &VlcbFrame, _ctx: &mut ServiceContext<'_>) -> ProcessResult {
            self.log.lock().push((self.id, frame.opcode()));
            if frame.opcode() == self.claims {
                ProcessResult::Handled
            } else {
                ProcessResult::NotHandled
            }
        }
    }

    fn store() -> EventStore {
        let layout = EventLayout::new(4, 2);
        EventStore::open(Box::new(MemoryStorage::new(layout.required_size())), layout).unwrap()
    }

    #[test]
    fn test_every_service_is_offered_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut controller = Controller::builder(LoopbackTransport::new())
            .identity(NodeIdentity::new(0x0104, 1))
            .event_store(store())
            .service(Recorder {
                id: ServiceId::Teach,
                claims: opcodes::ACON,
                log: log.clone(),
            })
            .service(Recorder {
                id: ServiceId::Consumer,
                claims: opcodes::ACON,
                log: log.clone(),
            })
            .build()
            .unwrap();

        let frame = VlcbFrame::with_node_number(opcodes::ACON, 1, &[0, 1]).unwrap();
        assert_eq!(controller.dispatch(&frame), Dispatch::Offered { handled: 2 });

        let frame = VlcbFrame::new(opcodes::QNN, &[]).unwrap();
        assert_eq!(controller.dispatch(&frame), Dispatch::Offered { handled: 0 });

        assert_eq!(
            *log.lock(),
            vec![
                (ServiceId::Teach, opcodes::ACON),
                (ServiceId::Consumer, opcodes::ACON),
                (ServiceId::Teach, opcodes::QNN),
                (ServiceId::Consumer, opcodes::QNN),
            ]
        );
    }

    #[test]
    fn test_rqsd_is_not_offered_to_services() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut controller = Controller::builder(LoopbackTransport::new())
            .identity(NodeIdentity::new(0x0104, 1))
            .event_store(store())
            .service(Recorder {
                id: ServiceId::Teach,
                claims: opcodes::RQSD,
                log: log.clone(),
            })
            .build()
            .unwrap();

        let rqsd = VlcbFrame::with_node_number(opcodes::RQSD, 0x0104, &[0]).unwrap();
        assert_eq!(controller.dispatch(&rqsd), Dispatch::Discovery { frames: 2 });
        assert!(log.lock().is_empty());
    }

    #[test]
    fn test_process_without_inbound_frame() {
        let mut controller = Controller::builder(LoopbackTransport::new())
            .event_store(store())
            .build()
            .unwrap();
        assert_eq!(controller.process(), None);
    }

    #[test]
    fn test_builder_rejects_duplicates_and_missing_store() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let recorder = |id| Recorder {
            id,
            claims: 0,
            log: log.clone(),
        };

        let result = Controller::builder(LoopbackTransport::new())
            .event_store(store())
            .service(recorder(ServiceId::Teach))
            .service(recorder(ServiceId::Teach))
            .build();
        assert_eq!(
            result.err(),
            Some(ControllerError::DuplicateService(ServiceId::Teach))
        );

        let result = Controller::builder(LoopbackTransport::new()).build();
        assert_eq!(result.err(), Some(ControllerError::MissingEventStore));
    }

    #[test]
    fn test_builder_compares_service_codes() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let recorder = |id| Recorder {
            id,
            claims: 0,
            log: log.clone(),
        };

        let result = Controller::builder(LoopbackTransport::new())
            .event_store(store())
            .service(recorder(ServiceId::Consumer))
            .service(recorder(ServiceId::Other(6)))
            .build();
        assert_eq!(
            result.err(),
            Some(ControllerError::DuplicateService(ServiceId::Other(6)))
        );
    }

    #[test]
    fn test_builder_rejects_service_id_zero() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let result = Controller::builder(LoopbackTransport::new())
            .event_store(store())
            .service(Recorder {
                id: ServiceId::Other(0),
                claims: 0,
                log,
            })
            .build();
        assert_eq!(result.err(), Some(ControllerError::ReservedServiceId));
    }
}
