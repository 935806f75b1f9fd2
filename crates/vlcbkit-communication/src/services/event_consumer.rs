//! Event consumer service
//!
//! Recognises the event opcode families (long and short, on and off, with
//! zero to three trailing data bytes), resolves the event key through the
//! event table and hands matches to a single registered handler. Event
//! consumption is silent on the bus whether or not the key is known.

use crate::service::{ProcessResult, Service, ServiceContext};
use vlcbkit_core::{opcodes, params, EventKey, ServiceId, VlcbFrame};

/// Callback for matched events: slot index and the frame that matched.
pub type EventHandler = Box<dyn FnMut(u8, &VlcbFrame) + Send>;

/// Consumer service (id 6).
pub struct EventConsumerService {
    handler: Option<EventHandler>,
}

impl EventConsumerService {
    pub const VERSION: u8 = 1;

    pub fn new() -> Self {
        Self { handler: None }
    }

    /// Replace the event handler. Only one handler is kept.
    pub fn set_event_handler(&mut self, handler: impl FnMut(u8, &VlcbFrame) + Send + 'static) {
        self.handler = Some(Box::new(handler));
    }

    /// Builder-style [`set_event_handler`](Self::set_event_handler)
    pub fn with_event_handler(mut self, handler: impl FnMut(u8, &VlcbFrame) + Send + 'static) -> Self {
        self.set_event_handler(handler);
        self
    }

    pub fn has_event_handler(&self) -> bool {
        self.handler.is_some()
    }
}

impl Default for EventConsumerService {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventConsumerService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventConsumerService")
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}

impl Service for EventConsumerService {
    fn id(&self) -> ServiceId {
        ServiceId::Consumer
    }

    fn version(&self) -> u8 {
        Self::VERSION
    }

    fn process(&mut self, frame: &VlcbFrame, ctx: &mut ServiceContext<'_>) -> ProcessResult {
        let Some((kind, key)) = EventKey::from_frame(frame) else {
            return ProcessResult::NotHandled;
        };
        if frame.len() < 5 {
            tracing::debug!("Ignoring truncated event frame {}", frame);
            return ProcessResult::Handled;
        }

        match ctx.event_store().lookup_key(key) {
            Some(slot) => {
                tracing::debug!("{} {} matched slot {}", kind, key, slot);
                if let Some(handler) = self.handler.as_mut() {
                    handler(slot, frame);
                }
            }
            None => tracing::trace!("{} {} not learned", kind, key),
        }
        ProcessResult::Handled
    }

    /// ESD payload: version, consumer flags, learned event count
    fn report_service_data(&self, index: u8, ctx: &mut ServiceContext<'_>) {
        let count = ctx.event_store().event_count().min(usize::from(u8::MAX)) as u8;
        ctx.send_with_node_number(
            opcodes::ESD,
            &[index, self.id().code(), Self::VERSION, params::PF_CONSUMER, count],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{ModuleParameters, NodeIdentity};
    use crate::transport::LoopbackTransport;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use vlcbkit_storage::{EventLayout, EventStore, MemoryStorage};

    fn store() -> EventStore {
        let layout = EventLayout::new(8, 2);
        let mut store =
            EventStore::open(Box::new(MemoryStorage::new(layout.required_size())), layout).unwrap();
        store.write_event(3, 0x0102, 0x0005).unwrap();
        store.update_ev_hash_entry(3).unwrap();
        store
    }

    fn run(service: &mut EventConsumerService, frame: &VlcbFrame) -> (ProcessResult, usize) {
        let mut transport = LoopbackTransport::new();
        let mut identity = NodeIdentity::new(0x0104, 1);
        let parameters = ModuleParameters::default();
        let store = store();
        let mut ctx = ServiceContext::new(&mut transport, &mut identity, &parameters, &store);
        let result = service.process(frame, &mut ctx);
        (result, ctx.frames_sent())
    }

    #[test]
    fn test_non_event_opcode_not_handled() {
        let mut service = EventConsumerService::new();
        let frame = VlcbFrame::new(opcodes::QNN, &[]).unwrap();
        assert_eq!(run(&mut service, &frame), (ProcessResult::NotHandled, 0));
    }

    #[test]
    fn test_event_with_data_bytes_matches() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let sink = calls.clone();
        let mut service = EventConsumerService::new()
            .with_event_handler(move |slot, frame: &VlcbFrame| sink.lock().push((slot, frame.opcode())));

        let frame = VlcbFrame::new(opcodes::ACON2, &[0x01, 0x02, 0x00, 0x05, 0xAA, 0xBB]).unwrap();
        assert_eq!(run(&mut service, &frame), (ProcessResult::Handled, 0));
        assert_eq!(*calls.lock(), vec![(3, opcodes::ACON2)]);
    }

    #[test]
    fn test_unknown_event_is_handled_silently() {
        let calls = Arc::new(Mutex::new(0));
        let sink = calls.clone();
        let mut service = EventConsumerService::new().with_event_handler(move |_, _| *sink.lock() += 1);

        let frame = VlcbFrame::with_node_number(opcodes::ACOF, 0x0102, &[0x00, 0x06]).unwrap();
        assert_eq!(run(&mut service, &frame), (ProcessResult::Handled, 0));
        assert_eq!(*calls.lock(), 0);
    }

    #[test]
    fn test_match_without_handler() {
        let mut service = EventConsumerService::new();
        assert!(!service.has_event_handler());
        let frame = VlcbFrame::with_node_number(opcodes::ACON, 0x0102, &[0x00, 0x05]).unwrap();
        assert_eq!(run(&mut service, &frame), (ProcessResult::Handled, 0));
    }

    #[test]
    fn test_last_handler_wins() {
        let first = Arc::new(Mutex::new(0));
        let second = Arc::new(Mutex::new(0));
        let mut service = EventConsumerService::new();
        let sink = first.clone();
        service.set_event_handler(move |_, _| *sink.lock() += 1);
        let sink = second.clone();
        service.set_event_handler(move |_, _| *sink.lock() += 1);

        let frame = VlcbFrame::with_node_number(opcodes::ACON, 0x0102, &[0x00, 0x05]).unwrap();
        run(&mut service, &frame);
        assert_eq!((*first.lock(), *second.lock()), (0, 1));
    }

    #[test]
    fn test_truncated_event_frame() {
        let calls = Arc::new(Mutex::new(0));
        let sink = calls.clone();
        let mut service = EventConsumerService::new().with_event_handler(move |_, _| *sink.lock() += 1);

        let frame = VlcbFrame::new(opcodes::ACON, &[0x01, 0x02]).unwrap();
        assert_eq!(run(&mut service, &frame), (ProcessResult::Handled, 0));
        assert_eq!(*calls.lock(), 0);
    }
}
