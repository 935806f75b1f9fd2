#![allow(dead_code)]

use parking_lot::Mutex;
use std::sync::Arc;
use vlcbkit_communication::{
    Controller, EventConsumerService, LoopbackTransport, MinimumNodeService, NodeIdentity,
};
use vlcbkit_core::VlcbFrame;
use vlcbkit_storage::{EventLayout, EventStore, MemoryStorage};

pub const NODE_NUMBER: u16 = 0x0104;

/// Handler calls captured as (slot, frame).
pub type Captured = Arc<Mutex<Vec<(u8, VlcbFrame)>>>;

pub struct TestNode {
    pub controller: Controller,
    pub transport: LoopbackTransport,
    pub captured: Captured,
}

impl TestNode {
    /// Node 0x0104 with MinimumNode then EventConsumer registered
    pub fn new() -> Self {
        let layout = EventLayout::new(16, 4);
        let store =
            EventStore::open(Box::new(MemoryStorage::new(layout.required_size())), layout).unwrap();

        let captured: Captured = Arc::new(Mutex::new(Vec::new()));
        let sink = captured.clone();
        let consumer = EventConsumerService::new()
            .with_event_handler(move |slot, frame: &VlcbFrame| sink.lock().push((slot, *frame)));

        let transport = LoopbackTransport::new();
        let controller = Controller::builder(transport.clone())
            .identity(NodeIdentity::new(NODE_NUMBER, 1))
            .event_store(store)
            .service(MinimumNodeService::new())
            .service(consumer)
            .build()
            .unwrap();

        Self {
            controller,
            transport,
            captured,
        }
    }

    /// Learn `(nn, en)` in `slot` following the write-then-index contract
    pub fn learn(&mut self, slot: u8, node_number: u16, event_number: u16) {
        let store = self.controller.event_store_mut();
        store.write_event(slot, node_number, event_number).unwrap();
        store.update_ev_hash_entry(slot).unwrap();
    }

    /// Push one frame through the transport and process it
    pub fn receive(&mut self, opcode: u8, data: &[u8]) -> Vec<VlcbFrame> {
        self.transport
            .push_inbound(VlcbFrame::new(opcode, data).unwrap());
        assert!(self.controller.process().is_some());
        self.transport.take_sent()
    }
}
