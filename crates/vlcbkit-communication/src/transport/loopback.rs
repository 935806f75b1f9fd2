//! Queue-backed transport
//!
//! Inbound frames are pushed by the host (or a test) and consumed by the
//! controller one at a time. Outbound frames are appended to a sent log that
//! the host drains. Clones share the same queues.

use super::Transport;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use vlcbkit_core::{TransportError, TransportResult, VlcbFrame};

#[derive(Debug, Default)]
struct LoopbackState {
    inbound: VecDeque<VlcbFrame>,
    sent: Vec<VlcbFrame>,
    capacity: Option<usize>,
    closed: bool,
}

/// Transport over shared in-memory queues.
#[derive(Debug, Clone, Default)]
pub struct LoopbackTransport {
    state: Arc<Mutex<LoopbackState>>,
}

impl LoopbackTransport {
    /// Create a transport with an unbounded sent log
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transport whose sent log holds at most `capacity` frames
    pub fn with_capacity(capacity: usize) -> Self {
        let transport = Self::new();
        transport.state.lock().capacity = Some(capacity);
        transport
    }

    /// Queue a frame as if it had been received from the bus
    pub fn push_inbound(&self, frame: VlcbFrame) {
        self.state.lock().inbound.push_back(frame);
    }

    /// Number of received frames not yet consumed
    pub fn inbound_len(&self) -> usize {
        self.state.lock().inbound.len()
    }

    /// Copy of every frame sent so far
    pub fn sent(&self) -> Vec<VlcbFrame> {
        self.state.lock().sent.clone()
    }

    /// Remove and return every frame sent so far
    pub fn take_sent(&self) -> Vec<VlcbFrame> {
        std::mem::take(&mut self.state.lock().sent)
    }

    /// Forget sent frames
    pub fn clear_sent(&self) {
        self.state.lock().sent.clear();
    }

    /// Refuse further sends
    pub fn close(&self) {
        self.state.lock().closed = true;
    }
}

impl Transport for LoopbackTransport {
    fn send(&mut self, frame: &VlcbFrame) -> TransportResult<()> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(TransportError::Closed);
        }
        if let Some(capacity) = state.capacity {
            if state.sent.len() >= capacity {
                return Err(TransportError::BufferFull { capacity });
            }
        }
        state.sent.push(*frame);
        Ok(())
    }

    fn receive_next(&mut self) -> Option<VlcbFrame> {
        self.state.lock().inbound.pop_front()
    }
}
