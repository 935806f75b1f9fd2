//! Event keys and event opcode families.
//!
//! A long event is addressed by the producing node's number plus an event
//! number. A short event is addressed by a device number only; it is keyed
//! with node number 0 so that long and short events share one event table.

use crate::constants::opcodes;
use crate::frame::VlcbFrame;
use serde::{Deserialize, Serialize};

/// Key identifying a learned event in the event table.
///
/// Equality and hashing operate on the raw four key bytes; whether the key
/// came from a long or a short event is carried separately by [`EventKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct EventKey {
    /// Producer node number (0 for short events)
    pub node_number: u16,
    /// Event number, or device number for short events
    pub event_number: u16,
}

impl EventKey {
    /// Create a key from a node number and event number
    pub const fn new(node_number: u16, event_number: u16) -> Self {
        Self {
            node_number,
            event_number,
        }
    }

    /// Create the key for a short event with the given device number
    pub const fn short(device_number: u16) -> Self {
        Self::new(0, device_number)
    }

    /// Key bytes as stored: node number then event number, big-endian
    pub fn to_bytes(self) -> [u8; 4] {
        let [nn_hi, nn_lo] = self.node_number.to_be_bytes();
        let [en_hi, en_lo] = self.event_number.to_be_bytes();
        [nn_hi, nn_lo, en_hi, en_lo]
    }

    /// Build a key from its four stored bytes
    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        Self::new(
            u16::from_be_bytes([bytes[0], bytes[1]]),
            u16::from_be_bytes([bytes[2], bytes[3]]),
        )
    }

    /// Derive the event kind and lookup key from an inbound frame.
    ///
    /// Returns `None` when the opcode is not an event opcode. For short
    /// events the node number bytes identify the sender and are not part of
    /// the key.
    pub fn from_frame(frame: &VlcbFrame) -> Option<(EventKind, Self)> {
        let kind = EventKind::from_opcode(frame.opcode())?;
        let data = frame.data();
        let node_number = u16::from_be_bytes([data[0], data[1]]);
        let event_number = u16::from_be_bytes([data[2], data[3]]);
        let key = if kind.is_short() {
            Self::short(event_number)
        } else {
            Self::new(node_number, event_number)
        };
        Some((kind, key))
    }
}

impl std::fmt::Display for EventKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04X}:{:04X}", self.node_number, self.event_number)
    }
}

/// The four event opcode families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// ACON, ACON1, ACON2, ACON3
    LongOn,
    /// ACOF, ACOF1, ACOF2, ACOF3
    LongOff,
    /// ASON, ASON1, ASON2, ASON3
    ShortOn,
    /// ASOF, ASOF1, ASOF2, ASOF3
    ShortOff,
}

impl EventKind {
    /// Classify an opcode, returning `None` for non-event opcodes
    pub fn from_opcode(opcode: u8) -> Option<Self> {
        match opcode {
            opcodes::ACON | opcodes::ACON1 | opcodes::ACON2 | opcodes::ACON3 => Some(Self::LongOn),
            opcodes::ACOF | opcodes::ACOF1 | opcodes::ACOF2 | opcodes::ACOF3 => {
                Some(Self::LongOff)
            }
            opcodes::ASON | opcodes::ASON1 | opcodes::ASON2 | opcodes::ASON3 => {
                Some(Self::ShortOn)
            }
            opcodes::ASOF | opcodes::ASOF1 | opcodes::ASOF2 | opcodes::ASOF3 => {
                Some(Self::ShortOff)
            }
            _ => None,
        }
    }

    /// True for ASON/ASOF and siblings
    pub fn is_short(self) -> bool {
        matches!(self, Self::ShortOn | Self::ShortOff)
    }

    /// True for the ON variants
    pub fn is_on(self) -> bool {
        matches!(self, Self::LongOn | Self::ShortOn)
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LongOn => write!(f, "long on"),
            Self::LongOff => write!(f, "long off"),
            Self::ShortOn => write!(f, "short on"),
            Self::ShortOff => write!(f, "short off"),
        }
    }
}
