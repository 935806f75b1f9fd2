//! Bus frame type
//!
//! A frame is an opcode followed by up to seven data bytes. `len` counts the
//! opcode together with the data bytes, so a long event frame carrying node
//! and event numbers has `len == 5`. Data bytes beyond `len` are always zero.

use crate::constants::MAX_DATA_BYTES;
use crate::error::{FrameError, FrameResult};
use serde::{Deserialize, Serialize};

/// A single VLCB frame as exchanged with the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "RawFrame")]
pub struct VlcbFrame {
    len: u8,
    opcode: u8,
    data: [u8; MAX_DATA_BYTES],
}

/// Unchecked serialized form of a frame
#[derive(Deserialize)]
struct RawFrame {
    len: u8,
    opcode: u8,
    data: [u8; MAX_DATA_BYTES],
}

impl TryFrom<RawFrame> for VlcbFrame {
    type Error = FrameError;

    fn try_from(raw: RawFrame) -> FrameResult<Self> {
        let len = raw.len as usize;
        if len > MAX_DATA_BYTES + 1 {
            return Err(FrameError::InvalidLength { len });
        }
        if len == 0 {
            if raw.opcode != 0 || raw.data.iter().any(|&b| b != 0) {
                return Err(FrameError::InvalidLength { len });
            }
            return Ok(Self::empty());
        }
        if raw.data[len - 1..].iter().any(|&b| b != 0) {
            return Err(FrameError::InvalidLength { len });
        }
        Self::new(raw.opcode, &raw.data[..len - 1])
    }
}

impl VlcbFrame {
    /// Create a frame from an opcode and its data bytes
    pub fn new(opcode: u8, data: &[u8]) -> FrameResult<Self> {
        if data.len() > MAX_DATA_BYTES {
            return Err(FrameError::PayloadTooLong { len: data.len() });
        }

        let mut buf = [0u8; MAX_DATA_BYTES];
        buf[..data.len()].copy_from_slice(data);
        Ok(Self {
            len: data.len() as u8 + 1,
            opcode,
            data: buf,
        })
    }

    /// Create a frame whose data starts with a node number, followed by `rest`
    pub fn with_node_number(opcode: u8, node_number: u16, rest: &[u8]) -> FrameResult<Self> {
        if rest.len() > MAX_DATA_BYTES - 2 {
            return Err(FrameError::PayloadTooLong {
                len: rest.len() + 2,
            });
        }

        let mut data = [0u8; MAX_DATA_BYTES];
        data[..2].copy_from_slice(&node_number.to_be_bytes());
        data[2..2 + rest.len()].copy_from_slice(rest);
        Self::new(opcode, &data[..2 + rest.len()])
    }

    /// A frame with no opcode and no data
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a frame from its wire bytes (opcode first)
    pub fn from_bytes(bytes: &[u8]) -> FrameResult<Self> {
        match bytes.split_first() {
            None => Ok(Self::empty()),
            Some((&opcode, data)) => Self::new(opcode, data),
        }
    }

    /// Number of bytes in use, opcode included
    pub fn len(&self) -> u8 {
        self.len
    }

    /// True for a frame without an opcode
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The opcode byte
    pub fn opcode(&self) -> u8 {
        self.opcode
    }

    /// All seven data bytes, zero-filled past the frame length
    pub fn data(&self) -> &[u8; MAX_DATA_BYTES] {
        &self.data
    }

    /// Only the data bytes covered by the frame length
    pub fn payload(&self) -> &[u8] {
        let used = (self.len as usize).saturating_sub(1);
        &self.data[..used]
    }

    /// Node number carried in the first two data bytes, if present
    pub fn node_number(&self) -> Option<u16> {
        (self.len >= 3).then(|| u16::from_be_bytes([self.data[0], self.data[1]]))
    }

    /// The fixed 8-byte wire image: opcode then zero-filled data
    pub fn to_bytes(&self) -> [u8; MAX_DATA_BYTES + 1] {
        let mut bytes = [0u8; MAX_DATA_BYTES + 1];
        if self.len > 0 {
            bytes[0] = self.opcode;
            bytes[1..].copy_from_slice(&self.data);
        }
        bytes
    }

    /// Wire bytes covered by the frame length
    pub fn as_wire(&self) -> Vec<u8> {
        self.to_bytes()[..self.len as usize].to_vec()
    }
}

impl std::fmt::Display for VlcbFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "[empty]");
        }
        write!(f, "[{:02X}", self.opcode)?;
        for byte in self.payload() {
            write!(f, " {:02X}", byte)?;
        }
        write!(f, "]")
    }
}
