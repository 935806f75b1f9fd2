//! VLCB protocol constants
//!
//! Opcode values, service identifiers, node parameter indices, operating modes
//! and response codes. Numeric values follow the VLCB/CBUS opcode table and
//! must not be changed.

/// Opcodes used by the node core.
pub mod opcodes {
    /// Query node number
    pub const QNN: u8 = 0x0D;
    /// Request node parameters (setup mode only)
    pub const RQNP: u8 = 0x10;
    /// Request module name
    pub const RQMN: u8 = 0x11;
    /// Set node number
    pub const SNN: u8 = 0x42;
    /// Reset node to manufacturer defaults
    pub const NNRSM: u8 = 0x4F;
    /// Request node number (sent by a node entering setup)
    pub const RQNN: u8 = 0x50;
    /// Node number release
    pub const NNREL: u8 = 0x51;
    /// Node number acknowledge
    pub const NNACK: u8 = 0x52;
    /// Software reset
    pub const NNRST: u8 = 0x5E;
    /// Command error
    pub const CMDERR: u8 = 0x6F;
    /// Request a single node parameter
    pub const RQNPN: u8 = 0x73;
    /// Set operating mode
    pub const MODE: u8 = 0x76;
    /// Request service discovery
    pub const RQSD: u8 = 0x78;

    /// Long event ON
    pub const ACON: u8 = 0x90;
    /// Long event OFF
    pub const ACOF: u8 = 0x91;
    /// Short event ON
    pub const ASON: u8 = 0x98;
    /// Short event OFF
    pub const ASOF: u8 = 0x99;
    /// Node parameter response
    pub const PARAN: u8 = 0x9B;

    /// Service discovery response
    pub const SD: u8 = 0xAC;
    /// Generic response
    pub const GRSP: u8 = 0xAF;
    /// Long event ON with one data byte
    pub const ACON1: u8 = 0xB0;
    /// Long event OFF with one data byte
    pub const ACOF1: u8 = 0xB1;
    /// Response to QNN
    pub const PNN: u8 = 0xB6;
    /// Short event ON with one data byte
    pub const ASON1: u8 = 0xB8;
    /// Short event OFF with one data byte
    pub const ASOF1: u8 = 0xB9;

    /// Long event ON with two data bytes
    pub const ACON2: u8 = 0xD0;
    /// Long event OFF with two data bytes
    pub const ACOF2: u8 = 0xD1;
    /// Short event ON with two data bytes
    pub const ASON2: u8 = 0xD8;
    /// Short event OFF with two data bytes
    pub const ASOF2: u8 = 0xD9;

    /// Module name response
    pub const NAME: u8 = 0xE2;
    /// Extended service discovery data
    pub const ESD: u8 = 0xE7;
    /// First seven node parameters
    pub const PARAMS: u8 = 0xEF;
    /// Long event ON with three data bytes
    pub const ACON3: u8 = 0xF0;
    /// Long event OFF with three data bytes
    pub const ACOF3: u8 = 0xF1;
    /// Short event ON with three data bytes
    pub const ASON3: u8 = 0xF8;
    /// Short event OFF with three data bytes
    pub const ASOF3: u8 = 0xF9;
}

/// Node parameter indices as reported by RQNPN/PARAN.
pub mod params {
    /// Number of parameters
    pub const PAR_NUM: u8 = 0;
    /// Manufacturer id
    pub const PAR_MANU: u8 = 1;
    /// Minor code version
    pub const PAR_MINVER: u8 = 2;
    /// Module type id
    pub const PAR_MTYP: u8 = 3;
    /// Number of events supported
    pub const PAR_EVTNUM: u8 = 4;
    /// Event variables per event
    pub const PAR_EVNUM: u8 = 5;
    /// Number of node variables
    pub const PAR_NVNUM: u8 = 6;
    /// Major code version
    pub const PAR_MAJVER: u8 = 7;
    /// Node flags
    pub const PAR_FLAGS: u8 = 8;

    /// Flag: module consumes events
    pub const PF_CONSUMER: u8 = 0x01;
    /// Flag: module is in normal (FLiM) mode
    pub const PF_NORMAL: u8 = 0x04;
    /// Flag: module is in learn mode
    pub const PF_LRN: u8 = 0x20;
}

/// Operating mode codes carried by the MODE opcode.
pub mod modes {
    pub const MODE_UNINITIALISED: u8 = 0x00;
    pub const MODE_SETUP: u8 = 0x01;
    pub const MODE_NORMAL: u8 = 0x02;
    pub const MODE_HEARTBEAT_ON: u8 = 0x0C;
    pub const MODE_HEARTBEAT_OFF: u8 = 0x0D;
}

/// Result codes carried by GRSP and CMDERR.
pub mod responses {
    pub const GRSP_OK: u8 = 0x00;
    pub const CMDERR_INV_CMD: u8 = 0x01;
    pub const CMDERR_INV_PARAM_IDX: u8 = 0x09;
    pub const GRSP_INVALID_SERVICE: u8 = 0xFC;
    pub const GRSP_INVALID_MODE: u8 = 0xFD;
}

/// Maximum number of data bytes following the opcode in a frame.
pub const MAX_DATA_BYTES: usize = 7;

/// Node number used by an uninitialised node.
pub const UNASSIGNED_NODE_NUMBER: u16 = 0;
