//! Node identity and module parameters
//!
//! The identity is the mutable part of a node's bookkeeping: its node number,
//! CAN id and operating mode. Module parameters are fixed at build time and
//! reported through PARAMS, PARAN, PNN and NAME.

use vlcbkit_core::constants::UNASSIGNED_NODE_NUMBER;
use vlcbkit_core::{modes, params};

/// Operating mode of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// No node number assigned
    #[default]
    Uninitialised,
    /// Waiting for a node number from a configuration tool
    Setup,
    /// Operating with an assigned node number
    Normal,
}

impl Mode {
    /// Mode code as carried by the MODE opcode
    pub fn code(self) -> u8 {
        match self {
            Self::Uninitialised => modes::MODE_UNINITIALISED,
            Self::Setup => modes::MODE_SETUP,
            Self::Normal => modes::MODE_NORMAL,
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Uninitialised => write!(f, "Uninitialised"),
            Self::Setup => write!(f, "Setup"),
            Self::Normal => write!(f, "Normal"),
        }
    }
}

/// This node's identity on the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeIdentity {
    /// Assigned node number, 0 when uninitialised
    pub node_number: u16,
    /// CAN id used when framing outbound traffic
    pub can_id: u8,
    /// Current operating mode
    pub mode: Mode,
    /// Mode to return to when setup is abandoned
    pub previous_mode: Mode,
    /// Heartbeat enabled
    pub heartbeat: bool,
}

impl NodeIdentity {
    /// Identity for `node_number`; a non-zero number starts in normal mode
    pub fn new(node_number: u16, can_id: u8) -> Self {
        let mode = if node_number == UNASSIGNED_NODE_NUMBER {
            Mode::Uninitialised
        } else {
            Mode::Normal
        };
        Self {
            node_number,
            can_id,
            mode,
            previous_mode: mode,
            heartbeat: true,
        }
    }

    /// Enter setup, remembering the current mode
    pub fn enter_setup(&mut self) {
        if self.mode != Mode::Setup {
            self.previous_mode = self.mode;
            self.mode = Mode::Setup;
        }
    }

    /// Leave setup without a new node number
    pub fn abort_setup(&mut self) {
        if self.mode == Mode::Setup {
            self.mode = self.previous_mode;
        }
    }

    /// Accept a node number and start normal operation
    pub fn set_normal(&mut self, node_number: u16) {
        self.node_number = node_number;
        self.mode = Mode::Normal;
        self.previous_mode = Mode::Normal;
    }

    /// Drop the node number
    pub fn set_uninitialised(&mut self) {
        self.node_number = UNASSIGNED_NODE_NUMBER;
        self.mode = Mode::Uninitialised;
        self.previous_mode = Mode::Uninitialised;
    }

    /// True when a frame targeted at `node_number` is meant for this node
    pub fn is_addressed(&self, node_number: u16) -> bool {
        node_number == self.node_number
    }
}

impl Default for NodeIdentity {
    fn default() -> Self {
        Self::new(UNASSIGNED_NODE_NUMBER, 1)
    }
}

/// Fixed module parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleParameters {
    pub manufacturer_id: u8,
    pub minor_version: u8,
    pub module_id: u8,
    pub max_events: u8,
    pub num_evs: u8,
    pub num_nvs: u8,
    pub major_version: u8,
    /// Flags reported in every mode; PF_NORMAL is added while in normal mode
    pub flags: u8,
    /// Module name, space padded
    pub name: [u8; 7],
}

impl ModuleParameters {
    /// Number of parameters reported for index 0
    pub const COUNT: u8 = params::PAR_FLAGS;

    /// Flags for the given mode
    pub fn flags(&self, mode: Mode) -> u8 {
        match mode {
            Mode::Normal => self.flags | params::PF_NORMAL,
            _ => self.flags & !params::PF_NORMAL,
        }
    }

    /// Parameter `index` (0 is the parameter count), or `None` past the end
    pub fn get(&self, index: u8, mode: Mode) -> Option<u8> {
        let value = match index {
            params::PAR_NUM => Self::COUNT,
            params::PAR_MANU => self.manufacturer_id,
            params::PAR_MINVER => self.minor_version,
            params::PAR_MTYP => self.module_id,
            params::PAR_EVTNUM => self.max_events,
            params::PAR_EVNUM => self.num_evs,
            params::PAR_NVNUM => self.num_nvs,
            params::PAR_MAJVER => self.major_version,
            params::PAR_FLAGS => self.flags(mode),
            _ => return None,
        };
        Some(value)
    }

    /// The first seven parameters as carried by PARAMS
    pub fn params_block(&self) -> [u8; 7] {
        [
            self.manufacturer_id,
            self.minor_version,
            self.module_id,
            self.max_events,
            self.num_evs,
            self.num_nvs,
            self.major_version,
        ]
    }
}

impl Default for ModuleParameters {
    fn default() -> Self {
        Self {
            manufacturer_id: 250,
            minor_version: b'a',
            module_id: 1,
            max_events: 64,
            num_evs: 4,
            num_nvs: 0,
            major_version: 1,
            flags: params::PF_CONSUMER,
            name: *b"VLCBKIT",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_initial_mode() {
        assert_eq!(NodeIdentity::new(0, 1).mode, Mode::Uninitialised);
        assert_eq!(NodeIdentity::new(0x0104, 1).mode, Mode::Normal);
    }

    #[test]
    fn test_setup_abort_restores_mode() {
        let mut identity = NodeIdentity::new(0x0104, 1);
        identity.enter_setup();
        identity.enter_setup();
        assert_eq!(identity.mode, Mode::Setup);
        identity.abort_setup();
        assert_eq!(identity.mode, Mode::Normal);
        assert_eq!(identity.node_number, 0x0104);
    }

    #[test]
    fn test_set_normal_and_uninitialised() {
        let mut identity = NodeIdentity::default();
        identity.enter_setup();
        identity.set_normal(300);
        assert_eq!(identity.mode, Mode::Normal);
        assert!(identity.is_addressed(300));

        identity.set_uninitialised();
        assert_eq!(identity.node_number, 0);
        assert_eq!(identity.mode.code(), modes::MODE_UNINITIALISED);
    }

    #[test]
    fn test_parameters_by_index() {
        let parameters = ModuleParameters::default();
        assert_eq!(parameters.get(params::PAR_NUM, Mode::Setup), Some(8));
        assert_eq!(parameters.get(params::PAR_MANU, Mode::Setup), Some(250));
        assert_eq!(parameters.get(params::PAR_MINVER, Mode::Setup), Some(b'a'));
        assert_eq!(parameters.get(9, Mode::Setup), None);
    }

    #[test]
    fn test_flags_follow_mode() {
        let parameters = ModuleParameters::default();
        assert_eq!(parameters.flags(Mode::Setup), params::PF_CONSUMER);
        assert_eq!(
            parameters.get(params::PAR_FLAGS, Mode::Normal),
            Some(params::PF_CONSUMER | params::PF_NORMAL)
        );
    }
}
