//! Service identifiers and discovery descriptors.

use serde::{Deserialize, Serialize};

/// Identifier of a service type as reported by service discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceId {
    /// Minimum node service
    MinimumNode,
    /// Node variable service
    NodeVariable,
    /// CAN transport service
    Can,
    /// Event teaching service
    Teach,
    /// Event producer service
    Producer,
    /// Event consumer service
    Consumer,
    /// Any other service id
    Other(u8),
}

impl ServiceId {
    /// Wire value of the identifier
    pub fn code(self) -> u8 {
        match self {
            Self::MinimumNode => 1,
            Self::NodeVariable => 2,
            Self::Can => 3,
            Self::Teach => 4,
            Self::Producer => 5,
            Self::Consumer => 6,
            Self::Other(code) => code,
        }
    }
}

impl From<u8> for ServiceId {
    fn from(code: u8) -> Self {
        match code {
            1 => Self::MinimumNode,
            2 => Self::NodeVariable,
            3 => Self::Can,
            4 => Self::Teach,
            5 => Self::Producer,
            6 => Self::Consumer,
            other => Self::Other(other),
        }
    }
}

impl std::fmt::Display for ServiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MinimumNode => write!(f, "MinimumNode"),
            Self::NodeVariable => write!(f, "NodeVariable"),
            Self::Can => write!(f, "CAN"),
            Self::Teach => write!(f, "Teach"),
            Self::Producer => write!(f, "Producer"),
            Self::Consumer => write!(f, "Consumer"),
            Self::Other(code) => write!(f, "Service({})", code),
        }
    }
}

/// Identity of a registered service: its id and implementation version.
///
/// Fixed for the lifetime of the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    /// Service identifier
    pub id: ServiceId,
    /// Implementation version
    pub version: u8,
}

impl ServiceDescriptor {
    /// Create a new descriptor
    pub fn new(id: ServiceId, version: u8) -> Self {
        Self { id, version }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_id_codes_round_trip() {
        for code in 0..=10u8 {
            assert_eq!(ServiceId::from(code).code(), code);
        }
        assert_eq!(ServiceId::Consumer.code(), 6);
        assert_eq!(ServiceId::MinimumNode.code(), 1);
    }

    #[test]
    fn test_service_id_display() {
        assert_eq!(ServiceId::Consumer.to_string(), "Consumer");
        assert_eq!(ServiceId::Other(42).to_string(), "Service(42)");
    }
}
