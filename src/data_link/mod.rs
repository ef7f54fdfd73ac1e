//! Data link layer definitions shared by the Cyphal/CAN transport.
//!
//! CAN and CAN FD frames can only carry a discrete set of data lengths, selected by
//! the Data Length Code (DLC). The [`dlc`] module maps byte counts onto that set and
//! computes how much padding a frame needs to land on a legal length.

pub mod dlc;

use crate::error::{CyphalError, Result};

/// Length of the Cyphal tail byte carried at the end of every frame
pub const TAIL_BYTE_LENGTH: usize = 1;

/// Maximum transmission unit of the underlying bus
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Mtu {
    Classic,
    Fd,
}

impl Mtu {
    /// Number of transfer bytes one frame carries in front of the tail byte
    pub const fn max_frame_payload_bytes(self) -> usize {
        self.frame_length() - TAIL_BYTE_LENGTH
    }

    /// Full frame data length, tail byte included
    pub const fn frame_length(self) -> usize {
        match self {
            Mtu::Classic => 8,
            Mtu::Fd => 64,
        }
    }
}

impl From<Mtu> for usize {
    fn from(value: Mtu) -> Self {
        value.frame_length()
    }
}

impl TryFrom<usize> for Mtu {
    type Error = CyphalError;

    fn try_from(value: usize) -> Result<Self> {
        match value {
            8 => Ok(Mtu::Classic),
            64 => Ok(Mtu::Fd),
            _ => Err(CyphalError::InvalidConfiguration(format!(
                "unsupported MTU: {value}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mtu_payload_capacity() {
        assert_eq!(Mtu::Classic.max_frame_payload_bytes(), 7);
        assert_eq!(Mtu::Fd.max_frame_payload_bytes(), 63);
    }

    #[test]
    fn mtu_from_length() {
        assert_eq!(Mtu::try_from(8usize).unwrap(), Mtu::Classic);
        assert_eq!(Mtu::try_from(64usize).unwrap(), Mtu::Fd);
        assert!(matches!(
            Mtu::try_from(12usize),
            Err(CyphalError::InvalidConfiguration(_))
        ));
    }
}
