use bitflags::bitflags;
use std::fmt;

/// Low five bits of a transfer id, the part that travels in the tail byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TransferId(u8);

impl TransferId {
    pub const MODULO: u64 = 32;
    const MASK: u8 = 0x1F;

    pub fn from_truncating(value: u64) -> Self {
        Self((value % Self::MODULO) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl From<TransferId> for u8 {
    fn from(value: TransferId) -> Self {
        value.0
    }
}

impl fmt::Display for TransferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TailFlags: u8 {
        const START_OF_TRANSFER = 1 << 7;
        const END_OF_TRANSFER = 1 << 6;
        const TOGGLE = 1 << 5;
    }
}

/// Last byte of every frame: SOT, EOT, toggle, transfer id (bit 7 down to bit 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TailByte {
    pub start_of_transfer: bool,
    pub end_of_transfer: bool,
    pub toggle_bit: bool,
    pub transfer_id: TransferId,
}

/// Toggle bit value of the first frame of every transfer
pub const SOT_TOGGLE_BIT: bool = true;

impl TailByte {
    pub fn new(
        start_of_transfer: bool,
        end_of_transfer: bool,
        toggle_bit: bool,
        transfer_id: TransferId,
    ) -> Self {
        Self {
            start_of_transfer,
            end_of_transfer,
            toggle_bit,
            transfer_id,
        }
    }

    pub fn encode(&self) -> u8 {
        let mut flags = TailFlags::empty();
        flags.set(TailFlags::START_OF_TRANSFER, self.start_of_transfer);
        flags.set(TailFlags::END_OF_TRANSFER, self.end_of_transfer);
        flags.set(TailFlags::TOGGLE, self.toggle_bit);
        flags.bits() | self.transfer_id.value()
    }

    pub fn decode(byte: u8) -> Self {
        let flags = TailFlags::from_bits_truncate(byte);
        Self {
            start_of_transfer: flags.contains(TailFlags::START_OF_TRANSFER),
            end_of_transfer: flags.contains(TailFlags::END_OF_TRANSFER),
            toggle_bit: flags.contains(TailFlags::TOGGLE),
            transfer_id: TransferId(byte & TransferId::MASK),
        }
    }
}

impl From<TailByte> for u8 {
    fn from(value: TailByte) -> Self {
        value.encode()
    }
}

impl From<u8> for TailByte {
    fn from(value: u8) -> Self {
        Self::decode(value)
    }
}
