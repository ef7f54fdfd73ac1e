/// Transfer CRC appended to multi-frame transfers.
///
/// CRC-16/CCITT-FALSE: polynomial 0x1021, initial value 0xFFFF, no reflection,
/// no final XOR. The accumulator is a plain value; feed it bytes in payload order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferCrc(u16);

impl Default for TransferCrc {
    fn default() -> Self {
        Self(Self::INIT_VALUE)
    }
}

impl TransferCrc {
    pub const LENGTH: usize = 2;
    const INIT_VALUE: u16 = 0xFFFF;
    const POLYNOMIAL: u16 = 0x1021;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, byte: u8) {
        self.0 ^= u16::from(byte) << 8;
        for _bit in 0..8 {
            if (self.0 & 0x8000) != 0 {
                self.0 = (self.0 << 1) ^ Self::POLYNOMIAL;
            } else {
                self.0 <<= 1;
            }
        }
    }

    pub fn add_bytes(&mut self, bytes: &[u8]) {
        bytes.iter().for_each(|&byte| self.add(byte));
    }

    pub fn value(&self) -> u16 {
        self.0
    }

    /// Digest in wire order, high byte first
    pub fn to_be_bytes(&self) -> [u8; Self::LENGTH] {
        self.0.to_be_bytes()
    }
}

impl From<u16> for TransferCrc {
    fn from(value: u16) -> Self {
        Self(value)
    }
}
