use super::TAIL_BYTE_LENGTH;

/// Frame data length selected by each DLC value (0..=8 classic, 9..=15 CAN FD only)
pub const DLC_TO_LENGTH: [usize; 16] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 12, 16, 20, 24, 32, 48, 64];

/// A DLC-legal frame data length
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DataLength(u8);

impl DataLength {
    pub const MAX: usize = 64;

    /// Returns `Some` only if `value` is exactly representable by a DLC
    pub fn new(value: usize) -> Option<Self> {
        length_to_dlc(value).map(|_| Self(value as u8))
    }

    /// Smallest legal length not below `value`
    pub fn new_ceil(value: usize) -> Option<Self> {
        DLC_TO_LENGTH
            .iter()
            .copied()
            .find(|&length| length >= value)
            .map(|length| Self(length as u8))
    }

    pub fn as_usize(self) -> usize {
        self.0 as usize
    }

    pub fn dlc(self) -> u8 {
        // Constructors only admit table entries
        length_to_dlc(self.as_usize()).unwrap_or(0)
    }
}

impl From<DataLength> for usize {
    fn from(value: DataLength) -> Self {
        value.as_usize()
    }
}

pub fn length_to_dlc(length: usize) -> Option<u8> {
    DLC_TO_LENGTH
        .iter()
        .position(|&l| l == length)
        .map(|dlc| dlc as u8)
}

pub fn dlc_to_length(dlc: u8) -> Option<usize> {
    DLC_TO_LENGTH.get(dlc as usize).copied()
}

/// Number of padding bytes to append after `data_length` transfer bytes.
///
/// The tail byte follows the padding, so the frame `data_length + padding + 1` is
/// rounded up to the nearest DLC-legal length. The result never takes the frame
/// beyond `max_frame_payload_bytes` of transfer data. Callers must ensure
/// `data_length <= max_frame_payload_bytes`.
pub fn required_padding(data_length: usize, max_frame_payload_bytes: usize) -> usize {
    let framed = data_length + TAIL_BYTE_LENGTH;
    let legal = match DataLength::new_ceil(framed) {
        Some(length) => length.as_usize(),
        None => return 0,
    };
    (legal - framed).min(max_frame_payload_bytes.saturating_sub(data_length))
}
