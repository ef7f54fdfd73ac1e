use super::tail::{TailByte, TransferId};
use crate::data_link::dlc::DataLength;
use crate::error::{CyphalError, Result};
use crate::types::{CanId, Frame, CAN_EXT_ID_MASK};

/// Transport frame: a raw media frame with the tail byte decoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CyphalFrame {
    pub identifier: CanId,
    /// Transfer bytes (payload, padding or CRC), tail byte excluded
    pub padded_payload: Vec<u8>,
    pub transfer_id: TransferId,
    pub start_of_transfer: bool,
    pub end_of_transfer: bool,
    pub toggle_bit: bool,
    pub loopback: bool,
}

impl CyphalFrame {
    pub fn tail(&self) -> TailByte {
        TailByte::new(
            self.start_of_transfer,
            self.end_of_transfer,
            self.toggle_bit,
            self.transfer_id,
        )
    }

    pub fn is_single_frame(&self) -> bool {
        self.start_of_transfer && self.end_of_transfer
    }

    /// Encodes the frame for the media layer, appending the tail byte
    pub fn compile(&self) -> Result<Frame> {
        if self.identifier & !CAN_EXT_ID_MASK != 0 {
            return Err(CyphalError::MalformedFrame(format!(
                "identifier {:#x} exceeds 29 bits",
                self.identifier
            )));
        }
        let mut data = Vec::with_capacity(self.padded_payload.len() + 1);
        data.extend_from_slice(&self.padded_payload);
        data.push(self.tail().encode());
        if DataLength::new(data.len()).is_none() {
            return Err(CyphalError::MalformedFrame(format!(
                "frame length {} is not DLC-legal",
                data.len()
            )));
        }

        Ok(Frame {
            id: self.identifier,
            is_fd: data.len() > 8,
            data,
            timestamp: 0,
            is_extended: true,
            loopback: self.loopback,
        })
    }

    /// Decodes a media frame; the last data byte must be a tail byte
    pub fn parse(frame: &Frame) -> Result<Self> {
        if !frame.is_extended {
            return Err(CyphalError::MalformedFrame(format!(
                "standard identifier {:#x}",
                frame.id
            )));
        }
        if frame.id & !CAN_EXT_ID_MASK != 0 {
            return Err(CyphalError::MalformedFrame(format!(
                "identifier {:#x} exceeds 29 bits",
                frame.id
            )));
        }
        let (&tail, payload) = frame
            .data
            .split_last()
            .ok_or_else(|| CyphalError::MalformedFrame("frame without tail byte".into()))?;
        let tail = TailByte::decode(tail);

        Ok(Self {
            identifier: frame.id,
            padded_payload: payload.to_vec(),
            transfer_id: tail.transfer_id,
            start_of_transfer: tail.start_of_transfer,
            end_of_transfer: tail.end_of_transfer,
            toggle_bit: tail.toggle_bit,
            loopback: frame.loopback,
        })
    }
}

impl TryFrom<&Frame> for CyphalFrame {
    type Error = CyphalError;

    fn try_from(frame: &Frame) -> Result<Self> {
        Self::parse(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(payload: &[u8]) -> CyphalFrame {
        CyphalFrame {
            identifier: 0xBADC0FE,
            padded_payload: payload.to_vec(),
            transfer_id: TransferId::from_truncating(19),
            start_of_transfer: true,
            end_of_transfer: false,
            toggle_bit: true,
            loopback: false,
        }
    }

    #[test]
    fn compile_appends_tail() {
        let raw = frame(&[1, 2, 3]).compile().unwrap();
        assert_eq!(raw.id, 0xBADC0FE);
        assert_eq!(raw.data, vec![1, 2, 3, 0b1010_0000 + 19]);
        assert!(raw.is_extended);
        assert!(!raw.is_fd);
    }

    #[test]
    fn compile_marks_fd_frames() {
        let raw = frame(&[0; 11]).compile().unwrap();
        assert_eq!(raw.data.len(), 12);
        assert!(raw.is_fd);
    }

    #[test]
    fn compile_rejects_illegal_length() {
        assert!(matches!(
            frame(&[0; 9]).compile(),
            Err(CyphalError::MalformedFrame(_))
        ));
        assert!(matches!(
            frame(&[0; 64]).compile(),
            Err(CyphalError::MalformedFrame(_))
        ));
    }

    #[test]
    fn compile_rejects_wide_identifier() {
        let mut wide = frame(&[]);
        wide.identifier = 0x2000_0000;
        assert!(matches!(wide.compile(), Err(CyphalError::MalformedFrame(_))));
    }

    #[test]
    fn parse_inverts_compile() {
        let original = frame(&[9, 8, 7, 6, 5, 4, 3]);
        let parsed = CyphalFrame::parse(&original.compile().unwrap()).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn parse_rejects_empty_frame() {
        let raw = Frame::default();
        assert!(matches!(
            CyphalFrame::try_from(&raw),
            Err(CyphalError::MalformedFrame(_))
        ));
    }

    #[test]
    fn parse_rejects_standard_identifier() {
        let raw = Frame {
            id: 0x123,
            data: vec![0xE0],
            is_extended: false,
            ..Default::default()
        };
        assert!(CyphalFrame::parse(&raw).is_err());
    }
}
