use super::crc::TransferCrc;
use super::frame::CyphalFrame;
use super::tail::TransferId;
use crate::error::ReceptionError;
use crate::types::CanId;
use log::{debug, trace};

/// A completely received transfer.
///
/// `payload` may end with padding bytes; the presentation layer is expected to
/// ignore them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedTransfer {
    pub identifier: CanId,
    pub transfer_id: TransferId,
    pub payload: Vec<u8>,
    pub loopback: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Accumulation {
    transfer_id: TransferId,
    expected_toggle: bool,
    payload: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
enum Phase {
    #[default]
    Idle,
    Accumulating(Accumulation),
}

/// Reception state machine of one session.
///
/// Frames must be fed in arrival order. A start-of-transfer frame always begins a
/// new reception and abandons whatever was in progress. Any violation discards the
/// partial transfer and returns the session to idle; the next frame is processed
/// as usual. Stale receptions are never timed out here, call [`Reassembler::reset`].
#[derive(Debug, Default)]
pub struct Reassembler {
    phase: Phase,
}

impl Reassembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }

    /// Drops any partial transfer
    pub fn reset(&mut self) {
        self.phase = Phase::Idle;
    }

    /// Processes one frame.
    ///
    /// Returns `Ok(Some(_))` when the frame completes a transfer and `Ok(None)`
    /// while a transfer is still accumulating or when a continuation frame arrives
    /// without a reception in progress.
    pub fn feed(
        &mut self,
        frame: &CyphalFrame,
    ) -> Result<Option<ReceivedTransfer>, ReceptionError> {
        if frame.start_of_transfer {
            return Ok(self.start(frame));
        }

        let acc = match &mut self.phase {
            Phase::Idle => {
                trace!(
                    "orphan continuation frame of transfer {} on {:#x}",
                    frame.transfer_id,
                    frame.identifier
                );
                return Ok(None);
            }
            Phase::Accumulating(acc) => acc,
        };

        if frame.transfer_id != acc.transfer_id {
            let error = ReceptionError::TransferIdMismatch {
                expected: acc.transfer_id.value(),
                received: frame.transfer_id.value(),
            };
            self.reset();
            return Err(error);
        }
        if frame.toggle_bit != acc.expected_toggle {
            let error = ReceptionError::ToggleViolation {
                expected: acc.expected_toggle,
                received: frame.toggle_bit,
            };
            self.reset();
            return Err(error);
        }

        acc.payload.extend_from_slice(&frame.padded_payload);
        acc.expected_toggle = !acc.expected_toggle;
        if !frame.end_of_transfer {
            return Ok(None);
        }

        let Phase::Accumulating(acc) = std::mem::take(&mut self.phase) else {
            return Ok(None);
        };
        Self::finish(frame, acc).map(Some)
    }

    fn start(&mut self, frame: &CyphalFrame) -> Option<ReceivedTransfer> {
        if let Phase::Accumulating(previous) = &self.phase {
            debug!(
                "transfer {} on {:#x} superseded by transfer {} after {} bytes",
                previous.transfer_id,
                frame.identifier,
                frame.transfer_id,
                previous.payload.len()
            );
        }

        if frame.end_of_transfer {
            self.phase = Phase::Idle;
            return Some(ReceivedTransfer {
                identifier: frame.identifier,
                transfer_id: frame.transfer_id,
                payload: frame.padded_payload.clone(),
                loopback: frame.loopback,
            });
        }

        self.phase = Phase::Accumulating(Accumulation {
            transfer_id: frame.transfer_id,
            expected_toggle: !frame.toggle_bit,
            payload: frame.padded_payload.clone(),
        });
        None
    }

    fn finish(
        frame: &CyphalFrame,
        acc: Accumulation,
    ) -> Result<ReceivedTransfer, ReceptionError> {
        let mut payload = acc.payload;
        if payload.len() < TransferCrc::LENGTH {
            let mut crc = TransferCrc::new();
            crc.add_bytes(&payload);
            return Err(ReceptionError::CrcMismatch {
                transmitted: 0,
                computed: crc.value(),
            });
        }

        let split = payload.len() - TransferCrc::LENGTH;
        let transmitted = u16::from_be_bytes([payload[split], payload[split + 1]]);
        payload.truncate(split);

        let mut crc = TransferCrc::new();
        crc.add_bytes(&payload);
        if crc.value() != transmitted {
            return Err(ReceptionError::CrcMismatch {
                transmitted,
                computed: crc.value(),
            });
        }

        Ok(ReceivedTransfer {
            identifier: frame.identifier,
            transfer_id: acc.transfer_id,
            payload,
            loopback: frame.loopback,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::serializer::serialize_transfer;

    fn frame(data: &[u8], tid: u64, sot: bool, eot: bool, toggle: bool) -> CyphalFrame {
        CyphalFrame {
            identifier: 0x1234,
            padded_payload: data.to_vec(),
            transfer_id: TransferId::from_truncating(tid),
            start_of_transfer: sot,
            end_of_transfer: eot,
            toggle_bit: toggle,
            loopback: false,
        }
    }

    fn feed_all(
        reassembler: &mut Reassembler,
        frames: &[CyphalFrame],
    ) -> Vec<Result<Option<ReceivedTransfer>, ReceptionError>> {
        frames.iter().map(|f| reassembler.feed(f)).collect()
    }

    #[test]
    fn single_frame_is_delivered_verbatim() {
        let mut reassembler = Reassembler::new();
        let result = reassembler
            .feed(&frame(b"Hello\x55\x55", 4, true, true, true))
            .unwrap()
            .unwrap();
        assert_eq!(result.payload, b"Hello\x55\x55".to_vec());
        assert_eq!(result.transfer_id.value(), 4);
        assert_eq!(result.identifier, 0x1234);
        assert!(reassembler.is_idle());
    }

    #[test]
    fn multi_frame_is_verified_and_delivered() {
        let payload: Vec<u8> = (0..0x1E).collect();
        let frames = serialize_transfer(0x1234, 19, &[&payload], 7, false).unwrap();
        let mut reassembler = Reassembler::new();
        let results = feed_all(&mut reassembler, &frames);

        let (last, rest) = results.split_last().unwrap();
        assert!(rest.iter().all(|r| matches!(r, Ok(None))));
        let transfer = last.clone().unwrap().unwrap();
        assert_eq!(transfer.payload, payload);
        assert_eq!(transfer.transfer_id.value(), 19);
        assert!(reassembler.is_idle());
    }

    #[test]
    fn delivered_payload_keeps_padding() {
        let payload: Vec<u8> = (0..0x1E).collect();
        let frames = serialize_transfer(0x1234, 19, &[&payload], 11, false).unwrap();
        let mut reassembler = Reassembler::new();
        let transfer = feed_all(&mut reassembler, &frames)
            .pop()
            .unwrap()
            .unwrap()
            .unwrap();
        let mut expected = payload.clone();
        expected.push(0x55);
        assert_eq!(transfer.payload, expected);
    }

    #[test]
    fn orphan_continuation_is_dropped_silently() {
        let mut reassembler = Reassembler::new();
        assert_eq!(reassembler.feed(&frame(&[1, 2], 3, false, false, false)), Ok(None));
        assert_eq!(reassembler.feed(&frame(&[1, 2], 3, false, true, true)), Ok(None));
        assert!(reassembler.is_idle());
    }

    #[test]
    fn toggle_violation_discards_reception() {
        let mut reassembler = Reassembler::new();
        assert_eq!(reassembler.feed(&frame(&[0; 7], 5, true, false, true)), Ok(None));
        assert_eq!(
            reassembler.feed(&frame(&[0; 7], 5, false, false, true)),
            Err(ReceptionError::ToggleViolation {
                expected: false,
                received: true
            })
        );
        assert!(reassembler.is_idle());
        // The rest of the broken transfer is now orphaned
        assert_eq!(reassembler.feed(&frame(&[0, 1], 5, false, true, false)), Ok(None));
    }

    #[test]
    fn duplicated_frame_is_a_toggle_violation() {
        let payload: Vec<u8> = (0..20).collect();
        let frames = serialize_transfer(0x1234, 1, &[&payload], 7, false).unwrap();
        let mut reassembler = Reassembler::new();
        assert_eq!(reassembler.feed(&frames[0]), Ok(None));
        assert_eq!(reassembler.feed(&frames[1]), Ok(None));
        assert!(matches!(
            reassembler.feed(&frames[1]),
            Err(ReceptionError::ToggleViolation { .. })
        ));
    }

    #[test]
    fn transfer_id_mismatch_discards_reception() {
        let mut reassembler = Reassembler::new();
        assert_eq!(reassembler.feed(&frame(&[0; 7], 5, true, false, true)), Ok(None));
        assert_eq!(
            reassembler.feed(&frame(&[0; 7], 6, false, false, false)),
            Err(ReceptionError::TransferIdMismatch {
                expected: 5,
                received: 6
            })
        );
        assert!(reassembler.is_idle());
    }

    #[test]
    fn crc_mismatch_is_reported() {
        let payload: Vec<u8> = (0..0x1E).collect();
        let mut frames = serialize_transfer(0x1234, 19, &[&payload], 7, false).unwrap();
        frames[2].padded_payload[3] ^= 0x01;
        let mut reassembler = Reassembler::new();
        let last = feed_all(&mut reassembler, &frames).pop().unwrap();
        assert!(matches!(
            last,
            Err(ReceptionError::CrcMismatch {
                transmitted: 0x3554,
                ..
            })
        ));
        assert!(reassembler.is_idle());
    }

    #[test]
    fn too_short_for_crc_is_a_crc_mismatch() {
        let mut reassembler = Reassembler::new();
        assert_eq!(reassembler.feed(&frame(&[], 2, true, false, true)), Ok(None));
        assert!(matches!(
            reassembler.feed(&frame(&[0xAB], 2, false, true, false)),
            Err(ReceptionError::CrcMismatch { .. })
        ));
    }

    #[test]
    fn new_start_supersedes_reception_in_progress() {
        let first: Vec<u8> = (0..30).collect();
        let second: Vec<u8> = (100..130).collect();
        let first_frames = serialize_transfer(0x1234, 1, &[&first], 7, false).unwrap();
        let second_frames = serialize_transfer(0x1234, 2, &[&second], 7, false).unwrap();

        let mut reassembler = Reassembler::new();
        feed_all(&mut reassembler, &first_frames[..2]);
        let transfer = feed_all(&mut reassembler, &second_frames)
            .pop()
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(transfer.payload, second);
        assert_eq!(transfer.transfer_id.value(), 2);
    }

    #[test]
    fn restart_with_same_transfer_id() {
        let payload: Vec<u8> = (0..30).collect();
        let frames = serialize_transfer(0x1234, 7, &[&payload], 7, false).unwrap();

        let mut reassembler = Reassembler::new();
        feed_all(&mut reassembler, &frames[..3]);
        let transfer = feed_all(&mut reassembler, &frames).pop().unwrap().unwrap();
        assert_eq!(transfer.unwrap().payload, payload);
    }

    #[test]
    fn reset_abandons_reception() {
        let mut reassembler = Reassembler::new();
        assert_eq!(reassembler.feed(&frame(&[0; 7], 5, true, false, true)), Ok(None));
        assert!(!reassembler.is_idle());
        reassembler.reset();
        assert!(reassembler.is_idle());
        assert_eq!(reassembler.feed(&frame(&[0; 7], 5, false, false, false)), Ok(None));
    }
}
