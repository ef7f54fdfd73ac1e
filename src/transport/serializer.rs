//! Transfer serialization.
//!
//! A transfer that fits into one frame is sent as a single frame with
//! SOT = EOT = toggle = 1 and no CRC. Longer transfers get a CRC-16 trailer:
//!
//! ```text
//! payload fragments ++ padding (0x55) ++ CRC (big endian)
//! ```
//!
//! The whole stream is cut into `max_frame_payload_bytes` chunks, so frame
//! boundaries never depend on how the caller fragmented the payload. Padding is only
//! inserted when the final frame would otherwise have an illegal DLC and is covered
//! by the CRC.

use super::crc::TransferCrc;
use super::frame::CyphalFrame;
use super::refragment::{refragment, Refragment};
use super::tail::{TransferId, SOT_TOGGLE_BIT};
use crate::data_link::dlc::required_padding;
use crate::error::{CyphalError, Result};
use crate::types::CanId;
use log::trace;
use std::iter::{Chain, Copied, Once, Peekable};
use std::slice::Iter;

/// Fill value of padding bytes
pub const PADDING_PATTERN: u8 = 0x55;

/// Outgoing transfer as handed over by the session layer
#[derive(Debug, Clone)]
pub struct Transfer<'a> {
    /// Compiled arbitration identifier, opaque to this layer
    pub identifier: CanId,
    /// Full transfer id; only the low five bits go on the wire
    pub transfer_id: u64,
    /// Payload in order; fragment boundaries carry no meaning
    pub fragmented_payload: Vec<&'a [u8]>,
    pub loopback: bool,
}

impl<'a> Transfer<'a> {
    pub fn new(identifier: CanId, transfer_id: u64, payload: &'a [u8]) -> Self {
        Self {
            identifier,
            transfer_id,
            fragmented_payload: vec![payload],
            loopback: false,
        }
    }

    pub fn payload_length(&self) -> usize {
        self.fragmented_payload.iter().map(|f| f.len()).sum()
    }
}

/// Serialization plan for one transfer.
///
/// Padding and CRC are computed up front; [`TransferSerializer::frames`] then
/// produces the frames lazily.
#[derive(Debug)]
pub struct TransferSerializer<'a> {
    identifier: CanId,
    transfer_id: TransferId,
    fragments: &'a [&'a [u8]],
    trailer: Vec<u8>,
    max_frame_payload_bytes: usize,
    loopback: bool,
}

impl<'a> TransferSerializer<'a> {
    pub fn new(
        identifier: CanId,
        transfer_id: u64,
        fragments: &'a [&'a [u8]],
        max_frame_payload_bytes: usize,
        loopback: bool,
    ) -> Result<Self> {
        if max_frame_payload_bytes < 1 {
            return Err(CyphalError::InvalidConfiguration(format!(
                "invalid max payload: {max_frame_payload_bytes}"
            )));
        }

        let payload_length: usize = fragments.iter().map(|f| f.len()).sum();
        let trailer = if payload_length <= max_frame_payload_bytes {
            let padding = required_padding(payload_length, max_frame_payload_bytes);
            vec![PADDING_PATTERN; padding]
        } else {
            let last_frame_payload_length = payload_length % max_frame_payload_bytes;
            let last_frame_data_length = last_frame_payload_length + TransferCrc::LENGTH;
            let padding = if last_frame_data_length >= max_frame_payload_bytes {
                0
            } else {
                required_padding(last_frame_data_length, max_frame_payload_bytes)
            };

            let mut trailer = vec![PADDING_PATTERN; padding];
            let mut crc = TransferCrc::new();
            fragments.iter().for_each(|f| crc.add_bytes(f));
            crc.add_bytes(&trailer);
            trailer.extend_from_slice(&crc.to_be_bytes());
            trailer
        };

        Ok(Self {
            identifier,
            transfer_id: TransferId::from_truncating(transfer_id),
            fragments,
            trailer,
            max_frame_payload_bytes,
            loopback,
        })
    }

    pub fn from_transfer(transfer: &'a Transfer<'a>, max_frame_payload_bytes: usize) -> Result<Self> {
        Self::new(
            transfer.identifier,
            transfer.transfer_id,
            &transfer.fragmented_payload,
            max_frame_payload_bytes,
            transfer.loopback,
        )
    }

    pub fn frames(&self) -> Frames<'_> {
        let stream = self
            .fragments
            .iter()
            .copied()
            .chain(std::iter::once(self.trailer.as_slice()));
        Frames {
            identifier: self.identifier,
            transfer_id: self.transfer_id,
            loopback: self.loopback,
            // The chunk size was validated in `new`
            chunks: refragment(stream, self.max_frame_payload_bytes)
                .ok()
                .map(Iterator::peekable),
            index: 0,
        }
    }
}

type ByteStream<'s> = Chain<Copied<Iter<'s, &'s [u8]>>, Once<&'s [u8]>>;

/// Lazy frame sequence of one transfer
pub struct Frames<'s> {
    identifier: CanId,
    transfer_id: TransferId,
    loopback: bool,
    chunks: Option<Peekable<Refragment<'s, ByteStream<'s>>>>,
    index: usize,
}

impl Iterator for Frames<'_> {
    type Item = CyphalFrame;

    fn next(&mut self) -> Option<Self::Item> {
        let chunks = self.chunks.as_mut()?;
        let payload = match chunks.next() {
            Some(chunk) => chunk.into_owned(),
            // An empty transfer still occupies one frame
            None if self.index == 0 => Vec::new(),
            None => return None,
        };
        let last = chunks.peek().is_none();
        let index = self.index;
        self.index += 1;

        let frame = CyphalFrame {
            identifier: self.identifier,
            padded_payload: payload,
            transfer_id: self.transfer_id,
            start_of_transfer: index == 0,
            end_of_transfer: last,
            toggle_bit: (index % 2 == 0) == SOT_TOGGLE_BIT,
            loopback: self.loopback,
        };
        trace!(
            "serialized frame #{} of transfer {} ({} bytes, last: {})",
            index,
            self.transfer_id,
            frame.padded_payload.len(),
            last
        );
        if last {
            self.chunks = None;
        }
        Some(frame)
    }
}

/// Serializes a transfer into the complete frame sequence
pub fn serialize_transfer(
    identifier: CanId,
    transfer_id: u64,
    fragmented_payload: &[&[u8]],
    max_frame_payload_bytes: usize,
    loopback: bool,
) -> Result<Vec<CyphalFrame>> {
    let serializer = TransferSerializer::new(
        identifier,
        transfer_id,
        fragmented_payload,
        max_frame_payload_bytes,
        loopback,
    )?;
    Ok(serializer.frames().collect())
}
