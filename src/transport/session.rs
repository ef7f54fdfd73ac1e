use super::frame::CyphalFrame;
use super::reassembler::{Reassembler, ReceivedTransfer};
use crate::error::ReceptionError;
use crate::types::CanId;
use log::warn;
use std::collections::HashMap;

/// Identifies a reception session.
///
/// The compiled CAN identifier already carries priority, data specifier and source
/// node, so frames of one session always share it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionKey(pub CanId);

impl From<CanId> for SessionKey {
    fn from(value: CanId) -> Self {
        Self(value)
    }
}

/// Reception counters, for diagnostics only
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReceptionStats {
    pub frames: u64,
    pub transfers: u64,
    pub orphan_frames: u64,
    pub toggle_violations: u64,
    pub transfer_id_mismatches: u64,
    pub crc_mismatches: u64,
}

impl ReceptionStats {
    pub fn errors(&self) -> u64 {
        self.toggle_violations + self.transfer_id_mismatches + self.crc_mismatches
    }

    fn record_error(&mut self, error: &ReceptionError) {
        match error {
            ReceptionError::ToggleViolation { .. } => self.toggle_violations += 1,
            ReceptionError::TransferIdMismatch { .. } => self.transfer_id_mismatches += 1,
            ReceptionError::CrcMismatch { .. } => self.crc_mismatches += 1,
        }
    }
}

/// Reassemblers of all sessions seen on one interface
#[derive(Debug, Default)]
pub struct SessionTable {
    sessions: HashMap<SessionKey, Reassembler>,
    stats: ReceptionStats,
}

impl SessionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes a frame to its session, creating the session on first use
    pub fn feed(
        &mut self,
        frame: &CyphalFrame,
    ) -> Result<Option<ReceivedTransfer>, ReceptionError> {
        let key = SessionKey(frame.identifier);
        let reassembler = self.sessions.entry(key).or_default();
        let was_idle = reassembler.is_idle();
        self.stats.frames += 1;

        match reassembler.feed(frame) {
            Ok(Some(transfer)) => {
                self.stats.transfers += 1;
                Ok(Some(transfer))
            }
            Ok(None) => {
                if was_idle && !frame.start_of_transfer {
                    self.stats.orphan_frames += 1;
                }
                Ok(None)
            }
            Err(error) => {
                warn!("session {:#x}: transfer discarded: {}", key.0, error);
                self.stats.record_error(&error);
                Err(error)
            }
        }
    }

    pub fn reset(&mut self, key: SessionKey) {
        if let Some(reassembler) = self.sessions.get_mut(&key) {
            reassembler.reset();
        }
    }

    pub fn reset_all(&mut self) {
        self.sessions.values_mut().for_each(Reassembler::reset);
    }

    pub fn remove(&mut self, key: SessionKey) -> bool {
        self.sessions.remove(&key).is_some()
    }

    pub fn contains(&self, key: SessionKey) -> bool {
        self.sessions.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn stats(&self) -> ReceptionStats {
        self.stats
    }
}
