use super::frame::CyphalFrame;
use super::reassembler::ReceivedTransfer;
use super::serializer::{Transfer, TransferSerializer};
use super::session::{ReceptionStats, SessionKey, SessionTable};
use super::TransportLayer;
use crate::data_link::Mtu;
use crate::error::{CyphalError, Result};
use crate::physical::PhysicalLayer;
use crate::types::{Config, Frame};
use log::{trace, warn};

/// Cyphal/CAN transport configuration
#[derive(Debug, Clone)]
pub struct CanTransportConfig {
    pub mtu: Mtu,
    pub timeout_ms: u32,
}

impl Config for CanTransportConfig {
    fn validate(&self) -> Result<()> {
        if self.timeout_ms == 0 {
            return Err(CyphalError::InvalidConfiguration(
                "timeout must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

impl Default for CanTransportConfig {
    fn default() -> Self {
        Self {
            mtu: Mtu::Classic,
            timeout_ms: 1000,
        }
    }
}

/// Cyphal/CAN transport over one media interface
pub struct CanTransport<P: PhysicalLayer> {
    config: CanTransportConfig,
    physical: P,
    sessions: SessionTable,
    is_open: bool,
}

impl<P: PhysicalLayer> CanTransport<P> {
    /// Creates a new transport instance with the given physical layer
    pub fn with_physical(config: CanTransportConfig, physical: P) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            physical,
            sessions: SessionTable::new(),
            is_open: false,
        })
    }

    pub fn config(&self) -> &CanTransportConfig {
        &self.config
    }

    pub fn physical(&self) -> &P {
        &self.physical
    }

    pub fn physical_mut(&mut self) -> &mut P {
        &mut self.physical
    }

    pub fn stats(&self) -> ReceptionStats {
        self.sessions.stats()
    }

    /// Abandons a stalled reception
    pub fn reset_session(&mut self, key: SessionKey) {
        self.sessions.reset(key);
    }

    /// Feeds one frame received outside of [`TransportLayer::receive`]
    pub fn process_frame(&mut self, frame: &Frame) -> Result<Option<ReceivedTransfer>> {
        let frame = CyphalFrame::parse(frame)?;
        Ok(self.sessions.feed(&frame)?)
    }

    fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        if !self.is_open {
            return Err(CyphalError::NotInitialized);
        }
        self.physical.send_frame(frame)
    }

    fn read_frame(&mut self) -> Result<Frame> {
        if !self.is_open {
            return Err(CyphalError::NotInitialized);
        }
        self.physical.receive_frame()
    }
}

impl<P: PhysicalLayer> TransportLayer for CanTransport<P> {
    type Config = CanTransportConfig;

    fn new(_config: Self::Config) -> Result<Self> {
        Err(CyphalError::NotInitialized) // Requires physical layer
    }

    fn open(&mut self) -> Result<()> {
        if self.is_open {
            return Ok(());
        }
        self.physical.open()?;
        self.physical.set_timeout(self.config.timeout_ms)?;
        self.is_open = true;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if !self.is_open {
            return Ok(());
        }
        self.is_open = false;
        self.sessions.reset_all();
        self.physical.close()
    }

    fn send(&mut self, transfer: &Transfer<'_>) -> Result<()> {
        if !self.is_open {
            return Err(CyphalError::NotInitialized);
        }
        let serializer =
            TransferSerializer::from_transfer(transfer, self.config.mtu.max_frame_payload_bytes())?;
        for frame in serializer.frames() {
            self.write_frame(&frame.compile()?)?;
        }
        trace!(
            "sent transfer {} on {:#x} ({} bytes)",
            transfer.transfer_id,
            transfer.identifier,
            transfer.payload_length()
        );
        Ok(())
    }

    fn receive(&mut self) -> Result<ReceivedTransfer> {
        loop {
            let raw = self.read_frame()?;
            let frame = match CyphalFrame::parse(&raw) {
                Ok(frame) => frame,
                Err(e) => {
                    warn!("dropping frame {:#x}: {}", raw.id, e);
                    continue;
                }
            };
            // Reception errors are logged and counted by the session table
            if let Ok(Some(transfer)) = self.sessions.feed(&frame) {
                return Ok(transfer);
            }
        }
    }

    fn set_timeout(&mut self, timeout_ms: u32) -> Result<()> {
        if !self.is_open {
            return Err(CyphalError::NotInitialized);
        }
        if timeout_ms == 0 {
            return Err(CyphalError::InvalidConfiguration(
                "timeout must be non-zero".into(),
            ));
        }
        self.config.timeout_ms = timeout_ms;
        self.physical.set_timeout(timeout_ms)
    }
}
