use super::PhysicalLayer;
use crate::data_link::Mtu;
use crate::error::{CyphalError, Result};
use crate::types::{Config, Frame};
use log::warn;
use std::collections::VecDeque;

/// Mock frame handler function type; may rewrite or drop (`None`) each sent frame
pub type MockFrameHandler = Box<dyn FnMut(&Frame) -> Option<Frame> + Send + Sync>;

#[derive(Debug, Clone)]
pub struct MockConfig {
    pub timeout_ms: u32,
    pub mtu: Mtu,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 1000,
            mtu: Mtu::Fd,
        }
    }
}

impl Config for MockConfig {
    fn validate(&self) -> Result<()> {
        if self.timeout_ms == 0 {
            return Err(CyphalError::InvalidConfiguration(
                "timeout must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

/// Mock physical layer for testing.
///
/// Every sent frame is passed through the optional handler and queued for
/// reception, so a transport talks to itself. Receiving from an empty queue
/// reports [`CyphalError::Timeout`].
pub struct MockPhysical {
    config: MockConfig,
    frame_handler: Option<MockFrameHandler>,
    rx_queue: VecDeque<Frame>,
    sent: Vec<Frame>,
    is_open: bool,
}

impl MockPhysical {
    /// Creates a new mock physical layer with a custom frame handler
    pub fn new(frame_handler: Option<MockFrameHandler>) -> Self {
        Self {
            config: MockConfig::default(),
            frame_handler,
            rx_queue: VecDeque::new(),
            sent: Vec::new(),
            is_open: false,
        }
    }

    /// Creates a mock that loops every frame back unchanged
    pub fn new_loopback() -> Self {
        Self::new(None)
    }

    /// Sets a new frame handler
    pub fn set_frame_handler(&mut self, handler: Option<MockFrameHandler>) {
        self.frame_handler = handler;
    }

    /// Queues a frame as if it had arrived from the bus
    pub fn inject(&mut self, frame: Frame) {
        self.rx_queue.push_back(frame);
    }

    /// Frames written so far, before the handler was applied
    pub fn sent_frames(&self) -> &[Frame] {
        &self.sent
    }

    pub fn pending(&self) -> usize {
        self.rx_queue.len()
    }
}

impl PhysicalLayer for MockPhysical {
    type Config = MockConfig;

    fn new(config: Self::Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            frame_handler: None,
            rx_queue: VecDeque::new(),
            sent: Vec::new(),
            is_open: false,
        })
    }

    fn open(&mut self) -> Result<()> {
        self.is_open = true;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.is_open = false;
        Ok(())
    }

    fn send_frame(&mut self, frame: &Frame) -> Result<()> {
        if !self.is_open {
            return Err(CyphalError::NotInitialized);
        }
        if frame.data.len() > self.config.mtu.frame_length() {
            warn!(
                "{} data bytes exceed the {:?} MTU",
                frame.data.len(),
                self.config.mtu
            );
            return Err(CyphalError::BufferOverflow);
        }
        self.sent.push(frame.clone());

        let delivered = match self.frame_handler.as_mut() {
            Some(handler) => handler(frame),
            None => Some(frame.clone()),
        };
        if let Some(delivered) = delivered {
            self.rx_queue.push_back(delivered);
        }
        Ok(())
    }

    fn receive_frame(&mut self) -> Result<Frame> {
        if !self.is_open {
            return Err(CyphalError::NotInitialized);
        }
        self.rx_queue.pop_front().ok_or(CyphalError::Timeout)
    }

    fn set_timeout(&mut self, timeout_ms: u32) -> Result<()> {
        self.config.timeout_ms = timeout_ms;
        Ok(())
    }
}
