//! Physical layer interface.
//!
//! The transport does not drive CAN controllers itself. A media implementation
//! transmits compiled frames and hands received frames back in arrival order,
//! including any acceptance filtering it does on the identifier. With the `mock`
//! feature enabled, `physical::mock` provides a loopback media for tests and
//! host-side tooling.
//!
//! # Examples
//!
//! ```rust
//! # #[cfg(feature = "mock")]
//! # {
//! use libcyphal_can::physical::mock::MockPhysical;
//! use libcyphal_can::physical::PhysicalLayer;
//! use libcyphal_can::types::Frame;
//!
//! let mut media = MockPhysical::new_loopback();
//! media.open().unwrap();
//! media.send_frame(&Frame { id: 0x10, data: vec![0xE0], ..Default::default() }).unwrap();
//! assert_eq!(media.receive_frame().unwrap().id, 0x10);
//! # }
//! ```

#[cfg(any(test, feature = "mock"))]
pub mod mock;

use crate::error::Result;
use crate::types::{Config, Frame};

/// Physical layer trait that must be implemented by CAN media drivers
pub trait PhysicalLayer: Send + Sync {
    type Config: Config;

    fn new(config: Self::Config) -> Result<Self>
    where
        Self: Sized;
    fn open(&mut self) -> Result<()>;
    fn close(&mut self) -> Result<()>;
    fn send_frame(&mut self, frame: &Frame) -> Result<()>;
    fn receive_frame(&mut self) -> Result<Frame>;
    fn set_timeout(&mut self, timeout_ms: u32) -> Result<()>;
}
