pub mod can;
pub mod crc;
pub mod frame;
pub mod reassembler;
pub mod refragment;
pub mod serializer;
pub mod session;
pub mod tail;


pub use can::{CanTransport, CanTransportConfig};
pub use frame::CyphalFrame;
pub use reassembler::{Reassembler, ReceivedTransfer};
pub use serializer::{serialize_transfer, Transfer, TransferSerializer};
pub use session::{ReceptionStats, SessionKey, SessionTable};
pub use tail::{TailByte, TransferId};

use crate::error::Result;
use crate::types::Config;

/// Transport layer trait that must be implemented by Cyphal transports
pub trait TransportLayer: Send + Sync {
    type Config: Config;

    fn new(config: Self::Config) -> Result<Self>
    where
        Self: Sized;
    fn open(&mut self) -> Result<()>;
    fn close(&mut self) -> Result<()>;
    fn send(&mut self, transfer: &Transfer<'_>) -> Result<()>;
    fn receive(&mut self) -> Result<ReceivedTransfer>;
    fn set_timeout(&mut self, timeout_ms: u32) -> Result<()>;
}
