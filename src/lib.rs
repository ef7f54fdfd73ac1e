//! Cyphal/CAN transport layer.
//!
//! Serializes transfers into CAN / CAN FD frames and reassembles them on reception:
//! tail byte encoding, DLC padding, transfer CRC and per-session reassembly.

// Layer modules
pub mod data_link; // DLC table and MTU
pub mod physical; // Media interface and loopback mock
pub mod transport; // Transfer framing and reassembly

// Re-exports for convenience
pub use transport::{
    serialize_transfer, CanTransport, CanTransportConfig, CyphalFrame, ReceivedTransfer,
    SessionTable, Transfer,
};

// Common types and traits
pub mod error;
pub mod types;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_valid() {
        assert!(!VERSION.is_empty());
    }
}
