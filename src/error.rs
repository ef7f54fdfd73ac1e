use thiserror::Error;

/// Faults detected while reassembling a single transfer.
///
/// These are local to one reception session: the partial transfer is dropped and
/// the session goes back to idle, subsequent frames are processed normally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ReceptionError {
    #[error("toggle bit violation: expected {expected}, received {received}")]
    ToggleViolation { expected: bool, received: bool },

    #[error("transfer id mismatch: expected {expected}, received {received}")]
    TransferIdMismatch { expected: u8, received: u8 },

    #[error("transfer CRC mismatch: transmitted {transmitted:#06x}, computed {computed:#06x}")]
    CrcMismatch { transmitted: u16, computed: u16 },
}

#[derive(Debug, Error)]
pub enum CyphalError {
    // Configuration errors
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    // Frame level errors
    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    // Transfer level errors
    #[error("reception error: {0}")]
    Reception(#[from] ReceptionError),

    // Generic errors
    #[error("operation timed out")]
    Timeout,
    #[error("buffer overflow")]
    BufferOverflow,
    #[error("component not initialized")]
    NotInitialized,
    #[error("port error: {0}")]
    PortError(String),
}

pub type Result<T> = std::result::Result<T, CyphalError>;
