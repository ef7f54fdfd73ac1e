/// CAN ID type
pub type CanId = u32;

/// Largest 29-bit extended identifier
pub const CAN_EXT_ID_MASK: CanId = 0x1FFF_FFFF;

/// Generic frame data type
pub type FrameData = Vec<u8>;

/// Timestamp in milliseconds
pub type Timestamp = u64;

/// Raw frame exchanged with the media layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub id: CanId,
    pub data: FrameData,
    pub timestamp: Timestamp,
    pub is_extended: bool,
    pub is_fd: bool,
    /// Request the media to echo the frame back once it is on the bus
    pub loopback: bool,
}

impl Default for Frame {
    fn default() -> Self {
        Self {
            id: 0,
            data: Vec::new(),
            timestamp: 0,
            is_extended: true,
            is_fd: false,
            loopback: false,
        }
    }
}

/// Configuration trait that must be implemented by all layer configurations
pub trait Config: Send + Sync {
    fn validate(&self) -> crate::error::Result<()>;
}
