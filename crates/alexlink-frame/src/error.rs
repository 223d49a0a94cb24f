/// Errors that can occur while reading or writing packets.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The frame does not start with the magic marker.
    #[error("invalid frame magic (expected 0xFC, found {found:#04x})")]
    InvalidMagic { found: u8 },

    /// The trailing checksum does not match the frame contents.
    #[error("frame checksum mismatch (computed {computed:#04x}, received {received:#04x})")]
    ChecksumMismatch { computed: u8, received: u8 },

    /// An I/O error occurred on the underlying stream.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream stopped accepting bytes mid-frame.
    #[error("connection closed (incomplete frame)")]
    ConnectionClosed,

    /// No complete frame arrived within the allotted time.
    #[error("no frame received within {0:?}")]
    Timeout(std::time::Duration),
}

pub type Result<T> = std::result::Result<T, FrameError>;
