/// Errors that can occur in serial transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to open the serial device.
    #[error("failed to open {path}: {source}")]
    Open {
        path: String,
        source: serialport::Error,
    },

    /// Failed to configure an already opened device.
    #[error("failed to configure {path}: {source}")]
    Configure {
        path: String,
        source: serialport::Error,
    },
}

pub type Result<T> = std::result::Result<T, TransportError>;
