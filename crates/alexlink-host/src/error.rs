use alexlink_frame::PacketKind;

/// Errors that can occur in host operations.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] alexlink_transport::TransportError),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] alexlink_frame::FrameError),

    /// A command was given arguments it cannot carry.
    #[error("invalid arguments for {command}: {reason}")]
    InvalidArguments {
        command: &'static str,
        reason: String,
    },

    /// The command name is not part of the vocabulary.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// The robot answered the hello with something other than OK.
    #[error("hello rejected: got {} packet with code {code}", .kind.name())]
    HelloRejected { kind: PacketKind, code: u8 },

    /// The receive loop gave up after repeated transport failures.
    #[error("receive loop stopped after {attempts} consecutive read failures: {source}")]
    ReceiveFailed {
        attempts: u32,
        source: alexlink_frame::FrameError,
    },

    /// The receive thread could not be started.
    #[error("failed to spawn receive thread: {0}")]
    Spawn(#[source] std::io::Error),

    /// The receive thread panicked or the writer lock was poisoned.
    #[error("{0} poisoned by a panicked thread")]
    Poisoned(&'static str),
}

pub type Result<T> = std::result::Result<T, HostError>;
