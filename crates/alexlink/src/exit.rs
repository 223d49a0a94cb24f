use std::fmt;
use std::io;

use alexlink_frame::FrameError;
use alexlink_host::HostError;
use alexlink_transport::TransportError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::NotFound | io::ErrorKind::BrokenPipe => TRANSPORT_ERROR,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Open { ref source, .. } | TransportError::Configure { ref source, .. }
            if matches!(
                source.kind(),
                serialport::ErrorKind::Io(io::ErrorKind::PermissionDenied)
            ) =>
        {
            CliError::new(PERMISSION_DENIED, format!("{context}: {err}"))
        }
        other => CliError::new(TRANSPORT_ERROR, format!("{context}: {other}")),
    }
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Io(source) => io_error(context, source),
        FrameError::InvalidMagic { .. } | FrameError::ChecksumMismatch { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        FrameError::Timeout(_) => CliError::new(TIMEOUT, format!("{context}: {err}")),
        FrameError::ConnectionClosed => CliError::new(FAILURE, format!("{context}: {err}")),
    }
}

pub fn host_error(context: &str, err: HostError) -> CliError {
    match err {
        HostError::Transport(err) => transport_error(context, err),
        HostError::Frame(err) => frame_error(context, err),
        HostError::InvalidArguments { .. } | HostError::UnknownCommand(_) => {
            CliError::new(USAGE, format!("{context}: {err}"))
        }
        HostError::HelloRejected { .. } => CliError::new(FAILURE, format!("{context}: {err}")),
        HostError::ReceiveFailed { .. } => {
            CliError::new(TRANSPORT_ERROR, format!("{context}: {err}"))
        }
        other => CliError::new(INTERNAL, format!("{context}: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn usage_errors_map_to_usage() {
        let err = host_error("bad command", HostError::UnknownCommand("fly".to_string()));
        assert_eq!(err.code, USAGE);
        assert_eq!(err.message, "bad command: unknown command: fly");
    }

    #[test]
    fn handshake_timeout_maps_to_timeout() {
        let err = host_error(
            "hello failed",
            HostError::Frame(FrameError::Timeout(Duration::from_secs(1))),
        );
        assert_eq!(err.code, TIMEOUT);
    }

    #[test]
    fn corrupt_frames_are_data_invalid() {
        let err = frame_error("read failed", FrameError::InvalidMagic { found: 0x00 });
        assert_eq!(err.code, DATA_INVALID);
    }

    #[test]
    fn missing_device_is_a_transport_error() {
        let err = transport_error(
            "open failed",
            TransportError::Open {
                path: "/dev/ttyACM9".to_string(),
                source: serialport::Error::new(serialport::ErrorKind::NoDevice, "no such device"),
            },
        );
        assert_eq!(err.code, TRANSPORT_ERROR);
    }

    #[test]
    fn permission_denied_on_open_is_reported() {
        let err = transport_error(
            "open failed",
            TransportError::Open {
                path: "/dev/ttyACM0".to_string(),
                source: serialport::Error::new(
                    serialport::ErrorKind::Io(io::ErrorKind::PermissionDenied),
                    "permission denied",
                ),
            },
        );
        assert_eq!(err.code, PERMISSION_DENIED);
    }
}
