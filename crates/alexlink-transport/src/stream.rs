use std::io::{ErrorKind, Read, Write};

use serialport::SerialPort;
use tracing::{debug, info};

use crate::config::SerialConfig;
use crate::error::{Result, TransportError};

/// An open serial connection to the robot.
///
/// Read and write are independent duplex operations on the device. Use
/// [`SerialStream::try_clone`] to hand one half to a receive thread while
/// the other keeps writing; neither side needs to lock the other.
pub struct SerialStream {
    inner: Box<dyn SerialPort>,
    path: String,
}

impl SerialStream {
    /// Open and configure the device described by `config`.
    pub fn open(config: &SerialConfig) -> Result<Self> {
        let inner = serialport::new(config.path.as_str(), config.baud_rate)
            .data_bits(config.data_bits)
            .parity(config.parity)
            .stop_bits(config.stop_bits)
            .flow_control(config.flow_control)
            .timeout(config.read_timeout)
            .open()
            .map_err(|source| TransportError::Open {
                path: config.path.clone(),
                source,
            })?;

        info!(
            path = %config.path,
            baud = config.baud_rate,
            "opened serial device"
        );

        Ok(Self {
            inner,
            path: config.path.clone(),
        })
    }

    /// Try to clone this stream (duplicates the underlying descriptor).
    pub fn try_clone(&self) -> Result<Self> {
        let inner = self
            .inner
            .try_clone()
            .map_err(|source| TransportError::Configure {
                path: self.path.clone(),
                source,
            })?;
        Ok(Self {
            inner,
            path: self.path.clone(),
        })
    }

    /// Discard bytes received but not yet read.
    ///
    /// Used after the robot reboots on open so stale boot noise never
    /// reaches the frame assembler.
    pub fn discard_input(&self) -> Result<()> {
        self.inner
            .clear(serialport::ClearBuffer::Input)
            .map_err(|source| TransportError::Configure {
                path: self.path.clone(),
                source,
            })?;
        debug!(path = %self.path, "discarded pending input");
        Ok(())
    }

    /// Device path this stream was opened from.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Close the device. Dropping the stream has the same effect.
    pub fn close(self) {
        debug!(path = %self.path, "closing serial device");
    }
}

impl Read for SerialStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Write for SerialStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

impl std::fmt::Debug for SerialStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialStream")
            .field("path", &self.path)
            .finish()
    }
}

/// Whether a read error only means "no data yet".
///
/// Serial reads report an expired timeout as `TimedOut`; non-blocking
/// handles report `WouldBlock`. Neither is a transport failure.
pub fn is_idle_read(err: &std::io::Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_missing_device_reports_path() {
        let cfg = SerialConfig::new("/dev/alexlink-test-missing-device");
        let err = SerialStream::open(&cfg).unwrap_err();

        assert!(matches!(err, TransportError::Open { ref path, .. } if path == &cfg.path));
        assert!(err.to_string().contains("/dev/alexlink-test-missing-device"));
    }

    #[test]
    fn timeouts_are_idle_reads() {
        assert!(is_idle_read(&std::io::Error::from(ErrorKind::TimedOut)));
        assert!(is_idle_read(&std::io::Error::from(ErrorKind::WouldBlock)));
        assert!(is_idle_read(&std::io::Error::from(ErrorKind::Interrupted)));
    }

    #[test]
    fn hard_failures_are_not_idle_reads() {
        assert!(!is_idle_read(&std::io::Error::from(ErrorKind::BrokenPipe)));
        assert!(!is_idle_read(&std::io::Error::from(
            ErrorKind::PermissionDenied
        )));
    }
}
