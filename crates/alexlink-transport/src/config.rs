use std::time::Duration;

use serialport::{DataBits, FlowControl, Parity, StopBits};

/// Device node the robot's Arduino enumerates as on a Raspberry Pi.
pub const DEFAULT_PORT: &str = "/dev/ttyACM0";

/// Line speed the robot firmware is built for.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Upper bound on how long a single read blocks before reporting no data.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Serial line settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialConfig {
    /// Device path, e.g. `/dev/ttyACM0`.
    pub path: String,
    /// Baud rate. Default: 9600.
    pub baud_rate: u32,
    /// Default: 8.
    pub data_bits: DataBits,
    /// Default: none.
    pub parity: Parity,
    /// Default: 1.
    pub stop_bits: StopBits,
    /// Default: none.
    pub flow_control: FlowControl,
    /// Read timeout. A read that times out is "no data yet", not a failure.
    pub read_timeout: Duration,
}

impl SerialConfig {
    /// Default 8N1 settings for `path`.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_PORT.to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
            flow_control: FlowControl::None,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}
