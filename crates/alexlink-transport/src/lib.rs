//! Serial-port transport for the alexlink robot controller.
//!
//! This is the lowest layer of alexlink: it opens the serial device the
//! robot is attached to and hands out [`SerialStream`] handles that
//! implement `Read + Write`. Everything else builds on top of those.

pub mod config;
pub mod error;
pub mod stream;

pub use config::{SerialConfig, DEFAULT_BAUD_RATE, DEFAULT_PORT, DEFAULT_READ_TIMEOUT};
pub use error::{Result, TransportError};
pub use stream::{is_idle_read, SerialStream};

pub use serialport::{DataBits, FlowControl, Parity, StopBits};
