//! Serial link to the Alex robot.
//!
//! alexlink drives a small Arduino robot over a serial line using fixed-size,
//! checksummed packets: movement and gripper commands go out, odometry,
//! colour readings and diagnostics come back.
//!
//! # Crate Structure
//!
//! - [`transport`]: Serial port access and line settings
//! - [`frame`]: The 76-byte packet format, serializer and frame assembler
//! - [`host`]: Command vocabulary, telemetry decoding, receive loop and sender

/// Re-export transport types.
pub mod transport {
    pub use alexlink_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use alexlink_frame::*;
}

/// Re-export host types.
pub mod host {
    pub use alexlink_host::*;
}
