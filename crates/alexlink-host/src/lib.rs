//! Host-side controller for the alexlink robot.
//!
//! This is the "just works" layer: open the serial link, spawn the receive
//! loop that turns frames into [`Event`]s, and send [`Command`]s from the
//! calling thread without ever waiting on the read path.

pub mod command;
pub mod config;
pub mod controller;
pub mod dispatcher;
pub mod error;
pub mod receiver;
pub mod sender;
pub mod telemetry;

pub use command::Command;
pub use config::HostConfig;
pub use controller::{hello_handshake, Controller};
pub use dispatcher::{classify, Dispatcher, Event, EventHandler, LogHandler};
pub use error::{HostError, Result};
pub use receiver::{ReceiveLoop, ReceiveStats};
pub use sender::Sender;
pub use telemetry::{ColorLabel, ColorReading, RemoteError, StatusReport};
