use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use alexlink_host::{Controller, EventHandler, HostConfig};
use alexlink_transport::{SerialConfig, DEFAULT_BAUD_RATE, DEFAULT_PORT};
use clap::{Args, Subcommand};

use crate::exit::{host_error, CliError, CliResult, INTERNAL, USAGE};
use crate::output::OutputFormat;

pub mod monitor;
pub mod prompt;
pub mod run;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Drive the robot from an interactive prompt.
    Run(RunArgs),
    /// Send a single command.
    Send(SendArgs),
    /// Print telemetry from the robot without sending commands.
    Monitor(MonitorArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, link: &LinkArgs, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Run(args) => run::run(args, link, format),
        Command::Send(args) => send::run(args, link, format),
        Command::Monitor(args) => monitor::run(args, link, format),
        Command::Version(args) => version::run(args),
    }
}

/// Serial line and connection settings shared by every subcommand.
#[derive(Args, Debug)]
pub struct LinkArgs {
    /// Serial device the robot is attached to.
    #[arg(long, short = 'p', env = "ALEXLINK_PORT", default_value = DEFAULT_PORT, global = true)]
    pub port: String,
    /// Baud rate.
    #[arg(long, env = "ALEXLINK_BAUD", default_value_t = DEFAULT_BAUD_RATE, global = true)]
    pub baud: u32,
    /// Time to wait for the Arduino to reboot after opening the port (e.g. 2s, 500ms, 0).
    #[arg(long, default_value = "2s", global = true)]
    pub startup_delay: String,
    /// Do not announce the host with a HELLO packet on connect.
    #[arg(long, global = true)]
    pub no_hello: bool,
    /// How long one serial read may block before it counts as no data (e.g. 100ms).
    #[arg(long, default_value = "100ms", global = true)]
    pub read_timeout: String,
    /// Wait for the robot to answer HELLO with OK before continuing (e.g. 5s).
    #[arg(long, value_name = "TIMEOUT", global = true, conflicts_with = "no_hello")]
    pub wait_hello: Option<String>,
}

impl LinkArgs {
    pub fn serial_config(&self) -> CliResult<SerialConfig> {
        Ok(SerialConfig::new(self.port.clone())
            .with_baud_rate(self.baud)
            .with_read_timeout(parse_duration(&self.read_timeout, false)?))
    }

    pub fn host_config(&self) -> CliResult<HostConfig> {
        let hello_timeout = self
            .wait_hello
            .as_deref()
            .map(|input| parse_duration(input, false))
            .transpose()?;
        Ok(HostConfig {
            startup_delay: parse_duration(&self.startup_delay, true)?,
            send_hello: !self.no_hello,
            hello_timeout,
            ..HostConfig::default()
        })
    }

    /// Open the link and start the receive loop.
    pub fn connect<H: EventHandler + 'static>(&self, handler: H) -> CliResult<Controller> {
        let config = self.host_config()?;
        Controller::connect(&self.serial_config()?, &config, handler)
            .map_err(|err| host_error(&format!("connect to {} failed", self.port), err))
    }
}

#[derive(Args, Debug)]
pub struct RunArgs {}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Command name or one-letter alias (forward, f, turn-left, l, stop, s, ...).
    pub command: String,
    /// Numeric arguments: distance or angle, then power.
    pub args: Vec<u32>,
    /// Wait for one reply from the robot and print it.
    #[arg(long)]
    pub wait: bool,
    /// Maximum time to wait for the reply when --wait is set (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub wait_timeout: String,
}

#[derive(Args, Debug)]
pub struct MonitorArgs {
    /// Exit after printing N events.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub fn parse_duration(input: &str, allow_zero: bool) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 && !allow_zero {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}

/// Raise `shutdown` on Ctrl-C.
pub fn install_ctrlc_handler(shutdown: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        shutdown.store(true, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
