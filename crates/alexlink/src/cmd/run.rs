use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use alexlink_host::Controller;
use tracing::{info, warn};

use crate::cmd::prompt::{parse_line, Line, HELP};
use crate::cmd::{LinkArgs, RunArgs};
use crate::exit::{host_error, io_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{OutputFormat, ReportHandler};

/// How often the prompt checks on the receive loop while waiting for input.
const TICK: Duration = Duration::from_millis(100);

pub fn run(_args: RunArgs, link: &LinkArgs, format: OutputFormat) -> CliResult<i32> {
    let controller = link.connect(ReportHandler::new(format))?;
    println!("{HELP}");

    let lines = spawn_stdin_reader()?;
    prompt_loop(&controller, &lines)?;

    let stats = controller
        .shutdown()
        .map_err(|err| host_error("receive loop failed", err))?;
    info!(
        packets = stats.packets,
        bad_magic = stats.bad_magic,
        bad_checksum = stats.bad_checksum,
        "session ended"
    );
    Ok(SUCCESS)
}

/// Read stdin on its own thread so a dead link is noticed without input.
fn spawn_stdin_reader() -> CliResult<Receiver<io::Result<String>>> {
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("alexlink-stdin".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                if tx.send(line).is_err() {
                    break;
                }
            }
        })
        .map_err(|err| CliError::new(INTERNAL, format!("failed to spawn stdin reader: {err}")))?;
    Ok(rx)
}

/// Send commands typed at the prompt until `q`, end of input, or the
/// receive loop stopping.
fn prompt_loop<W: Write>(
    controller: &Controller<W>,
    lines: &Receiver<io::Result<String>>,
) -> CliResult<()> {
    show_prompt()?;
    loop {
        if !controller.is_running() {
            warn!("receive loop has stopped");
            return Ok(());
        }

        let line = match lines.recv_timeout(TICK) {
            Ok(line) => line.map_err(|err| io_error("stdin read failed", err))?,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => return Ok(()),
        };

        match parse_line(&line) {
            Ok(Line::Empty) => {}
            Ok(Line::Help) => println!("{HELP}"),
            Ok(Line::Quit) => return Ok(()),
            Ok(Line::Send(command)) => controller
                .send(command)
                .map_err(|err| host_error("send failed", err))?,
            Err(err) => eprintln!("{err}"),
        }
        show_prompt()?;
    }
}

fn show_prompt() -> CliResult<()> {
    print!("> ");
    io::stdout()
        .flush()
        .map_err(|err| io_error("stdout flush failed", err))
}
