use std::sync::mpsc;
use std::time::{Duration, Instant};

use alexlink_host::{Command, Event};

use crate::cmd::{parse_duration, LinkArgs, SendArgs};
use crate::exit::{host_error, CliError, CliResult, FAILURE, SUCCESS, TIMEOUT};
use crate::output::{print_event, OutputFormat};

pub fn run(args: SendArgs, link: &LinkArgs, format: OutputFormat) -> CliResult<i32> {
    let command = Command::from_name(&args.command, &args.args)
        .map_err(|err| host_error("bad command", err))?;
    let wait_timeout = parse_duration(&args.wait_timeout, false)?;

    let (tx, rx) = mpsc::channel();
    let controller = link.connect(tx)?;
    controller
        .send(command)
        .map_err(|err| host_error("send failed", err))?;

    if args.wait {
        let event = wait_for_reply(&rx, wait_timeout)?;
        print_event(&event, format);
    }

    controller
        .shutdown()
        .map_err(|err| host_error("receive loop failed", err))?;
    Ok(SUCCESS)
}

/// Next event that answers a command. Echoed host packets are skipped.
fn wait_for_reply(rx: &mpsc::Receiver<Event>, timeout: Duration) -> CliResult<Event> {
    let deadline = Instant::now().checked_add(timeout);
    loop {
        let received = match deadline {
            Some(deadline) => rx.recv_timeout(deadline.saturating_duration_since(Instant::now())),
            None => rx.recv().map_err(|_| mpsc::RecvTimeoutError::Disconnected),
        };
        match received {
            Ok(Event::Ignored(_)) => continue,
            Ok(event) => return Ok(event),
            Err(mpsc::RecvTimeoutError::Timeout) => {
                return Err(CliError::new(
                    TIMEOUT,
                    format!("no reply from robot within {timeout:?}"),
                ))
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                return Err(CliError::new(
                    FAILURE,
                    "receive loop stopped before the robot replied",
                ))
            }
        }
    }
}
