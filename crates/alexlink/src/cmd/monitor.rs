use std::sync::mpsc;
use std::time::Duration;

use alexlink_host::Event;
use tracing::info;

use crate::cmd::{install_ctrlc_handler, LinkArgs, MonitorArgs};
use crate::exit::{host_error, CliResult, SUCCESS};
use crate::output::{print_event, OutputFormat};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub fn run(args: MonitorArgs, link: &LinkArgs, format: OutputFormat) -> CliResult<i32> {
    let (tx, rx) = mpsc::channel();
    let controller = link.connect(tx)?;
    install_ctrlc_handler(controller.shutdown_flag())?;

    let mut printed = 0usize;
    while controller.is_running() {
        let event = match rx.recv_timeout(POLL_INTERVAL) {
            Ok(event) => event,
            Err(mpsc::RecvTimeoutError::Timeout) => continue,
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        };
        if matches!(event, Event::Ignored(_)) {
            continue;
        }

        print_event(&event, format);
        printed = printed.saturating_add(1);

        if let Some(count) = args.count {
            if printed >= count {
                break;
            }
        }
    }

    let stats = controller
        .shutdown()
        .map_err(|err| host_error("receive loop failed", err))?;
    info!(
        packets = stats.packets,
        bad_magic = stats.bad_magic,
        bad_checksum = stats.bad_checksum,
        unrecognized = stats.unrecognized,
        "monitor stopped"
    );
    Ok(SUCCESS)
}
