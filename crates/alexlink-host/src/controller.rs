use std::io::{Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use alexlink_frame::{Packet, PacketReader};
use alexlink_transport::{SerialConfig, SerialStream};
use tracing::{debug, info};

use crate::command::Command;
use crate::config::HostConfig;
use crate::dispatcher::{classify, Event, EventHandler};
use crate::error::{HostError, Result};
use crate::receiver::{ReceiveLoop, ReceiveStats};
use crate::sender::Sender;

/// A running link to the robot.
///
/// Owns the receive thread and the sending half. The receive thread reads
/// from its own clone of the stream, so sending never waits on it.
/// Dropping the controller stops the receive thread.
pub struct Controller<W = SerialStream> {
    sender: Sender<W>,
    shutdown: Arc<AtomicBool>,
    receiver: Option<JoinHandle<Result<ReceiveStats>>>,
}

impl Controller<SerialStream> {
    /// Open the serial port, wait for the robot to reboot and start the
    /// receive loop.
    pub fn connect<H>(serial: &SerialConfig, config: &HostConfig, handler: H) -> Result<Self>
    where
        H: EventHandler + 'static,
    {
        let stream = SerialStream::open(serial)?;

        if !config.startup_delay.is_zero() {
            info!(path = stream.path(), delay = ?config.startup_delay, "waiting for robot to reboot");
            std::thread::sleep(config.startup_delay);
        }
        stream.discard_input()?;

        let read_half = stream.try_clone()?;
        Self::start(read_half, stream, config, handler)
    }
}

impl<W: Write> Controller<W> {
    /// Start a controller over an already connected read half and write half.
    pub fn start<R, H>(read_half: R, write_half: W, config: &HostConfig, handler: H) -> Result<Self>
    where
        R: Read + Send + 'static,
        H: EventHandler + 'static,
    {
        let sender = Sender::new(write_half);
        let mut reader = PacketReader::new(read_half);

        if let Some(timeout) = config.hello_timeout {
            hello_handshake(&mut reader, &sender, timeout)?;
        }

        let shutdown = Arc::new(AtomicBool::new(false));
        let receive_loop = ReceiveLoop::with_config(reader, handler, Arc::clone(&shutdown), config);
        let receiver = std::thread::Builder::new()
            .name("alexlink-rx".to_string())
            .spawn(move || receive_loop.run())
            .map_err(HostError::Spawn)?;

        let controller = Self {
            sender,
            shutdown,
            receiver: Some(receiver),
        };

        if config.send_hello && config.hello_timeout.is_none() {
            controller.sender.send(&Packet::hello())?;
        }

        Ok(controller)
    }

    /// Send a command. Fire-and-forget: any reply arrives as an event.
    pub fn send(&self, command: Command) -> Result<()> {
        self.sender.send_command(command)
    }

    /// A handle for sending from other threads.
    pub fn sender(&self) -> Sender<W> {
        self.sender.clone()
    }
}

impl<W> Controller<W> {
    /// Flag that stops the receive loop when set. Share it with signal
    /// handlers.
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Whether the receive thread is still running.
    pub fn is_running(&self) -> bool {
        self.receiver
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Stop the receive loop and collect its counters.
    ///
    /// Returns the loop's error instead if it had already given up on the
    /// link.
    pub fn shutdown(mut self) -> Result<ReceiveStats> {
        self.stop()
            .unwrap_or_else(|| Ok(ReceiveStats::default()))
    }

    fn stop(&mut self) -> Option<Result<ReceiveStats>> {
        self.shutdown.store(true, Ordering::SeqCst);
        let handle = self.receiver.take()?;
        debug!("joining receive thread");
        Some(
            handle
                .join()
                .unwrap_or(Err(HostError::Poisoned("receive thread"))),
        )
    }
}

impl<W> Drop for Controller<W> {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

/// Send HELLO and wait for the robot to answer OK.
pub fn hello_handshake<R: Read, W: Write>(
    reader: &mut PacketReader<R>,
    sender: &Sender<W>,
    timeout: Duration,
) -> Result<()> {
    sender.send(&Packet::hello())?;
    let reply = reader.read_packet(timeout)?;
    match classify(&reply) {
        Event::Ack => {
            info!("robot answered hello");
            Ok(())
        }
        _ => Err(HostError::HelloRejected {
            kind: reply.kind,
            code: reply.code,
        }),
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::io::{Read, Write};
    use std::os::unix::net::UnixStream;
    use std::sync::mpsc;
    use std::thread;

    use alexlink_frame::{serialize, FrameAssembler, Outcome, PacketKind, ResponseCode, FRAME_SIZE};

    use super::*;
    use crate::telemetry::RemoteError;

    fn link() -> (UnixStream, UnixStream, UnixStream) {
        let (host, robot) = UnixStream::pair().expect("socket pair should open");
        host.set_read_timeout(Some(Duration::from_millis(10)))
            .expect("read timeout should apply");
        let host_read = host.try_clone().expect("host stream should clone");
        (host_read, host, robot)
    }

    fn robot_reads_packet(robot: &mut UnixStream) -> Packet {
        let mut frame = [0u8; FRAME_SIZE];
        robot.read_exact(&mut frame).expect("robot should read a frame");
        match FrameAssembler::new().feed(&frame) {
            Outcome::Complete(packet) => packet,
            other => panic!("robot got {other:?}"),
        }
    }

    fn quiet_config() -> HostConfig {
        HostConfig {
            startup_delay: Duration::ZERO,
            send_hello: false,
            ..HostConfig::default()
        }
    }

    #[test]
    fn telemetry_flows_while_commands_are_sent() {
        let (host_read, host_write, mut robot) = link();
        let (tx, rx) = mpsc::channel();
        let config = HostConfig {
            send_hello: true,
            ..quiet_config()
        };

        let controller = Controller::start(host_read, host_write, &config, tx).unwrap();
        assert_eq!(robot_reads_packet(&mut robot).kind, PacketKind::Hello);

        robot
            .write_all(&serialize(&Packet::response(
                ResponseCode::Status,
                &[10, 12, 0, 0, 1, 1, 0, 0, 340, 0],
            )))
            .unwrap();
        let event = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert!(matches!(event, Event::Status(s) if s.right_forward_ticks == 12));

        controller.send(Command::GetStats).unwrap();
        let packet = robot_reads_packet(&mut robot);
        assert_eq!(packet, Command::GetStats.to_packet());

        assert!(controller.is_running());
        let stats = controller.shutdown().unwrap();
        assert_eq!(stats.packets, 1);
    }

    #[test]
    fn sender_works_from_another_thread() {
        let (host_read, host_write, mut robot) = link();
        let (tx, _rx) = mpsc::channel();
        let controller = Controller::start(host_read, host_write, &quiet_config(), tx).unwrap();

        let sender = controller.sender();
        thread::spawn(move || sender.send_command(Command::Scan).unwrap())
            .join()
            .unwrap();

        assert_eq!(robot_reads_packet(&mut robot), Command::Scan.to_packet());
        controller.shutdown().unwrap();
    }

    #[test]
    fn remote_errors_reach_the_handler() {
        let (host_read, host_write, mut robot) = link();
        let (tx, rx) = mpsc::channel();
        let controller = Controller::start(host_read, host_write, &quiet_config(), tx).unwrap();

        robot
            .write_all(&serialize(&Packet::error(ResponseCode::BadCommand)))
            .unwrap();
        assert_eq!(
            rx.recv_timeout(Duration::from_secs(2)).unwrap(),
            Event::RemoteError(RemoteError::BadCommand)
        );
        drop(controller);
    }

    #[test]
    fn raising_shutdown_flag_stops_receive_thread() {
        let (host_read, host_write, _robot) = link();
        let (tx, _rx) = mpsc::channel();
        let controller = Controller::start(host_read, host_write, &quiet_config(), tx).unwrap();

        controller.shutdown_flag().store(true, Ordering::SeqCst);
        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        while controller.is_running() && std::time::Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }

        assert!(!controller.is_running());
        assert_eq!(controller.shutdown().unwrap(), ReceiveStats::default());
    }

    #[test]
    fn hello_handshake_accepts_ok() {
        let (host_read, host_write, mut robot) = link();
        let robot_thread = thread::spawn(move || {
            let hello = robot_reads_packet(&mut robot);
            assert_eq!(hello.kind, PacketKind::Hello);
            robot
                .write_all(&serialize(&Packet::response(ResponseCode::Ok, &[])))
                .unwrap();
            robot
        });

        let config = HostConfig {
            hello_timeout: Some(Duration::from_secs(2)),
            ..quiet_config()
        };
        let (tx, _rx) = mpsc::channel();
        let controller = Controller::start(host_read, host_write, &config, tx).unwrap();
        let _robot = robot_thread.join().unwrap();
        controller.shutdown().unwrap();
    }

    #[test]
    fn hello_handshake_rejects_error_reply() {
        let (host_read, host_write, mut robot) = link();
        let robot_thread = thread::spawn(move || {
            let _hello = robot_reads_packet(&mut robot);
            robot
                .write_all(&serialize(&Packet::error(ResponseCode::BadPacket)))
                .unwrap();
            robot
        });

        let sender = Sender::new(host_write);
        let mut reader = PacketReader::new(host_read);
        let err = hello_handshake(&mut reader, &sender, Duration::from_secs(2)).unwrap_err();
        assert!(matches!(
            err,
            HostError::HelloRejected {
                kind: PacketKind::Error,
                code: 2
            }
        ));
        let _robot = robot_thread.join().unwrap();
    }

    #[test]
    fn hello_handshake_times_out_on_silent_robot() {
        let (host_read, host_write, _robot) = link();
        let sender = Sender::new(host_write);
        let mut reader = PacketReader::new(host_read);
        let err = hello_handshake(&mut reader, &sender, Duration::from_millis(50)).unwrap_err();
        assert!(matches!(
            err,
            HostError::Frame(alexlink_frame::FrameError::Timeout(_))
        ));
    }

    #[test]
    fn connect_reports_missing_device() {
        let serial = SerialConfig::new("/dev/alexlink-test-missing-device");
        let (tx, _rx) = mpsc::channel();
        let err = Controller::connect(&serial, &quiet_config(), tx)
            .err()
            .expect("missing device should fail");
        assert!(matches!(err, HostError::Transport(_)));
    }
}
