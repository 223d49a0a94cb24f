//! The receive loop: drains the serial link and dispatches packets.

use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use alexlink_frame::{Outcome, PacketReader};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::HostConfig;
use crate::dispatcher::{Dispatcher, EventHandler};
use crate::error::{HostError, Result};

/// Counters kept by a receive loop over its lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReceiveStats {
    pub packets: u64,
    pub bad_magic: u64,
    pub bad_checksum: u64,
    pub unrecognized: u64,
    pub read_errors: u64,
}

/// Owns the read half of the link, the assembly buffer and the dispatcher.
///
/// The loop alternates between waiting for bytes and draining frames. Every
/// frame already buffered is extracted and dispatched before the next read,
/// so coalesced frames are never left waiting for new input. Malformed
/// frames are reported and skipped; only repeated transport failures end
/// the loop early.
pub struct ReceiveLoop<R, H> {
    reader: PacketReader<R>,
    dispatcher: Dispatcher<H>,
    shutdown: Arc<AtomicBool>,
    retry_limit: u32,
    retry_delay: Duration,
    stats: ReceiveStats,
}

impl<R: Read, H: EventHandler> ReceiveLoop<R, H> {
    pub fn new(reader: PacketReader<R>, handler: H, shutdown: Arc<AtomicBool>) -> Self {
        Self::with_config(reader, handler, shutdown, &HostConfig::default())
    }

    pub fn with_config(
        reader: PacketReader<R>,
        handler: H,
        shutdown: Arc<AtomicBool>,
        config: &HostConfig,
    ) -> Self {
        Self {
            reader,
            dispatcher: Dispatcher::new(handler),
            shutdown,
            retry_limit: config.read_retry_limit,
            retry_delay: config.read_retry_delay,
            stats: ReceiveStats::default(),
        }
    }

    /// Run until the shutdown flag is set.
    ///
    /// Returns the final counters, or `ReceiveFailed` once more than
    /// `read_retry_limit` consecutive reads have failed.
    pub fn run(mut self) -> Result<ReceiveStats> {
        info!("receive loop started");
        let mut consecutive_failures = 0u32;

        while !self.shutdown.load(Ordering::SeqCst) {
            match self.reader.poll() {
                Ok(None) => consecutive_failures = 0,
                Ok(Some(outcome)) => {
                    consecutive_failures = 0;
                    self.handle(outcome);
                }
                Err(err) => {
                    consecutive_failures += 1;
                    self.stats.read_errors += 1;
                    if consecutive_failures > self.retry_limit {
                        error!(%err, attempts = consecutive_failures, "giving up on serial link");
                        return Err(HostError::ReceiveFailed {
                            attempts: consecutive_failures,
                            source: err,
                        });
                    }
                    error!(%err, attempt = consecutive_failures, "serial read failed, retrying");
                    std::thread::sleep(self.retry_delay);
                }
            }
        }

        self.stats.unrecognized = self.dispatcher.unrecognized();
        info!(packets = self.stats.packets, "receive loop stopped");
        Ok(self.stats)
    }

    fn handle(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Complete(packet) => {
                self.stats.packets += 1;
                debug!(kind = packet.kind.name(), code = packet.code, "packet received");
                self.dispatcher.dispatch(packet);
            }
            Outcome::Incomplete => {}
            Outcome::BadMagic { found } => {
                self.stats.bad_magic += 1;
                warn!(found, "dropped frame with bad magic number");
                self.dispatcher.report_fault(&outcome);
            }
            Outcome::BadChecksum { computed, received } => {
                self.stats.bad_checksum += 1;
                warn!(computed, received, "dropped frame with bad checksum");
                self.dispatcher.report_fault(&outcome);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::io::ErrorKind;
    use std::sync::mpsc;
    use std::sync::Mutex;

    use alexlink_frame::{serialize, CommandCode, Packet, ResponseCode, FRAME_SIZE};

    use super::*;
    use crate::dispatcher::Event;
    use crate::telemetry::ColorLabel;

    /// Serves scripted reads, then raises the shutdown flag once drained.
    struct ScriptedReader {
        reads: VecDeque<std::io::Result<Vec<u8>>>,
        shutdown: Arc<AtomicBool>,
    }

    impl Read for ScriptedReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            match self.reads.pop_front() {
                Some(Ok(bytes)) => {
                    buf[..bytes.len()].copy_from_slice(&bytes);
                    Ok(bytes.len())
                }
                Some(Err(err)) => Err(err),
                None => {
                    self.shutdown.store(true, Ordering::SeqCst);
                    Err(std::io::Error::from(ErrorKind::TimedOut))
                }
            }
        }
    }

    #[derive(Default, Clone)]
    struct SharedRecorder {
        events: Arc<Mutex<Vec<Event>>>,
        faults: Arc<Mutex<Vec<Outcome>>>,
    }

    impl EventHandler for SharedRecorder {
        fn handle(&mut self, event: Event) {
            self.events.lock().unwrap().push(event);
        }

        fn frame_fault(&mut self, fault: &Outcome) {
            self.faults.lock().unwrap().push(fault.clone());
        }
    }

    fn run_script(
        reads: Vec<std::io::Result<Vec<u8>>>,
        config: HostConfig,
    ) -> (Result<ReceiveStats>, SharedRecorder) {
        let shutdown = Arc::new(AtomicBool::new(false));
        let reader = PacketReader::new(ScriptedReader {
            reads: reads.into(),
            shutdown: Arc::clone(&shutdown),
        });
        let recorder = SharedRecorder::default();
        let result = ReceiveLoop::with_config(reader, recorder.clone(), shutdown, &config).run();
        (result, recorder)
    }

    fn fast_retry() -> HostConfig {
        HostConfig {
            read_retry_delay: Duration::from_millis(1),
            ..HostConfig::default()
        }
    }

    #[test]
    fn dispatches_packets_split_across_reads() {
        let frame = serialize(&Packet::response(ResponseCode::Ok, &[]));
        let (result, recorder) = run_script(
            vec![Ok(frame[..10].to_vec()), Ok(frame[10..].to_vec())],
            fast_retry(),
        );

        let stats = result.unwrap();
        assert_eq!(stats.packets, 1);
        assert_eq!(*recorder.events.lock().unwrap(), vec![Event::Ack]);
    }

    #[test]
    fn coalesced_frames_are_all_dispatched() {
        let mut chunk = serialize(&Packet::response(ResponseCode::Color, &[71, 235, 179])).to_vec();
        chunk.extend_from_slice(&serialize(&Packet::message("done")));

        let (result, recorder) = run_script(vec![Ok(chunk)], fast_retry());

        assert_eq!(result.unwrap().packets, 2);
        let events = recorder.events.lock().unwrap();
        assert!(matches!(&events[0], Event::Color(r) if r.label == ColorLabel::Red));
        assert_eq!(events[1], Event::Message("done".to_string()));
    }

    #[test]
    fn malformed_frames_are_reported_and_skipped() {
        let mut bad_magic = serialize(&Packet::hello());
        bad_magic[0] = 0x00;
        let mut bad_sum = serialize(&Packet::hello());
        bad_sum[FRAME_SIZE - 1] ^= 0xFF;
        let good = serialize(&Packet::response(ResponseCode::Status, &[10, 12, 0, 0, 1, 1, 0, 0, 340, 0]));

        let (result, recorder) = run_script(
            vec![Ok(bad_magic.to_vec()), Ok(bad_sum.to_vec()), Ok(good.to_vec())],
            fast_retry(),
        );

        let stats = result.unwrap();
        assert_eq!(stats.bad_magic, 1);
        assert_eq!(stats.bad_checksum, 1);
        assert_eq!(stats.packets, 1);
        assert_eq!(recorder.faults.lock().unwrap().len(), 2);
        let events = recorder.events.lock().unwrap();
        assert!(matches!(&events[0], Event::Status(s) if s.forward_distance == 340));
    }

    #[test]
    fn unrecognized_packets_are_counted() {
        let odd = serialize(&Packet::new(alexlink_frame::PacketKind::Response, 77));
        let (result, _) = run_script(vec![Ok(odd.to_vec())], fast_retry());
        assert_eq!(result.unwrap().unrecognized, 1);
    }

    #[test]
    fn transient_read_errors_are_retried() {
        let frame = serialize(&Packet::command(CommandCode::Stop, &[]));
        let (result, recorder) = run_script(
            vec![
                Err(std::io::Error::from(ErrorKind::BrokenPipe)),
                Err(std::io::Error::from(ErrorKind::BrokenPipe)),
                Ok(frame.to_vec()),
            ],
            fast_retry(),
        );

        let stats = result.unwrap();
        assert_eq!(stats.read_errors, 2);
        assert_eq!(stats.packets, 1);
        assert_eq!(
            *recorder.events.lock().unwrap(),
            vec![Event::Ignored(alexlink_frame::PacketKind::Command)]
        );
    }

    #[test]
    fn persistent_read_errors_stop_the_loop() {
        let reads = (0..10)
            .map(|_| Err(std::io::Error::from(ErrorKind::BrokenPipe)))
            .collect();
        let (result, _) = run_script(reads, fast_retry());

        assert!(matches!(
            result,
            Err(HostError::ReceiveFailed { attempts: 4, .. })
        ));
    }

    #[test]
    fn stops_promptly_when_flag_already_set() {
        let shutdown = Arc::new(AtomicBool::new(true));
        let reader = PacketReader::new(std::io::Cursor::new(Vec::<u8>::new()));
        let (tx, _rx) = mpsc::channel();
        let stats = ReceiveLoop::new(reader, tx, shutdown).run().unwrap();
        assert_eq!(stats, ReceiveStats::default());
    }
}
