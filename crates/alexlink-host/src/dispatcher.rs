//! Routing of validated packets to handlers.

use std::sync::mpsc;

use alexlink_frame::{Outcome, Packet, PacketKind, ResponseCode};
use tracing::{debug, info, trace, warn};

use crate::telemetry::{ColorReading, RemoteError, StatusReport};

/// What a received packet means to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The robot acknowledged the last command.
    Ack,
    /// Odometry counters.
    Status(StatusReport),
    /// Colour-sensor sample.
    Color(ColorReading),
    /// The robot rejected something the host sent.
    RemoteError(RemoteError),
    /// Free-form diagnostic text from the robot.
    Message(String),
    /// A packet kind the host only ever sends (COMMAND, HELLO).
    Ignored(PacketKind),
    /// A kind or code outside the protocol tables.
    Unrecognized { kind: PacketKind, code: u8 },
}

/// Map a packet to its event.
///
/// Total: every kind and code yields an event, unknown ones included.
pub fn classify(packet: &Packet) -> Event {
    match packet.kind {
        PacketKind::Command | PacketKind::Hello => Event::Ignored(packet.kind),
        PacketKind::Response => match ResponseCode::try_from(packet.code) {
            Ok(ResponseCode::Ok) => Event::Ack,
            Ok(ResponseCode::Status) => Event::Status(StatusReport::from_params(&packet.params)),
            Ok(ResponseCode::Color) => Event::Color(ColorReading::from_params(&packet.params)),
            _ => unrecognized(packet),
        },
        PacketKind::Error => match ResponseCode::try_from(packet.code)
            .ok()
            .and_then(RemoteError::from_code)
        {
            Some(err) => Event::RemoteError(err),
            None => unrecognized(packet),
        },
        PacketKind::Message => Event::Message(packet.text_lossy()),
        PacketKind::Unknown(_) => unrecognized(packet),
    }
}

fn unrecognized(packet: &Packet) -> Event {
    Event::Unrecognized {
        kind: packet.kind,
        code: packet.code,
    }
}

/// Receives events from the receive loop.
///
/// Handlers run on the receive thread and should not block for long.
pub trait EventHandler: Send {
    fn handle(&mut self, event: Event);

    /// Called for frames dropped by validation. Defaults to doing nothing;
    /// the receive loop already logs them.
    fn frame_fault(&mut self, fault: &Outcome) {
        let _ = fault;
    }
}

impl EventHandler for mpsc::Sender<Event> {
    fn handle(&mut self, event: Event) {
        if let Err(mpsc::SendError(event)) = self.send(event) {
            trace!(?event, "event dropped: channel receiver is gone");
        }
    }
}

impl<H: EventHandler + ?Sized> EventHandler for Box<H> {
    fn handle(&mut self, event: Event) {
        (**self).handle(event);
    }

    fn frame_fault(&mut self, fault: &Outcome) {
        (**self).frame_fault(fault);
    }
}

/// Handler that reports every event through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogHandler;

impl EventHandler for LogHandler {
    fn handle(&mut self, event: Event) {
        match event {
            Event::Ack => info!("command OK"),
            Event::Status(report) => info!(?report, "status report"),
            Event::Color(reading) => info!(
                red = reading.red,
                green = reading.green,
                blue = reading.blue,
                color = reading.label.as_str(),
                "color reading"
            ),
            Event::RemoteError(err) => warn!(%err, "robot reported an error"),
            Event::Message(text) => info!(%text, "message from robot"),
            Event::Ignored(_) | Event::Unrecognized { .. } => {}
        }
    }
}

/// Classifies packets and hands the resulting events to a handler.
pub struct Dispatcher<H> {
    handler: H,
    unrecognized: u64,
}

impl<H: EventHandler> Dispatcher<H> {
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            unrecognized: 0,
        }
    }

    /// Route one packet.
    pub fn dispatch(&mut self, packet: Packet) {
        let event = classify(&packet);
        match &event {
            Event::Unrecognized { kind, code } => {
                self.unrecognized += 1;
                warn!(kind = kind.name(), kind_byte = kind.as_u8(), code, "unrecognized packet");
            }
            Event::Ignored(kind) => {
                debug!(kind = kind.name(), "ignoring host-originated packet kind");
            }
            _ => {}
        }
        self.handler.handle(event);
    }

    /// Forward a dropped-frame report to the handler.
    pub fn report_fault(&mut self, fault: &Outcome) {
        self.handler.frame_fault(fault);
    }

    /// Packets whose kind or code was outside the protocol tables.
    pub fn unrecognized(&self) -> u64 {
        self.unrecognized
    }

    pub fn into_handler(self) -> H {
        self.handler
    }
}
