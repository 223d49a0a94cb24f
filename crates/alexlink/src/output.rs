use std::io::IsTerminal;
use std::time::{SystemTime, UNIX_EPOCH};

use alexlink_frame::Outcome;
use alexlink_host::{ColorReading, Event, EventHandler, LogHandler, RemoteError, StatusReport};
use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    /// Report events through the log on stderr, keeping stdout quiet.
    Log,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum EventBody<'a> {
    Ack,
    Status(&'a StatusReport),
    Color(&'a ColorReading),
    RemoteError {
        error: RemoteError,
        description: &'static str,
    },
    Message {
        text: &'a str,
    },
    Ignored {
        kind: &'static str,
    },
    Unrecognized {
        kind: &'static str,
        kind_byte: u8,
        code: u8,
    },
}

#[derive(Serialize)]
struct EventOutput<'a> {
    #[serde(flatten)]
    body: EventBody<'a>,
    timestamp: String,
}

impl<'a> From<&'a Event> for EventBody<'a> {
    fn from(event: &'a Event) -> Self {
        match event {
            Event::Ack => Self::Ack,
            Event::Status(report) => Self::Status(report),
            Event::Color(reading) => Self::Color(reading),
            Event::RemoteError(err) => Self::RemoteError {
                error: *err,
                description: err.description(),
            },
            Event::Message(text) => Self::Message { text },
            Event::Ignored(kind) => Self::Ignored { kind: kind.name() },
            Event::Unrecognized { kind, code } => Self::Unrecognized {
                kind: kind.name(),
                kind_byte: kind.as_u8(),
                code: *code,
            },
        }
    }
}

/// Render one event as a single JSON line.
pub fn event_json(event: &Event) -> String {
    let out = EventOutput {
        body: EventBody::from(event),
        timestamp: now_unix_seconds(),
    };
    serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
}

/// Render one event for a human reader.
pub fn event_pretty(event: &Event) -> String {
    match event {
        Event::Ack => "Command OK".to_string(),
        Event::Status(report) => report
            .fields()
            .iter()
            .map(|(label, value)| format!("{label}:\t\t{value}"))
            .collect::<Vec<_>>()
            .join("\n"),
        Event::Color(reading) => format!(
            "Red frequency: {} Green frequency: {} Blue frequency: {} Color: {}",
            reading.red,
            reading.green,
            reading.blue,
            reading.label.as_str()
        ),
        Event::RemoteError(err) => format!("Arduino error: {}", err.description()),
        Event::Message(text) => format!("Message from Alex: {text}"),
        Event::Ignored(kind) => format!("Ignored {} packet", kind.name()),
        Event::Unrecognized { kind, code } => {
            format!("Unrecognized {} packet (code {code})", kind.name())
        }
    }
}

/// Render one event as a table.
pub fn event_table(event: &Event) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    match event {
        Event::Status(report) => {
            table.set_header(vec!["STATUS", "VALUE"]);
            for (label, value) in report.fields() {
                table.add_row(vec![label.to_string(), value.to_string()]);
            }
        }
        Event::Color(reading) => {
            table
                .set_header(vec!["RED", "GREEN", "BLUE", "COLOR"])
                .add_row(vec![
                    reading.red.to_string(),
                    reading.green.to_string(),
                    reading.blue.to_string(),
                    reading.label.as_str().to_string(),
                ]);
        }
        other => {
            table
                .set_header(vec!["EVENT", "DETAIL"])
                .add_row(vec![event_name(other).to_string(), event_pretty(other)]);
        }
    }
    table
}

pub fn print_event(event: &Event, format: OutputFormat) {
    match format {
        OutputFormat::Json => println!("{}", event_json(event)),
        OutputFormat::Table => println!("{}", event_table(event)),
        OutputFormat::Pretty => println!("{}", event_pretty(event)),
        OutputFormat::Log => LogHandler.handle(event.clone()),
    }
}

pub fn event_name(event: &Event) -> &'static str {
    match event {
        Event::Ack => "ACK",
        Event::Status(_) => "STATUS",
        Event::Color(_) => "COLOR",
        Event::RemoteError(_) => "ERROR",
        Event::Message(_) => "MESSAGE",
        Event::Ignored(_) => "IGNORED",
        Event::Unrecognized { .. } => "UNRECOGNIZED",
    }
}

/// Prints events as the receive thread delivers them.
pub struct ReportHandler {
    format: OutputFormat,
}

impl ReportHandler {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }
}

impl EventHandler for ReportHandler {
    fn handle(&mut self, event: Event) {
        if matches!(event, Event::Ignored(_)) {
            return;
        }
        print_event(&event, self.format);
    }

    fn frame_fault(&mut self, fault: &Outcome) {
        match fault {
            Outcome::BadMagic { .. } => eprintln!("Bad magic number from Arduino"),
            Outcome::BadChecksum { .. } => eprintln!("Bad checksum from Arduino"),
            Outcome::Complete(_) | Outcome::Incomplete => {}
        }
    }
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}

#[cfg(test)]
mod tests {
    use alexlink_frame::PacketKind;

    use super::*;

    fn status() -> Event {
        Event::Status(StatusReport::from_params(&[10, 12, 0, 0, 1, 1, 0, 0, 340, 0]))
    }

    #[test]
    fn json_status_flattens_counters() {
        let value: serde_json::Value = serde_json::from_str(&event_json(&status())).unwrap();
        assert_eq!(value["event"], "status");
        assert_eq!(value["right_forward_ticks"], 12);
        assert_eq!(value["forward_distance"], 340);
        assert!(value["timestamp"].is_string());
    }

    #[test]
    fn json_color_carries_label() {
        let event = Event::Color(ColorReading::new(71, 235, 179));
        let value: serde_json::Value = serde_json::from_str(&event_json(&event)).unwrap();
        assert_eq!(value["event"], "color");
        assert_eq!(value["label"], "RED");
        assert_eq!(value["green"], 235);
    }

    #[test]
    fn json_unrecognized_keeps_raw_bytes() {
        let event = Event::Unrecognized {
            kind: PacketKind::Unknown(9),
            code: 4,
        };
        let value: serde_json::Value = serde_json::from_str(&event_json(&event)).unwrap();
        assert_eq!(value["event"], "unrecognized");
        assert_eq!(value["kind_byte"], 9);
        assert_eq!(value["code"], 4);
    }

    #[test]
    fn pretty_status_uses_report_labels() {
        let text = event_pretty(&status());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 10);
        assert_eq!(lines[0], "Left Forward Ticks:\t\t10");
        assert_eq!(lines[8], "Forward Distance:\t\t340");
    }

    #[test]
    fn pretty_color_names_the_color() {
        let text = event_pretty(&Event::Color(ColorReading::new(500, 500, 500)));
        assert!(text.ends_with("Color: NO COLOR"));
    }

    #[test]
    fn pretty_remote_error_is_described() {
        let text = event_pretty(&Event::RemoteError(RemoteError::BadCommand));
        assert_eq!(text, "Arduino error: robot received bad command");
    }

    #[test]
    fn log_format_parses_from_flag() {
        assert!(matches!(
            OutputFormat::from_str("log", true).unwrap(),
            OutputFormat::Log
        ));
        print_event(&Event::Message("quiet".to_string()), OutputFormat::Log);
    }

    #[test]
    fn table_lists_every_status_field() {
        let rendered = event_table(&status()).to_string();
        assert!(rendered.contains("Right Reverse Ticks Turns"));
        assert!(rendered.contains("340"));
    }
}
