//! Decoding of telemetry carried in RESPONSE and ERROR packets.

use alexlink_frame::{ResponseCode, PARAM_COUNT};
use serde::Serialize;

/// Odometry counters reported in a STATUS response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub left_forward_ticks: u32,
    pub right_forward_ticks: u32,
    pub left_reverse_ticks: u32,
    pub right_reverse_ticks: u32,
    pub left_forward_ticks_turns: u32,
    pub right_forward_ticks_turns: u32,
    pub left_reverse_ticks_turns: u32,
    pub right_reverse_ticks_turns: u32,
    pub forward_distance: u32,
    pub reverse_distance: u32,
}

impl StatusReport {
    pub fn from_params(params: &[u32; PARAM_COUNT]) -> Self {
        Self {
            left_forward_ticks: params[0],
            right_forward_ticks: params[1],
            left_reverse_ticks: params[2],
            right_reverse_ticks: params[3],
            left_forward_ticks_turns: params[4],
            right_forward_ticks_turns: params[5],
            left_reverse_ticks_turns: params[6],
            right_reverse_ticks_turns: params[7],
            forward_distance: params[8],
            reverse_distance: params[9],
        }
    }

    /// Counters paired with their report labels, in wire order.
    pub fn fields(&self) -> [(&'static str, u32); PARAM_COUNT] {
        [
            ("Left Forward Ticks", self.left_forward_ticks),
            ("Right Forward Ticks", self.right_forward_ticks),
            ("Left Reverse Ticks", self.left_reverse_ticks),
            ("Right Reverse Ticks", self.right_reverse_ticks),
            ("Left Forward Ticks Turns", self.left_forward_ticks_turns),
            ("Right Forward Ticks Turns", self.right_forward_ticks_turns),
            ("Left Reverse Ticks Turns", self.left_reverse_ticks_turns),
            ("Right Reverse Ticks Turns", self.right_reverse_ticks_turns),
            ("Forward Distance", self.forward_distance),
            ("Reverse Distance", self.reverse_distance),
        ]
    }
}

/// Colour the sensor reading is closest to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColorLabel {
    Red,
    Green,
    NoColor,
}

impl ColorLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Red => "RED",
            Self::Green => "GREEN",
            Self::NoColor => "NO COLOR",
        }
    }
}

/// Reference sensor frequencies, calibrated on the arena targets.
const REFERENCES: [(ColorLabel, [f64; 3]); 2] = [
    (ColorLabel::Red, [71.0, 235.0, 179.0]),
    (ColorLabel::Green, [59.0, 51.0, 54.0]),
];

/// Readings further than this from every reference are not a colour.
pub const MAX_COLOR_DISTANCE: f64 = 100.0;

/// A colour-sensor sample and its classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColorReading {
    pub red: u32,
    pub green: u32,
    pub blue: u32,
    pub label: ColorLabel,
}

impl ColorReading {
    pub fn new(red: u32, green: u32, blue: u32) -> Self {
        Self {
            red,
            green,
            blue,
            label: classify_color(red, green, blue),
        }
    }

    pub fn from_params(params: &[u32; PARAM_COUNT]) -> Self {
        Self::new(params[0], params[1], params[2])
    }
}

/// Nearest-reference classification in RGB frequency space.
///
/// The nearest reference wins only if it is strictly nearer than every
/// other reference and within [`MAX_COLOR_DISTANCE`].
pub fn classify_color(red: u32, green: u32, blue: u32) -> ColorLabel {
    let sample = [f64::from(red), f64::from(green), f64::from(blue)];
    let distances = REFERENCES.map(|(label, reference)| (label, distance(sample, reference)));

    let mut best: Option<(ColorLabel, f64)> = None;
    let mut tied = false;
    for (label, dist) in distances {
        match best.map(|(_, best_dist)| best_dist) {
            Some(best_dist) if dist > best_dist => {}
            Some(best_dist) if dist == best_dist => tied = true,
            _ => {
                best = Some((label, dist));
                tied = false;
            }
        }
    }

    match best {
        Some((label, dist)) if !tied && dist < MAX_COLOR_DISTANCE => label,
        _ => ColorLabel::NoColor,
    }
}

fn distance(a: [f64; 3], b: [f64; 3]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// A protocol fault the robot detected in something the host sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteError {
    BadMagic,
    BadChecksum,
    BadCommand,
    UnexpectedResponse,
}

impl RemoteError {
    /// Map an ERROR packet's code. Codes outside the error range give `None`.
    pub fn from_code(code: ResponseCode) -> Option<Self> {
        match code {
            ResponseCode::BadPacket => Some(Self::BadMagic),
            ResponseCode::BadChecksum => Some(Self::BadChecksum),
            ResponseCode::BadCommand => Some(Self::BadCommand),
            ResponseCode::BadResponse => Some(Self::UnexpectedResponse),
            ResponseCode::Ok | ResponseCode::Status | ResponseCode::Color => None,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::BadMagic => "robot received bad magic number",
            Self::BadChecksum => "robot received bad checksum",
            Self::BadCommand => "robot received bad command",
            Self::UnexpectedResponse => "robot received unexpected response",
        }
    }
}

impl std::fmt::Display for RemoteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}
