//! The command vocabulary offered to the operator.

use alexlink_frame::{CommandCode, Packet};

use crate::error::{HostError, Result};

/// Default travel for forward/reverse when no distance is given (cm).
pub const DEFAULT_DISTANCE_CM: u32 = 25;
/// Default drive power (%).
pub const DEFAULT_DRIVE_POWER: u32 = 70;
/// Default turn when no angle is given (degrees).
pub const DEFAULT_TURN_DEGREES: u32 = 90;
/// Default turning power (%).
pub const DEFAULT_TURN_POWER: u32 = 90;

/// Something the operator can ask the robot to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Forward { distance_cm: u32, power_pct: u32 },
    Reverse { distance_cm: u32, power_pct: u32 },
    TurnLeft { degrees: u32, power_pct: u32 },
    TurnRight { degrees: u32, power_pct: u32 },
    Stop,
    ClearStats,
    GetStats,
    /// Open the gripper claw.
    Open,
    /// Close the gripper claw.
    Close,
    /// Read the colour sensor.
    Scan,
    /// Release the medpack.
    Drop,
    Hello,
}

impl Command {
    /// Canonical name of every command, in menu order.
    pub const NAMES: [&'static str; 12] = [
        "forward",
        "reverse",
        "turn-left",
        "turn-right",
        "stop",
        "clear-stats",
        "get-stats",
        "open",
        "close",
        "scan",
        "drop",
        "hello",
    ];

    /// Look a command up by name or one-letter alias and attach `args`.
    ///
    /// Movement commands take up to two arguments (distance or angle, then
    /// power); missing ones fall back to the defaults above. All other
    /// commands take none.
    pub fn from_name(name: &str, args: &[u32]) -> Result<Self> {
        let command = match name.to_ascii_lowercase().as_str() {
            "f" | "forward" => {
                let (distance_cm, power_pct) =
                    movement_args("forward", args, DEFAULT_DISTANCE_CM, DEFAULT_DRIVE_POWER)?;
                Self::Forward {
                    distance_cm,
                    power_pct,
                }
            }
            "b" | "reverse" => {
                let (distance_cm, power_pct) =
                    movement_args("reverse", args, DEFAULT_DISTANCE_CM, DEFAULT_DRIVE_POWER)?;
                Self::Reverse {
                    distance_cm,
                    power_pct,
                }
            }
            "l" | "left" | "turn-left" => {
                let (degrees, power_pct) =
                    movement_args("turn-left", args, DEFAULT_TURN_DEGREES, DEFAULT_TURN_POWER)?;
                Self::TurnLeft { degrees, power_pct }
            }
            "r" | "right" | "turn-right" => {
                let (degrees, power_pct) =
                    movement_args("turn-right", args, DEFAULT_TURN_DEGREES, DEFAULT_TURN_POWER)?;
                Self::TurnRight { degrees, power_pct }
            }
            "s" | "stop" => no_args(Self::Stop, args)?,
            "c" | "clear" | "clear-stats" => no_args(Self::ClearStats, args)?,
            "g" | "stats" | "get-stats" => no_args(Self::GetStats, args)?,
            "o" | "open" => no_args(Self::Open, args)?,
            "p" | "close" => no_args(Self::Close, args)?,
            "k" | "scan" => no_args(Self::Scan, args)?,
            "d" | "drop" => no_args(Self::Drop, args)?,
            "h" | "hello" => no_args(Self::Hello, args)?,
            _ => return Err(HostError::UnknownCommand(name.to_string())),
        };
        Ok(command)
    }

    /// Canonical name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Forward { .. } => "forward",
            Self::Reverse { .. } => "reverse",
            Self::TurnLeft { .. } => "turn-left",
            Self::TurnRight { .. } => "turn-right",
            Self::Stop => "stop",
            Self::ClearStats => "clear-stats",
            Self::GetStats => "get-stats",
            Self::Open => "open",
            Self::Close => "close",
            Self::Scan => "scan",
            Self::Drop => "drop",
            Self::Hello => "hello",
        }
    }

    /// Build the packet that carries this command.
    pub fn to_packet(self) -> Packet {
        match self {
            Self::Forward {
                distance_cm,
                power_pct,
            } => Packet::command(CommandCode::Forward, &[distance_cm, power_pct]),
            Self::Reverse {
                distance_cm,
                power_pct,
            } => Packet::command(CommandCode::Reverse, &[distance_cm, power_pct]),
            Self::TurnLeft { degrees, power_pct } => {
                Packet::command(CommandCode::TurnLeft, &[degrees, power_pct])
            }
            Self::TurnRight { degrees, power_pct } => {
                Packet::command(CommandCode::TurnRight, &[degrees, power_pct])
            }
            Self::Stop => Packet::command(CommandCode::Stop, &[]),
            Self::ClearStats => Packet::command(CommandCode::ClearStats, &[]),
            Self::GetStats => Packet::command(CommandCode::GetStats, &[]),
            Self::Open => Packet::command(CommandCode::Open, &[]),
            Self::Close => Packet::command(CommandCode::Close, &[]),
            Self::Scan => Packet::command(CommandCode::Scan, &[]),
            Self::Drop => Packet::command(CommandCode::Drop, &[]),
            Self::Hello => Packet::hello(),
        }
    }
}

fn movement_args(
    command: &'static str,
    args: &[u32],
    default_amount: u32,
    default_power: u32,
) -> Result<(u32, u32)> {
    if args.len() > 2 {
        return Err(HostError::InvalidArguments {
            command,
            reason: format!("expected at most 2 arguments, got {}", args.len()),
        });
    }

    let amount = args.first().copied().unwrap_or(default_amount);
    let power = args.get(1).copied().unwrap_or(default_power);
    if power > 100 {
        return Err(HostError::InvalidArguments {
            command,
            reason: format!("power must be 0-100%, got {power}"),
        });
    }
    Ok((amount, power))
}

fn no_args(command: Command, args: &[u32]) -> Result<Command> {
    if args.is_empty() {
        Ok(command)
    } else {
        Err(HostError::InvalidArguments {
            command: command.name(),
            reason: format!("takes no arguments, got {}", args.len()),
        })
    }
}
