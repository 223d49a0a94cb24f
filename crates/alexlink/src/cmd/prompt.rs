use alexlink_host::Command;

use crate::exit::{host_error, CliError, CliResult, USAGE};

pub const HELP: &str = "\
f [dist] [speed]   forward (default 25 cm at 70%)
b [dist] [speed]   reverse
l [angle] [speed]  turn left (default 90 deg at 90%)
r [angle] [speed]  turn right
s                  stop
c                  clear stats
g                  get stats
o                  open claw
p                  close claw
k                  scan colour
d                  drop medpack
h                  hello
q                  quit";

/// One line typed at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Empty,
    Help,
    Quit,
    Send(Command),
}

/// Parse a prompt line: a command name or alias followed by numbers.
pub fn parse_line(line: &str) -> CliResult<Line> {
    let mut words = line.split_whitespace();
    let Some(name) = words.next() else {
        return Ok(Line::Empty);
    };

    match name.to_ascii_lowercase().as_str() {
        "q" | "quit" | "exit" => return Ok(Line::Quit),
        "?" | "help" => return Ok(Line::Help),
        _ => {}
    }

    let args = words
        .map(|word| {
            word.parse::<u32>()
                .map_err(|_| CliError::new(USAGE, format!("not a number: {word}")))
        })
        .collect::<CliResult<Vec<u32>>>()?;

    Command::from_name(name, &args)
        .map(Line::Send)
        .map_err(|err| host_error("bad command", err))
}

#[cfg(test)]
mod tests {
    use alexlink_host::command::{DEFAULT_DISTANCE_CM, DEFAULT_DRIVE_POWER};

    use super::*;

    #[test]
    fn blank_lines_are_empty() {
        assert_eq!(parse_line("").unwrap(), Line::Empty);
        assert_eq!(parse_line("   \t").unwrap(), Line::Empty);
    }

    #[test]
    fn q_quits() {
        assert_eq!(parse_line("q").unwrap(), Line::Quit);
        assert_eq!(parse_line("Q").unwrap(), Line::Quit);
    }

    #[test]
    fn forward_with_explicit_arguments() {
        assert_eq!(
            parse_line("f 50 70").unwrap(),
            Line::Send(Command::Forward {
                distance_cm: 50,
                power_pct: 70
            })
        );
    }

    #[test]
    fn missing_arguments_use_presets() {
        assert_eq!(
            parse_line("b").unwrap(),
            Line::Send(Command::Reverse {
                distance_cm: DEFAULT_DISTANCE_CM,
                power_pct: DEFAULT_DRIVE_POWER
            })
        );
        assert_eq!(
            parse_line("r 45").unwrap(),
            Line::Send(Command::TurnRight {
                degrees: 45,
                power_pct: 90
            })
        );
    }

    #[test]
    fn single_letter_actions() {
        assert_eq!(parse_line("k").unwrap(), Line::Send(Command::Scan));
        assert_eq!(parse_line("d").unwrap(), Line::Send(Command::Drop));
        assert_eq!(parse_line("p").unwrap(), Line::Send(Command::Close));
        assert_eq!(parse_line("g").unwrap(), Line::Send(Command::GetStats));
    }

    #[test]
    fn rejects_garbage() {
        let err = parse_line("f far").unwrap_err();
        assert_eq!(err.code, USAGE);
        assert!(err.message.contains("far"));

        let err = parse_line("x").unwrap_err();
        assert_eq!(err.code, USAGE);

        assert!(parse_line("s 1").is_err());
    }
}
