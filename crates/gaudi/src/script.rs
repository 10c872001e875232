//! Gesture scripts: one command per line, `#` starts a comment.
//!
//! ```text
//! wheel 120                      # positive scrolls forward
//! swipe 700 200 over no-swipe    # touch start/end y, optional target markers
//! wait 400ms
//! goto 3 backward
//! drag text-slide facade 40 -20
//! resize 1 mosaic 60 60
//! remount 1
//! snapshot
//! settle
//! ```
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use navigator::Direction;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ScriptError {
    #[error("line {line}: unknown command '{command}'")]
    UnknownCommand { line: usize, command: String },
    #[error("line {line}: usage: {usage}")]
    Usage { line: usize, usage: &'static str },
    #[error("line {line}: invalid {what} '{value}'")]
    InvalidValue {
        line: usize,
        what: &'static str,
        value: String,
    },
}

/// A panel named by ordinal or by its configured name.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelRef {
    Index(isize),
    Name(String),
}

impl fmt::Display for PanelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PanelRef::Index(index) => write!(f, "{index}"),
            PanelRef::Name(name) => f.write_str(name),
        }
    }
}

impl From<&str> for PanelRef {
    fn from(token: &str) -> Self {
        match token.parse::<isize>() {
            Ok(index) => PanelRef::Index(index),
            Err(_) => PanelRef::Name(token.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Wheel {
        delta: f32,
        over: Vec<String>,
    },
    Swipe {
        start_y: f32,
        end_y: f32,
        over: Vec<String>,
    },
    Wait(Duration),
    Goto {
        target: PanelRef,
        direction: Option<Direction>,
    },
    Drag {
        panel: PanelRef,
        card: String,
        dx: f32,
        dy: f32,
    },
    Resize {
        panel: PanelRef,
        card: String,
        dw: f32,
        dh: f32,
    },
    Remount(PanelRef),
    Snapshot,
    Settle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScriptLine {
    pub line: usize,
    pub command: Command,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Script {
    pub lines: Vec<ScriptLine>,
}

impl Script {
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl FromStr for Script {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

pub fn parse(source: &str) -> Result<Script, ScriptError> {
    let mut lines = Vec::new();
    for (index, raw) in source.lines().enumerate() {
        let line = index + 1;
        let text = raw.split('#').next().unwrap_or_default();
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let Some((&head, rest)) = tokens.split_first() else {
            continue;
        };
        let command = parse_command(line, head, rest)?;
        lines.push(ScriptLine { line, command });
    }
    Ok(Script { lines })
}

fn parse_command(line: usize, head: &str, args: &[&str]) -> Result<Command, ScriptError> {
    let usage = |usage: &'static str| ScriptError::Usage { line, usage };
    match head.to_ascii_lowercase().as_str() {
        "wheel" => {
            const USAGE: &str = "wheel <dy> [over <marker>...]";
            let (&delta, rest) = args.split_first().ok_or_else(|| usage(USAGE))?;
            Ok(Command::Wheel {
                delta: number(line, "wheel delta", delta)?,
                over: markers(rest).ok_or_else(|| usage(USAGE))?,
            })
        }
        "swipe" => {
            const USAGE: &str = "swipe <start_y> <end_y> [over <marker>...]";
            let [start_y, end_y, rest @ ..] = args else {
                return Err(usage(USAGE));
            };
            Ok(Command::Swipe {
                start_y: number(line, "swipe start", start_y)?,
                end_y: number(line, "swipe end", end_y)?,
                over: markers(rest).ok_or_else(|| usage(USAGE))?,
            })
        }
        "wait" => {
            let [value] = args else {
                return Err(usage("wait <duration>"));
            };
            Ok(Command::Wait(duration(line, value)?))
        }
        "goto" => {
            const USAGE: &str = "goto <panel> [forward|backward]";
            let direction = match args {
                [_] => None,
                [_, direction] => Some(direction.parse::<Direction>().map_err(|_| {
                    ScriptError::InvalidValue {
                        line,
                        what: "direction",
                        value: direction.to_string(),
                    }
                })?),
                _ => return Err(usage(USAGE)),
            };
            Ok(Command::Goto {
                target: PanelRef::from(args[0]),
                direction,
            })
        }
        "drag" => {
            let [panel, card, dx, dy] = args else {
                return Err(usage("drag <panel> <card> <dx> <dy>"));
            };
            Ok(Command::Drag {
                panel: PanelRef::from(*panel),
                card: card.to_string(),
                dx: number(line, "drag offset", dx)?,
                dy: number(line, "drag offset", dy)?,
            })
        }
        "resize" => {
            let [panel, card, dw, dh] = args else {
                return Err(usage("resize <panel> <card> <dw> <dh>"));
            };
            Ok(Command::Resize {
                panel: PanelRef::from(*panel),
                card: card.to_string(),
                dw: number(line, "resize delta", dw)?,
                dh: number(line, "resize delta", dh)?,
            })
        }
        "remount" => {
            let [panel] = args else {
                return Err(usage("remount <panel>"));
            };
            Ok(Command::Remount(PanelRef::from(*panel)))
        }
        "snapshot" if args.is_empty() => Ok(Command::Snapshot),
        "snapshot" => Err(usage("snapshot")),
        "settle" if args.is_empty() => Ok(Command::Settle),
        "settle" => Err(usage("settle")),
        _ => Err(ScriptError::UnknownCommand {
            line,
            command: head.to_string(),
        }),
    }
}

/// `[]` or `["over", marker, ...]`; `over` with nothing after it is malformed.
fn markers(rest: &[&str]) -> Option<Vec<String>> {
    match rest.split_first() {
        None => Some(Vec::new()),
        Some((&"over", markers)) if !markers.is_empty() => {
            Some(markers.iter().map(|m| m.to_string()).collect())
        }
        Some(_) => None,
    }
}

fn number(line: usize, what: &'static str, value: &str) -> Result<f32, ScriptError> {
    value
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ScriptError::InvalidValue {
            line,
            what,
            value: value.to_string(),
        })
}

fn duration(line: usize, value: &str) -> Result<Duration, ScriptError> {
    if let Ok(ms) = value.parse::<u64>() {
        return Ok(Duration::from_millis(ms));
    }
    humantime::parse_duration(value).map_err(|_| ScriptError::InvalidValue {
        line,
        what: "duration",
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_command() {
        let script = parse(
            r#"
# warm up
wheel 120
wheel -40 over no-swipe card:facade
swipe 700 200
wait 400ms
wait 250
goto 3 backward
goto closing
drag text-slide facade 40 -20.5
resize 1 mosaic 60 60
remount 1
snapshot   # trailing comment
settle
"#,
        )
        .unwrap();

        let commands: Vec<_> = script.lines.iter().map(|l| l.command.clone()).collect();
        assert_eq!(
            commands,
            vec![
                Command::Wheel {
                    delta: 120.0,
                    over: vec![]
                },
                Command::Wheel {
                    delta: -40.0,
                    over: vec!["no-swipe".into(), "card:facade".into()]
                },
                Command::Swipe {
                    start_y: 700.0,
                    end_y: 200.0,
                    over: vec![]
                },
                Command::Wait(Duration::from_millis(400)),
                Command::Wait(Duration::from_millis(250)),
                Command::Goto {
                    target: PanelRef::Index(3),
                    direction: Some(Direction::Backward)
                },
                Command::Goto {
                    target: PanelRef::Name("closing".into()),
                    direction: None
                },
                Command::Drag {
                    panel: PanelRef::Name("text-slide".into()),
                    card: "facade".into(),
                    dx: 40.0,
                    dy: -20.5
                },
                Command::Resize {
                    panel: PanelRef::Index(1),
                    card: "mosaic".into(),
                    dw: 60.0,
                    dh: 60.0
                },
                Command::Remount(PanelRef::Index(1)),
                Command::Snapshot,
                Command::Settle,
            ]
        );
        assert_eq!(script.lines[0].line, 3);
    }

    #[test]
    fn errors_carry_line_numbers() {
        let err = parse("wheel 10\n\nbounce 3\n").unwrap_err();
        assert_eq!(
            err,
            ScriptError::UnknownCommand {
                line: 3,
                command: "bounce".into()
            }
        );
        assert_eq!(err.to_string(), "line 3: unknown command 'bounce'");

        let err = parse("wait soon").unwrap_err();
        assert!(matches!(err, ScriptError::InvalidValue { line: 1, what: "duration", .. }));

        let err = parse("wheel").unwrap_err();
        assert!(matches!(err, ScriptError::Usage { line: 1, .. }));

        let err = parse("wheel 10 over").unwrap_err();
        assert!(matches!(err, ScriptError::Usage { line: 1, .. }));

        let err = parse("goto 2 sideways").unwrap_err();
        assert!(matches!(err, ScriptError::InvalidValue { what: "direction", .. }));
    }

    #[test]
    fn negative_goto_targets_are_kept_for_replay() {
        let script: Script = "goto -1".parse().unwrap();
        assert_eq!(
            script.lines[0].command,
            Command::Goto {
                target: PanelRef::Index(-1),
                direction: None
            }
        );
    }

    #[test]
    fn blank_and_comment_lines_are_skipped() {
        let script = parse("\n   \n# only a comment\n").unwrap();
        assert!(script.is_empty());
    }
}
