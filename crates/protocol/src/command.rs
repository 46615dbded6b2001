use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;

/// Fixed-vocabulary control tokens. The wire form is the kebab-case name,
/// matching the firmware's command parser verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiscreteCommand {
    Up,
    Down,
    Left,
    Right,
    Stop,
    SlowSpeed,
    NormalSpeed,
    FastSpeed,
}

impl DiscreteCommand {
    pub const ALL: [DiscreteCommand; 8] = [
        DiscreteCommand::Up,
        DiscreteCommand::Down,
        DiscreteCommand::Left,
        DiscreteCommand::Right,
        DiscreteCommand::Stop,
        DiscreteCommand::SlowSpeed,
        DiscreteCommand::NormalSpeed,
        DiscreteCommand::FastSpeed,
    ];

    pub fn as_token(&self) -> &'static str {
        match self {
            DiscreteCommand::Up => "up",
            DiscreteCommand::Down => "down",
            DiscreteCommand::Left => "left",
            DiscreteCommand::Right => "right",
            DiscreteCommand::Stop => "stop",
            DiscreteCommand::SlowSpeed => "slow-speed",
            DiscreteCommand::NormalSpeed => "normal-speed",
            DiscreteCommand::FastSpeed => "fast-speed",
        }
    }
}

impl fmt::Display for DiscreteCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token())
    }
}

impl FromStr for DiscreteCommand {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DiscreteCommand::ALL
            .iter()
            .find(|cmd| cmd.as_token() == s)
            .copied()
            .ok_or_else(|| ProtocolError::UnknownToken(s.to_string()))
    }
}

/// The token of the discrete command, unchanged. Discrete frames carry the
/// vocabulary word itself.
pub fn encode_discrete(cmd: DiscreteCommand) -> &'static str {
    cmd.as_token()
}

/// The generic stop frame. Releasing any discrete control sends this literal,
/// never a per-direction variant.
pub fn encode_stop() -> &'static str {
    DiscreteCommand::Stop.as_token()
}

/// A complete outbound frame: either a vocabulary token or a two-axis motion
/// command with already-mapped motor speeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Discrete(DiscreteCommand),
    Motion { left: i16, right: i16 },
}

impl Command {
    pub fn to_wire(&self) -> String {
        match self {
            Command::Discrete(cmd) => cmd.as_token().to_string(),
            Command::Motion { left, right } => format!("M:{left},{right}"),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Discrete(cmd) => f.write_str(cmd.as_token()),
            Command::Motion { left, right } => write!(f, "M:{left},{right}"),
        }
    }
}
