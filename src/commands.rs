use std::str::{FromStr, SplitWhitespace};

use thiserror::Error;

use crate::device_client::RelayId;

pub const HELP: &str = "\
Commands:
  toggle <id>   switch relay <id> to the opposite state
  on <id>       switch relay <id> on
  off <id>      switch relay <id> off
  refresh       poll the device now
  reset         reset WiFi/MQTT configuration (device restarts)
  help          show this help
  quit          stop polling and exit";

/// A user action, independent of where it was entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserCommand {
    SetRelay { relay: RelayId, state: bool },
    Toggle { relay: RelayId },
    Refresh,
    Reset,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandParseError {
    #[error("empty command")]
    Empty,
    #[error("unknown command `{0}`, try `help`")]
    Unknown(String),
    #[error("`{0}` needs a relay id")]
    MissingRelay(String),
    #[error("`{0}` is not a relay id")]
    InvalidRelay(String),
}

impl FromStr for UserCommand {
    type Err = CommandParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Err(CommandParseError::Empty);
        };
        let verb = verb.to_ascii_lowercase();

        match verb.as_str() {
            "toggle" | "t" => Ok(UserCommand::Toggle {
                relay: relay_arg(&verb, &mut words)?,
            }),
            "on" => Ok(UserCommand::SetRelay {
                relay: relay_arg(&verb, &mut words)?,
                state: true,
            }),
            "off" => Ok(UserCommand::SetRelay {
                relay: relay_arg(&verb, &mut words)?,
                state: false,
            }),
            "refresh" | "r" => Ok(UserCommand::Refresh),
            "reset" => Ok(UserCommand::Reset),
            "help" | "?" => Ok(UserCommand::Help),
            "quit" | "exit" | "q" => Ok(UserCommand::Quit),
            _ => Err(CommandParseError::Unknown(verb.to_string())),
        }
    }
}

fn relay_arg(verb: &str, words: &mut SplitWhitespace<'_>) -> Result<RelayId, CommandParseError> {
    let raw = words
        .next()
        .ok_or_else(|| CommandParseError::MissingRelay(verb.to_string()))?;
    // Cards label relays as R<id>; accept that form too.
    let digits = raw.strip_prefix(['R', 'r']).unwrap_or(raw);
    digits
        .parse()
        .map_err(|_| CommandParseError::InvalidRelay(raw.to_string()))
}
