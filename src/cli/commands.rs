//! Settings typed on stdin while a session runs

use crate::error::{AppError, Result};
use std::str::FromStr;

/// One line of runtime input, e.g. `interval 100` or `host example.com`
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    /// Probe a different host (restarts the session)
    Host(String),
    /// New interval in milliseconds (restarts the session)
    Interval(i64),
    /// New history length in seconds (applied in place)
    History(f64),
    Start,
    Stop,
    Help,
}

impl SessionCommand {
    pub const USAGE: &'static str =
        "Commands: host <name>, interval <ms>, history <seconds>, stop, start, help";
}

impl FromStr for SessionCommand {
    type Err = AppError;

    fn from_str(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let Some(keyword) = words.next() else {
            return Err(AppError::parse("Empty command"));
        };
        let argument = words.next();
        if words.next().is_some() {
            return Err(AppError::parse(format!("Too many arguments for '{}'", keyword)));
        }

        let keyword = keyword.to_ascii_lowercase();
        match (keyword.as_str(), argument) {
            ("host", Some(host)) => Ok(Self::Host(host.to_string())),
            ("interval", Some(value)) => value
                .parse()
                .map(Self::Interval)
                .map_err(|_| AppError::parse(format!("Interval must be a whole number of milliseconds, got '{}'", value))),
            ("history", Some(value)) => value
                .parse()
                .map(Self::History)
                .map_err(|_| AppError::parse(format!("History must be a number of seconds, got '{}'", value))),
            ("host" | "interval" | "history", None) => {
                Err(AppError::parse(format!("'{}' needs a value", keyword)))
            }
            ("start", None) => Ok(Self::Start),
            ("stop", None) => Ok(Self::Stop),
            ("help" | "?", None) => Ok(Self::Help),
            _ => Err(AppError::parse(format!("Unknown command '{}'", line.trim()))),
        }
    }
}
