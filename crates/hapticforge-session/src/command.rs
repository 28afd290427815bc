//! The line-oriented command language.
//!
//! ```text
//! STOP
//! CONNECT   <device>
//! VIBRATE   <device> <0.0-1.0>
//! PULSE     <device> LOW|MEDIUM|HIGH
//! HEARTBEAT <device> LOW|MEDIUM|HIGH
//! ```
//!
//! Tokens are separated by whitespace. `<device>` goes through the
//! [`DeviceResolver`], so aliases apply.

use std::fmt;

use hapticforge_resolver::{DeviceResolver, Resolution};
use hapticforge_waveform::PowerLevel;

use crate::CommandError;

/// What to do to a device once it is known.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Make sure the device is connected. No-op when it already is.
    Connect,
    /// Set every vibration feature to this speed.
    Vibrate(f64),
    /// One decaying pulse.
    Pulse(PowerLevel),
    /// Two pulses, "thump-thump".
    Heartbeat(PowerLevel),
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect => write!(f, "CONNECT"),
            Self::Vibrate(power) => write!(f, "VIBRATE {power}"),
            Self::Pulse(level) => write!(f, "PULSE {level}"),
            Self::Heartbeat(level) => write!(f, "HEARTBEAT {level}"),
        }
    }
}

/// A command addressed to a device, kept until that device shows up.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedCommand {
    pub target: Resolution,
    pub action: Action,
}

/// A parsed command line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Stop every device and drop the backlog. Never resolved or queued.
    Stop,
    /// Anything aimed at a single device.
    Device(CachedCommand),
}

impl Command {
    /// Parses one line of input.
    ///
    /// Returns `Ok(None)` for a blank line.
    ///
    /// # Errors
    /// Unknown keyword, wrong argument count, or an argument that doesn't
    /// parse. The device token is resolved here; with the rules in place
    /// that only fails for an empty token.
    pub fn parse(
        line: &str,
        resolver: &DeviceResolver,
    ) -> Result<Option<Self>, CommandError> {
        let mut tokens = line.split_whitespace();
        let Some(keyword) = tokens.next() else {
            return Ok(None);
        };
        let args: Vec<&str> = tokens.collect();

        let command = match keyword {
            "STOP" => {
                expect_args("STOP", &args, 0)?;
                Self::Stop
            }
            "CONNECT" => {
                expect_args("CONNECT", &args, 1)?;
                Self::device(resolver, args[0], Action::Connect)?
            }
            "VIBRATE" => {
                expect_args("VIBRATE", &args, 2)?;
                let power = parse_power(args[1])?;
                Self::device(resolver, args[0], Action::Vibrate(power))?
            }
            "PULSE" => {
                expect_args("PULSE", &args, 2)?;
                let level = args[1].parse()?;
                Self::device(resolver, args[0], Action::Pulse(level))?
            }
            "HEARTBEAT" => {
                expect_args("HEARTBEAT", &args, 2)?;
                let level = args[1].parse()?;
                Self::device(resolver, args[0], Action::Heartbeat(level))?
            }
            other => return Err(CommandError::UnknownCommand(other.to_string())),
        };

        Ok(Some(command))
    }

    fn device(
        resolver: &DeviceResolver,
        token: &str,
        action: Action,
    ) -> Result<Self, CommandError> {
        let target = resolver.resolve(token)?;
        Ok(Self::Device(CachedCommand { target, action }))
    }
}

fn expect_args(
    keyword: &'static str,
    args: &[&str],
    expected: usize,
) -> Result<(), CommandError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(CommandError::WrongArity {
            keyword,
            expected,
            found: args.len(),
        })
    }
}

fn parse_power(token: &str) -> Result<f64, CommandError> {
    match token.parse::<f64>() {
        Ok(power) if (0.0..=1.0).contains(&power) => Ok(power),
        _ => Err(CommandError::InvalidPower(token.to_string())),
    }
}
