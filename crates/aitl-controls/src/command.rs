//! Command-driven operating states and their transition table.

use std::fmt;
use std::str::FromStr;

use crate::error::ControlError;
use crate::stepping::ControlState;
use serde::{Deserialize, Serialize};

/// Operating state of a command-driven controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandState {
    #[default]
    Idle,
    Startup,
    Run,
    Fault,
}

impl CommandState {
    /// Whether the PID loop is closed in this state.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Startup | Self::Run)
    }
}

impl ControlState for CommandState {
    fn code(&self) -> u8 {
        match self {
            Self::Idle => 1,
            Self::Startup => 2,
            Self::Run => 3,
            Self::Fault => 4,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Startup => "STARTUP",
            Self::Run => "RUN",
            Self::Fault => "FAULT",
        }
    }
}

impl fmt::Display for CommandState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CommandState {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IDLE" => Ok(Self::Idle),
            "STARTUP" => Ok(Self::Startup),
            "RUN" => Ok(Self::Run),
            "FAULT" => Ok(Self::Fault),
            other => Err(ControlError::InvalidState {
                label: other.to_string(),
            }),
        }
    }
}

/// Individual command flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    Start,
    StartupDone,
    ErrorDetected,
    Reset,
}

/// Externally set command flags.
///
/// The transition step reads these flags but never clears them. A flag set
/// once stays set until the caller clears it, so for example a latched
/// `error_detected` sends the controller straight back to `Fault` after every
/// reset cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CommandFlags {
    /// IDLE to STARTUP.
    pub start_cmd: bool,
    /// STARTUP to RUN.
    pub startup_done: bool,
    /// STARTUP or RUN to FAULT.
    pub error_detected: bool,
    /// FAULT to IDLE.
    pub reset_cmd: bool,
}

impl CommandFlags {
    /// Set or clear one flag.
    pub fn set(&mut self, command: Command, value: bool) {
        match command {
            Command::Start => self.start_cmd = value,
            Command::StartupDone => self.startup_done = value,
            Command::ErrorDetected => self.error_detected = value,
            Command::Reset => self.reset_cmd = value,
        }
    }

    /// Read one flag.
    pub fn get(&self, command: Command) -> bool {
        match command {
            Command::Start => self.start_cmd,
            Command::StartupDone => self.startup_done,
            Command::ErrorDetected => self.error_detected,
            Command::Reset => self.reset_cmd,
        }
    }

    /// Clear every flag.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Transition table, evaluated once per tick.
pub fn next_command_state(state: CommandState, flags: &CommandFlags) -> CommandState {
    use CommandState::*;

    match state {
        Idle if flags.start_cmd => Startup,
        Startup if flags.error_detected => Fault,
        Startup if flags.startup_done => Run,
        Run if flags.error_detected => Fault,
        Fault if flags.reset_cmd => Idle,
        unchanged => unchanged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(commands: &[Command]) -> CommandFlags {
        let mut f = CommandFlags::default();
        for c in commands {
            f.set(*c, true);
        }
        f
    }

    #[test]
    fn table_rows() {
        use Command::*;
        use CommandState::*;

        assert_eq!(next_command_state(Idle, &flags(&[Start])), Startup);
        assert_eq!(next_command_state(Startup, &flags(&[ErrorDetected])), Fault);
        assert_eq!(next_command_state(Startup, &flags(&[StartupDone])), Run);
        assert_eq!(
            next_command_state(Startup, &flags(&[StartupDone, ErrorDetected])),
            Fault
        );
        assert_eq!(next_command_state(Run, &flags(&[ErrorDetected])), Fault);
        assert_eq!(next_command_state(Fault, &flags(&[Reset])), Idle);
    }

    #[test]
    fn unrelated_flags_hold_state() {
        use Command::*;
        use CommandState::*;

        assert_eq!(next_command_state(Idle, &flags(&[StartupDone, Reset])), Idle);
        assert_eq!(next_command_state(Run, &flags(&[Start, Reset])), Run);
        assert_eq!(next_command_state(Fault, &flags(&[Start])), Fault);
        assert_eq!(next_command_state(Startup, &CommandFlags::default()), Startup);
    }

    #[test]
    fn flag_accessors() {
        let mut f = CommandFlags::default();
        f.set(Command::Reset, true);
        assert!(f.get(Command::Reset));
        assert!(f.reset_cmd);
        f.clear();
        assert_eq!(f, CommandFlags::default());
    }

    #[test]
    fn codes_and_labels() {
        assert_eq!(CommandState::Idle.code(), 1);
        assert_eq!(CommandState::Fault.code(), 4);
        assert_eq!("RUN".parse::<CommandState>().unwrap(), CommandState::Run);
        assert!("STOPPED".parse::<CommandState>().is_err());
        assert!(CommandState::Startup.is_active());
        assert!(!CommandState::Fault.is_active());
    }
}
