//! Scheduled commands
//!
//! A [`CommandData`] is one timed unit of work: which device, which
//! function, two payload words, and how long it stays current.

use labseq_protocol::CommandPayload;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Code of the empty command
pub const NO_CODE: i8 = -1;

/// Target of a command that addresses no device
pub const NO_TARGET: i8 = -1;

/// One scheduled action
///
/// Commands are plain values: queues and vectors hold copies, never
/// references.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CommandData {
    /// Function code (-1 = no command)
    pub code: i8,
    /// Device index (-1 = no target)
    pub target: i8,
    /// First payload word (e.g. setpoint)
    pub data0: u32,
    /// Second payload word (e.g. parameter)
    pub data1: u32,
    /// How long the command stays current, in microseconds
    pub duration_us: u32,
}

impl CommandData {
    /// The empty command, used when nothing is active
    pub const EMPTY: Self = Self {
        code: NO_CODE,
        target: NO_TARGET,
        data0: 0,
        data1: 0,
        duration_us: 0,
    };

    /// Create an instantaneous command with no payload
    pub const fn new(code: i8, target: i8) -> Self {
        Self {
            code,
            target,
            data0: 0,
            data1: 0,
            duration_us: 0,
        }
    }

    /// Set the payload words
    pub const fn with_data(mut self, data0: u32, data1: u32) -> Self {
        self.data0 = data0;
        self.data1 = data1;
        self
    }

    /// Set how long the command stays current
    pub const fn with_duration_us(mut self, duration_us: u32) -> Self {
        self.duration_us = duration_us;
        self
    }

    /// Check if this is the empty command
    pub fn is_empty(&self) -> bool {
        self.code == NO_CODE
    }
}

impl Default for CommandData {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl From<CommandPayload> for CommandData {
    fn from(p: CommandPayload) -> Self {
        Self {
            code: p.code,
            target: p.target,
            data0: p.data0,
            data1: p.data1,
            duration_us: p.duration_us,
        }
    }
}

impl From<CommandData> for CommandPayload {
    fn from(c: CommandData) -> Self {
        Self {
            code: c.code,
            target: c.target,
            data0: c.data0,
            data1: c.data1,
            duration_us: c.duration_us,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_empty() {
        let cmd = CommandData::default();
        assert_eq!(cmd, CommandData::EMPTY);
        assert!(cmd.is_empty());
        assert_eq!(cmd.code, -1);
        assert_eq!(cmd.target, -1);
        assert_eq!(cmd.duration_us, 0);
    }

    #[test]
    fn test_builder() {
        let cmd = CommandData::new(0x0C, 1)
            .with_data(128, 7)
            .with_duration_us(5_000_000);
        assert!(!cmd.is_empty());
        assert_eq!(cmd.data0, 128);
        assert_eq!(cmd.data1, 7);
        assert_eq!(cmd.duration_us, 5_000_000);
    }

    #[test]
    fn test_wire_conversion() {
        let cmd = CommandData::new(0x14, 0).with_data(60, 0).with_duration_us(250);
        let payload = CommandPayload::from(cmd);
        assert_eq!(payload.code, 0x14);
        assert_eq!(payload.duration_us, 250);
        assert_eq!(CommandData::from(payload), cmd);
    }
}
