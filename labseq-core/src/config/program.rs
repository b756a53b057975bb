//! Stored program definitions
//!
//! A program is the main command list plus the routines preloaded into
//! interrupt vectors. With the `serde` feature it round-trips through
//! postcard for storage in flash.

use heapless::{String, Vec};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::command::CommandData;

/// Maximum label length
pub const MAX_LABEL_LEN: usize = 16;

/// Maximum commands in the main list
pub const MAX_PROGRAM_COMMANDS: usize = 64;

/// Maximum interrupt vector definitions per program
pub const MAX_VECTORS: usize = 8;

/// Maximum commands per interrupt vector definition
pub const MAX_VECTOR_COMMANDS: usize = 16;

/// Current stored program format version
pub const PROGRAM_VERSION: u8 = 1;

/// Largest encoded program accepted by [`ProgramConfig::from_bytes`]
pub const MAX_PROGRAM_SIZE: usize = 4096;

/// Program storage errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Output buffer too small or value not encodable
    Serialize,
    /// Input is not a valid encoded program
    Deserialize,
    /// Encoded by an incompatible format version
    VersionMismatch,
}

/// Commands preloaded into one interrupt vector
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VectorConfig {
    /// Vector queue index (1-based)
    pub vector: u8,
    pub commands: Vec<CommandData, MAX_VECTOR_COMMANDS>,
}

impl VectorConfig {
    pub fn new(vector: u8) -> Self {
        Self {
            vector,
            commands: Vec::new(),
        }
    }
}

/// Program configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProgramConfig {
    /// Format version
    pub version: u8,
    /// Display label
    pub label: String<MAX_LABEL_LEN>,
    /// Main command list, in execution order
    pub main: Vec<CommandData, MAX_PROGRAM_COMMANDS>,
    /// Interrupt routines
    pub vectors: Vec<VectorConfig, MAX_VECTORS>,
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            version: PROGRAM_VERSION,
            label: String::new(),
            main: Vec::new(),
            vectors: Vec::new(),
        }
    }
}

impl ProgramConfig {
    /// Create an empty program, truncating the label to fit
    pub fn new(label: &str) -> Self {
        let mut program = Self::default();
        for c in label.chars() {
            if program.label.push(c).is_err() {
                break;
            }
        }
        program
    }

    /// Append a command to the main list
    ///
    /// Returns the command back if the list is full.
    pub fn push_command(&mut self, command: CommandData) -> Result<(), CommandData> {
        self.main.push(command)
    }

    /// Append a command to the routine for `vector`
    ///
    /// The vector definition is created on first use. Returns the command
    /// back if either the vector list or the routine is full.
    pub fn push_vector_command(
        &mut self,
        vector: u8,
        command: CommandData,
    ) -> Result<(), CommandData> {
        let pos = match self.vectors.iter().position(|v| v.vector == vector) {
            Some(pos) => pos,
            None => {
                self.vectors
                    .push(VectorConfig::new(vector))
                    .map_err(|_| command)?;
                self.vectors.len() - 1
            }
        };
        self.vectors[pos].commands.push(command)
    }

    /// Routine defined for `vector`, if any
    pub fn vector(&self, vector: u8) -> Option<&VectorConfig> {
        self.vectors.iter().find(|v| v.vector == vector)
    }

    /// Total number of commands across main list and routines
    pub fn command_count(&self) -> usize {
        self.main.len() + self.vectors.iter().map(|v| v.commands.len()).sum::<usize>()
    }

    /// Sum of main list durations in microseconds, saturating
    pub fn main_duration_us(&self) -> u32 {
        self.main
            .iter()
            .fold(0u32, |acc, c| acc.saturating_add(c.duration_us))
    }

    /// Decode a program stored with [`ProgramConfig::to_slice`]
    #[cfg(feature = "serde")]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        let program: Self = postcard::from_bytes(bytes).map_err(|_| ConfigError::Deserialize)?;
        if program.version != PROGRAM_VERSION {
            return Err(ConfigError::VersionMismatch);
        }
        Ok(program)
    }

    /// Encode into `buffer`, returning the used prefix
    #[cfg(feature = "serde")]
    pub fn to_slice<'a>(&self, buffer: &'a mut [u8]) -> Result<&'a mut [u8], ConfigError> {
        postcard::to_slice(self, buffer).map_err(|_| ConfigError::Serialize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd(code: i8, duration_us: u32) -> CommandData {
        CommandData::new(code, 0).with_duration_us(duration_us)
    }

    #[test]
    fn test_label_truncated() {
        let program = ProgramConfig::new("a label that is far too long");
        assert_eq!(program.label.as_str(), "a label that is ");
        assert_eq!(program.version, PROGRAM_VERSION);
    }

    #[test]
    fn test_push_vector_command_groups_by_vector() {
        let mut program = ProgramConfig::new("p");
        program.push_vector_command(2, cmd(1, 0)).unwrap();
        program.push_vector_command(1, cmd(2, 0)).unwrap();
        program.push_vector_command(2, cmd(3, 0)).unwrap();

        assert_eq!(program.vectors.len(), 2);
        assert_eq!(program.vector(2).map(|v| v.commands.len()), Some(2));
        assert_eq!(program.vector(1).map(|v| v.commands.len()), Some(1));
        assert!(program.vector(3).is_none());
        assert_eq!(program.command_count(), 3);
    }

    #[test]
    fn test_push_vector_command_full() {
        let mut program = ProgramConfig::new("p");
        for v in 1..=MAX_VECTORS as u8 {
            program.push_vector_command(v, cmd(1, 0)).unwrap();
        }
        assert_eq!(program.push_vector_command(99, cmd(7, 0)), Err(cmd(7, 0)));
    }

    #[test]
    fn test_main_duration_saturates() {
        let mut program = ProgramConfig::new("p");
        program.push_command(cmd(1, 100)).unwrap();
        program.push_command(cmd(2, 250)).unwrap();
        assert_eq!(program.main_duration_us(), 350);

        program.push_command(cmd(3, u32::MAX)).unwrap();
        assert_eq!(program.main_duration_us(), u32::MAX);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_postcard_storage() {
        let mut program = ProgramConfig::new("rinse");
        program
            .push_command(CommandData::new(4, 1).with_data(500, 2).with_duration_us(1_000))
            .unwrap();
        program.push_vector_command(1, cmd(9, 50)).unwrap();

        let mut buffer = [0u8; MAX_PROGRAM_SIZE];
        let len = program.to_slice(&mut buffer).unwrap().len();
        let decoded = ProgramConfig::from_bytes(&buffer[..len]).unwrap();
        assert_eq!(decoded, program);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_version_mismatch_rejected() {
        let mut program = ProgramConfig::new("old");
        program.version = PROGRAM_VERSION + 1;

        let mut buffer = [0u8; 64];
        let len = program.to_slice(&mut buffer).unwrap().len();
        assert_eq!(
            ProgramConfig::from_bytes(&buffer[..len]),
            Err(ConfigError::VersionMismatch)
        );
        assert_eq!(
            ProgramConfig::from_bytes(&[0xFF, 0xFF]),
            Err(ConfigError::Deserialize)
        );
    }
}
