//! Built-in demonstration program
//!
//! Loaded at boot so the board does something useful before a host
//! connects. A host `Reset` discards it.

use defmt::*;
use labseq_core::config::ProgramConfig;
use labseq_core::CommandData;
use labseq_protocol::FunctionCode;

/// Interrupt vector bound to the alarm button
pub const ALARM_VECTOR: u8 = 1;

/// Output driven high while the alarm routine runs
const ALARM_LAMP: i8 = 3;

const MS: u32 = 1_000;

fn write_output(target: i8, on: bool, duration_us: u32) -> CommandData {
    CommandData::new(FunctionCode::WriteDigitalOutput.to_byte() as i8, target)
        .with_data(on as u32, 0)
        .with_duration_us(duration_us)
}

/// Build the boot program
///
/// Main list: pulse output 0, then output 1, then both together.
/// Alarm routine: all process outputs off, lamp on for three seconds.
pub fn default_program() -> ProgramConfig {
    let mut program = ProgramConfig::new("demo");

    let main = [
        write_output(0, true, 1_000 * MS),
        write_output(0, false, 500 * MS),
        write_output(1, true, 2_000 * MS),
        write_output(1, false, 500 * MS),
        write_output(0, true, 0),
        write_output(1, true, 1_000 * MS),
        write_output(0, false, 0),
        write_output(1, false, 0),
    ];
    for cmd in main {
        if program.push_command(cmd).is_err() {
            warn!("Default program truncated");
            break;
        }
    }

    let alarm = [
        write_output(0, false, 0),
        write_output(1, false, 0),
        write_output(ALARM_LAMP, true, 3_000 * MS),
        write_output(ALARM_LAMP, false, 0),
    ];
    for cmd in alarm {
        if program.push_vector_command(ALARM_VECTOR, cmd).is_err() {
            warn!("Alarm routine truncated");
            break;
        }
    }

    program
}
