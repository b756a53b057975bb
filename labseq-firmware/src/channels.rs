//! Inter-task communication channels
//!
//! Defines the static channels used for communication between Embassy tasks.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use labseq_core::CommandData;
use labseq_protocol::{Request, Response};

/// Channel capacity for host requests
const REQUEST_CHANNEL_SIZE: usize = 4;

/// Channel capacity for host responses
const RESPONSE_CHANNEL_SIZE: usize = 8;

/// Channel capacity for device actions
const DEVICE_CHANNEL_SIZE: usize = 8;

/// Action for the output task
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum DeviceAction {
    /// Execute a started command
    Apply(CommandData),
    /// Drive every output to its inactive level
    AllOff,
}

/// Decoded requests from the host link
pub static REQUEST_CHANNEL: Channel<CriticalSectionRawMutex, Request, REQUEST_CHANNEL_SIZE> =
    Channel::new();

/// Replies waiting to be sent to the host
pub static RESPONSE_CHANNEL: Channel<CriticalSectionRawMutex, Response, RESPONSE_CHANNEL_SIZE> =
    Channel::new();

/// Commands to execute on the outputs
pub static DEVICE_CHANNEL: Channel<CriticalSectionRawMutex, DeviceAction, DEVICE_CHANNEL_SIZE> =
    Channel::new();

/// Set by the alarm button, polled by the process task
pub static ALARM_TRIGGERED: Signal<CriticalSectionRawMutex, ()> = Signal::new();
