//! Function codes
//!
//! Every host message carries a one-byte function code. The numbering is
//! shared with the host-side tooling, so existing values must never move.
//! Codes at or above [`USER_FUNCTION_BASE`] belong to the application.

/// First function code available for application-specific use
pub const USER_FUNCTION_BASE: u8 = 0x2A;

/// Function codes understood by the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum FunctionCode {
    // System
    /// Read a unique identifier from the controller
    ReadId = 0x00,
    /// Store a name on the controller
    WriteName = 0x01,
    /// Read the controller name
    ReadName = 0x02,
    /// Read the firmware version
    ReadVersion = 0x03,
    /// Read the number of attached devices
    ReadDeviceCount = 0x04,
    /// Read the type of an attached device
    ReadDeviceType = 0x05,
    /// Read the process status
    ReadStatus = 0x06,
    /// Acknowledge receipt and execution of a command
    Acknowledge = 0x07,
    /// Report an error
    Error = 0x08,

    // Digital and analog I/O
    WriteDigitalOutput = 0x09,
    ReadDigitalOutput = 0x0A,
    ReadDigitalInput = 0x0B,
    WritePwm = 0x0C,
    ReadPwm = 0x0D,
    ReadAdc = 0x0E,
    WriteSensorSetting = 0x0F,
    ReadSensorSetting = 0x10,
    ReadSensorValue = 0x11,

    // Motors
    WriteSpeed = 0x14,
    ReadSpeed = 0x15,
    WritePosition = 0x16,
    ReadPosition = 0x17,
    WriteSetting = 0x18,
    ReadSetting = 0x19,

    // Process queue
    /// Add a command to a queue
    Enqueue = 0x1C,
    /// Read a queued command without removing it
    ReadFromQueue = 0x1D,
    /// Remove a command from a queue
    Dequeue = 0x1E,
    /// Read the number of free slots in a queue
    QueueAvailable = 0x1F,
    /// Read the capacity of a queue
    QueueCapacity = 0x20,
    /// Start or resume the protocol
    StartProtocol = 0x21,
    /// Pause the protocol
    StopProtocol = 0x22,
    /// Discard all queued commands
    ResetProtocol = 0x23,
    /// Preempt the running protocol with an interrupt vector
    TriggerInterrupt = 0x24,
    /// Read the number of commands held in a queue
    ReadQueueCount = 0x25,

    // Clock synchronisation
    TimeSync = 0x26,
    TimeFollowup = 0x27,
    DelayRequest = 0x28,
    DelayResponse = 0x29,
}

impl FunctionCode {
    /// Decode a function code byte
    ///
    /// Returns `None` for reserved slots and application-specific codes.
    pub fn from_byte(byte: u8) -> Option<Self> {
        use FunctionCode::*;

        let code = match byte {
            0x00 => ReadId,
            0x01 => WriteName,
            0x02 => ReadName,
            0x03 => ReadVersion,
            0x04 => ReadDeviceCount,
            0x05 => ReadDeviceType,
            0x06 => ReadStatus,
            0x07 => Acknowledge,
            0x08 => Error,
            0x09 => WriteDigitalOutput,
            0x0A => ReadDigitalOutput,
            0x0B => ReadDigitalInput,
            0x0C => WritePwm,
            0x0D => ReadPwm,
            0x0E => ReadAdc,
            0x0F => WriteSensorSetting,
            0x10 => ReadSensorSetting,
            0x11 => ReadSensorValue,
            0x14 => WriteSpeed,
            0x15 => ReadSpeed,
            0x16 => WritePosition,
            0x17 => ReadPosition,
            0x18 => WriteSetting,
            0x19 => ReadSetting,
            0x1C => Enqueue,
            0x1D => ReadFromQueue,
            0x1E => Dequeue,
            0x1F => QueueAvailable,
            0x20 => QueueCapacity,
            0x21 => StartProtocol,
            0x22 => StopProtocol,
            0x23 => ResetProtocol,
            0x24 => TriggerInterrupt,
            0x25 => ReadQueueCount,
            0x26 => TimeSync,
            0x27 => TimeFollowup,
            0x28 => DelayRequest,
            0x29 => DelayResponse,
            _ => return None,
        };
        Some(code)
    }

    /// Encode to a byte
    pub fn to_byte(self) -> u8 {
        self as u8
    }
}

/// Check if a raw code byte is reserved for the application
pub fn is_user_code(byte: u8) -> bool {
    byte >= USER_FUNCTION_BASE
}
