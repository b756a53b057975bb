//! Process manager errors

use labseq_protocol::ErrorReason;

/// Reasons a process manager call was refused
///
/// Every error leaves the manager exactly as it was before the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProcessError {
    /// Target buffer or vector is full
    CapacityExceeded,
    /// Queue index out of range, or no command at that position
    InvalidIndex,
    /// Triggered vector has nothing queued
    EmptyTrigger,
    /// Triggered vector is running or suspended under another interrupt
    VectorActive,
    /// Command carries the code reserved for the empty command
    ReservedCode,
}

impl From<ProcessError> for ErrorReason {
    fn from(e: ProcessError) -> Self {
        match e {
            ProcessError::CapacityExceeded => ErrorReason::CapacityExceeded,
            ProcessError::InvalidIndex => ErrorReason::InvalidIndex,
            ProcessError::EmptyTrigger => ErrorReason::EmptyTrigger,
            ProcessError::VectorActive => ErrorReason::VectorActive,
            ProcessError::ReservedCode => ErrorReason::ReservedCode,
        }
    }
}
