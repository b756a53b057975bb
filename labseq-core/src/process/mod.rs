//! Command process execution
//!
//! [`ProcessManager`] sequences commands from the main program and the
//! interrupt vectors; [`ProcessListener`] receives what it starts and ends.

pub mod error;
pub mod events;
pub mod manager;

pub use error::ProcessError;
pub use events::{EventForwarder, ProcessEvent, ProcessListener};
pub use manager::{ProcessManager, ProcessState, MAIN_QUEUE};
