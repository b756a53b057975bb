//! Board-agnostic core logic for Labseq lab controllers
//!
//! This crate contains the sequencing engine and everything around it that
//! does not depend on specific hardware:
//!
//! - Fixed-capacity command containers (ring buffer, process vectors)
//! - The time-driven process manager and its listener interface
//! - Clock abstraction and a polled software timer
//! - Program configuration types
//! - Host request dispatch

#![no_std]
#![deny(unsafe_code)]

pub mod buffer;
pub mod command;
pub mod config;
pub mod dispatch;
pub mod process;
pub mod timer;
pub mod traits;

pub use command::CommandData;
pub use process::{ProcessError, ProcessEvent, ProcessListener, ProcessManager, ProcessState};
pub use traits::Clock;
