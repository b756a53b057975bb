//! Labseq Host Link Protocol
//!
//! This crate defines the UART protocol between a host computer and a
//! Labseq controller. The host loads timed command sequences into the
//! controller's process queues, starts and stops them, and reads back
//! status; the controller acknowledges each request.
//!
//! # Protocol Overview
//!
//! All messages use a simple binary frame format:
//! ```text
//! ┌───────┬────────┬──────┬─────────────┬──────┐
//! │ START │ LENGTH │ CODE │ PAYLOAD     │ CRC8 │
//! │ 1B    │ 1B     │ 1B   │ 0–60B       │ 1B   │
//! └───────┴────────┴──────┴─────────────┴──────┘
//! ```
//!
//! The CODE byte is a [`FunctionCode`] for both directions.

#![no_std]
#![deny(unsafe_code)]

pub mod codes;
pub mod frame;
pub mod messages;

pub use codes::{is_user_code, FunctionCode, USER_FUNCTION_BASE};
pub use frame::{crc8, Frame, FrameError, FrameParser, FRAME_START, MAX_FRAME_SIZE, MAX_PAYLOAD_SIZE};
pub use messages::{
    CommandPayload, ErrorReason, MessageError, Request, Response, StatusReport,
    COMMAND_PAYLOAD_SIZE,
};
