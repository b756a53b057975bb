//! Platform abstraction traits
//!
//! These traits define the interface between the sequencing logic and
//! board-specific implementations.

pub mod clock;

pub use clock::{Clock, ManualClock};
