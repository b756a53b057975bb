//! Configuration types
//!
//! Board-agnostic program definitions, stored as postcard binary data.

pub mod program;

pub use program::*;
