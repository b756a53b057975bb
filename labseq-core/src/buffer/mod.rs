//! Fixed-capacity command containers
//!
//! Neither container allocates; capacities are const generics.

pub mod ring;
pub mod vector;

pub use ring::{Pushed, RingBuffer};
pub use vector::ProcessVector;
