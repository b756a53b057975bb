//! Process clock backed by the embassy time driver

use embassy_time::Instant;
use labseq_core::Clock;

/// Microseconds since boot, truncated to 32 bits
///
/// The truncation is the wrap the process manager expects.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    fn now_us(&self) -> u32 {
        Instant::now().as_micros() as u32
    }
}
