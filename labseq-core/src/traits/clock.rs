//! Microsecond time source

use core::cell::Cell;

/// Monotonic microsecond counter
///
/// The counter is 32 bits and wraps after ~71 minutes. Consumers must only
/// compare timestamps through `now.wrapping_sub(start)`, which stays correct
/// across a wrap as long as the measured interval itself is shorter than
/// the counter range.
pub trait Clock {
    /// Current time in microseconds
    fn now_us(&self) -> u32;

    /// Microseconds elapsed since `start`
    fn elapsed_since(&self, start: u32) -> u32 {
        self.now_us().wrapping_sub(start)
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_us(&self) -> u32 {
        (**self).now_us()
    }
}

/// Clock that only moves when told to
///
/// Used for simulation and tests. Share it by reference: `&ManualClock`
/// is itself a [`Clock`].
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<u32>,
}

impl ManualClock {
    pub const fn new(start_us: u32) -> Self {
        Self {
            now: Cell::new(start_us),
        }
    }

    /// Jump to an absolute time
    pub fn set(&self, now_us: u32) {
        self.now.set(now_us);
    }

    /// Move forward, wrapping at the counter range
    pub fn advance(&self, delta_us: u32) {
        self.now.set(self.now.get().wrapping_add(delta_us));
    }
}

impl Clock for ManualClock {
    fn now_us(&self) -> u32 {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(100);
        assert_eq!(clock.now_us(), 100);
        clock.advance(50);
        assert_eq!(clock.now_us(), 150);
        clock.set(10);
        assert_eq!(clock.now_us(), 10);
    }

    #[test]
    fn test_elapsed_across_wrap() {
        let clock = ManualClock::new(u32::MAX - 9);
        let start = clock.now_us();
        clock.advance(30);
        assert_eq!(clock.now_us(), 20);
        assert_eq!(clock.elapsed_since(start), 30);
    }

    #[test]
    fn test_shared_reference_is_a_clock() {
        fn read<C: Clock>(c: C) -> u32 {
            c.now_us()
        }
        let clock = ManualClock::new(42);
        assert_eq!(read(&clock), 42);
    }
}
