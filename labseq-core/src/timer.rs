//! Polled software timer
//!
//! Fires at most once per [`SoftTimer::poll`] call. A periodic timer keeps
//! its phase: after a late poll it skips the missed periods rather than
//! firing for each of them or drifting by the lateness.

/// Periodic or single-shot timer over a wrapping microsecond clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SoftTimer {
    last_time: u32,
    timeout_us: u32,
    single_shot: bool,
    active: bool,
}

impl SoftTimer {
    /// Create a stopped periodic timer
    pub const fn new(timeout_us: u32) -> Self {
        Self {
            last_time: 0,
            timeout_us,
            single_shot: false,
            active: false,
        }
    }

    /// Create a stopped timer that deactivates after firing once
    pub const fn single_shot(timeout_us: u32) -> Self {
        Self {
            last_time: 0,
            timeout_us,
            single_shot: true,
            active: false,
        }
    }

    /// Arm the timer, counting from `now`
    pub fn start(&mut self, now: u32) {
        self.last_time = now;
        self.active = true;
    }

    pub fn stop(&mut self) {
        self.active = false;
    }

    /// Change the period; takes effect from the last expiry
    pub fn set_timeout(&mut self, timeout_us: u32) {
        self.timeout_us = timeout_us;
    }

    pub fn timeout_us(&self) -> u32 {
        self.timeout_us
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Check for expiry at `now`
    ///
    /// Returns true when the timer fired.
    pub fn poll(&mut self, now: u32) -> bool {
        if !self.active {
            return false;
        }

        let elapsed = now.wrapping_sub(self.last_time);
        if elapsed < self.timeout_us {
            return false;
        }

        if self.single_shot {
            self.active = false;
        } else if self.timeout_us == 0 {
            self.last_time = now;
        } else {
            let periods = elapsed / self.timeout_us;
            self.last_time = self
                .last_time
                .wrapping_add(periods.wrapping_mul(self.timeout_us));
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stopped_timer_never_fires() {
        let mut t = SoftTimer::new(10);
        assert!(!t.poll(100));
        assert!(!t.is_active());
    }

    #[test]
    fn test_periodic_fires_each_period() {
        let mut t = SoftTimer::new(100);
        t.start(0);
        assert!(!t.poll(99));
        assert!(t.poll(100));
        assert!(!t.poll(150));
        assert!(t.poll(200));
        assert!(t.is_active());
    }

    #[test]
    fn test_late_poll_keeps_phase() {
        let mut t = SoftTimer::new(100);
        t.start(0);

        // Three periods missed, fires once
        assert!(t.poll(350));
        assert!(!t.poll(399));
        assert!(t.poll(400));
    }

    #[test]
    fn test_single_shot_deactivates() {
        let mut t = SoftTimer::single_shot(50);
        t.start(1000);
        assert!(t.poll(1050));
        assert!(!t.is_active());
        assert!(!t.poll(1100));

        t.start(1100);
        assert!(t.poll(1150));
    }

    #[test]
    fn test_fires_across_clock_wrap() {
        let mut t = SoftTimer::new(100);
        t.start(u32::MAX - 40);
        assert!(!t.poll(50));
        assert!(t.poll(59));
    }

    #[test]
    fn test_zero_timeout_fires_every_poll() {
        let mut t = SoftTimer::new(0);
        t.start(5);
        assert!(t.poll(5));
        assert!(t.poll(5));
        assert!(t.poll(6));
    }

    #[test]
    fn test_stop_and_set_timeout() {
        let mut t = SoftTimer::new(100);
        t.start(0);
        t.set_timeout(20);
        assert_eq!(t.timeout_us(), 20);
        assert!(t.poll(20));
        t.stop();
        assert!(!t.poll(1000));
    }
}
