/// Frame timing snapshot.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameTime {
    /// Seconds elapsed since the previous tick.
    pub dt: f64,

    /// Clock sample taken at the tick, in seconds.
    pub now: f64,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

/// Frame clock producing `FrameTime` snapshots from externally supplied samples.
///
/// Delta time is deliberately not clamped: after a stall the next `dt` reports
/// the full stall. With a monotonic source it is never negative.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: f64,
    frame_index: u64,
}

impl FrameClock {
    /// Creates a clock whose baseline is `start`.
    pub fn new(start: f64) -> Self {
        Self {
            last: start,
            frame_index: 0,
        }
    }

    /// Moves the baseline to `now` without producing a frame.
    pub fn reset(&mut self, now: f64) {
        self.last = now;
    }

    /// Number of ticks produced so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_index
    }

    /// Advances the clock to `now` and returns the elapsed frame time.
    pub fn tick(&mut self, now: f64) -> FrameTime {
        let dt = now - self.last;
        self.last = now;

        let ft = FrameTime {
            dt,
            now,
            frame_index: self.frame_index,
        };

        self.frame_index = self.frame_index.wrapping_add(1);

        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_reports_delta_since_previous_sample() {
        let mut clock = FrameClock::new(1.0);
        let ft = clock.tick(1.25);
        assert_eq!(ft.dt, 0.25);
        assert_eq!(ft.now, 1.25);
        assert_eq!(ft.frame_index, 0);

        let ft = clock.tick(2.0);
        assert_eq!(ft.dt, 0.75);
        assert_eq!(ft.frame_index, 1);
    }

    #[test]
    fn large_stall_is_not_clamped() {
        let mut clock = FrameClock::new(0.0);
        assert_eq!(clock.tick(30.0).dt, 30.0);
    }

    #[test]
    fn identical_samples_give_zero_delta() {
        let mut clock = FrameClock::new(5.0);
        assert_eq!(clock.tick(5.0).dt, 0.0);
    }

    #[test]
    fn reset_moves_baseline_without_counting_a_frame() {
        let mut clock = FrameClock::new(0.0);
        clock.tick(1.0);
        clock.reset(10.0);
        assert_eq!(clock.frame_count(), 1);
        assert_eq!(clock.tick(10.5).dt, 0.5);
    }

    #[test]
    fn frame_index_wraps() {
        let mut clock = FrameClock::new(0.0);
        clock.frame_index = u64::MAX;
        assert_eq!(clock.tick(0.1).frame_index, u64::MAX);
        assert_eq!(clock.frame_count(), 0);
    }
}
