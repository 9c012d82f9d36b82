use std::time::{Duration, Instant};

/// Timing for one frame.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Seconds since the previous tick, clamped.
    pub dt: f32,
    pub now: Instant,
    /// Counts ticks from zero.
    pub frame_index: u64,
}

/// Produces [`FrameTime`]s for the update step.
///
/// Delta time is clamped to `[dt_min, dt_max]`, so a stall (debugger, minimized
/// window) advances the simulation by at most `dt_max`.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    pub const DEFAULT_DT_MIN: Duration = Duration::from_micros(100);
    pub const DEFAULT_DT_MAX: Duration = Duration::from_millis(250);

    pub fn new() -> Self {
        Self::with_clamps(Self::DEFAULT_DT_MIN, Self::DEFAULT_DT_MAX)
    }

    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            last: Instant::now(),
            frame_index: 0,
            dt_min,
            dt_max,
        }
    }

    /// Restarts delta measurement from now. The frame counter keeps going.
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }

    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> FrameTime {
        let dt = now
            .saturating_duration_since(self.last)
            .clamp(self.dt_min, self.dt_max);
        self.last = now;

        let time = FrameTime {
            dt: dt.as_secs_f32(),
            now,
            frame_index: self.frame_index,
        };
        self.frame_index = self.frame_index.wrapping_add(1);
        time
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dt_is_clamped_both_ways() {
        let mut clock = FrameClock::new();
        let start = clock.last;

        let stalled = clock.tick_at(start + Duration::from_secs(5));
        assert_eq!(stalled.dt, 0.25);

        let instant = clock.tick_at(stalled.now);
        assert!((instant.dt - 0.0001).abs() < 1e-7);
    }

    #[test]
    fn frame_index_counts_ticks() {
        let mut clock = FrameClock::new();
        let start = clock.last;
        let times: Vec<_> = (1..=3)
            .map(|i| clock.tick_at(start + Duration::from_millis(16 * i)))
            .collect();

        assert_eq!(times.iter().map(|t| t.frame_index).collect::<Vec<_>>(), [0, 1, 2]);
        assert!((times[1].dt - 0.016).abs() < 1e-6);
    }

    #[test]
    fn clock_going_backwards_uses_minimum() {
        let mut clock = FrameClock::with_clamps(Duration::from_millis(1), Duration::from_millis(50));
        let earlier = clock.last;
        clock.last += Duration::from_secs(1);
        assert_eq!(clock.tick_at(earlier).dt, 0.001);
    }
}
