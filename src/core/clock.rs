use std::time::{Duration, Instant};

/// Interval between FPS log lines and overlay refreshes
pub const FPS_UPDATE_INTERVAL: f32 = 1.0;

/// Minimal game clock - just tracks delta time
#[derive(Debug)]
pub struct Clock {
    last_tick: Instant,
}

impl Clock {
    /// Create new clock starting now
    pub fn new() -> Self {
        Self {
            last_tick: Instant::now(),
        }
    }

    /// Get delta time since last tick and advance clock
    /// Returns delta in seconds
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let delta = now.duration_since(self.last_tick).as_secs_f32();
        self.last_tick = now;
        delta
    }

    /// Reset clock to current time
    pub fn reset(&mut self) {
        self.last_tick = Instant::now();
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

/// Averages frame deltas over a fixed window
#[derive(Debug, Clone, Default)]
pub struct FpsCounter {
    frame_count: u32,
    elapsed: f32,
    fps: f32,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one frame; returns the new average when the window closes
    pub fn record(&mut self, delta: f32) -> Option<f32> {
        self.frame_count += 1;
        self.elapsed += delta;

        if self.elapsed >= FPS_UPDATE_INTERVAL {
            self.fps = self.frame_count as f32 / self.elapsed;
            self.frame_count = 0;
            self.elapsed = 0.0;
            Some(self.fps)
        } else {
            None
        }
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }
}

/// Schedules redraws at a target frame rate
#[derive(Debug, Clone, Copy)]
pub struct FramePacer {
    interval: Duration,
    next_frame: Instant,
}

impl FramePacer {
    /// A rate of 0 disables pacing
    pub fn new(target_fps: u32) -> Self {
        let interval = if target_fps == 0 {
            Duration::ZERO
        } else {
            Duration::from_nanos(1_000_000_000 / target_fps as u64)
        };
        Self {
            interval,
            next_frame: Instant::now(),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn next_frame(&self) -> Instant {
        self.next_frame
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.next_frame
    }

    /// Marks a frame as started at `now` and schedules the following one
    ///
    /// A late frame does not try to catch up: the next deadline is measured
    /// from `now` when the previous deadline has already passed by a whole
    /// interval.
    pub fn frame_started(&mut self, now: Instant) {
        let scheduled = self.next_frame + self.interval;
        self.next_frame = if scheduled < now { now + self.interval } else { scheduled };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn clock_measures_delta() {
        let mut clock = Clock::new();

        thread::sleep(Duration::from_millis(10));
        let delta = clock.tick();

        assert!(delta >= 0.009);
    }

    #[test]
    fn fps_counter_reports_after_interval() {
        let mut counter = FpsCounter::new();

        for _ in 0..3 {
            assert_eq!(counter.record(0.25), None);
        }
        let fps = counter.record(0.25).expect("window should close after 1s");
        assert_eq!(fps, 4.0);
        assert_eq!(counter.fps(), 4.0);
    }

    #[test]
    fn pacer_interval_from_rate() {
        let pacer = FramePacer::new(80);
        assert_eq!(pacer.interval(), Duration::from_micros(12_500));
    }

    #[test]
    fn pacer_zero_rate_is_unpaced() {
        let mut pacer = FramePacer::new(0);
        let now = Instant::now();
        pacer.frame_started(now);
        assert!(pacer.is_due(now));
    }

    #[test]
    fn pacer_schedules_next_deadline() {
        let mut pacer = FramePacer::new(50);
        let start = pacer.next_frame();
        pacer.frame_started(start);
        assert_eq!(pacer.next_frame(), start + Duration::from_millis(20));
        assert!(!pacer.is_due(start));
    }

    #[test]
    fn pacer_does_not_catch_up_after_stall() {
        let mut pacer = FramePacer::new(50);
        let late = pacer.next_frame() + Duration::from_secs(1);
        pacer.frame_started(late);
        assert_eq!(pacer.next_frame(), late + Duration::from_millis(20));
    }
}
