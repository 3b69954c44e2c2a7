use std::time::{Duration, Instant};

/// Monotonic millisecond clock, started when the context is created.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Clock {
    start: Instant,
}

impl Clock {
    pub(crate) fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Milliseconds since start, wrapping after ~49 days like a 32-bit tick counter.
    pub(crate) fn ticks(&self) -> u32 {
        self.start.elapsed().as_millis() as u32
    }

    pub(crate) fn restart(&mut self) {
        self.start = Instant::now();
    }
}

/// Timing of a single frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameTime {
    /// Clock value sampled at the start of the frame, in milliseconds.
    pub ticks: u32,
    /// Milliseconds elapsed since the previous frame.
    pub delta: u32,
}

impl FrameTime {
    pub fn delta_duration(&self) -> Duration {
        Duration::from_millis(self.delta as u64)
    }
}

/// Turns successive clock samples into per-frame deltas.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FrameTimer {
    prev_ticks: u32,
}

impl FrameTimer {
    pub(crate) fn new(start_ticks: u32) -> Self {
        Self {
            prev_ticks: start_ticks,
        }
    }

    pub(crate) fn tick(&mut self, now: u32) -> FrameTime {
        let delta = now.wrapping_sub(self.prev_ticks);
        self.prev_ticks = now;
        FrameTime { ticks: now, delta }
    }
}

/// Fires once a fixed number of milliseconds has passed since the first
/// frame it was checked on.
///
/// Starting at the first check rather than at construction keeps window and
/// asset setup time out of the count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeout {
    duration_ms: u32,
    started_at: Option<u32>,
}

impl Timeout {
    pub fn new(duration_ms: u32) -> Self {
        Self {
            duration_ms,
            started_at: None,
        }
    }

    /// True once `duration_ms` has elapsed since the first call.
    pub fn expired(&mut self, frame: FrameTime) -> bool {
        let start = *self.started_at.get_or_insert(frame.ticks);
        frame.ticks.wrapping_sub(start) >= self.duration_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_between_samples() {
        let mut timer = FrameTimer::new(1000);
        assert_eq!(timer.tick(1016), FrameTime { ticks: 1016, delta: 16 });
        assert_eq!(timer.tick(1016), FrameTime { ticks: 1016, delta: 0 });
        assert_eq!(timer.tick(1500), FrameTime { ticks: 1500, delta: 484 });
    }

    #[test]
    fn delta_survives_counter_wrap() {
        let mut timer = FrameTimer::new(u32::MAX - 4);
        let frame = timer.tick(5);
        assert_eq!(frame.delta, 10);
    }

    #[test]
    fn clock_is_monotonic() {
        let clock = Clock::new();
        let a = clock.ticks();
        let b = clock.ticks();
        assert!(b >= a);
    }

    #[test]
    fn delta_as_duration() {
        let frame = FrameTime { ticks: 0, delta: 250 };
        assert_eq!(frame.delta_duration(), Duration::from_millis(250));
    }

    #[test]
    fn timeout_counts_from_first_frame_not_from_startup() {
        let mut timeout = Timeout::new(5000);
        // setup took 1.5 s before the first frame
        assert!(!timeout.expired(FrameTime { ticks: 1500, delta: 1500 }));
        assert!(!timeout.expired(FrameTime { ticks: 6499, delta: 4999 }));
        assert!(timeout.expired(FrameTime { ticks: 6500, delta: 1 }));
    }

    #[test]
    fn timeout_survives_counter_wrap() {
        let mut timeout = Timeout::new(100);
        assert!(!timeout.expired(FrameTime { ticks: u32::MAX - 10, delta: 0 }));
        assert!(!timeout.expired(FrameTime { ticks: 50, delta: 61 }));
        assert!(timeout.expired(FrameTime { ticks: 89, delta: 39 }));
    }

    #[test]
    fn restart_resets_ticks() {
        let mut clock = Clock::new();
        std::thread::sleep(Duration::from_millis(50));
        let before = clock.ticks();
        assert!(before >= 50);
        clock.restart();
        assert!(clock.ticks() < before);
    }
}
