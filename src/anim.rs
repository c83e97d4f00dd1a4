//! Frame-driven animation timelines.
//!
//! Nothing here runs on its own: the host feeds elapsed frame time into
//! `Timeline::advance` and samples the interpolated progress back out. The
//! size morph and every progress indicator share this machinery.

use std::f32::consts::PI;
use std::time::Duration;

/// What a timeline does when one cycle of its duration elapses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatMode {
    /// Jump back to the start value.
    Restart,
    /// Play the next cycle backwards.
    Reverse,
}

/// How many extra cycles play after the first one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatCount {
    /// `Fixed(0)` plays exactly once.
    Fixed(u32),
    Infinite,
}

/// Monotonic time-to-progress mapping applied to each cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolator {
    #[default]
    Linear,
    /// Slow start, fast middle, slow end.
    AccelerateDecelerate,
}

impl Interpolator {
    pub fn apply(self, t: f32) -> f32 {
        match self {
            Interpolator::Linear => t,
            Interpolator::AccelerateDecelerate => (((t + 1.0) * PI).cos() / 2.0) + 0.5,
        }
    }
}

/// A sampled animation timeline.
///
/// `advance` accumulates elapsed time and reports completion exactly once;
/// `cancel` stops the timeline without reporting completion. Play time can
/// be read and written for suspend/resume.
#[derive(Debug, Clone)]
pub struct Timeline {
    duration: Duration,
    repeat_count: RepeatCount,
    repeat_mode: RepeatMode,
    interpolator: Interpolator,
    elapsed: Duration,
    running: bool,
}

impl Timeline {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            repeat_count: RepeatCount::Fixed(0),
            repeat_mode: RepeatMode::Restart,
            interpolator: Interpolator::Linear,
            elapsed: Duration::ZERO,
            running: false,
        }
    }

    pub fn with_repeat(mut self, count: RepeatCount, mode: RepeatMode) -> Self {
        self.repeat_count = count;
        self.repeat_mode = mode;
        self
    }

    pub fn with_interpolator(mut self, interpolator: Interpolator) -> Self {
        self.interpolator = interpolator;
        self
    }

    /// Total run time, or `None` for infinitely repeating timelines.
    fn total(&self) -> Option<Duration> {
        match self.repeat_count {
            RepeatCount::Fixed(n) => Some(self.duration * (n + 1)),
            RepeatCount::Infinite => None,
        }
    }

    /// Restart from the beginning.
    pub fn start(&mut self) {
        self.elapsed = Duration::ZERO;
        self.running = true;
    }

    /// Stop without completing. Progress stays readable but frozen.
    pub fn cancel(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Elapsed time within the whole timeline, repeats included.
    pub fn play_time(&self) -> Duration {
        self.elapsed
    }

    /// Jump to an absolute play time, clamped to the total run time for
    /// finite timelines. Completion still fires on the next `advance`.
    pub fn set_play_time(&mut self, play_time: Duration) {
        self.elapsed = match self.total() {
            Some(total) => play_time.min(total),
            None => play_time,
        };
    }

    /// Advance by one frame's worth of time. Returns `true` on the tick
    /// that completes a finite timeline.
    pub fn advance(&mut self, dt: Duration) -> bool {
        if !self.running {
            return false;
        }
        self.elapsed += dt;
        if let Some(total) = self.total() {
            if self.elapsed >= total {
                self.elapsed = total;
                self.running = false;
                return true;
            }
        }
        false
    }

    /// Interpolated progress of the current cycle in `[0, 1]`.
    pub fn fraction(&self) -> f32 {
        let cycle = self.duration.as_secs_f64();
        if cycle <= 0.0 {
            return 1.0;
        }
        let cycles = self.elapsed.as_secs_f64() / cycle;
        let (iteration, raw) = match self.repeat_count {
            RepeatCount::Fixed(n) if cycles >= f64::from(n) + 1.0 => (n as usize, 1.0),
            _ => (cycles.floor() as usize, cycles.fract()),
        };
        let t = if self.repeat_mode == RepeatMode::Reverse && iteration % 2 == 1 {
            1.0 - raw
        } else {
            raw
        };
        self.interpolator.apply(t as f32)
    }

    /// Current animated value over the given range.
    pub fn value(&self, from: f32, to: f32) -> f32 {
        from + (to - from) * self.fraction()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_linear_fraction() {
        let mut tl = Timeline::new(ms(500));
        tl.start();
        tl.advance(ms(125));
        assert!((tl.fraction() - 0.25).abs() < 1e-6);
        assert!((tl.value(200.0, 40.0) - 160.0).abs() < 1e-3);
    }

    #[test]
    fn test_completion_fires_once_and_clamps() {
        let mut tl = Timeline::new(ms(500));
        tl.start();
        assert!(!tl.advance(ms(499)));
        assert!(tl.advance(ms(100)));
        assert_eq!(tl.play_time(), ms(500));
        assert_eq!(tl.fraction(), 1.0);
        // Already finished: no second completion event.
        assert!(!tl.advance(ms(16)));
    }

    #[test]
    fn test_cancel_does_not_complete() {
        let mut tl = Timeline::new(ms(500));
        tl.start();
        tl.advance(ms(200));
        tl.cancel();
        assert!(!tl.is_running());
        assert!(!tl.advance(ms(1000)));
        assert_eq!(tl.play_time(), ms(200));
    }

    #[test]
    fn test_infinite_restart_wraps() {
        let mut tl = Timeline::new(ms(8000)).with_repeat(RepeatCount::Infinite, RepeatMode::Restart);
        tl.start();
        assert!(!tl.advance(ms(12_000)));
        assert!((tl.fraction() - 0.5).abs() < 1e-6);
        assert!((tl.value(0.0, 8.0) - 4.0).abs() < 1e-4);
    }

    #[test]
    fn test_reverse_cycles_mirror() {
        let mut tl = Timeline::new(ms(1000)).with_repeat(RepeatCount::Infinite, RepeatMode::Reverse);
        tl.start();
        tl.advance(ms(1250));
        // Second cycle plays backwards: 25% in means 75% progress.
        assert!((tl.fraction() - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_set_play_time_resumes_mid_cycle() {
        let mut tl = Timeline::new(ms(500));
        tl.start();
        tl.set_play_time(ms(250));
        assert!((tl.fraction() - 0.5).abs() < 1e-6);
        // Clamped to the total for finite timelines.
        tl.set_play_time(ms(900));
        assert_eq!(tl.play_time(), ms(500));
    }

    #[test]
    fn test_accelerate_decelerate_endpoints() {
        let interp = Interpolator::AccelerateDecelerate;
        assert!(interp.apply(0.0).abs() < 1e-6);
        assert!((interp.apply(0.5) - 0.5).abs() < 1e-6);
        assert!((interp.apply(1.0) - 1.0).abs() < 1e-6);
    }
}
