use std::time::{Duration, Instant};

/// Frame-rate counter over a rolling time window.
///
/// Derived display data only; it has no effect on pipeline behavior.
pub struct FpsCounter {
    window: Duration,
    window_start: Instant,
    frames: u32,
    fps: f32,
}

impl FpsCounter {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            window_start: Instant::now(),
            frames: 0,
            fps: 0.0,
        }
    }

    /// Record one rendered frame and recompute the rate once the current
    /// window has elapsed.
    pub fn tick(&mut self) {
        self.frames += 1;
        let elapsed = self.window_start.elapsed();
        if elapsed >= self.window {
            self.fps = self.frames as f32 / elapsed.as_secs_f32().max(f32::EPSILON);
            self.frames = 0;
            self.window_start = Instant::now();
        }
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_is_zero_before_the_first_window_completes() {
        let mut counter = FpsCounter::new(Duration::from_secs(3600));
        counter.tick();
        counter.tick();
        assert_eq!(counter.fps(), 0.0);
    }

    #[test]
    fn rate_updates_once_the_window_elapses() {
        let mut counter = FpsCounter::new(Duration::ZERO);
        counter.tick();
        assert!(counter.fps() > 0.0);
    }
}
