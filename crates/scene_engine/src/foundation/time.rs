//! Frame timing utilities

use std::time::Instant;

/// How a [`FrameTimer`] produces frame deltas
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeSource {
    /// Wall clock time between calls to [`FrameTimer::tick`]
    RealTime,
    /// A constant delta per tick, for headless and reproducible runs
    Fixed(f32),
}

/// Frame timer feeding `dt` into the game loop
pub struct FrameTimer {
    source: TimeSource,
    last_frame: Instant,
    delta_time: f32,
    total_time: f32,
    frame_count: u64,
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new(TimeSource::RealTime)
    }
}

impl FrameTimer {
    /// Create a new timer
    pub fn new(source: TimeSource) -> Self {
        Self {
            source,
            last_frame: Instant::now(),
            delta_time: 0.0,
            total_time: 0.0,
            frame_count: 0,
        }
    }

    /// Advance one frame and return its delta in seconds
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        self.delta_time = match self.source {
            TimeSource::RealTime => now.duration_since(self.last_frame).as_secs_f32(),
            TimeSource::Fixed(step) => step,
        };
        self.last_frame = now;
        self.total_time += self.delta_time;
        self.frame_count += 1;
        self.delta_time
    }

    /// Get the time since the last frame in seconds
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Get the total simulated time
    pub fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Get the current frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the average FPS since timer creation
    #[allow(clippy::cast_precision_loss)]
    pub fn average_fps(&self) -> f32 {
        if self.total_time > 0.0 {
            self.frame_count as f32 / self.total_time
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fixed_timer_accumulates() {
        let mut timer = FrameTimer::new(TimeSource::Fixed(0.5));
        assert_relative_eq!(timer.tick(), 0.5);
        timer.tick();
        assert_eq!(timer.frame_count(), 2);
        assert_relative_eq!(timer.total_time(), 1.0);
        assert_relative_eq!(timer.average_fps(), 2.0);
    }
}
