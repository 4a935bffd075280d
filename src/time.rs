//! Frame clock for the render loop.
//!
//! [`Time::tick`] is called once per rendered frame and returns a
//! [`FrameTime`] snapshot that the scene consumes. The snapshot is immutable
//! for the rest of the frame, so every group sees the same time.
//!
//! ```ignore
//! let mut time = Time::new();
//!
//! // In the redraw handler:
//! let frame = time.tick();
//! scene.render_frame(state, frame, &mut sink);
//! ```

use std::time::{Duration, Instant};

/// Default upper bound on a single frame's delta, in seconds.
///
/// A window that was hidden or dragged can report a delta of several
/// seconds; the morph would then jump. Clamping keeps it visibly easing.
pub const DEFAULT_MAX_DELTA: f32 = 0.1;

/// Time values for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameTime {
    /// Seconds since the clock started, excluding paused time.
    pub elapsed: f32,
    /// Seconds since the previous frame, clamped to [`DEFAULT_MAX_DELTA`].
    pub delta: f32,
    /// Frames since start.
    pub frame: u64,
}

impl FrameTime {
    pub fn new(elapsed: f32, delta: f32) -> Self {
        Self {
            elapsed,
            delta,
            frame: 0,
        }
    }
}

/// Wall-clock frame timer.
#[derive(Debug)]
pub struct Time {
    start: Instant,
    last_frame: Instant,
    elapsed_secs: f32,
    delta_secs: f32,
    frame_count: u64,
    fps: f32,
    fps_frame_count: u64,
    fps_update_time: Instant,
    fps_update_interval: Duration,
    paused: bool,
    pause_elapsed: Duration,
}

impl Time {
    /// Create a new clock starting from now.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_frame: now,
            elapsed_secs: 0.0,
            delta_secs: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: Duration::from_millis(500),
            paused: false,
            pause_elapsed: Duration::ZERO,
        }
    }

    /// Advance the clock. Call once per frame.
    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();

        if self.paused {
            self.delta_secs = 0.0;
            return self.snapshot();
        }

        let raw_delta = now.duration_since(self.last_frame).as_secs_f32();
        self.delta_secs = raw_delta.min(DEFAULT_MAX_DELTA);
        self.last_frame = now;

        let raw_elapsed = now.duration_since(self.start).saturating_sub(self.pause_elapsed);
        self.elapsed_secs = raw_elapsed.as_secs_f32();

        self.frame_count += 1;

        let fps_elapsed = now.duration_since(self.fps_update_time);
        if fps_elapsed >= self.fps_update_interval {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }

        self.snapshot()
    }

    /// The values produced by the last [`tick`](Self::tick).
    pub fn snapshot(&self) -> FrameTime {
        FrameTime {
            elapsed: self.elapsed_secs,
            delta: self.delta_secs,
            frame: self.frame_count,
        }
    }

    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed_secs
    }

    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Frames per second, refreshed twice a second.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Stop time. While paused, deltas are zero and elapsed time freezes.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        if self.paused {
            let now = Instant::now();
            self.pause_elapsed += now.duration_since(self.last_frame);
            self.last_frame = now;
            self.paused = false;
        }
    }

    pub fn toggle_pause(&mut self) {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_time_new() {
        let time = Time::new();
        assert_eq!(time.frame(), 0);
        assert!(!time.is_paused());
    }

    #[test]
    fn test_tick_advances() {
        let mut time = Time::new();
        thread::sleep(Duration::from_millis(10));
        let frame = time.tick();

        assert!(frame.elapsed > 0.0);
        assert!(frame.delta > 0.0);
        assert_eq!(frame.frame, 1);
    }

    #[test]
    fn test_pause_freezes_time() {
        let mut time = Time::new();
        time.tick();
        time.pause();

        let before = time.elapsed();
        thread::sleep(Duration::from_millis(10));
        let frame = time.tick();

        assert_eq!(frame.elapsed, before);
        assert_eq!(frame.delta, 0.0);
    }

    #[test]
    fn test_resume_excludes_paused_time() {
        let mut time = Time::new();
        time.toggle_pause();
        assert!(time.is_paused());
        thread::sleep(Duration::from_millis(200));
        time.toggle_pause();
        assert!(!time.is_paused());

        let frame = time.tick();
        assert!(frame.elapsed < 0.15, "elapsed {}", frame.elapsed);
        assert!(frame.delta < 0.05, "delta {}", frame.delta);
    }

    #[test]
    fn test_delta_is_clamped() {
        let mut time = Time::new();
        thread::sleep(Duration::from_millis(150));
        let frame = time.tick();
        assert!(frame.delta <= DEFAULT_MAX_DELTA + 1e-6);
        assert!(frame.elapsed >= 0.15);
    }
}
