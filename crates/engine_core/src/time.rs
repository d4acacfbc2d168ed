//! Frame clock for the render loop.

use std::time::{Duration, Instant};

/// Weight of the newest frame in the smoothed frame time.
const FRAME_TIME_SMOOTHING: f32 = 0.1;

/// Wall-clock time since startup plus per-frame statistics.
///
/// Animation reads [`Time::elapsed_seconds`] directly instead of summing
/// deltas, so a stalled frame never shifts the scene.
#[derive(Debug)]
pub struct Time {
    start_time: Instant,
    last_frame: Instant,
    delta: Duration,
    elapsed: Duration,
    frame_count: u64,
    /// Exponential moving average of frame time in seconds.
    smoothed_frame_time: f32,
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

impl Time {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Clock whose zero is `start`.
    pub fn starting_at(start: Instant) -> Self {
        Self {
            start_time: start,
            last_frame: start,
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame_count: 0,
            smoothed_frame_time: 0.0,
        }
    }

    /// Sample the clock at the start of a new frame.
    pub fn update(&mut self) {
        self.update_at(Instant::now());
    }

    /// Advance to `now`. Instants earlier than the last frame count as zero-length frames.
    pub fn update_at(&mut self, now: Instant) {
        self.delta = now.saturating_duration_since(self.last_frame);
        self.last_frame = self.last_frame.max(now);
        self.elapsed = self.last_frame - self.start_time;
        self.frame_count += 1;

        let dt = self.delta.as_secs_f32();
        self.smoothed_frame_time = if self.frame_count == 1 {
            dt
        } else {
            self.smoothed_frame_time + (dt - self.smoothed_frame_time) * FRAME_TIME_SMOOTHING
        };
    }

    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Frames per second from the smoothed frame time; 0 before the first timed frame.
    pub fn fps(&self) -> f32 {
        if self.smoothed_frame_time > 0.0 {
            1.0 / self.smoothed_frame_time
        } else {
            0.0
        }
    }

    /// True once every `interval` frames. Used to throttle periodic stat logging.
    pub fn every_n_frames(&self, interval: u64) -> bool {
        interval > 0 && self.frame_count > 0 && self.frame_count % interval == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_clock_starts_at_zero() {
        let time = Time::new();
        assert_eq!(time.frame_count(), 0);
        assert_eq!(time.elapsed, Duration::ZERO);
        assert_eq!(time.fps(), 0.0);
    }

    #[test]
    fn elapsed_is_measured_from_start() {
        let start = Instant::now();
        let mut time = Time::starting_at(start);
        time.update_at(start + Duration::from_millis(250));
        time.update_at(start + Duration::from_millis(1500));
        assert_eq!(time.frame_count(), 2);
        assert_eq!(time.elapsed, Duration::from_millis(1500));
        assert_eq!(time.delta, Duration::from_millis(1250));
        assert!((time.elapsed_seconds() - 1.5).abs() < 1e-6);
    }

    #[test]
    fn earlier_instant_does_not_rewind() {
        let start = Instant::now();
        let mut time = Time::starting_at(start);
        time.update_at(start + Duration::from_secs(2));
        time.update_at(start + Duration::from_secs(1));
        assert_eq!(time.delta, Duration::ZERO);
        assert_eq!(time.elapsed, Duration::from_secs(2));
    }

    #[test]
    fn fps_smooths_toward_steady_rate() {
        let start = Instant::now();
        let mut time = Time::starting_at(start);
        let frame = Duration::from_millis(20);
        for i in 1..=200 {
            time.update_at(start + frame * i);
        }
        assert!((time.fps() - 50.0).abs() < 0.5);
    }

    #[test]
    fn every_n_frames_fires_on_multiples() {
        let start = Instant::now();
        let mut time = Time::starting_at(start);
        assert!(!time.every_n_frames(3));
        let fired: Vec<bool> = (1..=7)
            .map(|i| {
                time.update_at(start + Duration::from_millis(16 * i));
                time.every_n_frames(3)
            })
            .collect();
        assert_eq!(fired, vec![false, false, true, false, false, true, false]);
        assert!(!time.every_n_frames(0));
    }
}
