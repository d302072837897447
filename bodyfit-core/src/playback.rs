/// Frame playback timing
use crate::sim::SimFrame;

/// Shortest time a frame can occupy, keeps the advance loop bounded
pub const MIN_FRAME_SEC: f64 = 0.001;

/// Playback speed limits shared by the hosts
pub const MIN_SPEED: f64 = 0.1;
pub const MAX_SPEED: f64 = 4.0;

/// Accumulates wall time and steps through a looping frame sequence
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaybackClock {
    index: usize,
    accumulator: f64,
}

impl PlaybackClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Time carried toward the next frame change
    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }

    /// Add `elapsed_sec * speed` and step past every frame whose duration
    /// has been used up, wrapping at the end. Returns the number of steps.
    pub fn advance(&mut self, frames: &[SimFrame], elapsed_sec: f64, speed: f64) -> usize {
        if frames.is_empty() {
            return 0;
        }
        self.index %= frames.len();

        let delta = elapsed_sec * speed;
        if delta.is_finite() && delta > 0.0 {
            self.accumulator += delta;
        }

        // Whole passes through the sequence land back on the same frame
        let mut steps = 0usize;
        let total: f64 = frames.iter().map(|f| f.duration().max(MIN_FRAME_SEC)).sum();
        if self.accumulator >= total {
            let laps = (self.accumulator / total).floor();
            self.accumulator %= total;
            steps = (laps as usize).saturating_mul(frames.len());
        }

        loop {
            let duration = frames[self.index].duration().max(MIN_FRAME_SEC);
            if self.accumulator < duration {
                break;
            }
            self.accumulator -= duration;
            self.index = (self.index + 1) % frames.len();
            steps = steps.saturating_add(1);
        }
        steps
    }

    /// Jump to `index`, clamped into the sequence
    pub fn seek(&mut self, index: usize, len: usize) {
        self.index = index.min(len.saturating_sub(1));
    }

    /// Move by `delta` frames without wrapping
    pub fn step(&mut self, delta: isize, len: usize) {
        let target = self.index.saturating_add_signed(delta);
        self.seek(target, len);
    }

    pub fn reset(&mut self) {
        self.index = 0;
        self.accumulator = 0.0;
    }
}
