//! Parameter automation with WebAudio semantics.
//!
//! A [`Ramp`] is the pair `setValueAtTime(from, start)` +
//! `exponentialRampToValueAtTime(to, end)`. It drives oscillator pitch
//! sweeps, filter cutoff sweeps and the amplitude envelope of every cue.

/// Gain every envelope decays toward. Exponential ramps cannot reach zero.
pub const ENVELOPE_FLOOR: f64 = 0.01;

/// An exponential ramp from `from` at `start` to `to` at `end` (seconds).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ramp {
    pub from: f64,
    pub to: f64,
    pub start: f64,
    pub end: f64,
}

impl Ramp {
    pub fn exponential(from: f64, to: f64, start: f64, end: f64) -> Self {
        Ramp { from, to, start, end }
    }

    /// Amplitude envelope: `start_gain` decaying to the floor by `end`.
    ///
    /// A start gain at or below the floor decays to a hundredth of itself
    /// instead, so quiet cues still fade rather than hold flat.
    pub fn decay(start_gain: f64, start: f64, end: f64) -> Self {
        let floor = if start_gain > 0.0 && start_gain <= ENVELOPE_FLOOR {
            start_gain * ENVELOPE_FLOOR
        } else {
            ENVELOPE_FLOOR
        };
        Ramp::exponential(start_gain, floor, start, end)
    }

    pub fn is_constant(&self) -> bool {
        self.from == self.to
    }

    /// Value at time `t`.
    ///
    /// Before `start` the ramp holds `from`, after `end` it holds `to`.
    /// A ramp from zero, or across a sign change, holds `from` until
    /// `end`, as WebAudio does.
    pub fn value_at(&self, t: f64) -> f64 {
        if t <= self.start {
            return self.from;
        }
        if t >= self.end {
            return self.to;
        }
        if self.from == 0.0 || self.from.signum() != self.to.signum() {
            return self.from;
        }
        let progress = (t - self.start) / (self.end - self.start);
        self.from * (self.to / self.from).powf(progress)
    }
}
