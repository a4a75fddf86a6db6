//! Anti-aliased oscillators using PolyBLEP.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

/// Periodic waveform shapes, matching WebAudio `OscillatorType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

/// A band-limited oscillator whose frequency may change every sample.
#[derive(Debug, Clone)]
pub struct Oscillator {
    pub waveform: Waveform,
    frequency: f64,
    phase: f64,
    sample_rate: f64,
}

impl Oscillator {
    pub fn new(waveform: Waveform, frequency: f64, sample_rate: f64) -> Self {
        Oscillator {
            waveform,
            frequency,
            phase: 0.0,
            sample_rate,
        }
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Retune without resetting phase, so sweeps stay click-free.
    pub fn set_frequency(&mut self, frequency: f64) {
        self.frequency = frequency;
    }

    fn phase_inc(&self) -> f64 {
        self.frequency / self.sample_rate
    }

    /// Generate the next sample.
    pub fn next_sample(&mut self) -> f64 {
        let inc = self.phase_inc();
        let sample = match self.waveform {
            Waveform::Sine => (2.0 * PI * self.phase).sin(),
            Waveform::Sawtooth => 2.0 * self.phase - 1.0 - poly_blep(self.phase, inc),
            Waveform::Square => self.square(inc),
            Waveform::Triangle => {
                if self.phase < 0.5 {
                    4.0 * self.phase - 1.0
                } else {
                    3.0 - 4.0 * self.phase
                }
            }
        };

        self.phase += inc;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }

        sample
    }

    fn square(&self, inc: f64) -> f64 {
        let mut value = if self.phase < 0.5 { 1.0 } else { -1.0 };
        value += poly_blep(self.phase, inc);
        value -= poly_blep((self.phase + 0.5) % 1.0, inc);
        value
    }
}

/// PolyBLEP correction around a discontinuity.
///
/// `t` is the phase in `[0, 1)`, `dt` the phase increment per sample.
fn poly_blep(t: f64, dt: f64) -> f64 {
    if t < dt {
        let t = t / dt;
        2.0 * t - t * t - 1.0
    } else if t > 1.0 - dt {
        let t = (t - 1.0) / dt;
        t * t + 2.0 * t + 1.0
    } else {
        0.0
    }
}
