//! Biquad filter — matches WebAudio BiquadFilterNode coefficients.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

/// Filter responses used by the cue recipes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    Lowpass,
    Bandpass,
}

/// A 2nd-order IIR filter in Direct Form II Transposed.
///
/// Coefficients follow the Audio EQ Cookbook. Changing the cutoff marks
/// them dirty; they are recomputed lazily on the next sample.
#[derive(Debug, Clone)]
pub struct BiquadFilter {
    pub kind: FilterKind,
    frequency: f64,
    q: f64,

    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,

    z1: f64,
    z2: f64,

    sample_rate: f64,
    dirty: bool,
}

impl BiquadFilter {
    pub fn new(kind: FilterKind, frequency: f64, q: f64, sample_rate: f64) -> Self {
        let mut f = BiquadFilter {
            kind,
            frequency,
            q,
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
            z1: 0.0,
            z2: 0.0,
            sample_rate,
            dirty: true,
        };
        f.update_coefficients();
        f
    }

    fn update_coefficients(&mut self) {
        // Keep the cutoff below Nyquist or the coefficients blow up.
        let nyquist = self.sample_rate / 2.0;
        let freq = self.frequency.clamp(1.0, (nyquist * 0.999).max(1.0));
        let w0 = 2.0 * PI * freq / self.sample_rate;
        let cos_w0 = w0.cos();
        let alpha = w0.sin() / (2.0 * self.q.max(1e-4));

        let (b0, b1, b2) = match self.kind {
            FilterKind::Lowpass => {
                let b1 = 1.0 - cos_w0;
                (b1 / 2.0, b1, b1 / 2.0)
            }
            FilterKind::Bandpass => (alpha, 0.0, -alpha),
        };
        let a0 = 1.0 + alpha;
        let a1 = -2.0 * cos_w0;
        let a2 = 1.0 - alpha;

        self.b0 = b0 / a0;
        self.b1 = b1 / a0;
        self.b2 = b2 / a0;
        self.a1 = a1 / a0;
        self.a2 = a2 / a0;
        self.dirty = false;
    }

    pub fn process(&mut self, input: f64) -> f64 {
        if self.dirty {
            self.update_coefficients();
        }

        let output = self.b0 * input + self.z1;
        self.z1 = self.b1 * input - self.a1 * output + self.z2;
        self.z2 = self.b2 * input - self.a2 * output;
        output
    }

    pub fn set_frequency(&mut self, freq: f64) {
        if freq != self.frequency {
            self.frequency = freq;
            self.dirty = true;
        }
    }
}
