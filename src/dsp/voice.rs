//! Voice — renders one scheduled graph sample by sample.

use crate::graph::{Source, ToneGraph};

use super::envelope::Ramp;
use super::filter::BiquadFilter;
use super::oscillator::Oscillator;

enum VoiceSource {
    Oscillators(Vec<(Oscillator, Ramp)>),
    Noise { samples: Vec<f32>, rate: f64 },
}

/// Offline realization of a [`ToneGraph`]: source, optional filter, gain.
pub struct Voice {
    source: VoiceSource,
    filter: Option<(BiquadFilter, Ramp)>,
    gain: Ramp,
    start: f64,
    stop: f64,
}

impl Voice {
    pub fn new(graph: &ToneGraph, sample_rate: f64) -> Self {
        let source = match &graph.source {
            Source::Oscillators {
                waveform,
                frequencies,
            } => VoiceSource::Oscillators(
                frequencies
                    .iter()
                    .map(|ramp| (Oscillator::new(*waveform, ramp.from, sample_rate), *ramp))
                    .collect(),
            ),
            Source::Noise {
                samples,
                sample_rate: rate,
            } => VoiceSource::Noise {
                samples: samples.clone(),
                rate: *rate,
            },
        };

        let filter = graph.filter.map(|stage| {
            (
                BiquadFilter::new(stage.kind, stage.frequency.from, stage.q, sample_rate),
                stage.frequency,
            )
        });

        Voice {
            source,
            filter,
            gain: graph.gain,
            start: graph.start,
            stop: graph.stop,
        }
    }

    /// Output at context time `t`. Silent outside `[start, stop)`.
    pub fn sample_at(&mut self, t: f64) -> f64 {
        if t < self.start || t >= self.stop {
            return 0.0;
        }

        let raw: f64 = match &mut self.source {
            VoiceSource::Oscillators(oscs) => oscs
                .iter_mut()
                .map(|(osc, ramp)| {
                    osc.set_frequency(ramp.value_at(t));
                    osc.next_sample()
                })
                .sum(),
            VoiceSource::Noise { samples, rate } => {
                let idx = ((t - self.start) * *rate) as usize;
                samples.get(idx).map_or(0.0, |&s| s as f64)
            }
        };

        let filtered = match &mut self.filter {
            Some((filter, cutoff)) => {
                filter.set_frequency(cutoff.value_at(t));
                filter.process(raw)
            }
            None => raw,
        };

        filtered * self.gain.value_at(t)
    }

    pub fn is_finished(&self, t: f64) -> bool {
        t >= self.stop
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::EffectName;

    fn voice(effect: EffectName, volume: f64) -> Voice {
        let graph = ToneGraph::build(effect, &effect.recipe()[0], volume, 0.0, 44100.0, 5);
        Voice::new(&graph, 44100.0)
    }

    fn render(v: &mut Voice, seconds: f64) -> Vec<f64> {
        (0..(seconds * 44100.0) as usize)
            .map(|n| v.sample_at(n as f64 / 44100.0))
            .collect()
    }

    #[test]
    fn produces_sound_then_silence() {
        let mut v = voice(EffectName::Toggle, 1.0);
        let out = render(&mut v, 0.1);
        assert!(out[..2205].iter().any(|s| s.abs() > 0.01));
        assert!(out[2205..].iter().all(|&s| s == 0.0));
        assert!(v.is_finished(0.05));
    }

    #[test]
    fn decays_over_duration() {
        let mut v = voice(EffectName::Error, 1.0);
        let out = render(&mut v, 0.3);
        let peak = |range: &[f64]| range.iter().fold(0.0_f64, |m, s| m.max(s.abs()));
        let early = peak(&out[441..2205]);
        let late = peak(&out[11025..13000]);
        assert!(late < early * 0.2, "early {early}, late {late}");
    }

    #[test]
    fn gain_bounds_output() {
        let mut v = voice(EffectName::Hover, 1.0);
        for s in render(&mut v, 0.08) {
            // Two summed sines under a 0.15 gain.
            assert!(s.abs() <= 0.3 + 1e-9, "out of range: {s}");
        }
    }

    #[test]
    fn noise_voice_is_audible_and_finite() {
        let mut v = voice(EffectName::Whoosh, 1.0);
        let out = render(&mut v, 0.3);
        assert!(out.iter().all(|s| s.is_finite()));
        assert!(out.iter().any(|s| s.abs() > 0.01));
    }

    #[test]
    fn zero_volume_is_silent() {
        let mut v = voice(EffectName::Pop, 0.0);
        assert!(render(&mut v, 0.1).iter().all(|&s| s == 0.0));
    }
}
