//! Scheduled audio graphs.
//!
//! A [`ToneGraph`] is one `source → [filter] → gain → destination` chain
//! with every parameter automation resolved to absolute context time.
//! Backends realize it (WebAudio nodes, offline rendering, or a
//! recording stub); nothing here touches an audio subsystem.

use crate::dsp::envelope::Ramp;
use crate::dsp::filter::FilterKind;
use crate::dsp::noise;
use crate::dsp::oscillator;
use crate::effects::{EffectName, Sweep, ToneDescriptor};

#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    /// One or more oscillators summed into the same gain stage, started
    /// and stopped together.
    Oscillators {
        waveform: oscillator::Waveform,
        frequencies: Vec<Ramp>,
    },
    /// A pre-generated mono noise buffer.
    Noise { samples: Vec<f32>, sample_rate: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterStage {
    pub kind: FilterKind,
    pub frequency: Ramp,
    pub q: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToneGraph {
    pub effect: EffectName,
    pub source: Source,
    pub filter: Option<FilterStage>,
    pub gain: Ramp,
    /// Context time the source starts.
    pub start: f64,
    /// Context time the source stops; equals the envelope end.
    pub stop: f64,
}

fn sweep_ramp(sweep: Sweep, start: f64, end: f64) -> Ramp {
    Ramp::exponential(sweep.start, sweep.end, start, end)
}

impl ToneGraph {
    /// Build the graph for `tone`, starting at context time `now`.
    ///
    /// `seed` only matters for noise sources.
    pub fn build(
        effect: EffectName,
        tone: &ToneDescriptor,
        volume: f64,
        now: f64,
        sample_rate: f64,
        seed: u64,
    ) -> Self {
        let stop = now + tone.duration;

        let source = match tone.waveform.oscillator().zip(tone.pitch) {
            Some((waveform, pitch)) => {
                let root = sweep_ramp(pitch, now, stop);
                let mut frequencies = vec![root];
                if let Some(ratio) = tone.interval {
                    frequencies.push(Ramp {
                        from: root.from * ratio,
                        to: root.to * ratio,
                        ..root
                    });
                }
                Source::Oscillators {
                    waveform,
                    frequencies,
                }
            }
            None => Source::Noise {
                samples: noise::white_noise(noise::frame_count(sample_rate, tone.duration), seed),
                sample_rate,
            },
        };

        let filter = tone.filter.map(|spec| FilterStage {
            kind: spec.kind,
            frequency: sweep_ramp(spec.cutoff, now, stop),
            q: spec.q,
        });

        ToneGraph {
            effect,
            source,
            filter,
            gain: Ramp::decay(volume * tone.amplitude, now, stop),
            start: now,
            stop,
        }
    }

    pub fn start_gain(&self) -> f64 {
        self.gain.from
    }

    pub fn duration(&self) -> f64 {
        self.stop - self.start
    }

    /// Number of oscillator nodes this graph needs.
    pub fn oscillator_count(&self) -> usize {
        match &self.source {
            Source::Oscillators { frequencies, .. } => frequencies.len(),
            Source::Noise { .. } => 0,
        }
    }

    /// Root oscillator frequency at the start, if any.
    pub fn root_frequency(&self) -> Option<f64> {
        match &self.source {
            Source::Oscillators { frequencies, .. } => frequencies.first().map(|r| r.from),
            Source::Noise { .. } => None,
        }
    }

    /// Once stopped the graph can be dropped.
    pub fn is_finished(&self, t: f64) -> bool {
        t >= self.stop
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(effect: EffectName, volume: f64, now: f64) -> Vec<ToneGraph> {
        effect
            .recipe()
            .iter()
            .map(|t| ToneGraph::build(effect, t, volume, now, 44100.0, 1))
            .collect()
    }

    #[test]
    fn hover_is_root_plus_fifth() {
        let graphs = build(EffectName::Hover, 0.5, 2.0);
        assert_eq!(graphs.len(), 1);
        let g = &graphs[0];
        assert!((g.start_gain() - 0.075).abs() < 1e-12);
        assert!((g.stop - 2.08).abs() < 1e-12);
        match &g.source {
            Source::Oscillators { frequencies, .. } => {
                assert_eq!(frequencies.len(), 2);
                assert!((frequencies[1].from / frequencies[0].from - 1.5).abs() < 1e-12);
                assert!(frequencies.iter().all(|r| r.start == g.start && r.end == g.stop));
            }
            Source::Noise { .. } => panic!("hover should use oscillators"),
        }
    }

    #[test]
    fn envelope_ends_where_source_stops() {
        for effect in EffectName::ALL {
            for g in build(effect, 0.8, 1.0) {
                assert_eq!(g.gain.start, g.start, "{effect}");
                assert_eq!(g.gain.end, g.stop, "{effect}");
                assert!(g.gain.to > 0.0, "{effect} floor must be positive");
                assert!(g.gain.to < g.gain.from, "{effect}");
                if let Some(f) = g.filter {
                    assert_eq!(f.frequency.end, g.stop, "{effect}");
                }
            }
        }
    }

    #[test]
    fn quiet_hover_still_fades() {
        // 0.05 × 0.15 starts below the 0.01 floor.
        let g = &build(EffectName::Hover, 0.05, 0.0)[0];
        assert!((g.start_gain() - 0.0075).abs() < 1e-12);
        assert!(!g.gain.is_constant());
        assert!(g.gain.to < g.gain.from);
        assert!(g.gain.value_at(0.04) < g.start_gain());
    }

    #[test]
    fn click_sweeps_pitch_and_cutoff() {
        let g = &build(EffectName::Click, 1.0, 0.0)[0];
        let filter = g.filter.expect("click is filtered");
        assert_eq!(filter.kind, FilterKind::Lowpass);
        assert!(filter.frequency.value_at(0.025) < filter.frequency.from);
        assert_eq!(g.root_frequency(), Some(1000.0));
        assert_eq!(g.oscillator_count(), 1);
    }

    #[test]
    fn whoosh_noise_buffer_matches_duration() {
        let g = &build(EffectName::Whoosh, 0.3, 0.0)[0];
        match &g.source {
            Source::Noise { samples, sample_rate } => {
                assert_eq!(samples.len(), 13230);
                assert_eq!(*sample_rate, 44100.0);
            }
            Source::Oscillators { .. } => panic!("whoosh should be noise"),
        }
        assert_eq!(g.oscillator_count(), 0);
        assert_eq!(g.root_frequency(), None);
    }

    #[test]
    fn finished_after_stop() {
        let g = &build(EffectName::Toggle, 0.3, 1.0)[0];
        assert!(!g.is_finished(1.0));
        assert!(!g.is_finished(1.049));
        assert!(g.is_finished(1.06));
        assert!((g.duration() - 0.05).abs() < 1e-12);
    }
}
