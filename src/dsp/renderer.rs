//! Offline renderer — renders cues to samples or a WAV byte buffer.

use crate::effects::EffectName;
use crate::error::SynthError;
use crate::graph::ToneGraph;

use super::mixer::Mixer;
use super::voice::Voice;

/// Sample rates an `AudioContext` can be created with.
pub const SAMPLE_RATES: std::ops::RangeInclusive<u32> = 3000..=768_000;

/// Validate a caller-supplied output rate.
pub fn check_sample_rate(sample_rate: u32) -> Result<f64, SynthError> {
    if SAMPLE_RATES.contains(&sample_rate) {
        Ok(sample_rate as f64)
    } else {
        Err(SynthError::UnsupportedSampleRate(sample_rate))
    }
}

/// Render graphs on a timeline starting at context time zero.
///
/// The buffer ends when the last graph stops.
pub fn render_graphs(graphs: &[ToneGraph], sample_rate: f64) -> Vec<f64> {
    let end = graphs.iter().map(|g| g.stop).fold(0.0, f64::max);
    let mut mixer = Mixer::new((end * sample_rate).round() as usize);

    for graph in graphs {
        let mut voice = Voice::new(graph, sample_rate);
        let first = (graph.start * sample_rate).ceil().max(0.0) as usize;
        for n in first..mixer.len() {
            let t = n as f64 / sample_rate;
            if voice.is_finished(t) {
                break;
            }
            mixer.add(n, voice.sample_at(t));
        }
    }

    mixer.output()
}

/// Every tone of `effect` laid out at its offset, as the scheduler would
/// play them.
pub fn effect_graphs(effect: EffectName, volume: f64, sample_rate: f64) -> Vec<ToneGraph> {
    effect
        .recipe()
        .iter()
        .enumerate()
        .map(|(i, tone)| {
            let at = tone.start_offset_ms as f64 / 1000.0;
            ToneGraph::build(effect, tone, volume, at, sample_rate, i as u64 + 1)
        })
        .collect()
}

/// Render one cue to mono samples.
pub fn render_effect(effect: EffectName, volume: f64, sample_rate: f64) -> Vec<f64> {
    render_graphs(&effect_graphs(effect, volume, sample_rate), sample_rate)
}

/// Render one cue to a 16-bit mono PCM WAV file.
pub fn render_effect_wav(effect: EffectName, volume: f64, sample_rate: u32) -> Vec<u8> {
    let samples = render_effect(effect, volume, sample_rate as f64);
    let pcm: Vec<i16> = samples
        .iter()
        .map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f64) as i16)
        .collect();
    encode_wav(&pcm, sample_rate, 1)
}

/// Encode interleaved i16 PCM samples to a WAV byte buffer.
fn encode_wav(samples: &[i16], sample_rate: u32, channels: u16) -> Vec<u8> {
    let bits_per_sample: u16 = 16;
    let byte_rate = sample_rate * channels as u32 * (bits_per_sample as u32 / 8);
    let block_align = channels * (bits_per_sample / 8);
    let data_size = (samples.len() * 2) as u32;
    let file_size = 36 + data_size;

    let mut buf = Vec::with_capacity(44 + data_size as usize);

    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&file_size.to_le_bytes());
    buf.extend_from_slice(b"WAVE");

    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes()); // chunk size
    buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
    buf.extend_from_slice(&channels.to_le_bytes());
    buf.extend_from_slice(&sample_rate.to_le_bytes());
    buf.extend_from_slice(&byte_rate.to_le_bytes());
    buf.extend_from_slice(&block_align.to_le_bytes());
    buf.extend_from_slice(&bits_per_sample.to_le_bytes());

    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_size.to_le_bytes());
    for &sample in samples {
        buf.extend_from_slice(&sample.to_le_bytes());
    }

    buf
}
