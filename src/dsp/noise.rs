//! White-noise buffers for noise-based cues.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Number of frames needed to hold `duration` seconds at `sample_rate`.
pub fn frame_count(sample_rate: f64, duration: f64) -> usize {
    (sample_rate * duration).round().max(0.0) as usize
}

/// Fill a buffer with uniform samples in `[-1, 1]`.
///
/// Seeded so that a given graph always renders the same burst.
pub fn white_noise(frames: usize, seed: u64) -> Vec<f32> {
    let mut rng = SmallRng::seed_from_u64(seed);
    (0..frames).map(|_| rng.gen_range(-1.0f32..=1.0)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_count_is_rate_times_duration() {
        assert_eq!(frame_count(44100.0, 0.3), 13230);
        assert_eq!(frame_count(48000.0, 0.5), 24000);
        assert_eq!(frame_count(44100.0, 0.0), 0);
    }

    #[test]
    fn samples_in_range_and_not_silent() {
        let buf = white_noise(10_000, 7);
        assert_eq!(buf.len(), 10_000);
        assert!(buf.iter().all(|s| (-1.0..=1.0).contains(s)));
        let mean = buf.iter().map(|&s| s as f64).sum::<f64>() / buf.len() as f64;
        assert!(mean.abs() < 0.05, "noise should be roughly zero-mean, got {mean}");
        assert!(buf.iter().any(|&s| s.abs() > 0.5));
    }

    #[test]
    fn same_seed_same_burst() {
        assert_eq!(white_noise(64, 3), white_noise(64, 3));
        assert_ne!(white_noise(64, 3), white_noise(64, 4));
    }
}
