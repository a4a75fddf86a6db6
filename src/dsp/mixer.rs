//! Mixer — sums overlapping voices into one mono buffer.

#[derive(Debug, Clone)]
pub struct Mixer {
    buffer: Vec<f64>,
}

impl Mixer {
    pub fn new(num_samples: usize) -> Self {
        Mixer {
            buffer: vec![0.0; num_samples],
        }
    }

    /// Add a sample at the given index. Out-of-range indices are dropped.
    pub fn add(&mut self, index: usize, sample: f64) {
        if let Some(slot) = self.buffer.get_mut(index) {
            *slot += sample;
        }
    }

    /// Mixed output with tanh soft clipping.
    pub fn output(&self) -> Vec<f64> {
        self.buffer.iter().map(|&s| soft_clip(s)).collect()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

fn soft_clip(x: f64) -> f64 {
    x.tanh()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_buffer() {
        let m = Mixer::new(128);
        assert_eq!(m.len(), 128);
        assert!(m.output().iter().all(|&s| s == 0.0));
    }

    #[test]
    fn accumulates_samples() {
        let mut m = Mixer::new(4);
        m.add(0, 0.5);
        m.add(0, 0.3);
        m.add(1, 1.0);
        m.add(10, 1.0);
        let out = m.output();
        assert!((out[0] - soft_clip(0.8)).abs() < 1e-10);
        assert!((out[1] - soft_clip(1.0)).abs() < 1e-10);
        assert_eq!(out[2], 0.0);
    }

    #[test]
    fn soft_clip_prevents_overflow() {
        let mut m = Mixer::new(1);
        m.add(0, 100.0);
        assert!(m.output()[0].abs() <= 1.0);
    }
}
