//! DSP — pure Rust rendering of cue graphs.
//!
//! The browser plays cues through WebAudio nodes; this module renders the
//! same graphs offline with matching oscillator, biquad and automation
//! semantics, for previews, WAV export and tests.

pub mod envelope;
pub mod filter;
pub mod mixer;
pub mod noise;
pub mod oscillator;
pub mod renderer;
pub mod voice;
