pub mod dsp;
pub mod effects;
pub mod error;
pub mod graph;
pub mod preferences;
pub mod sim;
pub mod storage;
pub mod synth;
#[cfg(feature = "web")]
pub mod web;

pub use crate::effects::EffectName;
pub use crate::error::{StorageError, SynthError};
pub use crate::preferences::{PreferenceConfig, Preferences};
pub use crate::synth::{AudioBackend, Scheduler, SharedContext, SoundEffects};

use wasm_bindgen::prelude::*;

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

fn parse_effect(name: &str) -> Result<EffectName, JsValue> {
    name.parse().map_err(|e: SynthError| JsValue::from_str(&format!("{e}")))
}

fn check_rate(sample_rate: u32) -> Result<f64, JsValue> {
    dsp::renderer::check_sample_rate(sample_rate).map_err(|e| JsValue::from_str(&format!("{e}")))
}

/// WASM-exposed: return the soundcue-core version string.
#[wasm_bindgen]
pub fn core_version() -> String {
    VERSION.to_string()
}

/// WASM-exposed: names of every cue, in table order.
#[wasm_bindgen]
pub fn effect_names() -> Result<JsValue, JsValue> {
    let names: Vec<&str> = EffectName::ALL.iter().map(|e| e.as_str()).collect();
    serde_wasm_bindgen::to_value(&names).map_err(|e| JsValue::from_str(&format!("{e}")))
}

/// WASM-exposed: the tone descriptors of one cue.
#[wasm_bindgen]
pub fn describe_effect(name: &str) -> Result<JsValue, JsValue> {
    let effect = parse_effect(name)?;
    serde_wasm_bindgen::to_value(effect.recipe()).map_err(|e| JsValue::from_str(&format!("{e}")))
}

/// WASM-exposed: the whole cue table as a JSON string.
#[wasm_bindgen]
pub fn effect_table() -> Result<String, JsValue> {
    effects::effect_table_json().map_err(|e| JsValue::from_str(&format!("{e}")))
}

/// WASM-exposed: render a cue to a mono 16-bit WAV byte array.
#[wasm_bindgen]
pub fn render_effect_wav(name: &str, volume: f64, sample_rate: u32) -> Result<Vec<u8>, JsValue> {
    let effect = parse_effect(name)?;
    check_rate(sample_rate)?;
    Ok(dsp::renderer::render_effect_wav(
        effect,
        preferences::clamp_volume(volume),
        sample_rate,
    ))
}

/// WASM-exposed: render a cue to mono f32 samples for AudioWorklet playback.
#[wasm_bindgen]
pub fn render_effect_samples(name: &str, volume: f64, sample_rate: u32) -> Result<Vec<f32>, JsValue> {
    let effect = parse_effect(name)?;
    let samples = dsp::renderer::render_effect(
        effect,
        preferences::clamp_volume(volume),
        check_rate(sample_rate)?,
    );
    Ok(samples.iter().map(|&s| s as f32).collect())
}
