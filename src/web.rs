//! Browser backend: WebAudio graphs, `localStorage` preferences and
//! `setTimeout` scheduling, plus the exported `SoundEffects` JS class.

use wasm_bindgen::prelude::*;
use web_sys::{
    AudioContext, AudioNode, AudioParam, AudioScheduledSourceNode, BiquadFilterType,
    OscillatorType, Storage,
};

use crate::dsp::envelope::Ramp;
use crate::dsp::filter::FilterKind;
use crate::dsp::oscillator::Waveform;
use crate::error::{StorageError, SynthError};
use crate::graph::{Source, ToneGraph};
use crate::preferences::{PreferenceConfig, Preferences};
use crate::storage::KeyValueStore;
use crate::synth::{AudioBackend, Scheduler, SharedContext, SoundEffects};

fn js_error(value: JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

fn apply_ramp(param: &AudioParam, ramp: &Ramp) -> Result<(), JsValue> {
    param.set_value_at_time(ramp.from as f32, ramp.start)?;
    if !ramp.is_constant() {
        param.exponential_ramp_to_value_at_time(ramp.to as f32, ramp.end)?;
    }
    Ok(())
}

fn oscillator_type(waveform: Waveform) -> OscillatorType {
    match waveform {
        Waveform::Sine => OscillatorType::Sine,
        Waveform::Square => OscillatorType::Square,
        Waveform::Sawtooth => OscillatorType::Sawtooth,
        Waveform::Triangle => OscillatorType::Triangle,
    }
}

fn start_stop(node: &AudioScheduledSourceNode, graph: &ToneGraph) -> Result<(), JsValue> {
    node.start_with_when(graph.start)?;
    node.stop_with_when(graph.stop)
}

/// A WebAudio `AudioContext`.
pub struct WebAudioBackend {
    ctx: AudioContext,
}

impl WebAudioBackend {
    pub fn new() -> Result<Self, SynthError> {
        AudioContext::new()
            .map(|ctx| WebAudioBackend { ctx })
            .map_err(|e| SynthError::Unavailable(js_error(e)))
    }

    fn realize(&self, graph: &ToneGraph) -> Result<(), JsValue> {
        let gain = self.ctx.create_gain()?;
        apply_ramp(&gain.gain(), &graph.gain)?;
        gain.connect_with_audio_node(&self.ctx.destination())?;

        let input: AudioNode = match graph.filter {
            Some(stage) => {
                let filter = self.ctx.create_biquad_filter()?;
                filter.set_type(match stage.kind {
                    FilterKind::Lowpass => BiquadFilterType::Lowpass,
                    FilterKind::Bandpass => BiquadFilterType::Bandpass,
                });
                filter.q().set_value(stage.q as f32);
                apply_ramp(&filter.frequency(), &stage.frequency)?;
                filter.connect_with_audio_node(&gain)?;
                filter.into()
            }
            None => gain.into(),
        };

        match &graph.source {
            Source::Oscillators {
                waveform,
                frequencies,
            } => {
                for ramp in frequencies {
                    let osc = self.ctx.create_oscillator()?;
                    osc.set_type(oscillator_type(*waveform));
                    apply_ramp(&osc.frequency(), ramp)?;
                    osc.connect_with_audio_node(&input)?;
                    start_stop(osc.as_ref(), graph)?;
                }
            }
            Source::Noise {
                samples,
                sample_rate,
            } => {
                let buffer =
                    self.ctx
                        .create_buffer(1, samples.len() as u32, *sample_rate as f32)?;
                buffer.copy_to_channel(samples, 0)?;
                let src = self.ctx.create_buffer_source()?;
                src.set_buffer(Some(&buffer));
                src.connect_with_audio_node(&input)?;
                start_stop(src.as_ref(), graph)?;
            }
        }
        Ok(())
    }
}

impl AudioBackend for WebAudioBackend {
    fn current_time(&self) -> f64 {
        self.ctx.current_time()
    }

    fn sample_rate(&self) -> f64 {
        self.ctx.sample_rate() as f64
    }

    fn schedule(&self, graph: ToneGraph) -> Result<(), SynthError> {
        self.realize(&graph)
            .map_err(|e| SynthError::Backend(js_error(e)))
    }
}

/// `window.localStorage`, or nothing when the browser denies it.
pub struct LocalStorage {
    storage: Option<Storage>,
}

impl LocalStorage {
    pub fn open() -> Self {
        let storage = web_sys::window().and_then(|w| w.local_storage().ok().flatten());
        if storage.is_none() {
            tracing::warn!("localStorage unavailable; preferences last for this page only");
        }
        LocalStorage { storage }
    }
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.as_ref()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let storage = self.storage.as_ref().ok_or(StorageError::Unavailable)?;
        storage
            .set_item(key, value)
            .map_err(|e| StorageError::Write {
                key: key.to_string(),
                reason: js_error(e),
            })
    }
}

/// `setTimeout`-backed scheduler. Timers are detached once set.
pub struct TimeoutScheduler;

impl Scheduler for TimeoutScheduler {
    fn defer(&self, delay_ms: u32, task: Box<dyn FnOnce()>) {
        gloo_timers::callback::Timeout::new(delay_ms, task).forget();
    }
}

/// JS-facing cue player.
///
/// ```js
/// const sounds = new SoundEffects();
/// button.addEventListener("click", () => sounds.click());
/// ```
#[wasm_bindgen(js_name = SoundEffects)]
pub struct JsSoundEffects {
    inner: SoundEffects<WebAudioBackend, TimeoutScheduler>,
}

#[wasm_bindgen(js_class = SoundEffects)]
impl JsSoundEffects {
    /// `options` may override storage keys and defaults
    /// (`{ enabledKey, volumeKey, defaultEnabled, defaultVolume }`).
    #[wasm_bindgen(constructor)]
    pub fn new(options: JsValue) -> Result<JsSoundEffects, JsValue> {
        let config: PreferenceConfig = if options.is_undefined() || options.is_null() {
            PreferenceConfig::default()
        } else {
            serde_wasm_bindgen::from_value(options).map_err(|e| JsValue::from_str(&format!("{e}")))?
        };
        let prefs = Preferences::with_config(LocalStorage::open(), config);
        Ok(JsSoundEffects {
            inner: SoundEffects::new(prefs, SharedContext::lazy(WebAudioBackend::new), TimeoutScheduler),
        })
    }

    #[wasm_bindgen(js_name = isEnabled)]
    pub fn is_enabled(&self) -> bool {
        self.inner.is_enabled()
    }

    #[wasm_bindgen(js_name = getVolume)]
    pub fn volume(&self) -> f64 {
        self.inner.volume()
    }

    #[wasm_bindgen(js_name = setEnabled)]
    pub fn set_enabled(&self, enabled: bool) {
        self.inner.set_enabled(enabled);
    }

    #[wasm_bindgen(js_name = setVolume)]
    pub fn set_volume(&self, volume: f64) {
        self.inner.set_volume(volume);
    }

    #[wasm_bindgen(js_name = toggleEnabled)]
    pub fn toggle_enabled(&self) -> bool {
        self.inner.toggle_enabled()
    }

    /// Play a cue by name; throws on an unknown name.
    pub fn play(&self, name: &str) -> Result<(), JsValue> {
        self.inner
            .play_named(name)
            .map_err(|e| JsValue::from_str(&format!("{e}")))
    }

    pub fn click(&self) {
        self.inner.click();
    }

    pub fn hover(&self) {
        self.inner.hover();
    }

    pub fn success(&self) {
        self.inner.success();
    }

    pub fn error(&self) {
        self.inner.error();
    }

    pub fn notification(&self) {
        self.inner.notification();
    }

    pub fn toggle(&self) {
        self.inner.toggle();
    }

    pub fn pop(&self) {
        self.inner.pop();
    }

    pub fn whoosh(&self) {
        self.inner.whoosh();
    }

    #[wasm_bindgen(js_name = tabSwitch)]
    pub fn tab_switch(&self) {
        self.inner.tab_switch();
    }

    #[wasm_bindgen(js_name = modalOpen)]
    pub fn modal_open(&self) {
        self.inner.modal_open();
    }

    #[wasm_bindgen(js_name = modalClose)]
    pub fn modal_close(&self) {
        self.inner.modal_close();
    }
}
