//! The cue table: every named effect and the tones it is made of.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::dsp::filter::FilterKind;
use crate::dsp::oscillator;
use crate::error::SynthError;

/// Signal source of a tone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    Sine,
    Sawtooth,
    Square,
    Triangle,
    Noise,
}

impl Waveform {
    /// The periodic oscillator shape, or `None` for noise.
    pub fn oscillator(self) -> Option<oscillator::Waveform> {
        match self {
            Waveform::Sine => Some(oscillator::Waveform::Sine),
            Waveform::Sawtooth => Some(oscillator::Waveform::Sawtooth),
            Waveform::Square => Some(oscillator::Waveform::Square),
            Waveform::Triangle => Some(oscillator::Waveform::Triangle),
            Waveform::Noise => None,
        }
    }
}

/// A value that moves exponentially from `start` to `end` over a tone.
/// Equal endpoints mean a fixed value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sweep {
    pub start: f64,
    pub end: f64,
}

impl Sweep {
    pub const fn fixed(value: f64) -> Self {
        Sweep {
            start: value,
            end: value,
        }
    }

    pub const fn between(start: f64, end: f64) -> Self {
        Sweep { start, end }
    }

    pub fn is_fixed(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSpec {
    pub kind: FilterKind,
    pub cutoff: Sweep,
    pub q: f64,
}

/// Fixed synthesis parameters for one audio graph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToneDescriptor {
    /// Oscillator pitch in Hz. Noise has none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitch: Option<Sweep>,
    /// Frequency ratio of a second oscillator sharing the gain stage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<f64>,
    pub waveform: Waveform,
    /// Seconds until the envelope reaches its floor and the source stops.
    pub duration: f64,
    /// Starting gain relative to the master volume.
    pub amplitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterSpec>,
    /// Delay after the trigger before this tone is built.
    pub start_offset_ms: u32,
}

impl ToneDescriptor {
    const fn sine(freq: f64, duration: f64, amplitude: f64, start_offset_ms: u32) -> Self {
        ToneDescriptor {
            pitch: Some(Sweep::fixed(freq)),
            interval: None,
            waveform: Waveform::Sine,
            duration,
            amplitude,
            filter: None,
            start_offset_ms,
        }
    }

    /// Time at which the tone stops, relative to the trigger.
    pub fn end_offset(&self) -> f64 {
        self.start_offset_ms as f64 / 1000.0 + self.duration
    }
}

const PERFECT_FIFTH: f64 = 1.5;

const CLICK: [ToneDescriptor; 1] = [ToneDescriptor {
    pitch: Some(Sweep::between(1000.0, 500.0)),
    interval: None,
    waveform: Waveform::Sine,
    duration: 0.05,
    amplitude: 0.5,
    filter: Some(FilterSpec {
        kind: FilterKind::Lowpass,
        cutoff: Sweep::between(4000.0, 1000.0),
        q: 1.0,
    }),
    start_offset_ms: 0,
}];

const HOVER: [ToneDescriptor; 1] = [ToneDescriptor {
    pitch: Some(Sweep::fixed(880.0)),
    interval: Some(PERFECT_FIFTH),
    waveform: Waveform::Sine,
    duration: 0.08,
    amplitude: 0.15,
    filter: None,
    start_offset_ms: 0,
}];

const TOGGLE: [ToneDescriptor; 1] = [ToneDescriptor {
    pitch: Some(Sweep::fixed(1000.0)),
    interval: None,
    waveform: Waveform::Square,
    duration: 0.05,
    amplitude: 0.3,
    filter: Some(FilterSpec {
        kind: FilterKind::Lowpass,
        cutoff: Sweep::fixed(3000.0),
        q: 1.0,
    }),
    start_offset_ms: 0,
}];

const TAB_SWITCH: [ToneDescriptor; 1] = [ToneDescriptor {
    pitch: Some(Sweep::between(700.0, 750.0)),
    interval: None,
    waveform: Waveform::Triangle,
    duration: 0.06,
    amplitude: 0.4,
    filter: None,
    start_offset_ms: 0,
}];

const POP: [ToneDescriptor; 1] = [ToneDescriptor {
    pitch: Some(Sweep::between(600.0, 150.0)),
    interval: None,
    waveform: Waveform::Sine,
    duration: 0.1,
    amplitude: 0.8,
    filter: Some(FilterSpec {
        kind: FilterKind::Lowpass,
        cutoff: Sweep::between(2000.0, 400.0),
        q: 1.0,
    }),
    start_offset_ms: 0,
}];

const ERROR: [ToneDescriptor; 1] = [ToneDescriptor {
    pitch: Some(Sweep::between(400.0, 200.0)),
    interval: None,
    waveform: Waveform::Sawtooth,
    duration: 0.3,
    amplitude: 0.4,
    filter: Some(FilterSpec {
        kind: FilterKind::Lowpass,
        cutoff: Sweep::fixed(1200.0),
        q: 1.0,
    }),
    start_offset_ms: 0,
}];

// C5 E5 G5 B5, 80 ms apart, last note rings longer.
const SUCCESS: [ToneDescriptor; 4] = [
    ToneDescriptor::sine(523.25, 0.3, 0.4, 0),
    ToneDescriptor::sine(659.25, 0.3, 0.4, 80),
    ToneDescriptor::sine(783.99, 0.3, 0.4, 160),
    ToneDescriptor::sine(987.77, 0.5, 0.4, 240),
];

// Each tone is quieter: 0.5 * (1 - i * 0.3).
const NOTIFICATION: [ToneDescriptor; 3] = [
    ToneDescriptor::sine(880.0, 0.4, 0.5, 0),
    ToneDescriptor::sine(1108.73, 0.4, 0.35, 100),
    ToneDescriptor::sine(1318.51, 0.4, 0.2, 200),
];

const MODAL_OPEN: [ToneDescriptor; 3] = [
    ToneDescriptor::sine(392.0, 0.3, 0.3, 0),
    ToneDescriptor::sine(523.25, 0.3, 0.3, 50),
    ToneDescriptor::sine(659.25, 0.3, 0.3, 100),
];

const MODAL_CLOSE: [ToneDescriptor; 3] = [
    ToneDescriptor::sine(659.25, 0.3, 0.3, 0),
    ToneDescriptor::sine(523.25, 0.3, 0.3, 50),
    ToneDescriptor::sine(392.0, 0.3, 0.3, 100),
];

const WHOOSH: [ToneDescriptor; 1] = [ToneDescriptor {
    pitch: None,
    interval: None,
    waveform: Waveform::Noise,
    duration: 0.3,
    amplitude: 0.5,
    filter: Some(FilterSpec {
        kind: FilterKind::Bandpass,
        cutoff: Sweep::between(2000.0, 400.0),
        q: 1.5,
    }),
    start_offset_ms: 0,
}];

/// A named, parameterless UI cue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EffectName {
    Click,
    Hover,
    Success,
    Error,
    Notification,
    Toggle,
    Pop,
    Whoosh,
    TabSwitch,
    ModalOpen,
    ModalClose,
}

impl EffectName {
    pub const ALL: [EffectName; 11] = [
        EffectName::Click,
        EffectName::Hover,
        EffectName::Success,
        EffectName::Error,
        EffectName::Notification,
        EffectName::Toggle,
        EffectName::Pop,
        EffectName::Whoosh,
        EffectName::TabSwitch,
        EffectName::ModalOpen,
        EffectName::ModalClose,
    ];

    /// The JS method name of this effect.
    pub fn as_str(self) -> &'static str {
        match self {
            EffectName::Click => "click",
            EffectName::Hover => "hover",
            EffectName::Success => "success",
            EffectName::Error => "error",
            EffectName::Notification => "notification",
            EffectName::Toggle => "toggle",
            EffectName::Pop => "pop",
            EffectName::Whoosh => "whoosh",
            EffectName::TabSwitch => "tabSwitch",
            EffectName::ModalOpen => "modalOpen",
            EffectName::ModalClose => "modalClose",
        }
    }

    /// Tones in trigger order, offsets ascending.
    pub fn recipe(self) -> &'static [ToneDescriptor] {
        match self {
            EffectName::Click => &CLICK,
            EffectName::Hover => &HOVER,
            EffectName::Success => &SUCCESS,
            EffectName::Error => &ERROR,
            EffectName::Notification => &NOTIFICATION,
            EffectName::Toggle => &TOGGLE,
            EffectName::Pop => &POP,
            EffectName::Whoosh => &WHOOSH,
            EffectName::TabSwitch => &TAB_SWITCH,
            EffectName::ModalOpen => &MODAL_OPEN,
            EffectName::ModalClose => &MODAL_CLOSE,
        }
    }

    /// Seconds from trigger until the last tone stops.
    pub fn total_duration(self) -> f64 {
        self.recipe()
            .iter()
            .map(ToneDescriptor::end_offset)
            .fold(0.0, f64::max)
    }
}

impl fmt::Display for EffectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EffectName {
    type Err = SynthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EffectName::ALL
            .into_iter()
            .find(|e| e.as_str() == s)
            .ok_or_else(|| SynthError::UnknownEffect(s.to_string()))
    }
}

/// The whole table as JSON, keyed by effect name.
pub fn effect_table_json() -> Result<String, serde_json::Error> {
    let table: serde_json::Map<String, serde_json::Value> = EffectName::ALL
        .into_iter()
        .map(|e| -> Result<_, serde_json::Error> {
            Ok((e.to_string(), serde_json::to_value(e.recipe())?))
        })
        .collect::<Result<_, _>>()?;
    serde_json::to_string(&table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for effect in EffectName::ALL {
            assert_eq!(effect.as_str().parse::<EffectName>(), Ok(effect));
        }
        assert_eq!(
            "explode".parse::<EffectName>(),
            Err(SynthError::UnknownEffect("explode".to_string()))
        );
    }

    #[test]
    fn serde_names_match_js_methods() {
        for effect in EffectName::ALL {
            let json = serde_json::to_string(&effect).unwrap();
            assert_eq!(json, format!("\"{}\"", effect.as_str()));
        }
    }

    #[test]
    fn every_tone_is_short() {
        for effect in EffectName::ALL {
            for tone in effect.recipe() {
                assert!(tone.duration > 0.0 && tone.duration <= 0.5, "{effect}");
                assert!(tone.amplitude > 0.0, "{effect}");
            }
        }
    }

    #[test]
    fn offsets_ascend_and_single_tones_start_immediately() {
        for effect in EffectName::ALL {
            let recipe = effect.recipe();
            assert_eq!(recipe[0].start_offset_ms, 0, "{effect}");
            assert!(
                recipe.windows(2).all(|w| w[0].start_offset_ms < w[1].start_offset_ms),
                "{effect}"
            );
        }
    }

    #[test]
    fn success_is_four_steps_of_80ms() {
        let recipe = EffectName::Success.recipe();
        let freqs: Vec<f64> = recipe.iter().map(|t| t.pitch.unwrap().start).collect();
        let offsets: Vec<u32> = recipe.iter().map(|t| t.start_offset_ms).collect();
        assert_eq!(freqs, vec![523.25, 659.25, 783.99, 987.77]);
        assert_eq!(offsets, vec![0, 80, 160, 240]);
    }

    #[test]
    fn notification_fades_per_tone() {
        for (i, tone) in EffectName::Notification.recipe().iter().enumerate() {
            let expected = 0.5 * (1.0 - i as f64 * 0.3);
            assert!((tone.amplitude - expected).abs() < 1e-12, "tone {i}");
        }
    }

    #[test]
    fn modal_close_mirrors_modal_open() {
        let roots = |effect: EffectName| -> Vec<f64> {
            effect.recipe().iter().map(|t| t.pitch.unwrap().start).collect()
        };
        let open = roots(EffectName::ModalOpen);
        let mut close = roots(EffectName::ModalClose);
        close.reverse();
        assert_eq!(open, close);
    }

    #[test]
    fn swept_effects_sweep_down_through_lowpass() {
        for effect in [EffectName::Click, EffectName::Pop] {
            let tone = effect.recipe()[0];
            let pitch = tone.pitch.unwrap();
            assert!(pitch.start > pitch.end);
            let filter = tone.filter.expect("swept cue has a filter");
            assert_eq!(filter.kind, FilterKind::Lowpass);
            assert!(filter.cutoff.start > filter.cutoff.end);
        }
        let error = EffectName::Error.recipe()[0];
        let pitch = error.pitch.unwrap();
        assert!(pitch.start > pitch.end);
        assert!(error.filter.unwrap().cutoff.is_fixed());
    }

    #[test]
    fn whoosh_is_bandpassed_noise() {
        let tone = EffectName::Whoosh.recipe()[0];
        assert_eq!(tone.waveform, Waveform::Noise);
        assert_eq!(tone.waveform.oscillator(), None);
        assert_eq!(tone.pitch, None);
        let filter = tone.filter.unwrap();
        assert_eq!(filter.kind, FilterKind::Bandpass);
        assert!(filter.cutoff.start > filter.cutoff.end);
    }

    #[test]
    fn total_duration_covers_last_tone() {
        assert!((EffectName::Success.total_duration() - 0.74).abs() < 1e-9);
        assert!((EffectName::Hover.total_duration() - 0.08).abs() < 1e-9);
    }

    #[test]
    fn table_json_lists_every_effect() {
        let json = effect_table_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        for effect in EffectName::ALL {
            assert!(value[effect.as_str()].is_array(), "{effect}");
        }
        assert_eq!(value["hover"][0]["interval"], 1.5);
        assert_eq!(value["whoosh"][0]["filter"]["kind"], "bandpass");
        assert_eq!(value["success"][3]["startOffsetMs"], 240);
        assert_eq!(value["click"][0]["pitch"]["end"], 500.0);
        assert!(value["whoosh"][0].get("pitch").is_none());
    }
}
