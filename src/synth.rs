//! Tone synthesizer — turns named cues into scheduled audio graphs.
//!
//! The synthesizer never talks to an audio subsystem directly. It builds
//! [`ToneGraph`]s and hands them to an [`AudioBackend`]; later tones of
//! multi-tone cues are deferred through a [`Scheduler`]. Both are injected,
//! so the same code drives WebAudio in the browser, the offline renderer
//! and the recording doubles in [`crate::sim`].

use std::cell::{Cell, OnceCell, RefCell};
use std::rc::Rc;

use crate::effects::{EffectName, ToneDescriptor};
use crate::error::SynthError;
use crate::graph::ToneGraph;
use crate::preferences::Preferences;

/// The audio-processing context graphs are scheduled against.
pub trait AudioBackend {
    /// Context clock in seconds.
    fn current_time(&self) -> f64;
    fn sample_rate(&self) -> f64;
    /// Realize `graph`. The graph disposes of itself after `graph.stop`.
    fn schedule(&self, graph: ToneGraph) -> Result<(), SynthError>;
}

/// Runs a task once after a delay. Tasks cannot be cancelled.
pub trait Scheduler {
    fn defer(&self, delay_ms: u32, task: Box<dyn FnOnce()>);
}

type ContextFactory<B> = Box<dyn FnOnce() -> Result<B, SynthError>>;

/// The one shared audio context, built on first use and never torn down.
///
/// A failed construction is remembered: it is logged once and every
/// later request gets the same error without retrying.
pub struct SharedContext<B> {
    factory: Cell<Option<ContextFactory<B>>>,
    context: OnceCell<Result<B, SynthError>>,
}

impl<B> SharedContext<B> {
    pub fn lazy(factory: impl FnOnce() -> Result<B, SynthError> + 'static) -> Self {
        SharedContext {
            factory: Cell::new(Some(Box::new(factory))),
            context: OnceCell::new(),
        }
    }

    /// A context that already exists.
    pub fn ready(backend: B) -> Self {
        SharedContext {
            factory: Cell::new(None),
            context: OnceCell::from(Ok(backend)),
        }
    }

    pub fn get(&self) -> Result<&B, SynthError> {
        self.context
            .get_or_init(|| {
                let factory = self
                    .factory
                    .take()
                    .ok_or_else(|| SynthError::Unavailable("no context factory".to_string()))?;
                factory().inspect_err(|e| {
                    tracing::error!(error = %e, "audio context construction failed; cues disabled");
                })
            })
            .as_ref()
            .map_err(Clone::clone)
    }

    pub fn is_initialized(&self) -> bool {
        self.context.get().is_some()
    }
}

/// Builds graphs for single tones against the shared context.
pub struct ToneSynth<B> {
    context: SharedContext<B>,
    next_seed: Cell<u64>,
}

impl<B: AudioBackend> ToneSynth<B> {
    pub fn new(context: SharedContext<B>) -> Self {
        ToneSynth {
            context,
            next_seed: Cell::new(1),
        }
    }

    pub fn context(&self) -> &SharedContext<B> {
        &self.context
    }

    /// Build and schedule one tone starting now.
    pub fn sound(
        &self,
        effect: EffectName,
        tone: &ToneDescriptor,
        volume: f64,
    ) -> Result<(), SynthError> {
        let ctx = self.context.get()?;
        let seed = self.next_seed.get();
        self.next_seed.set(seed.wrapping_add(1));

        let graph = ToneGraph::build(
            effect,
            tone,
            volume,
            ctx.current_time(),
            ctx.sample_rate(),
            seed,
        );
        tracing::debug!(
            %effect,
            start = graph.start,
            stop = graph.stop,
            gain = graph.start_gain(),
            "scheduling tone"
        );
        ctx.schedule(graph)
    }
}

struct Shared<B> {
    prefs: RefCell<Preferences>,
    synth: ToneSynth<B>,
}

impl<B: AudioBackend> Shared<B> {
    /// Check preferences at the moment the graph is built, then build it.
    fn sound(&self, effect: EffectName, tone: &ToneDescriptor) {
        let (enabled, volume) = {
            let prefs = self.prefs.borrow();
            (prefs.is_enabled(), prefs.volume())
        };
        if !enabled {
            return;
        }
        match self.synth.sound(effect, tone, volume) {
            Ok(()) => {}
            // Already reported when the context failed to build.
            Err(SynthError::Unavailable(_)) => {}
            Err(e) => tracing::warn!(%effect, error = %e, "cue dropped"),
        }
    }
}

/// Preference store and synthesizer wired together.
///
/// This is the handle UI code holds. Every cue method is a silent no-op
/// while sounds are disabled and never returns an error.
pub struct SoundEffects<B, S> {
    shared: Rc<Shared<B>>,
    scheduler: S,
}

impl<B: AudioBackend + 'static, S: Scheduler> SoundEffects<B, S> {
    pub fn new(prefs: Preferences, context: SharedContext<B>, scheduler: S) -> Self {
        SoundEffects {
            shared: Rc::new(Shared {
                prefs: RefCell::new(prefs),
                synth: ToneSynth::new(context),
            }),
            scheduler,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.shared.prefs.borrow().is_enabled()
    }

    pub fn volume(&self) -> f64 {
        self.shared.prefs.borrow().volume()
    }

    /// Persist `enabled`. Enabling plays a click as confirmation, even
    /// when sounds were already on.
    pub fn set_enabled(&self, enabled: bool) {
        self.shared.prefs.borrow_mut().set_enabled(enabled);
        if enabled {
            self.click();
        }
    }

    pub fn set_volume(&self, volume: f64) {
        self.shared.prefs.borrow_mut().set_volume(volume);
    }

    /// Flip `enabled` and return the new value.
    pub fn toggle_enabled(&self) -> bool {
        let enabled = !self.is_enabled();
        self.set_enabled(enabled);
        enabled
    }

    /// Whether the shared audio context has been built yet.
    pub fn context_initialized(&self) -> bool {
        self.shared.synth.context().is_initialized()
    }

    pub fn play(&self, effect: EffectName) {
        if !self.is_enabled() {
            return;
        }
        for tone in effect.recipe() {
            if tone.start_offset_ms == 0 {
                self.shared.sound(effect, tone);
            } else {
                let shared = Rc::clone(&self.shared);
                self.scheduler.defer(
                    tone.start_offset_ms,
                    Box::new(move || shared.sound(effect, tone)),
                );
            }
        }
    }

    /// Play an effect by its JS method name, e.g. `"tabSwitch"`.
    pub fn play_named(&self, name: &str) -> Result<(), SynthError> {
        self.play(name.parse()?);
        Ok(())
    }

    pub fn click(&self) {
        self.play(EffectName::Click);
    }

    pub fn hover(&self) {
        self.play(EffectName::Hover);
    }

    pub fn success(&self) {
        self.play(EffectName::Success);
    }

    pub fn error(&self) {
        self.play(EffectName::Error);
    }

    pub fn notification(&self) {
        self.play(EffectName::Notification);
    }

    pub fn toggle(&self) {
        self.play(EffectName::Toggle);
    }

    pub fn pop(&self) {
        self.play(EffectName::Pop);
    }

    pub fn whoosh(&self) {
        self.play(EffectName::Whoosh);
    }

    pub fn tab_switch(&self) {
        self.play(EffectName::TabSwitch);
    }

    pub fn modal_open(&self) {
        self.play(EffectName::ModalOpen);
    }

    pub fn modal_close(&self) {
        self.play(EffectName::ModalClose);
    }
}
