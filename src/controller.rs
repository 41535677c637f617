use std::collections::HashMap;

use log::warn;

use crate::keymap::{self, InputLayout, KeymapOptions, PhysicalKey};
use crate::pitch::{self, Scale, DEFAULT_ROOT_KEY};

/*
Input Controller
================

The controller owns the whole control-side picture: the configuration
(scale, root key, octave, layout), the voice registry, and the lazily
opened audio session. Per physical key it is a two-state machine:

  Idle      no registry entry. A key-down is accepted only when no modifier
            is held, no IME composition is in flight, and the key has a
            mapping under the current layout. Acceptance computes the
            frequency, starts a voice, and records it.
  Sounding  registry entry present. Further key-downs for the same key
            (terminal auto-repeat) are ignored; the key-up removes the
            entry and releases the voice.

Keys are independent of each other. The registry entry's lifetime is the
held key, not the sound: key-up removes it immediately while the release
tail plays out on the audio side, so a quick re-press creates a fresh voice
that coexists with the old one's tail.

Configuration changes only affect voices triggered afterwards; a sounding
voice keeps the frequency it was born with.
*/

/// Seam between the controller and the audio output. The real implementation
/// is `audio::AudioSession`; tests substitute a recording fake.
pub trait VoiceSink: Sized {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Open the output. Called once, on the first accepted key-down of the
    /// session. Failure is fatal for the session: no sound can ever come out.
    fn open() -> Result<Self, Self::Error>;

    fn voice_on(&mut self, id: u64, frequency: f32);

    fn voice_off(&mut self, id: u64);

    fn all_voices_off(&mut self);
}

/// A key-down event as delivered by the UI layer.
#[derive(Debug, Clone, Copy)]
pub struct KeyInput {
    pub key: PhysicalKey,
    /// Any of alt/ctrl/meta/shift held.
    pub modifiers_held: bool,
    /// Event is part of an IME composition.
    pub composing: bool,
}

impl KeyInput {
    /// A bare key press with no modifiers and no composition.
    pub fn plain(key: PhysicalKey) -> Self {
        Self {
            key,
            modifiers_held: false,
            composing: false,
        }
    }
}

/// What the controller did with a key-down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyResponse {
    /// Accepted: a voice started at this frequency. The UI should suppress
    /// whatever the key would otherwise do.
    Played(f32),
    /// Not ours: modifier chord, IME composition, unmapped key, or
    /// auto-repeat of a held key. The UI keeps its default handling.
    Ignored,
}

/// Global configuration, single writer (the controller's setters).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    pub scale: Scale,
    /// Semitone offset of the root note, from the root-key table.
    pub root_key: i32,
    /// Whole-octave shift, UI range -2..=+2.
    pub octave: i32,
    pub layout: InputLayout,
    pub options: KeymapOptions,
}

impl Default for Config {
    /// The instrument comes up in C minor at octave 0, standard layout.
    fn default() -> Self {
        Self {
            scale: Scale::Minor,
            root_key: DEFAULT_ROOT_KEY,
            octave: 0,
            layout: InputLayout::Standard,
            options: KeymapOptions::default(),
        }
    }
}

/// A voice the registry is tracking for a held key. The frequency is frozen
/// at creation; configuration changes never repitch it.
#[derive(Debug, Clone, Copy)]
struct ActiveVoice {
    id: u64,
    frequency: f32,
}

pub struct Controller<S: VoiceSink> {
    config: Config,
    /// At most one entry per physical key, present exactly while held.
    registry: HashMap<PhysicalKey, ActiveVoice>,
    next_voice_id: u64,
    /// Opened on the first accepted key-down, then lives for the session.
    session: Option<S>,
}

impl<S: VoiceSink> Controller<S> {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            registry: HashMap::new(),
            next_voice_id: 0,
            session: None,
        }
    }

    pub fn key_down(&mut self, input: KeyInput) -> Result<KeyResponse, S::Error> {
        if input.modifiers_held || input.composing {
            return Ok(KeyResponse::Ignored);
        }
        let Some(offset) = keymap::degree_offset(
            self.config.layout,
            input.key,
            &self.config.scale.definition(),
            self.config.octave,
            &self.config.options,
        ) else {
            return Ok(KeyResponse::Ignored);
        };
        // Auto-repeat of a held key must not retrigger.
        if self.registry.contains_key(&input.key) {
            return Ok(KeyResponse::Ignored);
        }

        let frequency = pitch::frequency(self.config.root_key, offset);
        let id = self.next_voice_id;
        self.next_voice_id += 1;
        self.session_mut()?.voice_on(id, frequency);
        self.registry.insert(input.key, ActiveVoice { id, frequency });
        Ok(KeyResponse::Played(frequency))
    }

    /// Guarded check-then-create; single-threaded on the control side, so
    /// no atomics are needed. The session never closes once open.
    fn session_mut(&mut self) -> Result<&mut S, S::Error> {
        if self.session.is_none() {
            self.session = Some(S::open()?);
        }
        Ok(self.session.as_mut().expect("session just opened"))
    }

    /// Release the voice for `key`. The registry entry goes now; the sound's
    /// tail finishes on its own. A key-up with no entry is a no-op.
    pub fn key_up(&mut self, key: PhysicalKey) {
        let Some(active) = self.registry.remove(&key) else {
            return;
        };
        if let Some(session) = self.session.as_mut() {
            session.voice_off(active.id);
        }
    }

    /// Release everything and clear the registry (UI shutdown path).
    pub fn release_all(&mut self) {
        self.registry.clear();
        if let Some(session) = self.session.as_mut() {
            session.all_voices_off();
        }
    }

    /// Set the scale by UI name. Unknown names fall back to Major.
    pub fn set_scale_name(&mut self, name: &str) {
        self.config.scale = Scale::from_name(name).unwrap_or_else(|| {
            warn!("unknown scale {name:?}, defaulting to Major");
            Scale::Major
        });
    }

    /// Set the root key by UI name. Unknown names fall back to "C".
    pub fn set_root_key_name(&mut self, name: &str) {
        self.config.root_key = pitch::root_key_offset(name).unwrap_or_else(|| {
            warn!("unknown root key {name:?}, defaulting to C");
            DEFAULT_ROOT_KEY
        });
    }

    pub fn set_octave(&mut self, octave: i32) {
        self.config.octave = octave;
    }

    /// Switch the input layout. Returns false (and changes nothing) when the
    /// reduced variant has layout switching disabled.
    pub fn set_layout(&mut self, layout: InputLayout) -> bool {
        if !self.config.options.layout_switching {
            return false;
        }
        self.config.layout = layout;
        true
    }

    /// Switch the layout by UI name. Unknown names fall back to Standard.
    pub fn set_layout_name(&mut self, name: &str) -> bool {
        let layout = InputLayout::from_name(name).unwrap_or_else(|| {
            warn!("unknown input layout {name:?}, defaulting to Keyboard");
            InputLayout::Standard
        });
        self.set_layout(layout)
    }

    /// The UI disables its scale selection controls under the piano layout.
    pub fn scale_controls_enabled(&self) -> bool {
        self.config.layout == InputLayout::Standard
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn is_held(&self, key: PhysicalKey) -> bool {
        self.registry.contains_key(&key)
    }

    /// Currently held keys with the frequency each is sounding at.
    pub fn held_keys(&self) -> impl Iterator<Item = (PhysicalKey, f32)> + '_ {
        self.registry
            .iter()
            .map(|(&key, active)| (key, active.frequency))
    }

    pub fn held_count(&self) -> usize {
        self.registry.len()
    }

    pub fn session_started(&self) -> bool {
        self.session.is_some()
    }
}
