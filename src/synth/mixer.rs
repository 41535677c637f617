use crate::synth::limiter::Limiter;
use crate::synth::message::{MessageReceiver, SynthMessage};
use crate::synth::voice::{Voice, VoiceState};

/// Upper bound on simultaneous voices, sounding and releasing together.
/// Forty physical note keys exist, so this only binds when many releases
/// overlap many held keys.
pub const MAX_VOICES: usize = 32;

/// The audio-side half of the instrument: a fixed pool of voices driven by
/// id-addressed messages, mixed to mono and run through the output limiter.
///
/// Lives inside the audio callback. Messages are drained at the start of
/// every block; nothing here allocates after construction.
pub struct KeySynth<R: MessageReceiver> {
    voices: Vec<Voice>,
    rx: R,
    limiter: Limiter,
    sample_rate: f32,
    /// Monotonic allocation counter, orders voices for stealing.
    age_counter: u64,
}

impl<R: MessageReceiver> KeySynth<R> {
    pub fn new(sample_rate: f32, rx: R) -> Self {
        Self {
            voices: (0..MAX_VOICES).map(|_| Voice::new()).collect(),
            rx,
            limiter: Limiter::new(sample_rate),
            sample_rate,
            age_counter: 0,
        }
    }

    pub fn render_block(&mut self, out: &mut [f32]) {
        while let Some(msg) = self.rx.pop() {
            self.apply(msg);
        }

        out.fill(0.0);
        for voice in &mut self.voices {
            voice.render_add(out);
        }
        self.limiter.process(out);
    }

    fn apply(&mut self, msg: SynthMessage) {
        match msg {
            SynthMessage::VoiceOn { id, frequency } => {
                let age = self.age_counter;
                self.age_counter += 1;
                let sample_rate = self.sample_rate;
                if let Some(voice) = self.allocate_voice() {
                    voice.start(id, frequency, sample_rate, age);
                }
            }
            SynthMessage::VoiceOff { id } => {
                let sample_rate = self.sample_rate;
                if let Some(voice) = self.find_sounding(id) {
                    voice.release(sample_rate);
                }
            }
            SynthMessage::AllVoicesOff => {
                let sample_rate = self.sample_rate;
                for voice in &mut self.voices {
                    voice.release(sample_rate);
                }
            }
        }
    }

    /// First free slot, else steal the oldest releasing voice. A pool full
    /// of held keys drops the new note rather than cutting one off.
    fn allocate_voice(&mut self) -> Option<&mut Voice> {
        if let Some(idx) = self.voices.iter().position(|v| v.is_free()) {
            return Some(&mut self.voices[idx]);
        }

        let steal_idx = self
            .voices
            .iter()
            .enumerate()
            .filter(|(_, v)| v.state() == VoiceState::Releasing)
            .min_by_key(|(_, v)| v.age())
            .map(|(idx, _)| idx);

        steal_idx.map(|idx| &mut self.voices[idx])
    }

    fn find_sounding(&mut self, id: u64) -> Option<&mut Voice> {
        self.voices
            .iter_mut()
            .find(|v| v.id() == id && v.state() == VoiceState::Sounding)
    }

    /// Voices currently producing sound (sounding or releasing).
    pub fn active_voices(&self) -> usize {
        self.voices.iter().filter(|v| !v.is_free()).count()
    }
}
