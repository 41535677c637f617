#[cfg(feature = "rtrb")]
use rtrb::Consumer;

/// Messages from the control thread to the audio thread.
///
/// Voices are addressed by id rather than by key or pitch: the controller
/// resolves scale/key/octave into a frequency before sending, and a
/// re-pressed key gets a fresh id while the old voice is still releasing.
/// Sounding voices are never repitched.
#[derive(Debug, Copy, Clone)]
pub enum SynthMessage {
    VoiceOn { id: u64, frequency: f32 },
    VoiceOff { id: u64 },
    AllVoicesOff,
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<SynthMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<SynthMessage> {
    fn pop(&mut self) -> Option<SynthMessage> {
        Consumer::pop(self).ok()
    }
}

/// Queue-backed receiver for tests and offline rendering.
impl MessageReceiver for std::collections::VecDeque<SynthMessage> {
    fn pop(&mut self) -> Option<SynthMessage> {
        self.pop_front()
    }
}
