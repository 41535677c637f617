//! Voice pool, tone generation, and the shared output chain.
//!
//! The control side never touches a voice directly: it sends id-addressed
//! messages (`SynthMessage`) over a lock-free queue and the audio callback
//! applies them at block boundaries. All per-sample state lives here.

/// Output peak limiter, the single stage every voice feeds.
pub mod limiter;
/// Control-to-audio messages and the receiver seam.
pub mod message;
/// Voice pool with id-based addressing and mixdown.
pub mod mixer;
/// One sounding tone: wavetable oscillator plus gain envelope.
pub mod voice;

pub use message::{MessageReceiver, SynthMessage};
pub use mixer::KeySynth;
