use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::{Producer, RingBuffer};
use thiserror::Error;

use crate::controller::VoiceSink;
use crate::synth::{KeySynth, SynthMessage};
use crate::MAX_BLOCK_SIZE;

/// Capacity of the control-to-audio message queue. A keystroke produces one
/// message, so this only fills if the audio callback stalls badly.
const MESSAGE_QUEUE_CAPACITY: usize = 256;

/// Why the audio output could not be opened. Any of these is fatal for the
/// session: the instrument can never make a sound.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no default audio output device available")]
    NoOutputDevice,
    #[error("failed to query the default output config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),
    #[error("failed to build the output stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),
    #[error("failed to start the output stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),
}

/// A live audio output: the cpal stream with a `KeySynth` inside its
/// callback, fed over a wait-free SPSC queue. Opened once, on the first
/// accepted key-down, and kept for the rest of the session.
pub struct AudioSession {
    _stream: cpal::Stream,
    tx: Producer<SynthMessage>,
    sample_rate: f32,
}

impl AudioSession {
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }
}

impl VoiceSink for AudioSession {
    type Error = SessionError;

    fn open() -> Result<Self, SessionError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(SessionError::NoOutputDevice)?;
        let config = device.default_output_config()?;

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;

        let (tx, rx) = RingBuffer::new(MESSAGE_QUEUE_CAPACITY);
        let mut synth = KeySynth::new(sample_rate, rx);
        let mut block = vec![0.0f32; MAX_BLOCK_SIZE];

        let stream = device.build_output_stream(
            &config.into(),
            move |data: &mut [f32], _| {
                let total_frames = data.len() / channels;
                let mut frames_written = 0;

                while frames_written < total_frames {
                    let frames = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                    let chunk = &mut block[..frames];
                    synth.render_block(chunk);

                    // Mono fan-out to all channels.
                    let out_off = frames_written * channels;
                    for (i, &sample) in chunk.iter().enumerate() {
                        for ch in 0..channels {
                            data[out_off + i * channels + ch] = sample;
                        }
                    }
                    frames_written += frames;
                }
            },
            |err| log::error!("audio stream error: {err}"),
            None,
        )?;
        stream.play()?;

        Ok(Self {
            _stream: stream,
            tx,
            sample_rate,
        })
    }

    fn voice_on(&mut self, id: u64, frequency: f32) {
        // A full queue drops the message; the key simply fails to sound.
        let _ = self.tx.push(SynthMessage::VoiceOn { id, frequency });
    }

    fn voice_off(&mut self, id: u64) {
        let _ = self.tx.push(SynthMessage::VoiceOff { id });
    }

    fn all_voices_off(&mut self) {
        let _ = self.tx.push(SynthMessage::AllVoicesOff);
    }
}
