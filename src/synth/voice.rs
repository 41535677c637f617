use std::sync::LazyLock;

/*
Voice Lifecycle
===============

A voice is one sounding tone: a wavetable oscillator and a smoothed gain
stage. Its life has three phases:

  Free       Slot available for allocation. Produces nothing.
  Sounding   Key held. Gain climbs from 0 toward TARGET_GAIN.
  Releasing  Key released. Gain falls toward silence; after a fixed delay
             the oscillator hard-stops and the slot frees.

Gain never jumps. Both directions use the same exponential approach: each
sample the level moves a fixed fraction of the remaining distance to its
target,

    gain += (target - gain) * (1 - e^(-1 / (TIME_CONSTANT * sample_rate)))

which is the classic one-pole smoother. With a 0.1 s time constant the level
covers ~63% of the gap every 0.1 s, so attacks swell in and releases tail
off without clicks.

The release is two-phase: the target drops to RELEASE_FLOOR (effectively
silence, never exactly zero - an exponential approach would take forever),
and a sample-counted 0.1 s timer runs alongside. When the timer expires the
voice stops dead regardless of where the ramp got to. The ramp has decayed
far enough by then that the cut is inaudible. Releases are never cancelled;
a re-press of the same key is a new voice in a new slot.
*/

/// Steady-state gain of a held key, as a fraction of full scale. Low enough
/// that several simultaneous keys sum without slamming the limiter.
pub const TARGET_GAIN: f32 = 0.1;

/// Exponential approach floor for the release ramp (1/10000 of full scale).
pub const RELEASE_FLOOR: f32 = 1.0 / 10_000.0;

/// Time constant of the gain smoother, seconds. Shared by attack and release.
pub const TIME_CONSTANT: f32 = 0.1;

/// Real-time delay between release start and the hard stop, seconds.
pub const STOP_DELAY: f32 = 0.1;

const WAVETABLE_SIZE: usize = 2048;

/// Harmonic amplitudes of the fixed timbre, fundamental first.
const HARMONIC_AMPS: [f32; 4] = [1.0, 0.5, 0.5, 0.25];

/// One cycle of the additive waveform, peak-normalized, built once and
/// shared by every voice.
static WAVETABLE: LazyLock<[f32; WAVETABLE_SIZE]> = LazyLock::new(|| {
    let mut table = [0.0f32; WAVETABLE_SIZE];
    for (i, sample) in table.iter_mut().enumerate() {
        let phase = i as f32 / WAVETABLE_SIZE as f32;
        *sample = HARMONIC_AMPS
            .iter()
            .enumerate()
            .map(|(n, amp)| amp * (std::f32::consts::TAU * (n + 1) as f32 * phase).sin())
            .sum();
    }
    let peak = table.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
    for sample in &mut table {
        *sample /= peak;
    }
    table
});

/// Linear-interpolated table lookup. `phase` in [0, 1).
#[inline]
fn wavetable_sample(phase: f32) -> f32 {
    let position = phase * WAVETABLE_SIZE as f32;
    let index = position as usize % WAVETABLE_SIZE;
    let next = (index + 1) % WAVETABLE_SIZE;
    let frac = position - position.floor();
    WAVETABLE[index] * (1.0 - frac) + WAVETABLE[next] * frac
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Free,
    Sounding,
    Releasing,
}

pub struct Voice {
    id: u64,
    state: VoiceState,
    frequency: f32,
    phase: f32,
    phase_increment: f32,
    gain: f32,
    gain_target: f32,
    /// Per-sample one-pole coefficient, derived from TIME_CONSTANT.
    smoothing: f32,
    /// Samples left until the hard stop, once releasing.
    stop_countdown: u32,
    /// Allocation order, used to steal the oldest releasing voice.
    age: u64,
}

impl Voice {
    pub fn new() -> Self {
        Self {
            id: 0,
            state: VoiceState::Free,
            frequency: 0.0,
            phase: 0.0,
            phase_increment: 0.0,
            gain: 0.0,
            gain_target: 0.0,
            smoothing: 0.0,
            stop_countdown: 0,
            age: 0,
        }
    }

    /// Begin sounding: gain starts at silence and approaches TARGET_GAIN,
    /// the oscillator runs immediately at `frequency`.
    pub fn start(&mut self, id: u64, frequency: f32, sample_rate: f32, age: u64) {
        self.id = id;
        self.state = VoiceState::Sounding;
        self.frequency = frequency;
        self.phase = 0.0;
        self.phase_increment = frequency / sample_rate;
        self.gain = 0.0;
        self.gain_target = TARGET_GAIN;
        self.smoothing = 1.0 - (-1.0 / (TIME_CONSTANT * sample_rate)).exp();
        self.stop_countdown = 0;
        self.age = age;
    }

    /// Begin the release: ramp toward the floor and arm the hard-stop timer.
    /// Not cancellable.
    pub fn release(&mut self, sample_rate: f32) {
        if self.state != VoiceState::Sounding {
            return;
        }
        self.state = VoiceState::Releasing;
        self.gain_target = RELEASE_FLOOR;
        self.stop_countdown = (STOP_DELAY * sample_rate).round().max(1.0) as u32;
    }

    /// Render this voice additively into `out`. Frees the slot when the
    /// release timer expires; samples past the stop are left untouched.
    pub fn render_add(&mut self, out: &mut [f32]) {
        if self.state == VoiceState::Free {
            return;
        }
        for sample in out.iter_mut() {
            if self.state == VoiceState::Releasing {
                if self.stop_countdown == 0 {
                    self.free();
                    return;
                }
                self.stop_countdown -= 1;
            }

            self.gain += (self.gain_target - self.gain) * self.smoothing;
            *sample += wavetable_sample(self.phase) * self.gain;

            self.phase += self.phase_increment;
            if self.phase >= 1.0 {
                self.phase -= 1.0;
            }
        }
    }

    fn free(&mut self) {
        self.state = VoiceState::Free;
        self.gain = 0.0;
        self.gain_target = 0.0;
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }

    pub fn is_free(&self) -> bool {
        self.state == VoiceState::Free
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn age(&self) -> u64 {
        self.age
    }

    pub fn gain(&self) -> f32 {
        self.gain
    }
}

impl Default for Voice {
    fn default() -> Self {
        Self::new()
    }
}
