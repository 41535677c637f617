/// Output peak limiter.
///
/// The one shared stage every voice feeds. An envelope follower tracks the
/// absolute peak of the mix (fast attack, slow release) and the signal is
/// scaled down whenever the envelope exceeds the threshold, with a final
/// clamp so no sample ever leaves above it. Voices only ever mix in; the
/// stage is never reconfigured mid-session.
pub struct Limiter {
    threshold: f32,
    envelope: f32,
    attack_coeff: f32,
    release_coeff: f32,
}

/// Headroom ceiling. Well under full scale so a burst of keys cannot clip
/// the host output.
const THRESHOLD: f32 = 0.8;

const ATTACK_TIME: f32 = 0.003;
const RELEASE_TIME: f32 = 0.25;

impl Limiter {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            threshold: THRESHOLD,
            envelope: 0.0,
            attack_coeff: 1.0 - (-1.0 / (ATTACK_TIME * sample_rate)).exp(),
            release_coeff: 1.0 - (-1.0 / (RELEASE_TIME * sample_rate)).exp(),
        }
    }

    pub fn process(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            let peak = sample.abs();
            let coeff = if peak > self.envelope {
                self.attack_coeff
            } else {
                self.release_coeff
            };
            self.envelope += (peak - self.envelope) * coeff;

            if self.envelope > self.threshold {
                *sample *= self.threshold / self.envelope;
            }
            *sample = sample.clamp(-self.threshold, self.threshold);
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }
}
