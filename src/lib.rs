pub mod controller;
pub mod keymap;
pub mod pitch;
pub mod synth; // Voice pool, envelopes, output limiter

#[cfg(feature = "rtrb")]
pub mod audio; // cpal-backed audio session

pub const MAX_BLOCK_SIZE: usize = 2048;
