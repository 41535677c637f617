//! UI-side view of the controller, rebuilt every frame.

use qwertone::controller::Config;

pub struct UiState {
    pub config: Config,
    pub root_key_name: &'static str,
    /// False under the piano layout; the scale control renders dimmed.
    pub scale_enabled: bool,
    /// False until the first accepted key-down opens the audio output.
    pub session_started: bool,
    /// Held keys with their sounding frequency, sorted for stable display.
    pub held: Vec<(char, f32)>,
    /// Last configuration change or fallback notice.
    pub status: Option<String>,
}
