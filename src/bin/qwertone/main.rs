//! qwertone - terminal musical keyboard
//!
//! Hold letter/digit keys to play tones; arrow and function keys change the
//! configuration. Requires a terminal with the kitty keyboard protocol so
//! key releases are reported.

mod ui;

use std::time::Duration;

use color_eyre::eyre::{eyre, Result, WrapErr};
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use ratatui::DefaultTerminal;

use qwertone::audio::AudioSession;
use qwertone::controller::{Config, Controller, KeyInput};
use qwertone::keymap::{InputLayout, PhysicalKey};
use qwertone::pitch::ROOT_KEY_NAMES;

use ui::state::UiState;

/// Modifiers that turn a note key into "not our event".
const BLOCKING_MODIFIERS: KeyModifiers = KeyModifiers::CONTROL
    .union(KeyModifiers::ALT)
    .union(KeyModifiers::SUPER)
    .union(KeyModifiers::SHIFT);

fn main() -> Result<()> {
    color_eyre::install()?;
    env_logger::init();

    let mut terminal = ratatui::init();

    // Without release events every note would sound forever.
    if !crossterm::terminal::supports_keyboard_enhancement().unwrap_or(false) {
        ratatui::restore();
        return Err(eyre!(
            "this terminal does not report key release events \
             (kitty keyboard protocol required)"
        ));
    }
    crossterm::execute!(
        std::io::stdout(),
        PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
    )
    .wrap_err("failed to enable keyboard enhancement")?;

    let result = App::new().run(&mut terminal);

    let _ = crossterm::execute!(std::io::stdout(), PopKeyboardEnhancementFlags);
    ratatui::restore();
    result
}

struct App {
    controller: Controller<AudioSession>,
    /// Index into ROOT_KEY_NAMES for the Left/Right cycling controls.
    root_key_index: usize,
    status: Option<String>,
    should_quit: bool,
}

impl App {
    fn new() -> Self {
        let start_index = ROOT_KEY_NAMES
            .iter()
            .position(|&name| name == "C")
            .unwrap_or(0);
        Self {
            controller: Controller::new(Config::default()),
            root_key_index: start_index,
            status: None,
            should_quit: false,
        }
    }

    fn run(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        while !self.should_quit {
            let view = self.view();
            terminal.draw(|frame| ui::render(frame, &view))?;

            // ~60fps non-blocking poll.
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key)?;
                }
            }
        }

        self.controller.release_all();
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.kind {
            // Repeats go through too; the registry guard drops them.
            KeyEventKind::Press | KeyEventKind::Repeat => self.handle_press(key),
            KeyEventKind::Release => {
                if let KeyCode::Char(c) = key.code {
                    self.controller.key_up(PhysicalKey::new(c));
                }
                Ok(())
            }
        }
    }

    fn handle_press(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::F(1) => self.cycle_scale(),
            KeyCode::F(2) => self.toggle_layout(),
            KeyCode::Left => self.cycle_root_key(-1),
            KeyCode::Right => self.cycle_root_key(1),
            KeyCode::Up => self.shift_octave(1),
            KeyCode::Down => self.shift_octave(-1),
            KeyCode::Char(c) => {
                let input = KeyInput {
                    key: PhysicalKey::new(c),
                    modifiers_held: key.modifiers.intersects(BLOCKING_MODIFIERS),
                    composing: false,
                };
                self.controller
                    .key_down(input)
                    .wrap_err("could not open the audio output")?;
            }
            _ => {}
        }
        Ok(())
    }

    fn cycle_scale(&mut self) {
        if !self.controller.scale_controls_enabled() {
            self.status = Some("scale selection is disabled in Piano layout".into());
            return;
        }
        let next = match self.controller.config().scale.name() {
            "Major" => "Minor",
            _ => "Major",
        };
        self.controller.set_scale_name(next);
        self.status = Some(format!("scale: {next}"));
    }

    fn toggle_layout(&mut self) {
        let next = match self.controller.config().layout {
            InputLayout::Standard => "Piano",
            InputLayout::Piano => "Keyboard",
        };
        if self.controller.set_layout_name(next) {
            self.status = Some(format!("layout: {next}"));
        } else {
            self.status = Some("layout switching is disabled in this build".into());
        }
    }

    fn cycle_root_key(&mut self, step: isize) {
        let len = ROOT_KEY_NAMES.len() as isize;
        let index = (self.root_key_index as isize + step).rem_euclid(len) as usize;
        self.root_key_index = index;
        let name = ROOT_KEY_NAMES[index];
        self.controller.set_root_key_name(name);
        self.status = Some(format!("root key: {name}"));
    }

    fn shift_octave(&mut self, step: i32) {
        let octave = (self.controller.config().octave + step).clamp(-2, 2);
        self.controller.set_octave(octave);
        self.status = Some(format!("octave: {octave:+}"));
    }

    fn view(&self) -> UiState {
        let mut held: Vec<(char, f32)> = self
            .controller
            .held_keys()
            .map(|(key, freq)| (key.as_char(), freq))
            .collect();
        held.sort_by_key(|&(c, _)| c);

        UiState {
            config: *self.controller.config(),
            root_key_name: ROOT_KEY_NAMES[self.root_key_index],
            scale_enabled: self.controller.scale_controls_enabled(),
            session_started: self.controller.session_started(),
            held,
            status: self.status.clone(),
        }
    }
}
