//! End-to-end tests of the input controller against a recording sink:
//! key events in, voice-on/voice-off messages out, registry in between.

use std::cell::RefCell;
use std::convert::Infallible;

use qwertone::controller::{Config, Controller, KeyInput, KeyResponse, VoiceSink};
use qwertone::keymap::{InputLayout, PhysicalKey};

#[derive(Debug, Clone, Copy, PartialEq)]
enum SinkEvent {
    On { id: u64, frequency: f32 },
    Off { id: u64 },
}

thread_local! {
    static EVENTS: RefCell<Vec<SinkEvent>> = const { RefCell::new(Vec::new()) };
    static OPENS: RefCell<usize> = const { RefCell::new(0) };
}

/// Records every message; tests run single-threaded per test binary thread,
/// so thread-locals give each test an isolated log.
struct RecordingSink;

impl VoiceSink for RecordingSink {
    type Error = Infallible;

    fn open() -> Result<Self, Infallible> {
        OPENS.with(|opens| *opens.borrow_mut() += 1);
        Ok(RecordingSink)
    }

    fn voice_on(&mut self, id: u64, frequency: f32) {
        EVENTS.with(|events| events.borrow_mut().push(SinkEvent::On { id, frequency }));
    }

    fn voice_off(&mut self, id: u64) {
        EVENTS.with(|events| events.borrow_mut().push(SinkEvent::Off { id }));
    }

    fn all_voices_off(&mut self) {}
}

fn take_events() -> Vec<SinkEvent> {
    EVENTS.with(|events| events.borrow_mut().drain(..).collect())
}

fn opens() -> usize {
    OPENS.with(|opens| *opens.borrow())
}

/// Controller with the startup defaults: standard layout, C minor, octave 0.
fn controller() -> Controller<RecordingSink> {
    take_events();
    OPENS.with(|opens| *opens.borrow_mut() = 0);
    Controller::new(Config::default())
}

fn press(c: &mut Controller<RecordingSink>, key: char) -> KeyResponse {
    c.key_down(KeyInput::plain(PhysicalKey::new(key))).unwrap()
}

fn release(c: &mut Controller<RecordingSink>, key: char) {
    c.key_up(PhysicalKey::new(key));
}

#[test]
fn repeated_key_down_yields_one_voice() {
    let mut c = controller();
    assert!(matches!(press(&mut c, 'q'), KeyResponse::Played(_)));
    assert_eq!(press(&mut c, 'q'), KeyResponse::Ignored);
    assert_eq!(press(&mut c, 'q'), KeyResponse::Ignored);

    assert_eq!(c.held_count(), 1);
    let on_events = take_events()
        .iter()
        .filter(|e| matches!(e, SinkEvent::On { .. }))
        .count();
    assert_eq!(on_events, 1);
}

#[test]
fn key_up_when_idle_is_a_no_op() {
    let mut c = controller();
    release(&mut c, 'q');
    release(&mut c, 'q');
    assert_eq!(c.held_count(), 0);
    assert!(take_events().is_empty());
}

#[test]
fn audio_opens_once_on_first_accepted_key_down() {
    let mut c = controller();
    assert_eq!(opens(), 0);
    press(&mut c, 'q');
    press(&mut c, 'w');
    release(&mut c, 'q');
    press(&mut c, 'q');
    assert_eq!(opens(), 1);
}

#[test]
fn scale_switch_leaves_sounding_voices_alone() {
    let mut c = controller();
    // 'e' is degree 2: minor third (3 semitones) vs major third (4).
    let KeyResponse::Played(before) = press(&mut c, 'e') else {
        panic!("expected a voice");
    };

    c.set_scale_name("Major");

    // The held voice keeps its frequency...
    let held: Vec<(PhysicalKey, f32)> = c.held_keys().collect();
    assert_eq!(held, vec![(PhysicalKey::new('e'), before)]);

    // ...and only a subsequently triggered voice picks up the new scale.
    release(&mut c, 'e');
    let KeyResponse::Played(after) = press(&mut c, 'e') else {
        panic!("expected a voice");
    };
    assert!(after > before, "major third must sit above minor third");
}

#[test]
fn piano_layout_maps_chromatically_whatever_the_scale() {
    let mut c = controller();
    assert!(c.set_layout(InputLayout::Piano));
    assert!(!c.scale_controls_enabled());

    let KeyResponse::Played(minor) = press(&mut c, '2') else {
        panic!("expected a voice");
    };
    release(&mut c, '2');

    c.set_scale_name("Major");
    let KeyResponse::Played(major) = press(&mut c, '2') else {
        panic!("expected a voice");
    };
    assert_eq!(minor, major);

    // Root C (3) + chromatic semitone 1: 440 * 2^(4/12)
    let expected = 440.0 * 2.0_f32.powf(4.0 / 12.0);
    assert!((minor - expected).abs() < 0.01);
}

#[test]
fn c_minor_defaults_play_c5_on_home_row() {
    let mut c = controller();

    let KeyResponse::Played(home) = press(&mut c, 'q') else {
        panic!("expected a voice");
    };
    assert!((home - 523.25).abs() < 0.01, "got {home}");

    let KeyResponse::Played(upper) = press(&mut c, '1') else {
        panic!("expected a voice");
    };
    assert!((upper - 1046.5).abs() < 0.01, "got {upper}");
}

#[test]
fn repress_creates_an_independent_voice() {
    let mut c = controller();
    press(&mut c, 'q');
    release(&mut c, 'q');
    press(&mut c, 'q');

    // One live registry entry at every instant; two distinct voices total.
    assert_eq!(c.held_count(), 1);
    let events = take_events();
    assert_eq!(events.len(), 3);
    let SinkEvent::On { id: first, frequency: f1 } = events[0] else {
        panic!("expected voice-on, got {:?}", events[0]);
    };
    assert_eq!(events[1], SinkEvent::Off { id: first });
    let SinkEvent::On { id: second, frequency: f2 } = events[2] else {
        panic!("expected voice-on, got {:?}", events[2]);
    };
    assert_ne!(first, second, "the re-press must be a fresh voice");
    assert_eq!(f1, f2);
}

#[test]
fn unknown_scale_name_falls_back_to_major() {
    let mut c = controller();
    c.set_scale_name("Foo");

    // Major degree 2 from root C (3): 440 * 2^(7/12)
    let KeyResponse::Played(freq) = press(&mut c, 'e') else {
        panic!("expected a voice");
    };
    let expected = 440.0 * 2.0_f32.powf(7.0 / 12.0);
    assert!((freq - expected).abs() < 0.01);
}

#[test]
fn unknown_root_key_falls_back_to_c() {
    let mut c = controller();
    c.set_root_key_name("G");
    c.set_root_key_name("H");

    let KeyResponse::Played(freq) = press(&mut c, 'q') else {
        panic!("expected a voice");
    };
    assert!((freq - 523.25).abs() < 0.01);
}

#[test]
fn release_all_clears_the_registry() {
    let mut c = controller();
    press(&mut c, 'q');
    press(&mut c, 'w');
    c.release_all();
    assert_eq!(c.held_count(), 0);
}
