#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Pitch Model
===========

Everything here is pure arithmetic on semitone offsets. A tone is described
by how many semitones it sits away from the 440 Hz anchor, and equal
temperament turns that count into a frequency:

    freq = 440 * 2^(semitones / 12)

A scale is ten degrees: one full octave of a diatonic scale plus the first
three degrees of the next octave, so a row of ten keys can span a little more
than an octave.

Root Keys
---------

The root-key table maps the 21 note names the UI offers (7 naturals, 7 sharps,
7 flats) onto 12 distinct semitone offsets. It is NOT an evenly spaced
chromatic map: each flat collides with the sharp of the letter below it
(Db == C#), while natural -> sharp is always a full semitone (C# - C == 1).
The table is kept exactly as the interface defined it, collisions and all;
tests pin the quirk so nobody "fixes" it into a clean 12-tone map.
*/

/// Tuning anchor in Hz. Offset 0 lands here.
pub const BASE_FREQ: f32 = 440.0;

/// Semitone offset of the default root key ("C").
pub const DEFAULT_ROOT_KEY: i32 = 3;

/// Ten scale degrees as semitone offsets from the root.
/// Invariant: non-decreasing, first element 0.
pub type ScaleDefinition = [i32; 10];

pub const MAJOR_SCALE: ScaleDefinition = [0, 2, 4, 5, 7, 9, 11, 12, 14, 16];
pub const MINOR_SCALE: ScaleDefinition = [0, 2, 3, 5, 7, 8, 10, 12, 14, 15];

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scale {
    #[default]
    Major,
    Minor,
}

impl Scale {
    pub fn definition(self) -> ScaleDefinition {
        match self {
            Scale::Major => MAJOR_SCALE,
            Scale::Minor => MINOR_SCALE,
        }
    }

    /// Parse a scale name as offered by the UI. Unknown names yield `None`;
    /// callers fall back to Major (see `Controller::set_scale_name`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Major" => Some(Scale::Major),
            "Minor" => Some(Scale::Minor),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Scale::Major => "Major",
            Scale::Minor => "Minor",
        }
    }
}

/// All root-key names the UI offers, in display order.
pub const ROOT_KEY_NAMES: [&str; 21] = [
    "Cb", "C", "C#", "Db", "D", "D#", "Eb", "E", "E#", "Fb", "F", "F#", "Gb",
    "G", "G#", "Ab", "A", "A#", "Bb", "B", "B#",
];

/// Semitone offset for a named root key, or `None` for an unknown name.
/// Callers fall back to "C" (offset 3).
///
/// Flats intentionally collide with the sharp of the letter below
/// (Db == C# == 4) while natural -> sharp steps a full semitone.
pub fn root_key_offset(name: &str) -> Option<i32> {
    match name {
        "Cb" => Some(2),
        "C" => Some(3),
        "C#" => Some(4),

        "Db" => Some(4),
        "D" => Some(5),
        "D#" => Some(6),

        "Eb" => Some(6),
        "E" => Some(7),
        "E#" => Some(8),

        "Fb" => Some(7),
        "F" => Some(8),
        "F#" => Some(9),

        "Gb" => Some(9),
        "G" => Some(10),
        "G#" => Some(11),

        "Ab" => Some(11),
        "A" => Some(12),
        "A#" => Some(13),

        "Bb" => Some(13),
        "B" => Some(14),
        "B#" => Some(15),

        _ => None,
    }
}

/// Frequency in Hz for a root key plus a degree offset.
///
/// `degree_offset` already encodes both the scale degree's semitone offset
/// and its octave displacement (`scale[degree] + 12 * octave_shift`).
/// Total over all integer inputs; always positive.
#[inline]
pub fn frequency(root_key: i32, degree_offset: i32) -> f32 {
    BASE_FREQ * 2.0_f32.powf((root_key + degree_offset) as f32 / 12.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_zero_is_base_freq() {
        assert_eq!(frequency(0, 0), BASE_FREQ);
    }

    #[test]
    fn twelve_semitones_double_the_frequency() {
        assert!((frequency(0, 12) - 2.0 * BASE_FREQ).abs() < 1e-3);
        assert!((frequency(12, 0) - 2.0 * BASE_FREQ).abs() < 1e-3);
        assert!((frequency(0, -12) - BASE_FREQ / 2.0).abs() < 1e-3);
    }

    #[test]
    fn frequency_matches_formula_for_all_degrees() {
        for scale in [MAJOR_SCALE, MINOR_SCALE] {
            for octave in -2..=2 {
                for degree in 0..10 {
                    let offset = scale[degree] + 12 * octave;
                    let expected =
                        BASE_FREQ * 2.0_f32.powf((3 + offset) as f32 / 12.0);
                    assert_eq!(frequency(3, offset), expected);
                }
            }
        }
    }

    #[test]
    fn c_minor_home_row_degree_zero_is_c5() {
        // Root "C" (3), octave 0, minor degree 0 -> ~523.25 Hz
        let freq = frequency(3, MINOR_SCALE[0]);
        assert!((freq - 523.25).abs() < 0.01, "got {freq}");
    }

    #[test]
    fn scales_are_non_decreasing_and_start_at_zero() {
        for scale in [MAJOR_SCALE, MINOR_SCALE] {
            assert_eq!(scale[0], 0);
            assert!(scale.windows(2).all(|w| w[0] <= w[1]));
        }
    }

    #[test]
    fn unknown_scale_name_yields_none() {
        assert_eq!(Scale::from_name("Major"), Some(Scale::Major));
        assert_eq!(Scale::from_name("Minor"), Some(Scale::Minor));
        assert_eq!(Scale::from_name("Foo"), None);
        assert_eq!(Scale::from_name("major"), None);
    }

    // The enharmonic quirk, pinned on purpose: flats collide with the sharp
    // of the letter below, naturals step a full semitone to their sharp.
    #[test]
    fn root_key_table_preserves_enharmonic_collisions() {
        assert_eq!(root_key_offset("Db"), root_key_offset("C#"));
        assert_eq!(root_key_offset("Eb"), root_key_offset("D#"));
        assert_eq!(root_key_offset("Gb"), root_key_offset("F#"));
        assert_eq!(root_key_offset("Ab"), root_key_offset("G#"));
        assert_eq!(root_key_offset("Bb"), root_key_offset("A#"));
        assert_eq!(root_key_offset("Fb"), root_key_offset("E"));
        assert_eq!(root_key_offset("Cb"), Some(2));

        assert_eq!(root_key_offset("C#").unwrap() - root_key_offset("C").unwrap(), 1);
        assert_eq!(root_key_offset("B#").unwrap() - root_key_offset("B").unwrap(), 1);
    }

    #[test]
    fn root_key_table_has_12_distinct_outputs_over_21_names() {
        let mut offsets: Vec<i32> = ROOT_KEY_NAMES
            .iter()
            .map(|name| root_key_offset(name).unwrap())
            .collect();
        assert_eq!(offsets.len(), 21);
        offsets.sort_unstable();
        offsets.dedup();
        assert_eq!(offsets.len(), 12, "expected 12 distinct semitone offsets");
    }

    #[test]
    fn unknown_root_key_yields_none() {
        assert_eq!(root_key_offset("H"), None);
        assert_eq!(root_key_offset(""), None);
    }
}
