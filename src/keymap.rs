use std::collections::HashMap;
use std::sync::LazyLock;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::pitch::ScaleDefinition;

/*
Key Mapping Table
=================

Two layouts translate a physical key into a semitone offset:

Standard: four rows of ten keys each play scale degrees 0-9 of the active
scale, one octave band per row.

    1 2 3 4 5 6 7 8 9 0    octave +1
    q w e r t y u i o p    octave  0
    a s d f g h j k l ;    octave -1
    z x c v b n m , . /    octave -2

Piano: a fixed chromatic map reproducing piano geometry across two row pairs
(digits = upper black keys, qwerty = upper white keys, home = lower black
keys, bottom = lower white keys), about one and a half octaves per pair.
The scale setting plays no part here.

Both tables are built once into hash maps; lookups never branch per key.
*/

/// Opaque identity of a physical keyboard key, stable for the session.
/// Normalized to lowercase so a shifted press and its release match.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PhysicalKey(char);

impl PhysicalKey {
    pub fn new(c: char) -> Self {
        Self(c.to_ascii_lowercase())
    }

    pub fn as_char(self) -> char {
        self.0
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputLayout {
    #[default]
    Standard,
    Piano,
}

impl InputLayout {
    /// Parse a layout name as offered by the UI ("Keyboard" | "Piano").
    /// Unknown names yield `None`; callers fall back to Standard.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Keyboard" => Some(InputLayout::Standard),
            "Piano" => Some(InputLayout::Piano),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            InputLayout::Standard => "Keyboard",
            InputLayout::Piano => "Piano",
        }
    }
}

/// Number of octave bands the standard layout maps. The reduced variant
/// drops the digit row (octave +1) and keeps the three lower rows.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OctaveBands {
    Three,
    #[default]
    Four,
}

/// Feature toggles distinguishing the full and reduced keyboard variants.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeymapOptions {
    pub octave_bands: OctaveBands,
    /// When false, `set_layout` is refused and Standard stays active.
    pub layout_switching: bool,
}

impl Default for KeymapOptions {
    fn default() -> Self {
        Self {
            octave_bands: OctaveBands::Four,
            layout_switching: true,
        }
    }
}

/// Key rows in screen order, top to bottom. Shared by the lookup tables and
/// the UI keyboard grid.
pub const KEY_ROWS: [&str; 4] = ["1234567890", "qwertyuiop", "asdfghjkl;", "zxcvbnm,./"];

/// Octave band of each row in `KEY_ROWS`, standard layout.
const STANDARD_BANDS: [i32; 4] = [1, 0, -1, -2];

/// Standard layout: key -> (scale degree 0-9, octave band).
static STANDARD_MAP: LazyLock<HashMap<char, (usize, i32)>> = LazyLock::new(|| {
    let mut map = HashMap::new();
    for (row, &band) in KEY_ROWS.iter().zip(STANDARD_BANDS.iter()) {
        for (degree, key) in row.chars().enumerate() {
            map.insert(key, (degree, band));
        }
    }
    map
});

/// Piano layout: key -> (chromatic semitone offset, octave band).
///
/// White keys run 0..16 across each ten-key row; the black keys sit on the
/// row above, staggered like a real keyboard (no key over the E-F and B-C
/// gaps). The upper pair (digits over qwerty) and the lower pair (home row
/// over the bottom row) are an octave apart.
static PIANO_MAP: LazyLock<HashMap<char, (i32, i32)>> = LazyLock::new(|| {
    const WHITE: [i32; 10] = [0, 2, 4, 5, 7, 9, 11, 12, 14, 16];
    const BLACK: [i32; 7] = [1, 3, 6, 8, 10, 13, 15];
    const UPPER_BLACK_KEYS: [char; 7] = ['2', '3', '5', '6', '7', '9', '0'];
    const LOWER_BLACK_KEYS: [char; 7] = ['s', 'd', 'g', 'h', 'j', 'l', ';'];

    let mut map = HashMap::new();
    for (key, semis) in "qwertyuiop".chars().zip(WHITE) {
        map.insert(key, (semis, 0));
    }
    for (key, semis) in UPPER_BLACK_KEYS.into_iter().zip(BLACK) {
        map.insert(key, (semis, 0));
    }
    for (key, semis) in "zxcvbnm,./".chars().zip(WHITE) {
        map.insert(key, (semis, -1));
    }
    for (key, semis) in LOWER_BLACK_KEYS.into_iter().zip(BLACK) {
        map.insert(key, (semis, -1));
    }
    map
});

/// Total semitone offset for a physical key under the given layout and
/// configuration, or `None` for a key with no mapping.
pub fn degree_offset(
    layout: InputLayout,
    key: PhysicalKey,
    scale: &ScaleDefinition,
    octave: i32,
    options: &KeymapOptions,
) -> Option<i32> {
    match layout {
        InputLayout::Standard => {
            let &(degree, band) = STANDARD_MAP.get(&key.as_char())?;
            if band == 1 && options.octave_bands == OctaveBands::Three {
                return None;
            }
            Some(scale[degree] + 12 * (octave + band))
        }
        InputLayout::Piano => {
            let &(semis, band) = PIANO_MAP.get(&key.as_char())?;
            Some(semis + 12 * (octave + band))
        }
    }
}
