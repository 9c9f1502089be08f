use std::collections::HashMap;

use evdev::KeyCode;

use super::{KeyMapError, KEY_COUNT};

/// Keys that participate in remapping and their dense index into the keymap.
/// The index equals the key's US layout HID usage, so a keymap row can be
/// read as "what does the US key with this usage produce".
const DENSE_KEYS: &[(KeyCode, u8)] = &[
    (KeyCode::KEY_A, 4),
    (KeyCode::KEY_B, 5),
    (KeyCode::KEY_C, 6),
    (KeyCode::KEY_D, 7),
    (KeyCode::KEY_E, 8),
    (KeyCode::KEY_F, 9),
    (KeyCode::KEY_G, 10),
    (KeyCode::KEY_H, 11),
    (KeyCode::KEY_I, 12),
    (KeyCode::KEY_J, 13),
    (KeyCode::KEY_K, 14),
    (KeyCode::KEY_L, 15),
    (KeyCode::KEY_M, 16),
    (KeyCode::KEY_N, 17),
    (KeyCode::KEY_O, 18),
    (KeyCode::KEY_P, 19),
    (KeyCode::KEY_Q, 20),
    (KeyCode::KEY_R, 21),
    (KeyCode::KEY_S, 22),
    (KeyCode::KEY_T, 23),
    (KeyCode::KEY_U, 24),
    (KeyCode::KEY_V, 25),
    (KeyCode::KEY_W, 26),
    (KeyCode::KEY_X, 27),
    (KeyCode::KEY_Y, 28),
    (KeyCode::KEY_Z, 29),
    (KeyCode::KEY_1, 30),
    (KeyCode::KEY_2, 31),
    (KeyCode::KEY_3, 32),
    (KeyCode::KEY_4, 33),
    (KeyCode::KEY_5, 34),
    (KeyCode::KEY_6, 35),
    (KeyCode::KEY_7, 36),
    (KeyCode::KEY_8, 37),
    (KeyCode::KEY_9, 38),
    (KeyCode::KEY_0, 39),
    (KeyCode::KEY_ENTER, 40),
    (KeyCode::KEY_ESC, 41),
    (KeyCode::KEY_BACKSPACE, 42),
    (KeyCode::KEY_TAB, 43),
    (KeyCode::KEY_SPACE, 44),
    (KeyCode::KEY_MINUS, 45),
    (KeyCode::KEY_EQUAL, 46),
    (KeyCode::KEY_LEFTBRACE, 47),
    (KeyCode::KEY_RIGHTBRACE, 48),
    // 49 (backslash) and 50 (102nd) are layer selectors
    (KeyCode::KEY_SEMICOLON, 51),
    (KeyCode::KEY_APOSTROPHE, 52),
    (KeyCode::KEY_GRAVE, 53),
    (KeyCode::KEY_COMMA, 54),
    (KeyCode::KEY_DOT, 55),
    (KeyCode::KEY_SLASH, 56),
    // 57 (capslock) is a layer selector
    (KeyCode::KEY_F1, 58),
    (KeyCode::KEY_F2, 59),
    (KeyCode::KEY_F3, 60),
    (KeyCode::KEY_F4, 61),
    (KeyCode::KEY_F5, 62),
    (KeyCode::KEY_F6, 63),
    (KeyCode::KEY_F7, 64),
    (KeyCode::KEY_F8, 65),
    (KeyCode::KEY_F9, 66),
    (KeyCode::KEY_F10, 67),
    (KeyCode::KEY_F11, 68),
    (KeyCode::KEY_F12, 69),
    // 70 (sysrq) is reserved for session control
    (KeyCode::KEY_SCROLLLOCK, 71),
    (KeyCode::KEY_PAUSE, 72),
    (KeyCode::KEY_INSERT, 73),
    (KeyCode::KEY_HOME, 74),
    (KeyCode::KEY_PAGEUP, 75),
    (KeyCode::KEY_DELETE, 76),
    (KeyCode::KEY_END, 77),
    (KeyCode::KEY_PAGEDOWN, 78),
    (KeyCode::KEY_RIGHT, 79),
    (KeyCode::KEY_LEFT, 80),
    (KeyCode::KEY_DOWN, 81),
    (KeyCode::KEY_UP, 82),
    (KeyCode::KEY_NUMLOCK, 83),
    (KeyCode::KEY_KPSLASH, 84),
    (KeyCode::KEY_KPASTERISK, 85),
    (KeyCode::KEY_KPMINUS, 86),
    (KeyCode::KEY_KPPLUS, 87),
    (KeyCode::KEY_KPENTER, 88),
    (KeyCode::KEY_KP1, 89),
    (KeyCode::KEY_KP2, 90),
    (KeyCode::KEY_KP3, 91),
    (KeyCode::KEY_KP4, 92),
    (KeyCode::KEY_KP5, 93),
    (KeyCode::KEY_KP6, 94),
    (KeyCode::KEY_KP7, 95),
    (KeyCode::KEY_KP8, 96),
    (KeyCode::KEY_KP9, 97),
    (KeyCode::KEY_KP0, 98),
    (KeyCode::KEY_KPDOT, 99),
];

/// Lookup from raw key code to dense keymap index
#[derive(Debug, Clone)]
pub struct KeyIndex {
    indices: HashMap<u16, u8>,
}

impl KeyIndex {
    /// Build the lookup, validating that no key code or dense index appears
    /// twice and every index fits in the keymap.
    pub fn new() -> Result<Self, KeyMapError> {
        Self::from_pairs(DENSE_KEYS)
    }

    pub(crate) fn from_pairs(pairs: &[(KeyCode, u8)]) -> Result<Self, KeyMapError> {
        let mut indices = HashMap::with_capacity(pairs.len());
        let mut seen = [false; KEY_COUNT];
        for (key, index) in pairs {
            if *index as usize >= KEY_COUNT {
                return Err(KeyMapError::IndexOutOfRange(*index as usize));
            }
            if seen[*index as usize] {
                return Err(KeyMapError::DuplicateIndex(*index));
            }
            seen[*index as usize] = true;
            if indices.insert(key.code(), *index).is_some() {
                return Err(KeyMapError::DuplicateKeyCode(key.code()));
            }
        }
        Ok(Self { indices })
    }

    /// Returns the dense index for the given key code, if the key is remapped.
    pub fn dense_index(&self, code: u16) -> Option<u8> {
        self.indices.get(&code).copied()
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}
