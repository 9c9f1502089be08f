use evdev::KeyCode;

use crate::drivers::bthid::hid_report::{HidReport, KEY_SLOTS};

// Output modifier bits, identical to the HID keyboard modifier byte
pub const MOD_LEFT_CTRL: u16 = 0x0001;
pub const MOD_LEFT_SHIFT: u16 = 0x0002;
pub const MOD_LEFT_ALT: u16 = 0x0004;
pub const MOD_LEFT_META: u16 = 0x0008;
pub const MOD_RIGHT_CTRL: u16 = 0x0010;
pub const MOD_RIGHT_SHIFT: u16 = 0x0020;
pub const MOD_RIGHT_ALT: u16 = 0x0040;
pub const MOD_RIGHT_META: u16 = 0x0080;
// Layer selector bits, never reported to the host directly
pub const MOD_CAPSLOCK: u16 = 0x0100;
pub const MOD_BACKSLASH: u16 = 0x0200;
pub const MOD_102ND: u16 = 0x0400;

/// Layer selector groups
pub const LAYER_GROUP_1: u16 = MOD_LEFT_SHIFT | MOD_RIGHT_SHIFT;
pub const LAYER_GROUP_2: u16 = MOD_CAPSLOCK | MOD_BACKSLASH;
pub const LAYER_GROUP_3: u16 = MOD_RIGHT_ALT | MOD_102ND;

/// Returns the modifier bit owned by the given key code
pub fn modifier_bit(code: u16) -> Option<u16> {
    let bit = match KeyCode::new(code) {
        KeyCode::KEY_LEFTCTRL => MOD_LEFT_CTRL,
        KeyCode::KEY_LEFTSHIFT => MOD_LEFT_SHIFT,
        KeyCode::KEY_LEFTALT => MOD_LEFT_ALT,
        KeyCode::KEY_LEFTMETA => MOD_LEFT_META,
        KeyCode::KEY_RIGHTCTRL => MOD_RIGHT_CTRL,
        KeyCode::KEY_RIGHTSHIFT => MOD_RIGHT_SHIFT,
        KeyCode::KEY_RIGHTALT => MOD_RIGHT_ALT,
        KeyCode::KEY_RIGHTMETA => MOD_RIGHT_META,
        KeyCode::KEY_CAPSLOCK => MOD_CAPSLOCK,
        KeyCode::KEY_BACKSLASH => MOD_BACKSLASH,
        KeyCode::KEY_102ND => MOD_102ND,
        _ => return None,
    };
    Some(bit)
}

/// Bitmask of currently held modifier and layer selector keys
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ModifierState(u16);

impl ModifierState {
    pub fn new(bits: u16) -> Self {
        Self(bits)
    }

    pub fn bits(&self) -> u16 {
        self.0
    }

    /// Clear the given bit, then set it again if the key is held. Repeat
    /// events leave the state unchanged.
    pub fn update(&mut self, bit: u16, held: bool) {
        self.0 &= !bit;
        if held {
            self.0 |= bit;
        }
    }

    pub fn is_held(&self, bit: u16) -> bool {
        self.0 & bit == bit
    }

    /// The held output modifiers as a HID modifier byte
    pub fn output_byte(&self) -> u8 {
        (self.0 & 0x00FF) as u8
    }

    /// Resolve the active remap layer. Combined layers take precedence over
    /// single group layers.
    pub fn layer(&self) -> usize {
        let group_1 = self.0 & LAYER_GROUP_1 != 0;
        let group_2 = self.0 & LAYER_GROUP_2 != 0;
        let group_3 = self.0 & LAYER_GROUP_3 != 0;

        let mut layer = 0;
        if group_1 {
            layer = 1;
        }
        if group_2 {
            layer = 2;
        }
        if group_3 {
            layer = 3;
        }
        if group_1 && group_2 {
            layer = 4;
        }
        if group_2 && group_3 {
            layer = 5;
        }
        layer
    }
}

/// Key usages currently reported as held, in press order.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PressedKeySet {
    keys: [u8; KEY_SLOTS],
    len: usize,
}

impl PressedKeySet {
    /// Add the usage if it is not already held. Returns false if the usage
    /// was already present or every slot is taken.
    pub fn insert(&mut self, usage: u8) -> bool {
        if self.contains(usage) || self.len >= KEY_SLOTS {
            return false;
        }
        self.keys[self.len] = usage;
        self.len += 1;
        true
    }

    /// Remove the usage, shifting later usages left. Returns false if the
    /// usage was not held.
    pub fn remove(&mut self, usage: u8) -> bool {
        let Some(position) = self.as_slice().iter().position(|key| *key == usage) else {
            return false;
        };
        self.keys.copy_within(position + 1..self.len, position);
        self.len -= 1;
        self.keys[self.len] = 0;
        true
    }

    pub fn contains(&self, usage: u8) -> bool {
        self.as_slice().contains(&usage)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.keys[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Mouse button mask plus the deltas of the last motion event
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MouseState {
    pub buttons: u8,
    pub dx: i8,
    pub dy: i8,
    pub dz: i8,
}

impl MouseState {
    /// Record a button transition. The bit is set only for a press.
    pub fn update_button(&mut self, bit: u8, pressed: bool) {
        self.buttons &= !bit;
        if pressed {
            self.buttons |= bit;
        }
        self.set_motion(0, 0, 0);
    }

    /// Replace the per event deltas
    pub fn set_motion(&mut self, dx: i8, dy: i8, dz: i8) {
        self.dx = dx;
        self.dy = dy;
        self.dz = dz;
    }

    pub fn report(&self) -> HidReport {
        HidReport::mouse(self.buttons, self.dx, self.dy, self.dz)
    }
}

/// Live input state of a session
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct InputState {
    pub modifiers: ModifierState,
    pub keys: PressedKeySet,
    pub mouse: MouseState,
}

impl InputState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
