use evdev::{EventType, KeyCode, RelativeAxisCode};

use crate::drivers::bthid::hid_report::HidReport;
use crate::keymap::{index::KeyIndex, KeyMapEntry, KeyMapTable};

use super::event::RawInputEvent;
use super::state::{modifier_bit, InputState, MOD_LEFT_ALT, MOD_LEFT_CTRL, MOD_RIGHT_CTRL};

/// Key reserved for session control (mute, disconnect, credential)
const CONTROL_KEY: KeyCode = KeyCode::KEY_SYSRQ;

/// Result of translating a single raw event
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Nothing needs to be sent
    Nothing,
    /// Send a single report
    Report(HidReport),
    /// Send each report in order, stopping at the first failure
    Burst(Vec<HidReport>),
    /// Send the final report if connected, then end the session. If
    /// `shutdown` is set the process should exit afterwards.
    Disconnect {
        final_report: HidReport,
        shutdown: bool,
    },
}

/// Translates raw input events into HID reports using the configured keymap.
#[derive(Debug)]
pub struct EventTranslator {
    index: KeyIndex,
    keymap: KeyMapTable,
    credential: Vec<KeyMapEntry>,
    muted: bool,
}

impl EventTranslator {
    pub fn new(
        index: KeyIndex,
        keymap: KeyMapTable,
        credential: Vec<KeyMapEntry>,
        muted: bool,
    ) -> Self {
        Self {
            index,
            keymap,
            credential,
            muted,
        }
    }

    /// Whether keyboard reports are currently held back
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Translate one raw event, updating the given state.
    pub fn translate(&mut self, state: &mut InputState, event: RawInputEvent) -> Outcome {
        log::trace!("Received event: {:?}", event);
        match event.event_type() {
            EventType::KEY => self.translate_key(state, event.code, event.value),
            EventType::RELATIVE => translate_motion(state, event.code, event.value),
            _ => Outcome::Nothing,
        }
    }

    fn translate_key(&mut self, state: &mut InputState, code: u16, value: i32) -> Outcome {
        let key = KeyCode::new(code);
        match key {
            KeyCode::BTN_LEFT | KeyCode::BTN_RIGHT | KeyCode::BTN_MIDDLE => {
                let bit = 1 << (code & 0x03);
                state.mouse.update_button(bit, value == 1);
                return Outcome::Report(state.mouse.report());
            }
            CONTROL_KEY => return self.control_key(state, value),
            _ => (),
        }

        let modifier = modifier_bit(code);
        let dense_index = self.index.dense_index(code);
        if modifier.is_none() && dense_index.is_none() {
            log::trace!("Ignoring unknown key: {:?}", key);
            return Outcome::Nothing;
        }

        if let Some(bit) = modifier {
            state.modifiers.update(bit, value >= 1);
        }

        let layer = state.modifiers.layer();
        let entry = dense_index.and_then(|index| self.keymap.lookup(index, layer));
        let modifier_byte = match entry {
            Some(entry) => {
                match value {
                    1 => {
                        if !state.keys.insert(entry.usage) && !state.keys.contains(entry.usage) {
                            log::debug!("Too many keys pressed, dropping usage {:#04x}", entry.usage);
                        }
                    }
                    // Released by the usage of the current layer. A key pressed
                    // on another layer stays held until a matching release.
                    0 => {
                        state.keys.remove(entry.usage);
                    }
                    // Key repeat is handled by the host
                    _ => (),
                }
                entry.modifier
            }
            None => state.modifiers.output_byte(),
        };

        if self.muted {
            return Outcome::Nothing;
        }
        Outcome::Report(HidReport::keyboard(modifier_byte, state.keys.as_slice()))
    }

    /// Handle the control key. Only the release is acted on.
    fn control_key(&mut self, state: &InputState, value: i32) -> Outcome {
        if value != 0 {
            return Outcome::Nothing;
        }

        if state.modifiers.is_held(MOD_LEFT_CTRL) {
            let shutdown = state.modifiers.is_held(MOD_LEFT_ALT);
            log::info!("Disconnect requested (shutdown: {shutdown})");
            return Outcome::Disconnect {
                final_report: HidReport::keyboard_released(),
                shutdown,
            };
        }

        if state.modifiers.is_held(MOD_RIGHT_CTRL) {
            if self.muted {
                return Outcome::Nothing;
            }
            log::debug!("Sending credential sequence of {} keys", self.credential.len());
            let burst = self
                .credential
                .iter()
                .map(|entry| HidReport::keyboard(entry.modifier, &[entry.usage]))
                .collect();
            return Outcome::Burst(burst);
        }

        self.muted = !self.muted;
        if self.muted {
            log::info!("Keyboard muted");
        } else {
            log::info!("Keyboard unmuted");
        }
        Outcome::Nothing
    }
}

/// Translate relative motion into a mouse report. Axes not carried by the
/// event are reported as zero.
fn translate_motion(state: &mut InputState, code: u16, value: i32) -> Outcome {
    let delta = value.clamp(i8::MIN as i32, i8::MAX as i32) as i8;
    match RelativeAxisCode(code) {
        RelativeAxisCode::REL_X => state.mouse.set_motion(delta, 0, 0),
        RelativeAxisCode::REL_Y => state.mouse.set_motion(0, delta, 0),
        RelativeAxisCode::REL_Z | RelativeAxisCode::REL_WHEEL => {
            state.mouse.set_motion(0, 0, delta)
        }
        _ => return Outcome::Nothing,
    }
    Outcome::Report(state.mouse.report())
}
