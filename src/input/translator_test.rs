use std::error::Error;

use evdev::{EventType, KeyCode, RelativeAxisCode};

use crate::drivers::bthid::hid_report::HidReport;
use crate::input::event::RawInputEvent;
use crate::input::state::{InputState, ModifierState, PressedKeySet};
use crate::input::state::{MOD_102ND, MOD_BACKSLASH, MOD_CAPSLOCK, MOD_LEFT_SHIFT, MOD_RIGHT_ALT};
use crate::input::translator::{EventTranslator, Outcome};
use crate::keymap::{index::KeyIndex, KeyMapEntry, KeyMapTable};

fn translator(muted: bool) -> Result<EventTranslator, Box<dyn Error>> {
    let credential = vec![KeyMapEntry::new(0x02, 0x04), KeyMapEntry::new(0x00, 0x05)];
    Ok(EventTranslator::new(
        KeyIndex::new()?,
        KeyMapTable::builtin()?,
        credential,
        muted,
    ))
}

fn key(code: KeyCode, value: i32) -> RawInputEvent {
    RawInputEvent::new(EventType::KEY, code.code(), value)
}

fn rel(axis: RelativeAxisCode, value: i32) -> RawInputEvent {
    RawInputEvent::new(EventType::RELATIVE, axis.0, value)
}

#[test]
fn test_base_layer_press_and_release() -> Result<(), Box<dyn Error>> {
    let mut translator = translator(false)?;
    let mut state = InputState::default();

    let outcome = translator.translate(&mut state, key(KeyCode::KEY_A, 1));
    assert_eq!(outcome, Outcome::Report(HidReport::keyboard(0x00, &[0x18])));
    assert_eq!(state.keys.as_slice(), &[0x18]);

    let outcome = translator.translate(&mut state, key(KeyCode::KEY_A, 0));
    assert_eq!(outcome, Outcome::Report(HidReport::keyboard(0x00, &[])));
    assert!(state.keys.is_empty());
    Ok(())
}

#[test]
fn test_shift_selects_second_layer() -> Result<(), Box<dyn Error>> {
    let mut translator = translator(false)?;
    let mut state = InputState::default();

    // Modifier keys have no mapping and report the held modifier byte
    let outcome = translator.translate(&mut state, key(KeyCode::KEY_LEFTSHIFT, 1));
    assert_eq!(outcome, Outcome::Report(HidReport::keyboard(0x02, &[])));

    let outcome = translator.translate(&mut state, key(KeyCode::KEY_A, 1));
    assert_eq!(outcome, Outcome::Report(HidReport::keyboard(0x02, &[0x18])));

    // Releasing shift keeps the key held
    let outcome = translator.translate(&mut state, key(KeyCode::KEY_LEFTSHIFT, 0));
    assert_eq!(outcome, Outcome::Report(HidReport::keyboard(0x00, &[0x18])));
    assert_eq!(state.modifiers.bits(), 0);
    Ok(())
}

#[test]
fn test_third_layer_uses_table_modifier() -> Result<(), Box<dyn Error>> {
    let mut translator = translator(false)?;
    let mut state = InputState::default();

    translator.translate(&mut state, key(KeyCode::KEY_CAPSLOCK, 1));
    let outcome = translator.translate(&mut state, key(KeyCode::KEY_A, 1));
    assert_eq!(outcome, Outcome::Report(HidReport::keyboard(0x06, &[0x24])));
    Ok(())
}

#[test]
fn test_ninth_key_is_dropped() -> Result<(), Box<dyn Error>> {
    let mut translator = translator(false)?;
    let mut state = InputState::default();
    let keys = [
        KeyCode::KEY_A,
        KeyCode::KEY_B,
        KeyCode::KEY_C,
        KeyCode::KEY_D,
        KeyCode::KEY_E,
        KeyCode::KEY_F,
        KeyCode::KEY_G,
        KeyCode::KEY_H,
        KeyCode::KEY_I,
    ];
    for code in keys {
        translator.translate(&mut state, key(code, 1));
    }
    assert_eq!(
        state.keys.as_slice(),
        &[0x18, 0x1C, 0x34, 0x04, 0x0F, 0x08, 0x12, 0x16]
    );
    assert!(!state.keys.contains(0x0A));
    Ok(())
}

#[test]
fn test_repeat_and_unknown_keys() -> Result<(), Box<dyn Error>> {
    let mut translator = translator(false)?;
    let mut state = InputState::default();

    translator.translate(&mut state, key(KeyCode::KEY_A, 1));
    let outcome = translator.translate(&mut state, key(KeyCode::KEY_A, 2));
    assert_eq!(outcome, Outcome::Report(HidReport::keyboard(0x00, &[0x18])));
    assert_eq!(state.keys.len(), 1);

    let before = state;
    let outcome = translator.translate(&mut state, key(KeyCode::KEY_F13, 1));
    assert_eq!(outcome, Outcome::Nothing);
    assert_eq!(state, before);

    let sync = RawInputEvent::new(EventType::SYNCHRONIZATION, 0, 0);
    assert_eq!(translator.translate(&mut state, sync), Outcome::Nothing);
    Ok(())
}

#[test]
fn test_mute_toggle() -> Result<(), Box<dyn Error>> {
    let mut translator = translator(true)?;
    let mut state = InputState::default();

    // State is still tracked while muted
    let outcome = translator.translate(&mut state, key(KeyCode::KEY_A, 1));
    assert_eq!(outcome, Outcome::Nothing);
    assert_eq!(state.keys.as_slice(), &[0x18]);

    // The control key acts on release only
    assert_eq!(
        translator.translate(&mut state, key(KeyCode::KEY_SYSRQ, 1)),
        Outcome::Nothing
    );
    assert!(translator.is_muted());
    translator.translate(&mut state, key(KeyCode::KEY_SYSRQ, 0));
    assert!(!translator.is_muted());

    let outcome = translator.translate(&mut state, key(KeyCode::KEY_A, 0));
    assert_eq!(outcome, Outcome::Report(HidReport::keyboard(0x00, &[])));
    Ok(())
}

#[test]
fn test_disconnect_combinations() -> Result<(), Box<dyn Error>> {
    let mut translator = translator(true)?;
    let mut state = InputState::default();

    translator.translate(&mut state, key(KeyCode::KEY_LEFTCTRL, 1));
    let outcome = translator.translate(&mut state, key(KeyCode::KEY_SYSRQ, 0));
    assert_eq!(
        outcome,
        Outcome::Disconnect {
            final_report: HidReport::keyboard_released(),
            shutdown: false,
        }
    );

    translator.translate(&mut state, key(KeyCode::KEY_LEFTALT, 1));
    let outcome = translator.translate(&mut state, key(KeyCode::KEY_SYSRQ, 0));
    assert_eq!(
        outcome,
        Outcome::Disconnect {
            final_report: HidReport::keyboard_released(),
            shutdown: true,
        }
    );
    // Mute state is untouched by the disconnect combination
    assert!(translator.is_muted());
    Ok(())
}

#[test]
fn test_credential_burst() -> Result<(), Box<dyn Error>> {
    let mut translator = translator(true)?;
    let mut state = InputState::default();

    translator.translate(&mut state, key(KeyCode::KEY_RIGHTCTRL, 1));
    let outcome = translator.translate(&mut state, key(KeyCode::KEY_SYSRQ, 0));
    assert_eq!(outcome, Outcome::Nothing);
    assert!(translator.is_muted());

    translator.set_muted(false);
    let outcome = translator.translate(&mut state, key(KeyCode::KEY_SYSRQ, 0));
    assert_eq!(
        outcome,
        Outcome::Burst(vec![
            HidReport::keyboard(0x02, &[0x04]),
            HidReport::keyboard(0x00, &[0x05]),
        ])
    );
    Ok(())
}

#[test]
fn test_mouse_events() -> Result<(), Box<dyn Error>> {
    // Mouse reports are sent even while muted
    let mut translator = translator(true)?;
    let mut state = InputState::default();

    let outcome = translator.translate(&mut state, key(KeyCode::BTN_LEFT, 1));
    assert_eq!(outcome, Outcome::Report(HidReport::mouse(0x01, 0, 0, 0)));

    let outcome = translator.translate(&mut state, rel(RelativeAxisCode::REL_X, 300));
    assert_eq!(outcome, Outcome::Report(HidReport::mouse(0x01, 127, 0, 0)));

    let outcome = translator.translate(&mut state, key(KeyCode::BTN_MIDDLE, 1));
    assert_eq!(outcome, Outcome::Report(HidReport::mouse(0x05, 0, 0, 0)));

    let outcome = translator.translate(&mut state, rel(RelativeAxisCode::REL_Y, -4));
    assert_eq!(outcome, Outcome::Report(HidReport::mouse(0x05, 0, -4, 0)));

    let outcome = translator.translate(&mut state, rel(RelativeAxisCode::REL_WHEEL, -500));
    assert_eq!(outcome, Outcome::Report(HidReport::mouse(0x05, 0, 0, -128)));

    let outcome = translator.translate(&mut state, key(KeyCode::BTN_LEFT, 0));
    assert_eq!(outcome, Outcome::Report(HidReport::mouse(0x04, 0, 0, 0)));

    let outcome = translator.translate(&mut state, rel(RelativeAxisCode::REL_HWHEEL, 1));
    assert_eq!(outcome, Outcome::Nothing);
    Ok(())
}

#[test]
fn test_translation_is_deterministic() -> Result<(), Box<dyn Error>> {
    let events = [
        key(KeyCode::KEY_LEFTSHIFT, 1),
        key(KeyCode::KEY_H, 1),
        key(KeyCode::KEY_LEFTSHIFT, 0),
        key(KeyCode::KEY_H, 0),
        rel(RelativeAxisCode::REL_X, 12),
        key(KeyCode::KEY_102ND, 1),
        key(KeyCode::KEY_J, 1),
        key(KeyCode::KEY_J, 0),
    ];

    let run = || -> Result<Vec<Outcome>, Box<dyn Error>> {
        let mut translator = translator(false)?;
        let mut state = InputState::default();
        Ok(events
            .iter()
            .map(|event| translator.translate(&mut state, *event))
            .collect())
    };
    assert_eq!(run()?, run()?);
    Ok(())
}

#[test]
fn test_pressed_keys_stay_bounded() -> Result<(), Box<dyn Error>> {
    let mut translator = translator(false)?;
    let mut state = InputState::default();
    let keys = [
        KeyCode::KEY_A,
        KeyCode::KEY_S,
        KeyCode::KEY_D,
        KeyCode::KEY_F,
        KeyCode::KEY_J,
        KeyCode::KEY_K,
        KeyCode::KEY_L,
        KeyCode::KEY_SEMICOLON,
        KeyCode::KEY_Q,
        KeyCode::KEY_W,
        KeyCode::KEY_LEFTSHIFT,
        KeyCode::KEY_CAPSLOCK,
    ];

    // Simple linear congruential sequence of presses and releases
    let mut seed: u32 = 17;
    for _ in 0..2000 {
        seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        let code = keys[(seed >> 16) as usize % keys.len()];
        let value = ((seed >> 8) % 3) as i32;
        translator.translate(&mut state, key(code, value));

        let pressed = state.keys.as_slice();
        assert!(pressed.len() <= 8);
        for (i, usage) in pressed.iter().enumerate() {
            assert!(!pressed[i + 1..].contains(usage));
        }
    }
    Ok(())
}

#[test]
fn test_layer_resolution() {
    let layer = |bits| ModifierState::new(bits).layer();
    assert_eq!(layer(0), 0);
    assert_eq!(layer(0x0001 | 0x0004 | 0x0008 | 0x0010 | 0x0080), 0);
    assert_eq!(layer(MOD_LEFT_SHIFT), 1);
    assert_eq!(layer(MOD_CAPSLOCK), 2);
    assert_eq!(layer(MOD_BACKSLASH), 2);
    assert_eq!(layer(MOD_RIGHT_ALT), 3);
    assert_eq!(layer(MOD_102ND), 3);
    assert_eq!(layer(MOD_LEFT_SHIFT | MOD_CAPSLOCK), 4);
    assert_eq!(layer(MOD_CAPSLOCK | MOD_102ND), 5);
    assert_eq!(layer(MOD_LEFT_SHIFT | MOD_CAPSLOCK | MOD_RIGHT_ALT), 5);
    assert_eq!(layer(MOD_LEFT_SHIFT | MOD_RIGHT_ALT), 3);
}

#[test]
fn test_modifier_update_is_idempotent() {
    let mut modifiers = ModifierState::default();
    modifiers.update(MOD_CAPSLOCK, true);
    modifiers.update(MOD_CAPSLOCK, true);
    assert_eq!(modifiers.bits(), MOD_CAPSLOCK);
    modifiers.update(MOD_CAPSLOCK, false);
    assert_eq!(modifiers.bits(), 0);
    // Layer selectors are not part of the output byte
    modifiers.update(MOD_BACKSLASH, true);
    modifiers.update(MOD_LEFT_SHIFT, true);
    assert_eq!(modifiers.output_byte(), 0x02);
}

#[test]
fn test_pressed_key_set_compacts_on_remove() {
    let mut keys = PressedKeySet::default();
    for usage in [1, 2, 3, 4] {
        assert!(keys.insert(usage));
    }
    assert!(!keys.insert(3));
    assert!(keys.remove(2));
    assert_eq!(keys.as_slice(), &[1, 3, 4]);
    assert!(!keys.remove(9));
    assert_eq!(keys.as_slice(), &[1, 3, 4]);
    keys.clear();
    assert!(keys.is_empty());
}

#[test]
fn test_release_on_other_layer_keeps_key_held() -> Result<(), Box<dyn Error>> {
    let mut translator = translator(false)?;
    let mut state = InputState::default();
    let table = KeyMapTable::builtin()?;
    let third_layer = table.lookup(6, 2).ok_or("C unmapped on layer 3")?;
    let base_layer = table.lookup(6, 0).ok_or("C unmapped on layer 1")?;
    assert_ne!(third_layer.usage, base_layer.usage);

    translator.translate(&mut state, key(KeyCode::KEY_CAPSLOCK, 1));
    translator.translate(&mut state, key(KeyCode::KEY_C, 1));
    translator.translate(&mut state, key(KeyCode::KEY_CAPSLOCK, 0));
    let outcome = translator.translate(&mut state, key(KeyCode::KEY_C, 0));

    assert_eq!(state.keys.as_slice(), &[third_layer.usage]);
    assert_eq!(
        outcome,
        Outcome::Report(HidReport::keyboard(base_layer.modifier, &[third_layer.usage]))
    );
    Ok(())
}
