use std::error::Error;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::os::unix::fs::FileTypeExt;
use std::time::Duration;

use evdev::{EventType, KeyCode};

use crate::input::event::{RawInputEvent, RECORD_SIZE};
use crate::input::multiplexer::{EventQueue, InputMultiplexer};
use crate::input::source::fifo::FifoSource;
use crate::input::source::{EventSource, InputError};

fn press(code: KeyCode) -> RawInputEvent {
    RawInputEvent::new(EventType::KEY, code.code(), 1)
}

#[test]
fn test_record_decoding() {
    let event = RawInputEvent::new(EventType::RELATIVE, 0x08, -3);
    let bytes = event.to_bytes();
    assert_eq!(bytes.len(), RECORD_SIZE);
    assert_eq!(RawInputEvent::from_bytes(&bytes), Some(event));
    assert_eq!(RawInputEvent::from_bytes(&bytes[..RECORD_SIZE - 1]), None);
}

#[test]
fn test_fifo_events_are_delivered_in_order() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("input");
    let source = FifoSource::open(&path)?;
    assert!(fs::metadata(&path)?.file_type().is_fifo());

    let sources: Vec<Box<dyn EventSource>> = vec![Box::new(source)];
    let mut multiplexer = InputMultiplexer::new(sources)?;

    let mut writer = OpenOptions::new().write(true).open(&path)?;
    writer.write_all(&press(KeyCode::KEY_A).to_bytes())?;
    writer.write_all(&press(KeyCode::KEY_B).to_bytes())?;

    let timeout = Duration::from_millis(100);
    assert_eq!(multiplexer.next_event(timeout)?, Some(press(KeyCode::KEY_A)));
    assert_eq!(multiplexer.next_event(timeout)?, Some(press(KeyCode::KEY_B)));
    assert_eq!(multiplexer.next_event(Duration::from_millis(10))?, None);
    Ok(())
}

#[test]
fn test_short_records_are_discarded() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("input");
    let sources: Vec<Box<dyn EventSource>> = vec![Box::new(FifoSource::open(&path)?)];
    let mut multiplexer = InputMultiplexer::new(sources)?;

    let mut writer = OpenOptions::new().write(true).open(&path)?;
    writer.write_all(&[0x01, 0x02, 0x03])?;
    assert_eq!(multiplexer.next_event(Duration::from_millis(100))?, None);

    writer.write_all(&press(KeyCode::KEY_C).to_bytes())?;
    assert_eq!(
        multiplexer.next_event(Duration::from_millis(100))?,
        Some(press(KeyCode::KEY_C))
    );
    Ok(())
}

#[test]
fn test_drain_consumes_everything() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("input");
    let sources: Vec<Box<dyn EventSource>> = vec![Box::new(FifoSource::open(&path)?)];
    let mut multiplexer = InputMultiplexer::new(sources)?;

    let mut writer = OpenOptions::new().write(true).open(&path)?;
    for code in [KeyCode::KEY_A, KeyCode::KEY_B, KeyCode::KEY_C] {
        writer.write_all(&press(code).to_bytes())?;
    }

    let drained = multiplexer.drain()?;
    assert_eq!(drained.len(), 3);
    assert_eq!(drained[2], press(KeyCode::KEY_C));
    assert_eq!(multiplexer.next_event(Duration::ZERO)?, None);
    Ok(())
}

#[test]
fn test_existing_file_is_not_a_fifo() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("regular");
    fs::write(&path, b"")?;
    let result = FifoSource::open(&path);
    assert!(matches!(result, Err(InputError::NotAFifo(_))));
    Ok(())
}

#[test]
fn test_no_sources() {
    let result = InputMultiplexer::new(Vec::new());
    assert!(matches!(result, Err(InputError::NoSources)));
}
