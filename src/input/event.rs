use std::mem;

use evdev::EventType;

/// Size of one kernel input event record as read from an event device or
/// written to the FIFO.
pub const RECORD_SIZE: usize = mem::size_of::<libc::input_event>();

/// The record starts with the event timestamp, which is not used
const TIMESTAMP_SIZE: usize = mem::size_of::<libc::timeval>();

/// A single raw input event: key transition, button transition or relative
/// axis motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawInputEvent {
    pub event_type: u16,
    pub code: u16,
    pub value: i32,
}

impl RawInputEvent {
    pub fn new(event_type: EventType, code: u16, value: i32) -> Self {
        Self {
            event_type: event_type.0,
            code,
            value,
        }
    }

    pub fn event_type(&self) -> EventType {
        EventType(self.event_type)
    }

    /// Decode a record in native byte order. Returns [None] if the buffer is
    /// shorter than one record.
    pub fn from_bytes(buf: &[u8]) -> Option<Self> {
        if buf.len() < RECORD_SIZE {
            return None;
        }
        let fields = &buf[TIMESTAMP_SIZE..];
        Some(Self {
            event_type: u16::from_ne_bytes([fields[0], fields[1]]),
            code: u16::from_ne_bytes([fields[2], fields[3]]),
            value: i32::from_ne_bytes([fields[4], fields[5], fields[6], fields[7]]),
        })
    }

    /// Encode the event as a record with a zero timestamp
    pub fn to_bytes(&self) -> [u8; RECORD_SIZE] {
        let mut buf = [0; RECORD_SIZE];
        let fields = &mut buf[TIMESTAMP_SIZE..];
        fields[0..2].copy_from_slice(&self.event_type.to_ne_bytes());
        fields[2..4].copy_from_slice(&self.code.to_ne_bytes());
        fields[4..8].copy_from_slice(&self.value.to_ne_bytes());
        buf
    }
}
