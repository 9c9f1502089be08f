pub mod evdev;
pub mod fifo;

use std::fmt::Debug;
use std::io;
use std::os::fd::{AsFd, RawFd};
use std::path::PathBuf;

use nix::errno::Errno;
use thiserror::Error;

use super::event::{RawInputEvent, RECORD_SIZE};

/// Possible errors opening or reading input sources
#[derive(Debug, Error)]
pub enum InputError {
    #[error("Input source I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("System call failed: {0}")]
    Errno(#[from] Errno),
    #[error("{0:?} exists and is not a FIFO")]
    NotAFifo(PathBuf),
    #[error("No input source could be opened")]
    NoSources,
}

/// A descriptor that delivers fixed size raw input event records
pub trait EventSource: AsFd + Debug {
    /// Identifier used in log messages
    fn name(&self) -> &str;

    /// Read exactly one record. A short read yields [None].
    fn read_event(&mut self) -> Result<Option<RawInputEvent>, InputError>;
}

/// Read one record from the given non-blocking descriptor
pub(crate) fn read_record(fd: RawFd) -> Result<Option<RawInputEvent>, InputError> {
    let mut buf = [0; RECORD_SIZE];
    let count = nix::unistd::read(fd, &mut buf)?;
    if count < RECORD_SIZE {
        log::debug!("Discarding short read of {count} bytes");
        return Ok(None);
    }
    Ok(RawInputEvent::from_bytes(&buf))
}
