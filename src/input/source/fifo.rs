use std::fs::{self, File, OpenOptions};
use std::io;
use std::os::fd::{AsFd, AsRawFd, BorrowedFd};
use std::os::unix::fs::{FileTypeExt, OpenOptionsExt};
use std::path::Path;

use nix::sys::stat::Mode;

use crate::input::event::RawInputEvent;

use super::{read_record, EventSource, InputError};

/// Input source reading event records from a named pipe. Any process can
/// feed events by writing records in the kernel input event layout.
#[derive(Debug)]
pub struct FifoSource {
    name: String,
    file: File,
}

impl FifoSource {
    /// Open the FIFO at the given path, creating it if it does not exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, InputError> {
        let path = path.as_ref();
        match fs::metadata(path) {
            Ok(metadata) => {
                if !metadata.file_type().is_fifo() {
                    return Err(InputError::NotAFifo(path.to_path_buf()));
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::info!("Creating FIFO at {}", path.display());
                nix::unistd::mkfifo(path, Mode::S_IRUSR | Mode::S_IWUSR)?;
            }
            Err(e) => return Err(e.into()),
        }

        // Keep a write handle open so the pipe never reports end-of-file
        // when writers come and go.
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(path)?;
        log::info!("Reading input from FIFO {}", path.display());

        Ok(Self {
            name: path.display().to_string(),
            file,
        })
    }
}

impl AsFd for FifoSource {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.file.as_fd()
    }
}

impl EventSource for FifoSource {
    fn name(&self) -> &str {
        self.name.as_str()
    }

    fn read_event(&mut self) -> Result<Option<RawInputEvent>, InputError> {
        read_record(self.file.as_raw_fd())
    }
}
