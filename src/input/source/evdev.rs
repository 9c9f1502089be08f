use std::fmt::Debug;
use std::os::fd::{AsFd, AsRawFd, BorrowedFd};
use std::path::{Path, PathBuf};

use evdev::Device;
use nix::fcntl::{FcntlArg, OFlag};

use crate::constants::{EVDEV_PATH_PREFIX, MAX_EVENT_DEVICES};
use crate::input::event::RawInputEvent;

use super::{read_record, EventSource, InputError};

/// Input source reading a kernel event device node
pub struct EventDeviceSource {
    path: PathBuf,
    name: String,
    device: Device,
}

impl EventDeviceSource {
    /// Open the event device at the given path for non-blocking reads
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, InputError> {
        let path = path.as_ref();
        log::debug!("Opening device at: {}", path.display());
        let device = Device::open(path)?;

        // Set the device to do non-blocking reads
        let raw_fd = device.as_raw_fd();
        nix::fcntl::fcntl(raw_fd, FcntlArg::F_SETFL(OFlag::O_NONBLOCK))?;

        let name = device.name().unwrap_or("unknown").to_string();
        Ok(Self {
            path: path.to_path_buf(),
            name,
            device,
        })
    }

    /// Open the event devices, or only the selected device number. Devices
    /// that cannot be opened are skipped.
    pub fn open_all(selection: Option<usize>) -> Vec<EventDeviceSource> {
        let numbers: Vec<usize> = match selection {
            Some(number) => vec![number],
            None => (0..MAX_EVENT_DEVICES).collect(),
        };

        let mut sources = Vec::new();
        for number in numbers {
            let path = format!("{EVDEV_PATH_PREFIX}{number}");
            match Self::open(&path) {
                Ok(source) => {
                    log::info!("Reading input from {path} ({})", source.name);
                    sources.push(source);
                }
                Err(e) => log::debug!("Skipping {path}: {e}"),
            }
        }
        sources
    }
}

impl AsFd for EventDeviceSource {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.device.as_fd()
    }
}

impl EventSource for EventDeviceSource {
    fn name(&self) -> &str {
        self.name.as_str()
    }

    fn read_event(&mut self) -> Result<Option<RawInputEvent>, InputError> {
        read_record(self.device.as_raw_fd())
    }
}

impl Debug for EventDeviceSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDeviceSource")
            .field("path", &self.path)
            .field("name", &self.name)
            .finish()
    }
}
