use std::collections::VecDeque;
use std::os::fd::AsFd;
use std::time::Duration;

use nix::errno::Errno;
use nix::poll::{PollFd, PollFlags, PollTimeout};

use super::event::RawInputEvent;
use super::source::{EventSource, InputError};

/// Upper bound on read cycles performed by a single drain
const MAX_DRAIN_CYCLES: usize = 1024;

/// Queue of raw input events consumed by the session
pub trait EventQueue {
    /// Returns the next available event, waiting at most `timeout` for any
    /// source to become readable.
    fn next_event(&mut self, timeout: Duration) -> Result<Option<RawInputEvent>, InputError>;

    /// Consume every event that is currently readable without waiting.
    fn drain(&mut self) -> Result<Vec<RawInputEvent>, InputError>;
}

/// Waits on every open input source and hands out raw events one at a time.
#[derive(Debug)]
pub struct InputMultiplexer {
    sources: Vec<Box<dyn EventSource>>,
    pending: VecDeque<RawInputEvent>,
}

impl InputMultiplexer {
    /// Create a multiplexer over the given sources. At least one source is
    /// required.
    pub fn new(sources: Vec<Box<dyn EventSource>>) -> Result<Self, InputError> {
        if sources.is_empty() {
            return Err(InputError::NoSources);
        }
        Ok(Self {
            sources,
            pending: VecDeque::new(),
        })
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Wait for readiness and read one record from each ready source.
    /// Returns the number of sources that were ready.
    fn poll_once(&mut self, timeout: Duration) -> Result<usize, InputError> {
        let millis = timeout.as_millis().min(u16::MAX as u128) as u16;
        let ready: Vec<(bool, bool)> = {
            let mut fds: Vec<PollFd> = self
                .sources
                .iter()
                .map(|source| PollFd::new(source.as_fd(), PollFlags::POLLIN))
                .collect();
            match nix::poll::poll(&mut fds, PollTimeout::from(millis)) {
                Ok(0) => return Ok(0),
                Ok(_) => (),
                Err(Errno::EINTR) => return Ok(0),
                Err(e) => return Err(e.into()),
            }
            fds.iter()
                .map(|fd| {
                    let revents = fd.revents().unwrap_or(PollFlags::empty());
                    (
                        revents.contains(PollFlags::POLLIN),
                        revents.intersects(PollFlags::POLLERR | PollFlags::POLLNVAL),
                    )
                })
                .collect()
        };

        let mut ready_count = 0;
        let mut removed = Vec::new();
        for (i, (readable, failed)) in ready.into_iter().enumerate() {
            if !readable && !failed {
                continue;
            }
            ready_count += 1;
            let source = &mut self.sources[i];
            match source.read_event() {
                Ok(Some(event)) => self.pending.push_back(event),
                Ok(None) => (),
                Err(InputError::Errno(Errno::EAGAIN)) => (),
                Err(InputError::Errno(Errno::ENODEV)) => {
                    log::warn!("Input source {} was removed", source.name());
                    removed.push(i);
                }
                Err(e) => log::debug!("Failed to read from {}: {e}", source.name()),
            }
        }

        if !removed.is_empty() {
            for i in removed.into_iter().rev() {
                self.sources.remove(i);
            }
            if self.sources.is_empty() {
                log::warn!("All input sources were removed");
            }
        }

        Ok(ready_count)
    }
}

impl EventQueue for InputMultiplexer {
    fn next_event(&mut self, timeout: Duration) -> Result<Option<RawInputEvent>, InputError> {
        if self.pending.is_empty() {
            self.poll_once(timeout)?;
        }
        Ok(self.pending.pop_front())
    }

    fn drain(&mut self) -> Result<Vec<RawInputEvent>, InputError> {
        let mut events: Vec<RawInputEvent> = self.pending.drain(..).collect();
        for _ in 0..MAX_DRAIN_CYCLES {
            if self.poll_once(Duration::ZERO)? == 0 {
                break;
            }
            events.extend(self.pending.drain(..));
        }
        Ok(events)
    }
}
