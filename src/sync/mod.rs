use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};

/// Shutdown request raised by signals or by the session itself. Signal
/// handlers only set flags; the main loop decides at its checkpoint.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    terminate: Arc<AtomicBool>,
    interrupt: Arc<AtomicBool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install handlers for SIGTERM and SIGHUP (always stop) and SIGINT
    /// (stop only while no session is active).
    pub fn register(&self) -> Result<(), io::Error> {
        signal_hook::flag::register(SIGTERM, self.terminate.clone())?;
        signal_hook::flag::register(SIGHUP, self.terminate.clone())?;
        signal_hook::flag::register(SIGINT, self.interrupt.clone())?;
        Ok(())
    }

    /// Request shutdown at the next checkpoint
    pub fn request(&self) {
        self.terminate.store(true, Ordering::SeqCst);
    }

    /// Main loop checkpoint. An interrupt received while a session is
    /// active is consumed and ignored.
    pub fn should_stop(&self, session_active: bool) -> bool {
        if self.interrupt.swap(false, Ordering::SeqCst) {
            if session_active {
                log::info!("Ignoring interrupt while a session is active");
            } else {
                log::info!("Interrupted");
                self.request();
            }
        }
        self.terminate.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod sync_test;
