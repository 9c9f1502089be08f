use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::bluetooth::l2cap::{ChannelError, L2capListener};
use crate::bluetooth::sdp::{AdvertisementError, AdvertisementService, BluezAdvertisement};
use crate::bluetooth::session::{SessionError, SessionManager};
use crate::cli::Args;
use crate::config::{path::find_keymap, Config, LoadError};
use crate::constants::{PSM_HID_CONTROL, PSM_HID_INTERRUPT};
use crate::input::multiplexer::InputMultiplexer;
use crate::input::source::evdev::EventDeviceSource;
use crate::input::source::fifo::FifoSource;
use crate::input::source::{EventSource, InputError};
use crate::input::translator::EventTranslator;
use crate::keymap::{index::KeyIndex, KeyMapError, KeyMapTable};
use crate::sync::ShutdownSignal;

/// Errors that terminate the daemon, each with its own exit status
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Failed to register service record: {0}")]
    Advertisement(#[from] AdvertisementError),
    #[error("Unable to open input: {0}")]
    Input(#[from] InputError),
    #[error("{0}")]
    Channel(#[from] ChannelError),
    #[error("Failed to load configuration: {0}")]
    Config(#[from] LoadError),
    #[error("Invalid keymap: {0}")]
    KeyMap(#[from] KeyMapError),
    #[error("Keymap not found: {0:?}")]
    KeyMapNotFound(PathBuf),
    #[error("Failed to install signal handlers: {0}")]
    Signal(io::Error),
    #[error("{0}")]
    Session(#[from] SessionError),
}

impl StartupError {
    /// Process exit status for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            StartupError::Advertisement(_) => 1,
            StartupError::Input(_) => 2,
            StartupError::Channel(ChannelError::Listen { .. }) => 4,
            StartupError::Channel(_) => 3,
            StartupError::Config(_)
            | StartupError::KeyMap(_)
            | StartupError::KeyMapNotFound(_)
            | StartupError::Signal(_) => 5,
            StartupError::Session(SessionError::ControlListener(_)) => 11,
            StartupError::Session(SessionError::InterruptListener(_)) => 12,
        }
    }
}

/// Load the keymap named on the command line or in the configuration,
/// falling back to the built in keymap.
pub fn load_keymap(args: &Args, config: &Config) -> Result<KeyMapTable, StartupError> {
    let Some(reference) = args.keymap.as_ref().or(config.keymap.as_ref()) else {
        return Ok(KeyMapTable::builtin()?);
    };
    let Some(path) = find_keymap(reference) else {
        return Err(StartupError::KeyMapNotFound(reference.clone()));
    };
    log::debug!("Loading keymap from {path:?}");
    Ok(KeyMapTable::from_yaml_file(path)?)
}

/// Open the configured input sources
pub fn open_input(args: &Args) -> Result<InputMultiplexer, StartupError> {
    let sources: Vec<Box<dyn EventSource>> = match args.fifo.as_ref() {
        Some(path) => vec![Box::new(FifoSource::open(path)?)],
        None => EventDeviceSource::open_all(args.device)
            .into_iter()
            .map(|source| Box::new(source) as Box<dyn EventSource>)
            .collect(),
    };
    let input = InputMultiplexer::new(sources)?;
    log::info!("Opened {} input source(s)", input.source_count());
    Ok(input)
}

/// Start the daemon and serve sessions until shutdown is requested.
pub fn run(args: &Args) -> Result<(), StartupError> {
    let config = Config::load(args.config.as_deref())?;
    let keymap = load_keymap(args, &config)?;
    log::info!("Using keymap '{}'", keymap.name());
    let translator = EventTranslator::new(
        KeyIndex::new()?,
        keymap,
        config.credential.clone(),
        config.start_muted,
    );

    let input = open_input(args)?;

    let shutdown = ShutdownSignal::new();
    shutdown.register().map_err(StartupError::Signal)?;

    let control = L2capListener::bind(PSM_HID_CONTROL)?;
    let interrupt = L2capListener::bind(PSM_HID_INTERRUPT)?;

    let mut advertisement = None;
    if args.skip_sdp || !config.advertisement.enabled {
        log::info!("Not publishing the HID service record");
    } else {
        let mut service = BluezAdvertisement::new(config.advertisement.clone())?;
        let handle = service.register()?;
        advertisement = Some((service, handle));
    }

    log::info!("Waiting for connections");
    let mut manager = SessionManager::new(control, interrupt, input, translator, shutdown);
    let result = manager.run();

    if let Some((mut service, handle)) = advertisement {
        service.unregister(handle);
    }

    result.map_err(StartupError::from)
}

#[cfg(test)]
mod daemon_test;
