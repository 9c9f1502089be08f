use std::error::Error;
use std::fs;
use std::io;
use std::path::PathBuf;

use nix::errno::Errno;

use crate::bluetooth::l2cap::ChannelError;
use crate::bluetooth::sdp::AdvertisementError;
use crate::bluetooth::session::SessionError;
use crate::cli::Args;
use crate::config::Config;
use crate::daemon::{load_keymap, open_input, StartupError};
use crate::input::source::InputError;

#[test]
fn test_exit_codes() {
    let errors = [
        (
            StartupError::Advertisement(AdvertisementError::DBus(zbus::Error::Failure(
                "no bus".to_string(),
            ))),
            1,
        ),
        (StartupError::Input(InputError::NoSources), 2),
        (
            StartupError::Channel(ChannelError::Bind {
                psm: 0x11,
                source: io::Error::from(io::ErrorKind::AddrInUse),
            }),
            3,
        ),
        (
            StartupError::Channel(ChannelError::Listen {
                psm: 0x13,
                source: io::Error::from(io::ErrorKind::Other),
            }),
            4,
        ),
        (StartupError::KeyMapNotFound(PathBuf::from("missing")), 5),
        (
            StartupError::Session(SessionError::ControlListener(ChannelError::Poll(
                Errno::EBADF,
            ))),
            11,
        ),
        (
            StartupError::Session(SessionError::InterruptListener(ChannelError::Poll(
                Errno::EBADF,
            ))),
            12,
        ),
    ];
    for (error, code) in errors {
        assert_eq!(error.exit_code(), code, "{error}");
    }
}

#[test]
fn test_keymap_selection() -> Result<(), Box<dyn Error>> {
    let config = Config::default();
    let table = load_keymap(&Args::default(), &config)?;
    assert_eq!(table.name(), "neo2_de_apple");

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("custom.yaml");
    fs::write(
        &path,
        "version: 1\nkind: KeyMap\nname: custom\nkeys:\n  - index: 4\n    layers: [[0, 4]]\n",
    )?;
    let args = Args {
        keymap: Some(path),
        ..Default::default()
    };
    let table = load_keymap(&args, &config)?;
    assert_eq!(table.name(), "custom");

    let args = Args {
        keymap: Some(dir.path().join("missing.yaml")),
        ..Default::default()
    };
    let result = load_keymap(&args, &config);
    assert!(matches!(result, Err(StartupError::KeyMapNotFound(_))));
    Ok(())
}

#[test]
fn test_fifo_input() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let args = Args {
        fifo: Some(dir.path().join("input")),
        ..Default::default()
    };
    let input = open_input(&args)?;
    assert_eq!(input.source_count(), 1);

    let args = Args {
        fifo: Some(dir.path().to_path_buf()),
        ..Default::default()
    };
    let result = open_input(&args);
    assert!(matches!(
        result,
        Err(StartupError::Input(InputError::NotAFifo(_)))
    ));
    Ok(())
}
