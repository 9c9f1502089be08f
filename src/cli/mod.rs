pub mod device;

use std::path::PathBuf;

use clap::Parser;

/// Emulate a Bluetooth keyboard and mouse using local input devices
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Only read input from event device N (/dev/input/eventN)
    #[arg(short = 'e', long = "device", value_name = "N", conflicts_with = "fifo")]
    pub device: Option<usize>,

    /// Read input event records from the given named pipe instead of event
    /// devices. The pipe is created if it does not exist.
    #[arg(short, long, value_name = "PATH")]
    pub fifo: Option<PathBuf>,

    /// Do not publish the HID service record
    #[arg(short, long)]
    pub skip_sdp: bool,

    /// List available input devices and exit
    #[arg(short, long)]
    pub list: bool,

    /// Log every raw input event
    #[arg(short, long)]
    pub debug: bool,

    /// Keymap file, or name of an installed keymap
    #[arg(short, long, value_name = "KEYMAP")]
    pub keymap: Option<PathBuf>,

    /// Configuration file to use instead of the default search paths
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}
