use std::io;

use evdev::Device;
use tabled::settings::{Panel, Style};
use tabled::{Table, Tabled};

use crate::constants::{EVDEV_PATH_PREFIX, MAX_EVENT_DEVICES};

#[derive(Tabled)]
struct InputDeviceRow {
    #[tabled(rename = "Device")]
    number: usize,
    #[tabled(rename = "Id")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
}

/// Print a table of the event devices that can be used as input sources.
/// Returns the number of devices found.
pub fn list_devices() -> usize {
    let mut rows = Vec::new();
    for number in 0..MAX_EVENT_DEVICES {
        let path = format!("{EVDEV_PATH_PREFIX}{number}");
        let row = match Device::open(&path) {
            Ok(device) => {
                let input_id = device.input_id();
                InputDeviceRow {
                    number,
                    id: format!(
                        "{:04x}:{:04x}.{:04x}",
                        input_id.vendor(),
                        input_id.product(),
                        input_id.version()
                    ),
                    name: device.name().unwrap_or_default().to_string(),
                }
            }
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => InputDeviceRow {
                number,
                id: String::new(),
                name: "(permission denied)".to_string(),
            },
            Err(e) => {
                log::debug!("Skipping {path}: {e}");
                continue;
            }
        };
        rows.push(row);
    }

    let count = rows.len();
    let mut table = Table::new(rows);
    table
        .with(Style::modern_rounded())
        .with(Panel::header("Input Devices"));
    println!("{table}");
    println!("Found {count} input device(s)");
    count
}
