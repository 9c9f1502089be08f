/// L2CAP protocol/service multiplexor for the HID control channel
pub const PSM_HID_CONTROL: u16 = 0x11;
/// L2CAP protocol/service multiplexor for the HID interrupt channel
pub const PSM_HID_INTERRUPT: u16 = 0x13;

/// DBus object path the HID profile is exported at
pub const PROFILE_PATH: &str = "/org/bluehid/Profile";
/// Bluetooth HID service class UUID
pub const HID_SERVICE_UUID: &str = "00001124-0000-1000-8000-00805f9b34fb";

/// Default service information published in the discovery record
pub const SERVICE_NAME: &str = "Bluez virtual Mouse and Keyboard";
pub const SERVICE_DESCRIPTION: &str = "Keyboard";
pub const SERVICE_PROVIDER: &str = "bluehid";

/// Prefix of the event device nodes, followed by the device number
pub const EVDEV_PATH_PREFIX: &str = "/dev/input/event";
/// Maximum number of event devices read simultaneously
pub const MAX_EVENT_DEVICES: usize = 16;
