use packed_struct::prelude::*;

/// HIDP transaction header for an input report travelling device to host
/// on the interrupt channel (DATA | Input).
pub const FRAME_TYPE_INPUT: u8 = 0xA1;

/// Number of key usage slots in a keyboard report.
pub const KEY_SLOTS: usize = 8;

/// Report IDs declared in the report descriptor
#[derive(PrimitiveEnum_u8, Clone, Copy, PartialEq, Debug, Default)]
pub enum ReportType {
    #[default]
    Mouse = 0x01,
    Keyboard = 0x02,
}

/// Relative mouse report with three buttons.
// # ReportID: 1 / Buttons: 3 bits / X / Y / Wheel
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "6")]
pub struct MouseReport {
    #[packed_field(bytes = "0")]
    pub frame_type: u8,
    #[packed_field(bytes = "1", ty = "enum")]
    pub report_id: ReportType,
    #[packed_field(bytes = "2")]
    pub buttons: u8,
    #[packed_field(bytes = "3")]
    pub dx: i8,
    #[packed_field(bytes = "4")]
    pub dy: i8,
    #[packed_field(bytes = "5")]
    pub dz: i8,
}

impl Default for MouseReport {
    fn default() -> Self {
        Self {
            frame_type: FRAME_TYPE_INPUT,
            report_id: ReportType::Mouse,
            buttons: 0,
            dx: 0,
            dy: 0,
            dz: 0,
        }
    }
}

/// Boot style keyboard report: modifier byte followed by up to eight pressed
/// key usages, zero padded.
// # ReportID: 2 / Modifiers: 8 bits / Keys: 8 x u8
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "11")]
pub struct KeyboardReport {
    #[packed_field(bytes = "0")]
    pub frame_type: u8,
    #[packed_field(bytes = "1", ty = "enum")]
    pub report_id: ReportType,
    #[packed_field(bytes = "2")]
    pub modifiers: u8,
    #[packed_field(bytes = "3..=10")]
    pub keys: [u8; 8],
}

impl Default for KeyboardReport {
    fn default() -> Self {
        Self {
            frame_type: FRAME_TYPE_INPUT,
            report_id: ReportType::Keyboard,
            modifiers: 0,
            keys: [0; KEY_SLOTS],
        }
    }
}

/// Any report that can be sent on the interrupt channel
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum HidReport {
    Mouse(MouseReport),
    Keyboard(KeyboardReport),
}

impl HidReport {
    /// Build a mouse report from the button mask and per event deltas.
    pub fn mouse(buttons: u8, dx: i8, dy: i8, dz: i8) -> Self {
        HidReport::Mouse(MouseReport {
            buttons: buttons & 0x07,
            dx,
            dy,
            dz,
            ..Default::default()
        })
    }

    /// Build a keyboard report from a modifier byte and the currently pressed
    /// usages. Usages beyond the eighth are not representable and are ignored.
    pub fn keyboard(modifiers: u8, pressed: &[u8]) -> Self {
        let mut keys = [0; KEY_SLOTS];
        for (slot, usage) in keys.iter_mut().zip(pressed.iter()) {
            *slot = *usage;
        }
        HidReport::Keyboard(KeyboardReport {
            modifiers,
            keys,
            ..Default::default()
        })
    }

    /// Keyboard report with every key and modifier released.
    pub fn keyboard_released() -> Self {
        HidReport::Keyboard(KeyboardReport::default())
    }

    pub fn report_type(&self) -> ReportType {
        match self {
            HidReport::Mouse(report) => report.report_id,
            HidReport::Keyboard(report) => report.report_id,
        }
    }

    /// Serialize the report into its wire layout.
    pub fn to_bytes(&self) -> Result<Vec<u8>, PackingError> {
        let bytes = match self {
            HidReport::Mouse(report) => report.pack()?.to_vec(),
            HidReport::Keyboard(report) => report.pack()?.to_vec(),
        };
        Ok(bytes)
    }
}
