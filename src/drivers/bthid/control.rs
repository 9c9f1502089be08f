//! HIDP control channel transactions.
//!
//! The remote host may query or configure the device over the control
//! channel while a session is active. Only the small subset needed for a
//! report protocol keyboard/mouse is answered here.

/// Transaction types carried in the upper nibble of the HIDP header
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransactionType {
    Handshake,
    HidControl,
    GetReport,
    SetReport,
    GetProtocol,
    SetProtocol,
    GetIdle,
    SetIdle,
    Data,
    Reserved(u8),
}

impl From<u8> for TransactionType {
    fn from(header: u8) -> Self {
        match header >> 4 {
            0x0 => TransactionType::Handshake,
            0x1 => TransactionType::HidControl,
            0x4 => TransactionType::GetReport,
            0x5 => TransactionType::SetReport,
            0x6 => TransactionType::GetProtocol,
            0x7 => TransactionType::SetProtocol,
            0x8 => TransactionType::GetIdle,
            0x9 => TransactionType::SetIdle,
            0xA => TransactionType::Data,
            other => TransactionType::Reserved(other),
        }
    }
}

/// HANDSHAKE result codes
pub const HANDSHAKE_SUCCESSFUL: u8 = 0x00;
pub const HANDSHAKE_ERR_UNSUPPORTED_REQUEST: u8 = 0x03;

/// HID_CONTROL parameter sent by a host that is removing the device
pub const CONTROL_VIRTUAL_CABLE_UNPLUG: u8 = 0x05;

/// DATA header with the "other" report type, used for GET_* replies
pub const DATA_OTHER: u8 = 0xA0;

pub const PROTOCOL_REPORT: u8 = 0x01;

/// What the session should do after receiving a control message
#[derive(Debug, Clone, PartialEq)]
pub enum ControlAction {
    /// Write the given bytes back on the control channel
    Reply(Vec<u8>),
    /// The host unplugged the virtual cable; end the session
    Unplug,
    Ignore,
}

/// Decide how to answer a single control channel message.
pub fn handle_message(message: &[u8]) -> ControlAction {
    let Some(header) = message.first() else {
        return ControlAction::Ignore;
    };
    let param = header & 0x0F;

    match TransactionType::from(*header) {
        TransactionType::SetProtocol | TransactionType::SetIdle | TransactionType::SetReport => {
            ControlAction::Reply(vec![HANDSHAKE_SUCCESSFUL])
        }
        TransactionType::GetProtocol => ControlAction::Reply(vec![DATA_OTHER, PROTOCOL_REPORT]),
        TransactionType::GetIdle => ControlAction::Reply(vec![DATA_OTHER, 0x00]),
        TransactionType::GetReport => ControlAction::Reply(vec![HANDSHAKE_ERR_UNSUPPORTED_REQUEST]),
        TransactionType::HidControl if param == CONTROL_VIRTUAL_CABLE_UNPLUG => {
            ControlAction::Unplug
        }
        _ => ControlAction::Ignore,
    }
}
