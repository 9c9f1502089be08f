use crate::drivers::bthid::control::{handle_message, ControlAction, TransactionType};

#[test]
fn test_set_requests_are_acknowledged() {
    for header in [0x70, 0x71, 0x90, 0x52] {
        assert_eq!(handle_message(&[header, 0x00]), ControlAction::Reply(vec![0x00]));
    }
}

#[test]
fn test_get_protocol_reports_report_mode() {
    assert_eq!(handle_message(&[0x60]), ControlAction::Reply(vec![0xA0, 0x01]));
}

#[test]
fn test_get_idle_and_get_report() {
    assert_eq!(handle_message(&[0x80]), ControlAction::Reply(vec![0xA0, 0x00]));
    assert_eq!(handle_message(&[0x41, 0x02]), ControlAction::Reply(vec![0x03]));
}

#[test]
fn test_virtual_cable_unplug() {
    assert_eq!(handle_message(&[0x15]), ControlAction::Unplug);
    // Suspend and exit suspend are not session ending
    assert_eq!(handle_message(&[0x13]), ControlAction::Ignore);
    assert_eq!(handle_message(&[0x14]), ControlAction::Ignore);
}

#[test]
fn test_unknown_and_empty_messages_are_ignored() {
    assert_eq!(handle_message(&[]), ControlAction::Ignore);
    assert_eq!(handle_message(&[0xA1, 0x01]), ControlAction::Ignore);
    assert_eq!(TransactionType::from(0xC0), TransactionType::Reserved(0x0C));
}
