use crate::bluetooth::l2cap::format_address;

#[test]
fn test_address_is_reversed() {
    let bdaddr = [0x66, 0x55, 0x44, 0x33, 0x22, 0x11];
    assert_eq!(format_address(bdaddr), "11:22:33:44:55:66");
    assert_eq!(format_address([0x0A; 6]), "0A:0A:0A:0A:0A:0A");
}
