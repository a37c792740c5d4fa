//! Integration tests for the magic packet wire format.
//!
//! The 102-byte layout is the one bit-exact compatibility requirement of the
//! project: real network cards only wake for exactly this byte sequence.
//! These tests build packets through the public API and compare against
//! hand-written expected bytes.

use wakey_core::{build_packet, MacAddress, MacError, MagicPacket, PacketError, MAGIC_PACKET_LEN};

/// Writes out the expected packet longhand, independent of the builder.
fn expected_bytes(mac: [u8; 6]) -> Vec<u8> {
    let mut expected = vec![0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF];
    for _ in 0..16 {
        expected.extend_from_slice(&mac);
    }
    expected
}

#[test]
fn test_packet_for_aabbccddeeff_matches_reference_bytes() {
    // Arrange
    let mac = [0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF];

    // Act
    let bytes = build_packet("AA:BB:CC:DD:EE:FF").expect("valid mac");

    // Assert
    assert_eq!(bytes.len(), 102);
    assert_eq!(bytes.to_vec(), expected_bytes(mac));
}

#[test]
fn test_packet_bytes_at_fixed_offsets() {
    let bytes = build_packet("01:23:45:67:89:AB").unwrap();

    assert_eq!(bytes[0], 0xFF);
    assert_eq!(bytes[5], 0xFF);
    assert_eq!(bytes[6], 0x01);
    assert_eq!(bytes[11], 0xAB);
    assert_eq!(bytes[12], 0x01);
    assert_eq!(bytes[96], 0x01);
    assert_eq!(bytes[101], 0xAB);
}

#[test]
fn test_packet_built_from_dash_form_equals_colon_form() {
    let colon = build_packet("de:ad:be:ef:00:01").unwrap();
    let dash = build_packet("DE-AD-BE-EF-00-01").unwrap();
    assert_eq!(colon, dash);
}

#[test]
fn test_builder_agrees_with_parsed_mac_path() {
    let mac: MacAddress = "10:20:30:40:50:60".parse().unwrap();
    let via_struct = MagicPacket::new(mac).to_bytes();
    let via_str = build_packet("10:20:30:40:50:60").unwrap();
    assert_eq!(via_struct, via_str);
    assert_eq!(via_struct.len(), MAGIC_PACKET_LEN);
}

#[test]
fn test_invalid_inputs_fail_with_invalid_mac() {
    for bad in [
        "00:11:22:33:44",
        "GG:11:22:33:44:55",
        "00-11:22-33:44-55",
        "001122334455",
        "",
    ] {
        let result = build_packet(bad);
        assert_eq!(
            result,
            Err(PacketError::InvalidMac(MacError::InvalidFormat(
                bad.to_string()
            ))),
            "{bad:?} must be rejected"
        );
    }
}
