//! IEEE 802 MAC-48 address parsing.
//!
//! Accepted text form:
//! ```text
//! XX:XX:XX:XX:XX:XX   or   XX-XX-XX-XX-XX-XX
//! ```
//! Each `X` is a hex digit of either case.  A single address must use one
//! delimiter throughout; `00-11:22-33:44-55` is rejected.
//!
//! The canonical form produced by [`MacAddress`]'s `Display` impl is
//! upper-case and colon-delimited, which is what the backing file stores.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of octets in a MAC-48 address.
pub const MAC_LEN: usize = 6;

/// Length of the textual form: 6 octets × 2 digits + 5 delimiters.
const MAC_TEXT_LEN: usize = MAC_LEN * 3 - 1;

/// Errors produced when parsing a MAC address string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MacError {
    /// The string is not six hex octets joined by a single `:` or `-` delimiter.
    #[error("{0:?} is not a IEEE 802 MAC-48 address")]
    InvalidFormat(String),
}

/// A 6-byte hardware address in network order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MacAddress([u8; MAC_LEN]);

impl MacAddress {
    /// Wraps raw octets.
    pub const fn new(octets: [u8; MAC_LEN]) -> Self {
        Self(octets)
    }

    /// Parses `text`, accepting `:` or `-` as the (uniform) octet delimiter.
    ///
    /// # Errors
    ///
    /// Returns [`MacError::InvalidFormat`] for a wrong octet count, non-hex
    /// characters, an unsupported delimiter, or delimiters mixed mid-string.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use wakey_core::MacAddress;
    ///
    /// let mac = MacAddress::parse("aa-bb-cc-dd-ee-ff").unwrap();
    /// assert_eq!(mac.octets(), [0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]);
    /// assert_eq!(mac.to_string(), "AA:BB:CC:DD:EE:FF");
    /// ```
    pub fn parse(text: &str) -> Result<Self, MacError> {
        let invalid = || MacError::InvalidFormat(text.to_string());
        let bytes = text.as_bytes();
        if bytes.len() != MAC_TEXT_LEN {
            return Err(invalid());
        }

        let delimiter = bytes[2];
        if delimiter != b':' && delimiter != b'-' {
            return Err(invalid());
        }

        let mut octets = [0u8; MAC_LEN];
        for (idx, octet) in octets.iter_mut().enumerate() {
            let start = idx * 3;
            let hi = hex_value(bytes[start]).ok_or_else(invalid)?;
            let lo = hex_value(bytes[start + 1]).ok_or_else(invalid)?;
            *octet = (hi << 4) | lo;

            if idx + 1 < MAC_LEN && bytes[start + 2] != delimiter {
                return Err(invalid());
            }
        }
        Ok(Self(octets))
    }

    /// Returns the raw octets in network order.
    pub const fn octets(&self) -> [u8; MAC_LEN] {
        self.0
    }

    /// Borrows the raw octets.
    pub fn as_bytes(&self) -> &[u8; MAC_LEN] {
        &self.0
    }
}

fn hex_value(digit: u8) -> Option<u8> {
    match digit {
        b'0'..=b'9' => Some(digit - b'0'),
        b'a'..=b'f' => Some(digit - b'a' + 10),
        b'A'..=b'F' => Some(digit - b'A' + 10),
        _ => None,
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}

impl FromStr for MacAddress {
    type Err = MacError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for MacAddress {
    type Error = MacError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<MacAddress> for String {
    fn from(mac: MacAddress) -> Self {
        mac.to_string()
    }
}

impl From<[u8; MAC_LEN]> for MacAddress {
    fn from(octets: [u8; MAC_LEN]) -> Self {
        Self(octets)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_colon_delimited_upper_case() {
        // Arrange / Act
        let mac = MacAddress::parse("AA:BB:CC:DD:EE:FF").expect("valid mac");

        // Assert
        assert_eq!(mac.octets(), [0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]);
    }

    #[test]
    fn test_parse_accepts_dash_delimited_lower_case() {
        let mac = MacAddress::parse("01-23-45-67-89-ab").expect("valid mac");
        assert_eq!(mac.octets(), [0x01, 0x23, 0x45, 0x67, 0x89, 0xAB]);
    }

    #[test]
    fn test_parse_accepts_mixed_case_digits() {
        let mac = MacAddress::parse("aA:bB:cC:dD:eE:fF").expect("valid mac");
        assert_eq!(mac.octets(), [0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]);
    }

    #[test]
    fn test_parse_rejects_five_octets() {
        let result = MacAddress::parse("00:11:22:33:44");
        assert_eq!(
            result,
            Err(MacError::InvalidFormat("00:11:22:33:44".to_string()))
        );
    }

    #[test]
    fn test_parse_rejects_seven_octets() {
        assert!(MacAddress::parse("00:11:22:33:44:55:66").is_err());
    }

    #[test]
    fn test_parse_rejects_non_hex_characters() {
        assert!(matches!(
            MacAddress::parse("GG:11:22:33:44:55"),
            Err(MacError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_parse_rejects_mixed_delimiters() {
        assert!(MacAddress::parse("00-11:22-33:44-55").is_err());
        assert!(MacAddress::parse("00:11:22:33:44-55").is_err());
    }

    #[test]
    fn test_parse_rejects_unsupported_delimiter() {
        assert!(MacAddress::parse("00.11.22.33.44.55").is_err());
        assert!(MacAddress::parse("00 11 22 33 44 55").is_err());
    }

    #[test]
    fn test_parse_rejects_sign_prefixed_octet() {
        // `u8::from_str_radix` would accept "+1"; the parser must not.
        assert!(MacAddress::parse("+1:11:22:33:44:55").is_err());
    }

    #[test]
    fn test_parse_rejects_empty_and_whitespace_padded_input() {
        assert!(MacAddress::parse("").is_err());
        assert!(MacAddress::parse(" AA:BB:CC:DD:EE:FF").is_err());
        assert!(MacAddress::parse("AA:BB:CC:DD:EE:FF\n").is_err());
    }

    #[test]
    fn test_parse_rejects_multibyte_input_of_matching_length() {
        // 17 bytes, but not ASCII hex.
        assert!(MacAddress::parse("Ä:BB:CC:DD:EE:FF").is_err());
    }

    #[test]
    fn test_display_is_canonical_upper_case_colon_form() {
        let mac = MacAddress::parse("0a-0b-0c-0d-0e-0f").unwrap();
        assert_eq!(mac.to_string(), "0A:0B:0C:0D:0E:0F");
    }

    #[test]
    fn test_from_str_matches_parse() {
        let parsed: MacAddress = "AA:BB:CC:DD:EE:FF".parse().unwrap();
        assert_eq!(parsed, MacAddress::new([0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]));
    }

    #[test]
    fn test_serde_uses_canonical_string_form() {
        let mac = MacAddress::parse("aa-bb-cc-dd-ee-ff").unwrap();

        let json = serde_json::to_string(&mac).unwrap();
        assert_eq!(json, "\"AA:BB:CC:DD:EE:FF\"");

        let restored: MacAddress = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, mac);
    }

    #[test]
    fn test_deserialize_rejects_invalid_string() {
        let result: Result<MacAddress, _> = serde_json::from_str("\"not-a-mac\"");
        assert!(result.is_err());
    }
}
