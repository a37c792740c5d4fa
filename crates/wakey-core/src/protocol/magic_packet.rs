//! Wake-on-LAN magic packet builder.
//!
//! Wire format:
//! ```text
//! [0xFF × 6][mac × 16]
//! ```
//! Total size: 102 bytes.  No padding, no checksum, and no byte-order
//! transformation; the MAC octets are copied verbatim in network order.
//!
//! # Why 16 repetitions? (for beginners)
//!
//! A sleeping network card does not run an IP stack.  It simply scans every
//! frame it sees for the synchronisation stream (six `0xFF` bytes) followed by
//! its own MAC address sixteen times in a row.  Any transport that delivers
//! those bytes to the card works; UDP broadcast to port 9 is the convention.

use thiserror::Error;

use crate::protocol::mac::{MacAddress, MacError, MAC_LEN};

/// Length of the synchronisation header.
pub const HEADER_LEN: usize = 6;

/// Number of times the target MAC is repeated after the header.
pub const MAC_REPETITIONS: usize = 16;

/// Total size of an encoded magic packet in bytes.
pub const MAGIC_PACKET_LEN: usize = HEADER_LEN + MAC_LEN * MAC_REPETITIONS;

/// Errors that can occur while building a magic packet.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PacketError {
    /// The MAC address string failed validation.
    #[error("invalid MAC address: {0}")]
    InvalidMac(#[from] MacError),
}

/// A Wake-on-LAN magic packet addressed to one network card.
///
/// Built fresh per wake request and discarded after transmission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MagicPacket {
    target: MacAddress,
}

impl MagicPacket {
    /// Creates a packet for an already-validated MAC address.
    pub const fn new(target: MacAddress) -> Self {
        Self { target }
    }

    /// Validates `mac` and creates a packet for it.
    ///
    /// # Errors
    ///
    /// Returns [`PacketError::InvalidMac`] if `mac` is not a valid MAC-48 string.
    pub fn for_mac_str(mac: &str) -> Result<Self, PacketError> {
        Ok(Self::new(MacAddress::parse(mac)?))
    }

    /// The MAC address this packet wakes.
    pub const fn target(&self) -> MacAddress {
        self.target
    }

    /// Serializes the packet into its 102-byte wire form.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use wakey_core::{MacAddress, MagicPacket, MAGIC_PACKET_LEN};
    ///
    /// let mac = MacAddress::new([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
    /// let bytes = MagicPacket::new(mac).to_bytes();
    /// assert_eq!(bytes.len(), MAGIC_PACKET_LEN);
    /// assert_eq!(&bytes[..6], &[0xFF; 6]);
    /// assert_eq!(&bytes[6..12], &mac.octets());
    /// ```
    pub fn to_bytes(&self) -> [u8; MAGIC_PACKET_LEN] {
        let mut buf = [0xFFu8; MAGIC_PACKET_LEN];
        let mac = self.target.as_bytes();
        for chunk in buf[HEADER_LEN..].chunks_exact_mut(MAC_LEN) {
            chunk.copy_from_slice(mac);
        }
        buf
    }
}

/// Validates `mac` and returns the encoded 102-byte packet.
///
/// # Errors
///
/// Returns [`PacketError::InvalidMac`] if `mac` fails validation.
pub fn build_packet(mac: &str) -> Result<[u8; MAGIC_PACKET_LEN], PacketError> {
    MagicPacket::for_mac_str(mac).map(|packet| packet.to_bytes())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
