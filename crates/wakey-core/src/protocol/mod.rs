//! Protocol module containing MAC address parsing and the magic packet builder.

pub mod mac;
pub mod magic_packet;

pub use mac::{MacAddress, MacError};
pub use magic_packet::{build_packet, MagicPacket, PacketError, MAGIC_PACKET_LEN};
