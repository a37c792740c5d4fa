//! # wakey-core
//!
//! Shared library for Wakey containing the Wake-on-LAN magic packet builder,
//! MAC address validation, and the device/group domain model.
//!
//! This crate has zero dependencies on OS APIs, network sockets, or the file
//! system.  Sending packets, probing hosts, and persisting the configuration
//! all live in the `wakey` crate.
//!
//! # Architecture overview (for beginners)
//!
//! Wake-on-LAN (WoL) lets you power on a sleeping machine by broadcasting a
//! specially shaped UDP datagram (the "magic packet") onto its local network
//! segment.  The network card of the sleeping machine keeps listening for a
//! packet that contains its own hardware (MAC) address repeated 16 times.
//!
//! This crate defines:
//!
//! - **`protocol`** – How a MAC address string becomes 6 bytes, and how those
//!   6 bytes become the 102-byte magic packet.
//!
//! - **`domain`** – The devices and groups the user maintains, the rules for
//!   what a valid device looks like, and the pure lookups that resolve a group
//!   into the MAC addresses of its members.

pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `wakey_core::MacAddress` instead of `wakey_core::protocol::mac::MacAddress`.
pub use domain::configuration::Configuration;
pub use domain::device::{Device, DeviceDraft, DeviceId, DeviceState};
pub use domain::group::{Group, GroupDraft, GroupId};
pub use domain::validation::ValidationError;
pub use protocol::mac::{MacAddress, MacError};
pub use protocol::magic_packet::{build_packet, MagicPacket, PacketError, MAGIC_PACKET_LEN};
