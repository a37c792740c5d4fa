//! WakeUseCase: turn MAC address strings into transmitted magic packets.
//!
//! Waking is fire-and-forget.  A successful return means the datagram left
//! the socket, not that the target powered on; there is no confirmation and
//! no automatic retry.  Resending is harmless, so callers may retry manually.

use std::net::SocketAddr;

use thiserror::Error;
use tracing::{info, warn};
use wakey_core::{MacAddress, MagicPacket, PacketError, MAGIC_PACKET_LEN};

/// Errors returned by wake operations.
#[derive(Debug, Error)]
pub enum WakeError {
    /// The MAC address failed validation; nothing was sent.
    #[error(transparent)]
    InvalidMac(#[from] PacketError),

    /// The socket could not be opened or the write failed.
    #[error("failed to send magic packet to {destination}: {source}")]
    Socket {
        destination: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

/// Transmits an encoded magic packet.
///
/// The production implementation is
/// [`crate::infrastructure::network::broadcast::BroadcastSender`].
#[cfg_attr(test, mockall::automock)]
pub trait PacketSender: Send + Sync {
    /// Where packets are sent.
    fn destination(&self) -> SocketAddr;

    /// Sends one packet.  The socket is released before this returns.
    fn send(&self, packet: &[u8; MAGIC_PACKET_LEN]) -> std::io::Result<()>;
}

/// Wakes single devices or whole groups through a [`PacketSender`].
pub struct WakeService<S> {
    sender: S,
}

impl<S: PacketSender> WakeService<S> {
    pub fn new(sender: S) -> Self {
        Self { sender }
    }

    pub fn sender(&self) -> &S {
        &self.sender
    }

    /// Validates `mac`, builds its magic packet, and sends it once.
    ///
    /// # Errors
    ///
    /// Returns [`WakeError::InvalidMac`] before touching the network if `mac`
    /// is invalid, or [`WakeError::Socket`] if the send fails.
    pub fn wake_device(&self, mac: &str) -> Result<MacAddress, WakeError> {
        let packet = MagicPacket::for_mac_str(mac)?;
        self.send_packet(packet)?;
        Ok(packet.target())
    }

    /// Wakes each address in order, stopping at the first failure.
    ///
    /// Returns the number of packets sent.  Callers wanting best-effort
    /// fan-out should iterate themselves and ignore individual errors.
    ///
    /// # Errors
    ///
    /// Returns the first [`WakeError`]; addresses after it are not attempted.
    pub fn wake_group<M: AsRef<str>>(&self, macs: &[M]) -> Result<usize, WakeError> {
        for (sent, mac) in macs.iter().enumerate() {
            if let Err(e) = self.wake_device(mac.as_ref()) {
                warn!(sent, "group wake stopped: {e}");
                return Err(e);
            }
        }
        Ok(macs.len())
    }

    fn send_packet(&self, packet: MagicPacket) -> Result<(), WakeError> {
        let destination = self.sender.destination();
        self.sender
            .send(&packet.to_bytes())
            .map_err(|source| WakeError::Socket {
                destination,
                source,
            })?;
        info!(mac = %packet.target(), %destination, "magic packet sent");
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use wakey_core::MacError;

    const DEST: &str = "255.255.255.255:9";

    fn sender_expecting(times: usize) -> MockPacketSender {
        let mut sender = MockPacketSender::new();
        sender
            .expect_destination()
            .return_const(DEST.parse::<SocketAddr>().unwrap());
        sender.expect_send().times(times).returning(|_| Ok(()));
        sender
    }

    #[test]
    fn test_wake_device_sends_exact_packet_once() {
        // Arrange
        let mut sender = MockPacketSender::new();
        sender
            .expect_destination()
            .return_const(DEST.parse::<SocketAddr>().unwrap());
        sender
            .expect_send()
            .withf(|packet| {
                packet[..6] == [0xFF; 6]
                    && packet[6..]
                        .chunks(6)
                        .all(|c| c == [0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF])
            })
            .times(1)
            .returning(|_| Ok(()));
        let service = WakeService::new(sender);

        // Act
        let mac = service.wake_device("AA:BB:CC:DD:EE:FF").unwrap();

        // Assert
        assert_eq!(mac.to_string(), "AA:BB:CC:DD:EE:FF");
    }

    #[test]
    fn test_wake_device_rejects_invalid_mac_without_sending() {
        let service = WakeService::new(sender_expecting(0));

        let result = service.wake_device("00:11:22:33:44");

        assert!(matches!(
            result,
            Err(WakeError::InvalidMac(PacketError::InvalidMac(
                MacError::InvalidFormat(_)
            )))
        ));
    }

    #[test]
    fn test_wake_device_surfaces_socket_error_with_destination() {
        let mut sender = MockPacketSender::new();
        sender
            .expect_destination()
            .return_const(DEST.parse::<SocketAddr>().unwrap());
        sender
            .expect_send()
            .times(1)
            .returning(|_| Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied")));
        let service = WakeService::new(sender);

        let err = service.wake_device("AA:BB:CC:DD:EE:FF").unwrap_err();

        match err {
            WakeError::Socket { destination, source } => {
                assert_eq!(destination, DEST.parse::<SocketAddr>().unwrap());
                assert_eq!(source.kind(), io::ErrorKind::PermissionDenied);
            }
            other => panic!("expected socket error, got {other:?}"),
        }
    }

    #[test]
    fn test_wake_group_sends_one_packet_per_address() {
        let service = WakeService::new(sender_expecting(3));

        let sent = service
            .wake_group(&["AA:BB:CC:DD:EE:FF", "00:11:22:33:44:55", "00-11-22-33-44-66"])
            .unwrap();

        assert_eq!(sent, 3);
    }

    #[test]
    fn test_wake_group_stops_at_first_invalid_address() {
        // Only the first address is sent; the third is never attempted.
        let service = WakeService::new(sender_expecting(1));

        let result = service.wake_group(&["AA:BB:CC:DD:EE:FF", "bogus", "00:11:22:33:44:55"]);

        assert!(matches!(result, Err(WakeError::InvalidMac(_))));
    }

    #[test]
    fn test_wake_group_of_nothing_succeeds_without_sending() {
        let service = WakeService::new(sender_expecting(0));
        let empty: [&str; 0] = [];
        assert_eq!(service.wake_group(&empty).unwrap(), 0);
    }
}
