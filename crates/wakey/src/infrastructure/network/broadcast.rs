//! UDP broadcast transmitter for magic packets.
//!
//! Each send binds an ephemeral socket on all interfaces, enables
//! `SO_BROADCAST`, writes exactly one datagram, and drops the socket.  No
//! reply is expected.  Any network card on the segment whose MAC appears in
//! the payload (and which has Wake-on-LAN enabled) powers its host on.

use std::io;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, UdpSocket};

use tracing::debug;
use wakey_core::MAGIC_PACKET_LEN;

use crate::application::wake::PacketSender;

/// Conventional Wake-on-LAN port ("discard").
pub const DEFAULT_WAKE_PORT: u16 = 9;

/// `255.255.255.255:9`.
pub const DEFAULT_DESTINATION: SocketAddr =
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::BROADCAST, DEFAULT_WAKE_PORT));

/// Sends magic packets over UDP.
#[derive(Debug, Clone, Copy)]
pub struct BroadcastSender {
    destination: SocketAddr,
}

impl Default for BroadcastSender {
    fn default() -> Self {
        Self::new()
    }
}

impl BroadcastSender {
    /// Sender targeting [`DEFAULT_DESTINATION`].
    pub fn new() -> Self {
        Self::with_destination(DEFAULT_DESTINATION)
    }

    /// Sender targeting `destination`, e.g. a subnet-directed broadcast.
    pub fn with_destination(destination: SocketAddr) -> Self {
        Self { destination }
    }
}

impl PacketSender for BroadcastSender {
    fn destination(&self) -> SocketAddr {
        self.destination
    }

    fn send(&self, packet: &[u8; MAGIC_PACKET_LEN]) -> io::Result<()> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
        socket.set_broadcast(true)?;
        let written = socket.send_to(packet, self.destination)?;
        if written != packet.len() {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("short datagram: {written} of {} bytes", packet.len()),
            ));
        }
        debug!(destination = %self.destination, bytes = written, "datagram written");
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wakey_core::build_packet;

    #[test]
    fn test_default_destination_is_limited_broadcast_port_9() {
        let sender = BroadcastSender::default();
        assert_eq!(
            sender.destination(),
            "255.255.255.255:9".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn test_send_delivers_one_102_byte_datagram() {
        // Arrange: loopback receiver stands in for the broadcast domain.
        let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
        receiver
            .set_read_timeout(Some(Duration::from_secs(2)))
            .unwrap();
        let sender = BroadcastSender::with_destination(receiver.local_addr().unwrap());
        let packet = build_packet("AA:BB:CC:DD:EE:FF").unwrap();

        // Act
        sender.send(&packet).unwrap();

        // Assert
        let mut buf = [0u8; 256];
        let (len, _) = receiver.recv_from(&mut buf).unwrap();
        assert_eq!(len, MAGIC_PACKET_LEN);
        assert_eq!(&buf[..len], &packet[..]);
    }
}
