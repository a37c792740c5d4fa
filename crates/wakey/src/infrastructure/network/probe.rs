//! ICMP and TCP reachability probers.
//!
//! Raw ICMP sockets need elevated privileges.  [`SystemProber`] in `auto`
//! mode uses ICMP echo when the process runs as root and falls back to a TCP
//! connect otherwise (or when the raw channel cannot be opened).
//!
//! The TCP probe counts a *refused* connection as online: a RST proves the
//! host's network stack answered.  Only a timeout or an unreachable error
//! counts as offline.

use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicU16, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use is_root::is_root;
use pnet::packet::icmp::echo_reply::EchoReplyPacket;
use pnet::packet::icmp::echo_request::MutableEchoRequestPacket;
use pnet::packet::icmp::{self, IcmpPacket, IcmpTypes};
use pnet::packet::ip::IpNextHeaderProtocols;
use pnet::packet::Packet;
use pnet::transport::{self, TransportChannelType, TransportProtocol};
use serde::{Deserialize, Serialize};
use tokio::net::TcpStream;
use tracing::debug;

use crate::application::probe::Prober;

const ICMP_BUFFER_SIZE: usize = 1024;
const ECHO_REQUEST_LEN: usize = 16;
const CHANNEL_TYPE_ICMP: TransportChannelType =
    TransportChannelType::Layer4(TransportProtocol::Ipv4(IpNextHeaderProtocols::Icmp));

/// Port the TCP probe connects to unless configured otherwise.
pub const DEFAULT_TCP_PROBE_PORT: u16 = 80;

/// Sequence counter for echo requests.
static ECHO_SEQ: AtomicU16 = AtomicU16::new(0);

/// Which probe strategy to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeMethod {
    /// ICMP when privileged, TCP otherwise.
    #[default]
    Auto,
    Icmp,
    Tcp,
}

// ── TCP ───────────────────────────────────────────────────────────────────────

/// Unprivileged probe: a single TCP connect attempt.
#[derive(Debug, Clone, Copy)]
pub struct TcpProber {
    port: u16,
}

impl Default for TcpProber {
    fn default() -> Self {
        Self::new(DEFAULT_TCP_PROBE_PORT)
    }
}

impl TcpProber {
    pub fn new(port: u16) -> Self {
        Self { port }
    }
}

#[async_trait]
impl Prober for TcpProber {
    async fn probe(&self, ip: IpAddr, timeout: Duration) -> bool {
        let addr = SocketAddr::new(ip, self.port);
        match tokio::time::timeout(timeout, TcpStream::connect(addr)).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) if e.kind() == io::ErrorKind::ConnectionRefused => true,
            Ok(Err(e)) => {
                debug!(%addr, "tcp probe failed: {e}");
                false
            }
            Err(_elapsed) => false,
        }
    }
}

// ── ICMP ──────────────────────────────────────────────────────────────────────

/// One echo round trip that reports setup failures instead of hiding them.
///
/// Unlike [`Prober::probe`], an error here means "could not ask", which lets
/// [`SystemProber`] fall back to another method.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Echo: Send + Sync {
    /// Sends one echo request and waits up to `timeout` for the reply.
    ///
    /// `Ok(false)` means no reply arrived in time.
    async fn ping(&self, ip: IpAddr, timeout: Duration) -> io::Result<bool>;
}

/// Privileged probe: one ICMP echo request, waiting for the matching reply.
#[derive(Debug, Clone, Copy, Default)]
pub struct IcmpProber;

#[async_trait]
impl Echo for IcmpProber {
    /// # Errors
    ///
    /// Returns an error if the raw channel cannot be opened (typically
    /// missing privileges), the address is not IPv4, or the send fails.
    async fn ping(&self, ip: IpAddr, timeout: Duration) -> io::Result<bool> {
        let IpAddr::V4(target) = ip else {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "ICMP probe supports IPv4 only",
            ));
        };
        tokio::task::spawn_blocking(move || echo(target, timeout))
            .await
            .map_err(io::Error::other)?
    }
}

#[async_trait]
impl Prober for IcmpProber {
    async fn probe(&self, ip: IpAddr, timeout: Duration) -> bool {
        echo_or_offline(self, ip, timeout).await
    }
}

async fn echo_or_offline(echo: &dyn Echo, ip: IpAddr, timeout: Duration) -> bool {
    match echo.ping(ip, timeout).await {
        Ok(answered) => answered,
        Err(e) => {
            debug!(%ip, "icmp probe failed: {e}");
            false
        }
    }
}

/// Blocking echo round trip on a raw transport channel.
fn echo(target: Ipv4Addr, timeout: Duration) -> io::Result<bool> {
    let (mut tx, mut rx) = transport::transport_channel(ICMP_BUFFER_SIZE, CHANNEL_TYPE_ICMP)?;

    let identifier = (std::process::id() & 0xFFFF) as u16;
    let sequence = ECHO_SEQ.fetch_add(1, Ordering::Relaxed);

    let mut buf = [0u8; ECHO_REQUEST_LEN];
    let mut request = MutableEchoRequestPacket::new(&mut buf)
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "echo buffer too small"))?;
    request.set_icmp_type(IcmpTypes::EchoRequest);
    request.set_identifier(identifier);
    request.set_sequence_number(sequence);
    let checksum = IcmpPacket::new(request.packet())
        .map(|p| icmp::checksum(&p))
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "echo buffer too small"))?;
    request.set_checksum(checksum);

    tx.send_to(request, IpAddr::V4(target))?;

    let deadline = Instant::now() + timeout;
    let mut replies = transport::icmp_packet_iter(&mut rx);
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Ok(false);
        }
        match replies.next_with_timeout(remaining)? {
            Some((packet, from)) if from == IpAddr::V4(target) => {
                if packet.get_icmp_type() != IcmpTypes::EchoReply {
                    continue;
                }
                let matches = EchoReplyPacket::new(packet.packet()).is_some_and(|reply| {
                    reply.get_identifier() == identifier
                        && reply.get_sequence_number() == sequence
                });
                if matches {
                    return Ok(true);
                }
            }
            Some(_) => continue,
            None => return Ok(false),
        }
    }
}

// ── Strategy selection ────────────────────────────────────────────────────────

/// Probe used by the running tool; dispatches on [`ProbeMethod`].
///
/// `privileged` is sampled once at construction and decides whether `auto`
/// tries ICMP first.
#[derive(Debug)]
pub struct SystemProber<E = IcmpProber> {
    method: ProbeMethod,
    privileged: bool,
    icmp: E,
    tcp: TcpProber,
}

impl Default for SystemProber {
    fn default() -> Self {
        Self::new(ProbeMethod::Auto, DEFAULT_TCP_PROBE_PORT)
    }
}

impl SystemProber {
    pub fn new(method: ProbeMethod, tcp_port: u16) -> Self {
        Self::with_echo(method, IcmpProber, is_root(), tcp_port)
    }
}

impl<E: Echo> SystemProber<E> {
    pub fn with_echo(method: ProbeMethod, icmp: E, privileged: bool, tcp_port: u16) -> Self {
        Self {
            method,
            privileged,
            icmp,
            tcp: TcpProber::new(tcp_port),
        }
    }

    pub fn method(&self) -> ProbeMethod {
        self.method
    }
}

#[async_trait]
impl<E: Echo> Prober for SystemProber<E> {
    async fn probe(&self, ip: IpAddr, timeout: Duration) -> bool {
        match self.method {
            ProbeMethod::Tcp => self.tcp.probe(ip, timeout).await,
            ProbeMethod::Icmp => echo_or_offline(&self.icmp, ip, timeout).await,
            ProbeMethod::Auto if self.privileged && ip.is_ipv4() => {
                match self.icmp.ping(ip, timeout).await {
                    Ok(answered) => answered,
                    Err(e) => {
                        debug!(%ip, "icmp unavailable, falling back to tcp: {e}");
                        self.tcp.probe(ip, timeout).await
                    }
                }
            }
            ProbeMethod::Auto => self.tcp.probe(ip, timeout).await,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);
    const TIMEOUT: Duration = Duration::from_millis(500);

    #[test]
    fn test_probe_method_serializes_lowercase() {
        #[derive(Serialize, Deserialize)]
        struct Wrapper {
            method: ProbeMethod,
        }

        let text = toml::to_string(&Wrapper {
            method: ProbeMethod::Icmp,
        })
        .unwrap();
        assert_eq!(text.trim(), "method = \"icmp\"");

        let parsed: Wrapper = toml::from_str("method = \"tcp\"").unwrap();
        assert_eq!(parsed.method, ProbeMethod::Tcp);
    }

    #[tokio::test]
    async fn test_tcp_probe_reports_listening_host_online() {
        // Arrange
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        let port = listener.local_addr().unwrap().port();

        // Act
        let online = TcpProber::new(port).probe(LOCALHOST, TIMEOUT).await;

        // Assert
        assert!(online);
    }

    #[tokio::test]
    async fn test_tcp_probe_counts_refused_connection_as_online() {
        // Arrange: bind then release a port so nothing is listening on it.
        let port = {
            let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
            listener.local_addr().unwrap().port()
        };

        // Act / Assert
        assert!(TcpProber::new(port).probe(LOCALHOST, TIMEOUT).await);
    }

    #[tokio::test]
    #[ignore = "needs a network where TEST-NET-1 is unroutable or silent"]
    async fn test_tcp_probe_reports_unreachable_host_offline() {
        let ip = IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1));
        assert!(!TcpProber::default().probe(ip, Duration::from_millis(200)).await);
    }

    #[tokio::test]
    async fn test_icmp_ping_rejects_ipv6() {
        let err = IcmpProber
            .ping(IpAddr::V6(std::net::Ipv6Addr::LOCALHOST), TIMEOUT)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Unsupported);
    }

    #[tokio::test]
    async fn test_icmp_setup_failure_reports_offline_through_prober() {
        let ip = IpAddr::V6(std::net::Ipv6Addr::LOCALHOST);
        assert!(!IcmpProber.probe(ip, TIMEOUT).await);
    }

    #[tokio::test]
    async fn test_icmp_mode_reports_offline_when_raw_channel_is_denied() {
        let mut echo = MockEcho::new();
        echo.expect_ping()
            .times(1)
            .returning(|_, _| Err(io::Error::new(io::ErrorKind::PermissionDenied, "raw socket")));
        let prober = SystemProber::with_echo(ProbeMethod::Icmp, echo, false, 1);

        assert!(!prober.probe(LOCALHOST, TIMEOUT).await);
    }

    #[tokio::test]
    async fn test_auto_mode_falls_back_to_tcp_when_icmp_fails() {
        // Arrange
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let mut echo = MockEcho::new();
        echo.expect_ping()
            .times(1)
            .returning(|_, _| Err(io::Error::new(io::ErrorKind::PermissionDenied, "raw socket")));
        let prober = SystemProber::with_echo(ProbeMethod::Auto, echo, true, port);

        // Act
        let online = prober.probe(LOCALHOST, TIMEOUT).await;

        // Assert
        assert!(online);
    }

    #[tokio::test]
    async fn test_auto_mode_trusts_an_icmp_timeout() {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let mut echo = MockEcho::new();
        echo.expect_ping().times(1).returning(|_, _| Ok(false));
        let prober = SystemProber::with_echo(ProbeMethod::Auto, echo, true, port);

        assert!(!prober.probe(LOCALHOST, TIMEOUT).await);
    }

    #[tokio::test]
    async fn test_auto_mode_without_privilege_skips_icmp() {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let mut echo = MockEcho::new();
        echo.expect_ping().times(0);
        let prober = SystemProber::with_echo(ProbeMethod::Auto, echo, false, port);

        assert!(prober.probe(LOCALHOST, TIMEOUT).await);
    }

    #[tokio::test]
    async fn test_system_prober_tcp_mode_uses_configured_port() {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let prober = SystemProber::new(ProbeMethod::Tcp, port);

        assert_eq!(prober.method(), ProbeMethod::Tcp);
        assert!(prober.probe(LOCALHOST, TIMEOUT).await);
    }
}
