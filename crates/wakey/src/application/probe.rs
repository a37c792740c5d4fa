//! Reachability probing capability.
//!
//! The store only needs a yes/no answer to "did this host answer within the
//! timeout?".  How that answer is obtained (raw ICMP echo, a TCP connect, or a
//! canned test value) is hidden behind [`Prober`] so the privileged and
//! unprivileged strategies can be swapped without touching the store.
//!
//! A probe never fails: any setup error, timeout, unreachable host, or
//! malformed address is reported as `false` ("offline").

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

/// Default probe timeout.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(1);

/// Issues a single liveness probe against a host.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Prober: Send + Sync {
    /// Returns `true` only if the host answered within `timeout`.
    async fn probe(&self, ip: IpAddr, timeout: Duration) -> bool;
}

/// Parses `ip` and probes it, treating an unparseable address as offline.
pub async fn is_online(prober: &dyn Prober, ip: &str, timeout: Duration) -> bool {
    match ip.trim().parse::<IpAddr>() {
        Ok(addr) => prober.probe(addr, timeout).await,
        Err(_) => {
            debug!(ip, "malformed address, reporting offline");
            false
        }
    }
}
