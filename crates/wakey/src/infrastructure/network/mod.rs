//! Network infrastructure.
//!
//! # Sub-modules
//!
//! - **`broadcast`** – Sends the 102-byte magic packet as a single UDP
//!   datagram to the broadcast destination (255.255.255.255:9 unless
//!   configured otherwise).  A fresh socket is used per send.
//!
//! - **`probe`** – Reachability probers: ICMP echo when the process is
//!   privileged, TCP connect otherwise, and `SystemProber` which picks
//!   between them per the configured `ProbeMethod`.

pub mod broadcast;
pub mod probe;
