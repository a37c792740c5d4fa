//! Infrastructure layer.
//!
//! Contains OS-facing adapters: the UDP broadcast sender, ICMP/TCP probers,
//! the JSON backing file and TOML settings, and the UI command bridge.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `wakey_core`, but MUST NOT be imported by the `application` or domain
//! layers.

pub mod network;
pub mod storage;
pub mod ui_bridge;
