//! Application layer use cases.
//!
//! Use cases in this layer orchestrate domain objects from `wakey_core` and
//! depend on abstractions (traits) rather than concrete sockets, so the
//! infrastructure can be swapped without changing this code.
//!
//! # Sub-modules
//!
//! - **`probe`**        – The `Prober` capability: "is this host reachable
//!   within a timeout?".  Implemented by ICMP and TCP probers in
//!   `infrastructure::network::probe`.
//!
//! - **`wake`**         – Validates a MAC, builds the magic packet, and hands
//!   it to a `PacketSender`.  Waking a group stops at the first failure.
//!
//! - **`config_store`** – Device and group CRUD over the JSON backing file
//!   with referential-integrity checks, plus the state refresh that feeds
//!   probe results into each device.

pub mod config_store;
pub mod probe;
pub mod wake;
