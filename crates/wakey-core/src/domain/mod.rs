//! Domain entities for Wakey.
//!
//! This module contains pure business logic with no infrastructure dependencies.
//!
//! # What lives here
//!
//! - **`device`** – A machine the user can wake and whose liveness is probed.
//! - **`group`** – A named, ordered list of device ids woken together.
//! - **`configuration`** – The root aggregate persisted to the backing file,
//!   plus the lookups that keep groups and devices consistent.
//! - **`validation`** – Field rules shared by create and update.
//!
//! Nothing here touches the file system or the network; the `wakey` crate
//! loads and saves a [`configuration::Configuration`] and feeds it probe
//! results.

pub mod configuration;
pub mod device;
pub mod group;
pub mod validation;
