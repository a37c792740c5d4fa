//! Device domain entity.
//!
//! A device is a machine the user can wake by MAC address and whose liveness
//! is probed by IP address.  The persisted JSON layout is:
//!
//! ```json
//! {
//!   "id": "5c1e…",
//!   "name": "PC1",
//!   "description": "desk",
//!   "macAddress": "AA:BB:CC:DD:EE:FF",
//!   "ipAddress": "192.168.1.10",
//!   "state": "online"
//! }
//! ```
//!
//! Files written by earlier releases used `ID`, `DeviceName`, `Description`,
//! `MacAddress`, `IPAddress` and `State` (or `Status`) with capitalised state
//! values.  Those keys are still accepted on load; saving always uses the
//! layout above.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::domain::validation::{
    validate_description, validate_device_name, validate_ip, validate_mac, ValidationError,
};
use crate::protocol::mac::MacAddress;

/// Opaque, immutable device identifier.
///
/// Generated from a UUID v4 at creation and never reused.  Stored as a plain
/// string so identifiers written by other tools still load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    /// Generates a fresh identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for DeviceId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for DeviceId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Result of the most recent reachability probe.
///
/// Derived; only a state refresh writes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceState {
    #[serde(alias = "Online")]
    Online,
    #[serde(alias = "Offline")]
    Offline,
}

impl DeviceState {
    /// Maps a probe result onto a state.
    pub fn from_reachable(reachable: bool) -> Self {
        if reachable {
            Self::Online
        } else {
            Self::Offline
        }
    }
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Online => f.write_str("online"),
            Self::Offline => f.write_str("offline"),
        }
    }
}

/// A persisted device record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    #[serde(default, alias = "ID")]
    pub id: DeviceId,
    #[serde(default, alias = "DeviceName")]
    pub name: String,
    #[serde(default, alias = "Description")]
    pub description: String,
    #[serde(alias = "MacAddress")]
    pub mac_address: MacAddress,
    /// Kept as text: the prober treats an unparseable address as offline.
    #[serde(default, alias = "IPAddress")]
    pub ip_address: String,
    /// `None` until the first state refresh.
    #[serde(
        default,
        alias = "State",
        alias = "Status",
        deserialize_with = "deserialize_state",
        skip_serializing_if = "Option::is_none"
    )]
    pub state: Option<DeviceState>,
}

/// Treats an empty string (written by older releases before the first probe)
/// as "not yet probed".
fn deserialize_state<'de, D>(deserializer: D) -> Result<Option<DeviceState>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawState {
        Known(DeviceState),
        Other(String),
    }

    match Option::<RawState>::deserialize(deserializer)? {
        Some(RawState::Known(state)) => Ok(Some(state)),
        Some(RawState::Other(text)) if text.is_empty() => Ok(None),
        Some(RawState::Other(text)) => Err(serde::de::Error::unknown_variant(
            &text,
            &["online", "offline"],
        )),
        None => Ok(None),
    }
}

/// User-submitted device fields, as typed into a form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceDraft {
    pub name: String,
    pub description: String,
    pub mac_address: String,
    pub ip_address: String,
}

impl DeviceDraft {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        mac_address: impl Into<String>,
        ip_address: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            mac_address: mac_address.into(),
            ip_address: ip_address.into(),
        }
    }

    /// Validates every field and builds a [`Device`] with the given identity.
    ///
    /// Checks run in form order: name, description, MAC, IP.  The first
    /// failure is returned.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] encountered.
    pub fn into_device(
        self,
        id: DeviceId,
        state: Option<DeviceState>,
    ) -> Result<Device, ValidationError> {
        validate_device_name(&self.name)?;
        validate_description(&self.description)?;
        let mac_address = validate_mac(&self.mac_address)?;
        let ip = validate_ip(&self.ip_address)?;

        Ok(Device {
            id,
            name: self.name,
            description: self.description,
            mac_address,
            ip_address: ip.to_string(),
            state,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
