//! Group domain entity: a named, ordered list of device ids woken together.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::device::DeviceId;
use crate::domain::validation::{validate_group_name, ValidationError};

/// Opaque, immutable group identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(String);

impl GroupId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for GroupId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for GroupId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A persisted group record.
///
/// `device_ids` keeps the user's order.  Ids may dangle after a device is
/// deleted; resolution skips them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    #[serde(default, alias = "ID")]
    pub id: GroupId,
    #[serde(default, alias = "GroupName")]
    pub name: String,
    #[serde(default, alias = "Devices")]
    pub device_ids: Vec<DeviceId>,
}

/// User-submitted group fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupDraft {
    pub name: String,
    pub device_ids: Vec<DeviceId>,
}

impl GroupDraft {
    pub fn new(name: impl Into<String>, device_ids: Vec<DeviceId>) -> Self {
        Self {
            name: name.into(),
            device_ids,
        }
    }

    /// Validates the name and builds a [`Group`] with the given identity.
    ///
    /// Membership is checked against the device set by
    /// [`crate::Configuration::first_unknown_device`], not here.
    pub fn into_group(self, id: GroupId) -> Result<Group, ValidationError> {
        validate_group_name(&self.name)?;
        Ok(Group {
            id,
            name: self.name,
            device_ids: self.device_ids,
        })
    }
}
