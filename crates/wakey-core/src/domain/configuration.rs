//! The root aggregate persisted to the backing file.
//!
//! ```json
//! { "devices": [ … ], "groups": [ … ] }
//! ```
//!
//! Both sequences default to empty when absent, so a file containing `{}`
//! loads as an empty configuration.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::device::{Device, DeviceId};
use crate::domain::group::{Group, GroupId};
use crate::protocol::mac::MacAddress;

/// All devices and groups the user maintains.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    #[serde(default)]
    pub devices: Vec<Device>,
    #[serde(default)]
    pub groups: Vec<Group>,
}

impl Configuration {
    /// Creates an empty configuration (no devices, no groups).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn device(&self, id: &DeviceId) -> Option<&Device> {
        self.devices.iter().find(|d| &d.id == id)
    }

    pub fn device_mut(&mut self, id: &DeviceId) -> Option<&mut Device> {
        self.devices.iter_mut().find(|d| &d.id == id)
    }

    pub fn contains_device(&self, id: &DeviceId) -> bool {
        self.device(id).is_some()
    }

    pub fn group(&self, id: &GroupId) -> Option<&Group> {
        self.groups.iter().find(|g| &g.id == id)
    }

    pub fn group_mut(&mut self, id: &GroupId) -> Option<&mut Group> {
        self.groups.iter_mut().find(|g| &g.id == id)
    }

    /// Gives a fresh id to every device and group stored with an empty one.
    ///
    /// Returns `true` if any record changed.
    pub fn assign_missing_ids(&mut self) -> bool {
        let mut changed = false;
        for device in self.devices.iter_mut().filter(|d| d.id.as_str().is_empty()) {
            device.id = DeviceId::generate();
            changed = true;
        }
        for group in self.groups.iter_mut().filter(|g| g.id.as_str().is_empty()) {
            group.id = GroupId::generate();
            changed = true;
        }
        changed
    }

    /// Removes and returns the device with `id`.  Groups are left untouched,
    /// so any membership of the removed device becomes a dangling id.
    pub fn remove_device(&mut self, id: &DeviceId) -> Option<Device> {
        let idx = self.devices.iter().position(|d| &d.id == id)?;
        Some(self.devices.remove(idx))
    }

    /// Removes and returns the group with `id`.
    pub fn remove_group(&mut self, id: &GroupId) -> Option<Group> {
        let idx = self.groups.iter().position(|g| &g.id == id)?;
        Some(self.groups.remove(idx))
    }

    /// Returns the first id in `ids` that does not name a current device.
    pub fn first_unknown_device<'a>(&self, ids: &'a [DeviceId]) -> Option<&'a DeviceId> {
        ids.iter().find(|id| !self.contains_device(id))
    }

    /// Maps the group's members to MAC addresses in group order.
    ///
    /// Dangling ids are skipped.  Returns `None` only when the group itself
    /// does not exist.
    pub fn resolve_group_macs(&self, id: &GroupId) -> Option<Vec<MacAddress>> {
        let group = self.group(id)?;
        let macs = group
            .device_ids
            .iter()
            .filter_map(|device_id| match self.device(device_id) {
                Some(device) => Some(device.mac_address),
                None => {
                    debug!(group = %group.id, device = %device_id, "skipping dangling group member");
                    None
                }
            })
            .collect();
        Some(macs)
    }

    /// Display names of the group's members in group order.  A dangling id
    /// is shown as the raw id.
    pub fn group_member_names(&self, group: &Group) -> Vec<String> {
        group
            .device_ids
            .iter()
            .map(|device_id| match self.device(device_id) {
                Some(device) => device.name.clone(),
                None => device_id.to_string(),
            })
            .collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::device::DeviceDraft;
    use crate::domain::group::GroupDraft;

    fn device(id: &str, name: &str, mac: &str) -> Device {
        DeviceDraft::new(name, "desc", mac, "10.0.0.1")
            .into_device(id.into(), None)
            .unwrap()
    }

    fn sample() -> Configuration {
        let mut cfg = Configuration::new();
        cfg.devices.push(device("d-1", "PC1", "AA:BB:CC:DD:EE:FF"));
        cfg.devices.push(device("d-2", "PC2", "00:11:22:33:44:55"));
        cfg.groups.push(
            GroupDraft::new("office", vec!["d-2".into(), "gone".into(), "d-1".into()])
                .into_group("g-1".into())
                .unwrap(),
        );
        cfg
    }

    #[test]
    fn test_new_is_empty() {
        let cfg = Configuration::new();
        assert!(cfg.devices.is_empty());
        assert!(cfg.groups.is_empty());
    }

    #[test]
    fn test_resolve_group_macs_skips_dangling_and_keeps_order() {
        // Arrange
        let cfg = sample();

        // Act
        let macs = cfg.resolve_group_macs(&"g-1".into()).unwrap();

        // Assert
        let text: Vec<String> = macs.iter().map(ToString::to_string).collect();
        assert_eq!(text, vec!["00:11:22:33:44:55", "AA:BB:CC:DD:EE:FF"]);
    }

    #[test]
    fn test_resolve_group_macs_returns_none_for_unknown_group() {
        assert!(sample().resolve_group_macs(&"missing".into()).is_none());
    }

    #[test]
    fn test_resolve_group_macs_of_all_dangling_group_is_empty() {
        let mut cfg = sample();
        cfg.devices.clear();
        assert_eq!(cfg.resolve_group_macs(&"g-1".into()), Some(vec![]));
    }

    #[test]
    fn test_remove_device_does_not_touch_groups() {
        let mut cfg = sample();

        let removed = cfg.remove_device(&"d-1".into());

        assert_eq!(removed.map(|d| d.name), Some("PC1".to_string()));
        assert_eq!(cfg.groups[0].device_ids.len(), 3);
    }

    #[test]
    fn test_remove_missing_device_returns_none() {
        let mut cfg = sample();
        assert!(cfg.remove_device(&"nope".into()).is_none());
        assert_eq!(cfg.devices.len(), 2);
    }

    #[test]
    fn test_first_unknown_device_names_offender() {
        let cfg = sample();
        let ids: Vec<DeviceId> = vec!["d-1".into(), "ghost".into(), "other".into()];
        assert_eq!(cfg.first_unknown_device(&ids), Some(&DeviceId::from("ghost")));
        assert_eq!(cfg.first_unknown_device(&ids[..1]), None);
    }

    #[test]
    fn test_group_member_names_falls_back_to_raw_id() {
        let cfg = sample();
        let names = cfg.group_member_names(&cfg.groups[0]);
        assert_eq!(names, vec!["PC2", "gone", "PC1"]);
    }

    #[test]
    fn test_assign_missing_ids_fills_only_empty_ids() {
        // Arrange: two devices and a group written without ids.
        let mut cfg = sample();
        cfg.devices.push(device("", "NAS", "00:00:00:00:00:01"));
        cfg.devices.push(device("", "TV", "00:00:00:00:00:02"));
        cfg.groups.push(GroupDraft::new("media", vec![]).into_group("".into()).unwrap());

        // Act
        let changed = cfg.assign_missing_ids();

        // Assert
        assert!(changed);
        assert_eq!(cfg.devices[0].id.as_str(), "d-1");
        assert_eq!(cfg.devices[1].id.as_str(), "d-2");
        assert!(!cfg.devices[2].id.as_str().is_empty());
        assert!(!cfg.devices[3].id.as_str().is_empty());
        assert_ne!(cfg.devices[2].id, cfg.devices[3].id);
        assert_eq!(cfg.groups[0].id.as_str(), "g-1");
        assert!(!cfg.groups[1].id.as_str().is_empty());
        assert!(!cfg.assign_missing_ids());
    }

    #[test]
    fn test_deserialize_empty_object_yields_empty_configuration() {
        let cfg: Configuration = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, Configuration::new());
    }

    #[test]
    fn test_deserialize_legacy_file_without_groups() {
        let legacy = r#"{"devices":[{"DeviceName":"Device1","Description":"test","MacAddress":"00:00:00:00:00:00","IPAddress":"1.1.1.1"}]}"#;

        let cfg: Configuration = serde_json::from_str(legacy).unwrap();

        assert_eq!(cfg.devices.len(), 1);
        assert_eq!(cfg.devices[0].name, "Device1");
        assert!(cfg.groups.is_empty());
    }
}
