//! Command bridge: the operations a presentation layer (GUI, TUI, web view)
//! calls.
//!
//! Every command takes the shared [`AppState`] and returns a
//! [`CommandResult`], so callers always get the same shape:
//! `{ success: bool, data: T | null, error: { kind, message } | null }`.
//! Mutating commands return a short human-readable description of what
//! happened as their `data`; the caller decides how to show it.  There is no
//! process-wide "last status" variable.
//!
//! # Data Transfer Objects
//!
//! The domain types carry newtype ids and a typed MAC address.  The DTOs here
//! flatten those into plain strings so any frontend can consume them as JSON.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use wakey_core::{Configuration, Device, DeviceDraft, DeviceId, Group, GroupDraft, GroupId};

use crate::application::config_store::{ConfigStore, PersistError, StoreError};
use crate::application::wake::{WakeError, WakeService};
use crate::infrastructure::network::broadcast::BroadcastSender;
use crate::infrastructure::network::probe::SystemProber;
use crate::infrastructure::storage::backing_file::BackingFile;
use crate::infrastructure::storage::settings::{Settings, SettingsError};

// ── Shared application state ──────────────────────────────────────────────────

/// Errors raised while wiring up [`AppState`].
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// State shared between commands.
///
/// The store serializes its own load/save cycles, so commands may run
/// concurrently without an outer lock.
pub struct AppState {
    pub store: ConfigStore<BackingFile>,
    pub waker: WakeService<BroadcastSender>,
}

impl AppState {
    pub fn new(store: ConfigStore<BackingFile>, waker: WakeService<BroadcastSender>) -> Arc<Self> {
        Arc::new(Self { store, waker })
    }

    /// Builds the production wiring from `settings`.
    ///
    /// # Errors
    ///
    /// Fails if the wake destination is invalid or no backing file location
    /// can be determined.
    pub fn from_settings(settings: &Settings) -> Result<Arc<Self>, StartupError> {
        let destination = settings.wake.destination()?;
        let backing_file = match &settings.general.store_path {
            Some(path) => BackingFile::new(path),
            None => BackingFile::at_default_location()?,
        };
        let prober = SystemProber::new(settings.probe.method, settings.probe.tcp_port);
        info!(
            store = %backing_file.path().display(),
            %destination,
            probe = ?settings.probe.method,
            "wakey state initialised"
        );

        Ok(Self::new(
            ConfigStore::new(backing_file, Arc::new(prober), settings.probe.timeout()),
            WakeService::new(BroadcastSender::with_destination(destination)),
        ))
    }
}

// ── Data Transfer Objects ─────────────────────────────────────────────────────

/// One device as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDto {
    pub id: String,
    pub name: String,
    pub description: String,
    pub mac_address: String,
    pub ip_address: String,
    /// `"online"`, `"offline"`, or `None` before the first refresh.
    pub state: Option<String>,
}

impl From<&Device> for DeviceDto {
    fn from(d: &Device) -> Self {
        Self {
            id: d.id.to_string(),
            name: d.name.clone(),
            description: d.description.clone(),
            mac_address: d.mac_address.to_string(),
            ip_address: d.ip_address.clone(),
            state: d.state.map(|s| s.to_string()),
        }
    }
}

/// Device fields submitted from an add/edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceFormDto {
    pub name: String,
    pub description: String,
    pub mac_address: String,
    pub ip_address: String,
}

impl From<DeviceFormDto> for DeviceDraft {
    fn from(f: DeviceFormDto) -> Self {
        DeviceDraft::new(f.name, f.description, f.mac_address, f.ip_address)
    }
}

/// One group, with member names resolved for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupDto {
    pub id: String,
    pub name: String,
    pub device_ids: Vec<String>,
    /// Device names in member order; a deleted member shows its raw id.
    pub member_names: Vec<String>,
}

impl GroupDto {
    fn new(group: &Group, config: &Configuration) -> Self {
        Self {
            id: group.id.to_string(),
            name: group.name.clone(),
            device_ids: group.device_ids.iter().map(ToString::to_string).collect(),
            member_names: config.group_member_names(group),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupFormDto {
    pub name: String,
    pub device_ids: Vec<String>,
}

impl From<GroupFormDto> for GroupDraft {
    fn from(f: GroupFormDto) -> Self {
        GroupDraft::new(f.name, f.device_ids.into_iter().map(DeviceId::from).collect())
    }
}

// ── Results ───────────────────────────────────────────────────────────────────

/// Error category a frontend can branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    UnknownDevice,
    Socket,
    Persist,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandError {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<StoreError> for CommandError {
    fn from(e: StoreError) -> Self {
        let kind = match &e {
            StoreError::Validation(_) => ErrorKind::Validation,
            StoreError::DeviceNotFound(_) | StoreError::GroupNotFound(_) => ErrorKind::NotFound,
            StoreError::UnknownDevice(_) => ErrorKind::UnknownDevice,
            StoreError::Persist(_) => ErrorKind::Persist,
        };
        Self {
            kind,
            message: e.to_string(),
        }
    }
}

impl From<WakeError> for CommandError {
    fn from(e: WakeError) -> Self {
        let kind = match &e {
            WakeError::InvalidMac(_) => ErrorKind::Validation,
            WakeError::Socket { .. } => ErrorKind::Socket,
        };
        Self {
            kind,
            message: e.to_string(),
        }
    }
}

/// Unified response wrapper used by every command.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResult<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<CommandError>,
}

impl<T: Serialize> CommandResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(error: impl Into<CommandError>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

impl<T: Serialize, E: Into<CommandError>> From<Result<T, E>> for CommandResult<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::err(e),
        }
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

pub async fn list_devices(state: Arc<AppState>) -> CommandResult<Vec<DeviceDto>> {
    let devices = state.store.list_devices().await;
    CommandResult::ok(devices.iter().map(DeviceDto::from).collect())
}

pub async fn list_groups(state: Arc<AppState>) -> CommandResult<Vec<GroupDto>> {
    let config = state.store.load().await;
    let dtos = config
        .groups
        .iter()
        .map(|g| GroupDto::new(g, &config))
        .collect();
    CommandResult::ok(dtos)
}

pub async fn create_device(state: Arc<AppState>, form: DeviceFormDto) -> CommandResult<String> {
    state
        .store
        .create_device(form.into())
        .await
        .map(|d| format!("Device '{}' added", d.name))
        .into()
}

pub async fn update_device(
    state: Arc<AppState>,
    id: String,
    form: DeviceFormDto,
) -> CommandResult<String> {
    state
        .store
        .update_device(&DeviceId::from(id), form.into())
        .await
        .map(|d| format!("Device '{}' updated", d.name))
        .into()
}

pub async fn delete_device(state: Arc<AppState>, id: String) -> CommandResult<String> {
    state
        .store
        .delete_device(&DeviceId::from(id))
        .await
        .map(|d| format!("Device '{}' deleted", d.name))
        .into()
}

pub async fn create_group(state: Arc<AppState>, form: GroupFormDto) -> CommandResult<String> {
    state
        .store
        .create_group(form.into())
        .await
        .map(|g| format!("Group '{}' added", g.name))
        .into()
}

pub async fn update_group(
    state: Arc<AppState>,
    id: String,
    form: GroupFormDto,
) -> CommandResult<String> {
    state
        .store
        .update_group(&GroupId::from(id), form.into())
        .await
        .map(|g| format!("Group '{}' updated", g.name))
        .into()
}

pub async fn delete_group(state: Arc<AppState>, id: String) -> CommandResult<String> {
    state
        .store
        .delete_group(&GroupId::from(id))
        .await
        .map(|g| format!("Group '{}' deleted", g.name))
        .into()
}

/// Sends one magic packet to `mac`.
pub async fn wake_device(state: Arc<AppState>, mac: String) -> CommandResult<String> {
    state
        .waker
        .wake_device(&mac)
        .map(|target| format!("Magic packet sent to {target}"))
        .into()
}

/// Wakes every current member of group `id`, stopping at the first failure.
pub async fn wake_group(state: Arc<AppState>, id: String) -> CommandResult<String> {
    let macs = match state.store.resolve_group_macs(&GroupId::from(id)).await {
        Ok(macs) => macs,
        Err(e) => return CommandResult::err(e),
    };
    let macs: Vec<String> = macs.iter().map(ToString::to_string).collect();
    state
        .waker
        .wake_group(&macs)
        .map(|sent| format!("Magic packets sent to {sent} device(s)"))
        .into()
}

/// Probes every device and returns the refreshed list.
pub async fn refresh_state(state: Arc<AppState>) -> CommandResult<Vec<DeviceDto>> {
    state
        .store
        .refresh_state()
        .await
        .map(|config| config.devices.iter().map(DeviceDto::from).collect())
        .into()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
