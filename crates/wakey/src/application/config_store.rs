//! ConfigStore: device and group CRUD over a persisted [`Configuration`].
//!
//! Every public operation is a complete read → mutate → write cycle against
//! the repository.  No in-memory copy is treated as authoritative between
//! calls; the file is re-read each time.
//!
//! # Concurrency
//!
//! The store holds an async mutex for the whole cycle, so two overlapping
//! calls through the same `ConfigStore` cannot interleave their load/save
//! pairs.  Nothing guards against a *second process* writing the same file:
//! the later full-file overwrite wins and the earlier change is lost.
//!
//! # Referential integrity
//!
//! Creating or updating a group requires every member id to name an existing
//! device.  Deleting a device does **not** prune it from groups; the dangling
//! id is skipped when the group is resolved to MAC addresses.
//!
//! # Failure semantics
//!
//! Validation and lookup failures abort before anything is written, so the
//! file is byte-identical before and after a failed call.  A store that
//! exists but cannot be decoded is never overwritten: reads see it as empty,
//! mutations fail with [`PersistError::Unreadable`].
//!
//! Records loaded without an id (files from the oldest releases) are given a
//! fresh one, and the store is rewritten so the id sticks.
//!
//! Repository calls are blocking file I/O and run on the blocking pool.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use wakey_core::{
    Configuration, Device, DeviceDraft, DeviceId, DeviceState, Group, GroupDraft, GroupId,
    MacAddress, ValidationError,
};

use crate::application::probe::{is_online, Prober};

/// The backing store could not be read or written.
#[derive(Debug, Error)]
pub enum PersistError {
    /// No location for the backing file could be determined.
    #[error("backing file location unavailable: {0}")]
    Unavailable(String),

    /// A file system I/O error occurred.
    #[error("I/O error accessing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration could not be encoded.
    #[error("failed to encode configuration: {0}")]
    Encode(String),

    /// The store exists but cannot be decoded; it is left as is.
    #[error("configuration is unreadable, refusing to overwrite it: {0}")]
    Unreadable(String),

    /// The blocking storage task panicked or was cancelled.
    #[error("storage task did not complete: {0}")]
    Task(String),
}

/// Errors returned by [`ConfigStore`] operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("device not found: {0}")]
    DeviceNotFound(DeviceId),

    #[error("group not found: {0}")]
    GroupNotFound(GroupId),

    /// A group referenced a device id that does not exist.
    #[error("'{0}' device does not exist")]
    UnknownDevice(DeviceId),

    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// What a repository found when asked for the persisted configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded(Configuration),
    /// Nothing has been saved yet.
    Missing,
    /// Something is stored but cannot be decoded.
    Unreadable(String),
}

/// Durable storage for the whole [`Configuration`].
///
/// The production implementation is
/// [`crate::infrastructure::storage::backing_file::BackingFile`].
pub trait ConfigRepository: Send + Sync {
    /// Reads the full configuration.
    fn load(&self) -> Result<LoadOutcome, PersistError>;

    /// Replaces the full configuration.
    fn save(&self, config: &Configuration) -> Result<(), PersistError>;
}

/// Device and group store with probe-driven state refresh.
pub struct ConfigStore<R> {
    repository: Arc<R>,
    prober: Arc<dyn Prober>,
    probe_timeout: Duration,
    lock: Mutex<()>,
}

impl<R: ConfigRepository + 'static> ConfigStore<R> {
    pub fn new(repository: R, prober: Arc<dyn Prober>, probe_timeout: Duration) -> Self {
        Self {
            repository: Arc::new(repository),
            prober,
            probe_timeout,
            lock: Mutex::new(()),
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Creates the backing store with two empty sequences if it is absent.
    ///
    /// Returns `true` if it was created by this call.
    pub async fn ensure_exists(&self) -> Result<bool, StoreError> {
        let _guard = self.lock.lock().await;
        match self.load_blocking().await? {
            LoadOutcome::Missing => {
                self.save_blocking(&Configuration::new()).await?;
                info!("created empty configuration");
                Ok(true)
            }
            LoadOutcome::Loaded(_) | LoadOutcome::Unreadable(_) => Ok(false),
        }
    }

    /// Reads the current configuration.
    ///
    /// Never fails: a missing store is created empty, and an unreadable one
    /// is reported in the log and treated as empty.
    pub async fn load(&self) -> Configuration {
        let _guard = self.lock.lock().await;
        match self.read_for_update().await {
            Ok(config) => config,
            Err(e) => {
                warn!("failed to read configuration, using empty: {e}");
                Configuration::new()
            }
        }
    }

    /// Overwrites the stored configuration.
    pub async fn save(&self, config: &Configuration) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        self.save_blocking(config).await?;
        Ok(())
    }

    pub async fn list_devices(&self) -> Vec<Device> {
        self.load().await.devices
    }

    pub async fn list_groups(&self) -> Vec<Group> {
        self.load().await.groups
    }

    /// Validates `draft`, assigns a fresh id, and appends the device.
    ///
    /// The new device has no state until the next refresh.
    pub async fn create_device(&self, draft: DeviceDraft) -> Result<Device, StoreError> {
        let device = draft.into_device(DeviceId::generate(), None)?;
        let _guard = self.lock.lock().await;
        let mut config = self.read_for_update().await?;
        config.devices.push(device.clone());
        self.save_blocking(&config).await?;
        info!(id = %device.id, name = %device.name, "device created");
        Ok(device)
    }

    /// Replaces the editable fields of device `id`, keeping its id and state.
    pub async fn update_device(&self, id: &DeviceId, draft: DeviceDraft) -> Result<Device, StoreError> {
        let _guard = self.lock.lock().await;
        let mut config = self.read_for_update().await?;
        let slot = config
            .device_mut(id)
            .ok_or_else(|| StoreError::DeviceNotFound(id.clone()))?;
        let updated = draft.into_device(slot.id.clone(), slot.state)?;
        *slot = updated.clone();
        self.save_blocking(&config).await?;
        info!(id = %updated.id, "device updated");
        Ok(updated)
    }

    /// Removes device `id`.  Group memberships are left dangling.
    pub async fn delete_device(&self, id: &DeviceId) -> Result<Device, StoreError> {
        let _guard = self.lock.lock().await;
        let mut config = self.read_for_update().await?;
        let removed = config
            .remove_device(id)
            .ok_or_else(|| StoreError::DeviceNotFound(id.clone()))?;
        self.save_blocking(&config).await?;
        info!(id = %removed.id, name = %removed.name, "device deleted");
        Ok(removed)
    }

    /// Validates `draft`, checks every member exists, and appends the group.
    pub async fn create_group(&self, draft: GroupDraft) -> Result<Group, StoreError> {
        let group = draft.into_group(GroupId::generate())?;
        let _guard = self.lock.lock().await;
        let mut config = self.read_for_update().await?;
        check_members(&config, &group.device_ids)?;
        config.groups.push(group.clone());
        self.save_blocking(&config).await?;
        info!(id = %group.id, name = %group.name, members = group.device_ids.len(), "group created");
        Ok(group)
    }

    /// Replaces the name and members of group `id`, keeping its id.
    pub async fn update_group(&self, id: &GroupId, draft: GroupDraft) -> Result<Group, StoreError> {
        let _guard = self.lock.lock().await;
        let mut config = self.read_for_update().await?;
        if config.group(id).is_none() {
            return Err(StoreError::GroupNotFound(id.clone()));
        }
        let updated = draft.into_group(id.clone())?;
        check_members(&config, &updated.device_ids)?;
        if let Some(slot) = config.group_mut(id) {
            *slot = updated.clone();
        }
        self.save_blocking(&config).await?;
        info!(id = %updated.id, "group updated");
        Ok(updated)
    }

    pub async fn delete_group(&self, id: &GroupId) -> Result<Group, StoreError> {
        let _guard = self.lock.lock().await;
        let mut config = self.read_for_update().await?;
        let removed = config
            .remove_group(id)
            .ok_or_else(|| StoreError::GroupNotFound(id.clone()))?;
        self.save_blocking(&config).await?;
        info!(id = %removed.id, name = %removed.name, "group deleted");
        Ok(removed)
    }

    /// Probes every device, overwrites its state, persists, and returns the
    /// updated configuration.
    ///
    /// Probes run concurrently; each is bounded by the probe timeout, so the
    /// sweep takes roughly one timeout regardless of device count.
    pub async fn refresh_state(&self) -> Result<Configuration, StoreError> {
        let _guard = self.lock.lock().await;
        let mut config = self.read_for_update().await?;

        let mut probes = JoinSet::new();
        for (idx, device) in config.devices.iter().enumerate() {
            let prober = Arc::clone(&self.prober);
            let ip = device.ip_address.clone();
            let timeout = self.probe_timeout;
            probes.spawn(async move { (idx, is_online(prober.as_ref(), &ip, timeout).await) });
        }

        let mut reachable = vec![false; config.devices.len()];
        while let Some(joined) = probes.join_next().await {
            match joined {
                Ok((idx, online)) => reachable[idx] = online,
                Err(e) => warn!("probe task failed, reporting offline: {e}"),
            }
        }

        for (device, online) in config.devices.iter_mut().zip(reachable) {
            device.state = Some(DeviceState::from_reachable(online));
            debug!(id = %device.id, ip = %device.ip_address, state = %DeviceState::from_reachable(online), "probed");
        }

        self.save_blocking(&config).await?;
        Ok(config)
    }

    /// MAC addresses of group `id`'s members in group order, skipping
    /// members whose device no longer exists.
    pub async fn resolve_group_macs(&self, id: &GroupId) -> Result<Vec<MacAddress>, StoreError> {
        let config = self.load().await;
        config
            .resolve_group_macs(id)
            .ok_or_else(|| StoreError::GroupNotFound(id.clone()))
    }

    /// Loads for a mutating operation.  A missing store is created empty;
    /// an undecodable one or an I/O failure aborts.
    async fn read_for_update(&self) -> Result<Configuration, PersistError> {
        match self.load_blocking().await? {
            LoadOutcome::Loaded(mut config) => {
                if config.assign_missing_ids() {
                    info!("assigned ids to records stored without one");
                    if let Err(e) = self.save_blocking(&config).await {
                        warn!("could not persist assigned ids: {e}");
                    }
                }
                Ok(config)
            }
            LoadOutcome::Missing => {
                let empty = Configuration::new();
                if let Err(e) = self.save_blocking(&empty).await {
                    warn!("could not create empty configuration: {e}");
                }
                Ok(empty)
            }
            LoadOutcome::Unreadable(reason) => Err(PersistError::Unreadable(reason)),
        }
    }

    async fn load_blocking(&self) -> Result<LoadOutcome, PersistError> {
        let repository = Arc::clone(&self.repository);
        tokio::task::spawn_blocking(move || repository.load())
            .await
            .map_err(|e| PersistError::Task(e.to_string()))?
    }

    async fn save_blocking(&self, config: &Configuration) -> Result<(), PersistError> {
        let repository = Arc::clone(&self.repository);
        let config = config.clone();
        tokio::task::spawn_blocking(move || repository.save(&config))
            .await
            .map_err(|e| PersistError::Task(e.to_string()))?
    }
}

fn check_members(config: &Configuration, ids: &[DeviceId]) -> Result<(), StoreError> {
    match config.first_unknown_device(ids) {
        Some(unknown) => Err(StoreError::UnknownDevice(unknown.clone())),
        None => Ok(()),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
