//! JSON backing file for devices and groups.
//!
//! The file is a single JSON object with a `devices` and a `groups` array.
//! It is rewritten in full on every save, pretty-printed with two-space
//! indentation so it stays hand-editable.
//!
//! ```json
//! {
//!   "devices": [
//!     {
//!       "id": "4f1c…",
//!       "name": "PC1",
//!       "description": "desk",
//!       "macAddress": "AA:BB:CC:DD:EE:FF",
//!       "ipAddress": "192.168.1.10",
//!       "state": "online"
//!     }
//!   ],
//!   "groups": [
//!     { "id": "9a0e…", "name": "office", "deviceIds": ["4f1c…"] }
//!   ]
//! }
//! ```
//!
//! # Key matching
//!
//! Keys are matched without regard to case, and the older PascalCase names
//! (`DeviceName`, `GroupName`, `Status`, a group's `Devices`) map onto the
//! current ones, so files written by earlier releases or by hand still load.
//!
//! # Atomic replace
//!
//! Saves write a sibling temp file, sync it, then rename it over the real
//! file, so a crash mid-write leaves either the old or the new content and
//! never a truncated file.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::debug;
use uuid::Uuid;
use wakey_core::Configuration;

use crate::application::config_store::{ConfigRepository, LoadOutcome, PersistError};

/// File name of the backing file inside the home directory.
pub const STORE_FILE_NAME: &str = ".wakey_config.json";

/// Resolves `~/.wakey_config.json`.
///
/// # Errors
///
/// Returns [`PersistError::Unavailable`] if no home directory is set.
pub fn default_store_path() -> Result<PathBuf, PersistError> {
    home_dir()
        .map(|home| home.join(STORE_FILE_NAME))
        .ok_or_else(|| PersistError::Unavailable("could not determine home directory".to_string()))
}

/// The JSON file at a fixed path.
#[derive(Debug, Clone)]
pub struct BackingFile {
    path: PathBuf,
}

impl BackingFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file at [`default_store_path`].
    pub fn at_default_location() -> Result<Self, PersistError> {
        default_store_path().map(Self::new)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> PersistError {
        PersistError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn write_replacing(&self, content: &[u8]) -> Result<(), PersistError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|source| PersistError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let tmp = self.temp_path();
        let written = File::create(&tmp)
            .and_then(|mut file| {
                file.write_all(content)?;
                file.sync_all()
            })
            .and_then(|()| fs::rename(&tmp, &self.path));

        if let Err(source) = written {
            // The temp file may or may not exist depending on where we failed.
            let _ = fs::remove_file(&tmp);
            return Err(self.io_error(source));
        }
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| STORE_FILE_NAME.into());
        name.push(format!(".{}.tmp", Uuid::new_v4().simple()));
        self.path.with_file_name(name)
    }
}

impl ConfigRepository for BackingFile {
    fn load(&self) -> Result<LoadOutcome, PersistError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(LoadOutcome::Missing),
            Err(e) => return Err(self.io_error(e)),
        };

        match decode(&content) {
            Ok(config) => {
                debug!(
                    path = %self.path.display(),
                    devices = config.devices.len(),
                    groups = config.groups.len(),
                    "configuration loaded"
                );
                Ok(LoadOutcome::Loaded(config))
            }
            Err(e) => Ok(LoadOutcome::Unreadable(format!(
                "{}: {e}",
                self.path.display()
            ))),
        }
    }

    fn save(&self, config: &Configuration) -> Result<(), PersistError> {
        let mut content =
            serde_json::to_vec_pretty(config).map_err(|e| PersistError::Encode(e.to_string()))?;
        content.push(b'\n');
        self.write_replacing(&content)?;
        debug!(path = %self.path.display(), "configuration saved");
        Ok(())
    }
}

/// Maps a lower-cased key to its current spelling.
type KeyMap = fn(&str) -> Option<&'static str>;

fn decode(content: &str) -> Result<Configuration, serde_json::Error> {
    let mut value: Value = serde_json::from_str(content)?;
    if let Value::Object(root) = &mut value {
        rename_keys(root, root_key);
        let sections: [(&str, KeyMap); 2] = [("devices", device_key), ("groups", group_key)];
        for (section, canonical) in sections {
            if let Some(Value::Array(records)) = root.get_mut(section) {
                for record in records.iter_mut().filter_map(Value::as_object_mut) {
                    rename_keys(record, canonical);
                }
            }
        }
    }
    serde_json::from_value(value)
}

fn rename_keys(map: &mut Map<String, Value>, canonical: KeyMap) {
    for (key, value) in std::mem::take(map) {
        let key = canonical(&key.to_ascii_lowercase()).map_or(key, str::to_string);
        map.insert(key, value);
    }
}

fn root_key(lower: &str) -> Option<&'static str> {
    match lower {
        "devices" => Some("devices"),
        "groups" => Some("groups"),
        _ => None,
    }
}

fn device_key(lower: &str) -> Option<&'static str> {
    match lower {
        "id" => Some("id"),
        "name" | "devicename" => Some("name"),
        "description" => Some("description"),
        "macaddress" => Some("macAddress"),
        "ipaddress" => Some("ipAddress"),
        "state" | "status" => Some("state"),
        _ => None,
    }
}

fn group_key(lower: &str) -> Option<&'static str> {
    match lower {
        "id" => Some("id"),
        "name" | "groupname" => Some("name"),
        "deviceids" | "devices" => Some("deviceIds"),
        _ => None,
    }
}

fn home_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("USERPROFILE").map(PathBuf::from)
    }

    #[cfg(not(target_os = "windows"))]
    {
        std::env::var_os("HOME").map(PathBuf::from)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
