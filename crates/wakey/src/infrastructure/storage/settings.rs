//! TOML settings for the tool itself.
//!
//! Devices and groups live in the JSON backing file; this file only holds
//! knobs for how the tool behaves.  It is read from the platform config
//! directory:
//! - Windows:  `%APPDATA%\Wakey\settings.toml`
//! - Linux:    `~/.config/wakey/settings.toml`
//! - macOS:    `~/Library/Application Support/Wakey/settings.toml`
//!
//! ```toml
//! [general]
//! log_level = "info"
//! # store_path = "/srv/wakey/devices.json"
//!
//! [wake]
//! broadcast_address = "255.255.255.255"
//! port = 9
//!
//! [probe]
//! method = "auto"
//! timeout_ms = 1000
//! tcp_port = 80
//! ```
//!
//! Every section and field is optional; anything absent takes the default
//! shown above, so a missing file behaves exactly like an empty one.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::infrastructure::network::probe::ProbeMethod;

/// Error type for settings file operations.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing settings at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse settings TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The settings could not be serialized to TOML.
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// `wake.broadcast_address` is not an IPv4 address.
    #[error("invalid broadcast address '{0}'")]
    InvalidBroadcastAddress(String),
}

// ── Settings schema ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    #[serde(default)]
    pub general: GeneralSettings,
    #[serde(default)]
    pub wake: WakeSettings,
    #[serde(default)]
    pub probe: ProbeSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneralSettings {
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Overrides `~/.wakey_config.json`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_path: Option<PathBuf>,
}

/// Where magic packets are sent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WakeSettings {
    /// Limited broadcast by default; a subnet-directed broadcast such as
    /// `"192.168.1.255"` also works.
    #[serde(default = "default_broadcast_address")]
    pub broadcast_address: String,
    #[serde(default = "default_wake_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProbeSettings {
    #[serde(default)]
    pub method: ProbeMethod,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Port used by the TCP connect probe.
    #[serde(default = "default_tcp_port")]
    pub tcp_port: u16,
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_broadcast_address() -> String {
    Ipv4Addr::BROADCAST.to_string()
}
fn default_wake_port() -> u16 {
    9
}
fn default_timeout_ms() -> u64 {
    1000
}
fn default_tcp_port() -> u16 {
    80
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            store_path: None,
        }
    }
}

impl Default for WakeSettings {
    fn default() -> Self {
        Self {
            broadcast_address: default_broadcast_address(),
            port: default_wake_port(),
        }
    }
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            method: ProbeMethod::default(),
            timeout_ms: default_timeout_ms(),
            tcp_port: default_tcp_port(),
        }
    }
}

impl WakeSettings {
    /// Resolves the destination socket address.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidBroadcastAddress`] if the address is
    /// not a dotted-quad IPv4 address.
    pub fn destination(&self) -> Result<SocketAddr, SettingsError> {
        let ip: Ipv4Addr = self
            .broadcast_address
            .trim()
            .parse()
            .map_err(|_| SettingsError::InvalidBroadcastAddress(self.broadcast_address.clone()))?;
        Ok(SocketAddr::V4(SocketAddrV4::new(ip, self.port)))
    }
}

impl ProbeSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

// ── Settings repository ───────────────────────────────────────────────────────

/// Resolves the full path to the settings file.
///
/// # Errors
///
/// Returns [`SettingsError::NoPlatformConfigDir`] if the base directory cannot
/// be determined.
pub fn settings_file_path() -> Result<PathBuf, SettingsError> {
    platform_config_dir()
        .map(|dir| dir.join("settings.toml"))
        .ok_or(SettingsError::NoPlatformConfigDir)
}

/// Loads settings from the platform config directory, returning defaults if
/// the file does not exist yet.
pub fn load_settings() -> Result<Settings, SettingsError> {
    load_settings_from(&settings_file_path()?)
}

/// Loads settings from `path`, returning defaults if the file is absent.
///
/// # Errors
///
/// Returns [`SettingsError::Io`] for file-system errors other than "not
/// found", and [`SettingsError::Parse`] if the TOML is malformed.
pub fn load_settings_from(path: &Path) -> Result<Settings, SettingsError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Settings::default()),
        Err(source) => Err(SettingsError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Writes `settings` to `path`, creating parent directories as needed.
pub fn save_settings_to(path: &Path, settings: &Settings) -> Result<(), SettingsError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| SettingsError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(settings)?;
    std::fs::write(path, content).map_err(|source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("Wakey"))
    }

    #[cfg(target_os = "linux")]
    {
        // XDG_CONFIG_HOME or ~/.config
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("wakey"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("Wakey")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
