//! Storage infrastructure.
//!
//! - **`backing_file`** – The JSON file holding devices and groups
//!   (`~/.wakey_config.json` by default).  Implements
//!   `application::config_store::ConfigRepository`.
//!
//! - **`settings`** – Tool settings in TOML under the platform config
//!   directory: log level, wake destination, and probe method.

pub mod backing_file;
pub mod settings;
