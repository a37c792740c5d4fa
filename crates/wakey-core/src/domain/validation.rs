//! Field validation shared by device and group create/update.

use std::net::Ipv4Addr;

use thiserror::Error;

use crate::protocol::mac::MacAddress;

/// Maximum number of characters allowed in a device description.
pub const MAX_DESCRIPTION_LEN: usize = 64;

/// A submitted field failed validation.  Nothing is written when this is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("device name is required")]
    MissingName,

    #[error("description is required")]
    MissingDescription,

    #[error("description must be at most {max} characters, got {actual}")]
    DescriptionTooLong { max: usize, actual: usize },

    #[error("invalid mac address: {0:?}")]
    InvalidMac(String),

    #[error("invalid ip address: {0:?}")]
    InvalidIp(String),

    #[error("group name is required")]
    MissingGroupName,
}

/// Rejects empty or whitespace-only device names.
pub fn validate_device_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::MissingName);
    }
    Ok(())
}

/// Requires a non-empty description of at most [`MAX_DESCRIPTION_LEN`] characters.
pub fn validate_description(description: &str) -> Result<(), ValidationError> {
    if description.trim().is_empty() {
        return Err(ValidationError::MissingDescription);
    }
    let actual = description.chars().count();
    if actual > MAX_DESCRIPTION_LEN {
        return Err(ValidationError::DescriptionTooLong {
            max: MAX_DESCRIPTION_LEN,
            actual,
        });
    }
    Ok(())
}

/// Parses a MAC address, mapping failure into a [`ValidationError`].
pub fn validate_mac(mac: &str) -> Result<MacAddress, ValidationError> {
    MacAddress::parse(mac).map_err(|_| ValidationError::InvalidMac(mac.to_string()))
}

/// Requires a dotted-quad IPv4 address such as `192.168.1.10`.
pub fn validate_ip(ip: &str) -> Result<Ipv4Addr, ValidationError> {
    ip.parse::<Ipv4Addr>()
        .map_err(|_| ValidationError::InvalidIp(ip.to_string()))
}

/// Rejects empty or whitespace-only group names.
pub fn validate_group_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::MissingGroupName);
    }
    Ok(())
}
