//! CRUSH Location
//!
//! Formats the free-form `--location` of a node into the `key=value`
//! tokens ceph expects for CRUSH placement.

use crate::domain::ports::LocationFormatter;
use crate::error::{Error, Result};

// =============================================================================
// Constants
// =============================================================================

/// CRUSH bucket types a location may name
pub const VALID_CRUSH_KEYS: [&str; 11] = [
    "root",
    "region",
    "zone",
    "datacenter",
    "room",
    "pod",
    "pdu",
    "row",
    "rack",
    "chassis",
    "host",
];

const DEFAULT_ROOT: &str = "default";

// =============================================================================
// Formatter
// =============================================================================

/// Default [`LocationFormatter`].
///
/// User supplied entries keep their order; `host=<node>` and `root=default`
/// are appended when the location does not set them.
#[derive(Debug, Clone, Default)]
pub struct CrushLocationFormatter;

impl CrushLocationFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl LocationFormatter for CrushLocationFormatter {
    fn format_location(&self, location: &str, host_name: &str) -> Result<Vec<String>> {
        format_location(location, host_name)
    }
}

/// Format `location` for `host_name` into ordered CRUSH tokens
pub fn format_location(location: &str, host_name: &str) -> Result<Vec<String>> {
    let mut pairs: Vec<String> = location
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect();

    if !pairs.iter().any(|p| p.starts_with("host=")) {
        pairs.push(format_property("host", &crush_host_name(host_name)));
    }

    if !pairs.iter().any(|p| p.starts_with("root=")) {
        pairs.push(format_property("root", DEFAULT_ROOT));
    }

    for pair in &pairs {
        validate_pair(pair)?;
    }

    Ok(pairs)
}

/// Host names may not carry dots in CRUSH bucket names
pub fn crush_host_name(host_name: &str) -> String {
    host_name.replace('.', "-")
}

fn format_property(name: &str, value: &str) -> String {
    format!("{}={}", name, value)
}

fn validate_pair(pair: &str) -> Result<()> {
    let (key, value) = pair.split_once('=').ok_or_else(|| {
        Error::Configuration(format!("CRUSH location '{}' is not in key=value format", pair))
    })?;

    if !VALID_CRUSH_KEYS.contains(&key) {
        return Err(Error::Configuration(format!(
            "CRUSH location key '{}' is not one of {}",
            key,
            VALID_CRUSH_KEYS.join(", ")
        )));
    }

    if !is_valid_crush_name(value) {
        return Err(Error::Configuration(format!(
            "CRUSH location {} has invalid value '{}'",
            key, value
        )));
    }

    Ok(())
}

/// Valid names are non-empty and use only `[A-Za-z0-9-_.]`
pub fn is_valid_crush_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}
