//! Flag helpers shared by the daemon commands
//!
//! Flags are parsed by clap; these helpers work on the final values after
//! environment overrides have been applied.

use crate::error::{Error, Result};
use tracing::info;

/// Prefix of the environment variables that override flags
pub const ENV_VAR_PREFIX: &str = "ROOK";

/// Replacement shown for masked flag values
const MASKED_VALUE: &str = "*****";

/// A parsed command whose flag values can be inspected by name
pub trait FlagSet {
    /// Name of the command the flags belong to
    fn command_name(&self) -> &str;

    /// Every flag with its final value, in declaration order
    fn flag_values(&self) -> Vec<(&'static str, String)>;

    /// Value of a single flag, `None` if the command has no such flag
    fn flag_value(&self, name: &str) -> Option<String> {
        self.flag_values()
            .into_iter()
            .find(|(flag, _)| *flag == name)
            .map(|(_, value)| value)
    }
}

/// Environment variable that overrides `flag`, e.g. `ROOK_DATA_DEVICES`
pub fn env_var_name(flag: &str) -> String {
    format!("{}_{}", ENV_VAR_PREFIX, flag.to_uppercase().replace('-', "_"))
}

/// Fail with every required flag that is unknown or empty
pub fn verify_required_flags<F: FlagSet + ?Sized>(flags: &F, required: &[&str]) -> Result<()> {
    let missing: Vec<String> = required
        .iter()
        .filter(|name| flags.flag_value(name).map_or(true, |v| v.is_empty()))
        .map(|name| name.to_string())
        .collect();

    if missing.is_empty() {
        return Ok(());
    }

    Err(Error::MissingConfiguration {
        command: flags.command_name().to_string(),
        missing,
    })
}

/// `name=value` pairs for logging, masking flags whose name contains `mask`
pub fn flags_and_values<F: FlagSet + ?Sized>(flags: &F, mask: &str) -> Vec<String> {
    flags
        .flag_values()
        .into_iter()
        .map(|(name, value)| {
            if name.contains(mask) {
                format!("{}={}", name, MASKED_VALUE)
            } else {
                format!("{}={}", name, value)
            }
        })
        .collect()
}

/// Log the version and every final flag value of the starting command
pub fn log_startup_info<F: FlagSet + ?Sized>(flags: &F) {
    info!("starting Rook {} {}", crate::VERSION, flags.command_name());
    info!("flag values: {}", flags_and_values(flags, "secret").join(", "));
}
