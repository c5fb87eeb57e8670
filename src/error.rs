//! Error types for the Rook daemon launcher
//!
//! Every error raised while preparing a daemon is terminal. Errors travel
//! back to `main` as values, which logs them and exits with
//! [`Error::exit_code`].

use thiserror::Error;

/// Unified error type for the launcher
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("{}", required_flag_message(.command, .missing))]
    MissingConfiguration {
        command: String,
        missing: Vec<String>,
    },

    #[error("{0}")]
    ConflictingConfiguration(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // =========================================================================
    // Agent Errors
    // =========================================================================
    #[error("Agent error: {0}")]
    Agent(String),

    // =========================================================================
    // Collaborator Errors
    // =========================================================================
    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Process exit status for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::MissingConfiguration { .. } | Error::ConflictingConfiguration(_) => 2,
            _ => 1,
        }
    }

    /// Check if the error was caused by user-supplied configuration
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::MissingConfiguration { .. }
                | Error::ConflictingConfiguration(_)
                | Error::Configuration(_)
        )
    }
}

fn required_flag_message(command: &str, missing: &[String]) -> String {
    let verb = if missing.len() == 1 { "is" } else { "are" };
    format!("{} {} required for {}", missing.join(","), verb, command)
}

/// Result type alias for the launcher
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_configuration_message() {
        let err = Error::MissingConfiguration {
            command: "osd".into(),
            missing: vec!["mon-secret".into()],
        };
        assert_eq!(err.to_string(), "mon-secret is required for osd");

        let err = Error::MissingConfiguration {
            command: "osd".into(),
            missing: vec!["mon-secret".into(), "node-name".into()],
        };
        assert_eq!(err.to_string(), "mon-secret,node-name are required for osd");
    }

    #[test]
    fn test_exit_codes() {
        let err = Error::ConflictingConfiguration("both set".into());
        assert_eq!(err.exit_code(), 2);
        assert!(err.is_configuration());

        let err = Error::Agent("run failed".into());
        assert_eq!(err.exit_code(), 1);
        assert!(!err.is_configuration());

        let err = Error::Configuration("invalid location".into());
        assert_ne!(err.exit_code(), 0);
        assert!(err.is_configuration());
    }
}
