/// Structured error types for pgdelta-core library.
///
/// Uses `thiserror` for better API surface and error composition.
/// The binary crate (pgdelta-cli) can still use `anyhow` for convenience,
/// but library consumers get structured, composable errors.

use std::io;
use thiserror::Error;

/// Main error type for pgdelta-core operations
#[derive(Error, Debug)]
pub enum DeltaError {
    /// I/O operation failed
    #[error("I/O error reading {path}: {source}")]
    Io { path: String, source: io::Error },

    /// YAML parsing or serialization failed
    #[error("YAML error: {source}")]
    Yaml {
        #[from]
        source: serde_yaml::Error,
    },

    /// Config document did not parse to a mapping
    #[error("expected a mapping at the top of the config, found {found}")]
    NotAMapping { found: String },

    /// Mandatory config key missing
    #[error("missing mandatory key: {keys}")]
    MissingKey { keys: String },

    /// Connection section missing or incomplete
    #[error("connection section '{section}' invalid: {reason}")]
    ConnectionSection { section: String, reason: String },

    /// Bin specification rejected (bounds or width)
    #[error("invalid bin specification: {reason}")]
    InvalidBinSpec { reason: String },
}

/// Result type alias for pgdelta-core operations
pub type Result<T> = std::result::Result<T, DeltaError>;

impl DeltaError {
    /// Create an I/O error with the path that failed
    pub fn io(path: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a not-a-mapping error
    pub fn not_a_mapping(found: impl Into<String>) -> Self {
        Self::NotAMapping {
            found: found.into(),
        }
    }

    /// Create a missing key error
    pub fn missing_key(keys: impl Into<String>) -> Self {
        Self::MissingKey { keys: keys.into() }
    }

    /// Create a connection section error
    pub fn connection_section(section: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConnectionSection {
            section: section.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid bin spec error
    pub fn invalid_bin_spec(reason: impl Into<String>) -> Self {
        Self::InvalidBinSpec {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DeltaError::missing_key("source.password");
        assert_eq!(err.to_string(), "missing mandatory key: source.password");

        let err = DeltaError::connection_section("target", "no 'server' key");
        assert!(err.to_string().contains("target"));
        assert!(err.to_string().contains("no 'server' key"));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_err = serde_yaml::from_str::<serde_yaml::Value>("a: [1, 2").unwrap_err();
        let err: DeltaError = yaml_err.into();

        assert!(matches!(err, DeltaError::Yaml { .. }));
    }
}
