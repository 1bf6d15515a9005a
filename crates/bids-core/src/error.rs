//! Error types for the bids-core crate.
//!
//! This module provides [`ConfigError`] for configuration failures and
//! [`ParseValueError`] for strings that do not name a known enum value.

use camino::Utf8PathBuf;

/// Errors that can occur during configuration loading and validation.
///
/// # Examples
///
/// ```
/// use bids_core::ConfigError;
/// use camino::Utf8PathBuf;
///
/// let error = ConfigError::MissingDirectory(Utf8PathBuf::from("/mnt/data"));
/// assert!(error.to_string().contains("/mnt/data"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The provided path is invalid or malformed.
    #[error("invalid path '{path}': {reason}")]
    InvalidPath {
        /// The invalid path.
        path: Utf8PathBuf,
        /// Explanation of why the path is invalid.
        reason: String,
    },

    /// A required directory does not exist.
    #[error("missing required directory: {0}")]
    MissingDirectory(Utf8PathBuf),

    /// A configuration option has an invalid value.
    #[error("invalid configuration option '{option}': {reason}")]
    InvalidOption {
        /// The name of the invalid option.
        option: String,
        /// Explanation of why the option is invalid.
        reason: String,
    },

    /// An I/O error occurred while reading configuration.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A string did not name any value of an enumerated attribute.
///
/// # Examples
///
/// ```
/// use bids_core::DataSource;
///
/// let err = "rawdata".parse::<DataSource>().unwrap_err();
/// assert_eq!(err.to_string(), "unknown data source 'rawdata'");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseValueError {
    /// Name of the attribute being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

impl ParseValueError {
    /// Creates a new [`ParseValueError`].
    #[inline]
    pub fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_path_display() {
        let error = ConfigError::InvalidPath {
            path: Utf8PathBuf::from("/invalid/path"),
            reason: "not a directory".to_owned(),
        };
        let msg = error.to_string();
        assert!(msg.contains("/invalid/path"));
        assert!(msg.contains("not a directory"));
    }

    #[test]
    fn test_missing_directory_display() {
        let error = ConfigError::MissingDirectory(Utf8PathBuf::from("/missing/dir"));
        assert!(error.to_string().contains("/missing/dir"));
    }

    #[test]
    fn test_invalid_option_display() {
        let error = ConfigError::InvalidOption {
            option: "data_dir".to_owned(),
            reason: "must not be empty".to_owned(),
        };
        let msg = error.to_string();
        assert!(msg.contains("data_dir"));
        assert!(msg.contains("must not be empty"));
    }

    #[test]
    fn test_parse_value_error_display() {
        let error = ParseValueError::new("format", "mgz");
        assert_eq!(error.to_string(), "unknown format 'mgz'");
    }
}
