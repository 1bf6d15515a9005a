//! Error types for the bids-catalog crate.
//!
//! [`QueryError`] covers malformed filters. [`CatalogError`] is returned by
//! the operations that build or rebuild the catalog.

use bids_core::{ConfigError, ParseValueError};
use bids_scanner::ScanError;

/// Errors raised while building a [`Filter`](crate::Filter).
///
/// # Examples
///
/// ```
/// use bids_catalog::{FilterKey, QueryError};
///
/// let err = "modality".parse::<FilterKey>().unwrap_err();
/// assert!(matches!(err, QueryError::UnknownKey(_)));
/// assert_eq!(err.to_string(), "unknown filter key 'modality'");
/// ```
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// The filter names an attribute the catalog does not have.
    #[error("unknown filter key '{0}'")]
    UnknownKey(String),

    /// A value could not be parsed for an enumerated attribute.
    #[error("invalid value for '{key}': {source}")]
    InvalidValue {
        /// The filter key the value was given for.
        key: &'static str,
        /// The parse failure.
        #[source]
        source: ParseValueError,
    },

    /// A wildcard pattern in a tool input rule did not compile.
    #[error("invalid pattern for '{key}': {source}")]
    Pattern {
        /// The filter key the pattern was given for.
        key: &'static str,
        /// The compile failure.
        #[source]
        source: regex::Error,
    },

    /// A JSON filter document could not be parsed.
    #[error("failed to parse filter: {0}")]
    Parse(#[from] serde_json::Error),
}

impl QueryError {
    /// Creates a new [`QueryError::InvalidValue`] error.
    #[inline]
    pub const fn invalid_value(key: &'static str, source: ParseValueError) -> Self {
        Self::InvalidValue { key, source }
    }
}

/// Errors that can occur while building or rebuilding the catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The scan failed; no snapshot was produced.
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// The configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A classifier pattern failed to compile.
    #[error("failed to compile classifier pattern: {0}")]
    Pattern(#[from] regex::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_value_display() {
        let err = QueryError::invalid_value("formats", ParseValueError::new("format", "mgz"));
        assert_eq!(err.to_string(), "invalid value for 'formats': unknown format 'mgz'");
    }

    #[test]
    fn test_scan_error_passes_through() {
        let scan: CatalogError = ScanError::config("root path does not exist: /nope").into();
        assert!(matches!(scan, CatalogError::Scan(_)));
        assert!(scan.to_string().contains("/nope"));
    }

    #[test]
    fn test_parse_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: QueryError = json_err.into();
        assert!(err.to_string().starts_with("failed to parse filter"));
    }
}
