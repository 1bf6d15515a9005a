//! Error types for the bids-scanner crate.
//!
//! Every [`ScanError`] aborts the scan. Files that merely fail format
//! validation are not errors; the scanner drops them and counts them in
//! [`ScanStats`](crate::ScanStats).

use camino::Utf8PathBuf;

/// Errors that can occur during scanning operations.
///
/// # Examples
///
/// ```
/// use bids_scanner::ScanError;
///
/// fn describe(err: &ScanError) -> String {
///     match err {
///         ScanError::Walk(e) => format!("walk error: {e}"),
///         ScanError::Io { path, .. } => format!("io error: {path}"),
///         ScanError::Config(msg) => format!("config error: {msg}"),
///         ScanError::NonUtf8Path(p) => format!("invalid path: {}", p.display()),
///     }
/// }
///
/// let err = ScanError::config("root path does not exist: /mnt/data");
/// assert!(describe(&err).contains("/mnt/data"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// Failed to walk a directory (missing, unreadable, permission denied).
    #[error("failed to walk directory: {0}")]
    Walk(#[from] ignore::Error),

    /// An I/O operation on a specific path failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// The path the operation was applied to.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Invalid scanner configuration, such as a missing root directory.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A path is not valid UTF-8.
    #[error("path is not valid UTF-8: {}", _0.display())]
    NonUtf8Path(std::path::PathBuf),
}

impl ScanError {
    /// Creates a new [`ScanError::Io`] error.
    #[inline]
    pub fn io(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a new [`ScanError::Config`] error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Returns the file path associated with this error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8PathBuf> {
        match self {
            Self::Io { path, .. } => Some(path),
            Self::Walk(_) | Self::Config(_) | Self::NonUtf8Path(_) => None,
        }
    }
}
