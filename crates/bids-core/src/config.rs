//! Configuration structures for the BIDS dataset catalog.
//!
//! - [`CatalogConfig`] - Dataset locations
//! - [`ScanConfig`] - Directory walk and format validation settings
//! - [`Config`] - Root configuration combining all settings
//!
//! All configuration types implement [`Default`] and deserialize with
//! missing fields filled from their defaults.

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default dataset root used when nothing else is configured.
pub const DEFAULT_DATA_DIR: &str = "/mnt/data";

/// Dataset locations.
///
/// # Examples
///
/// ```
/// use bids_core::CatalogConfig;
///
/// let config = CatalogConfig::default();
/// assert_eq!(config.data_dir, "/mnt/data");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Root of the dataset tree that is scanned.
    ///
    /// Template images are found inside it by their `templates` path token.
    pub data_dir: Utf8PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            data_dir: Utf8PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}

/// Settings for the directory scanner.
///
/// # Examples
///
/// ```
/// use bids_core::ScanConfig;
///
/// let config = ScanConfig::default();
/// assert!(config.validate_dicom);
/// assert!(!config.skip_hidden);
/// assert!(!config.follow_links);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Skip hidden files and directories.
    pub skip_hidden: bool,

    /// Follow symbolic links while walking.
    pub follow_links: bool,

    /// Directory names to skip entirely.
    pub skip_dirs: Vec<String>,

    /// Parse DICOM headers to reject files that only look like DICOM.
    pub validate_dicom: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            skip_hidden: false,
            follow_links: false,
            skip_dirs: Vec::new(),
            validate_dicom: true,
        }
    }
}

/// Root configuration.
///
/// # Examples
///
/// ```
/// use bids_core::Config;
///
/// let config: Config = serde_json::from_str(r#"{"catalog": {"data_dir": "/data"}}"#).unwrap();
/// assert_eq!(config.catalog.data_dir, "/data");
/// assert!(config.scan.validate_dicom);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Dataset locations.
    pub catalog: CatalogConfig,

    /// Scanner settings.
    pub scan: ScanConfig,
}

impl Config {
    /// Loads a configuration from a JSON file.
    ///
    /// Missing fields take their default values.
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path.as_std_path())?;
        let config = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Checks that the data directory is set and is an existing directory.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let data_dir = &self.catalog.data_dir;

        if data_dir.as_str().is_empty() {
            return Err(ConfigError::InvalidOption {
                option: "catalog.data_dir".to_owned(),
                reason: "must not be empty".to_owned(),
            });
        }
        if !data_dir.exists() {
            return Err(ConfigError::MissingDirectory(data_dir.clone()));
        }
        if !data_dir.is_dir() {
            return Err(ConfigError::InvalidPath {
                path: data_dir.clone(),
                reason: "not a directory".to_owned(),
            });
        }

        Ok(())
    }

    /// Returns a copy of this configuration rooted at `data_dir`.
    #[must_use]
    pub fn with_data_dir(mut self, data_dir: impl Into<Utf8PathBuf>) -> Self {
        self.catalog.data_dir = data_dir.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_config_defaults() {
        let config = CatalogConfig::default();
        assert_eq!(config.data_dir, DEFAULT_DATA_DIR);
    }

    #[test]
    fn test_scan_config_defaults() {
        let config = ScanConfig::default();
        assert!(!config.skip_hidden);
        assert!(!config.follow_links);
        assert!(config.skip_dirs.is_empty());
        assert!(config.validate_dicom);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_config_deserialize_with_missing_fields() {
        let json = r#"{"scan": {"validate_dicom": false}}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(!config.scan.validate_dicom);
        assert_eq!(config.catalog.data_dir, DEFAULT_DATA_DIR);
        assert!(config.scan.skip_dirs.is_empty());
    }

    #[test]
    fn test_config_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join("bids-nav.json")).unwrap();
        fs::write(&path, r#"{"catalog": {"data_dir": "/srv/study"}}"#).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.catalog.data_dir, "/srv/study");
    }

    #[test]
    fn test_config_load_rejects_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join("broken.json")).unwrap();
        fs::write(&path, "{not json").unwrap();

        assert!(matches!(Config::load(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_config_validate() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();

        assert!(Config::default().with_data_dir(root.clone()).validate().is_ok());
        assert!(matches!(
            Config::default().with_data_dir(root.join("absent")).validate(),
            Err(ConfigError::MissingDirectory(_))
        ));
        assert!(matches!(
            Config::default().with_data_dir("").validate(),
            Err(ConfigError::InvalidOption { .. })
        ));
    }
}
