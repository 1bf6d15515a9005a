//! Directory scanner for BIDS-like neuroimaging datasets.
//!
//! This crate finds the data files the catalog is built from. It walks a
//! dataset root, collapses multi-file image series into one representative
//! file, recognizes the coarse format of every remaining file and validates
//! DICOM candidates by parsing their header.
//!
//! # Overview
//!
//! The main entry point is [`Scanner`], which combines:
//!
//! - [`FileWalker`]: Directory traversal grouped by directory
//! - [`collapse_series`]: Per-directory series detection
//! - [`detect_format`]: Format recognition from file names
//! - [`HeaderProbe`]: DICOM header validation
//! - [`ScanStats`]: Counters for every kept and dropped file
//!
//! # Example
//!
//! ```ignore
//! use bids_scanner::{ScanConfig, Scanner};
//! use camino::Utf8Path;
//!
//! let scanner = Scanner::new(ScanConfig::new(Utf8Path::new("/mnt/data")))?;
//! let result = scanner.scan()?;
//! for file in &result.files {
//!     println!("{} ({})", file.path, file.format);
//! }
//! println!("{}", result.stats);
//! ```
//!
//! # Architecture
//!
//! ```text
//! Scanner (main entry point)
//!     │
//!     ├── FileWalker (files per directory)
//!     │       │
//!     │       └── WalkBuilder (ignore crate)
//!     │
//!     ├── collapse_series (one file per series)
//!     │
//!     ├── detect_format (extension rules)
//!     │
//!     └── HeaderProbe (dicom-object header parse)
//! ```
//!
//! # Failure policy
//!
//! A file that looks like DICOM but fails to parse, or that has an unknown
//! extension, is dropped and counted in [`ScanStats`]. Walk failures abort
//! the scan with a [`ScanError`].

#![deny(clippy::all)]
#![warn(missing_docs)]

mod error;
mod format;
mod probe;
mod series;
mod stats;
mod walker;

pub use error::ScanError;
pub use format::{Detected, detect_format};
pub use probe::{AcceptAllProbe, DicomHeaderProbe, HeaderProbe};
pub use series::{CollapsedSeries, SeriesName, collapse_series};
pub use stats::ScanStats;
pub use walker::{DirectoryListing, FileWalker};

use std::sync::Arc;

use bids_core::Format;
use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use tracing::{debug, info};

/// Configuration for the scanner.
///
/// # Examples
///
/// ```
/// use bids_scanner::ScanConfig;
/// use camino::Utf8Path;
///
/// let config = ScanConfig::new(Utf8Path::new("/mnt/data"))
///     .with_skip_dirs(&["MRI_temp"])
///     .with_validate_dicom(false);
/// assert!(!config.validate_dicom);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Root directory to scan.
    pub root: Utf8PathBuf,
    /// Directory names to skip.
    pub skip_dirs: Vec<String>,
    /// Whether to follow symbolic links.
    pub follow_links: bool,
    /// Whether to skip hidden files and directories.
    pub skip_hidden: bool,
    /// Whether DICOM candidates must have a parseable header.
    pub validate_dicom: bool,
}

impl ScanConfig {
    /// Creates a scan configuration for `root` with default settings.
    #[must_use]
    pub fn new(root: &Utf8Path) -> Self {
        let defaults = bids_core::ScanConfig::default();
        Self {
            root: root.to_owned(),
            skip_dirs: defaults.skip_dirs,
            follow_links: defaults.follow_links,
            skip_hidden: defaults.skip_hidden,
            validate_dicom: defaults.validate_dicom,
        }
    }

    /// Builds a scan configuration from the application configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use bids_core::Config;
    /// use bids_scanner::ScanConfig;
    ///
    /// let config = ScanConfig::from_config(&Config::default().with_data_dir("/srv/study"));
    /// assert_eq!(config.root, "/srv/study");
    /// ```
    #[must_use]
    pub fn from_config(config: &bids_core::Config) -> Self {
        Self {
            root: config.catalog.data_dir.clone(),
            skip_dirs: config.scan.skip_dirs.clone(),
            follow_links: config.scan.follow_links,
            skip_hidden: config.scan.skip_hidden,
            validate_dicom: config.scan.validate_dicom,
        }
    }

    /// Adds directory names to skip during scanning.
    #[must_use]
    pub fn with_skip_dirs(mut self, dirs: &[&str]) -> Self {
        self.skip_dirs.extend(dirs.iter().map(ToString::to_string));
        self
    }

    /// Configures whether to follow symbolic links.
    #[must_use]
    pub const fn with_follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    /// Configures whether hidden entries are skipped.
    #[must_use]
    pub const fn with_skip_hidden(mut self, skip: bool) -> Self {
        self.skip_hidden = skip;
        self
    }

    /// Configures whether DICOM headers are validated.
    #[must_use]
    pub const fn with_validate_dicom(mut self, validate: bool) -> Self {
        self.validate_dicom = validate;
        self
    }
}

/// A data file found by the scanner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScannedFile {
    /// Absolute path of the file.
    pub path: Utf8PathBuf,
    /// Coarse format of the file.
    pub format: Format,
}

/// Result of a scan operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanResult {
    /// Canonical root the scan started from.
    pub root: Utf8PathBuf,
    /// Catalogued files, unique by path, in walk order.
    pub files: Vec<ScannedFile>,
    /// Counters for the scan.
    pub stats: ScanStats,
}

/// The dataset scanner.
///
/// `Scanner` is cheap to clone; the header probe is shared.
///
/// # Examples
///
/// ```ignore
/// use bids_scanner::{ScanConfig, Scanner};
/// use camino::Utf8Path;
///
/// let scanner = Scanner::new(ScanConfig::new(Utf8Path::new("/mnt/data")))?;
/// let result = scanner.scan()?;
/// println!("Catalogued {} files", result.files.len());
/// ```
#[derive(Debug, Clone)]
pub struct Scanner {
    /// Scanner configuration.
    config: ScanConfig,
    /// Decides which DICOM candidates are kept.
    probe: Arc<dyn HeaderProbe>,
}

impl Scanner {
    /// Creates a new scanner with the given configuration.
    ///
    /// DICOM candidates are checked with [`DicomHeaderProbe`] unless
    /// validation is disabled, in which case every candidate is kept.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Config`] if the root directory doesn't exist or
    /// isn't a directory.
    pub fn new(config: ScanConfig) -> Result<Self, ScanError> {
        let probe: Arc<dyn HeaderProbe> = if config.validate_dicom {
            Arc::new(DicomHeaderProbe)
        } else {
            Arc::new(AcceptAllProbe)
        };
        Self::with_probe(config, probe)
    }

    /// Creates a new scanner that validates DICOM candidates with `probe`.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Config`] if the root directory doesn't exist or
    /// isn't a directory.
    pub fn with_probe(config: ScanConfig, probe: Arc<dyn HeaderProbe>) -> Result<Self, ScanError> {
        if !config.root.exists() {
            return Err(ScanError::config(format!(
                "root path does not exist: {}",
                config.root
            )));
        }

        if !config.root.is_dir() {
            return Err(ScanError::config(format!(
                "root path is not a directory: {}",
                config.root
            )));
        }

        debug!(root = %config.root, validate_dicom = config.validate_dicom, "Creating scanner");

        Ok(Self { config, probe })
    }

    /// Performs a full scan of the configured directory.
    ///
    /// This method:
    /// 1. Resolves the root to an absolute, canonical path
    /// 2. Walks the tree, grouping files by directory
    /// 3. Collapses multi-file series within each directory
    /// 4. Detects formats and validates DICOM candidates
    ///
    /// The walk yields every path once, so the result holds no duplicate
    /// paths. Two scans of an unchanged tree return identical results.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Io`] if the root cannot be resolved,
    /// [`ScanError::Walk`] if directory traversal fails and
    /// [`ScanError::NonUtf8Path`] for paths that are not UTF-8.
    pub fn scan(&self) -> Result<ScanResult, ScanError> {
        let root = self
            .config
            .root
            .canonicalize_utf8()
            .map_err(|e| ScanError::io(self.config.root.clone(), e))?;

        info!(root = %root, "Starting scan");

        let skip_dirs: Vec<&str> = self.config.skip_dirs.iter().map(String::as_str).collect();
        let walker = FileWalker::new(&root)?
            .with_skip_dirs(&skip_dirs)
            .with_follow_links(self.config.follow_links)
            .with_skip_hidden(self.config.skip_hidden);
        let listings = walker.collect_directories()?;

        let mut stats = ScanStats::default();
        let mut files = Vec::new();

        for listing in &listings {
            stats.files_seen += listing.files.len() as u64;

            let collapsed = collapse_series(&listing.files);
            if collapsed.merged > 0 {
                debug!(dir = %listing.dir, merged = collapsed.merged, "Collapsed series");
                stats.series_collapsed += collapsed.merged as u64;
            }

            for name in collapsed.kept {
                let path = listing.dir.join(name);
                let Some(format) = self.resolve_format(&path, name, &mut stats) else {
                    continue;
                };

                stats.record_format(format);
                files.push(ScannedFile { path, format });
            }
        }

        info!(
            files = stats.files_seen,
            dicom = stats.dicom,
            nifti = stats.nifti,
            json = stats.json,
            dropped = stats.dropped(),
            "Scan completed"
        );

        Ok(ScanResult { root, files, stats })
    }

    /// Returns the format a file is catalogued as, or `None` if it is dropped.
    fn resolve_format(&self, path: &Utf8Path, name: &str, stats: &mut ScanStats) -> Option<Format> {
        match detect_format(name) {
            Detected::Format(format) => Some(format),
            Detected::DicomCandidate => {
                if self.probe.is_valid(path) {
                    Some(Format::Dicom)
                } else {
                    stats.rejected_dicom += 1;
                    None
                }
            }
            Detected::Skipped => {
                debug!(path = %path, "Skipping DICOM index file");
                stats.skipped += 1;
                None
            }
            Detected::Unrecognized => {
                stats.ignored += 1;
                None
            }
        }
    }

    /// Returns the scanner configuration.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Returns the configured root directory.
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.config.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(root: &Utf8Path, relative: &str) {
        write(root, relative, b"");
    }

    fn write(root: &Utf8Path, relative: &str, contents: &[u8]) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }

    fn temp_root() -> (tempfile::TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().canonicalize().unwrap()).unwrap();
        (dir, root)
    }

    fn unvalidated(root: &Utf8Path) -> Scanner {
        Scanner::new(ScanConfig::new(root).with_validate_dicom(false)).unwrap()
    }

    fn names(result: &ScanResult) -> Vec<&str> {
        result
            .files
            .iter()
            .filter_map(|file| file.path.file_name())
            .collect()
    }

    #[derive(Debug)]
    struct RejectAll;

    impl HeaderProbe for RejectAll {
        fn is_valid(&self, _path: &Utf8Path) -> bool {
            false
        }
    }

    #[test]
    fn test_new_rejects_missing_root() {
        let (_guard, root) = temp_root();
        let err = Scanner::new(ScanConfig::new(&root.join("absent"))).unwrap_err();
        assert!(matches!(err, ScanError::Config(_)));
    }

    #[test]
    fn test_series_collapses_to_lowest_index() {
        let (_guard, root) = temp_root();
        for name in ["A0001.dcm", "A0002.dcm", "A0003.dcm"] {
            touch(&root, &format!("sub-01/{name}"));
        }

        let result = unvalidated(&root).scan().unwrap();

        assert_eq!(result.files.len(), 1);
        assert_eq!(result.files[0].path, root.join("sub-01/A0001.dcm"));
        assert_eq!(result.files[0].format, Format::Dicom);
        assert_eq!(result.stats.series_collapsed, 2);
    }

    #[test]
    fn test_mixed_extensions_are_not_merged() {
        let (_guard, root) = temp_root();
        touch(&root, "B0001.dcm");
        touch(&root, "B0002.nii");

        let result = unvalidated(&root).scan().unwrap();

        assert_eq!(names(&result), vec!["B0001.dcm", "B0002.nii"]);
        assert_eq!(result.files[0].format, Format::Dicom);
        assert_eq!(result.files[1].format, Format::Nifti);
    }

    #[test]
    fn test_series_is_per_directory() {
        let (_guard, root) = temp_root();
        touch(&root, "run1/IM0001");
        touch(&root, "run1/IM0002");
        touch(&root, "run2/IM0002");

        let result = unvalidated(&root).scan().unwrap();

        let paths: Vec<_> = result.files.iter().map(|f| f.path.clone()).collect();
        assert_eq!(paths, vec![root.join("run1/IM0001"), root.join("run2/IM0002")]);
    }

    #[test]
    fn test_formats_and_ignored_files() {
        let (_guard, root) = temp_root();
        touch(&root, "sub-01/anat/sub-01_T1w.nii.gz");
        touch(&root, "sub-01/anat/sub-01_T1w.json");
        touch(&root, "sub-01/dwi/sub-01_dwi.bval");
        touch(&root, "sub-01/dwi/sub-01_dwi.bvec");
        touch(&root, "sourcedata/DICOMDIR");
        touch(&root, "sourcedata/KEY_0001.dcm");

        let result = unvalidated(&root).scan().unwrap();

        assert_eq!(names(&result), vec!["sub-01_T1w.json", "sub-01_T1w.nii.gz"]);
        assert_eq!(result.stats.ignored, 2);
        assert_eq!(result.stats.skipped, 2);
        assert_eq!(result.stats.files_seen, 6);
    }

    #[test]
    fn test_invalid_dicom_is_dropped_silently() {
        let (_guard, root) = temp_root();
        write(&root, "sourcedata/sub-01/IM0001.dcm", b"not dicom at all");
        touch(&root, "sub-01/anat/sub-01_T1w.nii");

        let result = Scanner::new(ScanConfig::new(&root)).unwrap().scan().unwrap();

        assert_eq!(names(&result), vec!["sub-01_T1w.nii"]);
        assert_eq!(result.stats.rejected_dicom, 1);
        assert_eq!(result.stats.dicom, 0);
    }

    #[test]
    fn test_custom_probe() {
        let (_guard, root) = temp_root();
        touch(&root, "IM0001");
        touch(&root, "scan.json");

        let scanner = Scanner::with_probe(ScanConfig::new(&root), Arc::new(RejectAll)).unwrap();
        let result = scanner.scan().unwrap();

        assert_eq!(names(&result), vec!["scan.json"]);
        assert_eq!(result.stats.rejected_dicom, 1);
    }

    #[test]
    fn test_paths_are_absolute() {
        let (_guard, root) = temp_root();
        touch(&root, "sub-01/anat/t1.nii");

        let result = unvalidated(&root).scan().unwrap();

        assert!(result.root.is_absolute());
        assert!(result.files.iter().all(|f| f.path.is_absolute()));
    }

    #[test]
    fn test_scan_is_idempotent() {
        let (_guard, root) = temp_root();
        for name in [
            "sub-02/ses-01/anat/sub-02_ses-01_T2w.nii.gz",
            "sub-01/anat/sub-01_T1w.nii.gz",
            "sub-01/anat/sub-01_T1w.json",
            "sourcedata/sub-01/A0002",
            "sourcedata/sub-01/A0001",
        ] {
            touch(&root, name);
        }

        let scanner = unvalidated(&root);
        assert_eq!(scanner.scan().unwrap(), scanner.scan().unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn test_linked_directories_keep_paths_unique() {
        let (_guard, root) = temp_root();
        touch(&root, "sub-01/anat/sub-01_T1w.nii");
        touch(&root, "sub-01/anat/sub-01_T1w.json");
        std::os::unix::fs::symlink(root.join("sub-01"), root.join("alias")).unwrap();

        let config = ScanConfig::new(&root)
            .with_validate_dicom(false)
            .with_follow_links(true);
        let result = Scanner::new(config).unwrap().scan().unwrap();

        let mut paths: Vec<_> = result.files.iter().map(|f| f.path.as_str()).collect();
        let total = paths.len();
        paths.sort_unstable();
        paths.dedup();
        assert_eq!(paths.len(), total);
        assert_eq!(total, 4);
        assert_eq!(result.stats.catalogued(), result.stats.files_seen);
    }

    #[test]
    fn test_skip_dirs_from_config() {
        let (_guard, root) = temp_root();
        touch(&root, "MRI_temp/t1.nii");
        touch(&root, "sub-01/t1.nii");

        let config = ScanConfig::new(&root).with_skip_dirs(&["MRI_temp"]);
        let result = Scanner::new(config).unwrap().scan().unwrap();

        assert_eq!(result.files.len(), 1);
        assert_eq!(result.files[0].path, root.join("sub-01/t1.nii"));
    }

    #[test]
    fn test_scan_fails_when_root_disappears() {
        let (guard, root) = temp_root();
        let scanner = unvalidated(&root);
        drop(guard);

        assert!(scanner.scan().is_err());
    }

    #[test]
    fn test_from_config() {
        let mut config = bids_core::Config::default().with_data_dir("/srv/study");
        config.scan.validate_dicom = false;
        config.scan.skip_dirs = vec!["tmp".to_owned()];

        let scan = ScanConfig::from_config(&config);
        assert_eq!(scan.root, "/srv/study");
        assert!(!scan.validate_dicom);
        assert_eq!(scan.skip_dirs, vec!["tmp"]);
    }
}
