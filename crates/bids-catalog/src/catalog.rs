//! The catalog: an immutable snapshot of a dataset, rebuilt on demand.
//!
//! [`Catalog`] owns the current [`RecordSet`] behind an [`Arc`]. A rescan
//! builds a complete new record set and swaps it in only if the whole
//! rebuild succeeded; on failure the previous snapshot stays in place.
//! Callers that hold a snapshot keep a consistent view across rescans.
//!
//! ```text
//! rescan ──► Scanner::scan ──► Classifier::classify (per file) ──► RecordSet
//!                                                                      │
//! query / subjects / templates ◄──────────── Arc<RecordSet> ◄──────────┘
//! ```

use std::sync::Arc;

use bids_core::{Config, DataSource};
use bids_scanner::{ScanConfig, ScanResult, ScanStats, Scanner};
use camino::{Utf8Path, Utf8PathBuf};
use tracing::{info, warn};

use crate::classifier::Classifier;
use crate::error::CatalogError;
use crate::filter::Filter;
use crate::record_set::RecordSet;

/// Classifies every scanned file into a new record set.
///
/// Files keep their scan order.
#[must_use]
pub fn build_index(scan: &ScanResult, classifier: &Classifier) -> RecordSet {
    let mut records = RecordSet::with_capacity(scan.files.len());
    for file in &scan.files {
        let class = classifier.classify(file.path.as_str());
        records.push(&file.path, file.format, class);
    }
    records
}

/// An indexed dataset.
///
/// # Examples
///
/// ```ignore
/// use bids_catalog::{Catalog, Filter};
/// use bids_core::Config;
///
/// let mut catalog = Catalog::new(Config::default().with_data_dir("/mnt/data"))?;
/// println!("{} files, subjects: {:?}", catalog.len(), catalog.subjects());
///
/// let t1 = catalog.query(&Filter::new().with_data_scans(["T1w"]));
///
/// // After a pipeline wrote new files
/// catalog.rescan()?;
/// ```
#[derive(Debug)]
pub struct Catalog {
    /// Scan settings and dataset root.
    config: Config,
    /// Compiled token matchers.
    classifier: Classifier,
    /// The current index.
    snapshot: Arc<RecordSet>,
    /// Canonical root of the current snapshot.
    root: Option<Utf8PathBuf>,
    /// Counters from the scan that produced the current snapshot.
    stats: Option<ScanStats>,
}

impl Catalog {
    /// Builds a catalog and performs the first scan.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Config`] if the data directory is invalid and
    /// [`CatalogError::Scan`] if the scan fails.
    pub fn new(config: Config) -> Result<Self, CatalogError> {
        config.validate()?;
        let mut catalog = Self::empty(config)?;
        catalog.rescan()?;
        Ok(catalog)
    }

    /// Builds a catalog without scanning.
    ///
    /// Queries return empty record sets until [`rescan`](Self::rescan)
    /// succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Pattern`] if the classifier fails to compile.
    pub fn empty(config: Config) -> Result<Self, CatalogError> {
        Ok(Self {
            config,
            classifier: Classifier::new()?,
            snapshot: Arc::new(RecordSet::default()),
            root: None,
            stats: None,
        })
    }

    /// Rebuilds the index from the configured data directory.
    ///
    /// All or nothing: on error the previous snapshot is kept.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Scan`] if the root is missing or a directory
    /// cannot be read.
    pub fn rescan(&mut self) -> Result<ScanStats, CatalogError> {
        let result = match self.scan() {
            Ok(result) => result,
            Err(e) => {
                warn!(
                    root = %self.config.catalog.data_dir,
                    error = %e,
                    "Rescan failed, keeping previous snapshot"
                );
                return Err(e);
            }
        };

        let records = build_index(&result, &self.classifier);
        info!(
            root = %result.root,
            records = records.len(),
            subjects = records.distinct_subjects().len(),
            "Catalog rebuilt"
        );

        self.snapshot = Arc::new(records);
        self.root = Some(result.root);
        self.stats = Some(result.stats);
        Ok(result.stats)
    }

    fn scan(&self) -> Result<ScanResult, CatalogError> {
        let scanner = Scanner::new(ScanConfig::from_config(&self.config))?;
        Ok(scanner.scan()?)
    }

    /// Points the catalog at a new data directory and rescans.
    ///
    /// On error the previous root and snapshot are kept.
    ///
    /// # Errors
    ///
    /// Same as [`rescan`](Self::rescan).
    pub fn set_root(&mut self, root: impl Into<Utf8PathBuf>) -> Result<ScanStats, CatalogError> {
        let previous = std::mem::replace(&mut self.config.catalog.data_dir, root.into());
        match self.rescan() {
            Ok(stats) => Ok(stats),
            Err(e) => {
                self.config.catalog.data_dir = previous;
                Err(e)
            }
        }
    }

    /// Returns a handle to the current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<RecordSet> {
        Arc::clone(&self.snapshot)
    }

    /// Runs a query against the current snapshot.
    #[must_use]
    pub fn query(&self, filter: &Filter) -> RecordSet {
        self.snapshot.query(filter)
    }

    /// Returns all template files.
    #[must_use]
    pub fn templates(&self) -> RecordSet {
        self.query(&Filter::new().with_data_sources([DataSource::Templates]))
    }

    /// Returns the distinct subjects, sorted.
    #[must_use]
    pub fn subjects(&self) -> Vec<String> {
        self.snapshot.distinct_subjects()
    }

    /// Returns the distinct sessions, sorted.
    #[must_use]
    pub fn sessions(&self) -> Vec<String> {
        self.snapshot.distinct_sessions()
    }

    /// Returns the number of indexed files.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshot.len()
    }

    /// Returns `true` if nothing is indexed.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }

    /// Returns the canonical root of the current snapshot, if scanned.
    #[inline]
    #[must_use]
    pub fn root(&self) -> Option<&Utf8Path> {
        self.root.as_deref()
    }

    /// Returns the counters of the scan behind the current snapshot.
    #[inline]
    #[must_use]
    pub const fn stats(&self) -> Option<&ScanStats> {
        self.stats.as_ref()
    }

    /// Returns the configuration.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }
}
