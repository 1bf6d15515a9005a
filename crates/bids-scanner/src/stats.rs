//! Scan statistics.
//!
//! [`ScanStats`] counts what happened to every file the walk reached. The
//! scanner is synchronous, so plain counters are enough.
//!
//! # Examples
//!
//! ```
//! use bids_core::Format;
//! use bids_scanner::ScanStats;
//!
//! let mut stats = ScanStats::default();
//! stats.record_format(Format::Nifti);
//! stats.record_format(Format::Dicom);
//! stats.rejected_dicom += 1;
//!
//! assert_eq!(stats.catalogued(), 2);
//! assert_eq!(stats.dropped(), 1);
//! ```

use std::fmt;

use bids_core::Format;
use serde::{Deserialize, Serialize};

/// Counters collected during one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStats {
    /// Files reached by the walk, before any filtering.
    pub files_seen: u64,
    /// Files catalogued as DICOM.
    pub dicom: u64,
    /// Files catalogued as NIfTI.
    pub nifti: u64,
    /// Files catalogued as JSON sidecars.
    pub json: u64,
    /// Files dropped because another file represents their series.
    pub series_collapsed: u64,
    /// DICOM candidates whose header did not parse.
    pub rejected_dicom: u64,
    /// `DICOMDIR` and `KEY*` files.
    pub skipped: u64,
    /// Files with an extension the catalog does not understand.
    pub ignored: u64,
}

impl ScanStats {
    /// Counts one catalogued file of the given format.
    #[inline]
    pub fn record_format(&mut self, format: Format) {
        match format {
            Format::Dicom => self.dicom += 1,
            Format::Nifti => self.nifti += 1,
            Format::Json => self.json += 1,
        }
    }

    /// Returns the number of files that made it into the result.
    #[inline]
    #[must_use]
    pub const fn catalogued(&self) -> u64 {
        self.dicom + self.nifti + self.json
    }

    /// Returns the number of files that were left out of the result.
    #[inline]
    #[must_use]
    pub const fn dropped(&self) -> u64 {
        self.series_collapsed + self.rejected_dicom + self.skipped + self.ignored
    }
}

impl fmt::Display for ScanStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} files: {} dicom, {} nifti, {} json ({} dropped)",
            self.files_seen,
            self.dicom,
            self.nifti,
            self.json,
            self.dropped()
        )
    }
}
