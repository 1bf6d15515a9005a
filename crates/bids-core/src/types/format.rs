//! Coarse file format of a catalogued data file.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseValueError;

/// The coarse kind of a data file discovered by the scanner.
///
/// # Examples
///
/// ```
/// use bids_core::Format;
///
/// let format: Format = "nifti".parse().unwrap();
/// assert_eq!(format, Format::Nifti);
/// assert_eq!(format.as_str(), "nifti");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Format {
    /// A DICOM file (or the representative file of a multi-file series).
    Dicom,
    /// A NIfTI image, compressed (`.nii.gz`) or not (`.nii`).
    Nifti,
    /// A JSON sidecar.
    Json,
}

impl Format {
    /// All formats, in declaration order.
    pub const ALL: [Self; 3] = [Self::Dicom, Self::Nifti, Self::Json];

    /// Returns the lower-case name used in filters and reports.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dicom => "dicom",
            Self::Nifti => "nifti",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|format| format.as_str() == s)
            .ok_or_else(|| ParseValueError::new("format", s))
    }
}
