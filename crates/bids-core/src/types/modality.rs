//! Modality classes and data provenance tiers.
//!
//! This module provides [`DataType`] (the modality class of a record) and
//! [`DataSource`] (which tier of a BIDS tree the record lives in).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseValueError;

/// Modality class of a catalogued file.
///
/// Files in which no scan-type token was recognized are [`DataType::Empty`].
///
/// # Examples
///
/// ```
/// use bids_core::DataType;
///
/// assert_eq!(DataType::default(), DataType::Empty);
/// assert_eq!("anat".parse::<DataType>().unwrap(), DataType::Anat);
/// assert_eq!(DataType::Empty.as_str(), "Empty");
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    /// Anatomical image (`T1w`, `T2w`, ...).
    Anat,
    /// Diffusion-weighted image.
    Dwi,
    /// Computed tomography.
    Ct,
    /// No modality recognized.
    #[default]
    #[serde(rename = "Empty")]
    Empty,
}

impl DataType {
    /// All data types, in declaration order.
    pub const ALL: [Self; 4] = [Self::Anat, Self::Dwi, Self::Ct, Self::Empty];

    /// Returns the name used in filters and reports.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Anat => "anat",
            Self::Dwi => "dwi",
            Self::Ct => "ct",
            Self::Empty => crate::EMPTY,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|data_type| data_type.as_str() == s)
            .ok_or_else(|| ParseValueError::new("data type", s))
    }
}

/// Provenance tier of a catalogued file.
///
/// Anything not under a `sourcedata`, `derivatives` or `templates` tree is
/// raw data.
///
/// # Examples
///
/// ```
/// use bids_core::DataSource;
///
/// assert_eq!(DataSource::default(), DataSource::Raw);
/// assert_eq!("templates".parse::<DataSource>().unwrap(), DataSource::Templates);
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    /// Raw BIDS data at the dataset root.
    #[default]
    Raw,
    /// Unconverted source data (typically DICOM).
    Sourcedata,
    /// Pipeline outputs.
    Derivatives,
    /// Template images shared across subjects.
    Templates,
}

impl DataSource {
    /// All data sources, in declaration order.
    pub const ALL: [Self; 4] = [
        Self::Raw,
        Self::Sourcedata,
        Self::Derivatives,
        Self::Templates,
    ];

    /// Returns the lower-case name used in filters, reports and paths.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Sourcedata => "sourcedata",
            Self::Derivatives => "derivatives",
            Self::Templates => "templates",
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataSource {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|source| source.as_str() == s)
            .ok_or_else(|| ParseValueError::new("data source", s))
    }
}
