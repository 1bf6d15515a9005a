//! Attributes extracted from a file path by the classifier.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::modality::{DataSource, DataType};
use crate::EMPTY;

/// Qualifier tags (`acq-*`, `space-*`, `desc-*`) attached to a record.
///
/// Most files carry zero to two tags, so these stay inline.
pub type OptionTags = SmallVec<[String; 2]>;

/// The structured attributes of one catalogued file.
///
/// Produced by the classifier from a path string alone. Fields with no
/// recognized token hold the [`EMPTY`] sentinel rather than an empty string.
///
/// # Examples
///
/// ```
/// use bids_core::{Classification, DataSource, DataType};
///
/// let class = Classification::default();
/// assert_eq!(class.subject, "Empty");
/// assert_eq!(class.session, "Empty");
/// assert_eq!(class.data_scan, "Empty");
/// assert_eq!(class.data_type, DataType::Empty);
/// assert_eq!(class.data_source, DataSource::Raw);
/// assert!(class.options.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    /// Modality class.
    pub data_type: DataType,
    /// Provenance tier.
    pub data_source: DataSource,
    /// Normalized scan label (`T1w`, `dwi`, `ct`, or `Empty`).
    pub data_scan: String,
    /// Qualifier tags in discovery order, without duplicates.
    pub options: OptionTags,
    /// Subject identifier (`sub-XX`) or `Empty`.
    pub subject: String,
    /// Session identifier (`ses-XX`) or `Empty`.
    pub session: String,
}

impl Default for Classification {
    fn default() -> Self {
        Self {
            data_type: DataType::Empty,
            data_source: DataSource::Raw,
            data_scan: EMPTY.to_owned(),
            options: OptionTags::new(),
            subject: EMPTY.to_owned(),
            session: EMPTY.to_owned(),
        }
    }
}
