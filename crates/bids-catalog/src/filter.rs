//! Typed query filters.
//!
//! A [`Filter`] maps a closed set of [`FilterKey`]s to sets of accepted
//! values. A key that is absent does not constrain the query; a key that is
//! present with an empty set matches nothing.
//!
//! Filters can be built in code, from string values per key, or from JSON
//! where each key takes a single value or a list:
//!
//! ```
//! use bids_catalog::{Filter, FilterKey};
//!
//! let filter = Filter::from_json(r#"{"subjects": "sub-01", "formats": ["nifti", "json"]}"#)?;
//! assert!(filter.contains_key(FilterKey::Subjects));
//! let formats = filter.values(FilterKey::Formats);
//! assert_eq!(formats, Some(vec!["json".to_owned(), "nifti".to_owned()]));
//!
//! assert!(Filter::from_json(r#"{"modality": "anat"}"#).is_err());
//! # Ok::<(), bids_catalog::QueryError>(())
//! ```

use std::fmt;
use std::str::FromStr;

use bids_core::{DataSource, DataType, Format, FxHashSet};
use camino::Utf8PathBuf;
use serde::Deserialize;

use crate::error::QueryError;

/// The attributes a filter can constrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FilterKey {
    /// Subject identifiers.
    Subjects,
    /// Session identifiers.
    Sessions,
    /// Scan labels.
    DataScans,
    /// Provenance tiers.
    DataSources,
    /// Modality classes.
    DataTypes,
    /// Coarse file formats.
    Formats,
    /// Qualifier tags; a record matches if any of its tags is accepted.
    Options,
    /// Absolute file paths.
    FileNames,
}

impl FilterKey {
    /// All keys, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::Subjects,
        Self::Sessions,
        Self::DataScans,
        Self::DataSources,
        Self::DataTypes,
        Self::Formats,
        Self::Options,
        Self::FileNames,
    ];

    /// Returns the key name used in JSON filters and reports.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Subjects => "subjects",
            Self::Sessions => "sessions",
            Self::DataScans => "data_scans",
            Self::DataSources => "data_sources",
            Self::DataTypes => "data_types",
            Self::Formats => "formats",
            Self::Options => "options",
            Self::FileNames => "file_names",
        }
    }
}

impl fmt::Display for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterKey {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| QueryError::UnknownKey(s.to_owned()))
    }
}

/// A set of constraints on catalog attributes.
///
/// # Examples
///
/// ```
/// use bids_catalog::Filter;
/// use bids_core::DataSource;
///
/// let filter = Filter::new()
///     .with_subjects(["sub-01"])
///     .with_data_sources([DataSource::Raw, DataSource::Derivatives]);
/// assert_eq!(filter.to_string(), "subjects=[sub-01] data_sources=[derivatives,raw]");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "FilterDocument")]
pub struct Filter {
    pub(crate) subjects: Option<FxHashSet<String>>,
    pub(crate) sessions: Option<FxHashSet<String>>,
    pub(crate) data_scans: Option<FxHashSet<String>>,
    pub(crate) data_sources: Option<FxHashSet<DataSource>>,
    pub(crate) data_types: Option<FxHashSet<DataType>>,
    pub(crate) formats: Option<FxHashSet<Format>>,
    pub(crate) options: Option<FxHashSet<String>>,
    pub(crate) file_names: Option<FxHashSet<Utf8PathBuf>>,
}

impl Filter {
    /// Creates a filter that matches every record.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON filter document.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Parse`] for malformed JSON or unknown keys, and
    /// [`QueryError::InvalidValue`] for values an enumerated key rejects.
    pub fn from_json(json: &str) -> Result<Self, QueryError> {
        let document: FilterDocument = serde_json::from_str(json)?;
        Self::try_from(document)
    }

    /// Accepts these subjects.
    #[must_use]
    pub fn with_subjects<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subjects = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Accepts these sessions.
    #[must_use]
    pub fn with_sessions<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sessions = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Accepts these scan labels.
    #[must_use]
    pub fn with_data_scans<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.data_scans = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Accepts these provenance tiers.
    #[must_use]
    pub fn with_data_sources(mut self, values: impl IntoIterator<Item = DataSource>) -> Self {
        self.data_sources = Some(values.into_iter().collect());
        self
    }

    /// Accepts these modality classes.
    #[must_use]
    pub fn with_data_types(mut self, values: impl IntoIterator<Item = DataType>) -> Self {
        self.data_types = Some(values.into_iter().collect());
        self
    }

    /// Accepts these formats.
    #[must_use]
    pub fn with_formats(mut self, values: impl IntoIterator<Item = Format>) -> Self {
        self.formats = Some(values.into_iter().collect());
        self
    }

    /// Accepts records carrying any of these option tags.
    #[must_use]
    pub fn with_options<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Accepts these file paths.
    #[must_use]
    pub fn with_file_names<I, P>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Utf8PathBuf>,
    {
        self.file_names = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the accepted values of `key` from strings.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidValue`] if `key` is enumerated
    /// (`data_sources`, `data_types`, `formats`) and a value does not parse.
    /// The filter is unchanged on error.
    ///
    /// # Examples
    ///
    /// ```
    /// use bids_catalog::{Filter, FilterKey, QueryError};
    ///
    /// let filter = Filter::new().with_values(FilterKey::DataTypes, ["anat", "dwi"])?;
    /// assert!(filter.contains_key(FilterKey::DataTypes));
    ///
    /// let err = Filter::new().with_values(FilterKey::Formats, ["mgz"]).unwrap_err();
    /// assert!(matches!(err, QueryError::InvalidValue { .. }));
    /// # Ok::<(), QueryError>(())
    /// ```
    pub fn with_values<I, S>(mut self, key: FilterKey, values: I) -> Result<Self, QueryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.set_values(key, values)?;
        Ok(self)
    }

    /// In-place form of [`with_values`](Self::with_values).
    ///
    /// # Errors
    ///
    /// Same as [`with_values`](Self::with_values).
    pub fn set_values<I, S>(&mut self, key: FilterKey, values: I) -> Result<(), QueryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let values = values.into_iter();
        match key {
            FilterKey::Subjects => self.subjects = Some(owned(values)),
            FilterKey::Sessions => self.sessions = Some(owned(values)),
            FilterKey::DataScans => self.data_scans = Some(owned(values)),
            FilterKey::Options => self.options = Some(owned(values)),
            FilterKey::FileNames => {
                self.file_names = Some(values.map(|v| Utf8PathBuf::from(v.as_ref())).collect());
            }
            FilterKey::DataSources => self.data_sources = Some(parsed(key, values)?),
            FilterKey::DataTypes => self.data_types = Some(parsed(key, values)?),
            FilterKey::Formats => self.formats = Some(parsed(key, values)?),
        }
        Ok(())
    }

    /// Drops the constraint on `key`.
    pub fn remove(&mut self, key: FilterKey) {
        match key {
            FilterKey::Subjects => self.subjects = None,
            FilterKey::Sessions => self.sessions = None,
            FilterKey::DataScans => self.data_scans = None,
            FilterKey::DataSources => self.data_sources = None,
            FilterKey::DataTypes => self.data_types = None,
            FilterKey::Formats => self.formats = None,
            FilterKey::Options => self.options = None,
            FilterKey::FileNames => self.file_names = None,
        }
    }

    /// Returns `true` if `key` is constrained.
    #[must_use]
    pub const fn contains_key(&self, key: FilterKey) -> bool {
        match key {
            FilterKey::Subjects => self.subjects.is_some(),
            FilterKey::Sessions => self.sessions.is_some(),
            FilterKey::DataScans => self.data_scans.is_some(),
            FilterKey::DataSources => self.data_sources.is_some(),
            FilterKey::DataTypes => self.data_types.is_some(),
            FilterKey::Formats => self.formats.is_some(),
            FilterKey::Options => self.options.is_some(),
            FilterKey::FileNames => self.file_names.is_some(),
        }
    }

    /// Returns the constrained keys in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = FilterKey> + '_ {
        FilterKey::ALL.into_iter().filter(|&key| self.contains_key(key))
    }

    /// Returns `true` if no key is constrained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys().next().is_none()
    }

    /// Returns the accepted values of `key` as sorted strings.
    #[must_use]
    pub fn values(&self, key: FilterKey) -> Option<Vec<String>> {
        let mut values: Vec<String> = match key {
            FilterKey::Subjects => strings(self.subjects.as_ref()?),
            FilterKey::Sessions => strings(self.sessions.as_ref()?),
            FilterKey::DataScans => strings(self.data_scans.as_ref()?),
            FilterKey::Options => strings(self.options.as_ref()?),
            FilterKey::FileNames => self
                .file_names
                .as_ref()?
                .iter()
                .map(ToString::to_string)
                .collect(),
            FilterKey::DataSources => names(self.data_sources.as_ref()?, DataSource::as_str),
            FilterKey::DataTypes => names(self.data_types.as_ref()?, DataType::as_str),
            FilterKey::Formats => names(self.formats.as_ref()?, Format::as_str),
        };
        values.sort_unstable();
        Some(values)
    }

    /// Narrows the selection to one subject.
    ///
    /// Session and file selections made for the previous subject no longer
    /// apply and are dropped.
    pub fn select_subject(&mut self, subject: impl Into<String>) {
        self.subjects = Some(std::iter::once(subject.into()).collect());
        self.sessions = None;
        self.file_names = None;
    }

    /// Narrows the selection to these sessions.
    ///
    /// An empty list removes the session constraint. File selections are
    /// dropped either way.
    pub fn select_sessions<I, S>(&mut self, sessions: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let sessions: FxHashSet<String> = sessions.into_iter().map(Into::into).collect();
        self.sessions = (!sessions.is_empty()).then_some(sessions);
        self.file_names = None;
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for key in self.keys() {
            let values = self.values(key).unwrap_or_default();
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            write!(f, "{key}=[{}]", values.join(","))?;
        }
        Ok(())
    }
}

fn owned<I, S>(values: I) -> FxHashSet<String>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    values.map(|v| v.as_ref().to_owned()).collect()
}

fn parsed<T, I, S>(key: FilterKey, values: I) -> Result<FxHashSet<T>, QueryError>
where
    T: FromStr<Err = bids_core::ParseValueError> + Eq + std::hash::Hash,
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    values
        .map(|v| v.as_ref().parse().map_err(|e| QueryError::invalid_value(key.as_str(), e)))
        .collect()
}

fn strings(values: &FxHashSet<String>) -> Vec<String> {
    values.iter().cloned().collect()
}

fn names<T: Copy>(values: &FxHashSet<T>, name: impl Fn(T) -> &'static str) -> Vec<String> {
    values.iter().map(|&v| name(v).to_owned()).collect()
}

/// A scalar or a list in a JSON filter.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(value) => vec![value],
            Self::Many(values) => values,
        }
    }
}

/// Wire form of a [`Filter`].
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FilterDocument {
    subjects: Option<OneOrMany>,
    sessions: Option<OneOrMany>,
    data_scans: Option<OneOrMany>,
    data_sources: Option<OneOrMany>,
    data_types: Option<OneOrMany>,
    formats: Option<OneOrMany>,
    options: Option<OneOrMany>,
    file_names: Option<OneOrMany>,
}

impl TryFrom<FilterDocument> for Filter {
    type Error = QueryError;

    fn try_from(document: FilterDocument) -> Result<Self, Self::Error> {
        let entries = [
            (FilterKey::Subjects, document.subjects),
            (FilterKey::Sessions, document.sessions),
            (FilterKey::DataScans, document.data_scans),
            (FilterKey::DataSources, document.data_sources),
            (FilterKey::DataTypes, document.data_types),
            (FilterKey::Formats, document.formats),
            (FilterKey::Options, document.options),
            (FilterKey::FileNames, document.file_names),
        ];

        let mut filter = Self::new();
        for (key, values) in entries {
            if let Some(values) = values {
                filter.set_values(key, values.into_vec())?;
            }
        }
        Ok(filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_key_round_trip_names() {
        for key in FilterKey::ALL {
            assert_eq!(key.as_str().parse::<FilterKey>().unwrap(), key);
        }
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let err = "scans".parse::<FilterKey>().unwrap_err();
        assert!(matches!(err, QueryError::UnknownKey(ref k) if k == "scans"));
    }

    #[test]
    fn test_json_accepts_scalar_and_list() {
        let filter = Filter::from_json(
            r#"{"data_scans": "T1w", "options": ["acq-gad", "desc-bfc"]}"#,
        )
        .unwrap();
        assert_eq!(filter.values(FilterKey::DataScans), Some(vec!["T1w".to_owned()]));
        assert_eq!(
            filter.values(FilterKey::Options),
            Some(vec!["acq-gad".to_owned(), "desc-bfc".to_owned()])
        );
        assert!(!filter.contains_key(FilterKey::Subjects));
    }

    #[test]
    fn test_json_rejects_unknown_keys() {
        let err = Filter::from_json(r#"{"subject": "sub-01"}"#).unwrap_err();
        assert!(matches!(err, QueryError::Parse(_)));
        assert!(err.to_string().contains("subject"));
    }

    #[test]
    fn test_json_rejects_invalid_enum_values() {
        let err = Filter::from_json(r#"{"data_sources": ["raw", "rawdata"]}"#).unwrap_err();
        assert!(err.to_string().contains("rawdata"));
    }

    #[test]
    fn test_serde_deserialize_directly() {
        let filter: Filter = serde_json::from_str(r#"{"formats": "dicom"}"#).unwrap();
        assert_eq!(filter, Filter::new().with_formats([Format::Dicom]));
    }

    #[test]
    fn test_empty_list_is_kept_as_constraint() {
        let filter = Filter::from_json(r#"{"options": []}"#).unwrap();
        assert!(filter.contains_key(FilterKey::Options));
        assert_eq!(filter.values(FilterKey::Options), Some(Vec::new()));
    }

    #[test]
    fn test_set_values_leaves_filter_unchanged_on_error() {
        let mut filter = Filter::new().with_formats([Format::Nifti]);
        assert!(filter.set_values(FilterKey::Formats, ["nifti", "mgz"]).is_err());
        assert_eq!(filter, Filter::new().with_formats([Format::Nifti]));
    }

    #[test]
    fn test_remove_and_keys() {
        let mut filter = Filter::new().with_subjects(["sub-01"]).with_sessions(["ses-01"]);
        assert_eq!(
            filter.keys().collect::<Vec<_>>(),
            vec![FilterKey::Subjects, FilterKey::Sessions]
        );

        filter.remove(FilterKey::Subjects);
        filter.remove(FilterKey::Sessions);
        assert!(filter.is_empty());
    }

    #[test]
    fn test_select_subject_clears_dependent_selections() {
        let mut filter = Filter::new()
            .with_subjects(["sub-01"])
            .with_sessions(["ses-01"])
            .with_file_names(["/d/a.nii"])
            .with_formats([Format::Nifti]);

        filter.select_subject("sub-02");

        assert_eq!(filter.values(FilterKey::Subjects), Some(vec!["sub-02".to_owned()]));
        assert!(!filter.contains_key(FilterKey::Sessions));
        assert!(!filter.contains_key(FilterKey::FileNames));
        assert!(filter.contains_key(FilterKey::Formats));
    }

    #[test]
    fn test_select_sessions() {
        let mut filter = Filter::new().with_file_names(["/d/a.nii"]);
        filter.select_sessions(["ses-01", "ses-02"]);
        assert_eq!(filter.values(FilterKey::Sessions).map(|v| v.len()), Some(2));
        assert!(!filter.contains_key(FilterKey::FileNames));

        filter.select_sessions(Vec::<String>::new());
        assert!(!filter.contains_key(FilterKey::Sessions));
    }

    #[test]
    fn test_display_is_sorted_and_stable() {
        let filter = Filter::new()
            .with_formats([Format::Nifti, Format::Dicom])
            .with_subjects(["sub-02", "sub-01"]);
        assert_eq!(filter.to_string(), "subjects=[sub-01,sub-02] formats=[dicom,nifti]");
        assert_eq!(Filter::new().to_string(), "");
    }
}
