//! The catalog index as eight parallel columns.
//!
//! A [`RecordSet`] stores one column per attribute. Index `i` refers to the
//! same file in every column. Columns only grow through [`RecordSet::push`],
//! which appends to all of them at once, so their lengths never diverge.
//!
//! Query results are record sets too: a projection copies the selected rows
//! into a fresh set in ascending index order.

use std::collections::BTreeSet;

use bids_core::{Classification, DataSource, DataType, Format, OptionTags};
use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;

/// Indexed attributes of catalogued files.
///
/// Serializes as an object of eight arrays named after the filter keys.
///
/// # Examples
///
/// ```
/// use bids_catalog::RecordSet;
/// use bids_core::{Classification, Format};
/// use camino::Utf8Path;
///
/// let mut records = RecordSet::default();
/// let mut class = Classification::default();
/// class.subject = "sub-01".to_owned();
/// records.push(Utf8Path::new("/data/sub-01/anat/sub-01_T1w.nii"), Format::Nifti, class);
///
/// assert_eq!(records.len(), 1);
/// assert_eq!(records.distinct_subjects(), vec!["sub-01"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecordSet {
    pub(crate) file_names: Vec<Utf8PathBuf>,
    pub(crate) formats: Vec<Format>,
    pub(crate) data_types: Vec<DataType>,
    pub(crate) data_sources: Vec<DataSource>,
    pub(crate) data_scans: Vec<String>,
    pub(crate) options: Vec<OptionTags>,
    pub(crate) subjects: Vec<String>,
    pub(crate) sessions: Vec<String>,
}

/// A borrowed view of one row of a [`RecordSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Record<'a> {
    /// Absolute path of the file.
    pub file_name: &'a Utf8Path,
    /// Coarse file format.
    pub format: Format,
    /// Modality class.
    pub data_type: DataType,
    /// Provenance tier.
    pub data_source: DataSource,
    /// Scan label.
    pub data_scan: &'a str,
    /// Qualifier tags.
    pub options: &'a [String],
    /// Subject identifier or `Empty`.
    pub subject: &'a str,
    /// Session identifier or `Empty`.
    pub session: &'a str,
}

impl RecordSet {
    /// Creates an empty record set with room for `capacity` rows.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            file_names: Vec::with_capacity(capacity),
            formats: Vec::with_capacity(capacity),
            data_types: Vec::with_capacity(capacity),
            data_sources: Vec::with_capacity(capacity),
            data_scans: Vec::with_capacity(capacity),
            options: Vec::with_capacity(capacity),
            subjects: Vec::with_capacity(capacity),
            sessions: Vec::with_capacity(capacity),
        }
    }

    /// Appends one file with its classification.
    pub fn push(&mut self, file_name: &Utf8Path, format: Format, class: Classification) {
        self.file_names.push(file_name.to_owned());
        self.formats.push(format);
        self.data_types.push(class.data_type);
        self.data_sources.push(class.data_source);
        self.data_scans.push(class.data_scan);
        self.options.push(class.options);
        self.subjects.push(class.subject);
        self.sessions.push(class.session);
    }

    /// Returns the number of records.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.file_names.len()
    }

    /// Returns `true` if there are no records.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.file_names.is_empty()
    }

    /// Returns the record at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Record<'_>> {
        Some(Record {
            file_name: self.file_names.get(index)?,
            format: *self.formats.get(index)?,
            data_type: *self.data_types.get(index)?,
            data_source: *self.data_sources.get(index)?,
            data_scan: self.data_scans.get(index)?,
            options: self.options.get(index)?,
            subject: self.subjects.get(index)?,
            session: self.sessions.get(index)?,
        })
    }

    /// Iterates over the records in index order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = Record<'_>> + '_ {
        (0..self.len()).map(move |index| self.row(index))
    }

    /// Returns the record at an index known to be in range.
    fn row(&self, i: usize) -> Record<'_> {
        Record {
            file_name: &self.file_names[i],
            format: self.formats[i],
            data_type: self.data_types[i],
            data_source: self.data_sources[i],
            data_scan: &self.data_scans[i],
            options: &self.options[i],
            subject: &self.subjects[i],
            session: &self.sessions[i],
        }
    }

    /// Copies the rows at `indices` into a new record set.
    ///
    /// Indices must be ascending and in range; rows keep their relative order.
    pub(crate) fn select(&self, indices: &[usize]) -> Self {
        debug_assert!(indices.windows(2).all(|w| w[0] < w[1]));
        debug_assert!(indices.last().is_none_or(|&last| last < self.len()));

        let mut out = Self::with_capacity(indices.len());
        for &i in indices {
            out.file_names.push(self.file_names[i].clone());
            out.formats.push(self.formats[i]);
            out.data_types.push(self.data_types[i]);
            out.data_sources.push(self.data_sources[i]);
            out.data_scans.push(self.data_scans[i].clone());
            out.options.push(self.options[i].clone());
            out.subjects.push(self.subjects[i].clone());
            out.sessions.push(self.sessions[i].clone());
        }
        out
    }

    /// Returns the distinct subjects, sorted.
    ///
    /// Records without a subject contribute `Empty`.
    #[must_use]
    pub fn distinct_subjects(&self) -> Vec<String> {
        distinct(&self.subjects)
    }

    /// Returns the distinct sessions, sorted.
    ///
    /// Records without a session contribute `Empty`.
    #[must_use]
    pub fn distinct_sessions(&self) -> Vec<String> {
        distinct(&self.sessions)
    }

    /// Column of file paths.
    #[inline]
    #[must_use]
    pub fn file_names(&self) -> &[Utf8PathBuf] {
        &self.file_names
    }

    /// Column of formats.
    #[inline]
    #[must_use]
    pub fn formats(&self) -> &[Format] {
        &self.formats
    }

    /// Column of data types.
    #[inline]
    #[must_use]
    pub fn data_types(&self) -> &[DataType] {
        &self.data_types
    }

    /// Column of data sources.
    #[inline]
    #[must_use]
    pub fn data_sources(&self) -> &[DataSource] {
        &self.data_sources
    }

    /// Column of scan labels.
    #[inline]
    #[must_use]
    pub fn data_scans(&self) -> &[String] {
        &self.data_scans
    }

    /// Column of option tags.
    #[inline]
    #[must_use]
    pub fn options(&self) -> &[OptionTags] {
        &self.options
    }

    /// Column of subjects.
    #[inline]
    #[must_use]
    pub fn subjects(&self) -> &[String] {
        &self.subjects
    }

    /// Column of sessions.
    #[inline]
    #[must_use]
    pub fn sessions(&self) -> &[String] {
        &self.sessions
    }
}

fn distinct(column: &[String]) -> Vec<String> {
    column
        .iter()
        .filter(|value| !value.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use bids_core::EMPTY;

    use super::*;

    fn class(subject: &str, session: &str) -> Classification {
        Classification {
            subject: subject.to_owned(),
            session: session.to_owned(),
            ..Classification::default()
        }
    }

    fn sample() -> RecordSet {
        let mut records = RecordSet::default();
        records.push(Utf8Path::new("/d/a.nii"), Format::Nifti, class("sub-02", "ses-01"));
        records.push(Utf8Path::new("/d/b.json"), Format::Json, class("sub-01", EMPTY));
        records.push(Utf8Path::new("/d/c.dcm"), Format::Dicom, class("sub-02", "ses-02"));
        records
    }

    fn column_lengths(records: &RecordSet) -> [usize; 8] {
        [
            records.file_names.len(),
            records.formats.len(),
            records.data_types.len(),
            records.data_sources.len(),
            records.data_scans.len(),
            records.options.len(),
            records.subjects.len(),
            records.sessions.len(),
        ]
    }

    #[test]
    fn test_push_keeps_columns_aligned() {
        let records = sample();
        assert_eq!(column_lengths(&records), [3; 8]);
    }

    #[test]
    fn test_get_and_iter() {
        let records = sample();
        let second = records.get(1).unwrap();
        assert_eq!(second.file_name, "/d/b.json");
        assert_eq!(second.format, Format::Json);
        assert_eq!(second.session, EMPTY);
        assert!(records.get(3).is_none());

        let names: Vec<_> = records.iter().map(|r| r.file_name.as_str()).collect();
        assert_eq!(names, vec!["/d/a.nii", "/d/b.json", "/d/c.dcm"]);
    }

    #[test]
    fn test_select_projects_rows() {
        let records = sample();
        let selected = records.select(&[0, 2]);
        assert_eq!(column_lengths(&selected), [2; 8]);
        assert_eq!(
            selected.file_names(),
            [Utf8PathBuf::from("/d/a.nii"), Utf8PathBuf::from("/d/c.dcm")]
        );
        assert_eq!(selected.sessions(), ["ses-01", "ses-02"]);

        let none = records.select(&[]);
        assert!(none.is_empty());
        assert_eq!(column_lengths(&none), [0; 8]);
    }

    #[test]
    fn test_distinct_values() {
        let records = sample();
        assert_eq!(records.distinct_subjects(), vec!["sub-01", "sub-02"]);
        assert_eq!(records.distinct_sessions(), vec![EMPTY, "ses-01", "ses-02"]);
        assert!(RecordSet::default().distinct_subjects().is_empty());
    }

    #[test]
    fn test_serializes_plural_columns() {
        let json = serde_json::to_value(sample()).unwrap();
        for key in [
            "file_names",
            "formats",
            "data_types",
            "data_sources",
            "data_scans",
            "options",
            "subjects",
            "sessions",
        ] {
            assert_eq!(json[key].as_array().unwrap().len(), 3, "{key}");
        }
        assert_eq!(json["formats"][2], "dicom");
        assert_eq!(json["data_types"][0], "Empty");
    }
}
