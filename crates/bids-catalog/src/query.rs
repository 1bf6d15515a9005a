//! Filtered queries over a [`RecordSet`].
//!
//! Every constrained key yields the set of record indices whose value is
//! accepted; the answer is the intersection of those sets, projected into a
//! new record set in ascending index order. Queries are evaluated fresh on
//! every call.
//!
//! Two rules apply to every key:
//!
//! - Empty values never match, even if the filter accepts the empty string.
//! - For `options`, a record matches when any of its tags is accepted; a
//!   record without tags never matches an options constraint.

use bids_core::FxHashSet;
use tracing::debug;

use crate::filter::Filter;
use crate::record_set::RecordSet;

impl RecordSet {
    /// Returns the records accepted by `filter`.
    ///
    /// An empty filter returns a copy of the whole set. A filter that
    /// matches nothing returns a set whose eight columns are all empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use bids_catalog::{Filter, RecordSet};
    /// use bids_core::{Classification, Format};
    /// use camino::Utf8Path;
    ///
    /// let mut records = RecordSet::default();
    /// for (path, scan) in [("/d/a.nii", "T1w"), ("/d/b.nii", "dwi"), ("/d/c.nii", "T1w")] {
    ///     let class = Classification { data_scan: scan.to_owned(), ..Classification::default() };
    ///     records.push(Utf8Path::new(path), Format::Nifti, class);
    /// }
    ///
    /// let t1 = records.query(&Filter::new().with_data_scans(["T1w"]));
    /// assert_eq!(t1.file_names(), ["/d/a.nii", "/d/c.nii"]);
    /// ```
    #[must_use]
    pub fn query(&self, filter: &Filter) -> Self {
        let indices = self.matching_indices(filter);
        debug!(filter = %filter, matched = indices.len(), total = self.len(), "Evaluated query");
        self.select(&indices)
    }

    /// Returns the ascending indices of the records accepted by `filter`.
    #[must_use]
    pub fn matching_indices(&self, filter: &Filter) -> Vec<usize> {
        let mut candidates: Vec<usize> = (0..self.len()).collect();

        if let Some(accepted) = &filter.subjects {
            candidates.retain(|&i| accepts(accepted, &self.subjects[i]));
        }
        if let Some(accepted) = &filter.sessions {
            candidates.retain(|&i| accepts(accepted, &self.sessions[i]));
        }
        if let Some(accepted) = &filter.data_scans {
            candidates.retain(|&i| accepts(accepted, &self.data_scans[i]));
        }
        if let Some(accepted) = &filter.data_sources {
            candidates.retain(|&i| accepted.contains(&self.data_sources[i]));
        }
        if let Some(accepted) = &filter.data_types {
            candidates.retain(|&i| accepted.contains(&self.data_types[i]));
        }
        if let Some(accepted) = &filter.formats {
            candidates.retain(|&i| accepted.contains(&self.formats[i]));
        }
        if let Some(accepted) = &filter.options {
            candidates.retain(|&i| self.options[i].iter().any(|tag| accepts(accepted, tag)));
        }
        if let Some(accepted) = &filter.file_names {
            candidates.retain(|&i| {
                let path = &self.file_names[i];
                !path.as_str().is_empty() && accepted.contains(path)
            });
        }

        candidates
    }
}

#[inline]
fn accepts(accepted: &FxHashSet<String>, value: &str) -> bool {
    !value.is_empty() && accepted.contains(value)
}
