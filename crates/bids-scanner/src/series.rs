//! Multi-file series detection.
//!
//! DICOM exports often store one acquisition as many files that differ only
//! in a trailing number (`IM0001.dcm`, `IM0002.dcm`, ...). Within a single
//! directory, files whose names share a stem and an extension are treated as
//! one series and represented by the file with the smallest index.
//!
//! A name takes part in series detection when it splits into
//!
//! ```text
//! <stem ending in a non-digit><1 to 4 digits><suffix without digits>
//! ```
//!
//! Names whose last digit run is longer than four digits, or that start with
//! their digit run, never merge. A stem shared by files with different
//! suffixes is ambiguous and blocks merging for that whole stem. So does a
//! stem that is also the prefix of any other file in the directory
//! (`IM0001`, `IM0002` next to `IMAGES.json`). Series are not checked for
//! contiguous indices.
//!
//! # Examples
//!
//! ```
//! use bids_scanner::collapse_series;
//!
//! let files = ["A0002.dcm", "A0001.dcm", "A0003.dcm", "notes.json"];
//! let collapsed = collapse_series(&files);
//! assert_eq!(collapsed.kept, vec!["A0001.dcm", "notes.json"]);
//! assert_eq!(collapsed.merged, 2);
//! ```

use bids_core::FxHashMap;

/// Longest digit run accepted as a series index.
const MAX_INDEX_DIGITS: usize = 4;

/// A file name split into its series parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesName<'a> {
    /// Everything before the index; always ends with a non-digit.
    pub stem: &'a str,
    /// Numeric value of the index digits.
    pub index: u16,
    /// Everything after the index; contains no digits.
    pub suffix: &'a str,
}

impl<'a> SeriesName<'a> {
    /// Splits a file name into stem, index and suffix.
    ///
    /// Returns `None` if the name has no digits, if its last digit run has
    /// more than four digits, or if nothing precedes the digit run.
    ///
    /// # Examples
    ///
    /// ```
    /// use bids_scanner::SeriesName;
    ///
    /// let name = SeriesName::parse("IM0012.dcm").unwrap();
    /// assert_eq!((name.stem, name.index, name.suffix), ("IM", 12, ".dcm"));
    ///
    /// assert!(SeriesName::parse("IM12345.dcm").is_none());
    /// assert!(SeriesName::parse("0001.dcm").is_none());
    /// assert!(SeriesName::parse("DICOMDIR").is_none());
    /// ```
    #[must_use]
    pub fn parse(name: &'a str) -> Option<Self> {
        let bytes = name.as_bytes();

        let digits_end = bytes.iter().rposition(u8::is_ascii_digit)? + 1;
        let digits_start = bytes[..digits_end]
            .iter()
            .rposition(|b| !b.is_ascii_digit())
            .map_or(0, |pos| pos + 1);

        if digits_start == 0 || digits_end - digits_start > MAX_INDEX_DIGITS {
            return None;
        }

        let index = name[digits_start..digits_end].parse().ok()?;

        Some(Self {
            stem: &name[..digits_start],
            index,
            suffix: &name[digits_end..],
        })
    }
}

/// Outcome of collapsing the series in one directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollapsedSeries<'a> {
    /// File names that remain, in input order.
    pub kept: Vec<&'a str>,
    /// Number of files dropped because another file represents their series.
    pub merged: usize,
}

/// Collapses multi-file series among the files of one directory.
///
/// Each series keeps its lowest-indexed file (the first one on ties); all
/// other files pass through unchanged. The order of the kept files follows
/// the input order.
#[must_use]
pub fn collapse_series<'a, S: AsRef<str>>(files: &'a [S]) -> CollapsedSeries<'a> {
    let names: Vec<&'a str> = files.iter().map(AsRef::as_ref).collect();
    let parsed: Vec<Option<SeriesName<'a>>> =
        names.iter().copied().map(SeriesName::parse).collect();

    // Group positions by stem
    let mut groups: FxHashMap<&str, Vec<usize>> = FxHashMap::default();
    for (position, name) in parsed.iter().enumerate() {
        if let Some(name) = name {
            groups.entry(name.stem).or_default().push(position);
        }
    }

    let mut dropped = vec![false; names.len()];
    let mut merged = 0;

    for members in groups.values().filter(|members| members.len() > 1) {
        let series: Vec<(usize, SeriesName<'_>)> = members
            .iter()
            .filter_map(|&position| parsed[position].map(|name| (position, name)))
            .collect();

        let Some((_, first)) = series.first() else {
            continue;
        };
        if series.iter().any(|(_, name)| name.suffix != first.suffix) {
            // Mixed extensions under one stem: leave every file alone
            continue;
        }
        let stem = first.stem;
        if names
            .iter()
            .enumerate()
            .any(|(position, name)| !members.contains(&position) && name.starts_with(stem))
        {
            continue;
        }

        let representative = series
            .iter()
            .min_by_key(|(position, name)| (name.index, *position))
            .map(|(position, _)| *position);

        for (position, _) in &series {
            if Some(*position) != representative {
                dropped[*position] = true;
                merged += 1;
            }
        }
    }

    let kept = names
        .into_iter()
        .zip(dropped)
        .filter_map(|(name, dropped)| (!dropped).then_some(name))
        .collect();

    CollapsedSeries { kept, merged }
}
