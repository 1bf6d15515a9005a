//! Filling a tool's named inputs from a selection.
//!
//! Processed files often carry markers the classifier does not know about
//! (`sub-01_T1w_bfc.nii.gz`), so input rules use case-insensitive wildcards
//! instead of exact values. For every [`ToolInput`] the first record that
//! satisfies all of its rules is picked.

use camino::Utf8Path;
use regex::{Regex, RegexBuilder};

use crate::error::QueryError;
use crate::filter::FilterKey;
use crate::preset::{Preset, ToolInput};
use crate::record_set::{Record, RecordSet};

/// A compiled set of wildcard rules.
///
/// # Examples
///
/// ```
/// use bids_catalog::{FilterKey, InputPattern, RecordSet};
/// use bids_core::{Classification, Format};
/// use camino::Utf8Path;
///
/// let mut records = RecordSet::default();
/// for path in ["/d/sub-01_T1w.nii.gz", "/d/sub-01_T1w_bfc.nii.gz"] {
///     records.push(Utf8Path::new(path), Format::Nifti, Classification::default());
/// }
///
/// let pattern = InputPattern::compile(&[(FilterKey::FileNames, "*_BFC*")])?;
/// let matched: Vec<_> = records.iter().filter(|r| pattern.matches(r)).collect();
/// assert_eq!(matched.len(), 1);
/// assert_eq!(matched[0].file_name.as_str(), "/d/sub-01_T1w_bfc.nii.gz");
/// # Ok::<(), bids_catalog::QueryError>(())
/// ```
#[derive(Debug, Clone)]
pub struct InputPattern {
    rules: Vec<(FilterKey, Regex)>,
}

impl InputPattern {
    /// Compiles `(key, wildcard)` rules.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Pattern`] if a wildcard does not compile.
    pub fn compile(rules: &[(FilterKey, &str)]) -> Result<Self, QueryError> {
        let rules = rules
            .iter()
            .map(|&(key, wildcard)| {
                wildcard_to_regex(wildcard)
                    .map(|regex| (key, regex))
                    .map_err(|source| QueryError::Pattern {
                        key: key.as_str(),
                        source,
                    })
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { rules })
    }

    /// Returns `true` if every rule matches one of the record's values.
    #[must_use]
    pub fn matches(&self, record: &Record<'_>) -> bool {
        self.rules
            .iter()
            .all(|(key, regex)| record_values(record, *key).iter().any(|v| regex.is_match(v)))
    }
}

/// The file chosen for one input slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedInput<'a> {
    /// The slot.
    pub input: &'static ToolInput,
    /// The first matching file, if any.
    pub file: Option<&'a Utf8Path>,
}

impl ResolvedInput<'_> {
    /// Returns `true` if a required slot stayed empty.
    #[inline]
    #[must_use]
    pub const fn is_missing(&self) -> bool {
        self.input.required && self.file.is_none()
    }
}

/// Picks a file for every named input of `preset`.
///
/// Template slots draw from `templates`; all others from `selection`.
///
/// # Errors
///
/// Returns [`QueryError::Pattern`] if an input rule does not compile.
pub fn resolve_inputs<'a>(
    preset: Preset,
    selection: &'a RecordSet,
    templates: &'a RecordSet,
) -> Result<Vec<ResolvedInput<'a>>, QueryError> {
    preset
        .inputs()
        .iter()
        .map(|input| {
            let pattern = InputPattern::compile(input.rules)?;
            let pool = if input.from_templates() {
                templates
            } else {
                selection
            };
            let file = pool
                .iter()
                .find(|record| pattern.matches(record))
                .map(|record| record.file_name);
            Ok(ResolvedInput { input, file })
        })
        .collect()
}

/// The values of `key` on a record, as strings.
fn record_values<'a>(record: &Record<'a>, key: FilterKey) -> Vec<&'a str> {
    match key {
        FilterKey::Subjects => vec![record.subject],
        FilterKey::Sessions => vec![record.session],
        FilterKey::DataScans => vec![record.data_scan],
        FilterKey::DataSources => vec![record.data_source.as_str()],
        FilterKey::DataTypes => vec![record.data_type.as_str()],
        FilterKey::Formats => vec![record.format.as_str()],
        FilterKey::Options => record.options.iter().map(String::as_str).collect(),
        FilterKey::FileNames => vec![record.file_name.as_str()],
    }
}

/// Translates a `*`/`?` wildcard into an anchored, case-insensitive regex.
fn wildcard_to_regex(wildcard: &str) -> Result<Regex, regex::Error> {
    let mut pattern = String::from("^");
    for ch in wildcard.chars() {
        match ch {
            '*' => pattern.push_str(".*"),
            '?' => pattern.push('.'),
            _ => pattern.push_str(&regex::escape(ch.encode_utf8(&mut [0; 4]))),
        }
    }
    pattern.push('$');
    RegexBuilder::new(&pattern).case_insensitive(true).build()
}

#[cfg(test)]
mod tests {
    use bids_core::{Classification, DataSource, DataType, EMPTY, Format};

    use super::*;

    fn push(
        records: &mut RecordSet,
        path: &str,
        source: DataSource,
        scan: &str,
        session: &str,
        options: &[&str],
    ) {
        let data_type = match scan {
            "dwi" => DataType::Dwi,
            "ct" => DataType::Ct,
            _ => DataType::Anat,
        };
        let class = Classification {
            data_type,
            data_source: source,
            data_scan: scan.to_owned(),
            options: options.iter().map(|&o| o.to_owned()).collect(),
            subject: "sub-01".to_owned(),
            session: session.to_owned(),
        };
        records.push(Utf8Path::new(path), Format::Nifti, class);
    }

    fn selection() -> RecordSet {
        let mut records = RecordSet::default();
        push(&mut records, "/d/sub-01/anat/sub-01_T1w.nii.gz", DataSource::Raw, "T1w", EMPTY, &[]);
        push(
            &mut records,
            "/d/sub-01/anat/sub-01_acq-gad_T1w.nii.gz",
            DataSource::Raw,
            "T1w",
            EMPTY,
            &["acq-gad"],
        );
        push(&mut records, "/d/sub-01/dwi/sub-01_dwi.nii.gz", DataSource::Raw, "dwi", EMPTY, &[]);
        push(
            &mut records,
            "/d/derivatives/sub-01/sub-01_T1w_BFC.nii.gz",
            DataSource::Derivatives,
            "T1w",
            EMPTY,
            &[],
        );
        push(
            &mut records,
            "/d/sub-01/ses-postop/ct/sub-01_ses-postop_ct.nii.gz",
            DataSource::Raw,
            "ct",
            "ses-postop",
            &[],
        );
        records
    }

    fn templates() -> RecordSet {
        let mut records = RecordSet::default();
        push(&mut records, "/d/templates/mni_T1w.nii.gz", DataSource::Templates, "T1w", EMPTY, &[]);
        records
    }

    fn file_of<'a>(resolved: &[ResolvedInput<'a>], name: &str) -> Option<&'a str> {
        resolved
            .iter()
            .find(|r| r.input.name == name)
            .and_then(|r| r.file)
            .map(Utf8Path::as_str)
    }

    #[test]
    fn test_wildcards() {
        let regex = wildcard_to_regex("*_bfc*").unwrap();
        assert!(regex.is_match("/d/sub-01_T1w_BFC.nii.gz"));
        assert!(!regex.is_match("/d/sub-01_T1w.nii.gz"));

        let regex = wildcard_to_regex("ses-?").unwrap();
        assert!(regex.is_match("ses-1"));
        assert!(!regex.is_match("ses-12"));

        let regex = wildcard_to_regex("a.b").unwrap();
        assert!(!regex.is_match("axb"));
    }

    #[test]
    fn test_dwi_preprocess_inputs() {
        let selection = selection();
        let templates = templates();
        let resolved = resolve_inputs(Preset::DwiPreprocess, &selection, &templates).unwrap();

        assert_eq!(file_of(&resolved, "T1w"), Some("/d/sub-01/anat/sub-01_T1w.nii.gz"));
        assert_eq!(file_of(&resolved, "dwi"), Some("/d/sub-01/dwi/sub-01_dwi.nii.gz"));
        assert_eq!(
            file_of(&resolved, "T1w Gadolinium"),
            Some("/d/sub-01/anat/sub-01_acq-gad_T1w.nii.gz")
        );
        assert_eq!(file_of(&resolved, "T2w DBS"), None);
        assert!(resolved.iter().all(|r| !r.is_missing()));
    }

    #[test]
    fn test_coregistration_inputs_use_templates() {
        let selection = selection();
        let templates = templates();
        let resolved = resolve_inputs(Preset::Coregistration, &selection, &templates).unwrap();

        assert_eq!(
            file_of(&resolved, "BFC T1w"),
            Some("/d/derivatives/sub-01/sub-01_T1w_BFC.nii.gz")
        );
        assert_eq!(file_of(&resolved, "MNI Template"), Some("/d/templates/mni_T1w.nii.gz"));
        assert_eq!(
            file_of(&resolved, "Post-Op CT"),
            Some("/d/sub-01/ses-postop/ct/sub-01_ses-postop_ct.nii.gz")
        );
        assert_eq!(file_of(&resolved, "Pre-Op CT"), None);
    }

    #[test]
    fn test_missing_required_inputs() {
        let empty = RecordSet::default();
        let resolved = resolve_inputs(Preset::Coregistration, &empty, &empty).unwrap();
        let missing: Vec<_> = resolved
            .iter()
            .filter(|r| r.is_missing())
            .map(|r| r.input.name)
            .collect();
        assert_eq!(missing, vec!["BFC T1w", "MNI Template", "Post-Op CT"]);
    }

    #[test]
    fn test_tools_without_inputs() {
        let empty = RecordSet::default();
        assert!(resolve_inputs(Preset::Display, &empty, &empty).unwrap().is_empty());
    }

    #[test]
    fn test_pattern_matches_any_option() {
        let records = selection();
        let pattern = InputPattern::compile(&[(FilterKey::Options, "ACQ-*")]).unwrap();
        let matched: Vec<_> = records.iter().filter(|r| pattern.matches(r)).collect();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].options, ["acq-gad"]);
    }
}
