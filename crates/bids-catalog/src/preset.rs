//! Per-tool filter presets.
//!
//! Each processing tool works on one tier and format of data. Selecting a
//! tool resets the scan, type and file selections and narrows sources and
//! formats to what the tool consumes:
//!
//! | Preset           | Sources             | Formats | Selection |
//! |------------------|---------------------|---------|-----------|
//! | `dcm2nii`        | sourcedata          | dicom   | many      |
//! | `display`        | raw, derivatives    | nifti   | single    |
//! | `dwipreprocess`  | raw, derivatives    | nifti   | many      |
//! | `coregistration` | raw, derivatives    | nifti   | many      |
//!
//! Tools with named inputs also describe them as [`ToolInput`]s; see
//! [`resolve_inputs`](crate::resolve_inputs).

use std::fmt;
use std::str::FromStr;

use bids_core::{DataSource, Format, ParseValueError};

use crate::filter::{Filter, FilterKey};

/// A named input slot of a tool.
///
/// Rules pair a filter key with a case-insensitive wildcard (`*`, `?`); a
/// record fills the slot when every rule matches one of its values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolInput {
    /// Label shown for the slot.
    pub name: &'static str,
    /// Whether the tool can run without this input.
    pub required: bool,
    /// Wildcard rules the file must satisfy.
    pub rules: &'static [(FilterKey, &'static str)],
}

impl ToolInput {
    /// Returns `true` if the slot is filled from template files rather than
    /// the current selection.
    #[must_use]
    pub fn from_templates(&self) -> bool {
        self.rules.iter().any(|&(key, value)| {
            key == FilterKey::DataSources && value == DataSource::Templates.as_str()
        })
    }
}

const DWI_PREPROCESS_INPUTS: &[ToolInput] = &[
    ToolInput {
        name: "T1w",
        required: true,
        rules: &[(FilterKey::DataScans, "T1w"), (FilterKey::DataSources, "raw")],
    },
    ToolInput {
        name: "dwi",
        required: true,
        rules: &[(FilterKey::DataScans, "dwi"), (FilterKey::DataSources, "raw")],
    },
    ToolInput {
        name: "T1w Gadolinium",
        required: false,
        rules: &[
            (FilterKey::DataScans, "T1w"),
            (FilterKey::Options, "acq-gad"),
            (FilterKey::DataSources, "raw"),
        ],
    },
    ToolInput {
        name: "T2w DBS",
        required: false,
        rules: &[
            (FilterKey::DataScans, "T2w"),
            (FilterKey::Options, "acq-dbs"),
            (FilterKey::DataSources, "raw"),
        ],
    },
];

const COREGISTRATION_INPUTS: &[ToolInput] = &[
    ToolInput {
        name: "BFC T1w",
        required: true,
        rules: &[
            (FilterKey::DataScans, "T1w"),
            (FilterKey::DataSources, "derivatives"),
            (FilterKey::FileNames, "*_bfc*"),
        ],
    },
    ToolInput {
        name: "MNI Template",
        required: true,
        rules: &[(FilterKey::DataScans, "T1w"), (FilterKey::DataSources, "templates")],
    },
    ToolInput {
        name: "Post-Op CT",
        required: true,
        rules: &[
            (FilterKey::DataScans, "ct"),
            (FilterKey::Sessions, "ses-postop"),
            (FilterKey::DataSources, "raw"),
        ],
    },
    ToolInput {
        name: "Pre-Op CT",
        required: false,
        rules: &[
            (FilterKey::DataScans, "ct"),
            (FilterKey::Sessions, "ses-preop"),
            (FilterKey::DataSources, "raw"),
        ],
    },
];

/// A processing tool whose file picker the catalog populates.
///
/// # Examples
///
/// ```
/// use bids_catalog::{FilterKey, Preset};
///
/// let preset: Preset = "dcm2nii".parse()?;
/// let filter = preset.filter();
/// assert_eq!(filter.values(FilterKey::Formats), Some(vec!["dicom".to_owned()]));
/// assert_eq!(filter.values(FilterKey::DataSources), Some(vec!["sourcedata".to_owned()]));
/// # Ok::<(), bids_core::ParseValueError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preset {
    /// DICOM to NIfTI conversion.
    Dcm2nii,
    /// Image viewer.
    Display,
    /// Diffusion preprocessing.
    DwiPreprocess,
    /// CT to MRI co-registration.
    Coregistration,
}

impl Preset {
    /// All presets, in declaration order.
    pub const ALL: [Self; 4] = [
        Self::Dcm2nii,
        Self::Display,
        Self::DwiPreprocess,
        Self::Coregistration,
    ];

    /// Returns the preset name.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dcm2nii => "dcm2nii",
            Self::Display => "display",
            Self::DwiPreprocess => "dwipreprocess",
            Self::Coregistration => "coregistration",
        }
    }

    /// Returns `true` if the tool accepts several files at once.
    #[inline]
    #[must_use]
    pub const fn multi_select(self) -> bool {
        !matches!(self, Self::Display)
    }

    /// Returns the named inputs of the tool, if it declares any.
    #[must_use]
    pub const fn inputs(self) -> &'static [ToolInput] {
        match self {
            Self::DwiPreprocess => DWI_PREPROCESS_INPUTS,
            Self::Coregistration => COREGISTRATION_INPUTS,
            Self::Dcm2nii | Self::Display => &[],
        }
    }

    /// Switches `filter` to this tool.
    ///
    /// Scan, type and file selections are cleared; sources and formats are
    /// replaced. Subject and session selections are kept.
    pub fn apply(self, filter: &mut Filter) {
        filter.remove(FilterKey::DataScans);
        filter.remove(FilterKey::DataTypes);
        filter.remove(FilterKey::FileNames);

        let (sources, formats): (&[DataSource], &[Format]) = match self {
            Self::Dcm2nii => (&[DataSource::Sourcedata], &[Format::Dicom]),
            Self::Display | Self::DwiPreprocess | Self::Coregistration => {
                (&[DataSource::Raw, DataSource::Derivatives], &[Format::Nifti])
            }
        };
        filter.data_sources = Some(sources.iter().copied().collect());
        filter.formats = Some(formats.iter().copied().collect());
    }

    /// Returns a fresh filter for this tool.
    #[must_use]
    pub fn filter(self) -> Filter {
        let mut filter = Filter::new();
        self.apply(&mut filter);
        filter
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Preset {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|preset| preset.as_str() == s)
            .ok_or_else(|| ParseValueError::new("preset", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_presets() {
        for preset in Preset::ALL {
            assert_eq!(preset.as_str().parse::<Preset>().unwrap(), preset);
        }
        let err = "register".parse::<Preset>().unwrap_err();
        assert_eq!(err.to_string(), "unknown preset 'register'");
    }

    #[test]
    fn test_nifti_presets() {
        for preset in [Preset::Display, Preset::DwiPreprocess, Preset::Coregistration] {
            let filter = preset.filter();
            assert_eq!(
                filter.values(FilterKey::DataSources),
                Some(vec!["derivatives".to_owned(), "raw".to_owned()])
            );
            assert_eq!(filter.values(FilterKey::Formats), Some(vec!["nifti".to_owned()]));
        }
    }

    #[test]
    fn test_apply_resets_tool_specific_keys() {
        let mut filter = Filter::new()
            .with_subjects(["sub-01"])
            .with_sessions(["ses-01"])
            .with_data_scans(["T1w"])
            .with_file_names(["/d/a.nii"]);

        Preset::Dcm2nii.apply(&mut filter);

        assert!(!filter.contains_key(FilterKey::DataScans));
        assert!(!filter.contains_key(FilterKey::DataTypes));
        assert!(!filter.contains_key(FilterKey::FileNames));
        assert!(filter.contains_key(FilterKey::Subjects));
        assert!(filter.contains_key(FilterKey::Sessions));
        assert_eq!(filter.values(FilterKey::Formats), Some(vec!["dicom".to_owned()]));
    }

    #[test]
    fn test_selection_modes() {
        assert!(!Preset::Display.multi_select());
        assert!(Preset::Dcm2nii.multi_select());
        assert!(Preset::Coregistration.multi_select());
    }

    #[test]
    fn test_inputs() {
        assert!(Preset::Dcm2nii.inputs().is_empty());

        let inputs = Preset::Coregistration.inputs();
        let template = inputs.iter().find(|i| i.name == "MNI Template").unwrap();
        assert!(template.from_templates());
        assert!(inputs.iter().filter(|i| i.name != "MNI Template").all(|i| !i.from_templates()));

        let required: Vec<_> = Preset::DwiPreprocess
            .inputs()
            .iter()
            .filter(|i| i.required)
            .map(|i| i.name)
            .collect();
        assert_eq!(required, vec!["T1w", "dwi"]);
    }
}
