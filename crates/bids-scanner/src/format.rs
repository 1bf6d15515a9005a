//! File format detection from file names.
//!
//! The scanner only looks at names here; DICOM candidates still need their
//! header checked by a [`HeaderProbe`](crate::HeaderProbe) before they are
//! catalogued.
//!
//! | Name                         | Result                         |
//! |------------------------------|--------------------------------|
//! | `*.nii`, `*.nii.gz`          | [`Format::Nifti`]              |
//! | `*.json`                     | [`Format::Json`]               |
//! | `*.dcm`, no extension        | [`Detected::DicomCandidate`]   |
//! | `KEY*` (any extension)       | [`Detected::Skipped`]          |
//! | `DICOMDIR`                   | [`Detected::Skipped`]          |
//! | anything else                | [`Detected::Unrecognized`]     |
//!
//! Extension and prefix matching is case-insensitive.

use bids_core::Format;
use camino::Utf8Path;

/// Result of looking at a file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detected {
    /// A format known from the extension alone.
    Format(Format),
    /// Looks like DICOM; the header must be validated.
    DicomCandidate,
    /// A DICOM index or key-object file that is never catalogued.
    Skipped,
    /// Not a data file the catalog understands.
    Unrecognized,
}

/// Determines the format of a file from its name.
///
/// # Examples
///
/// ```
/// use bids_core::Format;
/// use bids_scanner::{Detected, detect_format};
///
/// assert_eq!(detect_format("sub-01_T1w.nii.gz"), Detected::Format(Format::Nifti));
/// assert_eq!(detect_format("sub-01_T1w.JSON"), Detected::Format(Format::Json));
/// assert_eq!(detect_format("IM0001"), Detected::DicomCandidate);
/// assert_eq!(detect_format("DICOMDIR"), Detected::Skipped);
/// assert_eq!(detect_format("notes.txt"), Detected::Unrecognized);
/// ```
#[must_use]
pub fn detect_format(name: &str) -> Detected {
    let lower = name.to_ascii_lowercase();

    if lower.starts_with("key") {
        return Detected::Skipped;
    }

    if lower.ends_with(".nii.gz") {
        return Detected::Format(Format::Nifti);
    }

    let path = Utf8Path::new(&lower);
    match path.extension() {
        Some("nii") => Detected::Format(Format::Nifti),
        Some("json") => Detected::Format(Format::Json),
        Some("dcm") | None => {
            let stem = path.file_stem().unwrap_or(&lower);
            if stem == "dicomdir" {
                Detected::Skipped
            } else {
                Detected::DicomCandidate
            }
        }
        Some(_) => Detected::Unrecognized,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_nifti() {
        assert_eq!(detect_format("a.nii"), Detected::Format(Format::Nifti));
        assert_eq!(detect_format("a.nii.gz"), Detected::Format(Format::Nifti));
        assert_eq!(detect_format("A.NII.GZ"), Detected::Format(Format::Nifti));
    }

    #[test]
    fn test_detect_json() {
        assert_eq!(detect_format("sub-01_dwi.json"), Detected::Format(Format::Json));
    }

    #[test]
    fn test_detect_dicom_candidates() {
        assert_eq!(detect_format("IM0001.dcm"), Detected::DicomCandidate);
        assert_eq!(detect_format("IM0001.DCM"), Detected::DicomCandidate);
        assert_eq!(detect_format("IM0001"), Detected::DicomCandidate);
    }

    #[test]
    fn test_detect_skipped() {
        assert_eq!(detect_format("DICOMDIR"), Detected::Skipped);
        assert_eq!(detect_format("dicomdir.dcm"), Detected::Skipped);
        assert_eq!(detect_format("KEY_0001.dcm"), Detected::Skipped);
        assert_eq!(detect_format("key0001"), Detected::Skipped);
    }

    #[test]
    fn test_key_prefix_skips_any_extension() {
        assert_eq!(detect_format("KEY_0001.json"), Detected::Skipped);
        assert_eq!(detect_format("key.nii.gz"), Detected::Skipped);
        assert_eq!(detect_format("Keywords.txt"), Detected::Skipped);
        assert_eq!(detect_format("monkey.nii"), Detected::Format(Format::Nifti));
    }

    #[test]
    fn test_detect_unrecognized() {
        assert_eq!(detect_format("sub-01_dwi.bval"), Detected::Unrecognized);
        assert_eq!(detect_format("sub-01_dwi.bvec"), Detected::Unrecognized);
        assert_eq!(detect_format("README.md"), Detected::Unrecognized);
        assert_eq!(detect_format("image.mgz"), Detected::Unrecognized);
    }
}
