//! DICOM header validation.
//!
//! Files without an extension are common in DICOM exports but are just as
//! common for everything else. [`HeaderProbe`] decides whether a candidate is
//! really DICOM; [`DicomHeaderProbe`] does so by parsing the file with
//! `dicom-object`, stopping before the pixel data.

use std::fmt;

use camino::Utf8Path;
use dicom_object::{OpenFileOptions, Tag};
use tracing::debug;

/// The Pixel Data attribute (7FE0,0010); parsing stops before it.
const PIXEL_DATA: Tag = Tag(0x7FE0, 0x0010);

/// Decides whether a DICOM candidate should be catalogued.
///
/// A rejected file is dropped silently; it is never an error.
///
/// # Examples
///
/// ```
/// use bids_scanner::HeaderProbe;
/// use camino::Utf8Path;
///
/// #[derive(Debug)]
/// struct DcmExtensionOnly;
///
/// impl HeaderProbe for DcmExtensionOnly {
///     fn is_valid(&self, path: &Utf8Path) -> bool {
///         path.extension() == Some("dcm")
///     }
/// }
///
/// assert!(DcmExtensionOnly.is_valid(Utf8Path::new("IM0001.dcm")));
/// assert!(!DcmExtensionOnly.is_valid(Utf8Path::new("IM0001")));
/// ```
pub trait HeaderProbe: fmt::Debug + Send + Sync {
    /// Returns `true` if the file at `path` is valid DICOM.
    fn is_valid(&self, path: &Utf8Path) -> bool;
}

/// Validates candidates by parsing their DICOM header.
#[derive(Debug, Clone, Copy, Default)]
pub struct DicomHeaderProbe;

impl HeaderProbe for DicomHeaderProbe {
    fn is_valid(&self, path: &Utf8Path) -> bool {
        match OpenFileOptions::new()
            .read_until(PIXEL_DATA)
            .open_file(path.as_std_path())
        {
            Ok(_) => true,
            Err(e) => {
                debug!(path = %path, error = %e, "Not a valid DICOM file");
                false
            }
        }
    }
}

/// Accepts every candidate without reading it.
///
/// Used when DICOM validation is disabled in the configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAllProbe;

impl HeaderProbe for AcceptAllProbe {
    #[inline]
    fn is_valid(&self, _path: &Utf8Path) -> bool {
        true
    }
}
